//! In-memory helpers for the blog: search, tag counting, slugs and paging.
//!
//! These operate on posts that were already loaded from the database.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

use crate::db::{BlogPost, Page};

pub const MAX_PER_PAGE: i64 = 100;

lazy_static! {
    /// Runs of characters that cannot appear in a slug
    static ref SLUG_SEPARATOR_REGEX: Regex = Regex::new(r"[^a-z0-9가-힣]+").unwrap();
}

/// Case-insensitive substring match over title, excerpt, content and tags
pub fn matches_query(post: &BlogPost, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    post.title.to_lowercase().contains(&needle)
        || post.excerpt.to_lowercase().contains(&needle)
        || post.content.to_lowercase().contains(&needle)
        || post.tags.iter().any(|t| t.to_lowercase().contains(&needle))
}

pub fn search(posts: Vec<BlogPost>, query: &str) -> Vec<BlogPost> {
    posts.into_iter().filter(|p| matches_query(p, query)).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub name: String,
    pub count: i64,
}

/// Count tag occurrences across `posts`, most used first then by name
pub fn tag_counts(posts: &[BlogPost]) -> Vec<TagCount> {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for tag in posts.iter().flat_map(|p| p.tags.iter()) {
        *counts.entry(tag.as_str()).or_insert(0) += 1;
    }

    let mut result: Vec<TagCount> = counts
        .into_iter()
        .map(|(name, count)| TagCount {
            name: name.to_string(),
            count,
        })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    result
}

/// URL slug from a title. Hangul is kept as-is.
pub fn generate_slug(title: &str) -> String {
    let lowered = title.to_lowercase();
    SLUG_SEPARATOR_REGEX
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Slice one page out of `items`. `page` is 1-based; `per_page` is clamped
/// to 1..=100.
pub fn paginate<T>(items: Vec<T>, page: Option<i64>, per_page: Option<i64>, default_per_page: i64) -> Page<T> {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(default_per_page).clamp(1, MAX_PER_PAGE);
    let total = items.len() as i64;
    let offset = page.saturating_sub(1).saturating_mul(per_page);
    let offset = usize::try_from(offset).unwrap_or(usize::MAX);

    let items: Vec<T> = items
        .into_iter()
        .skip(offset)
        .take(per_page as usize)
        .collect();

    Page::new(items, total, page, per_page)
}
