//! Blog endpoints: posts, tags and comments.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use super::activity::record_activity;
use super::auth::{require_login, AdminUser};
use super::error::{ApiError, ValidationErrorBuilder};
use super::metrics::record_comment;
use super::validation::{
    validate_content_type, validate_required, validate_slug, validate_url, MAX_TITLE_LENGTH,
};
use crate::blog::{generate_slug, paginate, search, tag_counts, TagCount};
use crate::db::{
    actions, resource_types, BlogPost, BlogTag, Comment, CreateCommentRequest, CreatePostRequest,
    Page, UpdatePostRequest, User,
};
use crate::i18n::Message;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PostListQuery {
    pub tag: Option<String>,
    pub q: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Alias for `per_page`, used by "latest posts" widgets
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TagCountsQuery {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PopularTagsQuery {
    pub limit: Option<i64>,
}

fn validate_tags(errors: &mut ValidationErrorBuilder, tags: &[String]) {
    if tags.iter().any(|t| t.trim().is_empty()) {
        errors.add("tags", "Tags cannot be empty");
    }
}

fn validate_create_post(req: &CreatePostRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors.check("title", validate_required(&req.title, "Title", MAX_TITLE_LENGTH));
    if req.content.trim().is_empty() {
        errors.add("content", "Content is required");
    }
    errors.check("content_type", validate_content_type(&req.content_type));
    errors.check("featured_image", validate_url(&req.featured_image));
    validate_tags(&mut errors, &req.tags);
    errors.finish()
}

fn validate_update_post(req: &UpdatePostRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if let Some(title) = &req.title {
        errors.check("title", validate_required(title, "Title", MAX_TITLE_LENGTH));
    }
    if let Some(slug) = &req.slug {
        errors.check("slug", validate_slug(slug));
    }
    if let Some(content) = &req.content {
        if content.trim().is_empty() {
            errors.add("content", "Content is required");
        }
    }
    if let Some(content_type) = &req.content_type {
        errors.check("content_type", validate_content_type(content_type));
    }
    errors.check("featured_image", validate_url(&req.featured_image));
    if let Some(tags) = &req.tags {
        validate_tags(&mut errors, tags);
    }
    errors.finish()
}

/// Use the given slug, or derive one from the title when it is blank
fn resolve_slug(req: &CreatePostRequest) -> Result<String, ApiError> {
    let slug = match req.slug.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => generate_slug(&req.title),
    };
    validate_slug(&slug).map_err(|e| ApiError::validation_field("slug", e))?;
    Ok(slug)
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

/// GET /api/blog/posts
///
/// Query parameters: `tag`, `q`, `page` (1-indexed), `per_page` or `limit`.
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<Page<BlogPost>>, ApiError> {
    let tag = query.tag.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let mut posts = BlogPost::list_all(&state.db, tag).await?;

    if let Some(q) = query.q.as_deref() {
        posts = search(posts, q);
    }

    Ok(Json(paginate(
        posts,
        query.page,
        query.per_page.or(query.limit),
        state.config.blog.page_size,
    )))
}

/// GET /api/blog/posts/:slug - counts as a view
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<BlogPost>, ApiError> {
    let mut post = BlogPost::find_by_slug(&state.db, &slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    post.view_count = BlogPost::increment_views(&state.db, post.id).await?;
    Ok(Json(post))
}

/// POST /api/blog/posts
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Json(req): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<BlogPost>), ApiError> {
    validate_create_post(&req)?;
    let slug = resolve_slug(&req)?;

    if BlogPost::slug_exists(&state.db, &slug).await? {
        return Err(ApiError::conflict(format!(
            "A post with slug '{}' already exists",
            slug
        )));
    }

    let post = BlogPost::create(&state.db, &slug, &req).await?;

    tracing::info!(post_id = post.id, slug = %post.slug, "Blog post created");
    record_activity(
        &state,
        actions::POST_CREATE,
        resource_types::POST,
        Some(&post.id.to_string()),
        Some(&post.title),
        Some(&user.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /api/blog/posts/id/:id
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePostRequest>,
) -> Result<Json<BlogPost>, ApiError> {
    validate_update_post(&req)?;

    if let Some(slug) = &req.slug {
        if let Some(existing) = BlogPost::find_by_slug(&state.db, slug).await? {
            if existing.id != id {
                return Err(ApiError::conflict(format!(
                    "A post with slug '{}' already exists",
                    slug
                )));
            }
        }
    }

    let post = BlogPost::update(&state.db, id, &req)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    record_activity(
        &state,
        actions::POST_UPDATE,
        resource_types::POST,
        Some(&post.id.to_string()),
        Some(&post.title),
        Some(&user.id),
    )
    .await;

    Ok(Json(post))
}

/// DELETE /api/blog/posts/id/:id
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let post = BlogPost::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    BlogPost::delete(&state.db, id).await?;

    tracing::info!(post_id = id, slug = %post.slug, "Blog post deleted");
    record_activity(
        &state,
        actions::POST_DELETE,
        resource_types::POST,
        Some(&id.to_string()),
        Some(&post.title),
        Some(&user.id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// GET /api/blog/tags
pub async fn list_tags(State(state): State<Arc<AppState>>) -> Result<Json<Vec<BlogTag>>, ApiError> {
    Ok(Json(BlogTag::list_with_counts(&state.db).await?))
}

/// GET /api/blog/tags/popular
pub async fn popular_tags(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PopularTagsQuery>,
) -> Result<Json<Vec<BlogTag>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(state.config.blog.popular_tags)
        .clamp(1, crate::blog::MAX_PER_PAGE);
    Ok(Json(BlogTag::popular(&state.db, limit).await?))
}

/// GET /api/blog/tags/counts?q= - tag usage across the posts matching `q`
pub async fn search_tag_counts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TagCountsQuery>,
) -> Result<Json<Vec<TagCount>>, ApiError> {
    let mut posts = BlogPost::list_all(&state.db, None).await?;
    if let Some(q) = query.q.as_deref() {
        posts = search(posts, q);
    }
    Ok(Json(tag_counts(&posts)))
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

async fn post_by_slug(state: &AppState, slug: &str) -> Result<BlogPost, ApiError> {
    BlogPost::find_by_slug(&state.db, slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))
}

/// GET /api/blog/posts/:slug/comments
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let post = post_by_slug(&state, &slug).await?;
    Ok(Json(Comment::list_for_post(&state.db, post.id).await?))
}

/// POST /api/blog/posts/:slug/comments
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    user: Result<User, ApiError>,
    Path(slug): Path<String>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let locale = state.config.site.locale;
    let user = require_login(user, locale.text(Message::CommentLoginRequired))?;

    let content = req.content.trim();
    if content.is_empty() {
        return Err(ApiError::validation_field("content", locale.text(Message::CommentEmpty)));
    }
    let max = state.config.blog.max_comment_length;
    if content.chars().count() > max {
        return Err(ApiError::validation_field(
            "content",
            format!("Comment is too long (max {} characters)", max),
        ));
    }

    // Comments reference a real account
    if User::find_by_id(&state.db, &user.id).await?.is_none() {
        return Err(ApiError::unauthorized(locale.text(Message::UserNotFound)));
    }

    let post = post_by_slug(&state, &slug).await?;
    let comment = Comment::create(&state.db, post.id, &user.id, content).await?;

    record_comment();
    record_activity(
        &state,
        actions::COMMENT_CREATE,
        resource_types::COMMENT,
        Some(&comment.id.to_string()),
        Some(&post.title),
        Some(&user.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// DELETE /api/blog/comments/:id - the author or an admin
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let comment = Comment::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    if comment.user_id != user.id && !user.is_admin() {
        return Err(ApiError::forbidden("You can only delete your own comments"));
    }

    Comment::delete(&state.db, id).await?;

    record_activity(
        &state,
        actions::COMMENT_DELETE,
        resource_types::COMMENT,
        Some(&id.to_string()),
        None,
        Some(&user.id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
