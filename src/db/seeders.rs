//! Database seeders for demo content
//!
//! Fills an empty site with a sample profile, a few portfolio sections and
//! blog posts so the front-end has something to render.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::info;

use super::models::*;

/// Seed demo content for the first admin account. Does nothing when the
/// blog already has posts.
pub async fn seed_demo_content(pool: &SqlitePool) -> Result<()> {
    if BlogPost::count(pool).await? > 0 {
        info!("Blog already has posts, skipping demo content");
        return Ok(());
    }

    let owner: User = sqlx::query_as(
        "SELECT * FROM users WHERE role = ? ORDER BY created_at ASC LIMIT 1",
    )
    .bind(roles::ADMIN)
    .fetch_optional(pool)
    .await?
    .context("No admin account exists yet; run setup first")?;

    info!(owner = %owner.email, "Seeding demo content...");

    let profile = Profile::ensure_for_user(pool, &owner.id, &owner.name).await?;
    Profile::update(
        pool,
        &profile.id,
        &UpdateProfileRequest {
            title: Some("Software Engineer".to_string()),
            bio: Some("I build web services and write about what I learn along the way.".to_string()),
            location: Some("Seoul, Korea".to_string()),
            ..Default::default()
        },
    )
    .await?;

    let sections = [
        ("Hello", "Welcome to my corner of the web.", 1),
        ("What I do", "Backend systems, developer tooling and the occasional front-end.", 2),
    ];
    for (title, content, order) in sections {
        AboutSection::create(
            pool,
            &profile.id,
            &CreateAboutSectionRequest {
                title: title.to_string(),
                content: content.to_string(),
                section_order: order,
                is_active: true,
            },
        )
        .await?;
    }

    let skills = [
        ("Rust", "language", 85, 3.0, true),
        ("TypeScript", "language", 80, 5.0, true),
        ("PostgreSQL", "database", 70, 4.0, false),
    ];
    for (name, category, proficiency, years, featured) in skills {
        Skill::create(
            pool,
            &profile.id,
            &CreateSkillRequest {
                name: name.to_string(),
                category: category.to_string(),
                proficiency,
                years_of_experience: years,
                is_featured: featured,
            },
        )
        .await?;
    }

    Project::create(
        pool,
        &profile.id,
        &CreateProjectRequest {
            title: "Folio".to_string(),
            description: "This site: a portfolio and blog backend.".to_string(),
            detailed_description: None,
            project_type: "personal".to_string(),
            company: None,
            role: Some("Author".to_string()),
            start_date: Some("2024-01-01".to_string()),
            end_date: None,
            is_current: true,
            technologies: vec!["Rust".to_string(), "axum".to_string(), "SQLite".to_string()],
            project_url: None,
            github_url: None,
            image_url: None,
            achievements: vec![],
            challenges: vec![],
            is_featured: true,
            display_order: 1,
        },
    )
    .await?;

    Interest::create(
        pool,
        &profile.id,
        &CreateInterestRequest {
            name: "Photography".to_string(),
            description: Some("Mostly street and travel.".to_string()),
        },
    )
    .await?;

    let posts = [
        (
            "Hello, world",
            "hello-world",
            "The obligatory first post.",
            "Every blog starts somewhere. This one starts here.",
            vec!["meta"],
        ),
        (
            "Getting started with Rust",
            "getting-started-with-rust",
            "Notes from my first month with Rust.",
            "Ownership felt strange at first, then it clicked.",
            vec!["rust", "learning"],
        ),
    ];
    let post_count = posts.len();
    for (title, slug, excerpt, content, tags) in posts {
        BlogPost::create(
            pool,
            slug,
            &CreatePostRequest {
                title: title.to_string(),
                slug: Some(slug.to_string()),
                excerpt: excerpt.to_string(),
                content: content.to_string(),
                featured_image: None,
                content_type: "article".to_string(),
                read_time: "2 min".to_string(),
                tags: tags.into_iter().map(String::from).collect(),
            },
        )
        .await?;
    }

    info!("Seeded demo profile and {} blog posts", post_count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_in_memory;

    #[tokio::test]
    async fn test_seed_requires_admin() {
        let pool = init_in_memory().await.unwrap();
        assert!(seed_demo_content(&pool).await.is_err());
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let pool = init_in_memory().await.unwrap();
        User::create(&pool, "owner@example.com", "h", "Owner", roles::ADMIN)
            .await
            .unwrap();

        seed_demo_content(&pool).await.unwrap();
        seed_demo_content(&pool).await.unwrap();

        assert_eq!(BlogPost::count(&pool).await.unwrap(), 2);
        let full = FullProfile::load(&pool, None).await.unwrap().unwrap();
        assert_eq!(full.about_sections.len(), 2);
        assert_eq!(full.skills[0].name, "Rust");
    }
}
