mod models;
mod seeders;

pub use models::*;
pub use seeders::seed_demo_content;

use anyhow::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

pub type DbPool = SqlitePool;

/// Current time in the format every `created_at`/`updated_at` column uses.
/// Fixed-width microseconds keep lexical and chronological order identical.
pub fn now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Execute a SQL migration file, properly handling comments
async fn execute_sql(pool: &SqlitePool, sql: &str) -> Result<()> {
    for statement in sql.split(';') {
        // Strip SQL comment lines (lines starting with --)
        let cleaned: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let trimmed = cleaned.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

pub async fn init(data_dir: &Path) -> Result<DbPool> {
    let db_path = data_dir.join("folio.db");
    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    info!("Initializing database at {}", db_path.display());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    // Enable WAL mode for better concurrency
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    info!("Database initialized successfully");
    Ok(pool)
}

/// Fresh in-memory database with the full schema, for tests and dry runs.
///
/// Every pooled connection to `sqlite::memory:` is a separate database, so
/// the pool is pinned to a single connection that never expires.
pub async fn init_in_memory() -> Result<DbPool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

async fn table_exists(pool: &SqlitePool, table: &str) -> Result<bool> {
    let found: Option<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name = ?")
            .bind(table)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations...");

    // Migration 001: Users and sessions
    execute_sql(pool, include_str!("../../migrations/001_users.sql")).await?;

    // Migration 002: Profile and portfolio sections
    if !table_exists(pool, "interests").await? {
        execute_sql(pool, include_str!("../../migrations/002_portfolio.sql")).await?;
    }

    // Migration 003: Blog posts, tags, comments
    if !table_exists(pool, "blog_comments").await? {
        execute_sql(pool, include_str!("../../migrations/003_blog.sql")).await?;
    }

    // Migration 004: Contact messages and activity log
    if !table_exists(pool, "activity_log").await? {
        execute_sql(pool, include_str!("../../migrations/004_contact.sql")).await?;
    }

    info!("Migrations completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_create_schema() {
        let pool = init_in_memory().await.unwrap();
        for table in [
            "users",
            "sessions",
            "profiles",
            "about_sections",
            "skills",
            "projects",
            "educations",
            "interests",
            "blog_posts",
            "blog_tags",
            "blog_post_tags",
            "blog_comments",
            "contact_messages",
            "activity_log",
        ] {
            assert!(table_exists(&pool, table).await.unwrap(), "missing {}", table);
        }
    }

    #[tokio::test]
    async fn test_migrations_are_rerunnable() {
        let pool = init_in_memory().await.unwrap();
        run_migrations(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_init_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init(dir.path()).await.unwrap();
        assert!(dir.path().join("folio.db").exists());
        assert!(table_exists(&pool, "blog_posts").await.unwrap());
    }

    #[test]
    fn test_now_is_fixed_width() {
        let a = now();
        assert_eq!(a.len(), "2024-01-15T08:30:00.000000Z".len());
        assert!(a.ends_with('Z'));
    }
}
