//! Activity log for content changes, shown on the admin dashboard.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::common::Page;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Activity {
    pub id: String,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub resource_name: Option<String>,
    pub user_id: Option<String>,
    pub created_at: String,
}

/// Query parameters for browsing the activity log
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ActivityQuery {
    /// Filter by action (e.g., "post.create")
    pub action: Option<String>,
    /// Filter by resource type (e.g., "post", "skill")
    pub resource_type: Option<String>,
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<i64>,
    /// Items per page (defaults to 50, max 100)
    pub per_page: Option<i64>,
}

pub mod actions {
    pub const PROFILE_UPDATE: &str = "profile.update";

    pub const SECTION_CREATE: &str = "section.create";
    pub const SECTION_UPDATE: &str = "section.update";
    pub const SECTION_DELETE: &str = "section.delete";

    pub const POST_CREATE: &str = "post.create";
    pub const POST_UPDATE: &str = "post.update";
    pub const POST_DELETE: &str = "post.delete";

    pub const COMMENT_CREATE: &str = "comment.create";
    pub const COMMENT_DELETE: &str = "comment.delete";

    pub const MESSAGE_RECEIVE: &str = "message.receive";
    pub const MESSAGE_UPDATE: &str = "message.update";
    pub const MESSAGE_DELETE: &str = "message.delete";

    pub const AUTH_SIGNUP: &str = "auth.signup";
    pub const AUTH_SETUP: &str = "auth.setup";
}

pub mod resource_types {
    pub const PROFILE: &str = "profile";
    pub const ABOUT_SECTION: &str = "about_section";
    pub const SKILL: &str = "skill";
    pub const PROJECT: &str = "project";
    pub const EDUCATION: &str = "education";
    pub const INTEREST: &str = "interest";
    pub const POST: &str = "post";
    pub const COMMENT: &str = "comment";
    pub const MESSAGE: &str = "message";
    pub const USER: &str = "user";
}

pub async fn log_activity(
    db: &SqlitePool,
    action: &str,
    resource_type: &str,
    resource_id: Option<&str>,
    resource_name: Option<&str>,
    user_id: Option<&str>,
) -> Result<(), sqlx::Error> {
    let id = uuid::Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO activity_log (id, action, resource_type, resource_id, resource_name, user_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(action)
    .bind(resource_type)
    .bind(resource_id)
    .bind(resource_name)
    .bind(user_id)
    .bind(crate::db::now())
    .execute(db)
    .await?;

    tracing::debug!(
        action = action,
        resource_type = resource_type,
        resource_id = resource_id,
        user_id = user_id,
        "Activity recorded"
    );

    Ok(())
}

/// The most recent `limit` entries, newest first
pub async fn recent_activity(db: &SqlitePool, limit: i64) -> Result<Vec<Activity>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM activity_log ORDER BY created_at DESC, rowid DESC LIMIT ?")
        .bind(limit)
        .fetch_all(db)
        .await
}

pub async fn list_activity(
    db: &SqlitePool,
    query: &ActivityQuery,
) -> Result<Page<Activity>, sqlx::Error> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(50).clamp(1, 100);
    let offset = page.saturating_sub(1).saturating_mul(per_page);

    let mut conditions = Vec::new();
    let mut bindings: Vec<&str> = Vec::new();

    if let Some(action) = &query.action {
        conditions.push("action = ?");
        bindings.push(action);
    }
    if let Some(resource_type) = &query.resource_type {
        conditions.push("resource_type = ?");
        bindings.push(resource_type);
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM activity_log {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for binding in &bindings {
        count_query = count_query.bind(*binding);
    }
    let total = count_query.fetch_one(db).await?;

    let sql = format!(
        "SELECT * FROM activity_log {} ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
        where_clause
    );
    let mut items_query = sqlx::query_as::<_, Activity>(&sql);
    for binding in &bindings {
        items_query = items_query.bind(*binding);
    }
    let items = items_query.bind(per_page).bind(offset).fetch_all(db).await?;

    Ok(Page::new(items, total, page, per_page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_in_memory;

    #[tokio::test]
    async fn test_log_and_list_activity() {
        let pool = init_in_memory().await.unwrap();

        log_activity(&pool, actions::POST_CREATE, resource_types::POST, Some("1"), Some("Hello"), None)
            .await
            .unwrap();
        log_activity(&pool, actions::SECTION_DELETE, resource_types::SKILL, Some("abc"), None, None)
            .await
            .unwrap();

        let recent = recent_activity(&pool, 1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].action, actions::SECTION_DELETE);

        let query = ActivityQuery {
            resource_type: Some(resource_types::POST.to_string()),
            ..Default::default()
        };
        let page = list_activity(&pool, &query).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].resource_name.as_deref(), Some("Hello"));
        assert_eq!(page.total_pages, 1);

        let far = ActivityQuery {
            page: Some(i64::MAX),
            ..Default::default()
        };
        let page = list_activity(&pool, &far).await.unwrap();
        assert_eq!(page.total, 2);
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_recent_activity_orders_same_second_entries() {
        let pool = init_in_memory().await.unwrap();
        for name in ["first", "second", "third"] {
            log_activity(&pool, actions::POST_UPDATE, resource_types::POST, Some("1"), Some(name), None)
                .await
                .unwrap();
        }

        let names: Vec<_> = recent_activity(&pool, 3)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.resource_name.unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["third", "second", "first"]);
    }
}
