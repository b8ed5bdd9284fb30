//! Dashboard statistics.

use serde::Serialize;
use sqlx::SqlitePool;

use super::activity::{recent_activity, Activity};
use super::blog::BlogPost;
use super::contact::ContactMessage;

#[derive(Debug, Clone, Serialize)]
pub struct AdminStats {
    pub total_posts: i64,
    pub total_messages: i64,
    pub total_views: i64,
    pub unread_messages: i64,
    pub recent_activity: Vec<Activity>,
}

impl AdminStats {
    pub async fn collect(pool: &SqlitePool, recent_limit: i64) -> Result<AdminStats, sqlx::Error> {
        let counts = ContactMessage::counts_by_status(pool).await?;
        Ok(AdminStats {
            total_posts: BlogPost::count(pool).await?,
            total_messages: ContactMessage::count(pool).await?,
            total_views: BlogPost::total_views(pool).await?,
            unread_messages: counts.unread,
            recent_activity: recent_activity(pool, recent_limit).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_in_memory;

    #[tokio::test]
    async fn test_empty_stats() {
        let pool = init_in_memory().await.unwrap();
        let stats = AdminStats::collect(&pool, 10).await.unwrap();
        assert_eq!(stats.total_posts, 0);
        assert_eq!(stats.total_views, 0);
        assert_eq!(stats.unread_messages, 0);
        assert!(stats.recent_activity.is_empty());
    }
}
