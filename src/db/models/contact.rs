//! Contact form messages.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Unread,
    Read,
    Replied,
}

impl std::fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unread => write!(f, "unread"),
            Self::Read => write!(f, "read"),
            Self::Replied => write!(f, "replied"),
        }
    }
}

impl std::str::FromStr for MessageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unread" => Ok(Self::Unread),
            "read" => Ok(Self::Read),
            "replied" => Ok(Self::Replied),
            _ => Err(format!("Unknown message status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContactMessage {
    pub id: i64,
    pub sender_id: Option<String>,
    pub sender_name: String,
    pub sender_email: String,
    pub subject: String,
    pub message: String,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitMessageRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMessageStatusRequest {
    pub status: MessageStatus,
}

#[derive(Debug, Serialize)]
pub struct SubmitMessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct MessageCounts {
    pub unread: i64,
    pub read: i64,
    pub replied: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<ContactMessage>,
    pub counts: MessageCounts,
}

impl ContactMessage {
    pub async fn create(
        pool: &SqlitePool,
        sender_id: &str,
        req: &SubmitMessageRequest,
    ) -> Result<ContactMessage, sqlx::Error> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO contact_messages (sender_id, sender_name, sender_email, subject, message, status, created_at)
            VALUES (?, ?, ?, ?, ?, 'unread', ?)
            RETURNING id
            "#,
        )
        .bind(sender_id)
        .bind(req.name.trim())
        .bind(req.email.trim())
        .bind(req.subject.trim())
        .bind(&req.message)
        .bind(crate::db::now())
        .fetch_one(pool)
        .await?;

        sqlx::query_as("SELECT * FROM contact_messages WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Newest first, optionally restricted to one status
    pub async fn list(
        pool: &SqlitePool,
        status: Option<MessageStatus>,
    ) -> Result<Vec<ContactMessage>, sqlx::Error> {
        match status {
            Some(status) => {
                sqlx::query_as(
                    "SELECT * FROM contact_messages WHERE status = ? ORDER BY created_at DESC, id DESC",
                )
                .bind(status.to_string())
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as("SELECT * FROM contact_messages ORDER BY created_at DESC, id DESC")
                    .fetch_all(pool)
                    .await
            }
        }
    }

    pub async fn update_status(
        pool: &SqlitePool,
        id: i64,
        status: MessageStatus,
    ) -> Result<Option<ContactMessage>, sqlx::Error> {
        let result = sqlx::query("UPDATE contact_messages SET status = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        sqlx::query_as("SELECT * FROM contact_messages WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM contact_messages")
            .fetch_one(pool)
            .await
    }

    pub async fn counts_by_status(pool: &SqlitePool) -> Result<MessageCounts, sqlx::Error> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM contact_messages GROUP BY status")
                .fetch_all(pool)
                .await?;

        let mut counts = MessageCounts::default();
        for (status, count) in rows {
            match status.parse::<MessageStatus>() {
                Ok(MessageStatus::Unread) => counts.unread = count,
                Ok(MessageStatus::Read) => counts.read = count,
                Ok(MessageStatus::Replied) => counts.replied = count,
                Err(_) => {}
            }
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_in_memory, roles, User};

    fn request(subject: &str) -> SubmitMessageRequest {
        SubmitMessageRequest {
            name: " Visitor ".to_string(),
            email: "visitor@example.com".to_string(),
            subject: subject.to_string(),
            message: "Hi there".to_string(),
        }
    }

    #[tokio::test]
    async fn test_message_lifecycle() {
        let pool = init_in_memory().await.unwrap();
        let user = User::create(&pool, "visitor@example.com", "h", "Visitor", roles::USER)
            .await
            .unwrap();

        let msg = ContactMessage::create(&pool, &user.id, &request("Hello")).await.unwrap();
        assert_eq!(msg.status, "unread");
        assert_eq!(msg.sender_name, "Visitor");
        ContactMessage::create(&pool, &user.id, &request("Again")).await.unwrap();

        let listed = ContactMessage::list(&pool, None).await.unwrap();
        assert_eq!(listed[0].subject, "Again");

        let updated = ContactMessage::update_status(&pool, msg.id, MessageStatus::Replied)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, "replied");

        let counts = ContactMessage::counts_by_status(&pool).await.unwrap();
        assert_eq!(counts.unread, 1);
        assert_eq!(counts.replied, 1);
        assert_eq!(ContactMessage::list(&pool, Some(MessageStatus::Unread)).await.unwrap().len(), 1);

        assert!(ContactMessage::delete(&pool, msg.id).await.unwrap());
        assert_eq!(ContactMessage::count(&pool).await.unwrap(), 1);
        assert!(ContactMessage::update_status(&pool, msg.id, MessageStatus::Read)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_sender_removal_keeps_message() {
        let pool = init_in_memory().await.unwrap();
        let user = User::create(&pool, "v@example.com", "h", "V", roles::USER).await.unwrap();
        let msg = ContactMessage::create(&pool, &user.id, &request("Hello")).await.unwrap();

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(&user.id)
            .execute(&pool)
            .await
            .unwrap();

        let listed = ContactMessage::list(&pool, None).await.unwrap();
        assert_eq!(listed[0].id, msg.id);
        assert!(listed[0].sender_id.is_none());
    }
}
