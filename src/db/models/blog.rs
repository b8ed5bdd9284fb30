//! Blog posts, tags and comments.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Article,
    Video,
    Tutorial,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Article => write!(f, "article"),
            Self::Video => write!(f, "video"),
            Self::Tutorial => write!(f, "tutorial"),
        }
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "article" => Ok(Self::Article),
            "video" => Ok(Self::Video),
            "tutorial" => Ok(Self::Tutorial),
            _ => Err(format!("Unknown content type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub featured_image: Option<String>,
    pub view_count: i64,
    pub content_type: String,
    pub read_time: String,
    pub created_at: String,
    pub updated_at: String,
    /// Tag names, filled in after the row is loaded
    #[sqlx(skip)]
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: String,
    pub content: String,
    pub featured_image: Option<String>,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub read_time: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_content_type() -> String {
    "article".to_string()
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub featured_image: Option<String>,
    pub content_type: Option<String>,
    pub read_time: Option<String>,
    /// Replaces the tag set when present
    pub tags: Option<Vec<String>>,
}

#[derive(FromRow)]
struct PostTagRow {
    post_id: i64,
    name: String,
}

/// Attach tag names to already-loaded posts with a single query
async fn attach_tags(pool: &SqlitePool, posts: &mut [BlogPost]) -> Result<(), sqlx::Error> {
    if posts.is_empty() {
        return Ok(());
    }

    let placeholders = vec!["?"; posts.len()].join(", ");
    let sql = format!(
        r#"
        SELECT pt.post_id, t.name
        FROM blog_post_tags pt
        JOIN blog_tags t ON t.id = pt.tag_id
        WHERE pt.post_id IN ({})
        ORDER BY t.name
        "#,
        placeholders
    );
    let mut query = sqlx::query_as::<_, PostTagRow>(&sql);
    for post in posts.iter() {
        query = query.bind(post.id);
    }
    let rows = query.fetch_all(pool).await?;

    let mut by_post: HashMap<i64, Vec<String>> = HashMap::new();
    for row in rows {
        by_post.entry(row.post_id).or_default().push(row.name);
    }
    for post in posts.iter_mut() {
        post.tags = by_post.remove(&post.id).unwrap_or_default();
    }
    Ok(())
}

async fn set_tags(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    post_id: i64,
    tags: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM blog_post_tags WHERE post_id = ?")
        .bind(post_id)
        .execute(&mut **tx)
        .await?;

    for name in tags {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        sqlx::query("INSERT OR IGNORE INTO blog_tags (name) VALUES (?)")
            .bind(name)
            .execute(&mut **tx)
            .await?;
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO blog_post_tags (post_id, tag_id)
            SELECT ?, id FROM blog_tags WHERE name = ?
            "#,
        )
        .bind(post_id)
        .bind(name)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

impl BlogPost {
    /// All posts newest first, optionally only those carrying `tag`
    pub async fn list_all(
        pool: &SqlitePool,
        tag: Option<&str>,
    ) -> Result<Vec<BlogPost>, sqlx::Error> {
        let mut posts: Vec<BlogPost> = match tag {
            Some(tag) => {
                sqlx::query_as(
                    r#"
                    SELECT * FROM blog_posts
                    WHERE id IN (
                        SELECT pt.post_id FROM blog_post_tags pt
                        JOIN blog_tags t ON t.id = pt.tag_id
                        WHERE t.name = ?
                    )
                    ORDER BY created_at DESC, id DESC
                    "#,
                )
                .bind(tag)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as("SELECT * FROM blog_posts ORDER BY created_at DESC, id DESC")
                    .fetch_all(pool)
                    .await?
            }
        };

        attach_tags(pool, &mut posts).await?;
        Ok(posts)
    }

    pub async fn find_by_slug(
        pool: &SqlitePool,
        slug: &str,
    ) -> Result<Option<BlogPost>, sqlx::Error> {
        let post: Option<BlogPost> = sqlx::query_as("SELECT * FROM blog_posts WHERE slug = ?")
            .bind(slug)
            .fetch_optional(pool)
            .await?;
        Self::with_tags(pool, post).await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<BlogPost>, sqlx::Error> {
        let post: Option<BlogPost> = sqlx::query_as("SELECT * FROM blog_posts WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Self::with_tags(pool, post).await
    }

    async fn with_tags(
        pool: &SqlitePool,
        post: Option<BlogPost>,
    ) -> Result<Option<BlogPost>, sqlx::Error> {
        let Some(mut post) = post else {
            return Ok(None);
        };
        post.tags = sqlx::query_scalar(
            r#"
            SELECT t.name FROM blog_tags t
            JOIN blog_post_tags pt ON pt.tag_id = t.id
            WHERE pt.post_id = ?
            ORDER BY t.name
            "#,
        )
        .bind(post.id)
        .fetch_all(pool)
        .await?;
        Ok(Some(post))
    }

    /// Bump the view counter and return the new value
    pub async fn increment_views(pool: &SqlitePool, id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE blog_posts SET view_count = view_count + 1 WHERE id = ? RETURNING view_count",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// Insert the post and its tags. `slug` must already be resolved.
    pub async fn create(
        pool: &SqlitePool,
        slug: &str,
        req: &CreatePostRequest,
    ) -> Result<BlogPost, sqlx::Error> {
        let now = crate::db::now();
        let mut tx = pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO blog_posts (title, slug, excerpt, content, featured_image, content_type, read_time, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&req.title)
        .bind(slug)
        .bind(&req.excerpt)
        .bind(&req.content)
        .bind(&req.featured_image)
        .bind(&req.content_type)
        .bind(&req.read_time)
        .bind(&now)
        .bind(&now)
        .fetch_one(&mut *tx)
        .await?;

        set_tags(&mut tx, id, &req.tags).await?;
        tx.commit().await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        req: &UpdatePostRequest,
    ) -> Result<Option<BlogPost>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE blog_posts SET
                title = COALESCE(?, title),
                slug = COALESCE(?, slug),
                excerpt = COALESCE(?, excerpt),
                content = COALESCE(?, content),
                featured_image = COALESCE(?, featured_image),
                content_type = COALESCE(?, content_type),
                read_time = COALESCE(?, read_time),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.title)
        .bind(&req.slug)
        .bind(&req.excerpt)
        .bind(&req.content)
        .bind(&req.featured_image)
        .bind(&req.content_type)
        .bind(&req.read_time)
        .bind(crate::db::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        if let Some(tags) = &req.tags {
            set_tags(&mut tx, id, tags).await?;
        }
        tx.commit().await?;

        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM blog_posts")
            .fetch_one(pool)
            .await
    }

    pub async fn total_views(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COALESCE(SUM(view_count), 0) FROM blog_posts")
            .fetch_one(pool)
            .await
    }

    pub async fn slug_exists(pool: &SqlitePool, slug: &str) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blog_posts WHERE slug = ?")
            .bind(slug)
            .fetch_one(pool)
            .await?;
        Ok(count > 0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlogTag {
    pub id: i64,
    pub name: String,
    pub color: Option<String>,
    pub count: i64,
}

impl BlogTag {
    /// Every tag ordered by name, with the number of posts carrying it
    pub async fn list_with_counts(pool: &SqlitePool) -> Result<Vec<BlogTag>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT t.id, t.name, t.color, COUNT(pt.post_id) AS count
            FROM blog_tags t
            LEFT JOIN blog_post_tags pt ON pt.tag_id = t.id
            GROUP BY t.id
            ORDER BY t.name
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Most used tags first; unused tags are left out
    pub async fn popular(pool: &SqlitePool, limit: i64) -> Result<Vec<BlogTag>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT t.id, t.name, t.color, COUNT(pt.post_id) AS count
            FROM blog_tags t
            JOIN blog_post_tags pt ON pt.tag_id = t.id
            GROUP BY t.id
            ORDER BY count DESC, t.name ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: String,
    pub content: String,
    pub created_at: String,
    pub author_name: String,
    pub author_avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.post_id, c.user_id, c.content, c.created_at,
           u.name AS author_name, u.avatar_url AS author_avatar
    FROM blog_comments c
    JOIN users u ON u.id = c.user_id
"#;

impl Comment {
    /// Comments on a post, oldest first
    pub async fn list_for_post(
        pool: &SqlitePool,
        post_id: i64,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let sql = format!("{} WHERE c.post_id = ? ORDER BY c.created_at ASC, c.id ASC", COMMENT_SELECT);
        sqlx::query_as(&sql).bind(post_id).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Comment>, sqlx::Error> {
        let sql = format!("{} WHERE c.id = ?", COMMENT_SELECT);
        sqlx::query_as(&sql).bind(id).fetch_optional(pool).await
    }

    pub async fn create(
        pool: &SqlitePool,
        post_id: i64,
        user_id: &str,
        content: &str,
    ) -> Result<Comment, sqlx::Error> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO blog_comments (post_id, user_id, content, created_at) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(post_id)
        .bind(user_id)
        .bind(content)
        .bind(crate::db::now())
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM blog_comments WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
