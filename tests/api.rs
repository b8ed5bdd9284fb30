//! End-to-end tests driving the router against an in-memory database.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use folio::config::Config;
use folio::notifications::{ContactNotification, Notifier, NotifyError};
use folio::AppState;

const ADMIN_PASSWORD: &str = "Sup3rSecretPass";

async fn test_app() -> Router {
    let mut config = Config::default();
    config.rate_limit.enabled = false;
    let db = folio::db::init_in_memory().await.unwrap();
    folio::api::create_router(Arc::new(AppState::new(config, db)))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Run first-time setup and return the admin's token
async fn setup_admin(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/setup",
        None,
        Some(json!({
            "email": "owner@example.com",
            "password": ADMIN_PASSWORD,
            "name": "Owner",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["token"].as_str().unwrap().to_string()
}

/// Register a regular visitor account and return its token
async fn signup_user(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({
            "email": email,
            "password": "visitor-pass",
            "confirm_password": "visitor-pass",
            "name": "Visitor",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["token"].as_str().unwrap().to_string()
}

async fn create_post(app: &Router, token: &str, title: &str, tags: &[&str]) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/blog/posts",
        Some(token),
        Some(json!({
            "title": title,
            "excerpt": "Short summary",
            "content": format!("Body of {}", title),
            "tags": tags,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

#[tokio::test]
async fn test_health() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_created_post_is_retrievable_by_slug() {
    let app = test_app().await;
    let admin = setup_admin(&app).await;

    let post = create_post(&app, &admin, "Hello Rust", &["rust"]).await;
    assert_eq!(post["slug"], "hello-rust");

    let (status, body) = send(&app, Method::GET, "/api/blog/posts/hello-rust", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Hello Rust");
    assert_eq!(body["tags"], json!(["rust"]));

    let (status, _) = send(&app, Method::GET, "/api/blog/posts/missing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_slug_conflicts() {
    let app = test_app().await;
    let admin = setup_admin(&app).await;
    create_post(&app, &admin, "Same Title", &[]).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/blog/posts",
        Some(&admin),
        Some(json!({ "title": "Same Title", "content": "again" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");
}

#[tokio::test]
async fn test_viewing_post_increments_view_count() {
    let app = test_app().await;
    let admin = setup_admin(&app).await;
    create_post(&app, &admin, "Counted", &[]).await;

    let (_, first) = send(&app, Method::GET, "/api/blog/posts/counted", None, None).await;
    let (_, second) = send(&app, Method::GET, "/api/blog/posts/counted", None, None).await;
    assert_eq!(first["view_count"], 1);
    assert_eq!(second["view_count"], 2);

    let (_, stats) = send(&app, Method::GET, "/api/admin/stats", Some(&admin), None).await;
    assert_eq!(stats["total_views"], 2);
    assert_eq!(stats["total_posts"], 1);
}

#[tokio::test]
async fn test_tag_filter_and_search() {
    let app = test_app().await;
    let admin = setup_admin(&app).await;
    create_post(&app, &admin, "Ownership Explained", &["rust"]).await;
    create_post(&app, &admin, "Goroutines", &["go"]).await;
    create_post(&app, &admin, "Async Rust", &["rust", "async"]).await;

    let (status, body) = send(&app, Method::GET, "/api/blog/posts?tag=rust", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    for item in body["items"].as_array().unwrap() {
        let tags = item["tags"].as_array().unwrap();
        assert!(tags.iter().any(|t| t == "rust"));
    }

    let (_, body) = send(&app, Method::GET, "/api/blog/posts?q=GOROUTINES", None, None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["slug"], "goroutines");

    let (_, body) = send(&app, Method::GET, "/api/blog/posts?per_page=2&page=2", None, None).await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let (_, tags) = send(&app, Method::GET, "/api/blog/tags/popular", None, None).await;
    assert_eq!(tags[0]["name"], "rust");
    assert_eq!(tags[0]["count"], 2);
}

#[tokio::test]
async fn test_deleted_section_leaves_listing() {
    let app = test_app().await;
    let admin = setup_admin(&app).await;

    let (status, section) = send(
        &app,
        Method::POST,
        "/api/about-sections",
        Some(&admin),
        Some(json!({ "title": "Background", "content": "Where I come from" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", section);
    let id = section["id"].as_str().unwrap().to_string();

    let (_, list) = send(&app, Method::GET, "/api/about-sections", None, None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let uri = format!("/api/about-sections/{}", id);
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, list) = send(&app, Method::GET, "/api/about-sections", None, None).await;
    assert!(list.as_array().unwrap().is_empty());

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_skill_validation() {
    let app = test_app().await;
    let admin = setup_admin(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/skills",
        Some(&admin),
        Some(json!({ "name": "Rust", "category": "language", "proficiency": 140 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["details"]["proficiency"].is_array());
}

#[tokio::test]
async fn test_contact_requires_login() {
    let app = test_app().await;
    setup_admin(&app).await;

    let message = json!({
        "name": "Jane",
        "email": "jane@example.com",
        "subject": "Hello",
        "message": "Nice site!",
    });

    let (status, body) = send(&app, Method::POST, "/api/contact", None, Some(message.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");

    let visitor = signup_user(&app, "jane@example.com").await;
    let (status, body) = send(&app, Method::POST, "/api/contact", Some(&visitor), Some(message)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_admin_inbox_flow() {
    let app = test_app().await;
    let admin = setup_admin(&app).await;
    let visitor = signup_user(&app, "visitor@example.com").await;

    send(
        &app,
        Method::POST,
        "/api/contact",
        Some(&visitor),
        Some(json!({
            "name": "Visitor",
            "email": "visitor@example.com",
            "subject": "Question",
            "message": "Are you available?",
        })),
    )
    .await;

    let (_, inbox) = send(&app, Method::GET, "/api/admin/messages", Some(&admin), None).await;
    assert_eq!(inbox["counts"]["unread"], 1);
    let id = inbox["messages"][0]["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/admin/messages/{}", id),
        Some(&admin),
        Some(json!({ "status": "replied" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "replied");

    let (_, unread) = send(&app, Method::GET, "/api/admin/messages?status=unread", Some(&admin), None).await;
    assert!(unread["messages"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_non_admin_is_forbidden() {
    let app = test_app().await;
    setup_admin(&app).await;
    let visitor = signup_user(&app, "visitor@example.com").await;

    let (status, _) = send(&app, Method::GET, "/api/admin/stats", Some(&visitor), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/blog/posts",
        Some(&visitor),
        Some(json!({ "title": "Nope", "content": "Nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::GET, "/api/admin/stats", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_comment_delete_permissions() {
    let app = test_app().await;
    let admin = setup_admin(&app).await;
    create_post(&app, &admin, "Discuss", &[]).await;
    let author = signup_user(&app, "author@example.com").await;
    let other = signup_user(&app, "other@example.com").await;

    let (status, comment) = send(
        &app,
        Method::POST,
        "/api/blog/posts/discuss/comments",
        Some(&author),
        Some(json!({ "content": "First!" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/blog/comments/{}", comment["id"]);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/blog/posts/discuss/comments",
        Some(&author),
        Some(json!({ "content": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&author), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, comments) = send(&app, Method::GET, "/api/blog/posts/discuss/comments", None, None).await;
    assert!(comments.as_array().unwrap().is_empty());
}

/// Forwards every notification to a channel
struct ChannelNotifier(tokio::sync::mpsc::UnboundedSender<ContactNotification>);

#[async_trait::async_trait]
impl Notifier for ChannelNotifier {
    async fn notify_contact(&self, notification: &ContactNotification) -> Result<(), NotifyError> {
        self.0
            .send(notification.clone())
            .map_err(|e| NotifyError::Transport(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "channel"
    }
}

#[tokio::test]
async fn test_contact_notifies_owner() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut config = Config::default();
    config.rate_limit.enabled = false;
    config.site.title = "Dev Notes".to_string();
    let db = folio::db::init_in_memory().await.unwrap();
    let state = AppState::new(config, db).with_notifier(Arc::new(ChannelNotifier(tx)));
    let app = folio::api::create_router(Arc::new(state));

    setup_admin(&app).await;
    let visitor = signup_user(&app, "visitor@example.com").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/contact",
        Some(&visitor),
        Some(json!({
            "name": "Visitor",
            "email": "visitor@example.com",
            "subject": "Collaboration",
            "message": "Let's build something.",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let notification = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(notification.site_title, "Dev Notes");
    assert_eq!(notification.subject, "Collaboration");
}

#[tokio::test]
async fn test_search_tag_counts() {
    let app = test_app().await;
    let admin = setup_admin(&app).await;
    create_post(&app, &admin, "Rust Traits", &["rust", "types"]).await;
    create_post(&app, &admin, "Rust Lifetimes", &["rust"]).await;
    create_post(&app, &admin, "Haskell Types", &["types"]).await;

    let (status, counts) = send(&app, Method::GET, "/api/blog/tags/counts?q=rust", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(counts, json!([{ "name": "rust", "count": 2 }, { "name": "types", "count": 1 }]));
}

#[tokio::test]
async fn test_page_far_past_the_end_is_empty() {
    let app = test_app().await;
    let admin = setup_admin(&app).await;
    create_post(&app, &admin, "Only Post", &[]).await;

    let uri = format!("/api/blog/posts?page={}", i64::MAX);
    let (status, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert!(body["items"].as_array().unwrap().is_empty());

    let uri = format!("/api/admin/activity?page={}", i64::MAX);
    let (status, body) = send(&app, Method::GET, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_admin_token_grants_nothing() {
    let mut config = Config::default();
    config.rate_limit.enabled = false;
    config.auth.admin_token = String::new();
    let db = folio::db::init_in_memory().await.unwrap();
    let app = folio::api::create_router(Arc::new(AppState::new(config, db)));

    for (name, value) in [("X-API-Key", ""), ("Authorization", "Bearer ")] {
        let request = Request::builder()
            .uri("/api/admin/stats")
            .header(name, value)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", name);
    }
}

#[tokio::test]
async fn test_contact_surfaces_database_failure() {
    let mut config = Config::default();
    config.rate_limit.enabled = false;
    let db = folio::db::init_in_memory().await.unwrap();
    let app = folio::api::create_router(Arc::new(AppState::new(config, db.clone())));

    setup_admin(&app).await;
    let visitor = signup_user(&app, "visitor@example.com").await;
    db.close().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/contact",
        Some(&visitor),
        Some(json!({
            "name": "Visitor",
            "email": "visitor@example.com",
            "subject": "Hello",
            "message": "Is anyone there?",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", body);
}
