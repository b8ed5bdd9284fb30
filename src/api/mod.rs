mod activity;
mod admin;
pub mod auth;
mod blog;
mod contact;
pub mod error;
pub mod metrics;
mod profile;
pub mod rate_limit;
mod sections;
pub mod validation;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me).put(auth::update_me))
        .route("/setup-status", get(auth::setup_status))
        .route("/setup", post(auth::setup));

    let profile_routes = Router::new()
        .route("/", get(profile::get_full_profile).put(profile::update_profile))
        .route("/skills/featured", get(profile::featured_skills))
        .route("/projects/featured", get(profile::featured_projects));

    let blog_routes = Router::new()
        .route("/posts", get(blog::list_posts).post(blog::create_post))
        .route("/posts/id/:id", put(blog::update_post).delete(blog::delete_post))
        .route("/posts/:slug", get(blog::get_post))
        .route(
            "/posts/:slug/comments",
            get(blog::list_comments).post(blog::add_comment),
        )
        .route("/comments/:id", delete(blog::delete_comment))
        .route("/tags", get(blog::list_tags))
        .route("/tags/popular", get(blog::popular_tags))
        .route("/tags/counts", get(blog::search_tag_counts));

    let admin_routes = Router::new()
        .route("/stats", get(admin::stats))
        .route("/activity", get(activity::list))
        .route("/messages", get(contact::list_messages))
        .route(
            "/messages/:id",
            put(contact::update_message_status).delete(contact::delete_message),
        );

    let api_routes = Router::new()
        // About sections
        .route(
            "/about-sections",
            get(sections::list_about_sections).post(sections::create_about_section),
        )
        .route(
            "/about-sections/:id",
            put(sections::update_about_section).delete(sections::delete_about_section),
        )
        // Skills
        .route("/skills", get(sections::list_skills).post(sections::create_skill))
        .route(
            "/skills/:id",
            put(sections::update_skill).delete(sections::delete_skill),
        )
        // Projects
        .route(
            "/projects",
            get(sections::list_projects).post(sections::create_project),
        )
        .route(
            "/projects/:id",
            put(sections::update_project).delete(sections::delete_project),
        )
        // Educations
        .route(
            "/educations",
            get(sections::list_educations).post(sections::create_education),
        )
        .route(
            "/educations/:id",
            put(sections::update_education).delete(sections::delete_education),
        )
        // Interests
        .route(
            "/interests",
            get(sections::list_interests).post(sections::create_interest),
        )
        .route(
            "/interests/:id",
            put(sections::update_interest).delete(sections::delete_interest),
        )
        // Contact
        .route("/contact", post(contact::submit_message))
        .nest("/auth", auth_routes)
        .nest("/profile", profile_routes)
        .nest("/blog", blog_routes)
        .nest("/admin", admin_routes);

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics::metrics_endpoint))
        .nest("/api", api_routes)
        // Tiers are chosen from the full request path, so this sits outside `nest`
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit,
        ))
        .layer(middleware::from_fn(metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
