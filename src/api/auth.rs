//! Accounts, sessions and the request extractors that gate endpoints.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderMap, StatusCode},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use std::sync::Arc;
use subtle::ConstantTimeEq;

use super::activity::record_activity;
use super::error::{ApiError, ErrorCode, ValidationErrorBuilder};
use super::validation::{validate_admin_password, validate_email, validate_required, MAX_NAME_LENGTH};
use crate::config::AuthConfig;
use crate::db::{
    actions, resource_types, roles, LoginRequest, LoginResponse, Profile, Session, SignupRequest,
    UpdateUserRequest, User, UserResponse,
};
use crate::i18n::Message;
use crate::AppState;

pub const SESSION_COOKIE: &str = "folio_session";

/// User id reported for requests authenticated with the configured admin token
pub const SYSTEM_USER_ID: &str = "system";

#[derive(Serialize)]
pub struct SetupStatusResponse {
    pub needs_setup: bool,
}

#[derive(Deserialize)]
pub struct SetupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt_bytes: [u8; 16] = rand::rng().random();
    let salt = SaltString::encode_b64(&salt_bytes)?;
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}

/// Sessions store only the SHA-256 of the bearer token
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Token from `Authorization: Bearer`, `X-API-Key`, or the session cookie
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
    {
        return Some(token.trim().to_string());
    }

    if let Some(api_key) = headers.get("X-API-Key").and_then(|h| h.to_str().ok()) {
        return Some(api_key.trim().to_string());
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
}

fn system_admin() -> User {
    let now = crate::db::now();
    User {
        id: SYSTEM_USER_ID.to_string(),
        email: "system@folio.local".to_string(),
        password_hash: String::new(),
        name: "System Admin".to_string(),
        avatar_url: None,
        role: roles::ADMIN.to_string(),
        created_at: now.clone(),
        updated_at: now,
    }
}

/// Resolve a token to its user; `None` for unknown or expired tokens
pub async fn get_current_user(
    pool: &SqlitePool,
    config: &AuthConfig,
    token: &str,
) -> Result<Option<User>, sqlx::Error> {
    if token.is_empty() {
        return Ok(None);
    }

    let admin_token = config.admin_token.as_bytes();
    let provided = token.as_bytes();
    if !admin_token.is_empty()
        && admin_token.len() == provided.len()
        && bool::from(admin_token.ct_eq(provided))
    {
        return Ok(Some(system_admin()));
    }

    let Some(session) = Session::find_valid(pool, &hash_token(token)).await? else {
        return Ok(None);
    };
    User::find_by_id(pool, &session.user_id).await
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for User {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let locale = state.config.site.locale;
        let token = extract_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized(locale.text(Message::LoginRequired)))?;

        get_current_user(&state.db, &state.config.auth, &token)
            .await?
            .ok_or_else(|| ApiError::unauthorized(locale.text(Message::LoginRequired)))
    }
}

/// An authenticated user with the admin role; 403 for everyone else
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = User::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(ApiError::forbidden(
                state.config.site.locale.text(Message::AdminRequired),
            ));
        }
        Ok(AdminUser(user))
    }
}

/// Resolve an optional-login extraction. A missing or stale login becomes a
/// 401 carrying `message`; lookup failures pass through unchanged.
pub fn require_login(user: Result<User, ApiError>, message: &str) -> Result<User, ApiError> {
    user.map_err(|e| {
        if e.code() == ErrorCode::Unauthorized {
            ApiError::unauthorized(message)
        } else {
            e
        }
    })
}

/// Create a session for `user` and attach its cookie to `jar`
async fn start_session(
    state: &AppState,
    jar: CookieJar,
    user: User,
) -> Result<(CookieJar, LoginResponse), ApiError> {
    let token = generate_token();
    Session::create(
        &state.db,
        &user.id,
        &hash_token(&token),
        state.config.auth.session_ttl_days,
    )
    .await?;

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.auth.secure_cookies)
        .build();

    Ok((
        jar.add(cookie),
        LoginResponse {
            token,
            user: UserResponse::from(user),
        },
    ))
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, CookieJar, Json<LoginResponse>), ApiError> {
    let locale = state.config.site.locale;
    let email = normalize_email(&request.email);

    let mut errors = ValidationErrorBuilder::new();
    errors.check("email", validate_email(&email));
    errors.check("name", validate_required(&request.name, "Name", MAX_NAME_LENGTH));
    if request.password.chars().count() < state.config.auth.min_password_length {
        errors.add("password", locale.text(Message::PasswordTooShort));
    }
    if let Some(confirm) = &request.confirm_password {
        if confirm != &request.password {
            errors.add("confirm_password", locale.text(Message::PasswordMismatch));
        }
    }
    errors.finish()?;

    if User::find_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::conflict(locale.text(Message::EmailTaken)));
    }

    let password_hash = hash_password(&request.password)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))?;
    let user = User::create(
        &state.db,
        &email,
        &password_hash,
        request.name.trim(),
        roles::USER,
    )
    .await?;

    tracing::info!(user_id = %user.id, "New account registered");
    record_activity(
        &state,
        actions::AUTH_SIGNUP,
        resource_types::USER,
        Some(&user.id),
        Some(&user.name),
        Some(&user.id),
    )
    .await;

    let (jar, response) = start_session(&state, jar, user).await?;
    Ok((StatusCode::CREATED, jar, Json(response)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let invalid = || ApiError::unauthorized(state.config.site.locale.text(Message::InvalidCredentials));

    let user = User::find_by_email(&state.db, &normalize_email(&request.email))
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&request.password, &user.password_hash) {
        tracing::debug!(user_id = %user.id, "Rejected login with wrong password");
        return Err(invalid());
    }

    let (jar, response) = start_session(&state, jar, user).await?;
    Ok((jar, Json(response)))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ApiError> {
    if let Some(token) = extract_token(&headers) {
        Session::delete_by_token_hash(&state.db, &hash_token(&token)).await?;
    }

    let removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    Ok((jar.remove(removal), StatusCode::NO_CONTENT))
}

/// GET /api/auth/me
pub async fn me(user: User) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

/// PUT /api/auth/me
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    user: User,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if let Some(name) = &request.name {
        errors.check("name", validate_required(name, "Name", MAX_NAME_LENGTH));
    }
    errors.check("avatar_url", super::validation::validate_url(&request.avatar_url));
    errors.finish()?;

    let updated = User::update(&state.db, &user.id, &request)
        .await?
        .ok_or_else(|| ApiError::not_found(state.config.site.locale.text(Message::UserNotFound)))?;
    Ok(Json(UserResponse::from(updated)))
}

/// GET /api/auth/setup-status
pub async fn setup_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SetupStatusResponse>, ApiError> {
    let count = User::count(&state.db).await?;
    Ok(Json(SetupStatusResponse {
        needs_setup: count == 0,
    }))
}

/// POST /api/auth/setup - creates the first admin account and its profile
pub async fn setup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<SetupRequest>,
) -> Result<(StatusCode, CookieJar, Json<LoginResponse>), ApiError> {
    if User::count(&state.db).await? > 0 {
        return Err(ApiError::forbidden("Setup has already been completed"));
    }

    let email = normalize_email(&request.email);
    let mut errors = ValidationErrorBuilder::new();
    errors.check("email", validate_email(&email));
    errors.check("password", validate_admin_password(&request.password));
    errors.check("name", validate_required(&request.name, "Name", MAX_NAME_LENGTH));
    errors.finish()?;

    let password_hash = hash_password(&request.password)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))?;
    let user = User::create(
        &state.db,
        &email,
        &password_hash,
        request.name.trim(),
        roles::ADMIN,
    )
    .await?;
    Profile::ensure_for_user(&state.db, &user.id, &user.name).await?;

    tracing::info!("Created admin user during setup: {}", user.email);
    record_activity(
        &state,
        actions::AUTH_SETUP,
        resource_types::USER,
        Some(&user.id),
        Some(&user.name),
        Some(&user.id),
    )
    .await;

    let (jar, response) = start_session(&state, jar, user).await?;
    Ok((StatusCode::CREATED, jar, Json(response)))
}

/// Create the configured admin account at startup if it does not exist yet
pub async fn ensure_admin_user(pool: &SqlitePool, config: &AuthConfig) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };
    let email = normalize_email(email);

    if let Some(existing) = User::find_by_email(pool, &email).await? {
        if !existing.is_admin() {
            tracing::warn!(
                "Configured admin {} exists without the admin role; run `folio users promote`",
                email
            );
        }
        return Ok(());
    }

    if let Err(reason) = validate_admin_password(password) {
        tracing::warn!("Configured admin password is weak: {}", reason);
    }

    let password_hash = hash_password(password)
        .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {}", e))?;
    let user = User::create(pool, &email, &password_hash, "Admin", roles::ADMIN).await?;
    Profile::ensure_for_user(pool, &user.id, &user.name).await?;

    tracing::info!("Created admin user {}", email);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_in_memory;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("anything", "not-a-hash"));
    }

    #[test]
    fn test_tokens_are_random_and_hashed() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert_eq!(hash_token(&a), hash_token(&a));
        assert_ne!(hash_token(&a), a);
    }

    #[test]
    fn test_extract_token_sources() {
        let mut headers = HeaderMap::new();
        assert!(extract_token(&headers).is_none());

        headers.insert("cookie", "folio_session=from-cookie".parse().unwrap());
        assert_eq!(extract_token(&headers).as_deref(), Some("from-cookie"));

        headers.insert("X-API-Key", "from-key".parse().unwrap());
        assert_eq!(extract_token(&headers).as_deref(), Some("from-key"));

        headers.insert("Authorization", "Bearer from-bearer".parse().unwrap());
        assert_eq!(extract_token(&headers).as_deref(), Some("from-bearer"));
    }

    #[tokio::test]
    async fn test_get_current_user() {
        let pool = init_in_memory().await.unwrap();
        let config = AuthConfig {
            admin_token: "configured-admin-token".to_string(),
            ..Default::default()
        };

        let admin = get_current_user(&pool, &config, "configured-admin-token")
            .await
            .unwrap()
            .unwrap();
        assert!(admin.is_admin());
        assert_eq!(admin.id, SYSTEM_USER_ID);

        let user = User::create(&pool, "r@example.com", "h", "R", roles::USER).await.unwrap();
        let token = generate_token();
        Session::create(&pool, &user.id, &hash_token(&token), 1).await.unwrap();

        let found = get_current_user(&pool, &config, &token).await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(get_current_user(&pool, &config, "bogus").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_tokens_never_authenticate() {
        let pool = init_in_memory().await.unwrap();
        let config = AuthConfig {
            admin_token: String::new(),
            ..Default::default()
        };
        assert!(get_current_user(&pool, &config, "").await.unwrap().is_none());

        let mut headers = HeaderMap::new();
        headers.insert("X-API-Key", "".parse().unwrap());
        let token = extract_token(&headers).unwrap();
        assert!(get_current_user(&pool, &config, &token).await.unwrap().is_none());
    }

    #[test]
    fn test_require_login_keeps_lookup_failures() {
        let missing = require_login(Err(ApiError::unauthorized("nope")), "Please sign in");
        let err = missing.err().unwrap();
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.to_string(), "[unauthorized] Please sign in");

        let outage = require_login(Err(ApiError::database("down")), "Please sign in");
        assert_eq!(outage.err().unwrap().code(), ErrorCode::DatabaseError);
    }

    #[tokio::test]
    async fn test_ensure_admin_user_creates_once() {
        let pool = init_in_memory().await.unwrap();
        let config = AuthConfig {
            admin_email: Some(" Owner@Example.com ".to_string()),
            admin_password: Some("Sufficiently1Strong".to_string()),
            ..Default::default()
        };

        ensure_admin_user(&pool, &config).await.unwrap();
        ensure_admin_user(&pool, &config).await.unwrap();

        assert_eq!(User::count(&pool).await.unwrap(), 1);
        let admin = User::find_by_email(&pool, "owner@example.com").await.unwrap().unwrap();
        assert!(admin.is_admin());
        assert!(Profile::get(&pool, Some(&admin.id)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_ensure_admin_user_skips_without_credentials() {
        let pool = init_in_memory().await.unwrap();
        ensure_admin_user(&pool, &AuthConfig::default()).await.unwrap();
        assert_eq!(User::count(&pool).await.unwrap(), 0);
    }
}
