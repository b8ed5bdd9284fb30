//! Contact form submission and the admin inbox.

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
use super::metrics::record_contact_message;
use super::validation::{
    validate_email, validate_required, MAX_MESSAGE_LENGTH, MAX_NAME_LENGTH, MAX_SUBJECT_LENGTH,
};
use crate::db::{
    actions, resource_types, ContactMessage, MessageListResponse, MessageStatus,
    SubmitMessageRequest, SubmitMessageResponse, UpdateMessageStatusRequest, User,
};
use crate::i18n::Message;
use crate::notifications::{notify_in_background, ContactNotification};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct MessageListQuery {
    pub status: Option<MessageStatus>,
}

fn validate_submission(req: &SubmitMessageRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors.check("name", validate_required(&req.name, "Name", MAX_NAME_LENGTH));
    errors.check("email", validate_email(&req.email));
    errors.check("subject", validate_required(&req.subject, "Subject", MAX_SUBJECT_LENGTH));
    errors.check("message", validate_required(&req.message, "Message", MAX_MESSAGE_LENGTH));
    errors.finish()
}

/// POST /api/contact - signed-in visitors only
pub async fn submit_message(
    State(state): State<Arc<AppState>>,
    user: Result<User, ApiError>,
    Json(req): Json<SubmitMessageRequest>,
) -> Result<(StatusCode, Json<SubmitMessageResponse>), ApiError> {
    let locale = state.config.site.locale;
    let user = require_login(user, locale.text(Message::LoginRequired))?;

    // The session may outlive the account
    if User::find_by_id(&state.db, &user.id).await?.is_none() {
        return Err(ApiError::unauthorized(locale.text(Message::UserNotFound)));
    }

    validate_submission(&req)?;

    let message = ContactMessage::create(&state.db, &user.id, &req)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to store contact message");
            ApiError::internal(locale.text(Message::MessageSaveFailed))
        })?;

    tracing::info!(message_id = message.id, from = %message.sender_email, "Contact message received");
    record_contact_message();
    record_activity(
        &state,
        actions::MESSAGE_RECEIVE,
        resource_types::MESSAGE,
        Some(&message.id.to_string()),
        Some(&message.subject),
        Some(&user.id),
    )
    .await;

    notify_in_background(
        state.notifier.clone(),
        ContactNotification::from_message(&state.config.site.title, &message),
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitMessageResponse {
            success: true,
            message: locale.text(Message::MessageSent).to_string(),
        }),
    ))
}

/// GET /api/admin/messages?status=unread
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<MessageListQuery>,
) -> Result<Json<MessageListResponse>, ApiError> {
    let messages = ContactMessage::list(&state.db, query.status).await?;
    let counts = ContactMessage::counts_by_status(&state.db).await?;
    Ok(Json(MessageListResponse { messages, counts }))
}

/// PUT /api/admin/messages/:id
pub async fn update_message_status(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateMessageStatusRequest>,
) -> Result<Json<ContactMessage>, ApiError> {
    let message = ContactMessage::update_status(&state.db, id, req.status)
        .await?
        .ok_or_else(|| ApiError::not_found("Message not found"))?;

    record_activity(
        &state,
        actions::MESSAGE_UPDATE,
        resource_types::MESSAGE,
        Some(&id.to_string()),
        Some(&message.status),
        Some(&user.id),
    )
    .await;

    Ok(Json(message))
}

/// DELETE /api/admin/messages/:id
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !ContactMessage::delete(&state.db, id).await? {
        return Err(ApiError::not_found("Message not found"));
    }

    record_activity(
        &state,
        actions::MESSAGE_DELETE,
        resource_types::MESSAGE,
        Some(&id.to_string()),
        None,
        Some(&user.id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, subject: &str, message: &str) -> SubmitMessageRequest {
        SubmitMessageRequest {
            name: name.to_string(),
            email: email.to_string(),
            subject: subject.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_validate_submission() {
        assert!(validate_submission(&request("Jane", "jane@example.com", "Hi", "Hello")).is_ok());
        assert!(validate_submission(&request("", "jane@example.com", "Hi", "Hello")).is_err());
        assert!(validate_submission(&request("Jane", "not-an-email", "Hi", "Hello")).is_err());
        assert!(validate_submission(&request("Jane", "jane@example.com", "Hi", "  ")).is_err());
    }

    #[test]
    fn test_validate_submission_message_length() {
        let long = "a".repeat(MAX_MESSAGE_LENGTH + 1);
        assert!(validate_submission(&request("Jane", "jane@example.com", "Hi", &long)).is_err());
    }
}
