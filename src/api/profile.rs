//! Profile endpoints.

use axum::{extract::State, Json};
use std::sync::Arc;

use super::activity::record_activity;
use super::auth::AdminUser;
use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_email, validate_required, validate_url, MAX_NAME_LENGTH, MAX_TITLE_LENGTH};
use crate::db::{
    actions, resource_types, FullProfile, Profile, Project, ProjectResponse, Skill,
    UpdateProfileRequest, User,
};
use crate::AppState;

/// The profile an admin edits: their own, else the site's first profile
pub(crate) async fn owner_profile(state: &AppState, user: Option<&User>) -> Result<Profile, ApiError> {
    if let Some(user) = user {
        if let Some(profile) = Profile::get(&state.db, Some(&user.id)).await? {
            return Ok(profile);
        }
    }
    Profile::get(&state.db, None)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))
}

fn validate_update_request(req: &UpdateProfileRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Some(name) = &req.name {
        errors.check("name", validate_required(name, "Name", MAX_NAME_LENGTH));
    }
    if let Some(title) = &req.title {
        if title.chars().count() > MAX_TITLE_LENGTH {
            errors.add("title", format!("Title is too long (max {} characters)", MAX_TITLE_LENGTH));
        }
    }
    if let Some(email) = req.email.as_deref().filter(|e| !e.is_empty()) {
        errors.check("email", validate_email(email));
    }
    errors.check("avatar_url", validate_url(&req.avatar_url));
    errors.check("github_url", validate_url(&req.github_url));
    errors.check("linkedin_url", validate_url(&req.linkedin_url));
    errors.check("twitter_url", validate_url(&req.twitter_url));
    errors.check("resume_url", validate_url(&req.resume_url));

    errors.finish()
}

/// GET /api/profile - profile with every section
pub async fn get_full_profile(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FullProfile>, ApiError> {
    let full = FullProfile::load(&state.db, None)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;
    Ok(Json(full))
}

/// PUT /api/profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    validate_update_request(&req)?;

    let profile = owner_profile(&state, Some(&user)).await?;
    let updated = Profile::update(&state.db, &profile.id, &req)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    record_activity(
        &state,
        actions::PROFILE_UPDATE,
        resource_types::PROFILE,
        Some(&updated.id),
        Some(&updated.name),
        Some(&user.id),
    )
    .await;

    Ok(Json(updated))
}

/// GET /api/profile/skills/featured
pub async fn featured_skills(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Skill>>, ApiError> {
    let profile = owner_profile(&state, None).await?;
    Ok(Json(Skill::list(&state.db, &profile.id, true).await?))
}

/// GET /api/profile/projects/featured
pub async fn featured_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    let profile = owner_profile(&state, None).await?;
    let projects = Project::list(&state.db, &profile.id, true).await?;
    Ok(Json(projects.into_iter().map(ProjectResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_update_request() {
        let ok = UpdateProfileRequest {
            name: Some("Jane".to_string()),
            github_url: Some("https://github.com/jane".to_string()),
            email: Some(String::new()),
            ..Default::default()
        };
        assert!(validate_update_request(&ok).is_ok());

        let bad = UpdateProfileRequest {
            name: Some("  ".to_string()),
            email: Some("nope".to_string()),
            ..Default::default()
        };
        assert!(validate_update_request(&bad).is_err());
    }
}
