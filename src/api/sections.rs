//! Portfolio section endpoints: about sections, skills, projects,
//! educations and interests.
//!
//! Lists are public and scoped to the owner profile; writes need an admin.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use super::activity::record_activity;
use super::auth::AdminUser;
use super::error::{ApiError, ValidationErrorBuilder};
use super::profile::owner_profile;
use super::validation::{
    validate_date, validate_education_type, validate_proficiency, validate_project_type,
    validate_required, validate_url, validate_years, MAX_NAME_LENGTH, MAX_TITLE_LENGTH,
};
use crate::db::{
    actions, resource_types, AboutSection, CreateAboutSectionRequest, CreateEducationRequest,
    CreateInterestRequest, CreateProjectRequest, CreateSkillRequest, Education, Interest, Project,
    ProjectResponse, Skill, UpdateAboutSectionRequest, UpdateEducationRequest,
    UpdateInterestRequest, UpdateProjectRequest, UpdateSkillRequest, User,
};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Only featured entries (skills, projects)
    #[serde(default)]
    pub featured: bool,
    /// Include hidden about sections; honored for admins only
    #[serde(default)]
    pub all: bool,
}

async fn log_change(
    state: &AppState,
    action: &str,
    resource_type: &str,
    id: &str,
    name: &str,
    user: &User,
) {
    record_activity(state, action, resource_type, Some(id), Some(name), Some(&user.id)).await;
}

// ---------------------------------------------------------------------------
// About sections
// ---------------------------------------------------------------------------

fn validate_section(title: Option<&str>, content: Option<&str>) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if let Some(title) = title {
        errors.check("title", validate_required(title, "Title", MAX_TITLE_LENGTH));
    }
    if let Some(content) = content {
        if content.trim().is_empty() {
            errors.add("content", "Content is required");
        }
    }
    errors.finish()
}

/// GET /api/about-sections
pub async fn list_about_sections(
    State(state): State<Arc<AppState>>,
    user: Option<User>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<AboutSection>>, ApiError> {
    let profile = owner_profile(&state, None).await?;
    let is_admin = user.as_ref().is_some_and(|u| u.is_admin());

    let sections = if query.all && is_admin {
        AboutSection::list_all(&state.db, &profile.id).await?
    } else {
        AboutSection::list_active(&state.db, &profile.id).await?
    };
    Ok(Json(sections))
}

/// POST /api/about-sections
pub async fn create_about_section(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Json(req): Json<CreateAboutSectionRequest>,
) -> Result<(StatusCode, Json<AboutSection>), ApiError> {
    validate_section(Some(&req.title), Some(&req.content))?;

    let profile = owner_profile(&state, Some(&user)).await?;
    let section = AboutSection::create(&state.db, &profile.id, &req).await?;

    log_change(
        &state,
        actions::SECTION_CREATE,
        resource_types::ABOUT_SECTION,
        &section.id,
        &section.title,
        &user,
    )
    .await;
    Ok((StatusCode::CREATED, Json(section)))
}

/// PUT /api/about-sections/:id
pub async fn update_about_section(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateAboutSectionRequest>,
) -> Result<Json<AboutSection>, ApiError> {
    validate_section(req.title.as_deref(), req.content.as_deref())?;

    let section = AboutSection::update(&state.db, &id, &req)
        .await?
        .ok_or_else(|| ApiError::not_found("About section not found"))?;

    log_change(
        &state,
        actions::SECTION_UPDATE,
        resource_types::ABOUT_SECTION,
        &section.id,
        &section.title,
        &user,
    )
    .await;
    Ok(Json(section))
}

/// DELETE /api/about-sections/:id
pub async fn delete_about_section(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !AboutSection::delete(&state.db, &id).await? {
        return Err(ApiError::not_found("About section not found"));
    }
    log_change(
        &state,
        actions::SECTION_DELETE,
        resource_types::ABOUT_SECTION,
        &id,
        &id,
        &user,
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Skills
// ---------------------------------------------------------------------------

fn validate_skill(
    name: Option<&str>,
    category: Option<&str>,
    proficiency: Option<i64>,
    years: Option<f64>,
) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if let Some(name) = name {
        errors.check("name", validate_required(name, "Name", MAX_NAME_LENGTH));
    }
    if let Some(category) = category {
        errors.check("category", validate_required(category, "Category", MAX_NAME_LENGTH));
    }
    if let Some(proficiency) = proficiency {
        errors.check("proficiency", validate_proficiency(proficiency));
    }
    if let Some(years) = years {
        errors.check("years_of_experience", validate_years(years));
    }
    errors.finish()
}

/// GET /api/skills
pub async fn list_skills(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Skill>>, ApiError> {
    let profile = owner_profile(&state, None).await?;
    Ok(Json(Skill::list(&state.db, &profile.id, query.featured).await?))
}

/// POST /api/skills
pub async fn create_skill(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Json(req): Json<CreateSkillRequest>,
) -> Result<(StatusCode, Json<Skill>), ApiError> {
    validate_skill(
        Some(&req.name),
        Some(&req.category),
        Some(req.proficiency),
        Some(req.years_of_experience),
    )?;

    let profile = owner_profile(&state, Some(&user)).await?;
    let skill = Skill::create(&state.db, &profile.id, &req).await?;

    log_change(
        &state,
        actions::SECTION_CREATE,
        resource_types::SKILL,
        &skill.id,
        &skill.name,
        &user,
    )
    .await;
    Ok((StatusCode::CREATED, Json(skill)))
}

/// PUT /api/skills/:id
pub async fn update_skill(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateSkillRequest>,
) -> Result<Json<Skill>, ApiError> {
    validate_skill(
        req.name.as_deref(),
        req.category.as_deref(),
        req.proficiency,
        req.years_of_experience,
    )?;

    let skill = Skill::update(&state.db, &id, &req)
        .await?
        .ok_or_else(|| ApiError::not_found("Skill not found"))?;

    log_change(
        &state,
        actions::SECTION_UPDATE,
        resource_types::SKILL,
        &skill.id,
        &skill.name,
        &user,
    )
    .await;
    Ok(Json(skill))
}

/// DELETE /api/skills/:id
pub async fn delete_skill(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !Skill::delete(&state.db, &id).await? {
        return Err(ApiError::not_found("Skill not found"));
    }
    log_change(&state, actions::SECTION_DELETE, resource_types::SKILL, &id, &id, &user).await;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

fn validate_create_project(req: &CreateProjectRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors.check("title", validate_required(&req.title, "Title", MAX_TITLE_LENGTH));
    if req.description.trim().is_empty() {
        errors.add("description", "Description is required");
    }
    errors.check("project_type", validate_project_type(&req.project_type));
    errors.check("start_date", validate_date(&req.start_date));
    errors.check("end_date", validate_date(&req.end_date));
    errors.check("project_url", validate_url(&req.project_url));
    errors.check("github_url", validate_url(&req.github_url));
    errors.check("image_url", validate_url(&req.image_url));
    errors.finish()
}

fn validate_update_project(req: &UpdateProjectRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if let Some(title) = &req.title {
        errors.check("title", validate_required(title, "Title", MAX_TITLE_LENGTH));
    }
    if let Some(project_type) = &req.project_type {
        errors.check("project_type", validate_project_type(project_type));
    }
    errors.check("start_date", validate_date(&req.start_date));
    errors.check("end_date", validate_date(&req.end_date));
    errors.check("project_url", validate_url(&req.project_url));
    errors.check("github_url", validate_url(&req.github_url));
    errors.check("image_url", validate_url(&req.image_url));
    errors.finish()
}

/// GET /api/projects
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    let profile = owner_profile(&state, None).await?;
    let projects = Project::list(&state.db, &profile.id, query.featured).await?;
    Ok(Json(projects.into_iter().map(ProjectResponse::from).collect()))
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Json(req): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiError> {
    validate_create_project(&req)?;

    let profile = owner_profile(&state, Some(&user)).await?;
    let project = Project::create(&state.db, &profile.id, &req).await?;

    log_change(
        &state,
        actions::SECTION_CREATE,
        resource_types::PROJECT,
        &project.id,
        &project.title,
        &user,
    )
    .await;
    Ok((StatusCode::CREATED, Json(ProjectResponse::from(project))))
}

/// PUT /api/projects/:id
pub async fn update_project(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateProjectRequest>,
) -> Result<Json<ProjectResponse>, ApiError> {
    validate_update_project(&req)?;

    let project = Project::update(&state.db, &id, &req)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;

    log_change(
        &state,
        actions::SECTION_UPDATE,
        resource_types::PROJECT,
        &project.id,
        &project.title,
        &user,
    )
    .await;
    Ok(Json(ProjectResponse::from(project)))
}

/// DELETE /api/projects/:id
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !Project::delete(&state.db, &id).await? {
        return Err(ApiError::not_found("Project not found"));
    }
    log_change(&state, actions::SECTION_DELETE, resource_types::PROJECT, &id, &id, &user).await;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Educations
// ---------------------------------------------------------------------------

fn validate_education(
    institution: Option<&str>,
    education_type: Option<&str>,
    start_date: &Option<String>,
    end_date: &Option<String>,
) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if let Some(institution) = institution {
        errors.check("institution", validate_required(institution, "Institution", MAX_TITLE_LENGTH));
    }
    if let Some(education_type) = education_type {
        errors.check("education_type", validate_education_type(education_type));
    }
    errors.check("start_date", validate_date(start_date));
    errors.check("end_date", validate_date(end_date));
    errors.finish()
}

/// GET /api/educations
pub async fn list_educations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Education>>, ApiError> {
    let profile = owner_profile(&state, None).await?;
    Ok(Json(Education::list(&state.db, &profile.id).await?))
}

/// POST /api/educations
pub async fn create_education(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Json(req): Json<CreateEducationRequest>,
) -> Result<(StatusCode, Json<Education>), ApiError> {
    validate_education(
        Some(&req.institution),
        Some(&req.education_type),
        &req.start_date,
        &req.end_date,
    )?;

    let profile = owner_profile(&state, Some(&user)).await?;
    let education = Education::create(&state.db, &profile.id, &req).await?;

    log_change(
        &state,
        actions::SECTION_CREATE,
        resource_types::EDUCATION,
        &education.id,
        &education.institution,
        &user,
    )
    .await;
    Ok((StatusCode::CREATED, Json(education)))
}

/// PUT /api/educations/:id
pub async fn update_education(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateEducationRequest>,
) -> Result<Json<Education>, ApiError> {
    validate_education(
        req.institution.as_deref(),
        req.education_type.as_deref(),
        &req.start_date,
        &req.end_date,
    )?;

    let education = Education::update(&state.db, &id, &req)
        .await?
        .ok_or_else(|| ApiError::not_found("Education not found"))?;

    log_change(
        &state,
        actions::SECTION_UPDATE,
        resource_types::EDUCATION,
        &education.id,
        &education.institution,
        &user,
    )
    .await;
    Ok(Json(education))
}

/// DELETE /api/educations/:id
pub async fn delete_education(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !Education::delete(&state.db, &id).await? {
        return Err(ApiError::not_found("Education not found"));
    }
    log_change(&state, actions::SECTION_DELETE, resource_types::EDUCATION, &id, &id, &user).await;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Interests
// ---------------------------------------------------------------------------

/// GET /api/interests
pub async fn list_interests(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Interest>>, ApiError> {
    let profile = owner_profile(&state, None).await?;
    Ok(Json(Interest::list(&state.db, &profile.id).await?))
}

/// POST /api/interests
pub async fn create_interest(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Json(req): Json<CreateInterestRequest>,
) -> Result<(StatusCode, Json<Interest>), ApiError> {
    validate_required(&req.name, "Name", MAX_NAME_LENGTH)
        .map_err(|e| ApiError::validation_field("name", e))?;

    let profile = owner_profile(&state, Some(&user)).await?;
    let interest = Interest::create(&state.db, &profile.id, &req).await?;

    log_change(
        &state,
        actions::SECTION_CREATE,
        resource_types::INTEREST,
        &interest.id,
        &interest.name,
        &user,
    )
    .await;
    Ok((StatusCode::CREATED, Json(interest)))
}

/// PUT /api/interests/:id
pub async fn update_interest(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateInterestRequest>,
) -> Result<Json<Interest>, ApiError> {
    if let Some(name) = &req.name {
        validate_required(name, "Name", MAX_NAME_LENGTH)
            .map_err(|e| ApiError::validation_field("name", e))?;
    }

    let interest = Interest::update(&state.db, &id, &req)
        .await?
        .ok_or_else(|| ApiError::not_found("Interest not found"))?;

    log_change(
        &state,
        actions::SECTION_UPDATE,
        resource_types::INTEREST,
        &interest.id,
        &interest.name,
        &user,
    )
    .await;
    Ok(Json(interest))
}

/// DELETE /api/interests/:id
pub async fn delete_interest(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !Interest::delete(&state.db, &id).await? {
        return Err(ApiError::not_found("Interest not found"));
    }
    log_change(&state, actions::SECTION_DELETE, resource_types::INTEREST, &id, &id, &user).await;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_skill_ranges() {
        assert!(validate_skill(Some("Rust"), Some("language"), Some(80), Some(2.0)).is_ok());
        assert!(validate_skill(None, None, Some(150), None).is_err());
        assert!(validate_skill(None, None, None, Some(-3.0)).is_err());
        assert!(validate_skill(Some(""), None, None, None).is_err());
    }

    #[test]
    fn test_validate_education_dates() {
        assert!(validate_education(
            Some("State University"),
            Some("degree"),
            &Some("2014-03-01".to_string()),
            &None
        )
        .is_ok());
        assert!(validate_education(None, Some("phd"), &None, &None).is_err());
        assert!(validate_education(None, None, &Some("March 2014".to_string()), &None).is_err());
    }

    #[test]
    fn test_validate_update_project() {
        let ok = UpdateProjectRequest {
            project_type: Some("open-source".to_string()),
            ..Default::default()
        };
        assert!(validate_update_project(&ok).is_ok());

        let bad = UpdateProjectRequest {
            project_type: Some("hobby".to_string()),
            github_url: Some("ftp://example.com".to_string()),
            ..Default::default()
        };
        assert!(validate_update_project(&bad).is_err());
    }
}
