//! Portfolio owner profile and the sections hanging off it.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use super::common::{parse_string_list, serialize_string_list};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub title: String,
    pub bio: String,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
    pub resume_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
    pub resume_url: Option<String>,
}

impl Profile {
    /// Profile of the given user, or the first profile when no user is
    /// given (the site has a single owner).
    pub async fn get(
        pool: &SqlitePool,
        user_id: Option<&str>,
    ) -> Result<Option<Profile>, sqlx::Error> {
        match user_id {
            Some(user_id) => {
                sqlx::query_as("SELECT * FROM profiles WHERE user_id = ?")
                    .bind(user_id)
                    .fetch_optional(pool)
                    .await
            }
            None => {
                sqlx::query_as("SELECT * FROM profiles ORDER BY created_at ASC LIMIT 1")
                    .fetch_optional(pool)
                    .await
            }
        }
    }

    /// Create an empty profile for the owner account unless one exists
    pub async fn ensure_for_user(
        pool: &SqlitePool,
        user_id: &str,
        name: &str,
    ) -> Result<Profile, sqlx::Error> {
        if let Some(existing) = Self::get(pool, Some(user_id)).await? {
            return Ok(existing);
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = crate::db::now();
        sqlx::query(
            r#"
            INSERT INTO profiles (id, user_id, name, title, bio, created_at, updated_at)
            VALUES (?, ?, ?, '', '', ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(name)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await?;

        sqlx::query_as("SELECT * FROM profiles WHERE id = ?")
            .bind(&id)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: &str,
        req: &UpdateProfileRequest,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE profiles SET
                name = COALESCE(?, name),
                title = COALESCE(?, title),
                bio = COALESCE(?, bio),
                avatar_url = COALESCE(?, avatar_url),
                email = COALESCE(?, email),
                phone = COALESCE(?, phone),
                location = COALESCE(?, location),
                github_url = COALESCE(?, github_url),
                linkedin_url = COALESCE(?, linkedin_url),
                twitter_url = COALESCE(?, twitter_url),
                resume_url = COALESCE(?, resume_url),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.name)
        .bind(&req.title)
        .bind(&req.bio)
        .bind(&req.avatar_url)
        .bind(&req.email)
        .bind(&req.phone)
        .bind(&req.location)
        .bind(&req.github_url)
        .bind(&req.linkedin_url)
        .bind(&req.twitter_url)
        .bind(&req.resume_url)
        .bind(crate::db::now())
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        sqlx::query_as("SELECT * FROM profiles WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

/// Profile plus every section, as rendered on the about/portfolio pages
#[derive(Debug, Clone, Serialize)]
pub struct FullProfile {
    pub profile: Profile,
    pub about_sections: Vec<AboutSection>,
    pub skills: Vec<Skill>,
    pub projects: Vec<ProjectResponse>,
    pub educations: Vec<Education>,
    pub interests: Vec<Interest>,
}

impl FullProfile {
    pub async fn load(
        pool: &SqlitePool,
        user_id: Option<&str>,
    ) -> Result<Option<FullProfile>, sqlx::Error> {
        let Some(profile) = Profile::get(pool, user_id).await? else {
            return Ok(None);
        };

        let about_sections = AboutSection::list_active(pool, &profile.id).await?;
        let skills = Skill::list(pool, &profile.id, false).await?;
        let projects = Project::list(pool, &profile.id, false).await?;
        let educations = Education::list(pool, &profile.id).await?;
        let interests = Interest::list(pool, &profile.id).await?;

        Ok(Some(FullProfile {
            profile,
            about_sections,
            skills,
            projects: projects.into_iter().map(ProjectResponse::from).collect(),
            educations,
            interests,
        }))
    }
}

// ---------------------------------------------------------------------------
// About sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AboutSection {
    pub id: String,
    pub profile_id: String,
    pub title: String,
    pub content: String,
    pub section_order: i64,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateAboutSectionRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub section_order: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateAboutSectionRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub section_order: Option<i64>,
    pub is_active: Option<bool>,
}

fn default_true() -> bool {
    true
}

impl AboutSection {
    pub async fn list_active(
        pool: &SqlitePool,
        profile_id: &str,
    ) -> Result<Vec<AboutSection>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM about_sections WHERE profile_id = ? AND is_active = 1 ORDER BY section_order, created_at",
        )
        .bind(profile_id)
        .fetch_all(pool)
        .await
    }

    /// Every section including hidden ones, for the admin editor
    pub async fn list_all(
        pool: &SqlitePool,
        profile_id: &str,
    ) -> Result<Vec<AboutSection>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM about_sections WHERE profile_id = ? ORDER BY section_order, created_at",
        )
        .bind(profile_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        profile_id: &str,
        req: &CreateAboutSectionRequest,
    ) -> Result<AboutSection, sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = crate::db::now();

        sqlx::query(
            r#"
            INSERT INTO about_sections (id, profile_id, title, content, section_order, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(profile_id)
        .bind(&req.title)
        .bind(&req.content)
        .bind(req.section_order)
        .bind(req.is_active)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await?;

        sqlx::query_as("SELECT * FROM about_sections WHERE id = ?")
            .bind(&id)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: &str,
        req: &UpdateAboutSectionRequest,
    ) -> Result<Option<AboutSection>, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE about_sections SET
                title = COALESCE(?, title),
                content = COALESCE(?, content),
                section_order = COALESCE(?, section_order),
                is_active = COALESCE(?, is_active),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.title)
        .bind(&req.content)
        .bind(req.section_order)
        .bind(req.is_active)
        .bind(crate::db::now())
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        sqlx::query_as("SELECT * FROM about_sections WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM about_sections WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Skills
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Skill {
    pub id: String,
    pub profile_id: String,
    pub name: String,
    pub category: String,
    pub proficiency: i64,
    pub years_of_experience: f64,
    pub is_featured: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSkillRequest {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub proficiency: i64,
    #[serde(default)]
    pub years_of_experience: f64,
    #[serde(default)]
    pub is_featured: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSkillRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub proficiency: Option<i64>,
    pub years_of_experience: Option<f64>,
    pub is_featured: Option<bool>,
}

impl Skill {
    /// Skills ordered by proficiency, strongest first
    pub async fn list(
        pool: &SqlitePool,
        profile_id: &str,
        featured_only: bool,
    ) -> Result<Vec<Skill>, sqlx::Error> {
        let sql = if featured_only {
            "SELECT * FROM skills WHERE profile_id = ? AND is_featured = 1 ORDER BY proficiency DESC, name"
        } else {
            "SELECT * FROM skills WHERE profile_id = ? ORDER BY proficiency DESC, name"
        };
        sqlx::query_as(sql).bind(profile_id).fetch_all(pool).await
    }

    pub async fn create(
        pool: &SqlitePool,
        profile_id: &str,
        req: &CreateSkillRequest,
    ) -> Result<Skill, sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = crate::db::now();

        sqlx::query(
            r#"
            INSERT INTO skills (id, profile_id, name, category, proficiency, years_of_experience, is_featured, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(profile_id)
        .bind(&req.name)
        .bind(&req.category)
        .bind(req.proficiency)
        .bind(req.years_of_experience)
        .bind(req.is_featured)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await?;

        sqlx::query_as("SELECT * FROM skills WHERE id = ?")
            .bind(&id)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: &str,
        req: &UpdateSkillRequest,
    ) -> Result<Option<Skill>, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE skills SET
                name = COALESCE(?, name),
                category = COALESCE(?, category),
                proficiency = COALESCE(?, proficiency),
                years_of_experience = COALESCE(?, years_of_experience),
                is_featured = COALESCE(?, is_featured),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.name)
        .bind(&req.category)
        .bind(req.proficiency)
        .bind(req.years_of_experience)
        .bind(req.is_featured)
        .bind(crate::db::now())
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        sqlx::query_as("SELECT * FROM skills WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM skills WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    Work,
    Personal,
    Freelance,
    OpenSource,
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Work => write!(f, "work"),
            Self::Personal => write!(f, "personal"),
            Self::Freelance => write!(f, "freelance"),
            Self::OpenSource => write!(f, "open-source"),
        }
    }
}

impl std::str::FromStr for ProjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "work" => Ok(Self::Work),
            "personal" => Ok(Self::Personal),
            "freelance" => Ok(Self::Freelance),
            "open-source" | "opensource" => Ok(Self::OpenSource),
            _ => Err(format!("Unknown project type: {}", s)),
        }
    }
}

/// Raw `projects` row; list columns are JSON text
#[derive(Debug, Clone, FromRow)]
pub struct Project {
    pub id: String,
    pub profile_id: String,
    pub title: String,
    pub description: String,
    pub detailed_description: Option<String>,
    pub project_type: String,
    pub company: Option<String>,
    pub role: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_current: bool,
    pub technologies: String,
    pub project_url: Option<String>,
    pub github_url: Option<String>,
    pub image_url: Option<String>,
    pub achievements: String,
    pub challenges: String,
    pub is_featured: bool,
    pub display_order: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectResponse {
    pub id: String,
    pub profile_id: String,
    pub title: String,
    pub description: String,
    pub detailed_description: Option<String>,
    pub project_type: String,
    pub company: Option<String>,
    pub role: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_current: bool,
    pub technologies: Vec<String>,
    pub project_url: Option<String>,
    pub github_url: Option<String>,
    pub image_url: Option<String>,
    pub achievements: Vec<String>,
    pub challenges: Vec<String>,
    pub is_featured: bool,
    pub display_order: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Project> for ProjectResponse {
    fn from(p: Project) -> Self {
        Self {
            technologies: parse_string_list(&p.technologies),
            achievements: parse_string_list(&p.achievements),
            challenges: parse_string_list(&p.challenges),
            id: p.id,
            profile_id: p.profile_id,
            title: p.title,
            description: p.description,
            detailed_description: p.detailed_description,
            project_type: p.project_type,
            company: p.company,
            role: p.role,
            start_date: p.start_date,
            end_date: p.end_date,
            is_current: p.is_current,
            project_url: p.project_url,
            github_url: p.github_url,
            image_url: p.image_url,
            is_featured: p.is_featured,
            display_order: p.display_order,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub title: String,
    pub description: String,
    pub detailed_description: Option<String>,
    #[serde(default = "default_project_type")]
    pub project_type: String,
    pub company: Option<String>,
    pub role: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub project_url: Option<String>,
    pub github_url: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub challenges: Vec<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub display_order: i64,
}

fn default_project_type() -> String {
    "personal".to_string()
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub detailed_description: Option<String>,
    pub project_type: Option<String>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_current: Option<bool>,
    pub technologies: Option<Vec<String>>,
    pub project_url: Option<String>,
    pub github_url: Option<String>,
    pub image_url: Option<String>,
    pub achievements: Option<Vec<String>>,
    pub challenges: Option<Vec<String>>,
    pub is_featured: Option<bool>,
    pub display_order: Option<i64>,
}

impl Project {
    pub async fn list(
        pool: &SqlitePool,
        profile_id: &str,
        featured_only: bool,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let sql = if featured_only {
            "SELECT * FROM projects WHERE profile_id = ? AND is_featured = 1 ORDER BY display_order, created_at"
        } else {
            "SELECT * FROM projects WHERE profile_id = ? ORDER BY display_order, created_at"
        };
        sqlx::query_as(sql).bind(profile_id).fetch_all(pool).await
    }

    pub async fn create(
        pool: &SqlitePool,
        profile_id: &str,
        req: &CreateProjectRequest,
    ) -> Result<Project, sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = crate::db::now();

        sqlx::query(
            r#"
            INSERT INTO projects (
                id, profile_id, title, description, detailed_description, project_type,
                company, role, start_date, end_date, is_current, technologies,
                project_url, github_url, image_url, achievements, challenges,
                is_featured, display_order, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(profile_id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.detailed_description)
        .bind(&req.project_type)
        .bind(&req.company)
        .bind(&req.role)
        .bind(&req.start_date)
        .bind(&req.end_date)
        .bind(req.is_current)
        .bind(serialize_string_list(&req.technologies))
        .bind(&req.project_url)
        .bind(&req.github_url)
        .bind(&req.image_url)
        .bind(serialize_string_list(&req.achievements))
        .bind(serialize_string_list(&req.challenges))
        .bind(req.is_featured)
        .bind(req.display_order)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await?;

        sqlx::query_as("SELECT * FROM projects WHERE id = ?")
            .bind(&id)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: &str,
        req: &UpdateProjectRequest,
    ) -> Result<Option<Project>, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE projects SET
                title = COALESCE(?, title),
                description = COALESCE(?, description),
                detailed_description = COALESCE(?, detailed_description),
                project_type = COALESCE(?, project_type),
                company = COALESCE(?, company),
                role = COALESCE(?, role),
                start_date = COALESCE(?, start_date),
                end_date = COALESCE(?, end_date),
                is_current = COALESCE(?, is_current),
                technologies = COALESCE(?, technologies),
                project_url = COALESCE(?, project_url),
                github_url = COALESCE(?, github_url),
                image_url = COALESCE(?, image_url),
                achievements = COALESCE(?, achievements),
                challenges = COALESCE(?, challenges),
                is_featured = COALESCE(?, is_featured),
                display_order = COALESCE(?, display_order),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.detailed_description)
        .bind(&req.project_type)
        .bind(&req.company)
        .bind(&req.role)
        .bind(&req.start_date)
        .bind(&req.end_date)
        .bind(req.is_current)
        .bind(req.technologies.as_deref().map(serialize_string_list))
        .bind(&req.project_url)
        .bind(&req.github_url)
        .bind(&req.image_url)
        .bind(req.achievements.as_deref().map(serialize_string_list))
        .bind(req.challenges.as_deref().map(serialize_string_list))
        .bind(req.is_featured)
        .bind(req.display_order)
        .bind(crate::db::now())
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        sqlx::query_as("SELECT * FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Education
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EducationType {
    Degree,
    Certification,
    Course,
    Bootcamp,
}

impl std::fmt::Display for EducationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Degree => write!(f, "degree"),
            Self::Certification => write!(f, "certification"),
            Self::Course => write!(f, "course"),
            Self::Bootcamp => write!(f, "bootcamp"),
        }
    }
}

impl std::str::FromStr for EducationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "degree" => Ok(Self::Degree),
            "certification" => Ok(Self::Certification),
            "course" => Ok(Self::Course),
            "bootcamp" => Ok(Self::Bootcamp),
            _ => Err(format!("Unknown education type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Education {
    pub id: String,
    pub profile_id: String,
    pub institution: String,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_current: bool,
    pub description: Option<String>,
    pub grade: Option<String>,
    pub education_type: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateEducationRequest {
    pub institution: String,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub is_current: bool,
    pub description: Option<String>,
    pub grade: Option<String>,
    #[serde(default = "default_education_type")]
    pub education_type: String,
}

fn default_education_type() -> String {
    "degree".to_string()
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateEducationRequest {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_current: Option<bool>,
    pub description: Option<String>,
    pub grade: Option<String>,
    pub education_type: Option<String>,
}

impl Education {
    /// Most recent first; entries without a start date sort last
    pub async fn list(pool: &SqlitePool, profile_id: &str) -> Result<Vec<Education>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM educations WHERE profile_id = ? ORDER BY start_date IS NULL, start_date DESC",
        )
        .bind(profile_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        profile_id: &str,
        req: &CreateEducationRequest,
    ) -> Result<Education, sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = crate::db::now();

        sqlx::query(
            r#"
            INSERT INTO educations (
                id, profile_id, institution, degree, field_of_study, start_date, end_date,
                is_current, description, grade, education_type, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(profile_id)
        .bind(&req.institution)
        .bind(&req.degree)
        .bind(&req.field_of_study)
        .bind(&req.start_date)
        .bind(&req.end_date)
        .bind(req.is_current)
        .bind(&req.description)
        .bind(&req.grade)
        .bind(&req.education_type)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await?;

        sqlx::query_as("SELECT * FROM educations WHERE id = ?")
            .bind(&id)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: &str,
        req: &UpdateEducationRequest,
    ) -> Result<Option<Education>, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE educations SET
                institution = COALESCE(?, institution),
                degree = COALESCE(?, degree),
                field_of_study = COALESCE(?, field_of_study),
                start_date = COALESCE(?, start_date),
                end_date = COALESCE(?, end_date),
                is_current = COALESCE(?, is_current),
                description = COALESCE(?, description),
                grade = COALESCE(?, grade),
                education_type = COALESCE(?, education_type),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.institution)
        .bind(&req.degree)
        .bind(&req.field_of_study)
        .bind(&req.start_date)
        .bind(&req.end_date)
        .bind(req.is_current)
        .bind(&req.description)
        .bind(&req.grade)
        .bind(&req.education_type)
        .bind(crate::db::now())
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        sqlx::query_as("SELECT * FROM educations WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM educations WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Interests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Interest {
    pub id: String,
    pub profile_id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateInterestRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateInterestRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Interest {
    pub async fn list(pool: &SqlitePool, profile_id: &str) -> Result<Vec<Interest>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM interests WHERE profile_id = ? ORDER BY name")
            .bind(profile_id)
            .fetch_all(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        profile_id: &str,
        req: &CreateInterestRequest,
    ) -> Result<Interest, sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO interests (id, profile_id, name, description, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(profile_id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(crate::db::now())
        .execute(pool)
        .await?;

        sqlx::query_as("SELECT * FROM interests WHERE id = ?")
            .bind(&id)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: &str,
        req: &UpdateInterestRequest,
    ) -> Result<Option<Interest>, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE interests SET
                name = COALESCE(?, name),
                description = COALESCE(?, description)
            WHERE id = ?
            "#,
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        sqlx::query_as("SELECT * FROM interests WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM interests WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
