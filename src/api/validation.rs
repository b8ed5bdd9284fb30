//! Input validation for API requests.
//!
//! Each function returns `Err(message)` for the offending field; collect
//! them with `ValidationErrorBuilder::check` from the `error` module.

use lazy_static::lazy_static;
use regex::Regex;

use crate::db::{ContentType, EducationType, ProjectType};

lazy_static! {
    /// Loose email shape: something@something.tld
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[^\s@]+@[^\s@]+\.[^\s@]+$"
    ).unwrap();

    /// Lowercase slug; Hangul syllables are allowed
    static ref SLUG_REGEX: Regex = Regex::new(
        r"^[a-z0-9가-힣]+(-[a-z0-9가-힣]+)*$"
    ).unwrap();

    /// Absolute HTTP(S) URL
    static ref HTTP_URL_REGEX: Regex = Regex::new(
        r"^https?://[a-zA-Z0-9][-a-zA-Z0-9.]*(:\d+)?(/\S*)?$"
    ).unwrap();
}

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_SUBJECT_LENGTH: usize = 200;
pub const MAX_MESSAGE_LENGTH: usize = 5000;

/// Non-blank text no longer than `max` characters
pub fn validate_required(value: &str, label: &str, max: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", label));
    }
    if value.chars().count() > max {
        return Err(format!("{} is too long (max {} characters)", label, max));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

pub fn validate_slug(slug: &str) -> Result<(), String> {
    if slug.is_empty() {
        return Err("Slug is required".to_string());
    }
    if slug.chars().count() > MAX_TITLE_LENGTH {
        return Err(format!("Slug is too long (max {} characters)", MAX_TITLE_LENGTH));
    }
    if !SLUG_REGEX.is_match(slug) {
        return Err(
            "Slug must be lowercase letters, digits or Hangul separated by single dashes".to_string(),
        );
    }
    Ok(())
}

/// Optional link: absolute http(s) URL or a site-relative path
pub fn validate_url(url: &Option<String>) -> Result<(), String> {
    if let Some(u) = url {
        if u.is_empty() {
            return Ok(());
        }
        if u.len() > 2048 {
            return Err("URL is too long (max 2048 characters)".to_string());
        }
        if u.starts_with('/') && !u.starts_with("//") {
            return Ok(());
        }
        if !HTTP_URL_REGEX.is_match(u) {
            return Err("URL must start with http:// or https://".to_string());
        }
    }
    Ok(())
}

/// Optional calendar date in YYYY-MM-DD form
pub fn validate_date(date: &Option<String>) -> Result<(), String> {
    if let Some(d) = date {
        if chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").is_err() {
            return Err("Date must be in YYYY-MM-DD format".to_string());
        }
    }
    Ok(())
}

pub fn validate_proficiency(proficiency: i64) -> Result<(), String> {
    if !(0..=100).contains(&proficiency) {
        return Err("Proficiency must be between 0 and 100".to_string());
    }
    Ok(())
}

pub fn validate_years(years: f64) -> Result<(), String> {
    if !years.is_finite() || years < 0.0 {
        return Err("Years of experience cannot be negative".to_string());
    }
    Ok(())
}

pub fn validate_project_type(value: &str) -> Result<(), String> {
    value.parse::<ProjectType>().map(|_| ())
}

pub fn validate_education_type(value: &str) -> Result<(), String> {
    value.parse::<EducationType>().map(|_| ())
}

pub fn validate_content_type(value: &str) -> Result<(), String> {
    value.parse::<ContentType>().map(|_| ())
}

/// Password strength rules for administrator accounts
pub fn validate_admin_password(password: &str) -> Result<(), String> {
    if password.len() < 12 {
        return Err("Password must be at least 12 characters".to_string());
    }
    if password.len() > 128 {
        return Err("Password is too long (max 128 characters)".to_string());
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_upper && has_lower && has_digit) {
        return Err(
            "Password must contain uppercase and lowercase letters and a digit".to_string(),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert!(validate_required("Hello", "Title", 10).is_ok());
        assert!(validate_required("   ", "Title", 10).is_err());
        assert!(validate_required("안녕하세요", "Title", 5).is_ok());
        assert!(validate_required("abcdefghijk", "Title", 10).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("me@example.com").is_ok());
        assert!(validate_email(" me@example.co.kr ").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("hello-world").is_ok());
        assert!(validate_slug("러스트-시작하기").is_ok());
        assert!(validate_slug("Hello").is_err());
        assert!(validate_slug("double--dash").is_err());
        assert!(validate_slug("-leading").is_err());
        assert!(validate_slug("").is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url(&None).is_ok());
        assert!(validate_url(&Some(String::new())).is_ok());
        assert!(validate_url(&Some("https://github.com/me".to_string())).is_ok());
        assert!(validate_url(&Some("/uploads/cv.pdf".to_string())).is_ok());
        assert!(validate_url(&Some("//evil.example".to_string())).is_err());
        assert!(validate_url(&Some("javascript:alert(1)".to_string())).is_err());
    }

    #[test]
    fn test_validate_date() {
        assert!(validate_date(&Some("2024-02-29".to_string())).is_ok());
        assert!(validate_date(&Some("2023-02-29".to_string())).is_err());
        assert!(validate_date(&None).is_ok());
    }

    #[test]
    fn test_validate_ranges() {
        assert!(validate_proficiency(0).is_ok());
        assert!(validate_proficiency(100).is_ok());
        assert!(validate_proficiency(101).is_err());
        assert!(validate_years(2.5).is_ok());
        assert!(validate_years(-1.0).is_err());
    }

    #[test]
    fn test_validate_enums() {
        assert!(validate_project_type("freelance").is_ok());
        assert!(validate_project_type("side-gig").is_err());
        assert!(validate_education_type("course").is_ok());
        assert!(validate_content_type("video").is_ok());
        assert!(validate_content_type("podcast").is_err());
    }

    #[test]
    fn test_validate_admin_password() {
        assert!(validate_admin_password("Sufficiently1Strong").is_ok());
        assert!(validate_admin_password("short1A").is_err());
        assert!(validate_admin_password("alllowercase123").is_err());
    }
}
