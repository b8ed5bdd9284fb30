use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::i18n::Locale;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub blog: BlogConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory holding the built front-end, served for unmatched paths
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static/dist")
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Static API token with admin rights, for scripts and the CLI
    #[serde(default = "default_admin_token")]
    pub admin_token: String,
    /// Admin account created at startup when both fields are set
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: i64,
    /// Minimum password length for visitor signups
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
    /// Set the `Secure` flag on the session cookie
    #[serde(default)]
    pub secure_cookies: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_token: default_admin_token(),
            admin_email: None,
            admin_password: None,
            session_ttl_days: default_session_ttl_days(),
            min_password_length: default_min_password_length(),
            secure_cookies: false,
        }
    }
}

fn default_admin_token() -> String {
    // Generate a random token if not provided
    uuid::Uuid::new_v4().to_string()
}

fn default_session_ttl_days() -> i64 {
    7
}

fn default_min_password_length() -> usize {
    6
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_site_title")]
    pub title: String,
    /// Language of user-facing messages
    #[serde(default)]
    pub locale: Locale,
    /// Where new contact messages are forwarded (requires `[email]`)
    pub owner_email: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_site_title(),
            locale: Locale::default(),
            owner_email: None,
        }
    }
}

fn default_site_title() -> String {
    "Portfolio".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlogConfig {
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    #[serde(default = "default_popular_tags")]
    pub popular_tags: i64,
    #[serde(default = "default_max_comment_length")]
    pub max_comment_length: usize,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            popular_tags: default_popular_tags(),
            max_comment_length: default_max_comment_length(),
        }
    }
}

fn default_page_size() -> i64 {
    10
}

fn default_popular_tags() -> i64 {
    10
}

fn default_max_comment_length() -> usize {
    2000
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Requests per window for general API endpoints
    #[serde(default = "default_api_requests")]
    pub api_requests_per_window: u32,
    /// Requests per window for login/signup
    #[serde(default = "default_auth_requests")]
    pub auth_requests_per_window: u32,
    /// Requests per window for contact messages and comments
    #[serde(default = "default_submit_requests")]
    pub submit_requests_per_window: u32,
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
    /// Seconds between sweeps of stale limiter entries
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_requests_per_window: default_api_requests(),
            auth_requests_per_window: default_auth_requests(),
            submit_requests_per_window: default_submit_requests(),
            window_seconds: default_window_seconds(),
            cleanup_interval: default_cleanup_interval(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_api_requests() -> u32 {
    300
}

fn default_auth_requests() -> u32 {
    20
}

fn default_submit_requests() -> u32 {
    10
}

fn default_window_seconds() -> u64 {
    60
}

fn default_cleanup_interval() -> u64 {
    300
}

/// SMTP settings for outgoing notification mail
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    #[serde(default = "default_true")]
    pub smtp_tls: bool,
    pub from_address: Option<String>,
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password: None,
            smtp_tls: true,
            from_address: None,
            from_name: default_from_name(),
        }
    }
}

impl EmailConfig {
    pub fn is_configured(&self) -> bool {
        self.smtp_host.is_some() && self.from_address.is_some()
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_name() -> String {
    "Folio".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse configuration file")
    }

    /// Sanity checks that cannot be expressed through serde defaults
    pub fn validate(&self) -> Result<()> {
        if self.blog.page_size < 1 || self.blog.page_size > 100 {
            anyhow::bail!("blog.page_size must be between 1 and 100");
        }
        if self.auth.admin_token.trim().is_empty() {
            anyhow::bail!("auth.admin_token must not be empty");
        }
        if self.auth.session_ttl_days < 1 {
            anyhow::bail!("auth.session_ttl_days must be at least 1");
        }
        if self.auth.admin_email.is_some() != self.auth.admin_password.is_some() {
            anyhow::bail!("auth.admin_email and auth.admin_password must be set together");
        }
        if self.site.owner_email.is_some() && !self.email.is_configured() {
            tracing::warn!("site.owner_email is set but [email] is not configured; notifications are disabled");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.blog.page_size, 10);
        assert_eq!(config.auth.min_password_length, 6);
        assert_eq!(config.site.locale, Locale::En);
        assert!(!config.email.is_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_overrides() {
        let config = Config::parse(
            r#"
            [server]
            port = 8081

            [site]
            title = "Dev Notes"
            locale = "ko"

            [blog]
            page_size = 6
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.site.title, "Dev Notes");
        assert_eq!(config.site.locale, Locale::Ko);
        assert_eq!(config.blog.page_size, 6);
        assert_eq!(config.blog.popular_tags, 10);
    }

    #[test]
    fn test_validate_rejects_half_admin_credentials() {
        let config = Config::parse(
            r#"
            [auth]
            admin_email = "owner@example.com"
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_page_size() {
        let config = Config::parse("[blog]\npage_size = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_admin_token() {
        let config = Config::parse("[auth]\nadmin_token = \"  \"\n").unwrap();
        assert!(config.validate().is_err());
    }
}
