//! Command-line interface for folio.
//!
//! Without a subcommand (or with `serve`) the HTTP server starts. The other
//! subcommands work directly against the configured database:
//! - `seed` - Insert demo profile content and blog posts
//! - `config check` - Validate the configuration file
//! - `users promote <email>` - Grant the admin role to an account

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::db::{self, roles, User};

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about = "Portfolio and blog backend", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "folio.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Admin account created at startup (overrides `auth.admin_email`)
    #[arg(long, env = "FOLIO_ADMIN_EMAIL")]
    pub admin_email: Option<String>,

    /// Password for the startup admin account (overrides `auth.admin_password`)
    #[arg(long, env = "FOLIO_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    /// Subcommand to run (if none, starts the server)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Insert demo content into an empty blog
    Seed,

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Account management commands
    #[command(subcommand)]
    Users(UsersCommands),
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

/// Users subcommands
#[derive(Subcommand, Debug)]
pub enum UsersCommands {
    /// Give an existing account the admin role
    Promote {
        /// Email address of the account
        email: String,
    },
}

impl Cli {
    /// Whether this invocation should run the server
    pub fn is_serve(&self) -> bool {
        matches!(self.command, None | Some(Commands::Serve))
    }

    /// Load the configuration file and apply command-line overrides
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(&self.config)?;
        if let Some(email) = &self.admin_email {
            config.auth.admin_email = Some(email.clone());
        }
        if let Some(password) = &self.admin_password {
            config.auth.admin_password = Some(password.clone());
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        Ok(config)
    }
}

/// Run a non-server subcommand
pub async fn run_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Some(Commands::Seed) => cmd_seed(cli).await,
        Some(Commands::Config(ConfigCommands::Check)) => cmd_config_check(cli),
        Some(Commands::Users(UsersCommands::Promote { email })) => {
            cmd_users_promote(cli, email).await
        }
        None | Some(Commands::Serve) => {
            // Starting the server is handled in main.rs
            Ok(())
        }
    }
}

async fn open_database(config: &Config) -> Result<db::DbPool> {
    std::fs::create_dir_all(&config.server.data_dir).with_context(|| {
        format!(
            "Failed to create data directory {}",
            config.server.data_dir.display()
        )
    })?;
    db::init(&config.server.data_dir)
        .await
        .context("Failed to open database")
}

/// Insert demo content
async fn cmd_seed(cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;
    let pool = open_database(&config).await?;

    db::seed_demo_content(&pool).await?;

    println!("[OK] Demo content is in place.");
    Ok(())
}

/// Grant the admin role
async fn cmd_users_promote(cli: &Cli, email: &str) -> Result<()> {
    let config = cli.load_config()?;
    let pool = open_database(&config).await?;

    let email = crate::api::auth::normalize_email(email);
    let user = User::find_by_email(&pool, &email)
        .await?
        .with_context(|| format!("No account with email {}", email))?;

    if user.is_admin() {
        println!("{} is already an admin.", user.email);
        return Ok(());
    }

    User::set_role(&pool, &user.id, roles::ADMIN).await?;
    db::Profile::ensure_for_user(&pool, &user.id, &user.name).await?;

    println!("[OK] {} is now an admin.", user.email);
    Ok(())
}

/// Validate the configuration file
fn cmd_config_check(cli: &Cli) -> Result<()> {
    let config_path = &cli.config;

    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!(
            "[!!] Configuration file not found: {}",
            config_path.display()
        );
        println!();
        println!("A default configuration will be used when starting the server.");
        return Ok(());
    }

    let config = match cli.load_config().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            println!("[!!] Configuration file is invalid!");
            println!();
            println!("Error: {:#}", e);
            println!();
            anyhow::bail!("Invalid configuration file");
        }
    };

    println!("[OK] Configuration file is valid!");
    println!();
    println!("=== Configuration Summary ===");
    println!();
    println!("Server:");
    println!("  Host:         {}", config.server.host);
    println!("  Port:         {}", config.server.port);
    println!("  Data Dir:     {}", config.server.data_dir.display());
    println!("  Static Dir:   {}", config.server.static_dir.display());
    println!();
    println!("Site:");
    println!("  Title:        {}", config.site.title);
    println!("  Locale:       {:?}", config.site.locale);
    println!("  Page Size:    {}", config.blog.page_size);
    println!();
    println!("Security:");
    println!(
        "  Rate Limiting: {}",
        if config.rate_limit.enabled {
            "Enabled"
        } else {
            "Disabled"
        }
    );
    println!(
        "  Startup Admin: {}",
        config.auth.admin_email.as_deref().unwrap_or("-")
    );
    println!();
    println!("Notifications:");
    println!(
        "  Email:        {}",
        if config.email.is_configured() {
            "Enabled"
        } else {
            "Disabled"
        }
    );
    println!();

    let mut warnings = Vec::new();
    if !config.auth.secure_cookies {
        warnings.push("Session cookies are sent without the Secure flag");
    }
    if config.site.owner_email.is_none() {
        warnings.push("No site.owner_email set - contact messages will not be emailed");
    }

    if !warnings.is_empty() {
        println!("Warnings:");
        for warning in warnings {
            println!("  [!] {}", warning);
        }
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_is_serve() {
        let cli = Cli::try_parse_from(["folio"]).unwrap();
        assert!(cli.is_serve());
        assert_eq!(cli.config, PathBuf::from("folio.toml"));
    }

    #[test]
    fn test_parse_users_promote() {
        let cli = Cli::try_parse_from(["folio", "users", "promote", "jane@example.com"]).unwrap();
        assert!(!cli.is_serve());
        match cli.command {
            Some(Commands::Users(UsersCommands::Promote { email })) => {
                assert_eq!(email, "jane@example.com")
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_load_config_applies_overrides() {
        let cli = Cli::try_parse_from([
            "folio",
            "--config",
            "/nonexistent/folio.toml",
            "--admin-email",
            "owner@example.com",
            "--admin-password",
            "Str0ngPassword!",
            "--log-level",
            "debug",
        ])
        .unwrap();

        let config = cli.load_config().unwrap();
        assert_eq!(config.auth.admin_email.as_deref(), Some("owner@example.com"));
        assert_eq!(config.logging.level, "debug");
    }
}
