//! CLI administration tool for snaplink.
//!
//! Manages accounts and sessions and inspects links directly against the
//! PostgreSQL store, without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create an account (prompts for missing values)
//! cargo run --bin snaplink-admin -- user create --email alice@example.com
//!
//! # Log a user out everywhere
//! cargo run --bin snaplink-admin -- session revoke --email alice@example.com
//!
//! # Inspect a short code
//! cargo run --bin snaplink-admin -- link show aZ3k9Qx
//!
//! # Check the store connection
//! cargo run --bin snaplink-admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `STORE_URL` (or its components) and
//! `TOKEN_SIGNING_SECRET` are required. `memory://` is rejected.

use snaplink::config::{self, Config, mask_connection_string};
use snaplink::domain::repositories::ShortUrlRepository;
use snaplink::infrastructure::cache::NullCache;
use snaplink::infrastructure::persistence::PgShortUrlRepository;
use snaplink::state::{AppState, Backends};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing snaplink.
#[derive(Parser)]
#[command(name = "snaplink-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage login sessions
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Inspect short links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create an account
    Create {
        #[arg(short, long)]
        email: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Revoke every session of a user
    Revoke {
        #[arg(short, long)]
        email: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum LinkAction {
    /// Show the target and owner of a short code
    Show { code: String },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    if config.is_memory_store() {
        anyhow::bail!("snaplink-admin needs a PostgreSQL STORE_URL, not memory://");
    }

    let pool = PgPool::connect(&config.store_url)
        .await
        .context("Failed to connect to store")?;

    match cli.command {
        Commands::User { action } => handle_user_action(action, &config, &pool).await?,
        Commands::Session { action } => handle_session_action(action, &config, &pool).await?,
        Commands::Link { action } => handle_link_action(action, &config, &pool).await?,
        Commands::Db { action } => handle_db_action(action, &config, &pool).await?,
    }

    Ok(())
}

fn app_state(config: &Config, pool: &PgPool) -> Result<AppState> {
    let settings = config.service_settings()?;
    Ok(AppState::new(
        Backends::postgres(Arc::new(pool.clone())),
        Arc::new(NullCache::new()),
        &settings,
    ))
}

async fn handle_user_action(action: UserAction, config: &Config, pool: &PgPool) -> Result<()> {
    match action {
        UserAction::Create { email, yes } => create_user(config, pool, email, yes).await,
    }
}

/// Creates an account with interactive prompts.
///
/// The password is always read from the terminal with confirmation and is
/// stored as an Argon2 hash.
async fn create_user(
    config: &Config,
    pool: &PgPool,
    email: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "👤 Create User".bright_blue().bold());
    println!();

    let email = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Email").interact_text()?,
    };

    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()?;

    println!();
    println!("  Email: {}", email.cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this user?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let state = app_state(config, pool)?;
    let user = state
        .auth
        .register(&email, &password)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create user: {}", e))?;

    println!();
    println!("{}", "✅ User created successfully!".green().bold());
    println!("  ID:      {}", user.id.unwrap_or_default().bright_black());
    println!("  Email:   {}", user.email.as_str().cyan());
    println!(
        "  Created: {}",
        user.created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
    println!();

    Ok(())
}

async fn handle_session_action(
    action: SessionAction,
    config: &Config,
    pool: &PgPool,
) -> Result<()> {
    match action {
        SessionAction::Revoke { email, yes } => revoke_sessions(config, pool, email, yes).await,
    }
}

/// Deletes every session of a user. Outstanding tokens stop working at once.
async fn revoke_sessions(
    config: &Config,
    pool: &PgPool,
    email: String,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🔒 Revoke Sessions".bright_blue().bold());
    println!();
    println!("  User: {}", email.cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Revoke all sessions of this user?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let state = app_state(config, pool)?;
    let revoked = state
        .auth
        .revoke_all(&email)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke sessions: {}", e))?;

    println!();
    println!(
        "{} {}",
        "✅ Sessions revoked:".green().bold(),
        revoked.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

async fn handle_link_action(action: LinkAction, config: &Config, pool: &PgPool) -> Result<()> {
    match action {
        LinkAction::Show { code } => show_link(config, pool, code).await,
    }
}

async fn show_link(config: &Config, pool: &PgPool, code: String) -> Result<()> {
    let repo = PgShortUrlRepository::new(Arc::new(pool.clone()));

    let short_url = repo
        .find_by_code(&code)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    let Some(short_url) = short_url else {
        println!("{} {}", "⚠️  No link with code".yellow(), code.cyan());
        return Ok(());
    };

    let base_url = config.base_url.trim_end_matches('/');

    println!("{}", "🔗 Link".bright_blue().bold());
    println!();
    println!("  Code:      {}", short_url.code().cyan());
    println!("  Short URL: {}/{}", base_url, short_url.code());
    println!("  Target:    {}", short_url.url().as_str().bright_white());
    println!(
        "  Owner:     {}",
        short_url.owner_id().unwrap_or("anonymous").bright_black()
    );
    println!(
        "  Created:   {}",
        short_url
            .created_at()
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
    println!();

    Ok(())
}

async fn handle_db_action(action: DbAction, config: &Config, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!(
                "{} {}",
                "🔍 Checking store connection:".bright_blue(),
                mask_connection_string(&config.store_url)
            );

            let state = app_state(config, pool)?;
            if !state.unit_of_work.health_check().await {
                anyhow::bail!("Store health check failed");
            }

            println!("{}", "✅ Store connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Store Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM short_urls")
                .fetch_one(pool)
                .await?;
            let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
                .fetch_one(pool)
                .await?;
            let sessions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Links:      {}", links.to_string().bright_green().bold());
            println!("  Users:      {}", users.to_string().bright_green().bold());
            println!("  Sessions:   {}", sessions.to_string().bright_green().bold());
            println!();
        }
    }

    Ok(())
}
