//! CLI administration tool for shortlink.
//!
//! Manages links, shows statistics and runs database operations without going through the
//! HTTP API. Deletion here skips ownership checks.
//!
//! # Usage
//!
//! ```bash
//! # Create a link with a chosen slug
//! cargo run --bin admin -- link create https://example.com/docs --slug docs
//!
//! # Inspect and delete a link
//! cargo run --bin admin -- link show docs
//! cargo run --bin admin -- link delete docs
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Database tools
//! cargo run --bin admin -- db check
//! cargo run --bin admin -- db migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_HOST`/`DB_USER`/`DB_PASSWORD`/`DB_NAME` (required)
//! - `BASE_URL` and `SLUG_*` as for the server

use shortlink::application::services::{DeleteAuthority, LinkService, StatsService};
use shortlink::config::{self, Config};
use shortlink::infrastructure::persistence::{PgLinkRepository, PgStatsRepository};
use shortlink::server::connect_pool;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing shortlink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum LinkAction {
    /// Create a link
    Create {
        /// Destination URL (http or https)
        destination: String,

        /// Requested slug (random if omitted)
        #[arg(short, long)]
        slug: Option<String>,

        /// Owner id to record on the link
        #[arg(short, long)]
        owner: Option<String>,
    },

    /// Show a link and its click statistics
    Show { slug: String },

    /// Delete a link regardless of owner
    Delete {
        slug: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,

    /// Apply pending migrations
    Migrate,
}

type Links = LinkService<PgLinkRepository>;
type Stats = StatsService<PgLinkRepository, PgStatsRepository>;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL (or DB_HOST/DB_USER/DB_PASSWORD/DB_NAME) must be set")?;

    let pool = connect_pool(&config, &database_url).await?;

    match cli.command {
        Commands::Link { action } => handle_link_action(action, &config, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches link management commands.
async fn handle_link_action(action: LinkAction, config: &Config, pool: &PgPool) -> Result<()> {
    let pool = Arc::new(pool.clone());
    let link_repository = Arc::new(PgLinkRepository::new(pool.clone()));
    let links = LinkService::new(
        link_repository.clone(),
        config.slug_generator()?,
        config.base_url.clone(),
    );

    match action {
        LinkAction::Create {
            destination,
            slug,
            owner,
        } => create_link(&links, destination, slug, owner).await?,
        LinkAction::Show { slug } => {
            let stats = StatsService::new(link_repository, Arc::new(PgStatsRepository::new(pool)));
            show_link(&links, &stats, &slug).await?;
        }
        LinkAction::Delete { slug, yes } => delete_link(&links, &slug, yes).await?,
    }

    Ok(())
}

async fn create_link(
    links: &Links,
    destination: String,
    slug: Option<String>,
    owner: Option<String>,
) -> Result<()> {
    println!("{}", "🔗 Create Link".bright_blue().bold());
    println!();

    let link = links
        .create_link(&destination, slug.as_deref(), owner)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

    println!("{}", "✅ Link created".green().bold());
    println!("  Slug:        {}", link.slug.cyan());
    println!("  Short URL:   {}", links.short_url(&link.slug).bright_yellow());
    println!("  Destination: {}", link.destination);
    println!();

    Ok(())
}

/// Prints a link with its click totals and per-country breakdown.
///
/// # Output Format
///
/// ```text
/// 🔎 docs
///
///   Destination: https://example.com/docs
///   Owner:       alice
///   Created:     2026-01-15 10:30
///   Clicks:      42
///
///   Country   Clicks  Share
///   DE        30      71%
///   Unknown   12      29%
/// ```
async fn show_link(links: &Links, stats: &Stats, slug: &str) -> Result<()> {
    let link = links
        .get_link(slug)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let report = stats
        .link_stats(&link.slug, None, None)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load statistics: {}", e))?;

    println!("{}", format!("🔎 {}", link.slug).bright_blue().bold());
    println!();
    println!("  Destination: {}", link.destination);
    println!(
        "  Owner:       {}",
        link.owner.as_deref().unwrap_or("(anonymous)").cyan()
    );
    println!(
        "  Created:     {}",
        link.created_at.format("%Y-%m-%d %H:%M").to_string().bright_black()
    );
    println!(
        "  Clicks:      {}",
        link.click_count.to_string().bright_green().bold()
    );
    println!();

    if report.countries.is_empty() {
        println!("{}", "  No recorded clicks".yellow());
        println!();
        return Ok(());
    }

    println!(
        "  {:<9} {:<7} {}",
        "Country".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Share".bright_white().bold()
    );
    for country in &report.countries {
        println!(
            "  {:<9} {:<7} {}%",
            country.country.cyan(),
            country.total,
            country.percent
        );
    }
    println!();

    Ok(())
}

/// Deletes a link after confirmation (default: No). Click history is kept.
async fn delete_link(links: &Links, slug: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑  Delete Link".bright_blue().bold());
    println!();

    let link = links
        .get_link(slug)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("  Slug:        {}", link.slug.cyan());
    println!("  Destination: {}", link.destination);
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    links
        .delete_link(&link.slug, DeleteAuthority::Admin)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    println!("{}", "✅ Link deleted".green().bold());
    println!(
        "{}",
        "   A running server may keep serving it from Redis until the cache entry expires."
            .bright_black()
    );
    println!();

    Ok(())
}

/// Displays store-wide totals.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let pool = Arc::new(pool.clone());
    let stats = StatsService::new(
        Arc::new(PgLinkRepository::new(pool.clone())),
        Arc::new(PgStatsRepository::new(pool.clone())),
    );
    let totals = stats
        .totals()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load totals: {}", e))?;

    let events: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM link_clicks")
        .fetch_one(pool.as_ref())
        .await?;

    println!(
        "  Links:          {}",
        totals.links.to_string().bright_green().bold()
    );
    println!(
        "  Clicks:         {}",
        totals.clicks.to_string().bright_green().bold()
    );
    println!(
        "  Click events:   {}",
        events.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
        DbAction::Migrate => {
            println!("{}", "🚚 Applying migrations...".bright_blue());

            sqlx::migrate!("./migrations")
                .run(pool)
                .await
                .context("Failed to apply migrations")?;

            println!("{}", "✅ Migrations applied".green().bold());
        }
    }

    Ok(())
}
