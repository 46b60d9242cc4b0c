//! Operator CLI for the engagement store
//!
//! `migrate` applies the schema. `audit` scans every stored content item and
//! prints one JSON line per item with invariant violations, then a summary.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use engagement_core::config::Config;
use engagement_core::domains::audit::{self, InvariantViolation};
use engagement_core::kernel::PgContentStore;
use engagement_core::common::ContentItemId;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "engagement")]
#[command(about = "Engagement store maintenance")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,

    /// Check stored records for derived-state drift
    Audit {
        #[arg(long, default_value_t = 500)]
        batch_size: i64,
    },
}

// ============================================================================
// JSON Output Types
// ============================================================================

#[derive(Serialize)]
struct ItemReport {
    item_id: ContentItemId,
    version: u64,
    violations: Vec<InvariantViolation>,
}

#[derive(Serialize)]
struct AuditSummary {
    #[serde(rename = "type")]
    kind: &'static str,
    scanned: u64,
    items_with_violations: u64,
    violations: u64,
}

fn output<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,engagement_core=debug,sqlx=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let store = PgContentStore::connect(config.require_database_url()?, config.db_max_connections)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Migrate => cmd_migrate(&store).await,
        Commands::Audit { batch_size } => cmd_audit(&store, batch_size).await,
    }
}

// ============================================================================
// Commands
// ============================================================================

async fn cmd_migrate(store: &PgContentStore) -> Result<()> {
    store.migrate().await?;
    tracing::info!("Migrations applied");
    Ok(())
}

async fn cmd_audit(store: &PgContentStore, batch_size: i64) -> Result<()> {
    let batch_size = batch_size.max(1);
    let mut summary = AuditSummary {
        kind: "summary",
        scanned: 0,
        items_with_violations: 0,
        violations: 0,
    };

    let mut after = None;
    loop {
        let page = store
            .load_page(after, batch_size)
            .await
            .context("Failed to load content items")?;
        let Some(last) = page.last() else {
            break;
        };
        after = Some(last.id);

        for item in &page {
            summary.scanned += 1;
            let violations = audit::check(item);
            if violations.is_empty() {
                continue;
            }
            summary.items_with_violations += 1;
            summary.violations += violations.len() as u64;
            output(&ItemReport {
                item_id: item.id,
                version: item.version.value(),
                violations,
            })?;
        }

        tracing::debug!(scanned = summary.scanned, "audit page done");
    }

    output(&summary)?;
    if summary.items_with_violations > 0 {
        tracing::warn!(
            items = summary.items_with_violations,
            "Audit found drifted records"
        );
    }
    Ok(())
}
