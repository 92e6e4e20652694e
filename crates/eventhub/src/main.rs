//! # eventhub
//!
//! Event management API server binary: loads settings, opens the database,
//! and serves the HTTP API until Ctrl-C or SIGTERM.

#![deny(unsafe_code)]

mod logging;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use eventhub_server::{EventhubServer, ServerConfig};
use eventhub_service::EventService;
use eventhub_settings::EventhubSettings;
use eventhub_store::{ConnectionConfig, Database};
use tracing::info;

/// Event management API server.
#[derive(Parser, Debug)]
#[command(name = "eventhub", version, about = "Event management API server")]
struct Cli {
    /// Settings file (defaults to `EVENTHUB_CONFIG` or `./eventhub.json`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings and `PORT`).
    #[arg(long)]
    port: Option<u16>,

    /// Database URL or path (overrides settings and `DATABASE_URL`).
    #[arg(long)]
    database: Option<String>,
}

impl Cli {
    /// Layer command-line flags over loaded settings.
    fn apply(&self, settings: &mut EventhubSettings) {
        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(url) = &self.database {
            settings.database.url.clone_from(url);
        }
    }
}

fn connection_config(settings: &EventhubSettings) -> ConnectionConfig {
    ConnectionConfig {
        pool_size: settings.database.pool_size,
        busy_timeout_ms: settings.database.busy_timeout_ms,
        connection_timeout: Duration::from_secs(settings.database.connection_timeout_secs),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is normal.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut settings =
        eventhub_settings::load_settings(cli.config.as_deref()).context("Failed to load settings")?;
    cli.apply(&mut settings);
    eventhub_settings::loader::validate(&settings).context("Invalid settings")?;

    logging::init_subscriber(&settings.logging);

    let db = Database::open(&settings.database.url, &connection_config(&settings))
        .with_context(|| format!("Failed to open database at {}", settings.database.url))?;
    let now = db.server_time().context("Database check failed")?;
    info!(%now, "database connected");

    let server = EventhubServer::new(
        ServerConfig::from(&settings.server),
        EventService::new(db),
    );
    let listener = server
        .bind()
        .await
        .with_context(|| format!("Failed to bind {}", server.config().bind_addr()))?;
    let _signals = server.shutdown().spawn_signal_listener();

    server.serve(listener).await.context("Server error")?;
    info!("eventhub stopped");
    Ok(())
}
