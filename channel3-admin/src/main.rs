//! Channel3 admin CLI.
//!
//! The command-line counterpart of the module's admin settings page: connect
//! a store to a Channel3 merchant account, disconnect it, or show its status.
//! Platform and connection state live in a JSON store file so repeated
//! invocations converge the same way repeated form submissions do.

mod observability;
mod store;

use std::{path::PathBuf, process::ExitCode, sync::Arc};

use channel3_bridge::{
    admin::{SettingsView, validate_merchant_id},
    config::{ConfigScope, MemoryConfigBackend},
    connection::Connection,
    handshake::{ClientConfig, ConnectClient, Handshake},
    platform::MemoryPlatform,
    provision::CredentialProvisioner,
    state::ConnectionStateStore,
};
use clap::{Parser, Subcommand};

use crate::store::{StoreFile, StoreSnapshot};

#[derive(Debug, Parser)]
#[command(name = "channel3-admin", version, about = "Manage a store's Channel3 connection")]
struct Cli {
    /// JSON store file holding platform and connection state.
    #[arg(long, default_value = "channel3-store.json")]
    store: PathBuf,

    /// Store view the connection applies to (default scope when omitted).
    #[arg(long)]
    store_view: Option<u32>,

    /// Channel3 API origin override; beats the stored api_url config key.
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Connect this store to a Channel3 merchant account.
    Connect {
        /// 4-character merchant id from the Channel3 dashboard.
        merchant_id: String,

        /// Public base URL of the storefront being linked.
        #[arg(long)]
        store_url: String,
    },
    /// Disconnect this store (local only; platform credentials are kept).
    Disconnect,
    /// Show the connection status.
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    observability::init(observability::LogFormat::from_env());

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let store = StoreFile::new(cli.store);
    let snapshot = store.load()?;

    let platform = Arc::new(MemoryPlatform::from_snapshot(snapshot.platform));
    let config = Arc::new(MemoryConfigBackend::from_snapshot(snapshot.config));
    let scope = cli.store_view.map_or(ConfigScope::Default, ConfigScope::Store);
    let state = ConnectionStateStore::new(config.clone(), scope);
    tracing::debug!(scope = %scope, "store file loaded");

    match cli.command {
        Command::Connect { merchant_id, store_url } => {
            let merchant_id = match validate_merchant_id(&merchant_id) {
                Ok(id) => id,
                Err(e) => {
                    println!("{e}");
                    return Ok(ExitCode::FAILURE);
                }
            };

            let mut client_config = ClientConfig::default();
            if let Some(api_url) = cli.api_url {
                client_config.base_url = api_url;
            } else {
                client_config = client_config.resolved(config.as_ref(), scope)?;
            }
            let client = ConnectClient::with_config(client_config)?;

            let connection = build_connection(&platform, client, state, store_url);
            let report = connection.connect(&merchant_id).await;

            store.save(&StoreSnapshot {
                platform: platform.snapshot(),
                config: config.snapshot(),
            })?;
            println!("{}", report.message);
            Ok(exit_code(report.success))
        }
        Command::Disconnect => {
            let connection =
                build_connection(&platform, ConnectClient::new()?, state, String::new());
            let report = connection.disconnect();

            store.save(&StoreSnapshot {
                platform: platform.snapshot(),
                config: config.snapshot(),
            })?;
            println!("{}", report.message);
            Ok(exit_code(report.success))
        }
        Command::Status => {
            let view = SettingsView::from_state(&state.load()?);
            if view.connected {
                println!("Connected to Channel3 merchant {}", view.merchant_id);
            } else {
                println!("Not connected to Channel3");
            }
            println!("Dashboard: {}", view.dashboard_url);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_connection<H: Handshake>(
    platform: &Arc<MemoryPlatform>,
    handshake: H,
    state: ConnectionStateStore,
    store_url: String,
) -> Connection<H> {
    Connection::new(
        CredentialProvisioner::new(platform.clone(), platform.clone()),
        handshake,
        state,
        store_url,
    )
}

fn exit_code(success: bool) -> ExitCode {
    if success { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
