use clap::{Parser, Subcommand};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use wd_core::analysis::ProviderRegistry;
use wd_core::changes::DiffSpool;
use wd_core::registry::{DEFAULT_RETENTION_HOURS, TaskRegistry};
use wd_core::{Warden, WardenConfig};
use wd_db::SqliteReportStore;
use wd_events::bus::EventBus;

#[derive(Parser)]
#[command(name = "wd")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Serve,
    Openapi,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve => {
            let db_path =
                std::env::var("WARDEN_DB_PATH").unwrap_or_else(|_| ".warden/reports.db".to_string());
            if let Some(parent) = Path::new(&db_path).parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let changes_dir =
                std::env::var("WARDEN_CHANGES_DIR").unwrap_or_else(|_| ".warden/changes".to_string());
            let port = std::env::var("WARDEN_PORT")
                .ok()
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(4830);
            let retention_hours = std::env::var("WARDEN_RETENTION_HOURS")
                .ok()
                .and_then(|value| value.parse::<i64>().ok())
                .unwrap_or(DEFAULT_RETENTION_HOURS);

            let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port);
            let registry = Arc::new(TaskRegistry::new(chrono::Duration::hours(retention_hours)));
            let event_bus = EventBus::new(1024);
            let warden = Warden::new(
                Arc::clone(&registry),
                Arc::new(ProviderRegistry::with_builtins()),
                Arc::new(DiffSpool::new(changes_dir)),
                Arc::new(SqliteReportStore::new(db_path)),
                event_bus.clone(),
                WardenConfig::default(),
            );
            let state = wd_serve::AppState { warden, event_bus };

            tokio::spawn(wd_serve::sweeper::run(registry));
            if let Err(err) = wd_serve::serve(state, addr).await {
                tracing::error!(error = %err, "serve error");
            }
        }
        Command::Openapi => {
            println!("{}", wd_serve::openapi::generate_spec());
        }
    }
}
