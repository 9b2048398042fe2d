//! onionwatch command-line entry point.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use onionwatch::alerts::AlertDispatcher;
use onionwatch::analyzer::InferenceClient;
use onionwatch::config::{Config, Settings};
use onionwatch::discovery::IndexDiscovery;
use onionwatch::fetcher::Fetcher;
use onionwatch::monitor::MonitorService;
use onionwatch::report;
use onionwatch::repository::{open_pool, SiteRepository};
use onionwatch::server::{self, AppState};
use onionwatch::transport::ProxyClient;

#[derive(Parser)]
#[command(name = "onionwatch", version, about = "Dark web monitoring and alerting")]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the monitoring loop and the dashboard together.
    Run {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Run a single scan cycle and exit.
    Scan,
    /// Serve the dashboard without the background loop.
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Write the monitoring report to its export path.
    Report,
    /// Request a fresh identity from the proxy.
    Rotate,
}

/// Everything wired together: explicit dependencies, process lifetime.
struct Components {
    store: SiteRepository,
    transport: Arc<ProxyClient>,
    monitor: Arc<MonitorService>,
}

fn build_components(settings: &Settings, config: &Config) -> anyhow::Result<Components> {
    let pool = open_pool(&settings.database_path())
        .with_context(|| format!("opening database at {}", settings.database_path().display()))?;
    let store = SiteRepository::new(pool);

    let transport = Arc::new(ProxyClient::new(
        &settings.socks_proxy,
        &settings.control_endpoint,
        Duration::from_secs(settings.fetch_timeout),
        &settings.user_agent,
    )?);
    let fetcher = Fetcher::new(
        transport.clone(),
        Duration::from_secs(settings.fetch_timeout),
    );

    let discovery = Arc::new(IndexDiscovery::new(
        &settings.index_endpoint,
        &settings.index_query,
        &settings.user_agent,
    )?);

    let analyzer = Arc::new(InferenceClient::new(config.inference.clone())?);
    let alerts = AlertDispatcher::from_config(&config.alerts)?;

    let monitor = Arc::new(MonitorService::new(
        store.clone(),
        discovery,
        fetcher,
        analyzer,
        alerts,
        Duration::from_secs(settings.scan_interval),
    ));

    Ok(Components {
        store,
        transport,
        monitor,
    })
}

fn app_state(components: &Components, settings: &Settings) -> AppState {
    AppState {
        store: components.store.clone(),
        monitor: components.monitor.clone(),
        report_path: settings.report_path.clone(),
        token: settings.dashboard_token.clone(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("onionwatch=info")),
        )
        .init();

    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref());
    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);
    settings.ensure_directories()?;

    let components = build_components(&settings, &config)?;

    match cli.command {
        Command::Run { host, port } => {
            let monitor = components.monitor.clone();
            tokio::spawn(monitor.run());
            server::serve(app_state(&components, &settings), &host, port).await?;
        }
        Command::Scan => {
            let report = components.monitor.run_once().await;
            println!(
                "cycle finished: {} new, {} tracked, {} fetched, {} failed, {} analyzed, {} alerts",
                report.discovered,
                report.known,
                report.fetched,
                report.failed,
                report.analyzed,
                report.alerted
            );
        }
        Command::Serve { host, port } => {
            server::serve(app_state(&components, &settings), &host, port).await?;
        }
        Command::Report => {
            report::write_report(&components.store, &settings.report_path).await?;
            println!("report written to {}", settings.report_path.display());
        }
        Command::Rotate => {
            components.transport.rotate_identity().await?;
            println!("identity rotation requested");
        }
    }

    Ok(())
}
