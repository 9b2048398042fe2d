//! Web dashboard for the monitoring service.
//!
//! Provides a record listing plus the operator surface: manual scan
//! trigger, alert acknowledgement, analysis override, and report export.
//! Mutating routes are guarded by a static bearer token.

mod handlers;
mod routes;
mod templates;

pub use routes::create_router;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::monitor::MonitorService;
use crate::repository::SiteRepository;

/// Shared state for the dashboard.
#[derive(Clone)]
pub struct AppState {
    pub store: SiteRepository,
    pub monitor: Arc<MonitorService>,
    pub report_path: PathBuf,
    pub token: Option<String>,
}

/// Start the dashboard server.
pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting dashboard at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
