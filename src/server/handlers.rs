//! Request handlers for the dashboard.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use super::templates;
use super::AppState;
use crate::error::MonitorError;
use crate::monitor::TriggerOutcome;
use crate::report;

/// Check the bearer token on guarded routes.
///
/// With no token configured the dashboard is open, which is only
/// appropriate for loopback deployments.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), Response> {
    let Some(expected) = state.token.as_deref() else {
        return Ok(());
    };

    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if provided == Some(expected) {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid or missing token").into_response())
    }
}

fn error_response(e: MonitorError) -> Response {
    match e {
        MonitorError::NotFound(what) => {
            (StatusCode::NOT_FOUND, format!("not found: {what}")).into_response()
        }
        other => {
            tracing::error!(error = %other, "Dashboard request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
    }
}

/// Record listing with the loop's current phase.
pub async fn index(State(state): State<AppState>) -> Response {
    match state.store.get_all().await {
        Ok(sites) => Html(templates::index_page(&sites, state.monitor.phase())).into_response(),
        Err(e) => error_response(e),
    }
}

/// Manually start a scan cycle.
///
/// Rejected with 409 while a cycle is already in flight; cycles never
/// overlap.
pub async fn trigger_scan(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    match state.monitor.clone().trigger() {
        TriggerOutcome::Started => (StatusCode::ACCEPTED, "Scan triggered").into_response(),
        TriggerOutcome::AlreadyRunning => {
            (StatusCode::CONFLICT, "A scan is already running").into_response()
        }
    }
}

/// Mark an alert as handled.
pub async fn acknowledge(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    match state.store.acknowledge(id).await {
        Ok(()) => (StatusCode::OK, "Alert acknowledged").into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct OverrideForm {
    pub new_label: String,
}

/// Operator correction of a stored classification.
pub async fn override_analysis(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i32>,
    Form(form): Form<OverrideForm>,
) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    match state.store.override_analysis(id, &form.new_label).await {
        Ok(()) => (StatusCode::OK, "Analysis overridden").into_response(),
        Err(e) => error_response(e),
    }
}

/// Write the report to its export path and return it.
pub async fn generate_report(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    match report::write_report(&state.store, &state.report_path).await {
        Ok(text) => (StatusCode::OK, text).into_response(),
        Err(e) => error_response(e),
    }
}
