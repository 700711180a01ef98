//! Scan control and result routes.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use mcscout_core::{AcquisitionRequest, CarrierRecord, EntityType};
use mcscout_scraper::{SessionError, SessionStatus};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResponse, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct StartScrapeBody {
    start_mc: u64,
    end_mc: Option<u64>,
    /// Defaults to `carrier`.
    entity_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct StartScrapeData {
    message: &'static str,
    request: AcquisitionRequest,
}

#[derive(Debug, Serialize)]
pub(super) struct StopScrapeData {
    stopped: bool,
    message: &'static str,
}

pub(super) async fn start_scrape(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<StartScrapeBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) =
        body.map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.body_text()))?;

    let entity_type = match body.entity_type.as_deref() {
        Some(raw) => raw
            .parse::<EntityType>()
            .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?,
        None => EntityType::Carrier,
    };
    let request = AcquisitionRequest::new(body.start_mc, body.end_mc, entity_type)
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    state
        .sessions
        .start_session(request, log_progress, |summary| {
            tracing::info!(
                checked = summary.checked,
                found = summary.found,
                reason = ?summary.reason,
                "scraping complete"
            );
        })
        .map_err(|e| map_session_error(req_id.0.clone(), &e))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::new(
            req_id.0,
            StartScrapeData {
                message: "Scraping started successfully",
                request,
            },
        )),
    ))
}

pub(super) async fn stop_scrape(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let stopped = state.sessions.stop_session();
    let message = if stopped {
        "Scraping stopped"
    } else {
        "No scrape in progress"
    };
    Json(ApiResponse::new(req_id.0, StopScrapeData { stopped, message }))
}

pub(super) async fn status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<SessionStatus>> {
    Json(ApiResponse::new(req_id.0, state.sessions.status()))
}

pub(super) async fn list_records(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<CarrierRecord>>> {
    Json(ApiResponse::new(req_id.0, state.sessions.records()))
}

fn log_progress(event: mcscout_scraper::ProgressEvent) {
    tracing::info!(
        identifier = event.identifier,
        status = %event.status,
        "progress"
    );
}

fn map_session_error(request_id: String, error: &SessionError) -> ApiError {
    match error {
        SessionError::AlreadyActive => {
            ApiError::new(request_id, "conflict", "Scraping is already in progress")
        }
        SessionError::InvalidRequest(e) => {
            ApiError::new(request_id, "validation_error", e.to_string())
        }
        SessionError::Client(e) => {
            tracing::error!(error = %e, "could not start scrape session");
            ApiError::new(request_id, "internal_error", "could not start scrape session")
        }
    }
}
