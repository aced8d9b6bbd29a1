// HTTP request handlers
use crate::application::service_gateway::ControlOutcome;
use crate::domain::chart::Target;
use crate::domain::notification::Notification;
use crate::domain::range::RangeSelection;
use crate::domain::service::{ServiceAction, ServiceEntry, ServiceList};
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::dashboard_registry::DashboardState;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct RangeRequest {
    pub range: String,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    #[serde(flatten)]
    pub state: DashboardState,
    pub ranges: BTreeMap<&'static str, RangeSelection>,
}

#[derive(Debug, Serialize)]
pub struct ServicesView {
    pub entries: Vec<ServiceEntry>,
    /// Set when there is nothing to list.
    pub message: Option<&'static str>,
}

impl From<ServiceList> for ServicesView {
    fn from(list: ServiceList) -> Self {
        let message = list.is_empty().then_some(ServiceList::EMPTY_MESSAGE);
        Self {
            entries: list.entries,
            message,
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Full dashboard snapshot
pub async fn get_dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let view = DashboardView {
        state: state.registry.snapshot(),
        ranges: state
            .controller
            .selections()
            .into_iter()
            .map(|(card, selection)| (card.as_str(), selection))
            .collect(),
    };

    match json_response(&view, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Live dashboard updates (chunked)
pub async fn stream_dashboard(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let rx = state.registry.subscribe();
    stream_from_receiver(rx, state.shutdown.clone(), accepts_brotli(&headers)).await
}

/// Change the range of one card (or `all`) and refetch it
pub async fn select_range(
    Path(target): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<RangeRequest>,
) -> Result<Json<RangeSelection>, (StatusCode, String)> {
    let target: Target = target
        .parse()
        .map_err(|e: String| (StatusCode::NOT_FOUND, e))?;

    state
        .controller
        .apply_user_range(
            target,
            &request.range,
            request.start.as_deref(),
            request.end.as_deref(),
        )
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let card = if target == Target::All { Target::Cpu } else { target };
    Ok(Json(state.controller.selection(card)))
}

/// Rendered service list; fetched on demand if nothing is rendered yet
pub async fn list_services(State(state): State<Arc<AppState>>) -> Result<Json<ServicesView>, StatusCode> {
    if let Some(list) = state.registry.services() {
        return Ok(Json(list.into()));
    }
    state
        .gateway
        .list_services()
        .await
        .map(|list| Json(list.into()))
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)
}

/// Start, stop or restart a service
pub async fn control_service(
    Path((name, action)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ControlOutcome>) {
    let action: ServiceAction = match action.parse() {
        Ok(action) => action,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(ControlOutcome::Failed(e))),
    };

    let outcome = state.gateway.control_service(&name, action).await;
    let status = match outcome {
        ControlOutcome::Applied => StatusCode::OK,
        ControlOutcome::Rejected(_) => StatusCode::BAD_GATEWAY,
        ControlOutcome::Failed(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(outcome))
}

/// Recent user-facing notifications, oldest first
pub async fn list_notifications(State(state): State<Arc<AppState>>) -> Json<Vec<Notification>> {
    Json(state.registry.notifications())
}
