// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::application::fallback_orchestrator::PlanningError;
use crate::application::recovery_plan_service::RecoveryPlanService;
use crate::domain::patient::PatientProfile;

pub struct AppState {
    pub plan_service: Arc<RecoveryPlanService>,
}

pub fn app(service: Arc<RecoveryPlanService>) -> Router {
    let state = Arc::new(AppState {
        plan_service: service,
    });

    Router::new()
        .route("/health", get(health))
        .route("/v1/recovery-plans", post(create_plan))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "providers": state.plan_service.provider_names(),
    }))
}

async fn create_plan(
    State(state): State<Arc<AppState>>,
    Json(profile): Json<PatientProfile>,
) -> Response {
    match state.plan_service.generate(&profile).await {
        Ok(plan) => Json(plan).into_response(),
        Err(e) => error_response(&e),
    }
}

fn error_response(error: &PlanningError) -> Response {
    let status = match error {
        PlanningError::PlanCorrupted { .. } => StatusCode::BAD_GATEWAY,
        PlanningError::AllProvidersExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
        PlanningError::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
        PlanningError::Prompt(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let body = json!({
        "error": error.kind(),
        "message": error.user_message(),
        "retryable": true,
    });

    (status, Json(body)).into_response()
}
