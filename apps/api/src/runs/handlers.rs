//! Axum route handlers for background runs.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::reasoning::handlers::ReasoningRequest;
use crate::runs::{RunKind, RunOutput, RunSnapshot};
use crate::state::AppState;
use crate::summarize::handlers::SummaryRequest;

/// POST /api/v1/runs/summaries
///
/// Validates the request, then starts the map-reduce pipeline in the background.
pub async fn handle_start_summary(
    State(state): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> Result<(StatusCode, Json<RunSnapshot>), AppError> {
    let (document, params) = request.into_parts(&state.config)?;
    let summarizer = state.summarizer();

    let snapshot = state
        .runs
        .spawn(RunKind::Summary, move |cancel| async move {
            let artifact = summarizer.summarize(&document, &params, &cancel).await?;
            Ok::<_, AppError>(RunOutput::Summary(artifact))
        })
        .await;

    Ok((StatusCode::ACCEPTED, Json(snapshot)))
}

/// POST /api/v1/runs/reasoning
pub async fn handle_start_reasoning(
    State(state): State<AppState>,
    Json(request): Json<ReasoningRequest>,
) -> Result<(StatusCode, Json<RunSnapshot>), AppError> {
    let (goal, options) = request.into_parts(&state.config)?;
    let reasoner = state.reasoner();

    let snapshot = state
        .runs
        .spawn(RunKind::Reasoning, move |cancel| async move {
            let report = reasoner.run(&goal, &options, &cancel).await?;
            Ok::<_, AppError>(RunOutput::Reasoning(report))
        })
        .await;

    Ok((StatusCode::ACCEPTED, Json(snapshot)))
}

/// GET /api/v1/runs/:id
pub async fn handle_get_run(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> Result<Json<RunSnapshot>, AppError> {
    Ok(Json(state.runs.get(run_id).await?))
}

/// POST /api/v1/runs/:id/cancel
pub async fn handle_cancel_run(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> Result<Json<RunSnapshot>, AppError> {
    Ok(Json(state.runs.cancel(run_id).await?))
}
