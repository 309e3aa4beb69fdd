pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::reasoning::handlers as reasoning;
use crate::runs::handlers as runs;
use crate::state::AppState;
use crate::summarize::handlers as summarize;

pub fn build_router(state: AppState) -> Router {
    // Routes that carry whole documents get a larger body cap than axum's default.
    let documents = Router::new()
        .route("/api/v1/summaries", post(summarize::handle_summarize))
        .route("/api/v1/summaries/upload", post(summarize::handle_upload))
        .route("/api/v1/runs/summaries", post(runs::handle_start_summary))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes));

    Router::new()
        .route("/health", get(health::health_handler))
        // Summaries API
        .route("/api/v1/analysis-kinds", get(summarize::handle_list_kinds))
        .merge(documents)
        // Reasoning API
        .route("/api/v1/reasoning", post(reasoning::handle_reason))
        // Background runs
        .route("/api/v1/runs/reasoning", post(runs::handle_start_reasoning))
        .route("/api/v1/runs/:id", get(runs::handle_get_run))
        .route("/api/v1/runs/:id/cancel", post(runs::handle_cancel_run))
        .with_state(state)
}
