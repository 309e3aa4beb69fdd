//! Axum route handlers for the Reasoning API.

use axum::{extract::State, Json};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::errors::AppError;
use crate::reasoning::persona::PersonaKind;
use crate::reasoning::tree::{ReasoningReport, TreeOptions};
use crate::state::AppState;

const DEFAULT_DEPTH_BUDGET: usize = 3;
const DEFAULT_BREADTH: usize = 3;
const DEFAULT_REFINEMENT_ROUNDS: u32 = 1;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ReasoningRequest {
    pub goal: String,
    #[serde(default)]
    pub persona: PersonaKind,
    #[serde(default)]
    pub depth_budget: Option<usize>,
    #[serde(default)]
    pub breadth: Option<usize>,
    #[serde(default)]
    pub refinement_rounds: Option<u32>,
}

impl ReasoningRequest {
    /// Applies defaults and rejects budgets above the configured caps.
    pub fn into_parts(self, config: &Config) -> Result<(String, TreeOptions), AppError> {
        if self.goal.trim().is_empty() {
            return Err(AppError::Validation("goal cannot be empty".to_string()));
        }

        let options = TreeOptions {
            depth_budget: self
                .depth_budget
                .unwrap_or(DEFAULT_DEPTH_BUDGET.min(config.max_depth_budget)),
            breadth: self
                .breadth
                .unwrap_or(DEFAULT_BREADTH.min(config.max_breadth)),
            refinement_rounds: self.refinement_rounds.unwrap_or(DEFAULT_REFINEMENT_ROUNDS),
            persona: self.persona,
        };
        options.validate()?;

        if options.depth_budget > config.max_depth_budget {
            return Err(AppError::Validation(format!(
                "depth_budget {} exceeds the limit of {}",
                options.depth_budget, config.max_depth_budget
            )));
        }
        if options.breadth > config.max_breadth {
            return Err(AppError::Validation(format!(
                "breadth {} exceeds the limit of {}",
                options.breadth, config.max_breadth
            )));
        }

        Ok((self.goal, options))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/reasoning
///
/// Runs the whole reasoning tree inline and returns every node plus the final report.
pub async fn handle_reason(
    State(state): State<AppState>,
    Json(request): Json<ReasoningRequest>,
) -> Result<Json<ReasoningReport>, AppError> {
    let (goal, options) = request.into_parts(&state.config)?;

    let report = state
        .reasoner()
        .run(&goal, &options, &CancellationToken::new())
        .await?;

    Ok(Json(report))
}
