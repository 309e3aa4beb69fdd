//! Axum route handlers for the Summaries API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::errors::AppError;
use crate::state::AppState;
use crate::summarize::analysis::AnalysisKind;
use crate::summarize::orchestrator::{SummarizeParams, SummaryArtifact};
use crate::summarize::policy::FailurePolicy;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Everything about a summary run except the document itself.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryOptions {
    pub kind: AnalysisKind,
    #[serde(default)]
    pub target: Option<String>,
    /// Required: there is no default tolerance.
    pub failure_policy: FailurePolicy,
    #[serde(default)]
    pub max_segment_size: Option<usize>,
    #[serde(default)]
    pub fan_in: Option<usize>,
}

impl SummaryOptions {
    /// Fills unset sizes from the service configuration.
    pub fn resolve(self, config: &Config) -> SummarizeParams {
        SummarizeParams {
            kind: self.kind,
            target: self.target,
            max_segment_size: self.max_segment_size.unwrap_or(config.max_segment_size),
            fan_in: self.fan_in.unwrap_or(config.fan_in),
            failure_policy: self.failure_policy,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryRequest {
    pub document: String,
    #[serde(flatten)]
    pub options: SummaryOptions,
}

impl SummaryRequest {
    pub fn into_parts(self, config: &Config) -> Result<(String, SummarizeParams), AppError> {
        if self.document.trim().is_empty() {
            return Err(AppError::Validation("document cannot be empty".to_string()));
        }
        let params = self.options.resolve(config);
        params.validate()?;
        Ok((self.document, params))
    }
}

#[derive(Debug, Serialize)]
pub struct AnalysisKindInfo {
    pub kind: AnalysisKind,
    pub label: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/analysis-kinds
pub async fn handle_list_kinds() -> Json<Vec<AnalysisKindInfo>> {
    Json(
        AnalysisKind::ALL
            .iter()
            .map(|&kind| AnalysisKindInfo {
                kind,
                label: kind.label(),
            })
            .collect(),
    )
}

/// POST /api/v1/summaries
///
/// Runs the full map-reduce pipeline inline. If the client disconnects, the handler future is
/// dropped and every pending completion call with it.
pub async fn handle_summarize(
    State(state): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> Result<Json<SummaryArtifact>, AppError> {
    let (document, params) = request.into_parts(&state.config)?;

    let artifact = state
        .summarizer()
        .summarize(&document, &params, &CancellationToken::new())
        .await?;

    Ok(Json(artifact))
}

/// POST /api/v1/summaries/upload
///
/// Multipart body: `file` (PDF or UTF-8 text) and `options` (JSON `SummaryOptions`).
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SummaryArtifact>, AppError> {
    let mut document: Option<String> = None;
    let mut options: Option<SummaryOptions> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read file: {e}")))?;
                info!(file_name, content_type, size = data.len(), "document uploaded");
                document = Some(extract_document(&file_name, &content_type, data).await?);
            }
            "options" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read options: {e}")))?;
                options = Some(
                    serde_json::from_str(&raw)
                        .map_err(|e| AppError::Validation(format!("Invalid options: {e}")))?,
                );
            }
            _ => {}
        }
    }

    let request = SummaryRequest {
        document: document
            .ok_or_else(|| AppError::Validation("missing 'file' field".to_string()))?,
        options: options
            .ok_or_else(|| AppError::Validation("missing 'options' field".to_string()))?,
    };
    let (document, params) = request.into_parts(&state.config)?;

    let artifact = state
        .summarizer()
        .summarize(&document, &params, &CancellationToken::new())
        .await?;

    Ok(Json(artifact))
}

/// Turns an uploaded file into plain text. PDFs go through `pdf-extract` off the runtime.
pub async fn extract_document(
    file_name: &str,
    content_type: &str,
    data: Bytes,
) -> Result<String, AppError> {
    let is_pdf =
        content_type == "application/pdf" || file_name.to_ascii_lowercase().ends_with(".pdf");

    if is_pdf {
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
            .await
            .map_err(|e| AppError::Internal(e.into()))?
            .map_err(|e| AppError::UnprocessableEntity(format!("Could not read PDF: {e}")))?;
        return Ok(text);
    }

    String::from_utf8(data.to_vec())
        .map_err(|_| AppError::UnprocessableEntity("Uploaded file is not UTF-8 text".to_string()))
}
