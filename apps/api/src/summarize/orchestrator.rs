//! Map-reduce orchestration: the full document analysis pipeline.
//!
//! Flow: validate params → split → process_all (map) → failure policy → reduce → artifact.
//!
//! The artifact is always returned together with `failed_segments`, so a caller can tell a
//! complete result from a partial one without reading the text.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::batch::{BatchCancelled, BatchOptions};
use crate::llm_client::TextCompletion;
use crate::summarize::analysis::{normalize_target, AnalysisKind};
use crate::summarize::chunk_processor::ChunkProcessor;
use crate::summarize::policy::{FailurePolicy, Verdict};
use crate::summarize::reducer::{ReduceError, Reducer};
use crate::summarize::segmenter::{split, SegmentError};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Fully-resolved parameters for one run. Handlers fill defaults from `Config`.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarizeParams {
    pub kind: AnalysisKind,
    pub target: Option<String>,
    pub max_segment_size: usize,
    pub fan_in: usize,
    pub failure_policy: FailurePolicy,
}

impl SummarizeParams {
    pub fn validate(&self) -> Result<(), SummarizeError> {
        if self.max_segment_size == 0 {
            return Err(SummarizeError::InvalidArgument(
                "max_segment_size must be greater than zero".to_string(),
            ));
        }
        if self.fan_in < 2 {
            return Err(SummarizeError::InvalidArgument(format!(
                "fan_in must be at least 2, got {}",
                self.fan_in
            )));
        }
        self.failure_policy
            .validate()
            .map_err(SummarizeError::InvalidArgument)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryArtifact {
    pub kind: AnalysisKind,
    pub artifact: String,
    pub segment_count: usize,
    /// Segments whose content is missing from `artifact`.
    pub failed_segments: BTreeSet<usize>,
    pub reduce_levels: usize,
    /// `true` only when no segment was lost.
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummarizeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{failed} of {total} segments failed, which exceeds the failure policy")]
    ThresholdExceeded { failed: usize, total: usize },

    #[error("no segment produced usable content")]
    NoCoverage,

    #[error("reduce call covering segments {covers:?} failed: {reason}")]
    ReduceFailed { covers: Vec<usize>, reason: String },

    #[error("run cancelled")]
    Cancelled,
}

impl From<SegmentError> for SummarizeError {
    fn from(err: SegmentError) -> Self {
        SummarizeError::InvalidArgument(err.to_string())
    }
}

impl From<BatchCancelled> for SummarizeError {
    fn from(_: BatchCancelled) -> Self {
        SummarizeError::Cancelled
    }
}

impl From<ReduceError> for SummarizeError {
    fn from(err: ReduceError) -> Self {
        match err {
            ReduceError::FanInTooSmall(_) => SummarizeError::InvalidArgument(err.to_string()),
            ReduceError::NoCoverage => SummarizeError::NoCoverage,
            ReduceError::ThresholdExceeded { failed, total } => {
                SummarizeError::ThresholdExceeded { failed, total }
            }
            ReduceError::GroupFailed { covers, reason } => {
                SummarizeError::ReduceFailed { covers, reason }
            }
            ReduceError::Cancelled(_) => SummarizeError::Cancelled,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

pub struct MapReduceOrchestrator {
    processor: ChunkProcessor,
    reducer: Reducer,
}

impl MapReduceOrchestrator {
    pub fn new(llm: Arc<dyn TextCompletion>, options: BatchOptions) -> Self {
        Self {
            processor: ChunkProcessor::new(llm.clone(), options),
            reducer: Reducer::new(llm, options),
        }
    }

    pub async fn summarize(
        &self,
        document: &str,
        params: &SummarizeParams,
        cancel: &CancellationToken,
    ) -> Result<SummaryArtifact, SummarizeError> {
        params.validate()?;
        let target = normalize_target(params.target.as_deref());

        // Step 1: Split
        let segments = split(document, params.max_segment_size)?;
        let segment_count = segments.len();
        info!(
            kind = ?params.kind,
            segment_count,
            max_segment_size = params.max_segment_size,
            "document split"
        );

        // Step 2: Map
        let results = self
            .processor
            .process_all(segments, params.kind, target, cancel)
            .await?;

        // Step 3: Failure policy over the complete manifest
        let failed = results.iter().filter(|r| !r.is_ok()).count();
        if failed > 0 {
            warn!(failed, segment_count, "some segments failed analysis");
        }
        if params.failure_policy.evaluate(failed, segment_count) == Verdict::Abort {
            return Err(SummarizeError::ThresholdExceeded {
                failed,
                total: segment_count,
            });
        }
        if failed == segment_count {
            return Err(SummarizeError::NoCoverage);
        }

        // Step 4: Reduce
        let reduction = self
            .reducer
            .reduce(
                results,
                params.kind,
                target,
                params.fan_in,
                params.failure_policy,
                cancel,
            )
            .await?;

        info!(
            kind = ?params.kind,
            segment_count,
            failed = reduction.dropped.len(),
            levels = reduction.levels.len(),
            "summary complete"
        );

        Ok(SummaryArtifact {
            kind: params.kind,
            complete: reduction.dropped.is_empty(),
            artifact: reduction.artifact,
            segment_count,
            failed_segments: reduction.dropped,
            reduce_levels: reduction.levels.len(),
        })
    }
}
