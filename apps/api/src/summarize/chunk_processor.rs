//! Chunk processing: the map phase. One completion call per segment, run as one batch.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::batch::{run_batch, BatchCancelled, BatchOptions};
use crate::llm_client::TextCompletion;
use crate::summarize::analysis::AnalysisKind;
use crate::summarize::segmenter::Segment;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkStatus {
    Ok,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkResult {
    pub index: usize,
    pub content: String,
    pub status: ChunkStatus,
}

impl ChunkResult {
    pub fn is_ok(&self) -> bool {
        self.status == ChunkStatus::Ok
    }
}

pub struct ChunkProcessor {
    llm: Arc<dyn TextCompletion>,
    options: BatchOptions,
}

impl ChunkProcessor {
    pub fn new(llm: Arc<dyn TextCompletion>, options: BatchOptions) -> Self {
        Self { llm, options }
    }

    /// Analyses every segment concurrently. The result has one entry per segment, sorted by
    /// index. A failed call becomes a `Failed` entry; only cancellation fails the whole batch.
    pub async fn process_all(
        &self,
        segments: Vec<Segment>,
        kind: AnalysisKind,
        target: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ChunkResult>, BatchCancelled> {
        let deadline = self.options.call_timeout;
        let llm = &self.llm;

        let mut results = run_batch(
            "chunk",
            segments,
            self.options.concurrency,
            cancel,
            |_, segment| async move {
                let prompt = kind.chunk_instruction(&segment.text, target);
                match llm.complete(&prompt, deadline).await {
                    Ok(content) => {
                        debug!(segment = segment.index, chars = content.len(), "chunk analysed");
                        ChunkResult {
                            index: segment.index,
                            content,
                            status: ChunkStatus::Ok,
                        }
                    }
                    Err(e) => {
                        warn!(segment = segment.index, "chunk analysis failed: {e}");
                        ChunkResult {
                            index: segment.index,
                            content: String::new(),
                            status: ChunkStatus::Failed(e.to_string()),
                        }
                    }
                }
            },
        )
        .await?;

        // Slot order already matches input order; segments may arrive in any index order.
        results.sort_by_key(|r| r.index);
        Ok(results)
    }
}
