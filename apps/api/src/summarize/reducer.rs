//! Reducer: hierarchical merge of ordered chunk results into one artifact.
//!
//! Each level partitions the surviving nodes into consecutive groups of at most `fan_in`.
//! Groups of one pass through untouched; every larger group costs exactly one completion
//! call. Levels repeat until one node remains, so the tree height is ⌈log_fan_in(N)⌉.
//! Document order is never changed: groups are consecutive and outputs are slot-ordered.

use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::batch::{run_batch, BatchCancelled, BatchOptions};
use crate::llm_client::{CompletionError, TextCompletion};
use crate::summarize::analysis::AnalysisKind;
use crate::summarize::chunk_processor::ChunkResult;
use crate::summarize::policy::{FailurePolicy, Verdict};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReductionNode {
    /// One successful chunk result.
    Leaf { index: usize, content: String },
    /// Synthesized from a consecutive group of children.
    Internal { covers: Vec<usize>, content: String },
}

impl ReductionNode {
    pub fn content(&self) -> &str {
        match self {
            ReductionNode::Leaf { content, .. } | ReductionNode::Internal { content, .. } => {
                content
            }
        }
    }

    /// Segment indices whose content flows into this node, ascending.
    pub fn covers(&self) -> Vec<usize> {
        match self {
            ReductionNode::Leaf { index, .. } => vec![*index],
            ReductionNode::Internal { covers, .. } => covers.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub artifact: String,
    /// Group sizes of every reduce level, bottom-up.
    pub levels: Vec<Vec<usize>>,
    /// Segment indices whose content is missing from the artifact.
    pub dropped: BTreeSet<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReduceError {
    #[error("fan_in must be at least 2, got {0}")]
    FanInTooSmall(usize),

    #[error("nothing left to reduce: every segment failed")]
    NoCoverage,

    #[error("{failed} of {total} segments lost, which exceeds the failure policy")]
    ThresholdExceeded { failed: usize, total: usize },

    #[error("reduce call covering segments {covers:?} failed: {reason}")]
    GroupFailed { covers: Vec<usize>, reason: String },

    #[error(transparent)]
    Cancelled(#[from] BatchCancelled),
}

pub struct Reducer {
    llm: Arc<dyn TextCompletion>,
    options: BatchOptions,
}

impl Reducer {
    pub fn new(llm: Arc<dyn TextCompletion>, options: BatchOptions) -> Self {
        Self { llm, options }
    }

    /// Reduces chunk results (in index order) to a single artifact.
    ///
    /// Failed chunks are dropped and reported in `Reduction::dropped`. The same `policy`
    /// governs failed chunks and failed reduce calls; losing a reduce call loses every
    /// segment it covered.
    pub async fn reduce(
        &self,
        mut results: Vec<ChunkResult>,
        kind: AnalysisKind,
        target: Option<&str>,
        fan_in: usize,
        policy: FailurePolicy,
        cancel: &CancellationToken,
    ) -> Result<Reduction, ReduceError> {
        if fan_in < 2 {
            return Err(ReduceError::FanInTooSmall(fan_in));
        }

        results.sort_by_key(|r| r.index);
        let total = results.len();
        let mut dropped = BTreeSet::new();
        let mut nodes = Vec::with_capacity(total);

        for result in results {
            if result.is_ok() {
                nodes.push(ReductionNode::Leaf {
                    index: result.index,
                    content: result.content,
                });
            } else {
                warn!(segment = result.index, "dropping failed segment from reduction");
                dropped.insert(result.index);
            }
        }

        check_policy(policy, &dropped, total)?;
        if nodes.is_empty() {
            return Err(ReduceError::NoCoverage);
        }

        let deadline = self.options.call_timeout;
        let llm = &self.llm;
        let mut levels = Vec::new();

        while nodes.len() > 1 {
            let groups: Vec<Vec<ReductionNode>> =
                nodes.chunks(fan_in).map(|g| g.to_vec()).collect();
            let sizes: Vec<usize> = groups.iter().map(Vec::len).collect();
            debug!(level = levels.len() + 1, groups = ?sizes, "reduce level");
            levels.push(sizes);

            let outcomes = run_batch(
                "reduce",
                groups,
                self.options.concurrency,
                cancel,
                |_, group| async move { reduce_group(llm.as_ref(), group, kind, target, deadline).await },
            )
            .await?;

            let mut next = Vec::with_capacity(outcomes.len());
            for outcome in outcomes {
                match outcome {
                    Ok(node) => next.push(node),
                    Err((covers, e)) => {
                        warn!(?covers, "reduce call failed: {e}");
                        if policy == FailurePolicy::Strict {
                            return Err(ReduceError::GroupFailed {
                                covers,
                                reason: e.to_string(),
                            });
                        }
                        dropped.extend(covers);
                        check_policy(policy, &dropped, total)?;
                    }
                }
            }

            if next.is_empty() {
                return Err(ReduceError::NoCoverage);
            }
            nodes = next;
        }

        let artifact = nodes
            .pop()
            .map(|n| n.content().to_string())
            .ok_or(ReduceError::NoCoverage)?;

        info!(
            levels = levels.len(),
            dropped = dropped.len(),
            "reduction complete"
        );

        Ok(Reduction {
            artifact,
            levels,
            dropped,
        })
    }
}

async fn reduce_group(
    llm: &dyn TextCompletion,
    group: Vec<ReductionNode>,
    kind: AnalysisKind,
    target: Option<&str>,
    deadline: Option<std::time::Duration>,
) -> Result<ReductionNode, (Vec<usize>, CompletionError)> {
    if let [only] = group.as_slice() {
        return Ok(only.clone());
    }

    let covers: Vec<usize> = group.iter().flat_map(ReductionNode::covers).collect();
    let prompt = kind.reduce_instruction(&combine(&group), target);
    match llm.complete(&prompt, deadline).await {
        Ok(content) => Ok(ReductionNode::Internal { covers, content }),
        Err(e) => Err((covers, e)),
    }
}

/// Joins a group's contents in order, labelling each part.
fn combine(group: &[ReductionNode]) -> String {
    group
        .iter()
        .enumerate()
        .map(|(i, node)| format!("### Part {}\n{}", i + 1, node.content().trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn check_policy(
    policy: FailurePolicy,
    dropped: &BTreeSet<usize>,
    total: usize,
) -> Result<(), ReduceError> {
    match policy.evaluate(dropped.len(), total) {
        Verdict::Proceed => Ok(()),
        Verdict::Abort => Err(ReduceError::ThresholdExceeded {
            failed: dropped.len(),
            total,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::llm_client::testing::{Scripted, ScriptedCompletion};
    use crate::summarize::chunk_processor::ChunkStatus;

    const TOLERANT: FailurePolicy = FailurePolicy::Tolerate {
        max_failure_rate: 1.0,
    };

    fn ok(index: usize, content: &str) -> ChunkResult {
        ChunkResult {
            index,
            content: content.to_string(),
            status: ChunkStatus::Ok,
        }
    }

    fn failed(index: usize) -> ChunkResult {
        ChunkResult {
            index,
            content: String::new(),
            status: ChunkStatus::Failed("boom".to_string()),
        }
    }

    fn reducer(llm: Arc<ScriptedCompletion>) -> Reducer {
        Reducer::new(llm, BatchOptions::new(4, None))
    }

    fn position(haystack: &str, needle: &str) -> usize {
        haystack.find(needle).unwrap_or(usize::MAX)
    }

    #[tokio::test]
    async fn test_single_result_passes_through_without_calls() {
        let llm = ScriptedCompletion::echo();
        let reduction = reducer(llm.clone())
            .reduce(
                vec![ok(0, "only content")],
                AnalysisKind::Summary,
                None,
                2,
                FailurePolicy::Strict,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(reduction.artifact, "only content");
        assert!(reduction.levels.is_empty());
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_five_results_fan_in_two_takes_three_levels() {
        let llm = ScriptedCompletion::echo();
        let results = (0..5).map(|i| ok(i, &format!("r{i}"))).collect();

        let reduction = reducer(llm.clone())
            .reduce(
                results,
                AnalysisKind::Summary,
                None,
                2,
                FailurePolicy::Strict,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(reduction.levels, vec![vec![2, 2, 1], vec![2, 1], vec![2]]);
        // Singleton groups pass through, so only 2 + 1 + 1 calls are made.
        assert_eq!(llm.call_count(), 4);

        let positions: Vec<usize> = (0..5)
            .map(|i| position(&reduction.artifact, &format!("r{i}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "order lost: {positions:?}");
    }

    #[tokio::test]
    async fn test_height_is_ceil_log_fan_in() {
        for (n, fan_in, height) in [(2, 2, 1), (4, 2, 2), (8, 2, 3), (9, 3, 2), (10, 3, 3), (7, 10, 1)] {
            let llm = ScriptedCompletion::echo();
            let results = (0..n).map(|i| ok(i, &format!("c{i}"))).collect();
            let reduction = reducer(llm)
                .reduce(
                    results,
                    AnalysisKind::Summary,
                    None,
                    fan_in,
                    FailurePolicy::Strict,
                    &CancellationToken::new(),
                )
                .await
                .unwrap();
            assert_eq!(reduction.levels.len(), height, "n={n} fan_in={fan_in}");
            assert!(reduction.levels.iter().flatten().all(|&size| size <= fan_in));
        }
    }

    #[tokio::test]
    async fn test_failed_chunks_are_dropped_without_reordering() {
        let llm = ScriptedCompletion::echo();
        let reduction = reducer(llm.clone())
            .reduce(
                vec![ok(0, "alpha"), failed(1), ok(2, "gamma")],
                AnalysisKind::Summary,
                None,
                4,
                TOLERANT,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(reduction.dropped, BTreeSet::from([1]));
        assert!(position(&reduction.artifact, "alpha") < position(&reduction.artifact, "gamma"));
        assert_eq!(llm.count_matching("boom"), 0);
    }

    #[tokio::test]
    async fn test_strict_policy_halts_on_failed_chunk() {
        let llm = ScriptedCompletion::echo();
        let err = reducer(llm.clone())
            .reduce(
                vec![ok(0, "a"), failed(1)],
                AnalysisKind::Summary,
                None,
                2,
                FailurePolicy::Strict,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert_eq!(err, ReduceError::ThresholdExceeded { failed: 1, total: 2 });
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_reduce_group_drops_its_segments_when_tolerated() {
        let llm = ScriptedCompletion::new(|prompt| {
            if prompt.contains("s2") && !prompt.contains("s0") {
                Scripted::fail("reduce overloaded")
            } else {
                Scripted::reply(crate::llm_client::testing::fenced_payload(prompt))
            }
        });
        let results = (0..4).map(|i| ok(i, &format!("s{i}"))).collect();

        let reduction = reducer(llm)
            .reduce(
                results,
                AnalysisKind::Summary,
                None,
                2,
                FailurePolicy::Tolerate {
                    max_failure_rate: 0.5,
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(reduction.dropped, BTreeSet::from([2, 3]));
        assert!(reduction.artifact.contains("s0") && reduction.artifact.contains("s1"));
        assert!(!reduction.artifact.contains("s3"));
    }

    #[tokio::test]
    async fn test_failed_reduce_group_halts_under_strict() {
        let llm = ScriptedCompletion::new(|_| Scripted::fail("down"));
        let err = reducer(llm)
            .reduce(
                vec![ok(0, "a"), ok(1, "b")],
                AnalysisKind::Summary,
                None,
                2,
                FailurePolicy::Strict,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ReduceError::GroupFailed { ref covers, .. } if covers == &vec![0, 1]));
    }

    #[tokio::test]
    async fn test_fan_in_below_two_is_rejected() {
        let err = reducer(ScriptedCompletion::echo())
            .reduce(
                vec![ok(0, "a")],
                AnalysisKind::Summary,
                None,
                1,
                FailurePolicy::Strict,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err, ReduceError::FanInTooSmall(1));
    }

    #[tokio::test]
    async fn test_all_failed_has_no_coverage() {
        let err = reducer(ScriptedCompletion::echo())
            .reduce(
                vec![failed(0), failed(1)],
                AnalysisKind::Summary,
                None,
                2,
                TOLERANT,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err, ReduceError::NoCoverage);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_reduce_level() {
        let llm = ScriptedCompletion::new(|_| Scripted::reply("x").after(Duration::from_secs(10)));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let r = reducer(llm);
        let run = r.reduce(
            vec![ok(0, "a"), ok(1, "b"), ok(2, "c")],
            AnalysisKind::Summary,
            None,
            2,
            FailurePolicy::Strict,
            &cancel,
        );
        let stop = async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        };
        let (result, ()) = tokio::join!(run, stop);
        assert_eq!(result, Err(ReduceError::Cancelled(BatchCancelled)));
    }
}
