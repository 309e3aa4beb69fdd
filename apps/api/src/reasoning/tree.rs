//! Reasoning tree orchestration.
//!
//! Flow per depth: fan out `breadth` expand → critique → refine cycles → join in slot order →
//! synthesize into one node → that node seeds the next depth. After the last depth a single
//! call turns the full trace into the final report.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::batch::{run_batch, BatchCancelled, BatchOptions};
use crate::llm_client::prompts::fill;
use crate::llm_client::TextCompletion;
use crate::reasoning::node::{ReasoningNode, Stage};
use crate::reasoning::persona::PersonaKind;
use crate::reasoning::prompts::{FINAL_REPORT_TEMPLATE, INITIAL_CONTEXT};
use crate::reasoning::step_engine::{ReasoningError, ReasoningStepEngine};
use crate::reasoning::synthesis::SynthesisEngine;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeOptions {
    pub depth_budget: usize,
    pub breadth: usize,
    pub refinement_rounds: u32,
    pub persona: PersonaKind,
}

impl TreeOptions {
    pub fn validate(&self) -> Result<(), ReasoningError> {
        if self.depth_budget == 0 {
            return Err(ReasoningError::InvalidArgument(
                "depth_budget must be at least 1".to_string(),
            ));
        }
        if self.breadth == 0 {
            return Err(ReasoningError::InvalidArgument(
                "breadth must be at least 1".to_string(),
            ));
        }
        if self.refinement_rounds == 0 {
            return Err(ReasoningError::InvalidArgument(
                "refinement_rounds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReasoningReport {
    pub goal: String,
    pub persona: PersonaKind,
    /// Final Markdown report.
    pub report: String,
    /// Every node in trace order: per depth, the refined alternatives then the synthesis.
    pub nodes: Vec<ReasoningNode>,
    pub depth_reached: usize,
}

impl ReasoningReport {
    pub fn synthesized(&self) -> impl Iterator<Item = &ReasoningNode> {
        self.nodes.iter().filter(|n| n.stage == Stage::Synthesized)
    }
}

impl From<BatchCancelled> for ReasoningError {
    fn from(_: BatchCancelled) -> Self {
        ReasoningError::Cancelled
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

pub struct ReasoningTreeOrchestrator {
    llm: Arc<dyn TextCompletion>,
    options: BatchOptions,
    steps: ReasoningStepEngine,
    synthesis: SynthesisEngine,
}

impl ReasoningTreeOrchestrator {
    pub fn new(llm: Arc<dyn TextCompletion>, options: BatchOptions) -> Self {
        Self {
            steps: ReasoningStepEngine::new(llm.clone(), options.call_timeout),
            synthesis: SynthesisEngine::new(llm.clone(), options.call_timeout),
            llm,
            options,
        }
    }

    pub async fn run(
        &self,
        goal: &str,
        tree: &TreeOptions,
        cancel: &CancellationToken,
    ) -> Result<ReasoningReport, ReasoningError> {
        tree.validate()?;
        if goal.trim().is_empty() {
            return Err(ReasoningError::InvalidArgument(
                "goal must not be empty".to_string(),
            ));
        }

        let persona = &tree.persona;
        let mut nodes: Vec<ReasoningNode> = Vec::new();
        let mut trace: Vec<String> = Vec::new();
        let mut context = INITIAL_CONTEXT.to_string();
        let mut parent_id: Option<Uuid> = None;

        for depth in 0..tree.depth_budget {
            info!(depth, breadth = tree.breadth, "expanding depth level");

            // Step 1: Fan out independent cycles
            let steps = &self.steps;
            let prior = context.as_str();
            let outcomes = run_batch(
                "reasoning_cycles",
                vec![(); tree.breadth],
                self.options.concurrency,
                cancel,
                |_, ()| {
                    steps.run_cycle(
                        goal,
                        prior,
                        persona,
                        depth,
                        parent_id,
                        tree.refinement_rounds,
                    )
                },
            )
            .await?;
            let alternatives = outcomes.into_iter().collect::<Result<Vec<_>, _>>()?;

            // Step 2: Collapse to one node
            let contents: Vec<String> = alternatives.iter().map(|n| n.content.clone()).collect();
            let merged =
                until_cancelled(cancel, self.synthesis.synthesize(goal, &contents, persona))
                    .await??;
            let synthesized =
                ReasoningNode::synthesized(depth, parent_id, merged, persona.clone());

            for (slot, node) in alternatives.iter().enumerate() {
                trace.push(format!(
                    "### Depth {} · Alternative {}\n{}",
                    depth + 1,
                    slot + 1,
                    node.content.trim()
                ));
            }
            if tree.breadth > 1 {
                trace.push(format!(
                    "### Depth {} · Synthesis\n{}",
                    depth + 1,
                    synthesized.content.trim()
                ));
            }
            debug!(depth, id = %synthesized.id, "depth level synthesized");

            // Step 3: Seed the next depth
            context = synthesized.content.clone();
            parent_id = Some(synthesized.id);
            nodes.extend(alternatives);
            nodes.push(synthesized);
        }

        // Step 4: Final report
        let prompt = fill(
            FINAL_REPORT_TEMPLATE,
            &[
                ("persona", persona.directive()),
                ("goal", goal),
                ("trace", &trace.join("\n\n")),
            ],
        );
        let report = until_cancelled(cancel, self.llm.complete(&prompt, self.options.call_timeout))
            .await?
            .map_err(|source| ReasoningError::Completion {
                stage: "final_report",
                source,
            })?;

        let report = ReasoningReport {
            goal: goal.to_string(),
            persona: persona.clone(),
            report,
            nodes,
            depth_reached: tree.depth_budget,
        };
        info!(
            depth_reached = report.depth_reached,
            nodes = report.nodes.len(),
            synthesized = report.synthesized().count(),
            "reasoning run complete"
        );

        Ok(report)
    }
}

/// Races a single call against the run's cancellation token.
async fn until_cancelled<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, ReasoningError>
where
    F: Future<Output = T>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ReasoningError::Cancelled),
        out = fut => Ok(out),
    }
}
