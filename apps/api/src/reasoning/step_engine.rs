//! Reasoning step engine: expand, critique and refine a single node.
//!
//! Persona and goal are fixed for the whole cycle. The engine never decides when a node is
//! good enough: callers choose the number of refinement rounds.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::llm_client::prompts::fill;
use crate::llm_client::{CompletionError, TextCompletion};
use crate::reasoning::node::ReasoningNode;
use crate::reasoning::persona::PersonaKind;
use crate::reasoning::prompts::{CRITIQUE_TEMPLATE, EXPAND_TEMPLATE, REFINE_TEMPLATE};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReasoningError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Reasoning has no partial-success notion: any failed call halts the run.
    #[error("{stage} call failed: {source}")]
    Completion {
        stage: &'static str,
        #[source]
        source: CompletionError,
    },

    #[error("run cancelled")]
    Cancelled,
}

impl ReasoningError {
    fn at(stage: &'static str) -> impl FnOnce(CompletionError) -> Self {
        move |source| ReasoningError::Completion { stage, source }
    }
}

#[derive(Clone)]
pub struct ReasoningStepEngine {
    llm: Arc<dyn TextCompletion>,
    deadline: Option<Duration>,
}

impl ReasoningStepEngine {
    pub fn new(llm: Arc<dyn TextCompletion>, deadline: Option<Duration>) -> Self {
        Self { llm, deadline }
    }

    /// Proposes the next step from the prior context. The new node is `Proposed`.
    pub async fn expand(
        &self,
        goal: &str,
        prior_context: &str,
        persona: &PersonaKind,
        depth: usize,
        parent_id: Option<Uuid>,
    ) -> Result<ReasoningNode, ReasoningError> {
        let prompt = fill(
            EXPAND_TEMPLATE,
            &[
                ("persona", persona.directive()),
                ("goal", goal),
                ("context", prior_context),
            ],
        );
        let content = self
            .llm
            .complete(&prompt, self.deadline)
            .await
            .map_err(ReasoningError::at("expand"))?;
        debug!(depth, "step expanded");
        Ok(ReasoningNode::proposed(depth, parent_id, content, persona.clone()))
    }

    /// Critiques a node. Read-only: the node itself is not modified.
    pub async fn critique(
        &self,
        node: &ReasoningNode,
        goal: &str,
        persona: &PersonaKind,
    ) -> Result<String, ReasoningError> {
        let prompt = fill(
            CRITIQUE_TEMPLATE,
            &[
                ("persona", persona.directive()),
                ("goal", goal),
                ("step", &node.content),
            ],
        );
        self.llm
            .complete(&prompt, self.deadline)
            .await
            .map_err(ReasoningError::at("critique"))
    }

    /// Produces a `Refined` node whose content addresses `critique`.
    pub async fn refine(
        &self,
        node: &ReasoningNode,
        critique: &str,
        goal: &str,
        persona: &PersonaKind,
    ) -> Result<ReasoningNode, ReasoningError> {
        let prompt = fill(
            REFINE_TEMPLATE,
            &[
                ("persona", persona.directive()),
                ("goal", goal),
                ("step", &node.content),
                ("critique", critique),
            ],
        );
        let content = self
            .llm
            .complete(&prompt, self.deadline)
            .await
            .map_err(ReasoningError::at("refine"))?;
        Ok(node.refined(content))
    }

    /// Expand, then `refinement_rounds` rounds of critique → refine.
    pub async fn run_cycle(
        &self,
        goal: &str,
        prior_context: &str,
        persona: &PersonaKind,
        depth: usize,
        parent_id: Option<Uuid>,
        refinement_rounds: u32,
    ) -> Result<ReasoningNode, ReasoningError> {
        let mut node = self
            .expand(goal, prior_context, persona, depth, parent_id)
            .await?;

        for round in 0..refinement_rounds {
            let critique = self.critique(&node, goal, persona).await?;
            node = node.with_critique(critique.clone());
            node = self.refine(&node, &critique, goal, persona).await?;
            debug!(depth, round = round + 1, "step refined");
        }

        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::{Scripted, ScriptedCompletion};
    use crate::reasoning::node::Stage;

    fn scripted() -> Arc<ScriptedCompletion> {
        ScriptedCompletion::new(|prompt| {
            if prompt.contains("**Critique to Address:**") {
                Scripted::reply("refined step")
            } else if prompt.contains("critically evaluate the proposed step") {
                Scripted::reply("- needs more detail")
            } else {
                Scripted::reply("proposed step")
            }
        })
    }

    #[tokio::test]
    async fn test_expand_creates_proposed_node() {
        let llm = scripted();
        let engine = ReasoningStepEngine::new(llm.clone(), None);
        let parent = Uuid::new_v4();

        let node = engine
            .expand("ship v2", "context", &PersonaKind::ProjectManager, 3, Some(parent))
            .await
            .unwrap();

        assert_eq!(node.stage, Stage::Proposed);
        assert_eq!(node.depth, 3);
        assert_eq!(node.parent_id, Some(parent));
        assert_eq!(node.content, "proposed step");
        let prompt = &llm.calls()[0];
        assert!(prompt.contains(PersonaKind::ProjectManager.directive()));
        assert!(prompt.contains("ship v2"));
    }

    #[tokio::test]
    async fn test_critique_does_not_touch_node() {
        let engine = ReasoningStepEngine::new(scripted(), None);
        let node = ReasoningNode::proposed(0, None, "draft".to_string(), PersonaKind::None);
        let critique = engine.critique(&node, "goal", &PersonaKind::None).await.unwrap();
        assert_eq!(critique, "- needs more detail");
        assert_eq!(node.content, "draft");
        assert_eq!(node.stage, Stage::Proposed);
    }

    #[tokio::test]
    async fn test_cycle_runs_requested_rounds() {
        let llm = scripted();
        let engine = ReasoningStepEngine::new(llm.clone(), None);

        let node = engine
            .run_cycle("goal", "ctx", &PersonaKind::Physicist, 0, None, 2)
            .await
            .unwrap();

        assert_eq!(node.stage, Stage::Refined);
        assert_eq!(node.revision, 2);
        assert_eq!(node.content, "refined step");
        assert_eq!(node.critique.as_deref(), Some("- needs more detail"));
        assert_eq!(llm.count_matching("**next logical step**"), 1);
        assert_eq!(llm.count_matching("critically evaluate the proposed step"), 2);
        assert_eq!(llm.count_matching("**Critique to Address:**"), 2);
    }

    #[tokio::test]
    async fn test_failed_call_halts_cycle() {
        let llm = ScriptedCompletion::new(|prompt| {
            if prompt.contains("critically evaluate") {
                Scripted::fail("overloaded")
            } else {
                Scripted::reply("ok")
            }
        });
        let engine = ReasoningStepEngine::new(llm.clone(), None);

        let err = engine
            .run_cycle("goal", "ctx", &PersonaKind::None, 0, None, 1)
            .await
            .unwrap_err();

        assert!(matches!(err, ReasoningError::Completion { stage: "critique", .. }));
        assert_eq!(llm.count_matching("**Critique to Address:**"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_halts_cycle() {
        let llm = ScriptedCompletion::new(|_| {
            Scripted::reply("slow").after(Duration::from_secs(120))
        });
        let engine = ReasoningStepEngine::new(llm, Some(Duration::from_secs(10)));

        let err = engine
            .run_cycle("goal", "ctx", &PersonaKind::None, 0, None, 1)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ReasoningError::Completion {
                stage: "expand",
                source: CompletionError::Timeout(Duration::from_secs(10)),
            }
        );
    }
}
