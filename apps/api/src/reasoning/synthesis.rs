//! Synthesis: collapses the parallel alternatives of one depth level into a single step.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::llm_client::prompts::fill;
use crate::llm_client::TextCompletion;
use crate::reasoning::persona::PersonaKind;
use crate::reasoning::prompts::{ALTERNATIVE_TEMPLATE, SYNTHESIZE_TEMPLATE};
use crate::reasoning::step_engine::ReasoningError;

#[derive(Clone)]
pub struct SynthesisEngine {
    llm: Arc<dyn TextCompletion>,
    deadline: Option<Duration>,
}

impl SynthesisEngine {
    pub fn new(llm: Arc<dyn TextCompletion>, deadline: Option<Duration>) -> Self {
        Self { llm, deadline }
    }

    /// Merges ordered alternatives into one. A single alternative is returned as-is
    /// without a call.
    pub async fn synthesize(
        &self,
        goal: &str,
        alternatives: &[String],
        persona: &PersonaKind,
    ) -> Result<String, ReasoningError> {
        match alternatives {
            [] => Err(ReasoningError::InvalidArgument(
                "synthesis needs at least one alternative".to_string(),
            )),
            [only] => Ok(only.clone()),
            _ => {
                let listed = alternatives
                    .iter()
                    .enumerate()
                    .map(|(i, body)| {
                        fill(
                            ALTERNATIVE_TEMPLATE,
                            &[("n", &(i + 1).to_string()), ("body", body.trim())],
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n\n");
                let prompt = fill(
                    SYNTHESIZE_TEMPLATE,
                    &[
                        ("persona", persona.directive()),
                        ("goal", goal),
                        ("alternatives", &listed),
                    ],
                );
                debug!(alternatives = alternatives.len(), "synthesizing alternatives");
                self.llm
                    .complete(&prompt, self.deadline)
                    .await
                    .map_err(|source| ReasoningError::Completion {
                        stage: "synthesize",
                        source,
                    })
            }
        }
    }
}
