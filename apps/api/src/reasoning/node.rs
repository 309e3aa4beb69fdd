use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reasoning::persona::PersonaKind;

/// Lifecycle of a node within one depth level:
/// `Proposed → Critiqued → Refined`, with `Synthesized` for the merged node of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Proposed,
    Critiqued,
    Refined,
    Synthesized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningNode {
    pub id: Uuid,
    pub depth: usize,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub stage: Stage,
    pub persona: PersonaKind,
    /// Latest critique attached to this node, if any.
    pub critique: Option<String>,
    /// Number of critique/refine rounds applied to `content`.
    pub revision: u32,
}

impl ReasoningNode {
    pub fn proposed(
        depth: usize,
        parent_id: Option<Uuid>,
        content: String,
        persona: PersonaKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            depth,
            parent_id,
            content,
            stage: Stage::Proposed,
            persona,
            critique: None,
            revision: 0,
        }
    }

    pub fn synthesized(
        depth: usize,
        parent_id: Option<Uuid>,
        content: String,
        persona: PersonaKind,
    ) -> Self {
        Self {
            stage: Stage::Synthesized,
            ..Self::proposed(depth, parent_id, content, persona)
        }
    }

    /// Attaches a critique. Content is left untouched.
    pub fn with_critique(mut self, critique: String) -> Self {
        self.critique = Some(critique);
        self.stage = Stage::Critiqued;
        self
    }

    /// Replaces content after a refinement round.
    pub fn refined(&self, content: String) -> Self {
        Self {
            content,
            stage: Stage::Refined,
            revision: self.revision + 1,
            ..self.clone()
        }
    }
}
