//! Persona directives: one behavioural directive applied to every call of a reasoning session.

use serde::{Deserialize, Serialize};

pub const NEUTRAL_DIRECTIVE: &str = "Adopt a neutral, objective and analytical persona. \
    Focus on clarity, logic and factual accuracy without a specific professional bias.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "directive", rename_all = "snake_case")]
pub enum PersonaKind {
    Physicist,
    SoftwareEngineer,
    ProjectManager,
    Strategist,
    DataScientist,
    Custom(String),
    #[default]
    None,
}

impl PersonaKind {
    /// The directive text for this persona. A blank custom directive falls back to neutral.
    pub fn directive(&self) -> &str {
        match self {
            PersonaKind::Physicist => {
                "Adopt the persona of a first-principles physicist. Break problems into their \
                fundamental components, insist on causality and logical consistency, and justify \
                each step with established laws or axioms."
            }
            PersonaKind::SoftwareEngineer => {
                "Adopt the persona of a senior software engineer. Break problems into modular \
                components with clear interfaces, weigh robustness, scalability and efficiency, \
                and spell out inputs, outputs, edge cases and integration points for each step."
            }
            PersonaKind::ProjectManager => {
                "Adopt the persona of a project manager. Break goals into deliverables, milestones \
                and timelines, weigh resources, risk and stakeholder communication, and state \
                success criteria in measurable terms of scope, time and budget."
            }
            PersonaKind::Strategist => {
                "Adopt the persona of a business strategist. Analyse the competitive landscape, \
                market trends and long-term implications, weigh opportunities, threats and \
                second-order effects, and frame each step in terms of strategic advantage."
            }
            PersonaKind::DataScientist => {
                "Adopt the persona of a data scientist. Turn problems into hypotheses that data can \
                test, covering collection, feature engineering, model selection and validation \
                with statistical rigour."
            }
            PersonaKind::Custom(directive) if !directive.trim().is_empty() => directive.trim(),
            PersonaKind::Custom(_) | PersonaKind::None => NEUTRAL_DIRECTIVE,
        }
    }
}
