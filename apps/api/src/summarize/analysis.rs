//! Analysis kinds: each kind is an immutable pair of chunk/reduce instruction templates.

use serde::{Deserialize, Serialize};

use crate::llm_client::prompts::{fill, CITATION_INSTRUCTION};
use crate::summarize::prompts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Summary,
    StyleModel,
    RaciMatrix,
    PriorityRanking,
    SessionHandoff,
    SystemWalkthrough,
    AgentSystemInstructions,
    ReverseEngineering,
    RiskRegister,
    SwotAnalysis,
    ProcessFlow,
    StakeholderMap,
}

/// The two templates that define one analysis kind.
#[derive(Debug, Clone, Copy)]
struct InstructionPair {
    chunk: &'static str,
    reduce: &'static str,
    cites_sources: bool,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 12] = [
        AnalysisKind::Summary,
        AnalysisKind::StyleModel,
        AnalysisKind::RaciMatrix,
        AnalysisKind::PriorityRanking,
        AnalysisKind::SessionHandoff,
        AnalysisKind::SystemWalkthrough,
        AnalysisKind::AgentSystemInstructions,
        AnalysisKind::ReverseEngineering,
        AnalysisKind::RiskRegister,
        AnalysisKind::SwotAnalysis,
        AnalysisKind::ProcessFlow,
        AnalysisKind::StakeholderMap,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AnalysisKind::Summary => "Summary",
            AnalysisKind::StyleModel => "Style model",
            AnalysisKind::RaciMatrix => "RACI matrix",
            AnalysisKind::PriorityRanking => "Priority ranking",
            AnalysisKind::SessionHandoff => "Session handoff",
            AnalysisKind::SystemWalkthrough => "System walkthrough",
            AnalysisKind::AgentSystemInstructions => "Agent system instructions",
            AnalysisKind::ReverseEngineering => "Reverse engineering report",
            AnalysisKind::RiskRegister => "Risk register",
            AnalysisKind::SwotAnalysis => "SWOT analysis",
            AnalysisKind::ProcessFlow => "Process flow",
            AnalysisKind::StakeholderMap => "Stakeholder map",
        }
    }

    fn templates(self) -> InstructionPair {
        let (chunk, reduce, cites_sources) = match self {
            AnalysisKind::Summary => (SUMMARY_CHUNK, SUMMARY_REDUCE, true),
            AnalysisKind::StyleModel => (STYLE_CHUNK, STYLE_REDUCE, true),
            AnalysisKind::RaciMatrix => (RACI_CHUNK, RACI_REDUCE, false),
            AnalysisKind::PriorityRanking => (PRIORITY_CHUNK, PRIORITY_REDUCE, false),
            AnalysisKind::SessionHandoff => (HANDOFF_CHUNK, HANDOFF_REDUCE, false),
            AnalysisKind::SystemWalkthrough => (WALKTHROUGH_CHUNK, WALKTHROUGH_REDUCE, false),
            AnalysisKind::AgentSystemInstructions => {
                (AGENT_INSTRUCTIONS_CHUNK, AGENT_INSTRUCTIONS_REDUCE, false)
            }
            AnalysisKind::ReverseEngineering => {
                (REVERSE_ENGINEERING_CHUNK, REVERSE_ENGINEERING_REDUCE, false)
            }
            AnalysisKind::RiskRegister => (RISK_CHUNK, RISK_REDUCE, false),
            AnalysisKind::SwotAnalysis => (SWOT_CHUNK, SWOT_REDUCE, false),
            AnalysisKind::ProcessFlow => (PROCESS_CHUNK, PROCESS_REDUCE, false),
            AnalysisKind::StakeholderMap => (STAKEHOLDER_CHUNK, STAKEHOLDER_REDUCE, false),
        };
        InstructionPair {
            chunk,
            reduce,
            cites_sources,
        }
    }

    /// Instruction for one segment.
    pub fn chunk_instruction(self, segment_text: &str, target: Option<&str>) -> String {
        let focus = match normalize_target(target) {
            Some(t) => fill(CHUNK_FOCUS_TARGET, &[("target", t)]),
            None => CHUNK_FOCUS_ALL.to_string(),
        };
        self.render(self.templates().chunk, segment_text, &focus)
    }

    /// Instruction for merging an ordered group of intermediate results.
    pub fn reduce_instruction(self, combined_text: &str, target: Option<&str>) -> String {
        let focus = match normalize_target(target) {
            Some(t) => fill(REDUCE_FOCUS_TARGET, &[("target", t)]),
            None => REDUCE_FOCUS_ALL.to_string(),
        };
        self.render(self.templates().reduce, combined_text, &focus)
    }

    fn render(self, template: &str, text: &str, focus: &str) -> String {
        let citation = if self.templates().cites_sources {
            CITATION_INSTRUCTION
        } else {
            ""
        };
        fill(
            template,
            &[("focus", focus), ("citation", citation), ("text", text)],
        )
    }
}

/// A blank target, or the literal "all", means no target.
pub fn normalize_target(target: Option<&str>) -> Option<&str> {
    target
        .map(str::trim)
        .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("all"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_embeds_text_in_both_instructions() {
        for kind in AnalysisKind::ALL {
            let chunk = kind.chunk_instruction("SEGMENT-BODY", None);
            let reduce = kind.reduce_instruction("MERGED-BODY", None);
            assert!(chunk.contains("\n---\nSEGMENT-BODY\n---\n"), "{kind:?} chunk");
            assert!(reduce.contains("\n---\nMERGED-BODY\n---\n"), "{kind:?} reduce");
            assert!(!chunk.contains("{text}") && !reduce.contains("{focus}"));
        }
    }

    #[test]
    fn test_target_focuses_instruction() {
        let prompt = AnalysisKind::StyleModel.chunk_instruction("text", Some("  Ishmael "));
        assert!(prompt.contains("Focus specifically on \"Ishmael\""));
    }

    #[test]
    fn test_all_or_blank_target_means_whole_document() {
        assert_eq!(normalize_target(Some("ALL")), None);
        assert_eq!(normalize_target(Some("   ")), None);
        assert_eq!(normalize_target(None), None);
        assert_eq!(normalize_target(Some(" Ahab ")), Some("Ahab"));

        let prompt = AnalysisKind::StyleModel.reduce_instruction("notes", Some("all"));
        assert!(prompt.contains(REDUCE_FOCUS_ALL));
    }

    #[test]
    fn test_citation_only_for_summary_style_kinds() {
        let summary = AnalysisKind::Summary.chunk_instruction("t", None);
        let raci = AnalysisKind::RaciMatrix.chunk_instruction("t", None);
        assert!(summary.contains(CITATION_INSTRUCTION));
        assert!(!raci.contains(CITATION_INSTRUCTION));
    }

    #[test]
    fn test_every_kind_has_its_own_templates() {
        let chunks: std::collections::HashSet<String> = AnalysisKind::ALL
            .iter()
            .map(|k| k.chunk_instruction("x", None))
            .collect();
        let labels: std::collections::HashSet<&str> =
            AnalysisKind::ALL.iter().map(|k| k.label()).collect();
        assert_eq!(chunks.len(), AnalysisKind::ALL.len());
        assert_eq!(labels.len(), AnalysisKind::ALL.len());
    }

    #[test]
    fn test_register_kinds_build_tables() {
        let risk = AnalysisKind::RiskRegister.reduce_instruction("notes", None);
        assert!(risk.contains("Risk ID"));
        let stakeholders = AnalysisKind::StakeholderMap.reduce_instruction("notes", Some("CFO"));
        assert!(stakeholders.contains("Engagement Strategy"));
        assert!(stakeholders.contains("focused on \"CFO\""));
    }

    #[test]
    fn test_kind_serde_is_snake_case() {
        let kind: AnalysisKind = serde_json::from_str("\"raci_matrix\"").unwrap();
        assert_eq!(kind, AnalysisKind::RaciMatrix);
        assert_eq!(
            serde_json::to_string(&AnalysisKind::AgentSystemInstructions).unwrap(),
            "\"agent_system_instructions\""
        );
        let swot: AnalysisKind = serde_json::from_str("\"swot_analysis\"").unwrap();
        assert_eq!(swot, AnalysisKind::SwotAnalysis);
    }
}
