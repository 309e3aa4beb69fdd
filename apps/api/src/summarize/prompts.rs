// All LLM prompt templates for the map-reduce analyses.
// Placeholders: {text} (segment or combined notes), {focus} (target sentence),
// {citation} (shared provenance fragment, empty for kinds that do not cite).
// {text} is always the last fenced block.

pub const SUMMARY_CHUNK: &str = r#"You are an expert technical analyst. Write a dense, readable summary of the document segment below.
Capture key concepts, technical details, decisions and action items. Use paragraphs to separate topics.
{focus}
{citation}

---
{text}
---

Write the summary of the segment above."#;

pub const SUMMARY_REDUCE: &str = r#"You are an expert editor. The notes below summarize consecutive parts of one larger document, in order.
Merge them into one cohesive summary that reads naturally from start to finish.
Remove repetition, reconcile contradictions and connect related ideas, but keep every key detail.
{focus}
{citation}

---
{text}
---

Write the merged summary."#;

pub const STYLE_CHUNK: &str = r#"You are an expert literary analyst. Describe the writing style of the segment below so that another writer could reproduce it.
Cover tone and mood, diction, sentence structure, pacing, literary devices and overall voice.
Describe the style, not the content.
{focus}
{citation}

---
{text}
---

Write the style model for this segment."#;

pub const STYLE_REDUCE: &str = r#"You are an expert literary editor. The notes below are style analyses of consecutive parts of one document, in order.
Merge them into a single style model: keep the consistent traits, note any evolution across the document, and drop repetition.
{focus}
{citation}

---
{text}
---

Write the merged style model."#;

pub const RACI_CHUNK: &str = r#"You are an AI systems architect. Extract every task in the segment below and the AI agent roles involved, as RACI assignments
(R = does the work, A = owns the outcome, C = consulted, I = kept informed). Infer agent roles when they are implied.
List each task with its role assignments as a Markdown list.
If the segment has no tasks, say "No RACI elements were identified in this segment."
{focus}

---
{text}
---

List the RACI assignments for the segment above."#;

pub const RACI_REDUCE: &str = r#"You are an AI project manager. The notes below list RACI assignments extracted from consecutive parts of one document.
Build one Markdown table: unique tasks as rows, unique agent roles as columns, one marker per cell (R, A, C or I), blank when unassigned.
Consolidate conflicting markers for the same task and role into the single most appropriate one. Output only the table.
{focus}

---
{text}
---

Write the consolidated RACI table."#;

pub const PRIORITY_CHUNK: &str = r#"You are a project strategist. Extract every ranked or prioritized item in the segment below.
For each item give, when available: the item, its rank or priority level, the ranking criteria, the owner and the status.
If nothing is ranked, say "No ranked items were identified in this segment."
{focus}

---
{text}
---

List the ranked items for the segment above."#;

pub const PRIORITY_REDUCE: &str = r#"You are a program manager. The notes below list prioritized items extracted from consecutive parts of one document.
Build one Markdown table with columns Rank, Item, Criteria, Owner, Status. Merge duplicate items into one row,
sort by rank ascending (order non-numeric levels logically) and use "N/A" for missing values. Output only the table.
{focus}

---
{text}
---

Write the consolidated priority table."#;

pub const HANDOFF_CHUNK: &str = r#"You are preparing a session handoff for another AI. Extract from the segment below, under these headings:
Core Objective & Key Topics; Key Entities & Terminology; Sequence of Events & Decisions; Key Data & Metrics;
Open Questions & Action Items; Technical Context & Assumptions. Write "Not mentioned in this segment." for empty headings.
{focus}

---
{text}
---

Write the structured handoff notes for the segment above."#;

pub const HANDOFF_REDUCE: &str = r#"You are finalizing a session handoff document. The notes below are structured handoff notes for consecutive parts of one document.
Merge them under the same headings, de-duplicate, turn the events into one flowing narrative and consolidate data and action items into master lists.
{focus}

---
{text}
---

Write the merged handoff document."#;

pub const WALKTHROUGH_CHUNK: &str = r#"You are a software architect studying part of a system's code or documentation. From the segment below extract:
Identified Components; Observed Interactions & Data Flow; Inferred Design Rationale; Operational Snippets.
Write "Not identified in this segment." for empty headings.
{focus}

---
{text}
---

Write the structured analysis for the segment above."#;

pub const WALKTHROUGH_REDUCE: &str = r#"You are a principal engineer writing a system walkthrough for a new team member. The notes below analyse consecutive parts of the system.
Write one Markdown document with: High-Level Overview; Core Components & Responsibilities; Key Design Patterns & Rationale;
Example Operational Loop (one common use case, step by step, following the data).
{focus}

---
{text}
---

Write the system walkthrough."#;

pub const AGENT_INSTRUCTIONS_CHUNK: &str = r#"You are a prompt engineer. Distil the segment below into system instructions for an AI agent, under the headings
Core Mission; Constraints & Rules; Capabilities; Persona & Tone.
If nothing can be derived, say "No specific system instructions could be derived from this segment."
{focus}

---
{text}
---

Write the system instructions for the segment above."#;

pub const AGENT_INSTRUCTIONS_REDUCE: &str = r#"You are a senior prompt engineer. The notes below are system-instruction drafts from consecutive parts of one document.
Merge them under the same headings into one master instruction set: remove duplicates, combine similar rules, resolve contradictions.
The result must be usable directly as a system prompt.
{focus}

---
{text}
---

Write the master system instructions."#;

pub const REVERSE_ENGINEERING_CHUNK: &str = r#"You are a software architect reverse engineering a codebase. For the segment below list each component with its purpose,
its explicit dependencies, and any calls to external or opaque services together with the inferred contract (what goes in, what comes out).
If the segment holds nothing architectural, say "No significant architectural elements were identified in this segment."
{focus}

---
{text}
---

Write the architectural analysis for the segment above."#;

pub const REVERSE_ENGINEERING_REDUCE: &str = r#"You are a principal engineer writing a reverse-engineering report and rebuild plan. The notes below analyse consecutive parts of one codebase.
Write one Markdown report with: Project Overview; Inferred Architecture; Core Components & Flow; Key Entry Points; Dependency Map;
Replication Plan for Proprietary Backends; Suggested Build Plan.
{focus}

---
{text}
---

Write the reverse-engineering report."#;

pub const RISK_CHUNK: &str = r#"You are a risk analyst. Extract every risk, uncertainty or threat in the segment below.
For each risk give, when available: description, category (technical, operational, financial, compliance),
probability and impact (high, medium, low), mitigation, owner and status. Use a Markdown list.
If the segment has no risks, say "No risks were identified in this segment."
{focus}

---
{text}
---

List the risks in the segment above."#;

pub const RISK_REDUCE: &str = r#"You are a project manager building the final risk register. The notes below list risks extracted from consecutive parts of one document.
Build one Markdown table with the columns Risk ID, Description, Category, Probability, Impact, Score, Mitigation, Owner and Status.
Merge entries that describe the same risk, number the risks R1, R2 and onward, and score them as probability times impact
(high = 3, medium = 2, low = 1). Use "N/A" for anything the notes do not state. Output only the table.
{focus}

---
{text}
---

Write the consolidated risk register."#;

pub const SWOT_CHUNK: &str = r#"You are a strategic analyst. From the segment below extract points for a SWOT analysis under four headings:
Strengths and Weaknesses (internal), Opportunities and Threats (external).
Use only what the text supports; write "Not mentioned in this segment." under any empty heading.
{focus}

---
{text}
---

List the SWOT points for the segment above."#;

pub const SWOT_REDUCE: &str = r#"You are a business strategist. The notes below hold SWOT points extracted from consecutive parts of one document.
Merge them into a single 2x2 Markdown table (Strengths | Weaknesses on the first row, Opportunities | Threats on the second),
removing duplicates and combining similar points. Separate the bullets inside a cell with <br>.
{focus}

---
{text}
---

Write the consolidated SWOT matrix."#;

pub const PROCESS_CHUNK: &str = r#"You are a process analyst. Extract every process flow, sequence of actions or step-by-step instruction in the segment below.
Keep the order of the steps, mark decision points with their outcomes, and note loops. Use a numbered Markdown list,
indenting sub-steps and branches. If the segment has no process, say "No process flow was identified in this segment."
{focus}

---
{text}
---

List the process flow for the segment above."#;

pub const PROCESS_REDUCE: &str = r#"You are a process engineer. The notes below are process fragments extracted from consecutive parts of one document.
Merge them into one start-to-finish process map: drop redundant steps, combine related actions and place every decision
point and branch where it belongs. Use a numbered Markdown list with indented sub-steps.
{focus}

---
{text}
---

Write the consolidated process map."#;

pub const STAKEHOLDER_CHUNK: &str = r#"You are a business analyst. Extract every stakeholder (person, role or group with an interest in the work) in the segment below.
For each give, when available: interests or goals, influence (high, medium, low), alignment (supportive, neutral, opposed)
and an engagement strategy. Use a Markdown list. If there are none, say "No stakeholders were identified in this segment."
{focus}

---
{text}
---

List the stakeholders in the segment above."#;

pub const STAKEHOLDER_REDUCE: &str = r#"You are a project manager building the final stakeholder map. The notes below list stakeholders from consecutive parts of one document.
Build one Markdown table with the columns Stakeholder, Interest / Goals, Influence, Alignment and Engagement Strategy,
one row per unique stakeholder. Use "N/A" for anything the notes do not state. Output only the table.
{focus}

---
{text}
---

Write the consolidated stakeholder map."#;

pub const CHUNK_FOCUS_TARGET: &str = "Focus specifically on \"{target}\". If it does not appear in this material, analyse the material as a whole and say that the target was not found.";
pub const CHUNK_FOCUS_ALL: &str = "Cover the material as a whole.";
pub const REDUCE_FOCUS_TARGET: &str = "The merged result should stay focused on \"{target}\".";
pub const REDUCE_FOCUS_ALL: &str = "The merged result should represent the whole document.";
