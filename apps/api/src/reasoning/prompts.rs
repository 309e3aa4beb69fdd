// All LLM prompt templates for the reasoning engine.
// Every template opens with the persona directive; {goal} is the session's main goal.

pub const EXPAND_TEMPLATE: &str = r#"You are an expert reasoning agent. Persona: "{persona}"

**Main Goal:**
---
{goal}
---

**Previous Step / Current Context:**
---
{context}
---

Using the context above, define the **next logical step** toward the main goal. Include:
1. A clear title for the step.
2. The specific actions, methods or algorithms it uses.
3. The assumptions it relies on.
4. The risks and edge cases particular to this step.

Do not solve the whole problem. Describe only the immediate next step, as a self-contained analysis the next stage can build on."#;

pub const CRITIQUE_TEMPLATE: &str = r#"You are an expert critic. Persona: "{persona}"

**Main Goal:**
---
{goal}
---

**Proposed Step:**
---
{step}
---

Your task is to critically evaluate the proposed step. Be demanding but fair:
- Does it follow from the goal and the prior context?
- Which flaws, risks or unstated assumptions does it miss?
- Is its scope too broad or too narrow?
- How could it be made more robust, and does it reflect the persona's priorities?

Answer with a bulleted list of actionable feedback."#;

pub const REFINE_TEMPLATE: &str = r#"You are an expert reasoning agent. Persona: "{persona}"

**Main Goal:**
---
{goal}
---

**Original Proposed Step:**
---
{step}
---

**Critique to Address:**
---
{critique}
---

Rewrite the proposed step so that it addresses every point of the critique.
Return a complete, self-contained analysis with the same structure: title, actions, assumptions, risks."#;

pub const SYNTHESIZE_TEMPLATE: &str = r#"You are an expert synthesis agent. Persona: "{persona}"

**Main Goal:**
---
{goal}
---

Several alternative analyses were produced for the current step. Combine them into a single, stronger analysis:
keep the best ideas from each, discard weak, redundant or contradictory points, and make the result coherent.

**Alternatives to Synthesize:**
{alternatives}

Return one complete, self-contained analysis with the standard structure (title, actions, assumptions, risks).
It becomes the definitive plan for this stage."#;

pub const ALTERNATIVE_TEMPLATE: &str = "=== ALTERNATIVE {n} ===\n{body}";

pub const FINAL_REPORT_TEMPLATE: &str = r#"You are an expert technical writer. Persona: "{persona}"

**Original Goal:**
---
{goal}
---

**Full Reasoning Trace:**
---
{trace}
---

Write a polished, comprehensive final report in Markdown that answers the original goal directly.
Use the trace to structure the answer and justify its conclusions, and explain the final plan or solution.
Synthesize rather than repeat the trace; write for the audience the persona implies."#;

/// Context given to the first expansion, before any step exists.
pub const INITIAL_CONTEXT: &str =
    "No steps have been taken yet. Define the first step toward the main goal.";
