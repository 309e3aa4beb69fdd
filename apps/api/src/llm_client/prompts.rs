// Shared prompt constants and prompt-building utilities.
// Each engine that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt sent with every completion call.
pub const ANALYST_SYSTEM: &str = "You are a careful, precise analyst. \
    Answer only from the material you are given. \
    Do NOT invent facts, names, or numbers. \
    Do NOT add introductory or closing remarks such as \"Here is the summary\".";

/// Appended to summary-style instructions so merged artifacts keep their provenance.
pub const CITATION_INSTRUCTION: &str = "\
    When a statement depends on a specific passage, keep a short reference to it \
    (a quoted phrase or the section it came from) so readers can trace it back. \
    If a later pass merges several notes, carry those references forward.";

/// Fills `{name}` placeholders in a template in a single pass.
/// Substituted values are never re-scanned, so document text containing braces is safe.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let matched = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (close, *value))
        });

        match matched {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
