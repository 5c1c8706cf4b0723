//! Prompt texts for the workflow nodes
//!
//! Every system instruction starts with [`LANGUAGE_PROTOCOL`] so replies
//! mirror the language of the user's question.

use std::collections::HashMap;

use crate::domain::prompt::{TemplateError, render_template};

pub const LANGUAGE_PROTOCOL: &str = "\
LANGUAGE PROTOCOL (highest priority)
Always detect the language of the user's question and reply entirely in that language.
For mixed-language input, use the dominant language, or the first one used when unclear.
Never default to a language the user did not use and never switch languages mid-reply.";

pub const REWRITE_SYSTEM: &str = "\
You are a query-optimization expert. Rewrite the user's question so it works better for \
document search. Keep the same language and meaning. Reply with the rewritten query only.";

pub const REWRITE_TEMPLATE: &str = "\
Original question: \"${var:question}\"
${var:history:}${var:feedback:}
Rewrite this question to make it more effective for document search while keeping the same language and meaning.";

pub const SCORING_SYSTEM: &str = "You are a strict relevance scoring specialist.";

pub const SCORING_TEMPLATE: &str = "\
Score how relevant each context is to the question: \"${var:question}\"

Scale:
- 1-3: irrelevant, off-topic or about a different subject
- 4-6: related but missing the specific information needed
- 7-9: relevant but possibly incomplete
- 10: directly answers the question

Return ONLY comma-separated scores in context order (e.g. \"1.5, 8.0, 2.0\").

CONTEXTS TO SCORE:
${var:contexts}";

pub const ANSWER_SYSTEM: &str = "\
Answer the question using ONLY the provided sources. Cite sources inline as [1], [2] and so on, \
matching the source numbers. If the sources do not contain the answer, say so.";

pub const ANSWER_TEMPLATE: &str = "\
Question: ${var:question}

Relevant sources:
${var:sources}

User feedback: ${var:feedback:None}";

pub const CLARIFICATION_TEMPLATE: &str = "\
I searched for information about your question \"${var:question}\" but could not find sufficiently relevant results.

Could you please:
- clarify what specific information you are looking for?
- add keywords, names, dates or other context?
- tell me if I misunderstood your question?";

pub const INSUFFICIENT_INFORMATION_TEMPLATE: &str = "\
I could not find enough information in the available documents to answer \"${var:question}\". \
Try rephrasing the question or adding more specific details.";

/// System instruction with the language protocol prepended
pub fn system_prompt(instruction: &str) -> String {
    format!("{}\n\n{}", LANGUAGE_PROTOCOL, instruction)
}

pub fn render(template: &str, pairs: &[(&'static str, String)]) -> Result<String, TemplateError> {
    let values: HashMap<&str, String> = pairs.iter().cloned().collect();
    render_template(template, &values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_leads_with_language_protocol() {
        let prompt = system_prompt(REWRITE_SYSTEM);

        assert!(prompt.starts_with("LANGUAGE PROTOCOL"));
        assert!(prompt.ends_with(REWRITE_SYSTEM));
    }

    #[test]
    fn test_answer_template_defaults_feedback() {
        let rendered = render(
            ANSWER_TEMPLATE,
            &[
                ("question", "Who won?".to_string()),
                ("sources", "[Source 1: a.txt]\ntext".to_string()),
            ],
        )
        .unwrap();

        assert!(rendered.contains("Question: Who won?"));
        assert!(rendered.ends_with("User feedback: None"));
    }

    #[test]
    fn test_scoring_template_requires_contexts() {
        let result = render(SCORING_TEMPLATE, &[("question", "q".to_string())]);
        assert!(result.is_err());
    }
}
