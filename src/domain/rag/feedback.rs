//! Feedback collection node

use tracing::{info, warn};

use super::prompts::{self, CLARIFICATION_TEMPLATE};
use super::state::WorkflowState;
use crate::domain::llm::Message;

const PROCEED_WORDS: &[&str] = &["proceed", "continue", "yes", "go", "ok", "okay", "fine"];
const STOP_WORDS: &[&str] = &["stop", "abort", "cancel", "quit", "end", "exit", "no"];

/// Where a resumed session goes next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyRoute {
    /// Retry retrieval with the reply folded into the query
    Rewrite,
    /// Answer with whatever evidence is already ranked
    Answer,
}

/// Builds the clarification prompt and records the user's reply
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedbackCollector {
    honor_control_replies: bool,
}

impl FeedbackCollector {
    pub fn new(honor_control_replies: bool) -> Self {
        Self {
            honor_control_replies,
        }
    }

    /// Prompt shown to the user while the session is suspended
    pub fn clarification_prompt(&self, original_question: &str) -> String {
        prompts::render(
            CLARIFICATION_TEMPLATE,
            &[("question", original_question.to_string())],
        )
        .unwrap_or_else(|e| {
            warn!(error = %e, "Clarification template failed to render");
            format!(
                "I could not find relevant results for \"{}\". Could you add more details?",
                original_question
            )
        })
    }

    /// Record a reply on a suspended session
    ///
    /// The reply is stored and counted even when it is a control word.
    pub fn apply_reply(&self, state: &mut WorkflowState, reply: &str) -> ReplyRoute {
        let reply = reply.trim();

        state.user_feedback = reply.to_string();
        state.feedback_cycle_count += 1;
        state.needs_feedback = false;
        state.pending_prompt = None;
        state.push_message(Message::user(reply));

        let route = if self.honor_control_replies && is_control_reply(reply) {
            ReplyRoute::Answer
        } else {
            ReplyRoute::Rewrite
        };

        info!(
            session_id = %state.session_id(),
            feedback_cycle_count = state.feedback_cycle_count,
            route = ?route,
            "Feedback received"
        );

        route
    }
}

fn is_control_reply(reply: &str) -> bool {
    let normalized = reply
        .trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
        .to_lowercase();

    PROCEED_WORDS.contains(&normalized.as_str()) || STOP_WORDS.contains(&normalized.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clarification_prompt_mentions_question() {
        let prompt = FeedbackCollector::default().clarification_prompt("Who won in 98?");

        assert!(prompt.contains("\"Who won in 98?\""));
        assert!(prompt.contains("clarify"));
    }

    #[test]
    fn test_apply_reply_updates_state() {
        let mut state = WorkflowState::new("q");
        state.needs_feedback = true;
        state.pending_prompt = Some("clarify".to_string());

        let route = FeedbackCollector::default().apply_reply(&mut state, "  football  ");

        assert_eq!(route, ReplyRoute::Rewrite);
        assert_eq!(state.user_feedback, "football");
        assert_eq!(state.feedback_cycle_count, 1);
        assert!(!state.needs_feedback);
        assert!(state.pending_prompt.is_none());
        assert_eq!(
            state.conversation_history().last().unwrap().content,
            "football"
        );
    }

    #[test]
    fn test_control_reply_ignored_by_default() {
        let mut state = WorkflowState::new("q");

        let route = FeedbackCollector::default().apply_reply(&mut state, "proceed");

        assert_eq!(route, ReplyRoute::Rewrite);
    }

    #[test]
    fn test_control_reply_routes_to_answer_when_enabled() {
        let mut state = WorkflowState::new("q");

        let route = FeedbackCollector::new(true).apply_reply(&mut state, "Stop!");

        assert_eq!(route, ReplyRoute::Answer);
        assert_eq!(state.feedback_cycle_count, 1);
        assert_eq!(state.user_feedback, "Stop!");
    }

    #[test]
    fn test_is_control_reply() {
        assert!(is_control_reply("Go."));
        assert!(is_control_reply(" no "));
        assert!(!is_control_reply("go ahead"));
        assert!(is_control_reply("OK"));
        assert!(!is_control_reply("okay so the 1998 final"));
    }
}
