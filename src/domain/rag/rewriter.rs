//! Question rewriting node

use std::sync::Arc;
use tracing::{debug, warn};

use super::prompts::{self, REWRITE_SYSTEM, REWRITE_TEMPLATE};
use crate::domain::llm::{LanguageModel, Message, MessageRole};
use crate::domain::DomainError;

/// Turns the original question plus optional feedback into a search query
///
/// Never fails: any model error or empty reply falls back to the original
/// question verbatim.
#[derive(Debug, Clone)]
pub struct QuestionRewriter {
    llm: Arc<dyn LanguageModel>,
    history_exchanges: usize,
}

impl QuestionRewriter {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self {
            llm,
            history_exchanges: 2,
        }
    }

    pub fn with_history_exchanges(mut self, exchanges: usize) -> Self {
        self.history_exchanges = exchanges;
        self
    }

    pub async fn rewrite(
        &self,
        original_question: &str,
        feedback: Option<&str>,
        history: &[Message],
    ) -> String {
        match self.try_rewrite(original_question, feedback, history).await {
            Ok(query) => {
                debug!(original = %original_question, rewritten = %query, "Question rewritten");
                query
            }
            Err(e) => {
                warn!(error = %e, "Question rewrite failed, using original question");
                original_question.to_string()
            }
        }
    }

    async fn try_rewrite(
        &self,
        original_question: &str,
        feedback: Option<&str>,
        history: &[Message],
    ) -> Result<String, DomainError> {
        let feedback_line = feedback
            .map(|f| format!("User feedback: {}\n", f.trim()))
            .unwrap_or_default();

        let prompt = prompts::render(
            REWRITE_TEMPLATE,
            &[
                ("question", original_question.to_string()),
                ("history", self.history_context(history)),
                ("feedback", feedback_line),
            ],
        )
        .map_err(|e| DomainError::internal(e.to_string()))?;

        let reply = self
            .llm
            .complete_with_system(&prompts::system_prompt(REWRITE_SYSTEM), &prompt)
            .await?;

        clean_query(&reply)
            .ok_or_else(|| DomainError::provider(self.llm.model_name(), "Empty rewrite"))
    }

    /// Last few user/assistant turns, oldest first
    fn history_context(&self, history: &[Message]) -> String {
        if self.history_exchanges == 0 {
            return String::new();
        }

        let turns: Vec<&Message> = history
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .collect();

        // The first turn is the question itself
        if turns.len() <= 1 {
            return String::new();
        }

        let window = self.history_exchanges * 2;
        let start = turns.len().saturating_sub(window);
        let lines: Vec<String> = turns[start..]
            .iter()
            .map(|m| m.to_string())
            .collect();

        format!("Recent conversation:\n{}\n", lines.join("\n"))
    }
}

/// First non-empty line of the reply, without a label or wrapping quotes
fn clean_query(reply: &str) -> Option<String> {
    let line = reply.lines().map(str::trim).find(|l| !l.is_empty())?;

    let line = line
        .strip_prefix("Rewritten query:")
        .or_else(|| line.strip_prefix("Query:"))
        .unwrap_or(line)
        .trim()
        .trim_matches('"')
        .trim();

    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::MockLanguageModel;

    #[tokio::test]
    async fn test_rewrite_uses_model_reply() {
        let llm = Arc::new(MockLanguageModel::new().on("Original question", "\"1998 World Cup winner\"\n"));
        let rewriter = QuestionRewriter::new(llm.clone());

        let query = rewriter
            .rewrite("who won in 98?", None, &[Message::user("who won in 98?")])
            .await;

        assert_eq!(query, "1998 World Cup winner");
        assert!(llm.prompts()[0].starts_with("LANGUAGE PROTOCOL"));
    }

    #[tokio::test]
    async fn test_rewrite_includes_feedback() {
        let llm = Arc::new(MockLanguageModel::new().on("Original question", "football 1998 final"));
        let rewriter = QuestionRewriter::new(llm.clone());

        rewriter
            .rewrite("who won in 98?", Some("the football world cup"), &[])
            .await;

        assert!(llm.prompts()[0].contains("User feedback: the football world cup"));
    }

    #[tokio::test]
    async fn test_rewrite_falls_back_on_failure() {
        let llm = Arc::new(MockLanguageModel::new().fail_on("Original question", "timeout"));
        let rewriter = QuestionRewriter::new(llm);

        let query = rewriter.rewrite("What is RAG?", None, &[]).await;

        assert_eq!(query, "What is RAG?");
    }

    #[tokio::test]
    async fn test_rewrite_falls_back_on_blank_reply() {
        let llm = Arc::new(MockLanguageModel::new().on("Original question", "  \n \"\" "));
        let rewriter = QuestionRewriter::new(llm);

        let query = rewriter.rewrite("What is RAG?", None, &[]).await;

        assert_eq!(query, "What is RAG?");
    }

    #[tokio::test]
    async fn test_history_window_keeps_recent_exchanges() {
        let llm = Arc::new(MockLanguageModel::new().on("Original question", "q"));
        let rewriter = QuestionRewriter::new(llm.clone()).with_history_exchanges(1);

        let history = vec![
            Message::user("first question"),
            Message::assistant("old clarification"),
            Message::user("old reply"),
            Message::assistant("new clarification"),
            Message::user("new reply"),
        ];
        rewriter.rewrite("first question", Some("new reply"), &history).await;

        let prompt = &llm.prompts()[0];
        assert!(prompt.contains("assistant: new clarification"));
        assert!(prompt.contains("user: new reply"));
        assert!(!prompt.contains("old clarification"));
    }

    #[test]
    fn test_clean_query() {
        assert_eq!(clean_query("Rewritten query: \"abc\""), Some("abc".to_string()));
        assert_eq!(clean_query("\n\nfirst\nsecond"), Some("first".to_string()));
        assert_eq!(clean_query("   "), None);
    }
}
