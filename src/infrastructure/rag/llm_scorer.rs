//! LLM-based batch relevance scorer
//!
//! Asks the model for one comma-separated score per passage in a single call.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::DomainError;
use crate::domain::llm::LanguageModel;
use crate::domain::rag::prompts::{self, SCORING_SYSTEM, SCORING_TEMPLATE};
use crate::domain::rag::{Passage, RelevanceScorer, ScoreTokens, parse_score_tokens};

/// Relevance scorer that delegates to a language model
#[derive(Debug)]
pub struct LlmRelevanceScorer {
    llm: Arc<dyn LanguageModel>,
    snippet_chars: usize,
}

impl LlmRelevanceScorer {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self {
            llm,
            snippet_chars: 400,
        }
    }

    pub fn with_snippet_chars(mut self, snippet_chars: usize) -> Self {
        self.snippet_chars = snippet_chars;
        self
    }

    fn build_prompt(&self, query: &str, passages: &[Passage]) -> Result<String, DomainError> {
        let contexts = passages
            .iter()
            .enumerate()
            .map(|(i, p)| format!("-- CONTEXT {} --\n{}", i + 1, p.snippet(self.snippet_chars)))
            .collect::<Vec<_>>()
            .join("\n\n");

        prompts::render(
            SCORING_TEMPLATE,
            &[("question", query.to_string()), ("contexts", contexts)],
        )
        .map_err(|e| DomainError::internal(e.to_string()))
    }
}

#[async_trait]
impl RelevanceScorer for LlmRelevanceScorer {
    async fn score_batch(
        &self,
        query: &str,
        passages: &[Passage],
    ) -> Result<ScoreTokens, DomainError> {
        let prompt = self.build_prompt(query, passages)?;

        let reply = self
            .llm
            .complete_with_system(&prompts::system_prompt(SCORING_SYSTEM), &prompt)
            .await?;

        debug!(model = self.llm.model_name(), reply = %reply.trim(), "Relevance scores");

        Ok(parse_score_tokens(&reply))
    }

    fn scorer_name(&self) -> &'static str {
        "llm"
    }
}
