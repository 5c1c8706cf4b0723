//! Workflow controller
//!
//! Drives a [`WorkflowState`] through rewrite, retrieve, rank, gate and
//! either suspends for feedback or answers. A session stops running when it
//! reaches the feedback node (suspended) or the end node (finished).

use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use super::answer::AnswerGenerator;
use super::config::RagConfig;
use super::error::RagError;
use super::feedback::{FeedbackCollector, ReplyRoute};
use super::gate::{FeedbackGate, GateDecision};
use super::ranker::ContextRanker;
use super::retriever::Retriever;
use super::rewriter::QuestionRewriter;
use super::scorer::RelevanceScorer;
use super::session::StepResult;
use super::state::{WorkflowNode, WorkflowState};
use crate::domain::llm::{LanguageModel, Message};

/// Owns the node implementations and the transition rules
pub struct WorkflowController {
    rewriter: QuestionRewriter,
    retriever: Arc<dyn Retriever>,
    ranker: ContextRanker,
    gate: FeedbackGate,
    collector: FeedbackCollector,
    answerer: AnswerGenerator,
    config: RagConfig,
}

impl std::fmt::Debug for WorkflowController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowController")
            .field("retriever", &self.retriever.retriever_name())
            .field("ranker", &self.ranker)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl WorkflowController {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        retriever: Arc<dyn Retriever>,
        scorer: Arc<dyn RelevanceScorer>,
        config: RagConfig,
    ) -> Self {
        let rewriter =
            QuestionRewriter::new(llm.clone()).with_history_exchanges(config.history_exchanges);
        let answerer = AnswerGenerator::new(llm)
            .with_top_n(config.answer_top_n)
            .with_snippet_chars(config.answer_snippet_chars);

        Self {
            rewriter,
            retriever,
            ranker: ContextRanker::new(scorer, config.clone()),
            gate: FeedbackGate::new(config.max_feedback_cycles),
            collector: FeedbackCollector::new(config.honor_control_replies),
            answerer,
            config,
        }
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Create a state for `question` and run it until it suspends or finishes
    pub async fn start(&self, question: &str) -> Result<(WorkflowState, StepResult), RagError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(RagError::EmptyQuestion);
        }

        let mut state = WorkflowState::new(question);
        info!(session_id = %state.session_id(), "Session started");

        let result = self.run(&mut state).await;
        Ok((state, result))
    }

    /// Deliver the user's reply to a suspended session and keep running it
    ///
    /// Fails without touching the state when the session is not suspended or
    /// the reply is blank.
    pub async fn resume(
        &self,
        state: &mut WorkflowState,
        feedback: &str,
    ) -> Result<StepResult, RagError> {
        if !state.is_suspended() {
            return Err(RagError::NotSuspended(state.session_id()));
        }

        if feedback.trim().is_empty() {
            return Err(RagError::EmptyFeedback);
        }

        let next = match self.collector.apply_reply(state, feedback) {
            ReplyRoute::Rewrite => WorkflowNode::Rewrite,
            ReplyRoute::Answer => WorkflowNode::Answer,
        };
        state.transition_to(next);

        Ok(self.run(state).await)
    }

    /// Step until the session suspends or reaches the end node
    pub async fn run(&self, state: &mut WorkflowState) -> StepResult {
        while !state.is_suspended() && !state.is_finished() {
            self.step(state).await;
        }

        StepResult::from_state(state)
    }

    /// Execute the current node and follow its outgoing edge
    #[instrument(
        skip_all,
        fields(
            session_id = %state.session_id(),
            node = %state.node,
            feedback_cycle_count = state.feedback_cycle_count
        )
    )]
    pub async fn step(&self, state: &mut WorkflowState) {
        let next = match state.node {
            WorkflowNode::Rewrite => self.rewrite(state).await,
            WorkflowNode::Retrieve => self.retrieve(state).await,
            WorkflowNode::Rank => self.rank(state).await,
            WorkflowNode::Answer => self.answer(state).await,
            WorkflowNode::ErrorAnswer => self.error_answer(state),
            WorkflowNode::Feedback | WorkflowNode::End => return,
        };

        // A recorded error always short-circuits to the error answer
        let next = if state.error.is_some() && next != WorkflowNode::End {
            WorkflowNode::ErrorAnswer
        } else {
            next
        };

        state.transition_to(next);
    }

    async fn rewrite(&self, state: &mut WorkflowState) -> WorkflowNode {
        state.current_query = self
            .rewriter
            .rewrite(
                state.original_question(),
                state.feedback(),
                state.conversation_history(),
            )
            .await;

        WorkflowNode::Retrieve
    }

    async fn retrieve(&self, state: &mut WorkflowState) -> WorkflowNode {
        let k = self.config.retrieval_k(state.feedback_cycle_count);

        state.candidates = match self.retriever.search(&state.current_query, k).await {
            Ok(passages) => passages
                .into_iter()
                .filter(|p| !p.content().trim().is_empty())
                .take(k as usize)
                .collect(),
            Err(e) if e.is_collaborator_failure() => {
                warn!(error = %e, "Retrieval failed, continuing without candidates");
                Vec::new()
            }
            Err(e) => {
                error!(error = %e, "Retrieval failed");
                state.error = Some(format!("Retrieval failed: {}", e));
                Vec::new()
            }
        };

        info!(k, retrieved = state.candidates.len(), "Retrieved candidates");
        WorkflowNode::Rank
    }

    async fn rank(&self, state: &mut WorkflowState) -> WorkflowNode {
        let outcome = self
            .ranker
            .rank(&state.current_query, &state.candidates)
            .await;

        debug!(
            ranked = outcome.ranked.len(),
            length_fallback = outcome.used_fallback,
            "Candidates ranked"
        );

        state.ranked_candidates = outcome.ranked;
        state.signals = outcome.signals;
        state.needs_feedback = outcome.needs_feedback;

        match self
            .gate
            .decide(state.needs_feedback, state.feedback_cycle_count)
        {
            GateDecision::RequestFeedback => {
                let prompt = self
                    .collector
                    .clarification_prompt(state.original_question());
                state.push_message(Message::assistant(prompt.clone()));
                state.pending_prompt = Some(prompt);
                info!("Requesting feedback");
                WorkflowNode::Feedback
            }
            GateDecision::BudgetExhausted => {
                warn!(
                    max_feedback_cycles = self.gate.max_feedback_cycles(),
                    "Feedback budget exhausted, answering with current evidence"
                );
                WorkflowNode::Answer
            }
            GateDecision::Answer => WorkflowNode::Answer,
        }
    }

    async fn answer(&self, state: &mut WorkflowState) -> WorkflowNode {
        let result = self
            .answerer
            .generate(
                state.original_question(),
                &state.ranked_candidates,
                state.feedback(),
            )
            .await;

        match result {
            Ok(answer) => {
                state.push_message(Message::assistant(answer.clone()));
                state.set_answer(answer);
                info!("Answer generated");
                WorkflowNode::End
            }
            Err(e) => {
                error!(error = %e, "Answer generation failed");
                state.error = Some(format!("Answer generation failed: {}", e));
                WorkflowNode::ErrorAnswer
            }
        }
    }

    fn error_answer(&self, state: &mut WorkflowState) -> WorkflowNode {
        let message = state
            .error
            .clone()
            .unwrap_or_else(|| "The request could not be completed".to_string());

        state.push_message(Message::assistant(message.clone()));
        state.set_answer(message);
        WorkflowNode::End
    }
}
