//! Retrieval-augmented answering agent
//!
//! Answers questions from a document collection through a small state
//! machine: rewrite the question, retrieve passages, rank them with a
//! relevance scorer, and either answer from the best evidence or suspend
//! to ask the user for clarification. Sessions resume when feedback
//! arrives, up to a bounded number of cycles.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use api::state::AppState;
use domain::rag::WorkflowController;
use domain::KnowledgeBase;
use infrastructure::{
    knowledge_base::{DocumentLoader, InMemoryKnowledgeBase, KnowledgeBaseRetriever},
    llm::{LlmProviderFactory, ProviderLanguageModel},
    rag::{InMemorySessionStore, LlmRelevanceScorer},
    services::RagSessionService,
};

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    config
        .workflow
        .validate()
        .context("Invalid workflow configuration")?;

    let provider = LlmProviderFactory::create(&config.llm)
        .with_context(|| format!("Failed to create {} provider", config.llm.provider.as_str()))?;
    info!(
        provider = provider.provider_name(),
        model = %config.llm.model,
        "LLM provider ready"
    );

    let llm = Arc::new(
        ProviderLanguageModel::new(provider, config.llm.model.clone())
            .with_temperature(config.llm.temperature)
            .with_max_tokens(config.llm.max_tokens),
    );

    let knowledge_base = load_knowledge_base(config).await?;

    let retriever = KnowledgeBaseRetriever::new(knowledge_base.clone())
        .with_min_passage_chars(config.knowledge.min_passage_chars);
    let scorer =
        LlmRelevanceScorer::new(llm.clone()).with_snippet_chars(config.workflow.scoring_snippet_chars);

    let controller = WorkflowController::new(
        llm,
        Arc::new(retriever),
        Arc::new(scorer),
        config.workflow.clone(),
    );

    let session_service =
        RagSessionService::new(Arc::new(controller), Arc::new(InMemorySessionStore::new()));

    Ok(AppState::new(Arc::new(session_service), knowledge_base))
}

async fn load_knowledge_base(config: &AppConfig) -> anyhow::Result<Arc<dyn KnowledgeBase>> {
    let knowledge_base: Arc<dyn KnowledgeBase> = Arc::new(InMemoryKnowledgeBase::new("documents"));

    let Some(dir) = &config.knowledge.documents_dir else {
        info!("No documents directory configured, knowledge base is empty");
        return Ok(knowledge_base);
    };

    let documents = DocumentLoader::new(config.knowledge.chunk_size)
        .load_dir(dir)
        .await
        .with_context(|| format!("Failed to load documents from {}", dir))?;

    let report = knowledge_base.upsert(documents).await?;
    for (id, reason) in &report.rejected {
        warn!(document = %id, reason = %reason, "Document skipped");
    }
    info!(
        kb = knowledge_base.name(),
        stored = report.stored,
        rejected = report.rejected.len(),
        "Knowledge base populated"
    );

    Ok(knowledge_base)
}
