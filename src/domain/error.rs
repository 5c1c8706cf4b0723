use thiserror::Error;

/// Failures raised below the workflow layer
///
/// `Provider` and `KnowledgeBase` come from collaborators outside the process;
/// the rest are local.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DomainError {
    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("invalid input: {message}")]
    Validation { message: String },

    #[error("{provider} call failed: {message}")]
    Provider { provider: String, message: String },

    #[error("bad configuration: {message}")]
    Configuration { message: String },

    #[error("internal failure: {message}")]
    Internal { message: String },

    #[error("session storage failure: {message}")]
    Storage { message: String },

    #[error("knowledge base unavailable: {0}")]
    KnowledgeBase(String),
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::NotFound { message }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Validation { message }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        let (provider, message) = (provider.into(), message.into());
        Self::Provider { provider, message }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Configuration { message }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Internal { message }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Storage { message }
    }

    pub fn knowledge_base(message: impl Into<String>) -> Self {
        Self::KnowledgeBase(message.into())
    }

    /// True for LLM and knowledge-base failures
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(self, Self::Provider { .. } | Self::KnowledgeBase(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_provider() {
        let error = DomainError::provider("openai", "HTTP 503");

        assert_eq!(error.to_string(), "openai call failed: HTTP 503");
        assert!(error.is_collaborator_failure());
    }

    #[test]
    fn test_local_failures() {
        for error in [
            DomainError::validation("k must be positive"),
            DomainError::not_found("session"),
            DomainError::storage("lock poisoned"),
        ] {
            assert!(!error.is_collaborator_failure(), "{error}");
        }

        assert_eq!(
            DomainError::knowledge_base("index offline").to_string(),
            "knowledge base unavailable: index offline"
        );
    }
}
