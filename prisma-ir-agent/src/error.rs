//! Error types for schema generation.

use prisma_ir::Violations;
use thiserror::Error;

/// Result type for orchestration.
pub type AgentResult<T> = Result<T, OrchestrationError>;

/// Failure reported by a producer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProducerError {
    /// The producer did not answer within the policy timeout.
    #[error("Producer timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The producer answered with something that is not a candidate.
    #[error("Malformed candidate: {0}")]
    Malformed(String),

    /// The producer could not be reached.
    #[error("Producer unavailable: {0}")]
    Unavailable(String),

    /// The producer refused the request. Never retried.
    #[error("Producer rejected the request: {0}")]
    Rejected(String),
}

impl ProducerError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ProducerError::Rejected(_))
    }
}

/// Invalid retry policy values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("max_attempts must be between 1 and {max}, got {actual}")]
    MaxAttemptsOutOfRange { max: u32, actual: u32 },

    #[error("timeout must be greater than zero")]
    ZeroTimeout,
}

/// Failure to produce an accepted file for one component.
#[derive(Debug, Clone, Error)]
pub enum OrchestrationError {
    /// Every attempt produced an invalid candidate.
    #[error("Component '{component}' is still invalid after {attempts} attempt(s). {violations}")]
    Exhausted {
        component: String,
        attempts: u32,
        violations: Violations,
    },

    /// The producer failed and no attempts remain, or the failure is final.
    #[error("Component '{component}' failed after {attempts} attempt(s): {source}")]
    Producer {
        component: String,
        attempts: u32,
        #[source]
        source: ProducerError,
    },

    /// The generation task was aborted or panicked.
    #[error("Generation of component '{component}' was cancelled")]
    Cancelled { component: String },
}

impl OrchestrationError {
    /// Filename of the failed component.
    pub fn component(&self) -> &str {
        match self {
            OrchestrationError::Exhausted { component, .. }
            | OrchestrationError::Producer { component, .. }
            | OrchestrationError::Cancelled { component } => component,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(ProducerError::Timeout { timeout_ms: 10 }.is_retryable());
        assert!(ProducerError::Malformed("x".into()).is_retryable());
        assert!(ProducerError::Unavailable("x".into()).is_retryable());
        assert!(!ProducerError::Rejected("x".into()).is_retryable());
    }

    #[test]
    fn test_orchestration_error_display() {
        let error = OrchestrationError::Producer {
            component: "schema-01-actors.prisma".to_string(),
            attempts: 3,
            source: ProducerError::Timeout { timeout_ms: 500 },
        };
        assert_eq!(
            error.to_string(),
            "Component 'schema-01-actors.prisma' failed after 3 attempt(s): Producer timed out after 500ms"
        );
        assert_eq!(error.component(), "schema-01-actors.prisma");
    }
}
