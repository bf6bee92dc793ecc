//! Producer trait and candidate payloads.
//!
//! A producer is the external collaborator that writes models for one
//! component. Its output is untrusted: the orchestrator validates every
//! candidate before accepting it.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use prisma_ir::Violation;
use prisma_ir::ir::{Component, File, Model};
use serde::{Deserialize, Serialize};

use crate::error::ProducerError;

// =============================================================================
// Request / Response
// =============================================================================

/// Everything a producer is told about one attempt.
#[derive(Debug, Clone)]
pub struct ProposalRequest {
    /// The component to write models for
    pub target: Component,

    /// Every other component, read-only. Their tables may be referenced
    /// but must not be defined.
    pub others: Arc<[Component]>,

    /// Opaque requirements text
    pub context: Arc<str>,

    /// Attempt number, starting at 1
    pub attempt: u32,

    /// Violations of the previous candidate, empty on the first attempt
    pub feedback: Vec<Violation>,
}

impl ProposalRequest {
    /// Whether this is a retry.
    pub fn is_retry(&self) -> bool {
        self.attempt > 1
    }
}

/// Models proposed for one component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateModels {
    pub models: Vec<Model>,
}

impl CandidateModels {
    /// Create a candidate.
    pub fn new(models: Vec<Model>) -> Self {
        Self { models }
    }

    /// Decode a candidate from JSON.
    ///
    /// Both `{"models": [...]}` and a bare `[...]` array are accepted.
    ///
    /// # Errors
    /// Returns `ProducerError::Malformed` when the text is not a candidate,
    /// including unknown scalar type names.
    pub fn from_json(json: &str) -> Result<Self, ProducerError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Wrapped(CandidateModels),
            Bare(Vec<Model>),
        }

        match serde_json::from_str::<Wire>(json) {
            Ok(Wire::Wrapped(candidate)) => Ok(candidate),
            Ok(Wire::Bare(models)) => Ok(Self::new(models)),
            Err(_) => {
                // Untagged errors are opaque; decode again for a useful message.
                let error = serde_json::from_str::<CandidateModels>(json)
                    .err()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "not a candidate".to_string());
                Err(ProducerError::Malformed(error))
            }
        }
    }

    /// Wrap the models in the file belonging to `component`.
    pub fn into_file(self, component: &Component) -> File {
        File {
            filename: component.filename.clone(),
            namespace: component.namespace.clone(),
            models: self.models,
        }
    }
}

// =============================================================================
// Producer Trait
// =============================================================================

/// Trait for anything that can propose models for a component.
///
/// # Example
///
/// ```rust,ignore
/// use prisma_ir_agent::{CandidateModels, Producer, ProducerError, ProposalRequest};
/// use futures::future::BoxFuture;
///
/// struct LlmProducer {
///     client: Client,
/// }
///
/// impl Producer for LlmProducer {
///     fn propose(
///         &self,
///         request: ProposalRequest,
///     ) -> BoxFuture<'_, Result<CandidateModels, ProducerError>> {
///         Box::pin(async move {
///             let text = self.client.complete(prompt_for(&request)).await
///                 .map_err(|e| ProducerError::Unavailable(e.to_string()))?;
///             CandidateModels::from_json(&text)
///         })
///     }
/// }
/// ```
pub trait Producer: Send + Sync {
    /// Propose models for `request.target`.
    ///
    /// Implementations should never panic; a panic fails only the
    /// component being generated.
    fn propose(
        &self,
        request: ProposalRequest,
    ) -> BoxFuture<'_, Result<CandidateModels, ProducerError>>;
}

impl<P: Producer + ?Sized> Producer for Arc<P> {
    fn propose(
        &self,
        request: ProposalRequest,
    ) -> BoxFuture<'_, Result<CandidateModels, ProducerError>> {
        (**self).propose(request)
    }
}

// =============================================================================
// Built-in Producers
// =============================================================================

/// Replays pre-recorded candidates, keyed by component filename.
///
/// Every attempt receives the same candidate, so a rejected candidate stays
/// rejected. Useful for checking hand-written or cached producer output.
#[derive(Debug, Clone, Default)]
pub struct ReplayProducer {
    candidates: HashMap<String, String>,
}

impl ReplayProducer {
    /// Create an empty replay producer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the raw JSON candidate for a component filename.
    pub fn with_candidate(mut self, filename: impl Into<String>, json: impl Into<String>) -> Self {
        self.candidates.insert(filename.into(), json.into());
        self
    }

    /// Number of registered candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl Producer for ReplayProducer {
    fn propose(
        &self,
        request: ProposalRequest,
    ) -> BoxFuture<'_, Result<CandidateModels, ProducerError>> {
        Box::pin(async move {
            let json = self
                .candidates
                .get(&request.target.filename)
                .ok_or_else(|| {
                    ProducerError::Unavailable(format!(
                        "no candidate recorded for '{}'",
                        request.target.filename
                    ))
                })?;
            CandidateModels::from_json(json)
        })
    }
}
