//! # prisma-ir-agent
//!
//! Generation orchestrator for [`prisma_ir`] schemas.
//!
//! A [`Producer`] (typically backed by a language model) proposes the models
//! of one component at a time. The [`Orchestrator`] validates every proposal
//! against the component plan, returns violations as structured feedback and
//! retries within a [`RetryPolicy`]. Once every component is accepted the
//! assembled application is validated as a whole and rendered.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use prisma_ir::ir::Component;
//! use prisma_ir_agent::{Orchestrator, ReplayProducer, RetryPolicy};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let components = vec![Component::new("schema-01-actors.prisma", "Actors", ["actors_users"])];
//! let producer = ReplayProducer::new().with_candidate(
//!     "schema-01-actors.prisma",
//!     r#"[{"name":"actors_users","primaryField":{"name":"id"}}]"#,
//! );
//!
//! let report = Orchestrator::new(producer)
//!     .with_policy(RetryPolicy::new(3)?)
//!     .generate_all(&components, "A bulletin board.")
//!     .await;
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod orchestrator;
pub mod policy;
pub mod producer;

pub use error::{AgentResult, OrchestrationError, PolicyError, ProducerError};
pub use orchestrator::{ComponentOutcome, GenerationReport, Orchestrator};
pub use policy::RetryPolicy;
pub use producer::{CandidateModels, Producer, ProposalRequest, ReplayProducer};
