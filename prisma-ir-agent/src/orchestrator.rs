//! Generation orchestrator.
//!
//! Asks a [`Producer`] for the models of each component, validates every
//! candidate against the static component boundaries and feeds violations
//! back until the candidate is accepted or the retry budget runs out.
//!
//! Components are generated concurrently, one tokio task each. Each task
//! writes exactly one file; the files are assembled in component order
//! after the join barrier and validated once more as a whole. Violations of
//! the whole go back to the components whose files they name.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use prisma_ir::ir::{Application, Component, File};
use prisma_ir::{
    RenderOptions, Renderer, ValidatedApplication, Validator, Violation, Violations, validate,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{AgentResult, OrchestrationError, ProducerError};
use crate::policy::RetryPolicy;
use crate::producer::{Producer, ProposalRequest};

// =============================================================================
// Report
// =============================================================================

/// Result of generating one component.
#[derive(Debug, Clone)]
pub struct ComponentOutcome {
    /// The component
    pub component: Component,

    /// The accepted file, or why there is none
    pub result: AgentResult<File>,
}

/// Result of generating a whole application.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// One outcome per component, in component order
    pub outcomes: Vec<ComponentOutcome>,

    /// The assembled application, when every component was accepted and the
    /// whole passed validation
    pub application: Option<ValidatedApplication>,

    /// Violations of the assembled application
    pub violations: Option<Violations>,

    /// Rendered text keyed by filename
    pub output: Option<BTreeMap<String, String>>,
}

impl GenerationReport {
    /// Whether every component was accepted and the output rendered.
    pub fn is_success(&self) -> bool {
        self.output.is_some()
    }

    /// Failed components.
    pub fn failures(&self) -> impl Iterator<Item = &OrchestrationError> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().err())
    }
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Drives a producer through validation with bounded retries.
#[derive(Debug)]
pub struct Orchestrator<P> {
    producer: Arc<P>,
    policy: RetryPolicy,
    render_options: RenderOptions,
}

impl<P> Clone for Orchestrator<P> {
    fn clone(&self) -> Self {
        Self {
            producer: Arc::clone(&self.producer),
            policy: self.policy,
            render_options: self.render_options.clone(),
        }
    }
}

impl<P: Producer + 'static> Orchestrator<P> {
    /// Create an orchestrator with the default policy.
    pub fn new(producer: P) -> Self {
        Self::from_arc(Arc::new(producer))
    }

    /// Create an orchestrator sharing an existing producer.
    pub fn from_arc(producer: Arc<P>) -> Self {
        Self {
            producer,
            policy: RetryPolicy::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Set the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the options used to render the final output.
    pub fn with_render_options(mut self, render_options: RenderOptions) -> Self {
        self.render_options = render_options;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Generate one component.
    ///
    /// `components` is the full plan; `target` must be one of them. Other
    /// components' tables may be referenced but not defined.
    pub async fn generate_component(
        &self,
        target: &Component,
        components: &[Component],
        context: &str,
    ) -> AgentResult<File> {
        run_component(
            Arc::clone(&self.producer),
            self.policy,
            target.clone(),
            others_of(target, components),
            Arc::from(context),
            Resume::default(),
        )
        .await
        .map(|accepted| accepted.file)
    }

    /// Generate every component concurrently, then validate and render the
    /// assembled application.
    ///
    /// Violations of the assembled application are fed back to the
    /// components whose files they name, which retry within their remaining
    /// attempts. A failed, panicked or aborted component fails only itself.
    #[instrument(skip_all, fields(components = components.len()))]
    pub async fn generate_all(&self, components: &[Component], context: &str) -> GenerationReport {
        let context: Arc<str> = Arc::from(context);
        let max_attempts = self.policy.max_attempts();

        let mut results: Vec<AgentResult<Accepted>> = self
            .run_round(
                components.iter().map(|c| (c, Resume::default())).collect(),
                components,
                &context,
            )
            .await;

        loop {
            let files: Option<Vec<File>> = results
                .iter()
                .map(|result| result.as_ref().ok().map(|accepted| accepted.file.clone()))
                .collect();

            let Some(files) = files else {
                let failed = results.iter().filter(|r| r.is_err()).count();
                warn!(failed, "generation incomplete");
                return self.report(components, results, None);
            };

            let violations = match validate(&Application::new(files), components) {
                Ok(validated) => return self.report(components, results, Some(Ok(validated))),
                Err(violations) => violations,
            };

            let retries = plan_retries(&results, components, &violations, max_attempts);

            if retries.is_empty() {
                warn!(
                    violations = violations.len(),
                    "assembled application rejected"
                );
                return self.report(components, results, Some(Err(violations)));
            }

            info!(
                violations = violations.len(),
                components = retries.len(),
                "assembled application rejected, retrying components"
            );
            let round = retries
                .iter()
                .map(|(index, resume)| (&components[*index], resume.clone()))
                .collect();
            let retried = self.run_round(round, components, &context).await;
            for ((index, _), result) in retries.into_iter().zip(retried) {
                results[index] = result;
            }
        }
    }

    /// Spawn one task per component and wait for all of them.
    async fn run_round(
        &self,
        round: Vec<(&Component, Resume)>,
        components: &[Component],
        context: &Arc<str>,
    ) -> Vec<AgentResult<Accepted>> {
        let handles: Vec<_> = round
            .iter()
            .map(|(target, resume)| {
                tokio::spawn(run_component(
                    Arc::clone(&self.producer),
                    self.policy,
                    (*target).clone(),
                    others_of(target, components),
                    Arc::clone(context),
                    resume.clone(),
                ))
            })
            .collect();

        round
            .iter()
            .zip(join_all(handles).await)
            .map(|((component, _), joined)| {
                joined.unwrap_or_else(|error| {
                    warn!(component = %component.filename, %error, "generation task did not complete");
                    Err(OrchestrationError::Cancelled {
                        component: component.filename.clone(),
                    })
                })
            })
            .collect()
    }

    fn report(
        &self,
        components: &[Component],
        results: Vec<AgentResult<Accepted>>,
        assembled: Option<Result<ValidatedApplication, Violations>>,
    ) -> GenerationReport {
        let outcomes = components
            .iter()
            .zip(results)
            .map(|(component, result)| ComponentOutcome {
                component: component.clone(),
                result: result.map(|accepted| accepted.file),
            })
            .collect();

        match assembled {
            Some(Ok(validated)) => {
                let output = Renderer::new(self.render_options.clone()).render(&validated);
                info!(files = output.len(), "generation complete");
                GenerationReport {
                    outcomes,
                    application: Some(validated),
                    violations: None,
                    output: Some(output),
                }
            }
            Some(Err(violations)) => GenerationReport {
                outcomes,
                application: None,
                violations: Some(violations),
                output: None,
            },
            None => GenerationReport {
                outcomes,
                application: None,
                violations: None,
                output: None,
            },
        }
    }
}

fn others_of(target: &Component, components: &[Component]) -> Arc<[Component]> {
    components
        .iter()
        .filter(|c| c.filename != target.filename)
        .cloned()
        .collect()
}

/// Accepted components named by a violation of the assembled application,
/// paired with the violations to feed back. Components without attempts
/// left are not retried.
fn plan_retries(
    results: &[AgentResult<Accepted>],
    components: &[Component],
    violations: &Violations,
    max_attempts: u32,
) -> Vec<(usize, Resume)> {
    let mut by_file: BTreeMap<&str, Vec<Violation>> = BTreeMap::new();
    for violation in violations.iter() {
        if let Some(file) = violation.path.file.as_deref() {
            by_file.entry(file).or_default().push(violation.clone());
        }
    }

    results
        .iter()
        .zip(components)
        .enumerate()
        .filter_map(|(index, (result, component))| {
            let attempts_used = result.as_ref().ok()?.attempts;
            if attempts_used >= max_attempts {
                return None;
            }
            let feedback = by_file.remove(component.filename.as_str())?;
            Some((
                index,
                Resume {
                    attempts_used,
                    feedback: Some(Violations(feedback)),
                },
            ))
        })
        .collect()
}

/// Where a component's retry loop picks up.
#[derive(Debug, Clone, Default)]
struct Resume {
    attempts_used: u32,
    feedback: Option<Violations>,
}

/// An accepted file and the attempts it took.
#[derive(Debug)]
struct Accepted {
    file: File,
    attempts: u32,
}

/// The retry loop for one component.
#[instrument(skip_all, fields(component = %target.filename))]
async fn run_component<P: Producer + ?Sized>(
    producer: Arc<P>,
    policy: RetryPolicy,
    target: Component,
    others: Arc<[Component]>,
    context: Arc<str>,
    resume: Resume,
) -> AgentResult<Accepted> {
    let max_attempts = policy.max_attempts();
    let mut last_violations = resume.feedback;

    for attempt in resume.attempts_used + 1..=max_attempts {
        if attempt > 1 && !policy.retry_delay().is_zero() {
            tokio::time::sleep(policy.retry_delay()).await;
        }

        let request = ProposalRequest {
            target: target.clone(),
            others: Arc::clone(&others),
            context: Arc::clone(&context),
            attempt,
            feedback: last_violations
                .as_ref()
                .map(|v| v.to_vec())
                .unwrap_or_default(),
        };

        debug!(attempt, "requesting candidate");
        let proposed = match tokio::time::timeout(policy.timeout(), producer.propose(request)).await
        {
            Ok(result) => result,
            Err(_) => Err(ProducerError::Timeout {
                timeout_ms: millis(policy.timeout()),
            }),
        };

        let candidate = match proposed {
            Ok(candidate) => candidate,
            Err(error) if error.is_retryable() && attempt < max_attempts => {
                warn!(attempt, %error, "producer failed, retrying");
                continue;
            }
            Err(error) => {
                warn!(attempt, %error, "producer failed");
                return Err(OrchestrationError::Producer {
                    component: target.filename.clone(),
                    attempts: attempt,
                    source: error,
                });
            }
        };

        let file = candidate.into_file(&target);
        let application = Application::new(vec![file.clone()]);
        let result = Validator::new(std::slice::from_ref(&target))
            .with_other_components(&others)
            .validate(&application);

        match result {
            Ok(_) => {
                info!(attempt, models = file.models.len(), "component accepted");
                return Ok(Accepted {
                    file,
                    attempts: attempt,
                });
            }
            Err(violations) => {
                warn!(
                    attempt,
                    violations = violations.len(),
                    "candidate rejected"
                );
                last_violations = Some(violations);
            }
        }
    }

    Err(OrchestrationError::Exhausted {
        component: target.filename.clone(),
        attempts: max_attempts,
        violations: last_violations.unwrap_or_else(|| Violations(Vec::new())),
    })
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
