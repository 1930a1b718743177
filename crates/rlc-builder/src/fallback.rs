//! Retry-then-fallback policy shared by every generation target.
//!
//! A [`FallbackCoordinator`] is created once per batch and handed to each
//! build. It owns the per-context failure counters, so two batches never
//! see each other's failures.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use indexmap::IndexMap;
use log::{debug, error, warn};
use rlc_core::EmitterId;
use rlc_core::config::RetryConfig;
use rlc_core::error::EmitError;
use serde::Serialize;

use crate::classify::{FailureCategory, classify_failure};
use crate::error::BuildError;

/// Bounded exponential backoff with a per-context fallback ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Exhausted-retry count at which the declarative path is skipped outright.
    pub fallback_threshold: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay slept after failed attempt `attempt` (1-based): `base * 2^(attempt - 1)`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << exponent)
    }

    /// A policy that never sleeps, for tests and dry runs.
    pub fn immediate(max_attempts: u32, fallback_threshold: u32) -> Self {
        Self {
            max_attempts,
            fallback_threshold,
            base_delay: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryConfig::default().into()
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            fallback_threshold: config.fallback_threshold,
            base_delay: Duration::from_millis(config.base_delay_ms),
        }
    }
}

/// Where a context currently is in the attempt/fallback cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FallbackState {
    NotAttempted,
    Attempting,
    Succeeded,
    Failed,
    FallingBack,
    SucceededViaBaseline,
}

/// The last declarative failure for a context, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    pub context: String,
    pub attempts: u32,
    pub message: String,
    pub category: FailureCategory,
    pub suggested_action: &'static str,
    pub can_recover: bool,
}

impl FailureReport {
    fn new(context: &str, attempts: u32, err: &EmitError) -> Self {
        let message = err.to_string();
        let category = classify_failure(&message);
        Self {
            context: context.to_string(),
            attempts,
            message,
            category,
            suggested_action: category.suggested_action(),
            can_recover: category.can_recover(),
        }
    }
}

/// Result of one guarded call.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub value: T,
    pub via: EmitterId,
    /// Declarative attempts made; zero when the path was disabled or short-circuited.
    pub attempts: u32,
    pub state: FallbackState,
    pub failure: Option<FailureReport>,
}

/// Snapshot of the coordinator's counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorStatistics {
    pub total_errors: u32,
    pub errors_by_context: IndexMap<String, u32>,
    pub categories_by_context: IndexMap<String, FailureCategory>,
    pub fallback_threshold: u32,
    pub max_retries: u32,
}

#[derive(Debug, Default)]
struct Counters {
    errors: IndexMap<String, u32>,
    states: IndexMap<String, FallbackState>,
    categories: IndexMap<String, FailureCategory>,
}

#[derive(Debug, Default)]
pub struct FallbackCoordinator {
    policy: RetryPolicy,
    counters: Mutex<Counters>,
}

impl FallbackCoordinator {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            counters: Mutex::new(Counters::default()),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn counters(&self) -> MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, context: &str, state: FallbackState) {
        debug!("{context}: {state:?}");
        self.counters().states.insert(context.to_string(), state);
    }

    pub fn state(&self, context: &str) -> FallbackState {
        self.counters()
            .states
            .get(context)
            .copied()
            .unwrap_or(FallbackState::NotAttempted)
    }

    pub fn error_count(&self, context: &str) -> u32 {
        self.counters().errors.get(context).copied().unwrap_or(0)
    }

    /// Run `primary` under the retry policy, falling back to `baseline`.
    ///
    /// With `enabled` false the declarative path is not attempted at all.
    /// Baseline failures are returned as [`BuildError::Baseline`].
    pub fn run<T, P, B>(
        &self,
        context: &str,
        enabled: bool,
        mut primary: P,
        baseline: B,
    ) -> Result<Outcome<T>, BuildError>
    where
        P: FnMut() -> Result<T, EmitError>,
        B: FnOnce() -> Result<T, EmitError>,
    {
        if !enabled {
            debug!("{context}: declarative path disabled, using baseline");
            let value = call_baseline(context, baseline)?;
            return Ok(Outcome {
                value,
                via: EmitterId::Baseline,
                attempts: 0,
                state: self.state(context),
                failure: None,
            });
        }

        let prior = self.error_count(context);
        if prior >= self.policy.fallback_threshold {
            warn!(
                "{context}: declarative path failed {prior} times (threshold {}), using baseline",
                self.policy.fallback_threshold
            );
            return self.fall_back(context, 0, None, baseline);
        }

        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_error = None;
        for attempt in 1..=max_attempts {
            self.set_state(context, FallbackState::Attempting);
            match primary() {
                Ok(value) => {
                    self.counters().errors.insert(context.to_string(), 0);
                    self.set_state(context, FallbackState::Succeeded);
                    return Ok(Outcome {
                        value,
                        via: EmitterId::Declarative,
                        attempts: attempt,
                        state: FallbackState::Succeeded,
                        failure: None,
                    });
                }
                Err(err) => {
                    warn!("{context}: declarative attempt {attempt}/{max_attempts} failed: {err}");
                    last_error = Some(err);
                    if attempt < max_attempts {
                        let delay = self.policy.delay_after(attempt);
                        if !delay.is_zero() {
                            thread::sleep(delay);
                        }
                    }
                }
            }
        }

        self.set_state(context, FallbackState::Failed);
        let report = last_error.map(|err| FailureReport::new(context, max_attempts, &err));
        {
            let mut counters = self.counters();
            *counters.errors.entry(context.to_string()).or_insert(0) += 1;
            if let Some(report) = &report {
                counters
                    .categories
                    .insert(context.to_string(), report.category);
            }
        }
        if let Some(report) = &report {
            error!(
                "{context}: all {max_attempts} declarative attempts failed ({}: {}), falling back to baseline",
                report.category, report.message
            );
        }
        self.fall_back(context, max_attempts, report, baseline)
    }

    fn fall_back<T, B>(
        &self,
        context: &str,
        attempts: u32,
        failure: Option<FailureReport>,
        baseline: B,
    ) -> Result<Outcome<T>, BuildError>
    where
        B: FnOnce() -> Result<T, EmitError>,
    {
        self.set_state(context, FallbackState::FallingBack);
        let value = call_baseline(context, baseline)?;
        self.set_state(context, FallbackState::SucceededViaBaseline);
        Ok(Outcome {
            value,
            via: EmitterId::Baseline,
            attempts,
            state: FallbackState::SucceededViaBaseline,
            failure,
        })
    }

    pub fn statistics(&self) -> ErrorStatistics {
        let counters = self.counters();
        ErrorStatistics {
            total_errors: counters.errors.values().sum(),
            errors_by_context: counters.errors.clone(),
            categories_by_context: counters.categories.clone(),
            fallback_threshold: self.policy.fallback_threshold,
            max_retries: self.policy.max_attempts,
        }
    }

    /// Forget every counter and state.
    pub fn reset(&self) {
        *self.counters() = Counters::default();
    }
}

fn call_baseline<T, B>(context: &str, baseline: B) -> Result<T, BuildError>
where
    B: FnOnce() -> Result<T, EmitError>,
{
    baseline().map_err(|source| BuildError::Baseline {
        context: context.to_string(),
        source,
    })
}
