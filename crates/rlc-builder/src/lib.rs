//! Chooses between the declarative emitters and the template baseline for
//! every generated file, and checks that the two agree.

pub mod classify;
pub mod equivalence;
pub mod error;
pub mod fallback;
pub mod integration;
pub mod prerequisites;

pub use classify::{FailureCategory, classify_failure};
pub use equivalence::{
    OutputEquivalenceValidator, ValidationResult, ValidationSummary, compare_outputs, normalize,
};
pub use error::BuildError;
pub use fallback::{
    ErrorStatistics, FailureReport, FallbackCoordinator, FallbackState, Outcome, RetryPolicy,
};
pub use integration::{BuilderIntegration, EmissionRecord, Emitted, GeneratedPackage};
pub use prerequisites::{PrerequisiteReport, validate_prerequisites};

use rlc_baseline::TemplateEmitter;
use rlc_core::config::FeatureFlags;
use rlc_core::error::EmitError;
use rlc_core::model::ServiceModel;
use rlc_declarative::DeclarativeEmitter;

/// The two stock emission paths, constructed once per process.
pub struct Emitters {
    pub declarative: DeclarativeEmitter,
    pub baseline: TemplateEmitter,
}

impl Emitters {
    pub fn new() -> Result<Self, EmitError> {
        Ok(Self {
            declarative: DeclarativeEmitter::new(),
            baseline: TemplateEmitter::new()?,
        })
    }

    /// An integration over `model` using these emitters.
    pub fn integration<'a>(
        &'a self,
        model: ServiceModel,
        flags: FeatureFlags,
        coordinator: &'a FallbackCoordinator,
    ) -> BuilderIntegration<'a> {
        BuilderIntegration::new(model, flags, &self.declarative, &self.baseline, coordinator)
    }

    pub fn validator(&self) -> OutputEquivalenceValidator<'_> {
        OutputEquivalenceValidator::new(&self.declarative, &self.baseline)
    }
}
