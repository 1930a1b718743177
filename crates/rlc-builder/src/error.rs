use rlc_core::error::{DescriptorError, EmitError};
use thiserror::Error;

/// Failures that reach the caller of a build.
///
/// Declarative-path failures never appear here; they are retried and then
/// replaced by baseline output.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The service model is malformed. Not retried: the baseline reads the same model.
    #[error("invalid service model: {0}")]
    Model(#[from] DescriptorError),

    /// The baseline generator failed, so there is nothing left to fall back to.
    #[error("baseline generator failed for `{context}`: {source}")]
    Baseline {
        context: String,
        #[source]
        source: EmitError,
    },
}
