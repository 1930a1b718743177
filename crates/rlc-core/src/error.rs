use serde_json::Value;
use thiserror::Error;

use crate::model::HttpMethod;

/// Failure to load a service model document.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A malformed service model detected while building descriptors.
///
/// These are never retried and never recovered by falling back: the baseline
/// would see the same input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("operation `{operation}` parameter `{parameter}` has unknown location `{location}`")]
    UnknownParameterLocation {
        operation: String,
        parameter: String,
        location: String,
    },

    #[error("operation `{operation}` declares parameter `{parameter}` more than once")]
    DuplicateParameter {
        operation: String,
        parameter: String,
    },

    #[error("operation under path `{path}` has an empty name")]
    EmptyOperationName { path: String },

    #[error("operation `{operation}` is declared under both `{first}` and `{second}`")]
    DuplicateOperation {
        operation: String,
        first: String,
        second: String,
    },
}

/// A failure inside one emission path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    #[error("render failed: {0}")]
    Render(String),

    #[error("template error: {0}")]
    Template(String),

    #[error("unresolved reference: {0}")]
    UnresolvedReference(String),

    #[error("cannot find module `{0}`")]
    MissingModule(String),

    #[error("{0}")]
    Other(String),
}

/// Non-success status returned by the service, mirroring the generated `createRestError`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("unexpected status code {status} (expected one of {expected:?})")]
pub struct RestError {
    pub status: u16,
    pub expected: Vec<String>,
    pub body: Value,
}

/// Errors raised while executing an operation descriptor against a transport.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Rest(#[from] RestError),

    #[error("missing required argument `{0}`")]
    MissingArgument(String),

    #[error("transport has no response scripted for {method} {url}")]
    TransportExhausted { method: HttpMethod, url: String },

    #[error("page body has no array field `{0}`")]
    MissingPageItems(String),

    #[error("long-running response carries no polling location")]
    MissingPollingLocation,

    #[error("final result path `{0}` not found in response body")]
    MissingResultPath(String),
}
