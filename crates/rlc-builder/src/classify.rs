//! Advisory classification of declarative-path failures.
//!
//! The category only feeds logs and error statistics. Control flow never
//! branches on it: every failure is retried and then falls back the same way.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureCategory {
    /// The component/markup runtime itself misbehaved.
    FrameworkRuntime,
    /// A module or symbol could not be resolved.
    ModuleResolution,
    TypeMismatch,
    RenderFailure,
    Unknown,
}

impl FailureCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCategory::FrameworkRuntime => "frameworkRuntime",
            FailureCategory::ModuleResolution => "moduleResolution",
            FailureCategory::TypeMismatch => "typeMismatch",
            FailureCategory::RenderFailure => "renderFailure",
            FailureCategory::Unknown => "unknown",
        }
    }

    /// What a human might try next. Never applied automatically.
    pub fn suggested_action(&self) -> &'static str {
        match self {
            FailureCategory::FrameworkRuntime => "retry_with_fallback_markup",
            FailureCategory::ModuleResolution => "retry_with_alternative_imports",
            FailureCategory::TypeMismatch => "retry_with_type_assertion",
            FailureCategory::RenderFailure | FailureCategory::Unknown => "fallback_to_baseline",
        }
    }

    pub fn can_recover(&self) -> bool {
        matches!(
            self,
            FailureCategory::FrameworkRuntime
                | FailureCategory::ModuleResolution
                | FailureCategory::TypeMismatch
        )
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a failure by its message. First matching rule wins.
pub fn classify_failure(message: &str) -> FailureCategory {
    let lower = message.to_ascii_lowercase();

    if lower.contains("jsx") || message.contains("React") || lower.contains("markup") {
        return FailureCategory::FrameworkRuntime;
    }
    if lower.contains("cannot find module")
        || lower.contains("unresolved reference")
        || lower.contains("import")
    {
        return FailureCategory::ModuleResolution;
    }
    if (message.contains("Property") && message.contains("does not exist"))
        || lower.contains("type mismatch")
    {
        return FailureCategory::TypeMismatch;
    }
    if lower.contains("render") || lower.contains("component") {
        return FailureCategory::RenderFailure;
    }
    FailureCategory::Unknown
}
