//! Regression check between the two emission paths.
//!
//! The same model is generated once with the declarative path forced on and
//! once with it forced off. Outputs pass if they match after normalisation,
//! or failing that, if they export the same names and import the same things.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use log::{info, warn};
use regex::Regex;
use rlc_core::config::{EmissionOptions, FeatureFlags};
use rlc_core::model::ServiceModel;
use rlc_core::{EmitterId, TargetEmitter};
use serde::Serialize;

use crate::error::BuildError;
use crate::fallback::{FallbackCoordinator, RetryPolicy};
use crate::integration::{BuilderIntegration, Emitted};

static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid block comment regex"));
// A `//` preceded by `:` is a URL scheme, not a comment.
static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(^|[^:])//.*$").expect("valid line comment regex"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static EXPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bexport\s+(?:async\s+)?(?:class|interface|type|function|const|let|var)\s+(\w+)")
        .expect("valid export regex")
});
static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bimport\s+[^;"']*?\s*from\s*["'][^"']+["']"#).expect("valid import regex")
});

/// Outcome of one validation case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub test_name: String,
    pub passed: bool,
    pub primary_output: String,
    pub baseline_output: String,
    pub differences: Vec<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub total_tests: usize,
    pub passed_tests: usize,
    pub failed_tests: usize,
    pub overall_success: bool,
    pub results: Vec<ValidationResult>,
}

impl ValidationSummary {
    pub fn from_results(results: Vec<ValidationResult>) -> Self {
        let passed_tests = results.iter().filter(|r| r.passed).count();
        let failed_tests = results.len() - passed_tests;
        Self {
            total_tests: results.len(),
            passed_tests,
            failed_tests,
            overall_success: failed_tests == 0,
            results,
        }
    }
}

/// Strip comments and collapse whitespace.
pub fn normalize(source: &str) -> String {
    let without_blocks = BLOCK_COMMENT.replace_all(source, " ");
    let without_lines = LINE_COMMENT.replace_all(&without_blocks, "${1}");
    WHITESPACE
        .replace_all(&without_lines, " ")
        .trim()
        .to_string()
}

/// Exported declaration names, in source order, duplicates kept.
pub fn exported_names(source: &str) -> Vec<String> {
    EXPORT
        .captures_iter(&normalize(source))
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Import statements with whitespace collapsed.
pub fn import_statements(source: &str) -> BTreeSet<String> {
    IMPORT
        .find_iter(&normalize(source))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Human-readable differences between two outputs; empty means equivalent.
///
/// Bodies are not compared once the normalised texts differ: identical
/// export and import sets pass.
pub fn compare_outputs(primary: &str, baseline: &str) -> Vec<String> {
    if normalize(primary) == normalize(baseline) {
        return Vec::new();
    }

    let mut differences = Vec::new();

    let mut primary_exports = exported_names(primary);
    let mut baseline_exports = exported_names(baseline);
    primary_exports.sort();
    baseline_exports.sort();
    let primary_set: BTreeSet<&String> = primary_exports.iter().collect();
    let baseline_set: BTreeSet<&String> = baseline_exports.iter().collect();

    let missing = missing_from(&primary_set, &baseline_set);
    if !missing.is_empty() {
        differences.push(format!("Missing exports in baseline output: {}", missing.join(", ")));
    }
    let missing = missing_from(&baseline_set, &primary_set);
    if !missing.is_empty() {
        differences.push(format!(
            "Missing exports in declarative output: {}",
            missing.join(", ")
        ));
    }
    if primary_set == baseline_set && primary_exports.len() != baseline_exports.len() {
        differences.push(format!(
            "Export count differs: declarative {}, baseline {}",
            primary_exports.len(),
            baseline_exports.len()
        ));
    }

    let primary_imports = import_statements(primary);
    let baseline_imports = import_statements(baseline);
    for statement in primary_imports.difference(&baseline_imports) {
        differences.push(format!("Missing import in baseline output: {statement}"));
    }
    for statement in baseline_imports.difference(&primary_imports) {
        differences.push(format!("Missing import in declarative output: {statement}"));
    }

    differences
}

fn missing_from(from: &BTreeSet<&String>, other: &BTreeSet<&String>) -> Vec<String> {
    from.difference(other).map(|s| s.to_string()).collect()
}

/// Runs both emission paths over a model and compares the results.
pub struct OutputEquivalenceValidator<'a> {
    declarative: &'a dyn TargetEmitter,
    baseline: &'a dyn TargetEmitter,
    policy: RetryPolicy,
}

impl<'a> OutputEquivalenceValidator<'a> {
    pub fn new(declarative: &'a dyn TargetEmitter, baseline: &'a dyn TargetEmitter) -> Self {
        Self {
            declarative,
            baseline,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Client definitions, client class and operation files, each run on a
    /// fresh coordinator so the two passes share no counters.
    fn generate(&self, model: &ServiceModel, enabled: bool) -> Result<Vec<Emitted>, BuildError> {
        let model = model.with_emission(EmissionOptions::forced(enabled));
        let flags = FeatureFlags::resolve_with(&model.options.emission, |_| None);
        let coordinator = FallbackCoordinator::new(self.policy);
        let integration =
            BuilderIntegration::new(model, flags, self.declarative, self.baseline, &coordinator);

        let mut files = vec![
            integration.build_client_definitions()?,
            integration.build_client_class()?,
        ];
        files.extend(integration.build_operation_functions()?);
        Ok(files)
    }

    pub fn validate(&self, test_name: &str, model: &ServiceModel) -> ValidationResult {
        let mut result = ValidationResult {
            test_name: test_name.to_string(),
            passed: false,
            primary_output: String::new(),
            baseline_output: String::new(),
            differences: Vec::new(),
            error: None,
        };

        let (primary, baseline) = match (self.generate(model, true), self.generate(model, false)) {
            (Ok(primary), Ok(baseline)) => (primary, baseline),
            (Err(e), _) | (_, Err(e)) => {
                warn!("{test_name}: generation failed: {e}");
                result.error = Some(e.to_string());
                return result;
            }
        };

        for emitted in primary.iter().filter(|e| e.via != EmitterId::Declarative) {
            result.differences.push(format!(
                "declarative path fell back to the baseline for `{}`",
                emitted.file.path
            ));
        }

        result.primary_output = joined(&primary);
        result.baseline_output = joined(&baseline);
        result
            .differences
            .extend(compare_outputs(&result.primary_output, &result.baseline_output));
        result.passed = result.differences.is_empty();

        if result.passed {
            info!("{test_name}: outputs equivalent");
        } else {
            warn!(
                "{test_name}: {} difference(s): {}",
                result.differences.len(),
                result.differences.join("; ")
            );
        }
        result
    }

    pub fn validate_all<'m, I>(&self, cases: I) -> ValidationSummary
    where
        I: IntoIterator<Item = (&'m str, &'m ServiceModel)>,
    {
        let results = cases
            .into_iter()
            .map(|(name, model)| self.validate(name, model))
            .collect();
        ValidationSummary::from_results(results)
    }
}

fn joined(files: &[Emitted]) -> String {
    files
        .iter()
        .map(|e| e.file.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
