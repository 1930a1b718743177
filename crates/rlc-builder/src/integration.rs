use indexmap::IndexMap;
use log::{debug, error, info, warn};
use rlc_core::config::FeatureFlags;
use rlc_core::context::GenerationContext;
use rlc_core::descriptors::{
    OperationDescriptor, build_client_class_descriptor, build_client_interface_descriptor,
    build_operation_descriptors, build_operation_file_descriptor, build_package_descriptor,
};
use rlc_core::error::EmitError;
use rlc_core::model::ServiceModel;
use rlc_core::{EmitterId, GeneratedFile, GenerationTarget, TargetEmitter};
use serde::Serialize;
use serde_json::json;

use crate::error::BuildError;
use crate::fallback::{FailureReport, FallbackCoordinator};
use crate::prerequisites::validate_prerequisites;

/// One built file and how it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emitted {
    pub file: GeneratedFile,
    pub target: GenerationTarget,
    pub via: EmitterId,
    /// Declarative attempts made before this file was produced.
    pub attempts: u32,
}

/// Per-file line of an emission report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionRecord {
    pub path: String,
    pub target: GenerationTarget,
    pub via: EmitterId,
    pub attempts: u32,
}

impl From<&Emitted> for EmissionRecord {
    fn from(emitted: &Emitted) -> Self {
        Self {
            path: emitted.file.path.clone(),
            target: emitted.target,
            via: emitted.via,
            attempts: emitted.attempts,
        }
    }
}

/// Every file of a generated package, in emission order.
#[derive(Debug, Clone, Default)]
pub struct GeneratedPackage {
    pub files: Vec<Emitted>,
}

impl GeneratedPackage {
    /// `path → content`.
    pub fn contents(&self) -> IndexMap<String, String> {
        self.files
            .iter()
            .map(|e| (e.file.path.clone(), e.file.content.clone()))
            .collect()
    }

    pub fn report(&self) -> Vec<EmissionRecord> {
        self.files.iter().map(EmissionRecord::from).collect()
    }

    pub fn into_files(self) -> Vec<GeneratedFile> {
        self.files.into_iter().map(|e| e.file).collect()
    }

    /// Whether any file came from the baseline.
    pub fn used_baseline(&self) -> bool {
        self.files.iter().any(|e| e.via == EmitterId::Baseline)
    }
}

/// Decides, per declaration, which emission path produces it.
///
/// Flags are resolved by the caller and passed in; nothing below this point
/// reads the environment.
pub struct BuilderIntegration<'a> {
    context: GenerationContext,
    flags: FeatureFlags,
    declarative: &'a dyn TargetEmitter,
    baseline: &'a dyn TargetEmitter,
    coordinator: &'a FallbackCoordinator,
}

impl<'a> BuilderIntegration<'a> {
    pub fn new(
        model: ServiceModel,
        flags: FeatureFlags,
        declarative: &'a dyn TargetEmitter,
        baseline: &'a dyn TargetEmitter,
        coordinator: &'a FallbackCoordinator,
    ) -> Self {
        Self {
            context: GenerationContext::new(model),
            flags,
            declarative,
            baseline,
            coordinator,
        }
    }

    pub fn context(&self) -> &GenerationContext {
        &self.context
    }

    pub fn flags(&self) -> FeatureFlags {
        self.flags
    }

    fn model(&self) -> &ServiceModel {
        self.context.model()
    }

    fn operations(&self) -> Result<Vec<OperationDescriptor>, BuildError> {
        Ok(build_operation_descriptors(self.model())?)
    }

    fn emit<F>(&self, target: GenerationTarget, context: &str, emit: F) -> Result<Emitted, BuildError>
    where
        F: Fn(&dyn TargetEmitter) -> Result<GeneratedFile, EmitError>,
    {
        let outcome = self.coordinator.run(
            context,
            self.flags.enabled_for(target),
            || emit(self.declarative),
            || emit(self.baseline),
        )?;
        if let Some(failure) = &outcome.failure {
            self.log_failure(failure);
        }
        debug!(
            "{context}: {} via {} after {} attempt(s)",
            outcome.value.path, outcome.via, outcome.attempts
        );
        Ok(Emitted {
            file: outcome.value,
            target,
            via: outcome.via,
            attempts: outcome.attempts,
        })
    }

    fn log_failure(&self, failure: &FailureReport) {
        let model = self.model();
        let report = json!({
            "context": failure.context,
            "error": {
                "message": failure.message,
                "category": failure.category,
                "suggestedAction": failure.suggested_action,
                "canRecover": failure.can_recover,
                "attempts": failure.attempts,
            },
            "model": {
                "title": model.options.title,
                "srcPath": model.src_path,
                "pathCount": model.paths.len(),
                "operationCount": model.operation_count(),
            },
            "flags": self.flags,
        });
        match serde_json::to_string_pretty(&report) {
            Ok(text) => error!("declarative emission report:\n{text}"),
            Err(e) => error!("declarative emission report unavailable: {e}"),
        }
    }

    pub fn build_client_definitions(&self) -> Result<Emitted, BuildError> {
        let operations = self.operations()?;
        let descriptor = build_client_interface_descriptor(self.model(), &operations);
        let target = GenerationTarget::ClientDefinitions;
        self.emit(target, target.as_str(), |e| e.client_definitions(&descriptor))
    }

    pub fn build_client_class(&self) -> Result<Emitted, BuildError> {
        let operations = self.operations()?;
        let descriptor = build_client_class_descriptor(self.model(), &operations);
        let target = GenerationTarget::ClientClass;
        self.emit(target, target.as_str(), |e| e.client_class(&descriptor))
    }

    /// One file per operation, each falling back independently.
    pub fn build_operation_functions(&self) -> Result<Vec<Emitted>, BuildError> {
        let operations = self.operations()?;
        let mut files = Vec::with_capacity(operations.len());
        for operation in &operations {
            let descriptor = build_operation_file_descriptor(self.model(), operation);
            let context = format!("operationFunction:{}", operation.name);
            files.push(self.emit(GenerationTarget::OperationFunctions, &context, |e| {
                e.operation_file(&descriptor)
            })?);
        }
        Ok(files)
    }

    pub fn build_package_json(&self) -> Result<Emitted, BuildError> {
        let descriptor = build_package_descriptor(self.model());
        let target = GenerationTarget::PackageJson;
        self.emit(target, target.as_str(), |e| e.package_json(&descriptor))
    }

    /// Register references for the client and every operation.
    ///
    /// Clears references left by a previous build on this integration first.
    pub fn register_references(&mut self) -> usize {
        self.context.clear_references();
        self.context.create_client_ref();
        self.context.create_operation_references();
        self.context.registry().len()
    }

    /// Build every target: package manifest, client definitions, client class
    /// and operation files.
    pub fn build_complete_package(&mut self) -> Result<GeneratedPackage, BuildError> {
        // Fail on a malformed model before any emitter runs.
        self.operations()?;

        let registered = self.register_references();
        debug!("registered {registered} references");

        if self.flags != FeatureFlags::all(false) {
            let report = validate_prerequisites(self.model());
            for issue in &report.issues {
                warn!("prerequisite: {issue}");
            }
        }

        let mut files = vec![
            self.build_package_json()?,
            self.build_client_definitions()?,
            self.build_client_class()?,
        ];
        files.extend(self.build_operation_functions()?);

        let package = GeneratedPackage { files };
        let fallbacks = package
            .files
            .iter()
            .filter(|e| e.via == EmitterId::Baseline && e.attempts > 0)
            .count();
        info!(
            "generated {} files for {} ({} recovered by baseline)",
            package.files.len(),
            self.context.client_name(),
            fallbacks
        );
        Ok(package)
    }
}
