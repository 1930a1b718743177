use std::sync::atomic::{AtomicUsize, Ordering};

use rlc_baseline::TemplateEmitter;
use rlc_builder::{
    BuildError, BuilderIntegration, FailureCategory, FallbackCoordinator, FallbackState,
    RetryPolicy,
};
use rlc_core::config::FeatureFlags;
use rlc_core::descriptors::{
    ClientClassDescriptor, ClientInterfaceDescriptor, OperationFileDescriptor, PackageDescriptor,
};
use rlc_core::error::EmitError;
use rlc_core::model::{self, ServiceModel};
use rlc_core::{EmitterId, GeneratedFile, GenerationTarget, TargetEmitter};
use rlc_declarative::DeclarativeEmitter;

const WIDGETS: &str = include_str!("fixtures/widgets.yaml");

fn widgets() -> ServiceModel {
    model::from_yaml(WIDGETS).unwrap()
}

/// Declarative stand-in that fails its first `failures` calls, counting every call.
struct Flaky {
    inner: DeclarativeEmitter,
    failures: usize,
    only_operation: Option<&'static str>,
    calls: AtomicUsize,
}

impl Flaky {
    fn always() -> Self {
        Self::failing(usize::MAX)
    }

    fn failing(failures: usize) -> Self {
        Self {
            inner: DeclarativeEmitter::new(),
            failures,
            only_operation: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn for_operation(name: &'static str) -> Self {
        Self {
            only_operation: Some(name),
            ..Self::always()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), EmitError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err(EmitError::MissingModule("@alloy-js/core".into()))
        } else {
            Ok(())
        }
    }
}

impl TargetEmitter for Flaky {
    fn id(&self) -> EmitterId {
        EmitterId::Declarative
    }

    fn client_definitions(
        &self,
        descriptor: &ClientInterfaceDescriptor,
    ) -> Result<GeneratedFile, EmitError> {
        self.check()?;
        self.inner.client_definitions(descriptor)
    }

    fn client_class(&self, descriptor: &ClientClassDescriptor) -> Result<GeneratedFile, EmitError> {
        self.check()?;
        self.inner.client_class(descriptor)
    }

    fn operation_file(
        &self,
        descriptor: &OperationFileDescriptor,
    ) -> Result<GeneratedFile, EmitError> {
        match self.only_operation {
            Some(name) if descriptor.operation.name != name => {}
            _ => self.check()?,
        }
        self.inner.operation_file(descriptor)
    }

    fn package_json(&self, descriptor: &PackageDescriptor) -> Result<GeneratedFile, EmitError> {
        self.check()?;
        self.inner.package_json(descriptor)
    }
}

/// Baseline stand-in that always fails.
struct Broken;

impl TargetEmitter for Broken {
    fn id(&self) -> EmitterId {
        EmitterId::Baseline
    }

    fn client_definitions(&self, _: &ClientInterfaceDescriptor) -> Result<GeneratedFile, EmitError> {
        Err(EmitError::Template("template missing".into()))
    }

    fn client_class(&self, _: &ClientClassDescriptor) -> Result<GeneratedFile, EmitError> {
        Err(EmitError::Template("template missing".into()))
    }

    fn operation_file(&self, _: &OperationFileDescriptor) -> Result<GeneratedFile, EmitError> {
        Err(EmitError::Template("template missing".into()))
    }

    fn package_json(&self, _: &PackageDescriptor) -> Result<GeneratedFile, EmitError> {
        Err(EmitError::Template("template missing".into()))
    }
}

#[test]
fn failing_declarative_path_returns_baseline_output() {
    let declarative = Flaky::always();
    let baseline = TemplateEmitter::new().unwrap();
    let coordinator = FallbackCoordinator::new(RetryPolicy::immediate(3, 5));
    let integration = BuilderIntegration::new(
        widgets(),
        FeatureFlags::all(true),
        &declarative,
        &baseline,
        &coordinator,
    );

    let emitted = integration.build_client_class().unwrap();

    let expected = {
        let disabled = BuilderIntegration::new(
            widgets(),
            FeatureFlags::all(false),
            &declarative,
            &baseline,
            &coordinator,
        );
        disabled.build_client_class().unwrap()
    };
    assert_eq!(emitted.via, EmitterId::Baseline);
    assert_eq!(emitted.attempts, 3);
    assert_eq!(emitted.file, expected.file);
    assert_eq!(declarative.calls(), 3);
    assert!(coordinator.error_count("clientClass") >= 1);
    assert_eq!(
        coordinator.state("clientClass"),
        FallbackState::SucceededViaBaseline
    );

    let stats = coordinator.statistics();
    assert_eq!(
        stats.categories_by_context["clientClass"],
        FailureCategory::ModuleResolution
    );
}

#[test]
fn success_after_failure_resets_the_counter() {
    // Three failures exhaust the first build; the second build succeeds.
    let declarative = Flaky::failing(3);
    let baseline = TemplateEmitter::new().unwrap();
    let coordinator = FallbackCoordinator::new(RetryPolicy::immediate(3, 5));
    let integration = BuilderIntegration::new(
        widgets(),
        FeatureFlags::all(true),
        &declarative,
        &baseline,
        &coordinator,
    );

    let first = integration.build_client_definitions().unwrap();
    assert_eq!(first.via, EmitterId::Baseline);
    assert_eq!(coordinator.error_count("clientDefinitions"), 1);

    let second = integration.build_client_definitions().unwrap();
    assert_eq!(second.via, EmitterId::Declarative);
    assert_eq!(second.attempts, 1);
    assert_eq!(coordinator.error_count("clientDefinitions"), 0);
    assert_eq!(coordinator.state("clientDefinitions"), FallbackState::Succeeded);
}

#[test]
fn threshold_skips_the_declarative_path() {
    let declarative = Flaky::always();
    let baseline = TemplateEmitter::new().unwrap();
    let coordinator = FallbackCoordinator::new(RetryPolicy::immediate(1, 2));
    let integration = BuilderIntegration::new(
        widgets(),
        FeatureFlags::all(true),
        &declarative,
        &baseline,
        &coordinator,
    );

    integration.build_client_class().unwrap();
    integration.build_client_class().unwrap();
    assert_eq!(coordinator.error_count("clientClass"), 2);
    assert_eq!(declarative.calls(), 2);

    let emitted = integration.build_client_class().unwrap();
    assert_eq!(declarative.calls(), 2);
    assert_eq!(emitted.via, EmitterId::Baseline);
    assert_eq!(emitted.attempts, 0);
    assert!(emitted.file.content.contains("export class WidgetsClient"));
    assert_eq!(coordinator.error_count("clientClass"), 2);
}

#[test]
fn disabled_flag_never_calls_the_declarative_path() {
    let declarative = Flaky::always();
    let baseline = TemplateEmitter::new().unwrap();
    let coordinator = FallbackCoordinator::new(RetryPolicy::immediate(3, 5));
    let flags = FeatureFlags {
        client_class: false,
        ..FeatureFlags::all(true)
    };
    let integration =
        BuilderIntegration::new(widgets(), flags, &declarative, &baseline, &coordinator);

    let emitted = integration.build_client_class().unwrap();
    assert_eq!(emitted.via, EmitterId::Baseline);
    assert_eq!(declarative.calls(), 0);
    assert_eq!(coordinator.statistics().total_errors, 0);
}

#[test]
fn malformed_model_is_not_retried() {
    let model = model::from_yaml(
        r#"
options: { title: Widgets }
paths:
  /users:
    name: Users
    operations:
      - name: listUsers
        method: GET
        response: { type: UserList }
        parameters:
          - { name: top, type: number, location: cookie }
"#,
    )
    .unwrap();
    let declarative = Flaky::always();
    let baseline = TemplateEmitter::new().unwrap();
    let coordinator = FallbackCoordinator::new(RetryPolicy::immediate(3, 5));
    let integration = BuilderIntegration::new(
        model,
        FeatureFlags::all(true),
        &declarative,
        &baseline,
        &coordinator,
    );

    let err = integration.build_operation_functions().unwrap_err();
    assert!(matches!(err, BuildError::Model(_)), "{err}");
    assert_eq!(declarative.calls(), 0);
    assert_eq!(coordinator.statistics().total_errors, 0);
}

#[test]
fn baseline_failure_is_returned() {
    let declarative = Flaky::always();
    let coordinator = FallbackCoordinator::new(RetryPolicy::immediate(2, 5));
    let integration = BuilderIntegration::new(
        widgets(),
        FeatureFlags::all(true),
        &declarative,
        &Broken,
        &coordinator,
    );

    match integration.build_package_json().unwrap_err() {
        BuildError::Baseline { context, source } => {
            assert_eq!(context, "packageJson");
            assert_eq!(source, EmitError::Template("template missing".into()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn operations_fall_back_individually() {
    let declarative = Flaky::for_operation("createJob");
    let baseline = TemplateEmitter::new().unwrap();
    let coordinator = FallbackCoordinator::new(RetryPolicy::immediate(2, 5));
    let integration = BuilderIntegration::new(
        widgets(),
        FeatureFlags::all(true),
        &declarative,
        &baseline,
        &coordinator,
    );

    let files = integration.build_operation_functions().unwrap();
    let via: Vec<(&str, EmitterId)> = files
        .iter()
        .map(|e| (e.file.path.as_str(), e.via))
        .collect();
    assert_eq!(
        via,
        vec![
            ("src/api/getUser.ts", EmitterId::Declarative),
            ("src/api/listUsers.ts", EmitterId::Declarative),
            ("src/api/createJob.ts", EmitterId::Baseline),
            ("src/api/ping.ts", EmitterId::Declarative),
        ]
    );
    assert!(files.iter().all(|e| e.target == GenerationTarget::OperationFunctions));

    let stats = coordinator.statistics();
    assert_eq!(stats.total_errors, 1);
    assert_eq!(stats.errors_by_context["operationFunction:createJob"], 1);
    assert_eq!(stats.errors_by_context["operationFunction:getUser"], 0);
}

#[test]
fn complete_package_through_the_declarative_path() {
    let declarative = DeclarativeEmitter::new();
    let baseline = TemplateEmitter::new().unwrap();
    let coordinator = FallbackCoordinator::new(RetryPolicy::immediate(3, 5));
    let mut integration = BuilderIntegration::new(
        widgets(),
        FeatureFlags::all(true),
        &declarative,
        &baseline,
        &coordinator,
    );

    let package = integration.build_complete_package().unwrap();
    let contents = package.contents();
    let paths: Vec<&str> = contents.keys().map(String::as_str).collect();
    assert_eq!(
        paths,
        vec![
            "package.json",
            "src/clientDefinitions.ts",
            "src/WidgetsClient.ts",
            "src/api/getUser.ts",
            "src/api/listUsers.ts",
            "src/api/createJob.ts",
            "src/api/ping.ts",
        ]
    );
    assert!(!package.used_baseline());
    assert!(package.report().iter().all(|r| r.attempts == 1));

    let manifest: serde_json::Value = serde_json::from_str(&contents["package.json"]).unwrap();
    assert_eq!(manifest["name"], "@contoso/widgets");

    let registry = integration.context().registry();
    assert!(integration.context().lookup("client:Widgets").is_some());
    assert!(integration.context().lookup("operation:createJob").is_some());
    assert_eq!(registry.len(), 5);
}

#[test]
fn complete_package_defaults_to_baseline() {
    let declarative = Flaky::always();
    let baseline = TemplateEmitter::new().unwrap();
    let coordinator = FallbackCoordinator::new(RetryPolicy::immediate(3, 5));
    let mut integration = BuilderIntegration::new(
        widgets(),
        FeatureFlags::resolve_with(&Default::default(), |_| None),
        &declarative,
        &baseline,
        &coordinator,
    );

    let package = integration.build_complete_package().unwrap();
    assert_eq!(package.files.len(), 7);
    assert!(package.files.iter().all(|e| e.via == EmitterId::Baseline));
    assert_eq!(declarative.calls(), 0);
}
