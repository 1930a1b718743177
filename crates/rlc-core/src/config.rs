use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::GenerationTarget;

/// Environment toggle for the declarative code-generation master switch.
pub const ENV_CODE_GENERATION: &str = "TYPESPEC_USE_ALLOY_CODE_GENERATION";
/// Environment toggle for declarative package.json generation.
pub const ENV_PACKAGE_JSON: &str = "TYPESPEC_USE_ALLOY_PACKAGE_JSON";
pub const ENV_CLIENT_CLASS: &str = "TYPESPEC_USE_ALLOY_CLIENT_CLASS";
pub const ENV_CLIENT_INTERFACE: &str = "TYPESPEC_USE_ALLOY_CLIENT_INTERFACE";
pub const ENV_OPERATION_FUNCTION: &str = "TYPESPEC_USE_ALLOY_OPERATION_FUNCTION";

/// Top-level project configuration loaded from `.rlc.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RlcConfig {
    pub input: String,
    pub output: String,
    /// Overrides applied on top of the options carried by the model.
    pub emission: EmissionOptions,
    pub retry: RetryConfig,
}

impl Default for RlcConfig {
    fn default() -> Self {
        Self {
            input: "service-model.yaml".to_string(),
            output: "generated".to_string(),
            emission: EmissionOptions::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// Explicit emission switches. `None` means "not configured here".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmissionOptions {
    #[serde(alias = "use_alloy_package_json")]
    pub use_alloy_package_json: Option<bool>,
    #[serde(alias = "use_alloy_code_generation")]
    pub use_alloy_code_generation: Option<bool>,
    #[serde(alias = "client_class")]
    pub client_class: Option<bool>,
    #[serde(alias = "client_interface")]
    pub client_interface: Option<bool>,
    #[serde(alias = "operation_function")]
    pub operation_function: Option<bool>,
}

impl EmissionOptions {
    /// Layer `other` on top of `self`; values set in `other` win.
    pub fn overlay(self, other: EmissionOptions) -> EmissionOptions {
        EmissionOptions {
            use_alloy_package_json: other.use_alloy_package_json.or(self.use_alloy_package_json),
            use_alloy_code_generation: other
                .use_alloy_code_generation
                .or(self.use_alloy_code_generation),
            client_class: other.client_class.or(self.client_class),
            client_interface: other.client_interface.or(self.client_interface),
            operation_function: other.operation_function.or(self.operation_function),
        }
    }

    /// Force every switch to `enabled`.
    pub fn forced(enabled: bool) -> EmissionOptions {
        EmissionOptions {
            use_alloy_package_json: Some(enabled),
            use_alloy_code_generation: Some(enabled),
            client_class: Some(enabled),
            client_interface: Some(enabled),
            operation_function: Some(enabled),
        }
    }
}

/// Retry and fallback tuning for the declarative path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub fallback_threshold: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            fallback_threshold: 5,
            base_delay_ms: 100,
        }
    }
}

/// Which emission path each target uses, resolved once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlags {
    pub package_json: bool,
    pub code_generation: bool,
    pub client_class: bool,
    pub client_interface: bool,
    pub operation_function: bool,
}

impl FeatureFlags {
    /// Resolve against the process environment.
    pub fn resolve(options: &EmissionOptions) -> FeatureFlags {
        Self::resolve_with(options, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup.
    ///
    /// Order per flag: explicit option, then environment toggle, then default.
    /// Sub-flags default to the resolved master switch.
    pub fn resolve_with<F>(options: &EmissionOptions, env: F) -> FeatureFlags
    where
        F: Fn(&str) -> Option<String>,
    {
        let toggle = |key: &str| env(key).as_deref().and_then(parse_toggle);

        let code_generation = options
            .use_alloy_code_generation
            .or_else(|| toggle(ENV_CODE_GENERATION))
            .unwrap_or(false);
        let package_json = options
            .use_alloy_package_json
            .or_else(|| toggle(ENV_PACKAGE_JSON))
            .unwrap_or(false);

        FeatureFlags {
            package_json,
            code_generation,
            client_class: options
                .client_class
                .or_else(|| toggle(ENV_CLIENT_CLASS))
                .unwrap_or(code_generation),
            client_interface: options
                .client_interface
                .or_else(|| toggle(ENV_CLIENT_INTERFACE))
                .unwrap_or(code_generation),
            operation_function: options
                .operation_function
                .or_else(|| toggle(ENV_OPERATION_FUNCTION))
                .unwrap_or(code_generation),
        }
    }

    /// Every target on, or every target off.
    pub fn all(enabled: bool) -> FeatureFlags {
        FeatureFlags {
            package_json: enabled,
            code_generation: enabled,
            client_class: enabled,
            client_interface: enabled,
            operation_function: enabled,
        }
    }

    /// Whether the declarative path is enabled for `target`.
    pub fn enabled_for(&self, target: GenerationTarget) -> bool {
        match target {
            GenerationTarget::ClientDefinitions => self.client_interface,
            GenerationTarget::ClientClass => self.client_class,
            GenerationTarget::OperationFunctions => self.operation_function,
            GenerationTarget::PackageJson => self.package_json,
        }
    }
}

fn parse_toggle(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".rlc.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<RlcConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: RlcConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# rlc configuration
input: service-model.yaml
output: generated

# Emission switches. Unset values fall back to the model's options, then to
# the TYPESPEC_USE_ALLOY_* environment variables, then to false.
#   use_alloy_code_generation: true
#   use_alloy_package_json: false
#   client_class: true
#   client_interface: true
#   operation_function: true
emission: {}

retry:
  max_attempts: 3          # declarative attempts before falling back
  fallback_threshold: 5    # exhausted fallbacks per context before skipping the declarative path
  base_delay_ms: 100       # backoff doubles after each failed attempt
"#
}
