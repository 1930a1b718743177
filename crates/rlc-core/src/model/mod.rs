//! The service model: the already-parsed description of an API's paths,
//! operations, parameters and responses that generation consumes read-only.

pub mod operations;

use heck::ToPascalCase;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::EmissionOptions;
use crate::error::ModelError;

pub use operations::*;

/// The root of a service model document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceModel {
    #[serde(default)]
    pub options: ModelOptions,
    #[serde(default = "default_src_path")]
    pub src_path: String,
    #[serde(default)]
    pub paths: IndexMap<String, PathMetadata>,
}

/// Generation options carried by the model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelOptions {
    pub title: Option<String>,
    pub include_shortcuts: bool,
    pub is_multi_endpoint: bool,
    pub package_details: Option<PackageDetails>,
    pub generate_test: bool,
    pub module_kind: ModuleKind,
    #[serde(flatten)]
    pub emission: EmissionOptions,
}

/// npm package identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageDetails {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
}

/// Module system of the generated package.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    #[default]
    Esm,
    Cjs,
}

fn default_src_path() -> String {
    "src".to_string()
}

impl ServiceModel {
    /// An empty model with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            options: ModelOptions {
                title: Some(title.into()),
                ..ModelOptions::default()
            },
            src_path: default_src_path(),
            paths: IndexMap::new(),
        }
    }

    /// The client name, `Client` when the model has no title.
    pub fn client_name(&self) -> String {
        match self.options.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title.to_pascal_case(),
            _ => "Client".to_string(),
        }
    }

    /// Walk every operation together with its owning path.
    pub fn operations(&self) -> impl Iterator<Item = (&str, &PathMetadata, &ServiceOperation)> {
        self.paths.iter().flat_map(|(template, path)| {
            path.operations
                .iter()
                .map(move |op| (template.as_str(), path, op))
        })
    }

    pub fn operation_count(&self) -> usize {
        self.paths.values().map(|p| p.operations.len()).sum()
    }

    pub fn has_long_running_operations(&self) -> bool {
        self.operations().any(|(_, _, op)| op.lro.is_some())
    }

    /// A copy of this model with the emission options replaced.
    pub fn with_emission(&self, emission: EmissionOptions) -> ServiceModel {
        let mut model = self.clone();
        model.options.emission = emission;
        model
    }
}

/// Parse a service model from YAML.
pub fn from_yaml(input: &str) -> Result<ServiceModel, ModelError> {
    Ok(serde_yaml_ng::from_str(input)?)
}

/// Parse a service model from JSON.
pub fn from_json(input: &str) -> Result<ServiceModel, ModelError> {
    Ok(serde_json::from_str(input)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_name_defaults() {
        let model = ServiceModel {
            options: ModelOptions::default(),
            src_path: "src".into(),
            paths: IndexMap::new(),
        };
        assert_eq!(model.client_name(), "Client");
        assert_eq!(ServiceModel::new("widget service").client_name(), "WidgetService");
    }

    #[test]
    fn test_parse_minimal_yaml() {
        let yaml = r#"
options:
  title: Widgets
paths:
  /widgets/{id}:
    name: GetWidget
    operations:
      - name: getWidget
        method: get
        response: { type: Widget, expectedStatuses: [200, "404"] }
        parameters:
          - { name: id, location: path }
"#;
        let model = from_yaml(yaml).unwrap();
        assert_eq!(model.src_path, "src");
        let (template, _, op) = model.operations().next().unwrap();
        assert_eq!(template, "/widgets/{id}");
        assert_eq!(op.method, HttpMethod::Get);
        assert_eq!(op.response.expected_statuses, vec!["200", "404"]);
        assert_eq!(op.parameters[0].type_name, "string");
        assert_eq!(op.parameters[0].location, "path");
    }

    #[test]
    fn test_emission_options_flattened() {
        let json = r#"{ "options": { "title": "T", "useAlloyCodeGeneration": true }, "paths": {} }"#;
        let model = from_json(json).unwrap();
        assert_eq!(model.options.emission.use_alloy_code_generation, Some(true));
        assert_eq!(model.options.emission.use_alloy_package_json, None);
    }
}
