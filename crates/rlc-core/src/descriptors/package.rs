use heck::ToKebabCase;
use indexmap::IndexMap;
use serde::Serialize;

use crate::model::{ModuleKind, ServiceModel};

const DEFAULT_VERSION: &str = "1.0.0-beta.1";
const NODE_ENGINE: &str = ">=20.0.0";

/// The npm manifest of the generated package.
///
/// Every map is resolved here so both emission paths only lay it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDescriptor {
    pub path: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub node_engine: String,
    pub module_kind: ModuleKind,
    pub dependencies: IndexMap<String, String>,
    pub dev_dependencies: IndexMap<String, String>,
    pub scripts: IndexMap<String, String>,
    /// Set for `@azure/...` packages.
    pub azure: Option<AzureMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureMetadata {
    pub sdk_type: String,
    pub repository: String,
    pub bugs_url: String,
}

pub fn build_package_descriptor(model: &ServiceModel) -> PackageDescriptor {
    let library = model.client_name();
    let details = model.options.package_details.clone().unwrap_or_default();

    let name = details
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| library.to_kebab_case());
    let version = details
        .version
        .unwrap_or_else(|| DEFAULT_VERSION.to_string());
    let description = details
        .description
        .unwrap_or_else(|| format!("A generated SDK for {library}."));
    let is_azure = name.starts_with("@azure");
    let has_lro = model.has_long_running_operations();

    let mut dependencies = entries(&[("tslib", "^2.6.2")]);
    if is_azure {
        dependencies.extend(entries(&[
            ("@azure-rest/core-client", "^2.3.1"),
            ("@azure/core-auth", "^1.9.0"),
            ("@azure/core-rest-pipeline", "^1.20.0"),
            ("@azure/core-util", "^1.12.0"),
            ("@azure/logger", "^1.2.0"),
        ]));
    } else {
        dependencies.extend(entries(&[("@typespec/ts-http-runtime", "0.1.0")]));
    }
    if has_lro {
        dependencies.extend(entries(&[
            ("@azure/core-lro", "^3.1.0"),
            ("@azure/abort-controller", "^2.1.2"),
        ]));
    }

    let mut dev_dependencies = entries(&[
        ("@types/node", "^20.0.0"),
        ("eslint", "^9.9.0"),
        ("typescript", "~5.8.2"),
    ]);
    if model.options.generate_test {
        dev_dependencies.extend(entries(&[
            ("@vitest/browser", "^3.0.9"),
            ("@vitest/coverage-istanbul", "^3.0.9"),
            ("vitest", "^3.0.9"),
            ("playwright", "^1.52.0"),
        ]));
    }

    let mut scripts = entries(&[
        ("clean", "rimraf --glob dist dist-browser dist-esm test-dist temp types *.tgz *.log"),
        ("extract-api", "rimraf review && mkdirp ./review && api-extractor run --local"),
        ("pack", "npm pack 2>&1"),
        ("lint", "eslint package.json api-extractor.json src"),
        ("lint:fix", "eslint package.json api-extractor.json src --fix --fix-type [problem,suggestion]"),
    ]);
    let build = match model.options.module_kind {
        ModuleKind::Esm => "npm run clean && tshy && npm run extract-api",
        ModuleKind::Cjs => "npm run clean && tsc && npm run extract-api",
    };
    scripts.insert("build".to_string(), build.to_string());
    if model.options.generate_test {
        scripts.insert("test".to_string(), "vitest run".to_string());
    }

    let azure = is_azure.then(|| AzureMetadata {
        sdk_type: "client".to_string(),
        repository: "github:Azure/azure-sdk-for-js".to_string(),
        bugs_url: "https://github.com/Azure/azure-sdk-for-js/issues".to_string(),
    });

    PackageDescriptor {
        path: "package.json".to_string(),
        name,
        version,
        description,
        node_engine: NODE_ENGINE.to_string(),
        module_kind: model.options.module_kind,
        dependencies,
        dev_dependencies,
        scripts,
        azure,
    }
}

fn entries(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
