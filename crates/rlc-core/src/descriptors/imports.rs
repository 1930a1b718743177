use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::references::RefKey;

pub const HTTP_RUNTIME: &str = "@typespec/ts-http-runtime";
pub const CORE_LRO: &str = "@azure/core-lro";

/// Module specifiers as seen from a file under `{src}/api/`.
pub mod from_api {
    pub const PAGING_HELPERS: &str = "../static-helpers/pagingHelpers.js";
    pub const POLLING_HELPERS: &str = "../static-helpers/pollingHelpers.js";
    pub const MODELS: &str = "../models/models.js";
    pub const OPTIONS: &str = "./options.js";
}

/// Module specifiers as seen from a file directly under `{src}/`.
pub mod from_src {
    pub const PAGING_HELPERS: &str = "./static-helpers/pagingHelpers.js";
    pub const MODELS: &str = "./models/models.js";
    pub const OPTIONS: &str = "./api/options.js";
    pub const API_INDEX: &str = "./api/index.js";

    pub fn operation_module(operation: &str) -> String {
        format!("./api/{operation}.js")
    }
}

/// Type names that are never imported from the models module.
const BUILTIN_TYPES: &[&str] = &[
    "Array",
    "Date",
    "Map",
    "OperationState",
    "PagedAsyncIterableIterator",
    "PollerLike",
    "Promise",
    "Record",
    "Set",
    "StreamableMethod",
    "Uint8Array",
];

/// One imported name and, when another generated declaration owns it, its reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedName {
    pub name: String,
    #[serde(skip)]
    pub refkey: Option<RefKey>,
}

/// Named imports grouped by module specifier.
///
/// Modules keep insertion order, names within a module are sorted, so the
/// rendered statements depend only on what was added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    modules: IndexMap<String, BTreeMap<String, Option<RefKey>>>,
}

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, module: &str, name: &str) {
        self.modules
            .entry(module.to_string())
            .or_default()
            .entry(name.to_string())
            .or_insert(None);
    }

    /// Import a name that stands for a generated declaration.
    pub fn add_ref(&mut self, module: &str, name: &str, key: RefKey) {
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(name.to_string(), Some(key));
    }

    pub fn add_all(&mut self, module: &str, names: &[&str]) {
        for name in names {
            self.add(module, name);
        }
    }

    /// Import every model type mentioned in a TypeScript type expression.
    pub fn add_models(&mut self, module: &str, type_expr: &str) {
        for name in referenced_type_names(type_expr) {
            let key = RefKey::model(&name);
            self.add_ref(module, &name, key);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn contains(&self, module: &str, name: &str) -> bool {
        self.modules
            .get(module)
            .is_some_and(|names| names.contains_key(name))
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Every module with its names in render order.
    pub fn entries(&self) -> Vec<(String, Vec<ImportedName>)> {
        self.modules
            .iter()
            .map(|(module, names)| {
                let names = names
                    .iter()
                    .map(|(name, refkey)| ImportedName {
                        name: name.clone(),
                        refkey: refkey.clone(),
                    })
                    .collect();
                (module.clone(), names)
            })
            .collect()
    }

    /// `import { A, b } from "module";` lines.
    pub fn statements(&self) -> Vec<String> {
        self.modules
            .iter()
            .map(|(module, names)| {
                let names: Vec<&str> = names.keys().map(String::as_str).collect();
                format!("import {{ {} }} from \"{}\";", names.join(", "), module)
            })
            .collect()
    }
}

impl Serialize for ImportSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.modules.len()))?;
        for (module, names) in &self.modules {
            let names: Vec<&str> = names.keys().map(String::as_str).collect();
            map.serialize_entry(module, &names)?;
        }
        map.end()
    }
}

/// Identifiers in a type expression that name model types.
///
/// `Promise<Array<User> | Record<string, Tag>>` gives `["User", "Tag"]`.
pub fn referenced_type_names(type_expr: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for token in type_expr.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_')) {
        let starts_upper = token.chars().next().is_some_and(|c| c.is_ascii_uppercase());
        if starts_upper && !BUILTIN_TYPES.contains(&token) && !names.iter().any(|n| n == token) {
            names.push(token.to_string());
        }
    }
    names
}
