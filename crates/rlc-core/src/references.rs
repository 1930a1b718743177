//! Stable handles for generated declarations.
//!
//! A [`RefKey`] is computed from `(kind, scope.., name)` and nothing else, so two
//! components asking for "the getUser operation function" independently get
//! equal keys without coordinating. The renderer resolves keys to names later.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// The kind of declaration a reference points at. Part of the key material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RefKind {
    Client,
    ClientClass,
    ClientInterface,
    Operation,
    OperationFunction,
    SendFunction,
    DeserializeFunction,
    Parameter,
    Type,
    Model,
    Route,
    Pipeline,
}

impl RefKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefKind::Client => "client",
            RefKind::ClientClass => "clientClass",
            RefKind::ClientInterface => "clientInterface",
            RefKind::Operation => "operation",
            RefKind::OperationFunction => "operationFunction",
            RefKind::SendFunction => "sendFunction",
            RefKind::DeserializeFunction => "deserializeFunction",
            RefKind::Parameter => "parameter",
            RefKind::Type => "type",
            RefKind::Model => "model",
            RefKind::Route => "route",
            RefKind::Pipeline => "pipeline",
        }
    }
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque, deterministic reference to a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefKey {
    kind: RefKind,
    parts: Vec<String>,
}

impl RefKey {
    /// Build a key from a kind and its name parts (scope first, name last).
    pub fn new<I, S>(kind: RefKind, parts: I) -> RefKey
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RefKey {
            kind,
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn kind(&self) -> RefKind {
        self.kind
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// The `kind:scope:name` string used as a registry key.
    pub fn composite(&self) -> String {
        composite_key(self.kind, &self.parts)
    }

    pub fn client(client_name: &str) -> RefKey {
        RefKey::new(RefKind::Client, [client_name])
    }

    pub fn client_class(client_name: &str) -> RefKey {
        RefKey::new(RefKind::ClientClass, [client_name])
    }

    pub fn client_interface(client_name: &str) -> RefKey {
        RefKey::new(RefKind::ClientInterface, [client_name])
    }

    pub fn operation(operation: &str) -> RefKey {
        RefKey::new(RefKind::Operation, [operation])
    }

    pub fn operation_function(operation: &str) -> RefKey {
        RefKey::new(RefKind::OperationFunction, [operation])
    }

    pub fn send_function(operation: &str) -> RefKey {
        RefKey::new(RefKind::SendFunction, [operation])
    }

    pub fn deserialize_function(operation: &str) -> RefKey {
        RefKey::new(RefKind::DeserializeFunction, [operation])
    }

    /// A parameter of the declaration named by `scope`.
    pub fn parameter(scope: &str, name: &str) -> RefKey {
        RefKey::new(RefKind::Parameter, [scope, name])
    }

    pub fn type_decl(name: &str) -> RefKey {
        RefKey::new(RefKind::Type, [name])
    }

    pub fn model(name: &str) -> RefKey {
        RefKey::new(RefKind::Model, [name])
    }

    pub fn route(path: &str, method: &str) -> RefKey {
        RefKey::new(RefKind::Route, [path, method])
    }

    pub fn pipeline(client_name: &str) -> RefKey {
        RefKey::new(RefKind::Pipeline, [client_name])
    }
}

impl fmt::Display for RefKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.composite())
    }
}

/// Join a kind and its parts into the human-readable `kind:scope:name` form.
pub fn composite_key<S: AsRef<str>>(kind: RefKind, parts: &[S]) -> String {
    let mut key = kind.as_str().to_string();
    for part in parts {
        key.push(':');
        key.push_str(part.as_ref());
    }
    key
}

/// Composite-string → key store for one generation run.
///
/// Registration overwrites; lookups never fail, they return `None`.
#[derive(Debug, Clone, Default)]
pub struct ReferenceRegistry {
    references: IndexMap<String, RefKey>,
}

impl ReferenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, composite: impl Into<String>, key: RefKey) {
        self.references.insert(composite.into(), key);
    }

    pub fn lookup(&self, composite: &str) -> Option<&RefKey> {
        self.references.get(composite)
    }

    pub fn clear(&mut self) {
        self.references.clear();
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RefKey)> {
        self.references.iter().map(|(k, v)| (k.as_str(), v))
    }
}
