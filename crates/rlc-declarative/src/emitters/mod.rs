//! Descriptor → document tree.
//!
//! Each emitter is a pure function of its descriptor. Names the file imports
//! with a reference key are referred to by key, so a missing import surfaces
//! as an unresolved reference at render time rather than as broken output.

pub mod client_class;
pub mod client_interface;
pub mod operation_function;
pub mod package_json;

use std::collections::HashMap;

use rlc_core::descriptors::{ImportSet, ParameterDescriptor};
use rlc_core::references::RefKey;

use crate::tree::{Code, ImportDecl, ImportedSymbol, ParamDecl};

pub use client_class::client_class_file;
pub use client_interface::client_definitions_file;
pub use operation_function::{operation_declarations, operation_file};
pub use package_json::package_manifest;

pub(crate) fn import_decls(imports: &ImportSet) -> Vec<ImportDecl> {
    imports
        .entries()
        .into_iter()
        .map(|(module, names)| ImportDecl {
            module,
            names: names
                .into_iter()
                .map(|n| ImportedSymbol {
                    name: n.name,
                    refkey: n.refkey,
                })
                .collect(),
        })
        .collect()
}

/// Turns type expressions into [`Code`], swapping imported names for their keys.
pub(crate) struct TypeResolver {
    keys: HashMap<String, RefKey>,
}

impl TypeResolver {
    pub(crate) fn new(imports: &ImportSet) -> TypeResolver {
        let keys = imports
            .entries()
            .into_iter()
            .flat_map(|(_, names)| names)
            .filter_map(|n| n.refkey.map(|key| (n.name, key)))
            .collect();
        TypeResolver { keys }
    }

    pub(crate) fn key(&self, name: &str) -> Option<&RefKey> {
        self.keys.get(name)
    }

    /// `Promise<User[]>` → text `Promise<`, ref `model:User`, text `[]>`.
    pub(crate) fn type_code(&self, expr: &str) -> Code {
        let mut code = Code::new();
        let mut text = String::new();
        for token in tokens(expr) {
            match self.keys.get(token) {
                Some(key) => {
                    if !text.is_empty() {
                        code = code.push_text(std::mem::take(&mut text));
                    }
                    code = code.push_ref(key.clone());
                }
                None => text.push_str(token),
            }
        }
        if !text.is_empty() {
            code = code.push_text(text);
        }
        code
    }

    /// Signature parameters scoped to `scope`. With `initializers` the options
    /// bag carries its default instead of `?`.
    pub(crate) fn params(
        &self,
        params: &[ParameterDescriptor],
        scope: &str,
        initializers: bool,
    ) -> Vec<ParamDecl> {
        params
            .iter()
            .map(|p| {
                let default = if initializers {
                    p.default_value().map(Code::from)
                } else {
                    None
                };
                ParamDecl {
                    name: p.name.clone(),
                    ty: self.type_code(&p.type_name),
                    optional: p.optional,
                    default,
                    refkey: Some(RefKey::parameter(scope, &p.name)),
                }
            })
            .collect()
    }
}

/// Split a type expression into identifier runs and single punctuation characters.
fn tokens(expr: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (i, c) in expr.char_indices() {
        let ident = c.is_ascii_alphanumeric() || c == '_';
        match (ident, start) {
            (true, None) => start = Some(i),
            (true, Some(_)) => {}
            (false, begin) => {
                if let Some(begin) = begin {
                    tokens.push(&expr[begin..i]);
                    start = None;
                }
                tokens.push(&expr[i..i + c.len_utf8()]);
            }
        }
    }
    if let Some(begin) = start {
        tokens.push(&expr[begin..]);
    }
    tokens
}

/// A string literal as TypeScript spells it.
pub(crate) fn quoted(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// `["200", "201"]`
pub(crate) fn string_array(values: &[String]) -> String {
    let items: Vec<String> = values.iter().map(|v| quoted(v)).collect();
    format!("[{}]", items.join(", "))
}
