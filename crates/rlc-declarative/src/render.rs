//! Tree → text.
//!
//! Rendering happens in two passes: the symbol table is built from every import
//! and top-level declaration first, so a reference may point at a declaration
//! that appears later in the file.

use std::collections::{HashMap, HashSet};

use rlc_core::references::RefKey;

use crate::error::RenderError;
use crate::tree::{
    ClassDecl, ClassMember, Code, Declaration, FieldDecl, Fragment, FunctionDecl, ImportDecl,
    InterfaceDecl, InterfaceMember, MethodDecl, ParamDecl, SourceFile, TypeAliasDecl,
};

const INDENT: &str = "  ";

/// Render one source file.
pub fn render(file: &SourceFile) -> Result<String, RenderError> {
    let symbols = SymbolTable::build(file)?;
    let renderer = Renderer { symbols: &symbols };

    let mut out = String::new();
    for import in &file.imports {
        out.push_str(&renderer.import(import));
    }
    if !file.imports.is_empty() && !file.declarations.is_empty() {
        out.push('\n');
    }
    for (i, declaration) in file.declarations.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&renderer.declaration(declaration)?);
    }
    log::trace!("rendered {} ({} bytes)", file.path, out.len());
    Ok(out)
}

// =============================================================================
// Symbols
// =============================================================================

#[derive(Debug, Default)]
struct SymbolTable {
    by_key: HashMap<RefKey, String>,
    names: HashSet<String>,
}

impl SymbolTable {
    fn build(file: &SourceFile) -> Result<SymbolTable, RenderError> {
        let mut table = SymbolTable::default();
        for import in &file.imports {
            for symbol in &import.names {
                table.bind(symbol.refkey.as_ref(), &symbol.name)?;
            }
        }
        for declaration in &file.declarations {
            table.bind(declaration.refkey(), declaration.name())?;
        }
        Ok(table)
    }

    fn bind(&mut self, key: Option<&RefKey>, name: &str) -> Result<(), RenderError> {
        if !self.names.insert(name.to_string()) {
            return Err(RenderError::DuplicateDeclaration(name.to_string()));
        }
        if let Some(key) = key {
            if let Some(existing) = self.by_key.get(key) {
                return Err(RenderError::ConflictingSymbol {
                    key: key.composite(),
                    existing: existing.clone(),
                    name: name.to_string(),
                });
            }
            self.by_key.insert(key.clone(), name.to_string());
        }
        Ok(())
    }
}

/// Parameters visible inside one function or method.
type Locals = HashMap<RefKey, String>;

fn locals_of(params: &[ParamDecl]) -> Locals {
    params
        .iter()
        .filter_map(|p| p.refkey.clone().map(|key| (key, p.name.clone())))
        .collect()
}

// =============================================================================
// Renderer
// =============================================================================

struct Renderer<'a> {
    symbols: &'a SymbolTable,
}

impl Renderer<'_> {
    fn code(&self, code: &Code, locals: &Locals) -> Result<String, RenderError> {
        let mut out = String::new();
        for fragment in code.fragments() {
            match fragment {
                Fragment::Text(text) => out.push_str(text),
                Fragment::Ref(key) => {
                    let name = locals
                        .get(key)
                        .or_else(|| self.symbols.by_key.get(key))
                        .ok_or_else(|| RenderError::UnresolvedReference(key.composite()))?;
                    out.push_str(name);
                }
            }
        }
        Ok(out)
    }

    fn import(&self, import: &ImportDecl) -> String {
        let names: Vec<&str> = import.names.iter().map(|n| n.name.as_str()).collect();
        format!(
            "import {{ {} }} from \"{}\";\n",
            names.join(", "),
            import.module
        )
    }

    fn declaration(&self, declaration: &Declaration) -> Result<String, RenderError> {
        match declaration {
            Declaration::Class(class) => self.class(class),
            Declaration::Interface(interface) => self.interface(interface),
            Declaration::TypeAlias(alias) => self.type_alias(alias),
            Declaration::Function(function) => self.function(function),
        }
    }

    fn params(&self, params: &[ParamDecl], locals: &Locals) -> Result<String, RenderError> {
        let mut rendered = Vec::with_capacity(params.len());
        for param in params {
            let ty = self.code(&param.ty, locals)?;
            let text = match &param.default {
                Some(default) => format!("{}: {} = {}", param.name, ty, self.code(default, locals)?),
                None if param.optional => format!("{}?: {}", param.name, ty),
                None => format!("{}: {}", param.name, ty),
            };
            rendered.push(text);
        }
        Ok(rendered.join(", "))
    }

    fn body(&self, lines: &[Code], locals: &Locals, depth: usize) -> Result<String, RenderError> {
        let indent = INDENT.repeat(depth);
        let mut out = String::new();
        for line in lines {
            let text = self.code(line, locals)?;
            if text.is_empty() {
                out.push('\n');
            } else {
                out.push_str(&format!("{indent}{text}\n"));
            }
        }
        Ok(out)
    }

    fn class(&self, class: &ClassDecl) -> Result<String, RenderError> {
        let mut out = doc_comment(class.doc.as_deref(), "");
        out.push_str(&format!("{}class {} {{\n", export(class.exported), class.name));

        let mut previous_was_field = None;
        for member in &class.members {
            let is_field = matches!(member, ClassMember::Field(_));
            // Fields sit together; methods are separated by a blank line.
            if previous_was_field.is_some() && !(is_field && previous_was_field == Some(true)) {
                out.push('\n');
            }
            previous_was_field = Some(is_field);
            match member {
                ClassMember::Field(field) => out.push_str(&self.field(field)?),
                ClassMember::Constructor(ctor) => out.push_str(&self.method(ctor, true)?),
                ClassMember::Method(method) => out.push_str(&self.method(method, false)?),
            }
        }
        out.push_str("}\n");
        Ok(out)
    }

    fn field(&self, field: &FieldDecl) -> Result<String, RenderError> {
        let readonly = if field.readonly { "readonly " } else { "" };
        Ok(format!(
            "{INDENT}{} {}{}: {};\n",
            field.visibility.keyword(),
            readonly,
            field.name,
            self.code(&field.ty, &Locals::new())?
        ))
    }

    fn method(&self, method: &MethodDecl, constructor: bool) -> Result<String, RenderError> {
        let locals = locals_of(&method.params);
        let mut out = doc_comment(method.doc.as_deref(), INDENT);
        let asyncness = if method.is_async { "async " } else { "" };
        let name = if constructor { "constructor" } else { method.name.as_str() };
        let return_type = match &method.return_type {
            Some(ty) if !constructor => format!(": {}", self.code(ty, &locals)?),
            _ => String::new(),
        };
        out.push_str(&format!(
            "{INDENT}{asyncness}{name}({}){return_type} {{\n",
            self.params(&method.params, &locals)?
        ));
        out.push_str(&self.body(&method.body, &locals, 2)?);
        out.push_str(&format!("{INDENT}}}\n"));
        Ok(out)
    }

    fn interface(&self, interface: &InterfaceDecl) -> Result<String, RenderError> {
        let none = Locals::new();
        let mut out = doc_comment(interface.doc.as_deref(), "");
        out.push_str(&format!(
            "{}interface {} {{\n",
            export(interface.exported),
            interface.name
        ));
        for member in &interface.members {
            match member {
                InterfaceMember::CallSignature {
                    doc,
                    params,
                    return_type,
                } => {
                    out.push_str(&doc_comment(doc.as_deref(), INDENT));
                    out.push_str(&format!(
                        "{INDENT}({}): {};\n",
                        self.params(params, &none)?,
                        self.code(return_type, &none)?
                    ));
                }
                InterfaceMember::Method {
                    name,
                    doc,
                    params,
                    return_type,
                } => {
                    out.push_str(&doc_comment(doc.as_deref(), INDENT));
                    out.push_str(&format!(
                        "{INDENT}{}({}): {};\n",
                        name,
                        self.params(params, &none)?,
                        self.code(return_type, &none)?
                    ));
                }
            }
        }
        out.push_str("}\n");
        Ok(out)
    }

    fn type_alias(&self, alias: &TypeAliasDecl) -> Result<String, RenderError> {
        let mut out = doc_comment(alias.doc.as_deref(), "");
        out.push_str(&format!(
            "{}type {} = {};\n",
            export(alias.exported),
            alias.name,
            self.code(&alias.ty, &Locals::new())?
        ));
        Ok(out)
    }

    fn function(&self, function: &FunctionDecl) -> Result<String, RenderError> {
        let locals = locals_of(&function.params);
        let mut out = doc_comment(function.doc.as_deref(), "");
        let asyncness = if function.is_async { "async " } else { "" };
        out.push_str(&format!(
            "{}{}function {}({}): {} {{\n",
            export(function.exported),
            asyncness,
            function.name,
            self.params(&function.params, &locals)?,
            self.code(&function.return_type, &locals)?
        ));
        out.push_str(&self.body(&function.body, &locals, 1)?);
        out.push_str("}\n");
        Ok(out)
    }
}

fn export(exported: bool) -> &'static str {
    if exported { "export " } else { "" }
}

/// `/** text */` for one line, a starred block otherwise.
fn doc_comment(doc: Option<&str>, indent: &str) -> String {
    let lines: Vec<&str> = match doc {
        Some(text) => text.trim().lines().map(str::trim_end).collect(),
        None => return String::new(),
    };
    match lines.as_slice() {
        [] => String::new(),
        [line] => format!("{indent}/** {line} */\n"),
        _ => {
            let mut out = format!("{indent}/**\n");
            for line in &lines {
                if line.is_empty() {
                    out.push_str(&format!("{indent} *\n"));
                } else {
                    out.push_str(&format!("{indent} * {line}\n"));
                }
            }
            out.push_str(&format!("{indent} */\n"));
            out
        }
    }
}
