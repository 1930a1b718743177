//! The declarative document tree.
//!
//! Emitters build these nodes; only the renderer turns them into text. Names of
//! other declarations are never spelled out here: they are [`Fragment::Ref`]s
//! resolved against the file's symbol table at render time.

use rlc_core::references::RefKey;

// =============================================================================
// Code fragments
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Ref(RefKey),
}

/// A run of text with embedded references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Code(Vec<Fragment>);

impl Code {
    pub fn new() -> Code {
        Code(Vec::new())
    }

    pub fn text(text: impl Into<String>) -> Code {
        Code(vec![Fragment::Text(text.into())])
    }

    pub fn reference(key: RefKey) -> Code {
        Code(vec![Fragment::Ref(key)])
    }

    pub fn push_text(mut self, text: impl Into<String>) -> Code {
        self.0.push(Fragment::Text(text.into()));
        self
    }

    pub fn push_ref(mut self, key: RefKey) -> Code {
        self.0.push(Fragment::Ref(key));
        self
    }

    pub fn push_code(mut self, other: Code) -> Code {
        self.0.extend(other.0);
        self
    }

    /// Join several pieces with a separator, e.g. argument lists.
    pub fn join(parts: Vec<Code>, separator: &str) -> Code {
        let mut joined = Code::new();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                joined = joined.push_text(separator);
            }
            joined = joined.push_code(part);
        }
        joined
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.0
    }

    pub fn references(&self) -> impl Iterator<Item = &RefKey> {
        self.0.iter().filter_map(|f| match f {
            Fragment::Ref(key) => Some(key),
            Fragment::Text(_) => None,
        })
    }
}

impl From<&str> for Code {
    fn from(text: &str) -> Code {
        Code::text(text)
    }
}

impl From<String> for Code {
    fn from(text: String) -> Code {
        Code::text(text)
    }
}

// =============================================================================
// Files and imports
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub imports: Vec<ImportDecl>,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub module: String,
    pub names: Vec<ImportedSymbol>,
}

/// A named import, optionally bound to the declaration it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedSymbol {
    pub name: String,
    pub refkey: Option<RefKey>,
}

// =============================================================================
// Declarations
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Class(ClassDecl),
    Interface(InterfaceDecl),
    TypeAlias(TypeAliasDecl),
    Function(FunctionDecl),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Class(c) => &c.name,
            Declaration::Interface(i) => &i.name,
            Declaration::TypeAlias(t) => &t.name,
            Declaration::Function(f) => &f.name,
        }
    }

    pub fn refkey(&self) -> Option<&RefKey> {
        match self {
            Declaration::Class(c) => c.refkey.as_ref(),
            Declaration::Interface(i) => i.refkey.as_ref(),
            Declaration::TypeAlias(t) => t.refkey.as_ref(),
            Declaration::Function(f) => f.refkey.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn keyword(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    pub name: String,
    pub ty: Code,
    pub optional: bool,
    pub default: Option<Code>,
    /// Lets bodies refer to the parameter by key instead of by name.
    pub refkey: Option<RefKey>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: String,
    pub refkey: Option<RefKey>,
    pub exported: bool,
    pub doc: Option<String>,
    pub members: Vec<ClassMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassMember {
    Field(FieldDecl),
    Constructor(MethodDecl),
    Method(MethodDecl),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: Code,
    pub visibility: Visibility,
    pub readonly: bool,
    pub refkey: Option<RefKey>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: String,
    pub refkey: Option<RefKey>,
    pub is_async: bool,
    pub doc: Option<String>,
    pub params: Vec<ParamDecl>,
    pub return_type: Option<Code>,
    /// One entry per line, relative to the method body.
    pub body: Vec<Code>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDecl {
    pub name: String,
    pub refkey: Option<RefKey>,
    pub exported: bool,
    pub doc: Option<String>,
    pub members: Vec<InterfaceMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceMember {
    /// `(path: "/users", ...): R;`
    CallSignature {
        doc: Option<String>,
        params: Vec<ParamDecl>,
        return_type: Code,
    },
    /// `name(...): R;`
    Method {
        name: String,
        doc: Option<String>,
        params: Vec<ParamDecl>,
        return_type: Code,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAliasDecl {
    pub name: String,
    pub refkey: Option<RefKey>,
    pub exported: bool,
    pub doc: Option<String>,
    pub ty: Code,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub name: String,
    pub refkey: Option<RefKey>,
    pub exported: bool,
    pub is_async: bool,
    pub doc: Option<String>,
    pub params: Vec<ParamDecl>,
    pub return_type: Code,
    pub body: Vec<Code>,
}
