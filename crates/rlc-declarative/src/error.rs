use rlc_core::error::EmitError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("reference `{0}` does not resolve to any declaration or import")]
    UnresolvedReference(String),

    #[error("reference `{key}` is bound to both `{existing}` and `{name}`")]
    ConflictingSymbol {
        key: String,
        existing: String,
        name: String,
    },

    #[error("`{0}` is declared more than once in the same file")]
    DuplicateDeclaration(String),
}

impl From<RenderError> for EmitError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::UnresolvedReference(key) => EmitError::UnresolvedReference(key),
            other => EmitError::Render(other.to_string()),
        }
    }
}
