//! The declarative emission path.
//!
//! Emitters turn descriptors into a [`tree::SourceFile`]; [`render::render`]
//! resolves reference keys against the file's imports and declarations and
//! produces the final text.

pub mod emitters;
pub mod error;
pub mod generator;
pub mod render;
pub mod tree;

pub use error::RenderError;
pub use generator::DeclarativeEmitter;
pub use render::render;
