pub mod config;
pub mod context;
pub mod descriptors;
pub mod error;
pub mod model;
pub mod references;
pub mod runtime;

use std::fmt;

use serde::Serialize;

use descriptors::{
    ClientClassDescriptor, ClientInterfaceDescriptor, OperationFileDescriptor, PackageDescriptor,
};
use error::EmitError;

/// A generated file with path and content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// The declaration targets a generation run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GenerationTarget {
    ClientDefinitions,
    ClientClass,
    OperationFunctions,
    PackageJson,
}

impl GenerationTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationTarget::ClientDefinitions => "clientDefinitions",
            GenerationTarget::ClientClass => "clientClass",
            GenerationTarget::OperationFunctions => "operationFunctions",
            GenerationTarget::PackageJson => "packageJson",
        }
    }
}

impl fmt::Display for GenerationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies which emission strategy produced a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmitterId {
    Declarative,
    Baseline,
}

impl EmitterId {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmitterId::Declarative => "declarative",
            EmitterId::Baseline => "baseline",
        }
    }
}

impl fmt::Display for EmitterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An emission strategy: turns descriptors into source files.
///
/// Both the declarative path and the template baseline implement this, so the
/// builder can swap one for the other per target without knowing which is which.
pub trait TargetEmitter {
    fn id(&self) -> EmitterId;

    /// Emit `clientDefinitions.ts` (routes interface, client type alias, group interfaces).
    fn client_definitions(
        &self,
        descriptor: &ClientInterfaceDescriptor,
    ) -> Result<GeneratedFile, EmitError>;

    /// Emit the classical client class.
    fn client_class(&self, descriptor: &ClientClassDescriptor) -> Result<GeneratedFile, EmitError>;

    /// Emit one operation file holding the operation, send and deserialize functions.
    fn operation_file(
        &self,
        descriptor: &OperationFileDescriptor,
    ) -> Result<GeneratedFile, EmitError>;

    /// Emit `package.json`.
    fn package_json(&self, descriptor: &PackageDescriptor) -> Result<GeneratedFile, EmitError>;
}

impl<E: TargetEmitter + ?Sized> TargetEmitter for &E {
    fn id(&self) -> EmitterId {
        (**self).id()
    }

    fn client_definitions(
        &self,
        descriptor: &ClientInterfaceDescriptor,
    ) -> Result<GeneratedFile, EmitError> {
        (**self).client_definitions(descriptor)
    }

    fn client_class(&self, descriptor: &ClientClassDescriptor) -> Result<GeneratedFile, EmitError> {
        (**self).client_class(descriptor)
    }

    fn operation_file(
        &self,
        descriptor: &OperationFileDescriptor,
    ) -> Result<GeneratedFile, EmitError> {
        (**self).operation_file(descriptor)
    }

    fn package_json(&self, descriptor: &PackageDescriptor) -> Result<GeneratedFile, EmitError> {
        (**self).package_json(descriptor)
    }
}
