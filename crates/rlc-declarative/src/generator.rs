use rlc_core::descriptors::{
    ClientClassDescriptor, ClientInterfaceDescriptor, OperationFileDescriptor, PackageDescriptor,
};
use rlc_core::error::EmitError;
use rlc_core::{EmitterId, GeneratedFile, TargetEmitter};

use crate::emitters;
use crate::render::render;
use crate::tree::SourceFile;

/// The declarative emission path: descriptor → document tree → text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclarativeEmitter;

impl DeclarativeEmitter {
    pub fn new() -> Self {
        Self
    }
}

fn rendered(file: SourceFile) -> Result<GeneratedFile, EmitError> {
    let content = render(&file)?;
    Ok(GeneratedFile {
        path: file.path,
        content,
    })
}

impl TargetEmitter for DeclarativeEmitter {
    fn id(&self) -> EmitterId {
        EmitterId::Declarative
    }

    fn client_definitions(
        &self,
        descriptor: &ClientInterfaceDescriptor,
    ) -> Result<GeneratedFile, EmitError> {
        rendered(emitters::client_definitions_file(descriptor))
    }

    fn client_class(&self, descriptor: &ClientClassDescriptor) -> Result<GeneratedFile, EmitError> {
        rendered(emitters::client_class_file(descriptor))
    }

    fn operation_file(
        &self,
        descriptor: &OperationFileDescriptor,
    ) -> Result<GeneratedFile, EmitError> {
        rendered(emitters::operation_file(descriptor))
    }

    fn package_json(&self, descriptor: &PackageDescriptor) -> Result<GeneratedFile, EmitError> {
        let manifest = emitters::package_manifest(descriptor);
        let mut content = serde_json::to_string_pretty(&manifest)
            .map_err(|e| EmitError::Render(e.to_string()))?;
        content.push('\n');
        Ok(GeneratedFile {
            path: descriptor.path.clone(),
            content,
        })
    }
}
