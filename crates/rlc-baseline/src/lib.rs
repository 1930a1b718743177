//! The baseline generator: the template path the declarative emitters can
//! fall back to.

mod views;

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use rlc_core::descriptors::{
    ClientClassDescriptor, ClientInterfaceDescriptor, OperationFileDescriptor, PackageDescriptor,
};
use rlc_core::error::EmitError;
use rlc_core::{EmitterId, GeneratedFile, TargetEmitter};
use serde::Serialize;

use views::{ClientClassView, ClientDefinitionsView, OperationFileView, PackageView};

const OPERATION: &str = "operation.ts.j2";
const CLIENT_CLASS: &str = "client_class.ts.j2";
const CLIENT_DEFINITIONS: &str = "client_definitions.ts.j2";
const PACKAGE_JSON: &str = "package.json.j2";

/// Template-backed [`TargetEmitter`].
pub struct TemplateEmitter {
    env: Environment<'static>,
}

impl TemplateEmitter {
    pub fn new() -> Result<Self, EmitError> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        for (name, source) in [
            (OPERATION, include_str!("../templates/operation.ts.j2")),
            (CLIENT_CLASS, include_str!("../templates/client_class.ts.j2")),
            (
                CLIENT_DEFINITIONS,
                include_str!("../templates/client_definitions.ts.j2"),
            ),
            (PACKAGE_JSON, include_str!("../templates/package.json.j2")),
        ] {
            env.add_template(name, source).map_err(template_error)?;
        }
        Ok(Self { env })
    }

    fn render<S: Serialize>(&self, template: &str, ctx: S) -> Result<String, EmitError> {
        let tmpl = self.env.get_template(template).map_err(template_error)?;
        tmpl.render(ctx).map_err(template_error)
    }
}

fn template_error(err: minijinja::Error) -> EmitError {
    EmitError::Template(err.to_string())
}

impl TargetEmitter for TemplateEmitter {
    fn id(&self) -> EmitterId {
        EmitterId::Baseline
    }

    fn client_definitions(
        &self,
        descriptor: &ClientInterfaceDescriptor,
    ) -> Result<GeneratedFile, EmitError> {
        Ok(GeneratedFile {
            path: descriptor.path.clone(),
            content: self.render(CLIENT_DEFINITIONS, ClientDefinitionsView::new(descriptor))?,
        })
    }

    fn client_class(&self, descriptor: &ClientClassDescriptor) -> Result<GeneratedFile, EmitError> {
        Ok(GeneratedFile {
            path: descriptor.path.clone(),
            content: self.render(CLIENT_CLASS, ClientClassView::new(descriptor))?,
        })
    }

    fn operation_file(
        &self,
        descriptor: &OperationFileDescriptor,
    ) -> Result<GeneratedFile, EmitError> {
        log::trace!("baseline: rendering {}", descriptor.path);
        Ok(GeneratedFile {
            path: descriptor.path.clone(),
            content: self.render(OPERATION, OperationFileView::new(descriptor))?,
        })
    }

    fn package_json(&self, descriptor: &PackageDescriptor) -> Result<GeneratedFile, EmitError> {
        Ok(GeneratedFile {
            path: descriptor.path.clone(),
            content: self.render(PACKAGE_JSON, PackageView::new(descriptor))?,
        })
    }
}
