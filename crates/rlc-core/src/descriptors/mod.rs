//! Pure builders from service-model fragments to emitter-ready descriptors.
//!
//! Classification (plain, long-running, paging), parameter shaping and import
//! sets are decided here once; both emission paths read the same descriptors.

pub mod client;
pub mod imports;
pub mod operation;
pub mod package;

use std::collections::HashMap;

use serde::Serialize;

use crate::error::DescriptorError;
use crate::model::ServiceModel;
use crate::references::RefKey;

pub use client::{
    ClientClassDescriptor, ClientInterfaceDescriptor, ClientNames, OperationGroupDescriptor,
    RouteDescriptor, build_client_class_descriptor, build_client_interface_descriptor,
};
pub use imports::{ImportSet, ImportedName, referenced_type_names};
pub use operation::{
    LroShape, OperationDescriptor, OperationKind, PagingShape, ParameterDescriptor,
    OPTIONS_DEFAULT, ParameterLocation, ParameterSlot, build_operation_descriptor,
};
pub use package::{AzureMetadata, PackageDescriptor, build_package_descriptor};

use imports::{CORE_LRO, HTTP_RUNTIME, from_api};

/// The `context` parameter type of every operation function.
pub const OPERATION_CONTEXT_TYPE: &str = "Client";

/// One generated operation file: `{src}/api/{name}.ts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationFileDescriptor {
    pub path: String,
    pub context_type: String,
    pub operation: OperationDescriptor,
    pub imports: ImportSet,
}

/// Build descriptors for every operation in the model, in path order.
pub fn build_operation_descriptors(
    model: &ServiceModel,
) -> Result<Vec<OperationDescriptor>, DescriptorError> {
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut descriptors = Vec::with_capacity(model.operation_count());

    for (template, path, operation) in model.operations() {
        let descriptor =
            build_operation_descriptor(template, path.operation_group_name.as_deref(), operation)?;
        if let Some(first) = seen.insert(descriptor.name.clone(), template.to_string()) {
            return Err(DescriptorError::DuplicateOperation {
                operation: descriptor.name,
                first,
                second: template.to_string(),
            });
        }
        descriptors.push(descriptor);
    }

    Ok(descriptors)
}

pub fn build_operation_file_descriptor(
    model: &ServiceModel,
    operation: &OperationDescriptor,
) -> OperationFileDescriptor {
    let mut imports = ImportSet::new();
    imports.add_all(
        HTTP_RUNTIME,
        &[
            OPERATION_CONTEXT_TYPE,
            "PathUncheckedResponse",
            "StreamableMethod",
            "createRestError",
            "operationOptionsToRequestParameters",
        ],
    );
    match operation.kind() {
        OperationKind::LongRunning => {
            imports.add_all(CORE_LRO, &["OperationState", "PollerLike"]);
            imports.add(from_api::POLLING_HELPERS, "getLongRunningPoller");
        }
        OperationKind::Paging => {
            imports.add_all(
                from_api::PAGING_HELPERS,
                &["PagedAsyncIterableIterator", "buildPagedAsyncIterator"],
            );
        }
        OperationKind::Plain => {}
    }
    for param in operation.parameters.iter().filter(|p| !p.is_options()) {
        imports.add_models(from_api::MODELS, &param.type_name);
    }
    imports.add_models(from_api::MODELS, &operation.return_type());
    imports.add_models(from_api::MODELS, &operation.deserialize_return_type());
    imports.add_ref(
        from_api::OPTIONS,
        &operation.options_type,
        RefKey::type_decl(&operation.options_type),
    );

    OperationFileDescriptor {
        path: format!("{}/api/{}.ts", model.src_path, operation.name),
        context_type: OPERATION_CONTEXT_TYPE.to_string(),
        operation: operation.clone(),
        imports,
    }
}

/// Operation file descriptors for the whole model.
pub fn build_operation_file_descriptors(
    model: &ServiceModel,
) -> Result<Vec<OperationFileDescriptor>, DescriptorError> {
    let operations = build_operation_descriptors(model)?;
    Ok(operations
        .iter()
        .map(|op| build_operation_file_descriptor(model, op))
        .collect())
}
