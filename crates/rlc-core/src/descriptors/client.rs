use heck::{ToLowerCamelCase, ToPascalCase};
use indexmap::IndexMap;
use serde::Serialize;

use crate::model::{HttpMethod, PathMetadata, ServiceModel};
use crate::references::RefKey;

use super::imports::{CORE_LRO, HTTP_RUNTIME, ImportSet, from_src};
use super::operation::{OperationDescriptor, OperationKind, ParameterDescriptor, ParameterSlot};

/// Interface name for operations that belong to no group.
pub const UNGROUPED_INTERFACE: &str = "ClientOperations";

/// The family of names derived from the client name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientNames {
    /// Client name without a trailing `Client`, e.g. `Widgets`.
    pub base: String,
    /// `WidgetsClient`
    pub class_name: String,
    /// `WidgetsContext`
    pub context_type: String,
    /// `createWidgets`
    pub factory_name: String,
    /// `WidgetsClientOptionalParams`
    pub optional_params_type: String,
}

impl ClientNames {
    pub fn new(client_name: &str) -> ClientNames {
        let pascal = client_name.to_pascal_case();
        let base = match pascal.strip_suffix("Client") {
            Some(stripped) if !stripped.is_empty() => stripped.to_string(),
            _ => pascal,
        };
        ClientNames {
            class_name: format!("{base}Client"),
            context_type: format!("{base}Context"),
            factory_name: format!("create{base}"),
            optional_params_type: format!("{base}ClientOptionalParams"),
            base,
        }
    }
}

/// The classical client class wrapping the context and exposing one method per operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientClassDescriptor {
    pub path: String,
    pub names: ClientNames,
    /// Constructor parameters after `endpointParam`, deduplicated across operations.
    pub client_parameters: Vec<ParameterDescriptor>,
    pub operations: Vec<OperationDescriptor>,
    pub imports: ImportSet,
}

impl ClientClassDescriptor {
    pub fn class_name(&self) -> &str {
        &self.names.class_name
    }
}

/// One call signature of the `Routes` interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDescriptor {
    pub path: String,
    pub name: String,
    pub path_parameters: Vec<ParameterDescriptor>,
    pub methods: Vec<HttpMethod>,
    /// Distinct response types of the operations on this path, in declared order.
    pub response_types: Vec<String>,
}

impl RouteDescriptor {
    /// `StreamableMethod<A | B>`
    pub fn return_type(&self) -> String {
        let inner = if self.response_types.is_empty() {
            "unknown".to_string()
        } else {
            self.response_types.join(" | ")
        };
        format!("StreamableMethod<{inner}>")
    }

    /// `get, post`
    pub fn verbs(&self) -> String {
        self.methods
            .iter()
            .map(HttpMethod::as_lower)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Operations exposed together under one interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationGroupDescriptor {
    /// Interface name, e.g. `UsersOperations`.
    pub interface_name: String,
    /// Shortcut property on the client type, e.g. `users`. `None` for the ungrouped set.
    pub property: Option<String>,
    pub operations: Vec<OperationDescriptor>,
}

/// Everything `clientDefinitions.ts` declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInterfaceDescriptor {
    pub path: String,
    pub names: ClientNames,
    pub routes: Vec<RouteDescriptor>,
    pub groups: Vec<OperationGroupDescriptor>,
    pub include_shortcuts: bool,
    pub imports: ImportSet,
}

impl ClientInterfaceDescriptor {
    pub fn context_type(&self) -> &str {
        &self.names.context_type
    }

    /// The `& ...` members appended to the context alias when shortcuts are on.
    pub fn shortcut_members(&self) -> Vec<String> {
        if !self.include_shortcuts {
            return Vec::new();
        }
        self.groups
            .iter()
            .map(|group| match &group.property {
                Some(property) => format!("{{ {}: {} }}", property, group.interface_name),
                None => group.interface_name.clone(),
            })
            .collect()
    }
}

pub fn build_client_class_descriptor(
    model: &ServiceModel,
    operations: &[OperationDescriptor],
) -> ClientClassDescriptor {
    let names = ClientNames::new(&model.client_name());

    let mut client_parameters: Vec<ParameterDescriptor> = Vec::new();
    for op in operations {
        for param in &op.client_parameters {
            if !client_parameters.iter().any(|p| p.name == param.name) {
                client_parameters.push(param.clone());
            }
        }
    }

    let mut imports = ImportSet::new();
    imports.add(HTTP_RUNTIME, "Pipeline");
    add_return_shape_imports(&mut imports, operations);
    imports.add_ref(
        from_src::API_INDEX,
        &names.factory_name,
        RefKey::client(&names.base),
    );
    imports.add_ref(
        from_src::API_INDEX,
        &names.context_type,
        RefKey::type_decl(&names.context_type),
    );
    imports.add_ref(
        from_src::API_INDEX,
        &names.optional_params_type,
        RefKey::type_decl(&names.optional_params_type),
    );
    for op in operations {
        imports.add_ref(
            &from_src::operation_module(&op.name),
            &op.name,
            op.operation_function_ref(),
        );
    }
    for op in operations {
        imports.add_ref(
            from_src::OPTIONS,
            &op.options_type,
            RefKey::type_decl(&op.options_type),
        );
    }
    for op in operations {
        add_signature_models(&mut imports, op);
    }
    for param in &client_parameters {
        imports.add_models(from_src::MODELS, &param.type_name);
    }

    ClientClassDescriptor {
        path: format!("{}/{}.ts", model.src_path, names.class_name),
        names,
        client_parameters,
        operations: operations.to_vec(),
        imports,
    }
}

pub fn build_client_interface_descriptor(
    model: &ServiceModel,
    operations: &[OperationDescriptor],
) -> ClientInterfaceDescriptor {
    let names = ClientNames::new(&model.client_name());

    let routes = model
        .paths
        .iter()
        .filter(|(_, meta)| !meta.operations.is_empty())
        .map(|(template, meta)| build_route(template, meta, operations))
        .collect::<Vec<_>>();

    let mut grouped: IndexMap<String, Vec<OperationDescriptor>> = IndexMap::new();
    let mut ungrouped = Vec::new();
    for op in operations {
        match op.group.as_deref().filter(|g| !g.trim().is_empty()) {
            Some(group) => grouped
                .entry(group.to_pascal_case())
                .or_default()
                .push(op.clone()),
            None => ungrouped.push(op.clone()),
        }
    }

    let mut groups: Vec<OperationGroupDescriptor> = grouped
        .into_iter()
        .map(|(group, ops)| OperationGroupDescriptor {
            interface_name: format!("{group}Operations"),
            property: Some(group.to_lower_camel_case()),
            operations: ops,
        })
        .collect();
    if !ungrouped.is_empty() {
        groups.push(OperationGroupDescriptor {
            interface_name: UNGROUPED_INTERFACE.to_string(),
            property: None,
            operations: ungrouped,
        });
    }

    let mut imports = ImportSet::new();
    imports.add_all(HTTP_RUNTIME, &["Client", "StreamableMethod"]);
    add_return_shape_imports(&mut imports, operations);
    for op in operations {
        imports.add_ref(
            from_src::OPTIONS,
            &op.options_type,
            RefKey::type_decl(&op.options_type),
        );
    }
    for route in &routes {
        for param in &route.path_parameters {
            imports.add_models(from_src::MODELS, &param.type_name);
        }
        for response in &route.response_types {
            imports.add_models(from_src::MODELS, response);
        }
    }
    for op in operations {
        add_signature_models(&mut imports, op);
    }

    ClientInterfaceDescriptor {
        path: format!("{}/clientDefinitions.ts", model.src_path),
        names,
        routes,
        groups,
        include_shortcuts: model.options.include_shortcuts,
        imports,
    }
}

fn build_route(
    template: &str,
    meta: &PathMetadata,
    operations: &[OperationDescriptor],
) -> RouteDescriptor {
    let on_path: Vec<&OperationDescriptor> =
        operations.iter().filter(|op| op.path == template).collect();

    let mut path_parameters: Vec<ParameterDescriptor> = meta
        .path_parameters
        .iter()
        .map(|p| ParameterDescriptor {
            name: p.name.clone(),
            type_name: p.type_name.clone(),
            optional: false,
            slot: ParameterSlot::Path,
        })
        .collect();
    if path_parameters.is_empty() {
        for op in &on_path {
            for param in op.parameters.iter().chain(&op.client_parameters) {
                if param.slot == ParameterSlot::Path
                    && !path_parameters.iter().any(|p| p.name == param.name)
                {
                    path_parameters.push(param.clone());
                }
            }
        }
    }

    let mut methods = Vec::new();
    let mut response_types: Vec<String> = Vec::new();
    for op in &on_path {
        if !methods.contains(&op.method) {
            methods.push(op.method);
        }
        if !response_types.contains(&op.response_type) {
            response_types.push(op.response_type.clone());
        }
    }

    RouteDescriptor {
        path: template.to_string(),
        name: meta.name.clone(),
        path_parameters,
        methods,
        response_types,
    }
}

/// Imports needed to spell the return types of `operations` from a file under `{src}/`.
fn add_return_shape_imports(imports: &mut ImportSet, operations: &[OperationDescriptor]) {
    let kinds: Vec<OperationKind> = operations.iter().map(OperationDescriptor::kind).collect();
    if kinds.contains(&OperationKind::LongRunning) {
        imports.add_all(CORE_LRO, &["OperationState", "PollerLike"]);
    }
    if kinds.contains(&OperationKind::Paging) {
        imports.add(from_src::PAGING_HELPERS, "PagedAsyncIterableIterator");
    }
}

fn add_signature_models(imports: &mut ImportSet, op: &OperationDescriptor) {
    for param in op.parameters.iter().filter(|p| !p.is_options()) {
        imports.add_models(from_src::MODELS, &param.type_name);
    }
    imports.add_models(from_src::MODELS, &op.return_type());
}
