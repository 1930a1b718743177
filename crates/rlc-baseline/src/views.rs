//! Flat, pre-formatted template contexts.
//!
//! Templates only interpolate; every signature and literal is spelled out here.

use indexmap::IndexMap;
use rlc_core::descriptors::{
    ClientClassDescriptor, ClientInterfaceDescriptor, ClientNames, OperationDescriptor,
    OperationFileDescriptor, OperationGroupDescriptor, PackageDescriptor, ParameterSlot,
    RouteDescriptor,
};
use serde::Serialize;

fn quoted(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// One `//` line per description line; a blank line stays a bare `//`.
fn line_comments(op: &OperationDescriptor) -> Vec<String> {
    op.doc_lines()
        .into_iter()
        .map(|line| {
            if line.is_empty() {
                "//".to_string()
            } else {
                format!("// {line}")
            }
        })
        .collect()
}

fn string_array(values: &[String]) -> String {
    let items: Vec<String> = values.iter().map(|v| quoted(v)).collect();
    format!("[{}]", items.join(", "))
}

#[derive(Debug, Serialize)]
pub struct OperationView {
    pub name: String,
    pub kind: &'static str,
    pub doc_lines: Vec<String>,
    pub send_name: String,
    pub deserialize_name: String,
    pub method: &'static str,
    pub path_literal: String,
    /// `, userId` for each path parameter.
    pub path_args: String,
    pub query: Vec<String>,
    pub headers: Vec<String>,
    pub body: Option<String>,
    pub removes_api_version_policy: bool,
    pub expected_statuses: String,
    pub send_params: String,
    pub params: String,
    pub arguments: String,
    pub return_type: String,
    pub deserialize_return_type: String,
    pub result_accessor: String,
    pub paging_settings: String,
}

impl OperationView {
    pub fn new(op: &OperationDescriptor, context_type: &str) -> OperationView {
        let declaration = format!("context: {}, {}", context_type, op.declaration());
        let arguments = std::iter::once("context")
            .chain(op.argument_names())
            .collect::<Vec<_>>()
            .join(", ");

        let path_args: String = op
            .parameters
            .iter()
            .filter(|p| p.slot == ParameterSlot::Path)
            .map(|p| format!(", {}", p.name))
            .collect();
        let query = op
            .parameters
            .iter()
            .filter(|p| matches!(p.slot, ParameterSlot::Query { .. }))
            .map(|p| format!("{}: {}", quoted(&p.name), p.name))
            .collect();
        let headers = op
            .parameters
            .iter()
            .filter_map(|p| p.header_name().map(|h| format!("{}: {}", quoted(h), p.name)))
            .collect();

        let result_accessor = if op.kind() == rlc_core::descriptors::OperationKind::LongRunning {
            op.lro.as_ref().map(|l| l.accessor()).unwrap_or_default()
        } else {
            String::new()
        };

        let paging_settings = match &op.paging {
            Some(paging) => match &paging.next_link_field {
                Some(next) => format!(
                    "{{ itemName: {}, nextLinkName: {} }}",
                    quoted(&paging.item_field),
                    quoted(next)
                ),
                None => format!("{{ itemName: {} }}", quoted(&paging.item_field)),
            },
            None => String::new(),
        };

        OperationView {
            name: op.name.clone(),
            kind: op.kind().as_str(),
            doc_lines: line_comments(op),
            send_name: op.send_function_name(),
            deserialize_name: op.deserialize_function_name(),
            method: op.method.as_lower(),
            path_literal: quoted(&op.path),
            path_args,
            query,
            headers,
            body: op.body_parameter().map(|p| p.name.clone()),
            removes_api_version_policy: op.removes_api_version_policy,
            expected_statuses: string_array(&op.expected_statuses),
            send_params: declaration.clone(),
            params: declaration,
            arguments,
            return_type: op.return_type(),
            deserialize_return_type: op.deserialize_return_type(),
            result_accessor,
            paging_settings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OperationFileView {
    pub imports: Vec<String>,
    pub op: OperationView,
}

impl OperationFileView {
    pub fn new(descriptor: &OperationFileDescriptor) -> Self {
        Self {
            imports: descriptor.imports.statements(),
            op: OperationView::new(&descriptor.operation, &descriptor.context_type),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClientMethodView {
    pub name: String,
    pub doc_lines: Vec<String>,
    pub method_params: String,
    pub call_args: String,
    pub return_type: String,
}

#[derive(Debug, Serialize)]
pub struct ClientClassView {
    pub imports: Vec<String>,
    pub names: ClientNames,
    pub constructor_params: String,
    pub constructor_args: String,
    pub operations: Vec<ClientMethodView>,
}

impl ClientClassView {
    pub fn new(descriptor: &ClientClassDescriptor) -> Self {
        let mut params = vec!["endpointParam: string".to_string()];
        let mut args = vec!["endpointParam".to_string()];
        for param in &descriptor.client_parameters {
            params.push(param.signature());
            args.push(param.name.clone());
        }
        params.push(format!(
            "options: {} = {{}}",
            descriptor.names.optional_params_type
        ));
        args.push("options".to_string());

        let operations = descriptor
            .operations
            .iter()
            .map(|op| ClientMethodView {
                name: op.name.clone(),
                doc_lines: line_comments(op),
                method_params: op.declaration(),
                call_args: op
                    .argument_names()
                    .iter()
                    .map(|name| format!(", {name}"))
                    .collect(),
                return_type: op.return_type(),
            })
            .collect();

        Self {
            imports: descriptor.imports.statements(),
            names: descriptor.names.clone(),
            constructor_params: params.join(", "),
            constructor_args: args.join(", "),
            operations,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RouteView {
    pub path: String,
    pub verbs: String,
    pub params: String,
    pub return_type: String,
}

impl RouteView {
    fn new(route: &RouteDescriptor) -> Self {
        let params = std::iter::once(format!("path: {}", quoted(&route.path)))
            .chain(
                route
                    .path_parameters
                    .iter()
                    .map(|p| format!("{}: {}", p.name, p.type_name)),
            )
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            path: route.path.clone(),
            verbs: route.verbs(),
            params,
            return_type: route.return_type(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GroupOperationView {
    pub name: String,
    pub doc_lines: Vec<String>,
    pub signature: String,
    pub return_type: String,
}

#[derive(Debug, Serialize)]
pub struct GroupView {
    pub interface_name: String,
    pub operations: Vec<GroupOperationView>,
}

impl GroupView {
    fn new(group: &OperationGroupDescriptor) -> Self {
        Self {
            interface_name: group.interface_name.clone(),
            operations: group
                .operations
                .iter()
                .map(|op| GroupOperationView {
                    name: op.name.clone(),
                    doc_lines: line_comments(op),
                    signature: op.signature(),
                    return_type: op.return_type(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClientDefinitionsView {
    pub imports: Vec<String>,
    pub routes: Vec<RouteView>,
    pub groups: Vec<GroupView>,
    pub context_type: String,
    pub context_alias: String,
}

impl ClientDefinitionsView {
    pub fn new(descriptor: &ClientInterfaceDescriptor) -> Self {
        let alias = std::iter::once("Client & { path: Routes }".to_string())
            .chain(descriptor.shortcut_members())
            .collect::<Vec<_>>()
            .join(" & ");
        Self {
            imports: descriptor.imports.statements(),
            routes: descriptor.routes.iter().map(RouteView::new).collect(),
            groups: descriptor.groups.iter().map(GroupView::new).collect(),
            context_type: descriptor.context_type().to_string(),
            context_alias: alias,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AzureView {
    pub sdk_type: String,
    pub repository: String,
    pub bugs_url: String,
}

/// Every value is already a JSON literal.
#[derive(Debug, Serialize)]
pub struct PackageView {
    pub name: String,
    pub version: String,
    pub description: String,
    pub node_engine: String,
    pub dependencies: String,
    pub dev_dependencies: String,
    pub scripts: String,
    pub azure: Option<AzureView>,
}

impl PackageView {
    pub fn new(descriptor: &PackageDescriptor) -> Self {
        Self {
            name: quoted(&descriptor.name),
            version: quoted(&descriptor.version),
            description: quoted(&descriptor.description),
            node_engine: quoted(&descriptor.node_engine),
            dependencies: json_entries(&descriptor.dependencies),
            dev_dependencies: json_entries(&descriptor.dev_dependencies),
            scripts: json_entries(&descriptor.scripts),
            azure: descriptor.azure.as_ref().map(|azure| AzureView {
                sdk_type: quoted(&azure.sdk_type),
                repository: quoted(&azure.repository),
                bugs_url: quoted(&azure.bugs_url),
            }),
        }
    }
}

/// `"a": "1",\n    "b": "2"` at the nesting depth of a top-level object member.
fn json_entries(entries: &IndexMap<String, String>) -> String {
    entries
        .iter()
        .map(|(k, v)| format!("{}: {}", quoted(k), quoted(v)))
        .collect::<Vec<_>>()
        .join(",\n    ")
}
