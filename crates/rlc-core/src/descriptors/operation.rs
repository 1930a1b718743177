use std::collections::HashSet;

use heck::{ToLowerCamelCase, ToPascalCase};
use serde::Serialize;

use crate::error::DescriptorError;
use crate::model::{HttpMethod, ParameterMetadata, ServiceOperation};
use crate::references::RefKey;

/// Initializer of the trailing options parameter.
pub const OPTIONS_DEFAULT: &str = "{ requestOptions: {} }";

/// Names every generated function already declares: the client comes
/// first and the options bag last.
const RESERVED_PARAMETERS: [&str; 2] = ["context", "options"];

/// Where a per-call parameter travels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Body,
}

impl ParameterLocation {
    /// Parse an upstream location tag. Anything outside the four known
    /// locations is `None`; the caller turns that into a model error.
    pub fn parse(raw: &str) -> Option<ParameterLocation> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "path" => Some(ParameterLocation::Path),
            "query" => Some(ParameterLocation::Query),
            "header" => Some(ParameterLocation::Header),
            "body" => Some(ParameterLocation::Body),
            _ => None,
        }
    }
}

/// The role a parameter plays in the emitted signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ParameterSlot {
    Path,
    Query { is_api_version: bool },
    Header { header_name: String },
    Body,
    /// The implicit trailing options bag.
    Options,
}

/// A parameter as it appears in an emitted signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub type_name: String,
    pub optional: bool,
    pub slot: ParameterSlot,
}

impl ParameterDescriptor {
    pub fn location(&self) -> Option<ParameterLocation> {
        match self.slot {
            ParameterSlot::Path => Some(ParameterLocation::Path),
            ParameterSlot::Query { .. } => Some(ParameterLocation::Query),
            ParameterSlot::Header { .. } => Some(ParameterLocation::Header),
            ParameterSlot::Body => Some(ParameterLocation::Body),
            ParameterSlot::Options => None,
        }
    }

    pub fn is_options(&self) -> bool {
        self.slot == ParameterSlot::Options
    }

    /// `name: Type` or `name?: Type`.
    pub fn signature(&self) -> String {
        let marker = if self.optional { "?" } else { "" };
        format!("{}{}: {}", self.name, marker, self.type_name)
    }

    /// Initializer used in function declarations; only the options bag has one.
    pub fn default_value(&self) -> Option<&'static str> {
        self.is_options().then_some(OPTIONS_DEFAULT)
    }

    /// Parameter as written in a function declaration: the options bag
    /// takes its initializer instead of `?`.
    pub fn declaration(&self) -> String {
        match self.default_value() {
            Some(default) => format!("{}: {} = {}", self.name, self.type_name, default),
            None => self.signature(),
        }
    }

    pub fn header_name(&self) -> Option<&str> {
        match &self.slot {
            ParameterSlot::Header { header_name } => Some(header_name),
            _ => None,
        }
    }
}

/// Long-running shape: what the poller eventually yields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LroShape {
    pub final_result_type: String,
    /// Segments of the access path into the final body; empty means the whole body.
    pub final_result_path: Vec<String>,
}

impl LroShape {
    /// `.result.value` style accessor appended to `result.body`.
    pub fn accessor(&self) -> String {
        self.final_result_path
            .iter()
            .map(|segment| format!(".{segment}"))
            .collect()
    }
}

/// Paging shape: which fields of a page hold items and the next link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagingShape {
    pub item_field: String,
    pub next_link_field: Option<String>,
    pub item_type: String,
}

/// The classification that drives return-type shaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    Plain,
    LongRunning,
    Paging,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Plain => "plain",
            OperationKind::LongRunning => "longRunning",
            OperationKind::Paging => "paging",
        }
    }
}

/// Generator-ready view of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDescriptor {
    pub name: String,
    pub method: HttpMethod,
    pub path: String,
    pub group: Option<String>,
    /// Comment-safe: `*/` is escaped and lines are separated by `\n`.
    pub description: Option<String>,
    /// Per-call parameters in declared order, options bag last.
    pub parameters: Vec<ParameterDescriptor>,
    /// Parameters bound at client construction; never part of a call signature.
    pub client_parameters: Vec<ParameterDescriptor>,
    pub response_type: String,
    pub expected_statuses: Vec<String>,
    pub options_type: String,
    pub lro: Option<LroShape>,
    pub paging: Option<PagingShape>,
    /// A per-call api-version query parameter replaces the client-level policy.
    pub removes_api_version_policy: bool,
}

impl OperationDescriptor {
    pub fn is_long_running(&self) -> bool {
        self.lro.is_some()
    }

    pub fn is_paging(&self) -> bool {
        self.paging.is_some()
    }

    /// Long-running wins when both shapes are present.
    pub fn kind(&self) -> OperationKind {
        if self.is_long_running() {
            OperationKind::LongRunning
        } else if self.is_paging() {
            OperationKind::Paging
        } else {
            OperationKind::Plain
        }
    }

    pub fn lro_final_result_path(&self) -> Option<&[String]> {
        self.lro.as_ref().map(|l| l.final_result_path.as_slice())
    }

    pub fn paging_item_field(&self) -> Option<&str> {
        self.paging.as_ref().map(|p| p.item_field.as_str())
    }

    pub fn paging_next_link_field(&self) -> Option<&str> {
        self.paging.as_ref().and_then(|p| p.next_link_field.as_deref())
    }

    /// Return type of the public operation function.
    pub fn return_type(&self) -> String {
        match self.kind() {
            OperationKind::LongRunning => {
                let result = self.final_result_type();
                format!("PollerLike<OperationState<{result}>, {result}>")
            }
            OperationKind::Paging => {
                let item = self
                    .paging
                    .as_ref()
                    .map(|p| p.item_type.as_str())
                    .unwrap_or(&self.response_type);
                format!("PagedAsyncIterableIterator<{item}>")
            }
            OperationKind::Plain => format!("Promise<{}>", self.response_type),
        }
    }

    /// Return type of the deserialize function.
    pub fn deserialize_return_type(&self) -> String {
        format!("Promise<{}>", self.final_result_type())
    }

    /// The type the deserializer yields: the LRO final type when long-running.
    pub fn final_result_type(&self) -> &str {
        self.lro
            .as_ref()
            .map(|l| l.final_result_type.as_str())
            .unwrap_or(&self.response_type)
    }

    /// Description split into comment lines; empty when there is none.
    pub fn doc_lines(&self) -> Vec<&str> {
        self.description
            .as_deref()
            .map(|text| text.lines().collect())
            .unwrap_or_default()
    }

    pub fn send_function_name(&self) -> String {
        format!("_{}Send", self.name)
    }

    pub fn deserialize_function_name(&self) -> String {
        format!("_{}Deserialize", self.name)
    }

    /// Names of the per-call parameters, options last.
    pub fn argument_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    /// Comma-separated call signature, e.g. `userId: string, options?: GetUserOptions`.
    pub fn signature(&self) -> String {
        self.parameters
            .iter()
            .map(ParameterDescriptor::signature)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Comma-separated declaration list, options bag with its initializer.
    pub fn declaration(&self) -> String {
        self.parameters
            .iter()
            .map(ParameterDescriptor::declaration)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn parameters_at(&self, location: ParameterLocation) -> impl Iterator<Item = &ParameterDescriptor> {
        self.parameters
            .iter()
            .filter(move |p| p.location() == Some(location))
    }

    pub fn body_parameter(&self) -> Option<&ParameterDescriptor> {
        self.parameters_at(ParameterLocation::Body).next()
    }

    pub fn options_parameter(&self) -> Option<&ParameterDescriptor> {
        self.parameters.iter().find(|p| p.is_options())
    }

    pub fn operation_ref(&self) -> RefKey {
        RefKey::operation(&self.name)
    }

    pub fn operation_function_ref(&self) -> RefKey {
        RefKey::operation_function(&self.name)
    }

    pub fn send_ref(&self) -> RefKey {
        RefKey::send_function(&self.name)
    }

    pub fn deserialize_ref(&self) -> RefKey {
        RefKey::deserialize_function(&self.name)
    }
}

/// Turn one model operation into a descriptor.
///
/// Fails on unknown parameter locations and on duplicate parameter names
/// (including a parameter that collides with the implicit `context` or
/// `options`).
pub fn build_operation_descriptor(
    path: &str,
    group: Option<&str>,
    operation: &ServiceOperation,
) -> Result<OperationDescriptor, DescriptorError> {
    if operation.name.trim().is_empty() {
        return Err(DescriptorError::EmptyOperationName {
            path: path.to_string(),
        });
    }

    let name = operation.name.to_lower_camel_case();
    let options_type = format!("{}Options", name.to_pascal_case());

    let mut seen = HashSet::new();
    let mut parameters = Vec::new();
    let mut client_parameters = Vec::new();

    for param in &operation.parameters {
        if !seen.insert(param.name.as_str()) || RESERVED_PARAMETERS.contains(&param.name.as_str())
        {
            return Err(DescriptorError::DuplicateParameter {
                operation: name.clone(),
                parameter: param.name.clone(),
            });
        }
        let descriptor = build_parameter(&name, param)?;
        if param.on_client {
            client_parameters.push(descriptor);
        } else {
            parameters.push(descriptor);
        }
    }

    let removes_api_version_policy = parameters
        .iter()
        .any(|p| matches!(p.slot, ParameterSlot::Query { is_api_version: true }));

    parameters.push(ParameterDescriptor {
        name: "options".to_string(),
        type_name: options_type.clone(),
        optional: true,
        slot: ParameterSlot::Options,
    });

    let response_type = operation.response.type_name.clone();

    let lro = operation.lro.as_ref().map(|meta| LroShape {
        final_result_type: meta
            .final_result_type
            .clone()
            .unwrap_or_else(|| response_type.clone()),
        final_result_path: meta
            .final_result_path
            .as_deref()
            .map(parse_access_path)
            .unwrap_or_default(),
    });

    let paging = operation.paging.as_ref().map(|meta| PagingShape {
        item_field: meta.item_field.clone(),
        next_link_field: meta.next_link_field.clone().filter(|f| !f.is_empty()),
        item_type: meta
            .item_type
            .clone()
            .unwrap_or_else(|| response_type.clone()),
    });

    let expected_statuses = if operation.response.expected_statuses.is_empty() {
        default_statuses(lro.is_some())
    } else {
        operation.response.expected_statuses.clone()
    };

    let descriptor = OperationDescriptor {
        name,
        method: operation.method,
        path: path.to_string(),
        group: group.map(String::from),
        description: operation.description.as_deref().and_then(sanitize_description),
        parameters,
        client_parameters,
        response_type,
        expected_statuses,
        options_type,
        lro,
        paging,
        removes_api_version_policy,
    };

    log::debug!(
        "classified {} {} as {}",
        descriptor.method,
        descriptor.path,
        descriptor.kind().as_str()
    );
    if descriptor.is_long_running() && descriptor.is_paging() {
        log::warn!(
            "operation `{}` is both long-running and paging; long-running shape takes precedence",
            descriptor.name
        );
    }

    Ok(descriptor)
}

fn build_parameter(
    operation: &str,
    param: &ParameterMetadata,
) -> Result<ParameterDescriptor, DescriptorError> {
    let location = ParameterLocation::parse(&param.location).ok_or_else(|| {
        DescriptorError::UnknownParameterLocation {
            operation: operation.to_string(),
            parameter: param.name.clone(),
            location: param.location.clone(),
        }
    })?;

    let slot = match location {
        ParameterLocation::Path => ParameterSlot::Path,
        ParameterLocation::Query => ParameterSlot::Query {
            is_api_version: param.is_api_version,
        },
        ParameterLocation::Header => ParameterSlot::Header {
            header_name: param
                .header_name
                .clone()
                .unwrap_or_else(|| param.name.clone()),
        },
        ParameterLocation::Body => ParameterSlot::Body,
    };

    Ok(ParameterDescriptor {
        name: param.name.clone(),
        type_name: param.type_name.clone(),
        // Path parameters are always required.
        optional: param.optional && location != ParameterLocation::Path,
        slot,
    })
}

fn default_statuses(long_running: bool) -> Vec<String> {
    let codes: &[&str] = if long_running {
        &["200", "201", "202"]
    } else {
        &["200"]
    };
    codes.iter().map(|c| c.to_string()).collect()
}

/// `.result.value` / `result.value` → `["result", "value"]`.
fn parse_access_path(path: &str) -> Vec<String> {
    path.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Normalize a description for use inside `//` and `/** */` comments.
///
/// Lines are trimmed and joined with `\n`, surrounding blank lines are
/// dropped and `*/` is escaped. Blank descriptions become `None`.
fn sanitize_description(text: &str) -> Option<String> {
    let lines: Vec<String> = text
        .lines()
        .map(|line| line.trim().replace("*/", "*\\/"))
        .collect();
    let first = lines.iter().position(|l| !l.is_empty())?;
    let last = lines.iter().rposition(|l| !l.is_empty())?;
    Some(lines[first..=last].join("\n"))
}
