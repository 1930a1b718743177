use indexmap::IndexMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;

use crate::descriptors::{OperationDescriptor, OperationKind, ParameterDescriptor, ParameterSlot};
use crate::error::{RestError, RuntimeError};

use super::lro::LroPoller;
use super::paging::PagedItems;
use super::transport::{Request, Response, Transport};

/// Call arguments by parameter name. Client-bound values go in the same map.
pub type Arguments = IndexMap<String, Value>;

/// Unreserved characters stay as they are (RFC 3986).
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Build the request the send function would issue: path parameters
/// substituted, query and header parameters attached, body attached.
pub fn build_request(
    operation: &OperationDescriptor,
    args: &Arguments,
) -> Result<Request, RuntimeError> {
    let mut path = operation.path.clone();
    let mut query: Vec<(String, String)> = Vec::new();
    let mut headers = IndexMap::new();
    let mut body = None;

    let params = operation
        .client_parameters
        .iter()
        .chain(&operation.parameters)
        .filter(|p| !p.is_options());

    for param in params {
        let Some(value) = argument(param, args)? else {
            continue;
        };
        match &param.slot {
            ParameterSlot::Path => {
                let encoded = utf8_percent_encode(&scalar(value), COMPONENT).to_string();
                path = path.replace(&format!("{{{}}}", param.name), &encoded);
            }
            ParameterSlot::Query { .. } => query.push((param.name.clone(), scalar(value))),
            ParameterSlot::Header { header_name } => {
                headers.insert(header_name.clone(), scalar(value));
            }
            ParameterSlot::Body => body = Some(value.clone()),
            ParameterSlot::Options => {}
        }
    }

    let url = if query.is_empty() {
        path
    } else {
        let pairs: Vec<String> = query
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(k, COMPONENT),
                    utf8_percent_encode(v, COMPONENT)
                )
            })
            .collect();
        format!("{}?{}", path, pairs.join("&"))
    };

    Ok(Request {
        method: operation.method,
        url,
        headers,
        body,
    })
}

/// Check the status against the expected set and extract the result body.
///
/// For long-running operations the final-result path is applied.
pub fn deserialize(
    operation: &OperationDescriptor,
    response: &Response,
) -> Result<Value, RuntimeError> {
    let status = response.status.to_string();
    if !operation.expected_statuses.contains(&status) {
        return Err(RestError {
            status: response.status,
            expected: operation.expected_statuses.clone(),
            body: response.body.clone(),
        }
        .into());
    }

    match operation.lro_final_result_path() {
        Some(segments) if !segments.is_empty() => extract_path(&response.body, segments),
        _ => Ok(response.body.clone()),
    }
}

/// Follow `segments` into `body`.
pub fn extract_path(body: &Value, segments: &[String]) -> Result<Value, RuntimeError> {
    let mut current = body;
    for segment in segments {
        current = current
            .get(segment.as_str())
            .ok_or_else(|| RuntimeError::MissingResultPath(segments.join(".")))?;
    }
    Ok(current.clone())
}

/// Run an operation to completion the way its public function would.
///
/// Paging operations collect every item into an array; long-running ones
/// poll until a final response arrives.
pub fn call_operation<T: Transport>(
    operation: &OperationDescriptor,
    transport: &mut T,
    args: &Arguments,
) -> Result<Value, RuntimeError> {
    match operation.kind() {
        OperationKind::Plain => {
            let request = build_request(operation, args)?;
            let response = transport.send(&request)?;
            deserialize(operation, &response)
        }
        OperationKind::LongRunning => LroPoller::begin(operation, transport, args)?.poll_until_done(),
        OperationKind::Paging => {
            let items = PagedItems::new(operation, transport, args.clone())
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(items))
        }
    }
}

fn argument<'a>(
    param: &ParameterDescriptor,
    args: &'a Arguments,
) -> Result<Option<&'a Value>, RuntimeError> {
    match args.get(&param.name) {
        Some(Value::Null) | None if param.optional => Ok(None),
        Some(value) => Ok(Some(value)),
        None => Err(RuntimeError::MissingArgument(param.name.clone())),
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
