use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "post")]
    Post,
    #[serde(alias = "put")]
    Put,
    #[serde(alias = "delete")]
    Delete,
    #[serde(alias = "patch")]
    Patch,
    #[serde(alias = "options")]
    Options,
    #[serde(alias = "head")]
    Head,
    #[serde(alias = "trace")]
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Lowercase verb, as used for the `context.path(...).get(...)` call.
    pub fn as_lower(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for one URL path template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PathMetadata {
    /// Route name, e.g. `GetUser`.
    pub name: String,
    pub operation_group_name: Option<String>,
    pub path_parameters: Vec<PathParameter>,
    pub operations: Vec<ServiceOperation>,
}

/// A placeholder in a path template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathParameter {
    pub name: String,
    #[serde(rename = "type", default = "default_type_name")]
    pub type_name: String,
}

/// One operation on a path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOperation {
    pub name: String,
    pub method: HttpMethod,
    #[serde(default)]
    pub description: Option<String>,
    pub response: ResponseMetadata,
    #[serde(default)]
    pub parameters: Vec<ParameterMetadata>,
    #[serde(default)]
    pub lro: Option<LroMetadata>,
    #[serde(default)]
    pub paging: Option<PagingMetadata>,
}

/// Declared response of an operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, deserialize_with = "deserialize_statuses")]
    pub expected_statuses: Vec<String>,
}

/// A parameter as the upstream model describes it.
///
/// `location` stays a raw string: validating it is the descriptor builder's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterMetadata {
    pub name: String,
    #[serde(rename = "type", default = "default_type_name")]
    pub type_name: String,
    pub location: String,
    /// Bound at client construction rather than per call.
    #[serde(default)]
    pub on_client: bool,
    #[serde(default)]
    pub optional: bool,
    /// Wire name for header parameters; defaults to `name`.
    #[serde(default)]
    pub header_name: Option<String>,
    #[serde(default)]
    pub is_api_version: bool,
}

/// Long-running operation metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LroMetadata {
    pub final_result_type: Option<String>,
    /// Dotted access path into the final response body, e.g. `.result`.
    pub final_result_path: Option<String>,
}

/// Paging metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagingMetadata {
    #[serde(default = "default_item_field")]
    pub item_field: String,
    #[serde(default)]
    pub next_link_field: Option<String>,
    #[serde(default)]
    pub item_type: Option<String>,
}

impl Default for PagingMetadata {
    fn default() -> Self {
        Self {
            item_field: default_item_field(),
            next_link_field: Some("nextLink".to_string()),
            item_type: None,
        }
    }
}

fn default_type_name() -> String {
    "string".to_string()
}

fn default_item_field() -> String {
    "value".to_string()
}

/// Accept both `"200"` and `200` for status codes.
fn deserialize_statuses<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawStatus {
        Text(String),
        Code(u16),
    }

    let raw: Vec<RawStatus> = Vec::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|s| match s {
            RawStatus::Text(t) => t,
            RawStatus::Code(c) => c.to_string(),
        })
        .collect())
}
