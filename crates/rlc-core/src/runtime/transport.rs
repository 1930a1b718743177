use std::collections::VecDeque;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::RuntimeError;
use crate::model::HttpMethod;

/// An outgoing request as the generated send function would issue it.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: HttpMethod,
    /// Expanded path plus query string.
    pub url: String,
    pub headers: IndexMap<String, String>,
    pub body: Option<Value>,
}

impl Request {
    /// A bare GET, used to follow next links and polling locations.
    pub fn get(url: impl Into<String>) -> Request {
        Request {
            method: HttpMethod::Get,
            url: url.into(),
            headers: IndexMap::new(),
            body: None,
        }
    }
}

/// A response with lowercase header names.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: IndexMap<String, String>,
    pub body: Value,
}

impl Response {
    pub fn new(status: u16, body: Value) -> Response {
        Response {
            status,
            headers: IndexMap::new(),
            body,
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Response {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Something that can carry a request and hand back a response.
pub trait Transport {
    fn send(&mut self, request: &Request) -> Result<Response, RuntimeError>;
}

/// Replays scripted responses in order and records every request it sees.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: VecDeque<Response>,
    requests: Vec<Request>,
}

impl MockTransport {
    pub fn new<I: IntoIterator<Item = Response>>(responses: I) -> MockTransport {
        MockTransport {
            responses: responses.into_iter().collect(),
            requests: Vec::new(),
        }
    }

    pub fn push(&mut self, response: Response) {
        self.responses.push_back(response);
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn remaining(&self) -> usize {
        self.responses.len()
    }
}

impl Transport for MockTransport {
    fn send(&mut self, request: &Request) -> Result<Response, RuntimeError> {
        log::trace!("mock transport: {} {}", request.method, request.url);
        self.requests.push(request.clone());
        self.responses
            .pop_front()
            .ok_or_else(|| RuntimeError::TransportExhausted {
                method: request.method,
                url: request.url.clone(),
            })
    }
}
