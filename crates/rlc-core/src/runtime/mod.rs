//! A small executor for operation descriptors.
//!
//! It mirrors what the emitted send, deserialize, paging and polling code does,
//! over `serde_json::Value`, so operation shapes can be exercised in Rust.

pub mod invoke;
pub mod lro;
pub mod paging;
pub mod transport;

pub use invoke::{Arguments, build_request, call_operation, deserialize, extract_path};
pub use lro::LroPoller;
pub use paging::PagedItems;
pub use transport::{MockTransport, Request, Response, Transport};
