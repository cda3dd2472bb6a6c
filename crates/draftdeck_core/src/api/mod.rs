//! DocService access layer.
//!
//! # Responsibility
//! - Define the raw HTTP seam (`DocTransport`) so sessions can run against
//!   a real server or a scripted stub.
//! - Attach the bearer credential, classify failures and decode payloads in
//!   one place (`ApiClient`).
//!
//! # Invariants
//! - No component talks to DocService except through `ApiClient`.
//! - Login is the only request sent as a multipart form and never carries a
//!   bearer header.

mod client;
mod endpoints;
mod http;
mod transport;

pub use client::{ApiClient, Payload, SharedToken};
pub use http::HttpTransport;
pub use transport::{ApiRequest, DocTransport, Method, RawResponse, RequestBody, TransportError};
