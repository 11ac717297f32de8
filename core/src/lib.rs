//! Platform-abstracted HTTP request client.
//!
//! # Overview
//! `ApiClient` is the capability a protocol layer talks to: a client bound
//! to `scheme://host` that issues requests with the form sent as a
//! url-encoded body, as query parameters, or as a multipart body.
//! `create_api_client` probes the executing runtime and builds the matching
//! adapter.
//!
//! # Design
//! - `RequestBuilder` is stateless and does no I/O: it turns a form and
//!   headers into an `HttpRequest` and an `HttpResponse` into a `DefaultRes`.
//! - A `Transport` adapter performs the exchange; `HttpApiClient` glues the
//!   two together, so every adapter shares the same encoding and header rules.
//! - A `HeaderDecorator` fills common headers once per request. Explicit
//!   per-call headers override decorator defaults.
//! - `AdapterRegistry` maps runtimes to lazily invoked constructors.

pub mod client;
pub mod config;
pub mod decorator;
pub mod encode;
pub mod error;
pub mod http;
#[cfg(feature = "native")]
pub mod native;
pub mod platform;
pub mod transport;
pub mod types;

pub use client::{ApiClient, RequestBuilder};
pub use config::ClientConfig;
pub use decorator::HeaderDecorator;
pub use encode::Multipart;
pub use error::{ApiError, Result};
pub use http::{HttpRequest, HttpResponse, RequestMethod};
#[cfg(feature = "native")]
pub use native::{NativeApiClient, ReqwestTransport};
pub use platform::{create_api_client, AdapterRegistry, Dispatch, Runtime};
pub use transport::{HttpApiClient, Transport};
pub use types::{DefaultRes, FileOptions, FileRequestData, FormValue, RequestForm, RequestHeader};
