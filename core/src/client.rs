//! The `ApiClient` contract and the stateless request builder behind it.
//!
//! # Design
//! `RequestBuilder` holds only the base url and an optional shared decorator
//! and carries no mutable state between calls. Each encoding gets a
//! `build_*` method producing an `HttpRequest`; `parse_response` consumes the
//! `HttpResponse`. Adapters run the actual round-trip in between.
//!
//! Header precedence is the same for all three encodings:
//! 1. the decorator fills its defaults into an empty map (once per request),
//! 2. explicit per-call headers are merged over them,
//! 3. the encoding's `content-type` is set last when a body is present.

use std::sync::Arc;

use async_trait::async_trait;

use crate::decorator::HeaderDecorator;
use crate::encode::{self, Multipart, URLENCODED_CONTENT_TYPE};
use crate::error::{ApiError, Result};
use crate::http::{HttpRequest, HttpResponse, RequestMethod};
use crate::types::{DefaultRes, RequestForm, RequestHeader};

/// A host-bound client issuing requests in three encodings.
///
/// Implementations are long-lived and reusable; nothing from one call
/// survives into the next. As a `HeaderDecorator`, a client fills in the
/// headers its own decorator would add.
#[async_trait]
pub trait ApiClient: HeaderDecorator {
    /// `scheme://host`, fixed for the client's lifetime.
    fn url(&self) -> &str;

    /// Sends `form` as a url-encoded body.
    async fn request(
        &self,
        method: RequestMethod,
        path: &str,
        form: Option<&RequestForm>,
        headers: Option<&RequestHeader>,
    ) -> Result<DefaultRes>;

    /// Sends `form` in the query string. File values fail with
    /// `ApiError::Encoding` without issuing a request.
    async fn request_params(
        &self,
        method: RequestMethod,
        path: &str,
        form: Option<&RequestForm>,
        headers: Option<&RequestHeader>,
    ) -> Result<DefaultRes>;

    /// Sends `form` as a multipart body; file values become binary parts.
    async fn request_multipart(
        &self,
        method: RequestMethod,
        path: &str,
        form: Option<&RequestForm>,
        headers: Option<&RequestHeader>,
    ) -> Result<DefaultRes>;
}

/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Clone)]
pub struct RequestBuilder {
    url: String,
    decorator: Option<Arc<dyn HeaderDecorator>>,
}

impl std::fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("url", &self.url)
            .field("decorator", &self.decorator.is_some())
            .finish()
    }
}

impl RequestBuilder {
    /// `url` is `scheme://host`; a trailing slash is dropped.
    pub fn new(url: &str, decorator: Option<Arc<dyn HeaderDecorator>>) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            decorator,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn decorator(&self) -> Option<&Arc<dyn HeaderDecorator>> {
        self.decorator.as_ref()
    }

    /// Decorator defaults only.
    pub fn fill_header(&self, header: &mut RequestHeader) {
        if let Some(decorator) = &self.decorator {
            decorator.fill_header(header);
        }
    }

    /// Decorator defaults with `explicit` merged over them.
    pub fn headers(&self, explicit: Option<&RequestHeader>) -> RequestHeader {
        let mut header = RequestHeader::new();
        self.fill_header(&mut header);
        if let Some(explicit) = explicit {
            header.merge(explicit);
        }
        header
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.url, path.trim_start_matches('/'))
    }

    pub fn build_request(
        &self,
        method: RequestMethod,
        path: &str,
        form: Option<&RequestForm>,
        headers: Option<&RequestHeader>,
    ) -> Result<HttpRequest> {
        let body = form.map(encode::encode_urlencoded).transpose()?;
        let mut header = self.headers(headers);
        if body.is_some() {
            header.insert("content-type", URLENCODED_CONTENT_TYPE);
        }
        Ok(HttpRequest {
            method,
            url: self.endpoint(path),
            headers: header.into_pairs(),
            body,
        })
    }

    pub fn build_params_request(
        &self,
        method: RequestMethod,
        path: &str,
        form: Option<&RequestForm>,
        headers: Option<&RequestHeader>,
    ) -> Result<HttpRequest> {
        let endpoint = self.endpoint(path);
        let url = match form {
            Some(form) => encode::append_query(&endpoint, form)?,
            None => endpoint,
        };
        Ok(HttpRequest {
            method,
            url,
            headers: self.headers(headers).into_pairs(),
            body: None,
        })
    }

    pub fn build_multipart_request(
        &self,
        method: RequestMethod,
        path: &str,
        form: Option<&RequestForm>,
        headers: Option<&RequestHeader>,
    ) -> Result<HttpRequest> {
        let multipart = Multipart::new();
        let empty = RequestForm::new();
        let body = multipart.encode(form.unwrap_or(&empty));
        let mut header = self.headers(headers);
        header.insert("content-type", multipart.content_type());
        Ok(HttpRequest {
            method,
            url: self.endpoint(path),
            headers: header.into_pairs(),
            body: Some(body),
        })
    }

    /// Non-2xx statuses become `HttpError`. A 2xx body must be a JSON
    /// object, or empty (HEAD, 204) which yields an empty envelope.
    pub fn parse_response(&self, response: HttpResponse) -> Result<DefaultRes> {
        check_status(&response)?;
        if response.body.is_empty() {
            return Ok(DefaultRes::default());
        }
        DefaultRes::from_slice(&response.body)
    }
}

fn check_status(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: String::from_utf8_lossy(&response.body).into_owned(),
    })
}
