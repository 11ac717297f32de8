//! reqwest-backed adapter for native tokio runtimes.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use tracing::debug;

use crate::decorator::HeaderDecorator;
use crate::error::{ApiError, Result};
use crate::http::{HttpRequest, HttpResponse, RequestMethod};
use crate::transport::{HttpApiClient, Transport};

/// `ApiClient` for native targets running on tokio.
pub type NativeApiClient = HttpApiClient<ReqwestTransport>;

impl NativeApiClient {
    /// Builds the reqwest client and binds it to `scheme://host`.
    pub fn connect(
        scheme: &str,
        host: &str,
        decorator: Option<Arc<dyn HeaderDecorator>>,
    ) -> Result<Self> {
        HttpApiClient::new(scheme, host, decorator, ReqwestTransport::new()?)
    }
}

/// Executes `HttpRequest`s with a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(ApiError::transport)?;
        Ok(Self { client })
    }

    /// Create with a custom reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn to_reqwest_method(method: RequestMethod) -> Result<Method> {
    Ok(match method {
        RequestMethod::Get => Method::GET,
        RequestMethod::Delete => Method::DELETE,
        RequestMethod::Head => Method::HEAD,
        RequestMethod::Options => Method::OPTIONS,
        RequestMethod::Post => Method::POST,
        RequestMethod::Put => Method::PUT,
        RequestMethod::Patch => Method::PATCH,
        RequestMethod::Link | RequestMethod::Unlink => {
            Method::from_bytes(method.as_str().as_bytes()).map_err(ApiError::transport)?
        }
    })
}

fn to_header_map(headers: &[(String, String)]) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(ApiError::transport)?;
        let value = HeaderValue::from_str(value).map_err(ApiError::transport)?;
        map.insert(name, value);
    }
    Ok(map)
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = to_reqwest_method(request.method)?;
        let headers = to_header_map(&request.headers)?;

        debug!(method = %request.method, url = request.url.as_str(), "Sending request");

        let mut builder = self.client.request(method, &request.url).headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        let response = builder.send().await.map_err(ApiError::transport)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|v| (k.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(ApiError::transport)?.to_vec();

        debug!(status, bytes = body.len(), "Received response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
