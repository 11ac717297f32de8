//! The adapter seam: executing built requests.
//!
//! An adapter only has to move an `HttpRequest` across the network and hand
//! back the `HttpResponse`. `HttpApiClient` does everything else (header
//! merging, encoding, response parsing) through `RequestBuilder`, so every
//! adapter gets the same contract behavior.

use std::sync::Arc;

use async_trait::async_trait;

use crate::client::{ApiClient, RequestBuilder};
use crate::config::ClientConfig;
use crate::decorator::HeaderDecorator;
use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse, RequestMethod};
use crate::types::{DefaultRes, RequestForm, RequestHeader};

/// Performs one network exchange. Failures are returned as
/// `ApiError::Transport`; status codes are left for the caller to judge.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        (**self).execute(request).await
    }
}

/// An `ApiClient` over any `Transport`.
#[derive(Debug)]
pub struct HttpApiClient<T> {
    builder: RequestBuilder,
    transport: T,
}

impl<T: Transport> HttpApiClient<T> {
    /// Constructor contract shared by every adapter: `(scheme, host, decorator?)`.
    pub fn new(
        scheme: &str,
        host: &str,
        decorator: Option<Arc<dyn HeaderDecorator>>,
        transport: T,
    ) -> Result<Self> {
        Self::from_config(&ClientConfig::new(scheme, host), decorator, transport)
    }

    pub fn from_config(
        config: &ClientConfig,
        decorator: Option<Arc<dyn HeaderDecorator>>,
        transport: T,
    ) -> Result<Self> {
        let url = config.base_url()?;
        Ok(Self {
            builder: RequestBuilder::new(&url, decorator),
            transport,
        })
    }

    pub fn builder(&self) -> &RequestBuilder {
        &self.builder
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn send(&self, request: HttpRequest) -> Result<DefaultRes> {
        let response = self.transport.execute(request).await?;
        self.builder.parse_response(response)
    }
}

impl<T: Transport> HeaderDecorator for HttpApiClient<T> {
    fn fill_header(&self, header: &mut RequestHeader) {
        self.builder.fill_header(header);
    }
}

#[async_trait]
impl<T: Transport> ApiClient for HttpApiClient<T> {
    fn url(&self) -> &str {
        self.builder.url()
    }

    async fn request(
        &self,
        method: RequestMethod,
        path: &str,
        form: Option<&RequestForm>,
        headers: Option<&RequestHeader>,
    ) -> Result<DefaultRes> {
        let request = self.builder.build_request(method, path, form, headers)?;
        self.send(request).await
    }

    async fn request_params(
        &self,
        method: RequestMethod,
        path: &str,
        form: Option<&RequestForm>,
        headers: Option<&RequestHeader>,
    ) -> Result<DefaultRes> {
        let request = self.builder.build_params_request(method, path, form, headers)?;
        self.send(request).await
    }

    async fn request_multipart(
        &self,
        method: RequestMethod,
        path: &str,
        form: Option<&RequestForm>,
        headers: Option<&RequestHeader>,
    ) -> Result<DefaultRes> {
        let request = self
            .builder
            .build_multipart_request(method, path, form, headers)?;
        self.send(request).await
    }
}
