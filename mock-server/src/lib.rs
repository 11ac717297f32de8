use std::collections::BTreeMap;

use axum::{
    extract::{FromRequest, Multipart, Path, Query, Request},
    http::StatusCode,
    routing::any,
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// One part of a multipart body as the server saw it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoPart {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
    pub text: Option<String>,
}

/// Everything the server observed about a request, sent back as the
/// response envelope. `status` is always 0, the protocol's success code.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Echo {
    pub status: i64,
    pub method: String,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub form: BTreeMap<String, String>,
    pub parts: Vec<EchoPart>,
}

pub fn app() -> Router {
    Router::new()
        .route("/status/{code}", any(respond_with_status))
        .route("/text", any(plain_text))
        .fallback(echo)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn respond_with_status(Path(code): Path<u16>) -> Result<(StatusCode, String), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, format!("forced status {code}")))
}

async fn plain_text() -> &'static str {
    "this is not json"
}

async fn echo(request: Request) -> Result<Json<Echo>, StatusCode> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let Query(query) = Query::<BTreeMap<String, String>>::try_from_uri(request.uri())
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    let headers: BTreeMap<String, String> = request
        .headers()
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
        .collect();
    let content_type = headers.get("content-type").cloned().unwrap_or_default();

    let mut form = BTreeMap::new();
    let mut parts = Vec::new();
    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?
        {
            let name = field.name().unwrap_or_default().to_string();
            let filename = field.file_name().map(str::to_string);
            let part_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
            parts.push(EchoPart {
                name,
                filename,
                content_type: part_type,
                size: data.len(),
                text: String::from_utf8(data.to_vec()).ok(),
            });
        }
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(fields) = Form::<BTreeMap<String, String>>::from_request(request, &())
            .await
            .map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;
        form = fields;
    }

    tracing::debug!(method = %method, path = %path, parts = parts.len(), "Echoing request");

    Ok(Json(Echo {
        status: 0,
        method,
        path,
        query,
        headers,
        form,
        parts,
    }))
}
