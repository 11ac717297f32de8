//! Wire encodings for `RequestForm`.
//!
//! # Design
//! Three encodings, one per `ApiClient` operation:
//! - url-encoded body (`request`),
//! - query string (`request_params`),
//! - multipart body (`request_multipart`).
//!
//! The first two are text-only. A file value in either is an
//! `ApiError::Encoding` raised before any request is built, so nothing reaches
//! the network.

use url::form_urlencoded;

use crate::error::{ApiError, Result};
use crate::types::{FormValue, RequestForm};

pub const URLENCODED_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Text pairs of `form`, or an encoding error naming the first file field.
fn text_pairs<'a>(form: &'a RequestForm, target: &str) -> Result<Vec<(&'a str, String)>> {
    form.iter()
        .map(|(name, value)| {
            value.to_text().map(|text| (name, text)).ok_or_else(|| {
                ApiError::Encoding(format!(
                    "field `{name}` carries file data which cannot be encoded into a {target}"
                ))
            })
        })
        .collect()
}

/// Encodes `form` as an `application/x-www-form-urlencoded` body.
pub fn encode_urlencoded(form: &RequestForm) -> Result<Vec<u8>> {
    let pairs = text_pairs(form, "url-encoded body")?;
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in &pairs {
        serializer.append_pair(name, value);
    }
    Ok(serializer.finish().into_bytes())
}

/// Appends `form` to `url` as query parameters.
pub fn append_query(url: &str, form: &RequestForm) -> Result<String> {
    let pairs = text_pairs(form, "query string")?;
    if pairs.is_empty() {
        return Ok(url.to_string());
    }
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in &pairs {
        serializer.append_pair(name, value);
    }
    let query = serializer.finish();

    let separator = match url.find('?') {
        None => "?",
        Some(i) if i + 1 == url.len() || url.ends_with('&') => "",
        Some(_) => "&",
    };
    Ok(format!("{url}{separator}{query}"))
}

/// A multipart/form-data body writer with a fixed boundary.
#[derive(Debug, Clone)]
pub struct Multipart {
    boundary: String,
}

impl Default for Multipart {
    fn default() -> Self {
        Self::new()
    }
}

impl Multipart {
    /// A writer with a random boundary.
    pub fn new() -> Self {
        Self {
            boundary: format!("----ApiClientBoundary{}", uuid::Uuid::new_v4().simple()),
        }
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Encodes every field as one part, in form order.
    pub fn encode(&self, form: &RequestForm) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in form.iter() {
            body.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
            match value {
                FormValue::File(file) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                            escape_quoted(name),
                            escape_quoted(file.filename())
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(
                        format!("Content-Type: {}\r\n\r\n", file.content_type_or_default())
                            .as_bytes(),
                    );
                    body.extend_from_slice(&file.value);
                }
                FormValue::Plain(_) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                            escape_quoted(name)
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(value.to_text().unwrap_or_default().as_bytes());
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        body
    }
}

// Quoted-string escaping for names and filenames, as browsers do it.
fn escape_quoted(s: &str) -> String {
    s.replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
