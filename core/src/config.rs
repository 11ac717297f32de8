//! Client construction parameters.

use serde::Deserialize;

use crate::error::{ApiError, Result};

/// Scheme and host every adapter is constructed with.
///
/// Deserializable so hosts can keep endpoints in their own config files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub scheme: String,
    pub host: String,
}

impl ClientConfig {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
        }
    }

    /// `scheme://host`, validated.
    pub fn base_url(&self) -> Result<String> {
        if self.scheme.is_empty() || self.host.is_empty() {
            return Err(ApiError::InvalidUrl(format!(
                "scheme and host are required (got {:?}://{:?})",
                self.scheme, self.host
            )));
        }
        let base = format!("{}://{}", self.scheme, self.host.trim_end_matches('/'));
        url::Url::parse(&base).map_err(|e| ApiError::InvalidUrl(format!("{base}: {e}")))?;
        Ok(base)
    }
}
