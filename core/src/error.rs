//! Error types for the api client.
//!
//! # Design
//! Factory failures are split in two: `UnsupportedRuntime` names a runtime we
//! recognize but have no adapter for yet, `UnknownEnvironment` means the probe
//! matched nothing. Callers can tell a known gap from a generic failure by
//! matching on the variant instead of the message.
//!
//! Transport failures are adapter-defined and carried as an opaque boxed
//! source so the caller sees the adapter's own error unchanged.

use crate::platform::Runtime;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by the factory and by every `ApiClient` request operation.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A recognized runtime was detected but no adapter is wired up for it.
    #[error("{runtime} runtime is not supported yet")]
    UnsupportedRuntime { runtime: Runtime },

    /// The environment probe did not recognize the executing runtime.
    #[error("Unknown environment")]
    UnknownEnvironment,

    /// The form cannot be expressed in the requested encoding, e.g. a file
    /// value in a query string.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// `scheme://host` does not form a valid base url.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The adapter failed to complete the network exchange.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body is not a JSON object.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),
}

impl ApiError {
    pub(crate) fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ApiError::Transport(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_errors_have_distinct_messages() {
        let unsupported = ApiError::UnsupportedRuntime {
            runtime: Runtime::Wasm,
        };
        assert_eq!(unsupported.to_string(), "wasm runtime is not supported yet");
        assert_eq!(ApiError::UnknownEnvironment.to_string(), "Unknown environment");
    }

    #[test]
    fn transport_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = ApiError::transport(io);
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "refused");
    }
}
