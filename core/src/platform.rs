//! Runtime probe and adapter selection.
//!
//! # Design
//! `AdapterRegistry` maps a `Runtime` to a slot: either a boxed async
//! constructor or a marker for a runtime we know about but cannot serve yet.
//! Constructors are thunks and only run after the probe has matched, so an
//! environment that fails dispatch never builds another runtime's networking
//! stack. Adding a runtime means registering a slot; the dispatch in
//! `AdapterRegistry::create` does not change.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::decorator::HeaderDecorator;
use crate::error::{ApiError, Result};

/// Runtimes the probe can recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Runtime {
    /// Native target driven by a tokio runtime.
    Tokio,
    /// `wasm32` target (browser or other JS host).
    Wasm,
}

impl Runtime {
    /// The runtime executing the caller, or `None` when unrecognized.
    pub fn detect() -> Option<Runtime> {
        if cfg!(target_arch = "wasm32") {
            return Some(Runtime::Wasm);
        }
        if tokio::runtime::Handle::try_current().is_ok() {
            return Some(Runtime::Tokio);
        }
        None
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Runtime::Tokio => "tokio",
            Runtime::Wasm => "wasm",
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deferred adapter constructor.
pub type AdapterConstructor = Arc<
    dyn Fn(ClientConfig, Option<Arc<dyn HeaderDecorator>>) -> BoxFuture<'static, Result<Box<dyn ApiClient>>>
        + Send
        + Sync,
>;

/// What the registry holds for a runtime.
#[derive(Clone)]
pub enum AdapterSlot {
    Available(AdapterConstructor),
    Unimplemented,
}

/// Outcome of looking a runtime up.
pub enum Dispatch {
    Found(AdapterConstructor),
    Unimplemented(Runtime),
    Unknown,
}

impl fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatch::Found(_) => f.write_str("Found"),
            Dispatch::Unimplemented(runtime) => write!(f, "Unimplemented({runtime})"),
            Dispatch::Unknown => f.write_str("Unknown"),
        }
    }
}

/// Runtime to adapter table.
#[derive(Clone)]
pub struct AdapterRegistry {
    slots: HashMap<Runtime, AdapterSlot>,
}

impl AdapterRegistry {
    /// A registry with no runtimes at all.
    pub fn empty() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// Registers `constructor` for `runtime`, replacing any previous slot.
    pub fn register<F, Fut>(&mut self, runtime: Runtime, constructor: F) -> &mut Self
    where
        F: Fn(ClientConfig, Option<Arc<dyn HeaderDecorator>>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<Box<dyn ApiClient>>> + Send + 'static,
    {
        let thunk: AdapterConstructor = Arc::new(
            move |config: ClientConfig, decorator: Option<Arc<dyn HeaderDecorator>>| {
                let future: BoxFuture<'static, Result<Box<dyn ApiClient>>> =
                    Box::pin(constructor(config, decorator));
                future
            },
        );
        self.slots.insert(runtime, AdapterSlot::Available(thunk));
        self
    }

    /// Records `runtime` as known but without an adapter.
    pub fn mark_unimplemented(&mut self, runtime: Runtime) -> &mut Self {
        self.slots.insert(runtime, AdapterSlot::Unimplemented);
        self
    }

    pub fn dispatch(&self, runtime: Option<Runtime>) -> Dispatch {
        let Some(runtime) = runtime else {
            return Dispatch::Unknown;
        };
        match self.slots.get(&runtime) {
            Some(AdapterSlot::Available(constructor)) => Dispatch::Found(constructor.clone()),
            Some(AdapterSlot::Unimplemented) => Dispatch::Unimplemented(runtime),
            None => Dispatch::Unknown,
        }
    }

    /// Dispatches on `runtime` and constructs the adapter on a match.
    pub async fn create(
        &self,
        runtime: Option<Runtime>,
        scheme: &str,
        host: &str,
        decorator: Option<Arc<dyn HeaderDecorator>>,
    ) -> Result<Box<dyn ApiClient>> {
        let config = ClientConfig::new(scheme, host);
        match self.dispatch(runtime) {
            Dispatch::Found(constructor) => {
                debug!(runtime = ?runtime, scheme, host, "Constructing api client");
                constructor(config, decorator).await
            }
            Dispatch::Unimplemented(runtime) => {
                warn!(%runtime, "Runtime recognized but no adapter is available");
                Err(ApiError::UnsupportedRuntime { runtime })
            }
            Dispatch::Unknown => {
                warn!("Could not recognize the executing environment");
                Err(ApiError::UnknownEnvironment)
            }
        }
    }
}

impl Default for AdapterRegistry {
    /// Tokio is served by the native adapter when the `native` feature is on;
    /// wasm is known but not wired up.
    fn default() -> Self {
        let mut registry = Self::empty();
        #[cfg(feature = "native")]
        registry.register(Runtime::Tokio, connect_native);
        #[cfg(not(feature = "native"))]
        registry.mark_unimplemented(Runtime::Tokio);
        registry.mark_unimplemented(Runtime::Wasm);
        registry
    }
}

#[cfg(feature = "native")]
async fn connect_native(
    config: ClientConfig,
    decorator: Option<Arc<dyn HeaderDecorator>>,
) -> Result<Box<dyn ApiClient>> {
    let client = crate::native::NativeApiClient::connect(&config.scheme, &config.host, decorator)?;
    Ok(Box::new(client))
}

/// Creates the `ApiClient` for the executing runtime.
///
/// Fails with `UnsupportedRuntime` for a recognized runtime without an adapter
/// and with `UnknownEnvironment` when the probe matches nothing.
pub async fn create_api_client(
    scheme: &str,
    host: &str,
    decorator: Option<Arc<dyn HeaderDecorator>>,
) -> Result<Box<dyn ApiClient>> {
    let runtime = Runtime::detect();
    debug!(runtime = ?runtime, "Probed runtime");
    AdapterRegistry::default()
        .create(runtime, scheme, host, decorator)
        .await
}
