//! Lazily constructed, cached default clients.
//!
//! A [`ClientManager`] owns one [`ClientConfig`] snapshot and a cache of the
//! clients built from it, keyed by parsed service name, so `generative_async`
//! and `Generative-Async` share one entry. `configure`
//! replaces the snapshot and empties the cache; lookups construct on first
//! use. Clients handed out earlier stay usable after a reconfigure, they are
//! just no longer returned by new lookups.
//!
//! The process-wide instance behind [`ClientManager::global`] and the free
//! functions at the bottom of this module exist for application code.
//! Libraries and tests should build their own manager.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, trace};

use crate::blocking::BlockingClient;
use crate::client::{
    ClientError, DiscussService, GenerativeService, ModelService, OperationsService,
    RetrieverService, TextService,
};
use crate::config::{env_api_key, ApiKeySource, ClientConfig, ConfigureOptions};
use crate::metadata::{Metadata, WithDefaultMetadata};
use crate::providers::RestClientFactory;

const OPERATIONS: &str = "operations";
const MODEL: &str = "model";

const OPERATIONS_SERVICE: ServiceName = ServiceName {
    kind: ServiceKind::Operations,
    variant: Variant::Blocking,
};

/// Builds the async service clients from a configuration snapshot.
///
/// Errors are returned to the caller of the lookup unchanged.
pub trait ClientFactory: Send + Sync {
    fn generative(&self, config: &ClientConfig) -> Result<Arc<dyn GenerativeService>, ClientError>;

    fn text(&self, config: &ClientConfig) -> Result<Arc<dyn TextService>, ClientError>;

    fn discuss(&self, config: &ClientConfig) -> Result<Arc<dyn DiscussService>, ClientError>;

    fn model(&self, config: &ClientConfig) -> Result<Arc<dyn ModelService>, ClientError>;

    fn retriever(&self, config: &ClientConfig) -> Result<Arc<dyn RetrieverService>, ClientError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Generative,
    Text,
    Discuss,
    Model,
    Retriever,
    Operations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Blocking,
    Async,
}

/// Parsed service identifier, e.g. `retriever` or `generative_async`.
///
/// Parsing is case-insensitive and accepts `_async` or `-async`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceName {
    pub kind: ServiceKind,
    pub variant: Variant,
}

impl FromStr for ServiceName {
    type Err = ClientError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let lowered = name.to_ascii_lowercase();
        let (base, variant) = match lowered
            .strip_suffix("_async")
            .or_else(|| lowered.strip_suffix("-async"))
        {
            Some(base) => (base, Variant::Async),
            None => (lowered.as_str(), Variant::Blocking),
        };
        let kind = match (base, variant) {
            ("generative", _) => ServiceKind::Generative,
            ("text", _) => ServiceKind::Text,
            ("discuss", _) => ServiceKind::Discuss,
            ("model", _) => ServiceKind::Model,
            ("retriever", _) => ServiceKind::Retriever,
            ("operations", Variant::Blocking) => ServiceKind::Operations,
            _ => return Err(ClientError::UnknownService(name.to_string())),
        };
        Ok(ServiceName { kind, variant })
    }
}

/// A cached default client.
#[derive(Clone)]
pub enum ServiceClient {
    Generative(Arc<BlockingClient<dyn GenerativeService>>),
    GenerativeAsync(Arc<dyn GenerativeService>),
    Text(Arc<BlockingClient<dyn TextService>>),
    TextAsync(Arc<dyn TextService>),
    Discuss(Arc<BlockingClient<dyn DiscussService>>),
    DiscussAsync(Arc<dyn DiscussService>),
    Model(Arc<BlockingClient<dyn ModelService>>),
    ModelAsync(Arc<dyn ModelService>),
    Retriever(Arc<BlockingClient<dyn RetrieverService>>),
    RetrieverAsync(Arc<dyn RetrieverService>),
    Operations(Arc<BlockingClient<dyn OperationsService>>),
}

impl ServiceClient {
    pub fn name(&self) -> &'static str {
        match self {
            ServiceClient::Generative(_) => "generative",
            ServiceClient::GenerativeAsync(_) => "generative_async",
            ServiceClient::Text(_) => "text",
            ServiceClient::TextAsync(_) => "text_async",
            ServiceClient::Discuss(_) => "discuss",
            ServiceClient::DiscussAsync(_) => "discuss_async",
            ServiceClient::Model(_) => "model",
            ServiceClient::ModelAsync(_) => "model_async",
            ServiceClient::Retriever(_) => "retriever",
            ServiceClient::RetrieverAsync(_) => "retriever_async",
            ServiceClient::Operations(_) => "operations",
        }
    }

    /// True when both values refer to the same client instance.
    pub fn ptr_eq(&self, other: &ServiceClient) -> bool {
        match (self, other) {
            (ServiceClient::Generative(a), ServiceClient::Generative(b)) => Arc::ptr_eq(a, b),
            (ServiceClient::GenerativeAsync(a), ServiceClient::GenerativeAsync(b)) => {
                Arc::ptr_eq(a, b)
            }
            (ServiceClient::Text(a), ServiceClient::Text(b)) => Arc::ptr_eq(a, b),
            (ServiceClient::TextAsync(a), ServiceClient::TextAsync(b)) => Arc::ptr_eq(a, b),
            (ServiceClient::Discuss(a), ServiceClient::Discuss(b)) => Arc::ptr_eq(a, b),
            (ServiceClient::DiscussAsync(a), ServiceClient::DiscussAsync(b)) => {
                Arc::ptr_eq(a, b)
            }
            (ServiceClient::Model(a), ServiceClient::Model(b)) => Arc::ptr_eq(a, b),
            (ServiceClient::ModelAsync(a), ServiceClient::ModelAsync(b)) => Arc::ptr_eq(a, b),
            (ServiceClient::Retriever(a), ServiceClient::Retriever(b)) => Arc::ptr_eq(a, b),
            (ServiceClient::RetrieverAsync(a), ServiceClient::RetrieverAsync(b)) => {
                Arc::ptr_eq(a, b)
            }
            (ServiceClient::Operations(a), ServiceClient::Operations(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn into_generative(self) -> Option<Arc<BlockingClient<dyn GenerativeService>>> {
        match self {
            ServiceClient::Generative(client) => Some(client),
            _ => None,
        }
    }

    pub fn into_generative_async(self) -> Option<Arc<dyn GenerativeService>> {
        match self {
            ServiceClient::GenerativeAsync(client) => Some(client),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<Arc<BlockingClient<dyn TextService>>> {
        match self {
            ServiceClient::Text(client) => Some(client),
            _ => None,
        }
    }

    pub fn into_text_async(self) -> Option<Arc<dyn TextService>> {
        match self {
            ServiceClient::TextAsync(client) => Some(client),
            _ => None,
        }
    }

    pub fn into_discuss(self) -> Option<Arc<BlockingClient<dyn DiscussService>>> {
        match self {
            ServiceClient::Discuss(client) => Some(client),
            _ => None,
        }
    }

    pub fn into_discuss_async(self) -> Option<Arc<dyn DiscussService>> {
        match self {
            ServiceClient::DiscussAsync(client) => Some(client),
            _ => None,
        }
    }

    pub fn into_model(self) -> Option<Arc<BlockingClient<dyn ModelService>>> {
        match self {
            ServiceClient::Model(client) => Some(client),
            _ => None,
        }
    }

    pub fn into_model_async(self) -> Option<Arc<dyn ModelService>> {
        match self {
            ServiceClient::ModelAsync(client) => Some(client),
            _ => None,
        }
    }

    pub fn into_retriever(self) -> Option<Arc<BlockingClient<dyn RetrieverService>>> {
        match self {
            ServiceClient::Retriever(client) => Some(client),
            _ => None,
        }
    }

    pub fn into_retriever_async(self) -> Option<Arc<dyn RetrieverService>> {
        match self {
            ServiceClient::RetrieverAsync(client) => Some(client),
            _ => None,
        }
    }

    pub fn into_operations(self) -> Option<Arc<BlockingClient<dyn OperationsService>>> {
        match self {
            ServiceClient::Operations(client) => Some(client),
            _ => None,
        }
    }
}

impl fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ServiceClient").field(&self.name()).finish()
    }
}

#[derive(Default)]
struct State {
    config: Option<Arc<ClientConfig>>,
    clients: HashMap<ServiceName, ServiceClient>,
}

/// Owns the configuration snapshot and the default-client cache.
///
/// Configure and lookup both take the same lock, so a lookup never sees a
/// half-cleared cache and each name is constructed at most once per
/// configuration.
pub struct ClientManager {
    factory: Arc<dyn ClientFactory>,
    api_key_source: ApiKeySource,
    state: Mutex<State>,
}

static GLOBAL: Lazy<ClientManager> = Lazy::new(ClientManager::new);

impl Default for ClientManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientManager {
    /// A manager building REST clients, reading the fallback API key from
    /// the environment.
    pub fn new() -> Self {
        Self::with_factory(Arc::new(RestClientFactory))
    }

    pub fn with_factory(factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            factory,
            api_key_source: Arc::new(env_api_key),
            state: Mutex::new(State::default()),
        }
    }

    /// Replace where the fallback API key is read from.
    pub fn with_api_key_source<F>(mut self, source: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        self.api_key_source = Arc::new(source);
        self
    }

    /// The process-wide manager used by the free functions of this module.
    pub fn global() -> &'static ClientManager {
        &GLOBAL
    }

    /// Replace the configuration snapshot and evict every cached client.
    ///
    /// On error (for example [`ClientError::ConfigurationConflict`]) the
    /// previous snapshot and cache are left untouched.
    pub fn configure(&self, options: ConfigureOptions) -> Result<(), ClientError> {
        let config = options.resolve(&self.api_key_source)?;
        let evicted = {
            let mut state = self.state.lock();
            state.config = Some(Arc::new(config));
            std::mem::take(&mut state.clients)
        };
        info!(evicted = evicted.len(), "Client configuration replaced");
        Ok(())
    }

    /// The current snapshot, if `configure` has run.
    pub fn config(&self) -> Option<Arc<ClientConfig>> {
        self.state.lock().config.clone()
    }

    /// Return the cached client for `name`, constructing it on first use.
    ///
    /// `name` is case-insensitive; an `_async` (or `-async`) suffix selects
    /// the async variant. `operations` is served by
    /// [`get_default_operations_client`](Self::get_default_operations_client).
    pub fn get_default_client(&self, name: &str) -> Result<ServiceClient, ClientError> {
        let mut state = self.state.lock();
        self.lookup(&mut state, name)
    }

    /// The operations client embedded in the default `model` client.
    ///
    /// Builds and caches the `model` client as a side effect when needed.
    pub fn get_default_operations_client(
        &self,
    ) -> Result<Arc<BlockingClient<dyn OperationsService>>, ClientError> {
        let mut state = self.state.lock();
        self.operations(&mut state)
    }

    pub fn generative_client(
        &self,
    ) -> Result<Arc<BlockingClient<dyn GenerativeService>>, ClientError> {
        self.typed("generative", ServiceClient::into_generative)
    }

    pub fn generative_async_client(&self) -> Result<Arc<dyn GenerativeService>, ClientError> {
        self.typed("generative_async", ServiceClient::into_generative_async)
    }

    pub fn text_client(&self) -> Result<Arc<BlockingClient<dyn TextService>>, ClientError> {
        self.typed("text", ServiceClient::into_text)
    }

    pub fn text_async_client(&self) -> Result<Arc<dyn TextService>, ClientError> {
        self.typed("text_async", ServiceClient::into_text_async)
    }

    pub fn discuss_client(&self) -> Result<Arc<BlockingClient<dyn DiscussService>>, ClientError> {
        self.typed("discuss", ServiceClient::into_discuss)
    }

    pub fn discuss_async_client(&self) -> Result<Arc<dyn DiscussService>, ClientError> {
        self.typed("discuss_async", ServiceClient::into_discuss_async)
    }

    pub fn model_client(&self) -> Result<Arc<BlockingClient<dyn ModelService>>, ClientError> {
        self.typed(MODEL, ServiceClient::into_model)
    }

    pub fn model_async_client(&self) -> Result<Arc<dyn ModelService>, ClientError> {
        self.typed("model_async", ServiceClient::into_model_async)
    }

    pub fn retriever_client(
        &self,
    ) -> Result<Arc<BlockingClient<dyn RetrieverService>>, ClientError> {
        self.typed("retriever", ServiceClient::into_retriever)
    }

    pub fn retriever_async_client(&self) -> Result<Arc<dyn RetrieverService>, ClientError> {
        self.typed("retriever_async", ServiceClient::into_retriever_async)
    }

    fn typed<T>(
        &self,
        name: &str,
        extract: fn(ServiceClient) -> Option<T>,
    ) -> Result<T, ClientError> {
        extract(self.get_default_client(name)?)
            .ok_or_else(|| ClientError::UnknownService(name.to_string()))
    }

    fn lookup(&self, state: &mut State, name: &str) -> Result<ServiceClient, ClientError> {
        let service: ServiceName = name.parse()?;
        if service.kind == ServiceKind::Operations {
            return self.operations(state).map(ServiceClient::Operations);
        }

        if let Some(client) = state.clients.get(&service) {
            trace!(service = client.name(), "Default client cache hit");
            return Ok(client.clone());
        }

        let config = self.ensure_configured(state)?;
        let client = self.make_client(service, &config)?;
        debug!(
            service = client.name(),
            wrapped = !config.default_metadata.is_empty(),
            "Constructed default client"
        );
        state.clients.insert(service, client.clone());
        Ok(client)
    }

    fn operations(
        &self,
        state: &mut State,
    ) -> Result<Arc<BlockingClient<dyn OperationsService>>, ClientError> {
        if let Some(ServiceClient::Operations(client)) = state.clients.get(&OPERATIONS_SERVICE) {
            return Ok(client.clone());
        }

        let model = self
            .lookup(state, MODEL)?
            .into_model()
            .ok_or_else(|| ClientError::UnknownService(MODEL.to_string()))?;
        let client = Arc::new(model.operations_client());
        state
            .clients
            .insert(OPERATIONS_SERVICE, ServiceClient::Operations(client.clone()));
        debug!("Extracted operations client from the model client");
        Ok(client)
    }

    /// Run a default `configure` the first time a client is needed.
    fn ensure_configured(&self, state: &mut State) -> Result<Arc<ClientConfig>, ClientError> {
        if let Some(config) = &state.config {
            return Ok(config.clone());
        }
        let config = Arc::new(ConfigureOptions::default().resolve(&self.api_key_source)?);
        info!("No configuration supplied, using defaults");
        state.config = Some(config.clone());
        Ok(config)
    }

    fn make_client(
        &self,
        service: ServiceName,
        config: &ClientConfig,
    ) -> Result<ServiceClient, ClientError> {
        let defaults = &config.default_metadata;
        let client = match service.kind {
            ServiceKind::Generative => {
                let client = decorate_generative(self.factory.generative(config)?, defaults);
                match service.variant {
                    Variant::Async => ServiceClient::GenerativeAsync(client),
                    Variant::Blocking => {
                        ServiceClient::Generative(Arc::new(BlockingClient::new(client)?))
                    }
                }
            }
            ServiceKind::Text => {
                let client = decorate_text(self.factory.text(config)?, defaults);
                match service.variant {
                    Variant::Async => ServiceClient::TextAsync(client),
                    Variant::Blocking => {
                        ServiceClient::Text(Arc::new(BlockingClient::new(client)?))
                    }
                }
            }
            ServiceKind::Discuss => {
                let client = decorate_discuss(self.factory.discuss(config)?, defaults);
                match service.variant {
                    Variant::Async => ServiceClient::DiscussAsync(client),
                    Variant::Blocking => {
                        ServiceClient::Discuss(Arc::new(BlockingClient::new(client)?))
                    }
                }
            }
            ServiceKind::Model => {
                let client = decorate_model(self.factory.model(config)?, defaults);
                match service.variant {
                    Variant::Async => ServiceClient::ModelAsync(client),
                    Variant::Blocking => {
                        ServiceClient::Model(Arc::new(BlockingClient::new(client)?))
                    }
                }
            }
            ServiceKind::Retriever => {
                let client = decorate_retriever(self.factory.retriever(config)?, defaults);
                match service.variant {
                    Variant::Async => ServiceClient::RetrieverAsync(client),
                    Variant::Blocking => {
                        ServiceClient::Retriever(Arc::new(BlockingClient::new(client)?))
                    }
                }
            }
            ServiceKind::Operations => {
                return Err(ClientError::UnknownService(OPERATIONS.to_string()))
            }
        };
        Ok(client)
    }
}

// Clients are only decorated when there is something to add, so the common
// case hands out the factory's instance untouched.

fn decorate_generative(
    client: Arc<dyn GenerativeService>,
    defaults: &Metadata,
) -> Arc<dyn GenerativeService> {
    if defaults.is_empty() {
        client
    } else {
        Arc::new(WithDefaultMetadata::new(client, defaults.clone()))
    }
}

fn decorate_text(client: Arc<dyn TextService>, defaults: &Metadata) -> Arc<dyn TextService> {
    if defaults.is_empty() {
        client
    } else {
        Arc::new(WithDefaultMetadata::new(client, defaults.clone()))
    }
}

fn decorate_discuss(
    client: Arc<dyn DiscussService>,
    defaults: &Metadata,
) -> Arc<dyn DiscussService> {
    if defaults.is_empty() {
        client
    } else {
        Arc::new(WithDefaultMetadata::new(client, defaults.clone()))
    }
}

fn decorate_model(client: Arc<dyn ModelService>, defaults: &Metadata) -> Arc<dyn ModelService> {
    if defaults.is_empty() {
        client
    } else {
        Arc::new(WithDefaultMetadata::new(client, defaults.clone()))
    }
}

fn decorate_retriever(
    client: Arc<dyn RetrieverService>,
    defaults: &Metadata,
) -> Arc<dyn RetrieverService> {
    if defaults.is_empty() {
        client
    } else {
        Arc::new(WithDefaultMetadata::new(client, defaults.clone()))
    }
}

/// Configure the process-wide manager.
pub fn configure(options: ConfigureOptions) -> Result<(), ClientError> {
    ClientManager::global().configure(options)
}

pub fn get_default_client(name: &str) -> Result<ServiceClient, ClientError> {
    ClientManager::global().get_default_client(name)
}

pub fn get_default_operations_client(
) -> Result<Arc<BlockingClient<dyn OperationsService>>, ClientError> {
    ClientManager::global().get_default_operations_client()
}

pub fn get_default_generative_client(
) -> Result<Arc<BlockingClient<dyn GenerativeService>>, ClientError> {
    ClientManager::global().generative_client()
}

pub fn get_default_generative_async_client() -> Result<Arc<dyn GenerativeService>, ClientError> {
    ClientManager::global().generative_async_client()
}

pub fn get_default_text_client() -> Result<Arc<BlockingClient<dyn TextService>>, ClientError> {
    ClientManager::global().text_client()
}

pub fn get_default_text_async_client() -> Result<Arc<dyn TextService>, ClientError> {
    ClientManager::global().text_async_client()
}

pub fn get_default_discuss_client(
) -> Result<Arc<BlockingClient<dyn DiscussService>>, ClientError> {
    ClientManager::global().discuss_client()
}

pub fn get_default_discuss_async_client() -> Result<Arc<dyn DiscussService>, ClientError> {
    ClientManager::global().discuss_async_client()
}

pub fn get_default_model_client() -> Result<Arc<BlockingClient<dyn ModelService>>, ClientError> {
    ClientManager::global().model_client()
}

pub fn get_default_model_async_client() -> Result<Arc<dyn ModelService>, ClientError> {
    ClientManager::global().model_async_client()
}

pub fn get_default_retriever_client(
) -> Result<Arc<BlockingClient<dyn RetrieverService>>, ClientError> {
    ClientManager::global().retriever_client()
}

pub fn get_default_retriever_async_client() -> Result<Arc<dyn RetrieverService>, ClientError> {
    ClientManager::global().retriever_async_client()
}
