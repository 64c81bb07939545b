//! REST implementations of the service traits.

pub mod discuss;
pub mod generative;
pub mod model;
pub mod operations;
pub mod rest;
pub mod retriever;
pub mod text;

use std::sync::Arc;

use crate::client::{
    ClientError, DiscussService, GenerativeService, ModelService, RetrieverService, TextService,
};
use crate::config::ClientConfig;
use crate::manager::ClientFactory;

// Re-export for convenience
pub use discuss::RestDiscussClient;
pub use generative::RestGenerativeClient;
pub use model::RestModelClient;
pub use operations::RestOperationsClient;
pub use rest::RestTransport;
pub use retriever::RestRetrieverClient;
pub use text::RestTextClient;

/// Factory building one REST transport per constructed client.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestClientFactory;

impl ClientFactory for RestClientFactory {
    fn generative(&self, config: &ClientConfig) -> Result<Arc<dyn GenerativeService>, ClientError> {
        let transport = Arc::new(RestTransport::new(config)?);
        Ok(Arc::new(RestGenerativeClient::new(transport)))
    }

    fn text(&self, config: &ClientConfig) -> Result<Arc<dyn TextService>, ClientError> {
        let transport = Arc::new(RestTransport::new(config)?);
        Ok(Arc::new(RestTextClient::new(transport)))
    }

    fn discuss(&self, config: &ClientConfig) -> Result<Arc<dyn DiscussService>, ClientError> {
        let transport = Arc::new(RestTransport::new(config)?);
        Ok(Arc::new(RestDiscussClient::new(transport)))
    }

    fn model(&self, config: &ClientConfig) -> Result<Arc<dyn ModelService>, ClientError> {
        let transport = Arc::new(RestTransport::new(config)?);
        Ok(Arc::new(RestModelClient::new(transport)))
    }

    fn retriever(&self, config: &ClientConfig) -> Result<Arc<dyn RetrieverService>, ClientError> {
        let transport = Arc::new(RestTransport::new(config)?);
        Ok(Arc::new(RestRetrieverClient::new(transport)))
    }
}
