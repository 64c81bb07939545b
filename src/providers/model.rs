//! Model service over REST.

use async_trait::async_trait;
use std::sync::Arc;

use super::operations::RestOperationsClient;
use super::rest::{page_query, RestTransport};
use crate::client::{ClientError, ModelService, OperationsService};
use crate::metadata::Metadata;
use crate::model::{ListModelsRequest, ListModelsResponse, Model};

pub struct RestModelClient {
    transport: Arc<RestTransport>,
    operations: Arc<RestOperationsClient>,
}

impl RestModelClient {
    /// The operations client shares this client's transport.
    pub fn new(transport: Arc<RestTransport>) -> Self {
        let operations = Arc::new(RestOperationsClient::new(transport.clone()));
        Self {
            transport,
            operations,
        }
    }
}

#[async_trait]
impl ModelService for RestModelClient {
    async fn get_model(&self, name: &str, metadata: Metadata) -> Result<Model, ClientError> {
        self.transport.get(name, &[], &metadata).await
    }

    async fn list_models(
        &self,
        request: ListModelsRequest,
        metadata: Metadata,
    ) -> Result<ListModelsResponse, ClientError> {
        let query = page_query(request.page_size, request.page_token);
        self.transport.get("models", &query, &metadata).await
    }

    fn operations_client(&self) -> Arc<dyn OperationsService> {
        self.operations.clone()
    }
}
