//! Long-running operations over REST.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use super::rest::{page_query, RestTransport};
use crate::client::{ClientError, OperationsService};
use crate::metadata::Metadata;
use crate::model::{ListOperationsRequest, ListOperationsResponse, Operation};

pub struct RestOperationsClient {
    transport: Arc<RestTransport>,
}

impl RestOperationsClient {
    pub fn new(transport: Arc<RestTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl OperationsService for RestOperationsClient {
    async fn get_operation(
        &self,
        name: &str,
        metadata: Metadata,
    ) -> Result<Operation, ClientError> {
        self.transport.get(name, &[], &metadata).await
    }

    async fn list_operations(
        &self,
        request: ListOperationsRequest,
        metadata: Metadata,
    ) -> Result<ListOperationsResponse, ClientError> {
        let mut query = page_query(request.page_size, request.page_token);
        if let Some(filter) = request.filter {
            query.push(("filter", filter));
        }
        let path = format!("{}/operations", request.name);
        self.transport.get(&path, &query, &metadata).await
    }

    async fn cancel_operation(&self, name: &str, metadata: Metadata) -> Result<(), ClientError> {
        let path = format!("{name}:cancel");
        self.transport.post_empty(&path, &json!({}), &metadata).await
    }

    async fn delete_operation(&self, name: &str, metadata: Metadata) -> Result<(), ClientError> {
        self.transport.delete(name, &[], &metadata).await
    }
}
