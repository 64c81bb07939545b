//! Discuss service (PaLM chat) over REST.

use async_trait::async_trait;
use std::sync::Arc;

use super::rest::RestTransport;
use crate::client::{ClientError, DiscussService};
use crate::metadata::Metadata;
use crate::model::{
    CountMessageTokensRequest, GenerateMessageRequest, GenerateMessageResponse, TokenCount,
};

pub struct RestDiscussClient {
    transport: Arc<RestTransport>,
}

impl RestDiscussClient {
    pub fn new(transport: Arc<RestTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl DiscussService for RestDiscussClient {
    async fn generate_message(
        &self,
        request: GenerateMessageRequest,
        metadata: Metadata,
    ) -> Result<GenerateMessageResponse, ClientError> {
        let path = format!("{}:generateMessage", request.model);
        self.transport.post(&path, &request, &metadata).await
    }

    async fn count_message_tokens(
        &self,
        request: CountMessageTokensRequest,
        metadata: Metadata,
    ) -> Result<TokenCount, ClientError> {
        let path = format!("{}:countMessageTokens", request.model);
        self.transport.post(&path, &request, &metadata).await
    }
}
