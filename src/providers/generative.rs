//! Generative service over REST.

use async_trait::async_trait;
use std::sync::Arc;

use super::rest::RestTransport;
use crate::client::{ClientError, GenerativeService};
use crate::metadata::Metadata;
use crate::model::{
    BatchEmbedContentsRequest, BatchEmbedContentsResponse, CountTokensRequest,
    CountTokensResponse, EmbedContentRequest, EmbedContentResponse, GenerateContentRequest,
    GenerateContentResponse,
};

pub struct RestGenerativeClient {
    transport: Arc<RestTransport>,
}

impl RestGenerativeClient {
    pub fn new(transport: Arc<RestTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl GenerativeService for RestGenerativeClient {
    async fn generate_content(
        &self,
        request: GenerateContentRequest,
        metadata: Metadata,
    ) -> Result<GenerateContentResponse, ClientError> {
        let path = format!("{}:generateContent", request.model);
        self.transport.post(&path, &request, &metadata).await
    }

    async fn count_tokens(
        &self,
        request: CountTokensRequest,
        metadata: Metadata,
    ) -> Result<CountTokensResponse, ClientError> {
        let path = format!("{}:countTokens", request.model);
        self.transport.post(&path, &request, &metadata).await
    }

    async fn embed_content(
        &self,
        request: EmbedContentRequest,
        metadata: Metadata,
    ) -> Result<EmbedContentResponse, ClientError> {
        let path = format!("{}:embedContent", request.model);
        self.transport.post(&path, &request, &metadata).await
    }

    async fn batch_embed_contents(
        &self,
        request: BatchEmbedContentsRequest,
        metadata: Metadata,
    ) -> Result<BatchEmbedContentsResponse, ClientError> {
        let path = format!("{}:batchEmbedContents", request.model);
        self.transport.post(&path, &request, &metadata).await
    }
}
