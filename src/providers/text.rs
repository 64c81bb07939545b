//! Text service (PaLM) over REST.

use async_trait::async_trait;
use std::sync::Arc;

use super::rest::RestTransport;
use crate::client::{ClientError, TextService};
use crate::metadata::Metadata;
use crate::model::{
    BatchEmbedTextRequest, BatchEmbedTextResponse, CountTextTokensRequest, EmbedTextRequest,
    EmbedTextResponse, GenerateTextRequest, GenerateTextResponse, TokenCount,
};

pub struct RestTextClient {
    transport: Arc<RestTransport>,
}

impl RestTextClient {
    pub fn new(transport: Arc<RestTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl TextService for RestTextClient {
    async fn generate_text(
        &self,
        request: GenerateTextRequest,
        metadata: Metadata,
    ) -> Result<GenerateTextResponse, ClientError> {
        let path = format!("{}:generateText", request.model);
        self.transport.post(&path, &request, &metadata).await
    }

    async fn count_text_tokens(
        &self,
        request: CountTextTokensRequest,
        metadata: Metadata,
    ) -> Result<TokenCount, ClientError> {
        let path = format!("{}:countTextTokens", request.model);
        self.transport.post(&path, &request, &metadata).await
    }

    async fn embed_text(
        &self,
        request: EmbedTextRequest,
        metadata: Metadata,
    ) -> Result<EmbedTextResponse, ClientError> {
        let path = format!("{}:embedText", request.model);
        self.transport.post(&path, &request, &metadata).await
    }

    async fn batch_embed_text(
        &self,
        request: BatchEmbedTextRequest,
        metadata: Metadata,
    ) -> Result<BatchEmbedTextResponse, ClientError> {
        let path = format!("{}:batchEmbedText", request.model);
        self.transport.post(&path, &request, &metadata).await
    }
}
