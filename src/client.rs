//! Client error type and the capability surface of every service.
//!
//! Each service is an async trait with a fixed list of operations. Every
//! operation takes its request plus a [`Metadata`] sequence that the
//! transport attaches to the outgoing call. Pass `Metadata::default()` when
//! there is nothing to add.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::metadata::Metadata;
use crate::model::{
    BatchEmbedContentsRequest, BatchEmbedContentsResponse, BatchEmbedTextRequest,
    BatchEmbedTextResponse, Corpus, CountMessageTokensRequest, CountTextTokensRequest,
    CountTokensRequest, CountTokensResponse, CreateCorpusRequest, DeleteCorpusRequest,
    EmbedContentRequest, EmbedContentResponse, EmbedTextRequest, EmbedTextResponse,
    GenerateContentRequest, GenerateContentResponse, GenerateMessageRequest,
    GenerateMessageResponse, GenerateTextRequest, GenerateTextResponse, GetCorpusRequest,
    ListCorporaRequest, ListCorporaResponse, ListModelsRequest, ListModelsResponse,
    ListOperationsRequest, ListOperationsResponse, Model, Operation, TokenCount,
};

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("You can't set both `api_key` and `client_options.api_key`")]
    ConfigurationConflict,

    #[error("Unknown service: `{0}`")]
    UnknownService(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to start blocking runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Content generation and embeddings.
#[async_trait]
pub trait GenerativeService: Send + Sync {
    async fn generate_content(
        &self,
        request: GenerateContentRequest,
        metadata: Metadata,
    ) -> Result<GenerateContentResponse, ClientError>;

    async fn count_tokens(
        &self,
        request: CountTokensRequest,
        metadata: Metadata,
    ) -> Result<CountTokensResponse, ClientError>;

    async fn embed_content(
        &self,
        request: EmbedContentRequest,
        metadata: Metadata,
    ) -> Result<EmbedContentResponse, ClientError>;

    async fn batch_embed_contents(
        &self,
        request: BatchEmbedContentsRequest,
        metadata: Metadata,
    ) -> Result<BatchEmbedContentsResponse, ClientError>;
}

/// PaLM text completion and embeddings.
#[async_trait]
pub trait TextService: Send + Sync {
    async fn generate_text(
        &self,
        request: GenerateTextRequest,
        metadata: Metadata,
    ) -> Result<GenerateTextResponse, ClientError>;

    async fn count_text_tokens(
        &self,
        request: CountTextTokensRequest,
        metadata: Metadata,
    ) -> Result<TokenCount, ClientError>;

    async fn embed_text(
        &self,
        request: EmbedTextRequest,
        metadata: Metadata,
    ) -> Result<EmbedTextResponse, ClientError>;

    async fn batch_embed_text(
        &self,
        request: BatchEmbedTextRequest,
        metadata: Metadata,
    ) -> Result<BatchEmbedTextResponse, ClientError>;
}

/// PaLM chat.
#[async_trait]
pub trait DiscussService: Send + Sync {
    async fn generate_message(
        &self,
        request: GenerateMessageRequest,
        metadata: Metadata,
    ) -> Result<GenerateMessageResponse, ClientError>;

    async fn count_message_tokens(
        &self,
        request: CountMessageTokensRequest,
        metadata: Metadata,
    ) -> Result<TokenCount, ClientError>;
}

/// Model metadata lookups.
#[async_trait]
pub trait ModelService: Send + Sync {
    async fn get_model(&self, name: &str, metadata: Metadata) -> Result<Model, ClientError>;

    async fn list_models(
        &self,
        request: ListModelsRequest,
        metadata: Metadata,
    ) -> Result<ListModelsResponse, ClientError>;

    /// The long-running operations client embedded in this client's transport.
    ///
    /// Operations are not a standalone service; they are only reachable
    /// through the model service's transport.
    fn operations_client(&self) -> Arc<dyn OperationsService>;
}

/// Corpus management.
#[async_trait]
pub trait RetrieverService: Send + Sync {
    async fn create_corpus(
        &self,
        request: CreateCorpusRequest,
        metadata: Metadata,
    ) -> Result<Corpus, ClientError>;

    async fn get_corpus(
        &self,
        request: GetCorpusRequest,
        metadata: Metadata,
    ) -> Result<Corpus, ClientError>;

    async fn delete_corpus(
        &self,
        request: DeleteCorpusRequest,
        metadata: Metadata,
    ) -> Result<(), ClientError>;

    async fn list_corpora(
        &self,
        request: ListCorporaRequest,
        metadata: Metadata,
    ) -> Result<ListCorporaResponse, ClientError>;
}

/// Long-running operation polling and control.
#[async_trait]
pub trait OperationsService: Send + Sync {
    async fn get_operation(&self, name: &str, metadata: Metadata)
        -> Result<Operation, ClientError>;

    async fn list_operations(
        &self,
        request: ListOperationsRequest,
        metadata: Metadata,
    ) -> Result<ListOperationsResponse, ClientError>;

    async fn cancel_operation(&self, name: &str, metadata: Metadata) -> Result<(), ClientError>;

    async fn delete_operation(&self, name: &str, metadata: Metadata) -> Result<(), ClientError>;
}
