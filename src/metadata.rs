//! Call metadata and the decorator that appends default metadata to every
//! operation of a service client.

use async_trait::async_trait;
use std::sync::Arc;

use crate::client::{
    ClientError, DiscussService, GenerativeService, ModelService, OperationsService,
    RetrieverService, TextService,
};
use crate::model::{
    BatchEmbedContentsRequest, BatchEmbedContentsResponse, BatchEmbedTextRequest,
    BatchEmbedTextResponse, Corpus, CountMessageTokensRequest, CountTextTokensRequest,
    CountTokensRequest, CountTokensResponse, CreateCorpusRequest, DeleteCorpusRequest,
    EmbedContentRequest, EmbedContentResponse, EmbedTextRequest, EmbedTextResponse,
    GenerateContentRequest, GenerateContentResponse, GenerateMessageRequest,
    GenerateMessageResponse, GenerateTextRequest, GenerateTextResponse, GetCorpusRequest,
    ListCorporaRequest, ListCorporaResponse, ListModelsRequest, ListModelsResponse, Model,
    TokenCount,
};

/// Ordered `(key, value)` pairs attached to an outgoing call.
///
/// Keys may repeat. Over REST every pair becomes an HTTP header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata(Vec<(String, String)>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Caller entries first, then `defaults`. Nothing is deduplicated.
    pub fn merged(mut self, defaults: &Metadata) -> Metadata {
        self.0.extend(defaults.0.iter().cloned());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for Metadata {
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Metadata {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Decorator that merges a fixed set of default metadata into every call.
///
/// Wraps any service implementation and forwards each operation with
/// `caller_metadata ++ defaults`. Only built when the defaults are
/// non-empty; see [`ClientManager`](crate::manager::ClientManager).
pub struct WithDefaultMetadata<C: ?Sized> {
    inner: Arc<C>,
    defaults: Metadata,
}

impl<C: ?Sized> WithDefaultMetadata<C> {
    pub fn new(inner: Arc<C>, defaults: Metadata) -> Self {
        Self { inner, defaults }
    }

    fn merge(&self, metadata: Metadata) -> Metadata {
        metadata.merged(&self.defaults)
    }
}

#[async_trait]
impl<C: GenerativeService + ?Sized> GenerativeService for WithDefaultMetadata<C> {
    async fn generate_content(
        &self,
        request: GenerateContentRequest,
        metadata: Metadata,
    ) -> Result<GenerateContentResponse, ClientError> {
        self.inner
            .generate_content(request, self.merge(metadata))
            .await
    }

    async fn count_tokens(
        &self,
        request: CountTokensRequest,
        metadata: Metadata,
    ) -> Result<CountTokensResponse, ClientError> {
        self.inner.count_tokens(request, self.merge(metadata)).await
    }

    async fn embed_content(
        &self,
        request: EmbedContentRequest,
        metadata: Metadata,
    ) -> Result<EmbedContentResponse, ClientError> {
        self.inner.embed_content(request, self.merge(metadata)).await
    }

    async fn batch_embed_contents(
        &self,
        request: BatchEmbedContentsRequest,
        metadata: Metadata,
    ) -> Result<BatchEmbedContentsResponse, ClientError> {
        self.inner
            .batch_embed_contents(request, self.merge(metadata))
            .await
    }
}

#[async_trait]
impl<C: TextService + ?Sized> TextService for WithDefaultMetadata<C> {
    async fn generate_text(
        &self,
        request: GenerateTextRequest,
        metadata: Metadata,
    ) -> Result<GenerateTextResponse, ClientError> {
        self.inner.generate_text(request, self.merge(metadata)).await
    }

    async fn count_text_tokens(
        &self,
        request: CountTextTokensRequest,
        metadata: Metadata,
    ) -> Result<TokenCount, ClientError> {
        self.inner
            .count_text_tokens(request, self.merge(metadata))
            .await
    }

    async fn embed_text(
        &self,
        request: EmbedTextRequest,
        metadata: Metadata,
    ) -> Result<EmbedTextResponse, ClientError> {
        self.inner.embed_text(request, self.merge(metadata)).await
    }

    async fn batch_embed_text(
        &self,
        request: BatchEmbedTextRequest,
        metadata: Metadata,
    ) -> Result<BatchEmbedTextResponse, ClientError> {
        self.inner
            .batch_embed_text(request, self.merge(metadata))
            .await
    }
}

#[async_trait]
impl<C: DiscussService + ?Sized> DiscussService for WithDefaultMetadata<C> {
    async fn generate_message(
        &self,
        request: GenerateMessageRequest,
        metadata: Metadata,
    ) -> Result<GenerateMessageResponse, ClientError> {
        self.inner
            .generate_message(request, self.merge(metadata))
            .await
    }

    async fn count_message_tokens(
        &self,
        request: CountMessageTokensRequest,
        metadata: Metadata,
    ) -> Result<TokenCount, ClientError> {
        self.inner
            .count_message_tokens(request, self.merge(metadata))
            .await
    }
}

#[async_trait]
impl<C: ModelService + ?Sized> ModelService for WithDefaultMetadata<C> {
    async fn get_model(&self, name: &str, metadata: Metadata) -> Result<Model, ClientError> {
        self.inner.get_model(name, self.merge(metadata)).await
    }

    async fn list_models(
        &self,
        request: ListModelsRequest,
        metadata: Metadata,
    ) -> Result<ListModelsResponse, ClientError> {
        self.inner.list_models(request, self.merge(metadata)).await
    }

    // Handed out as-is: the operations client carries no defaults.
    fn operations_client(&self) -> Arc<dyn OperationsService> {
        self.inner.operations_client()
    }
}

#[async_trait]
impl<C: RetrieverService + ?Sized> RetrieverService for WithDefaultMetadata<C> {
    async fn create_corpus(
        &self,
        request: CreateCorpusRequest,
        metadata: Metadata,
    ) -> Result<Corpus, ClientError> {
        self.inner.create_corpus(request, self.merge(metadata)).await
    }

    async fn get_corpus(
        &self,
        request: GetCorpusRequest,
        metadata: Metadata,
    ) -> Result<Corpus, ClientError> {
        self.inner.get_corpus(request, self.merge(metadata)).await
    }

    async fn delete_corpus(
        &self,
        request: DeleteCorpusRequest,
        metadata: Metadata,
    ) -> Result<(), ClientError> {
        self.inner.delete_corpus(request, self.merge(metadata)).await
    }

    async fn list_corpora(
        &self,
        request: ListCorporaRequest,
        metadata: Metadata,
    ) -> Result<ListCorporaResponse, ClientError> {
        self.inner.list_corpora(request, self.merge(metadata)).await
    }
}
