//! Synchronous variants of the service clients.
//!
//! A [`BlockingClient`] owns a current-thread tokio runtime and drives the
//! wrapped async client to completion on each call. Methods keep the names
//! of the async operations.
//!
//! Calling these methods from inside an async context panics, as with any
//! nested `block_on`. Use the `_async` clients there instead.

use std::future::Future;
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};

use crate::client::{
    ClientError, DiscussService, GenerativeService, ModelService, OperationsService,
    RetrieverService, TextService,
};
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

/// Runtime that may be dropped from anywhere, including async code.
struct OwnedRuntime(Option<Runtime>);

impl OwnedRuntime {
    fn block_on<F: Future>(&self, future: F) -> F::Output {
        match &self.0 {
            Some(runtime) => runtime.block_on(future),
            None => unreachable!("runtime is only taken on drop"),
        }
    }
}

impl Drop for OwnedRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.0.take() {
            runtime.shutdown_background();
        }
    }
}

/// Blocking shell around an async service client.
pub struct BlockingClient<C: ?Sized> {
    runtime: Arc<OwnedRuntime>,
    inner: Arc<C>,
}

impl<C: ?Sized> BlockingClient<C> {
    pub fn new(inner: Arc<C>) -> Result<Self, ClientError> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            runtime: Arc::new(OwnedRuntime(Some(runtime))),
            inner,
        })
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

impl BlockingClient<dyn GenerativeService> {
    pub fn generate_content(
        &self,
        request: GenerateContentRequest,
        metadata: Metadata,
    ) -> Result<GenerateContentResponse, ClientError> {
        self.block_on(self.inner.generate_content(request, metadata))
    }

    pub fn count_tokens(
        &self,
        request: CountTokensRequest,
        metadata: Metadata,
    ) -> Result<CountTokensResponse, ClientError> {
        self.block_on(self.inner.count_tokens(request, metadata))
    }

    pub fn embed_content(
        &self,
        request: EmbedContentRequest,
        metadata: Metadata,
    ) -> Result<EmbedContentResponse, ClientError> {
        self.block_on(self.inner.embed_content(request, metadata))
    }

    pub fn batch_embed_contents(
        &self,
        request: BatchEmbedContentsRequest,
        metadata: Metadata,
    ) -> Result<BatchEmbedContentsResponse, ClientError> {
        self.block_on(self.inner.batch_embed_contents(request, metadata))
    }
}

impl BlockingClient<dyn TextService> {
    pub fn generate_text(
        &self,
        request: GenerateTextRequest,
        metadata: Metadata,
    ) -> Result<GenerateTextResponse, ClientError> {
        self.block_on(self.inner.generate_text(request, metadata))
    }

    pub fn count_text_tokens(
        &self,
        request: CountTextTokensRequest,
        metadata: Metadata,
    ) -> Result<TokenCount, ClientError> {
        self.block_on(self.inner.count_text_tokens(request, metadata))
    }

    pub fn embed_text(
        &self,
        request: EmbedTextRequest,
        metadata: Metadata,
    ) -> Result<EmbedTextResponse, ClientError> {
        self.block_on(self.inner.embed_text(request, metadata))
    }

    pub fn batch_embed_text(
        &self,
        request: BatchEmbedTextRequest,
        metadata: Metadata,
    ) -> Result<BatchEmbedTextResponse, ClientError> {
        self.block_on(self.inner.batch_embed_text(request, metadata))
    }
}

impl BlockingClient<dyn DiscussService> {
    pub fn generate_message(
        &self,
        request: GenerateMessageRequest,
        metadata: Metadata,
    ) -> Result<GenerateMessageResponse, ClientError> {
        self.block_on(self.inner.generate_message(request, metadata))
    }

    pub fn count_message_tokens(
        &self,
        request: CountMessageTokensRequest,
        metadata: Metadata,
    ) -> Result<TokenCount, ClientError> {
        self.block_on(self.inner.count_message_tokens(request, metadata))
    }
}

impl BlockingClient<dyn ModelService> {
    pub fn get_model(&self, name: &str, metadata: Metadata) -> Result<Model, ClientError> {
        self.block_on(self.inner.get_model(name, metadata))
    }

    pub fn list_models(
        &self,
        request: ListModelsRequest,
        metadata: Metadata,
    ) -> Result<ListModelsResponse, ClientError> {
        self.block_on(self.inner.list_models(request, metadata))
    }

    /// Blocking operations client sharing this client's runtime.
    pub fn operations_client(&self) -> BlockingClient<dyn OperationsService> {
        BlockingClient {
            runtime: Arc::clone(&self.runtime),
            inner: self.inner.operations_client(),
        }
    }
}

impl BlockingClient<dyn RetrieverService> {
    pub fn create_corpus(
        &self,
        request: CreateCorpusRequest,
        metadata: Metadata,
    ) -> Result<Corpus, ClientError> {
        self.block_on(self.inner.create_corpus(request, metadata))
    }

    pub fn get_corpus(
        &self,
        request: GetCorpusRequest,
        metadata: Metadata,
    ) -> Result<Corpus, ClientError> {
        self.block_on(self.inner.get_corpus(request, metadata))
    }

    pub fn delete_corpus(
        &self,
        request: DeleteCorpusRequest,
        metadata: Metadata,
    ) -> Result<(), ClientError> {
        self.block_on(self.inner.delete_corpus(request, metadata))
    }

    pub fn list_corpora(
        &self,
        request: ListCorporaRequest,
        metadata: Metadata,
    ) -> Result<ListCorporaResponse, ClientError> {
        self.block_on(self.inner.list_corpora(request, metadata))
    }
}

impl BlockingClient<dyn OperationsService> {
    pub fn get_operation(&self, name: &str, metadata: Metadata) -> Result<Operation, ClientError> {
        self.block_on(self.inner.get_operation(name, metadata))
    }

    pub fn list_operations(
        &self,
        request: ListOperationsRequest,
        metadata: Metadata,
    ) -> Result<ListOperationsResponse, ClientError> {
        self.block_on(self.inner.list_operations(request, metadata))
    }

    pub fn cancel_operation(&self, name: &str, metadata: Metadata) -> Result<(), ClientError> {
        self.block_on(self.inner.cancel_operation(name, metadata))
    }

    pub fn delete_operation(&self, name: &str, metadata: Metadata) -> Result<(), ClientError> {
        self.block_on(self.inner.delete_operation(name, metadata))
    }
}
