//! Recording fakes of the service traits and a counting client factory.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::client::{
    ClientError, DiscussService, GenerativeService, ModelService, OperationsService,
    RetrieverService, TextService,
};
use crate::config::ClientConfig;
use crate::manager::ClientFactory;
use crate::metadata::Metadata;
use crate::model::{
    BatchEmbedContentsRequest, BatchEmbedContentsResponse, BatchEmbedTextRequest,
    BatchEmbedTextResponse, ContentEmbedding, Corpus, CountMessageTokensRequest,
    CountTextTokensRequest, CountTokensRequest, CountTokensResponse, CreateCorpusRequest,
    DeleteCorpusRequest, EmbedContentRequest, EmbedContentResponse, EmbedTextRequest,
    EmbedTextResponse, Embedding, GenerateContentRequest, GenerateContentResponse,
    GenerateMessageRequest, GenerateMessageResponse, GenerateTextRequest, GenerateTextResponse,
    GetCorpusRequest, ListCorporaRequest, ListCorporaResponse, ListModelsRequest,
    ListModelsResponse, ListOperationsRequest, ListOperationsResponse, Message, Model,
    Operation, TextCompletion, TokenCount,
};

#[derive(Default)]
pub struct Recorder {
    calls: Mutex<Vec<Metadata>>,
}

impl Recorder {
    fn record(&self, metadata: Metadata) {
        self.calls.lock().push(metadata);
    }

    pub fn last(&self) -> Option<Metadata> {
        self.calls.lock().last().cloned()
    }
}

#[derive(Default)]
pub struct FakeGenerative {
    pub recorder: Recorder,
    pub batch_sizes: Mutex<Vec<usize>>,
    pub embed_requests: Mutex<Vec<EmbedContentRequest>>,
}

impl FakeGenerative {
    pub fn last_metadata(&self) -> Option<Metadata> {
        self.recorder.last()
    }
}

#[async_trait]
impl GenerativeService for FakeGenerative {
    async fn generate_content(
        &self,
        _request: GenerateContentRequest,
        metadata: Metadata,
    ) -> Result<GenerateContentResponse, ClientError> {
        self.recorder.record(metadata);
        Ok(GenerateContentResponse {
            candidates: Vec::new(),
            prompt_feedback: None,
            usage_metadata: None,
        })
    }

    async fn count_tokens(
        &self,
        request: CountTokensRequest,
        metadata: Metadata,
    ) -> Result<CountTokensResponse, ClientError> {
        self.recorder.record(metadata);
        Ok(CountTokensResponse {
            total_tokens: request.contents.len() as u32,
        })
    }

    async fn embed_content(
        &self,
        request: EmbedContentRequest,
        metadata: Metadata,
    ) -> Result<EmbedContentResponse, ClientError> {
        self.recorder.record(metadata);
        self.embed_requests.lock().push(request);
        Ok(EmbedContentResponse {
            embedding: ContentEmbedding {
                values: vec![0.5, 0.25],
            },
        })
    }

    async fn batch_embed_contents(
        &self,
        request: BatchEmbedContentsRequest,
        metadata: Metadata,
    ) -> Result<BatchEmbedContentsResponse, ClientError> {
        self.recorder.record(metadata);
        self.batch_sizes.lock().push(request.requests.len());
        let embeddings = request
            .requests
            .iter()
            .map(|r| ContentEmbedding {
                values: vec![r.content.parts.len() as f32],
            })
            .collect();
        self.embed_requests.lock().extend(request.requests);
        Ok(BatchEmbedContentsResponse { embeddings })
    }
}

/// Text fake: each embedding is the length of its text.
#[derive(Default)]
pub struct FakeText {
    pub recorder: Recorder,
}

impl FakeText {
    pub fn last_metadata(&self) -> Option<Metadata> {
        self.recorder.last()
    }
}

#[async_trait]
impl TextService for FakeText {
    async fn generate_text(
        &self,
        request: GenerateTextRequest,
        metadata: Metadata,
    ) -> Result<GenerateTextResponse, ClientError> {
        self.recorder.record(metadata);
        Ok(GenerateTextResponse {
            candidates: vec![TextCompletion {
                output: request.prompt.text,
                safety_ratings: Vec::new(),
            }],
            filters: Vec::new(),
            safety_feedback: Vec::new(),
        })
    }

    async fn count_text_tokens(
        &self,
        request: CountTextTokensRequest,
        metadata: Metadata,
    ) -> Result<TokenCount, ClientError> {
        self.recorder.record(metadata);
        Ok(TokenCount {
            token_count: request.prompt.text.split_whitespace().count() as u32,
        })
    }

    async fn embed_text(
        &self,
        request: EmbedTextRequest,
        metadata: Metadata,
    ) -> Result<EmbedTextResponse, ClientError> {
        self.recorder.record(metadata);
        Ok(EmbedTextResponse {
            embedding: Some(Embedding {
                value: vec![request.text.len() as f32],
            }),
        })
    }

    async fn batch_embed_text(
        &self,
        request: BatchEmbedTextRequest,
        metadata: Metadata,
    ) -> Result<BatchEmbedTextResponse, ClientError> {
        self.recorder.record(metadata);
        let embeddings = request
            .texts
            .iter()
            .map(|text| Embedding {
                value: vec![text.len() as f32],
            })
            .collect();
        Ok(BatchEmbedTextResponse { embeddings })
    }
}

/// Discuss fake echoing the last prompt message as the reply.
#[derive(Default)]
pub struct FakeDiscuss {
    pub recorder: Recorder,
}

impl FakeDiscuss {
    pub fn last_metadata(&self) -> Option<Metadata> {
        self.recorder.last()
    }
}

#[async_trait]
impl DiscussService for FakeDiscuss {
    async fn generate_message(
        &self,
        request: GenerateMessageRequest,
        metadata: Metadata,
    ) -> Result<GenerateMessageResponse, ClientError> {
        self.recorder.record(metadata);
        let reply = request
            .prompt
            .messages
            .last()
            .map(|m| Message::new(m.content.clone()))
            .unwrap_or_else(|| Message::new(""));
        Ok(GenerateMessageResponse {
            candidates: vec![reply],
            messages: request.prompt.messages,
            filters: Vec::new(),
        })
    }

    async fn count_message_tokens(
        &self,
        request: CountMessageTokensRequest,
        metadata: Metadata,
    ) -> Result<TokenCount, ClientError> {
        self.recorder.record(metadata);
        Ok(TokenCount {
            token_count: request.prompt.messages.len() as u32,
        })
    }
}

#[derive(Default)]
pub struct FakeOperations {
    pub recorder: Recorder,
}

#[async_trait]
impl OperationsService for FakeOperations {
    async fn get_operation(
        &self,
        name: &str,
        metadata: Metadata,
    ) -> Result<Operation, ClientError> {
        self.recorder.record(metadata);
        Ok(Operation {
            name: name.to_string(),
            done: true,
            metadata: None,
            error: None,
            response: None,
        })
    }

    async fn list_operations(
        &self,
        _request: ListOperationsRequest,
        metadata: Metadata,
    ) -> Result<ListOperationsResponse, ClientError> {
        self.recorder.record(metadata);
        Ok(ListOperationsResponse {
            operations: Vec::new(),
            next_page_token: None,
        })
    }

    async fn cancel_operation(&self, _name: &str, metadata: Metadata) -> Result<(), ClientError> {
        self.recorder.record(metadata);
        Ok(())
    }

    async fn delete_operation(&self, _name: &str, metadata: Metadata) -> Result<(), ClientError> {
        self.recorder.record(metadata);
        Ok(())
    }
}

pub struct FakeModel {
    pub recorder: Recorder,
    pub operations: Arc<FakeOperations>,
}

impl Default for FakeModel {
    fn default() -> Self {
        Self {
            recorder: Recorder::default(),
            operations: Arc::new(FakeOperations::default()),
        }
    }
}

#[async_trait]
impl ModelService for FakeModel {
    async fn get_model(&self, name: &str, metadata: Metadata) -> Result<Model, ClientError> {
        self.recorder.record(metadata);
        Ok(Model {
            name: name.to_string(),
            base_model_id: None,
            version: None,
            display_name: None,
            description: None,
            input_token_limit: None,
            output_token_limit: None,
            supported_generation_methods: Vec::new(),
        })
    }

    async fn list_models(
        &self,
        _request: ListModelsRequest,
        metadata: Metadata,
    ) -> Result<ListModelsResponse, ClientError> {
        self.recorder.record(metadata);
        Ok(ListModelsResponse {
            models: Vec::new(),
            next_page_token: None,
        })
    }

    fn operations_client(&self) -> Arc<dyn OperationsService> {
        self.operations.clone()
    }
}

/// Retriever fake serving a fixed set of pages for `list_corpora`.
#[derive(Default)]
pub struct FakeRetriever {
    pub recorder: Recorder,
    pub pages: Vec<ListCorporaResponse>,
    pub page_tokens: Mutex<Vec<Option<String>>>,
}

impl FakeRetriever {
    pub fn with_pages(pages: Vec<ListCorporaResponse>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    pub fn last_metadata(&self) -> Option<Metadata> {
        self.recorder.last()
    }
}

#[async_trait]
impl RetrieverService for FakeRetriever {
    async fn create_corpus(
        &self,
        request: CreateCorpusRequest,
        metadata: Metadata,
    ) -> Result<Corpus, ClientError> {
        self.recorder.record(metadata);
        Ok(request.corpus)
    }

    async fn get_corpus(
        &self,
        request: GetCorpusRequest,
        metadata: Metadata,
    ) -> Result<Corpus, ClientError> {
        self.recorder.record(metadata);
        Ok(Corpus {
            name: request.name,
            ..Corpus::default()
        })
    }

    async fn delete_corpus(
        &self,
        _request: DeleteCorpusRequest,
        metadata: Metadata,
    ) -> Result<(), ClientError> {
        self.recorder.record(metadata);
        Ok(())
    }

    async fn list_corpora(
        &self,
        request: ListCorporaRequest,
        metadata: Metadata,
    ) -> Result<ListCorporaResponse, ClientError> {
        self.recorder.record(metadata);
        let index = self.page_tokens.lock().len();
        self.page_tokens.lock().push(request.page_token);
        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }
}

/// Factory handing out fresh fakes and remembering every construction.
#[derive(Default)]
pub struct FakeFactory {
    pub constructed: AtomicUsize,
    pub fail_with_config_error: bool,
    pub api_keys: Mutex<Vec<Option<String>>>,
    pub generative: Mutex<Vec<Arc<FakeGenerative>>>,
    pub texts: Mutex<Vec<Arc<FakeText>>>,
    pub discusses: Mutex<Vec<Arc<FakeDiscuss>>>,
    pub models: Mutex<Vec<Arc<FakeModel>>>,
    pub retrievers: Mutex<Vec<Arc<FakeRetriever>>>,
}

impl FakeFactory {
    pub fn failing() -> Self {
        Self {
            fail_with_config_error: true,
            ..Self::default()
        }
    }

    pub fn constructed(&self) -> usize {
        self.constructed.load(Ordering::SeqCst)
    }

    fn begin(&self, config: &ClientConfig) -> Result<(), ClientError> {
        if self.fail_with_config_error {
            return Err(ClientError::Config("invalid credentials".to_string()));
        }
        self.constructed.fetch_add(1, Ordering::SeqCst);
        self.api_keys.lock().push(
            config
                .client_options
                .api_key()
                .map(|k| k.expose_secret().to_string()),
        );
        Ok(())
    }
}

impl ClientFactory for FakeFactory {
    fn generative(&self, config: &ClientConfig) -> Result<Arc<dyn GenerativeService>, ClientError> {
        self.begin(config)?;
        let client = Arc::new(FakeGenerative::default());
        self.generative.lock().push(client.clone());
        Ok(client)
    }

    fn text(&self, config: &ClientConfig) -> Result<Arc<dyn TextService>, ClientError> {
        self.begin(config)?;
        let client = Arc::new(FakeText::default());
        self.texts.lock().push(client.clone());
        Ok(client)
    }

    fn discuss(&self, config: &ClientConfig) -> Result<Arc<dyn DiscussService>, ClientError> {
        self.begin(config)?;
        let client = Arc::new(FakeDiscuss::default());
        self.discusses.lock().push(client.clone());
        Ok(client)
    }

    fn model(&self, config: &ClientConfig) -> Result<Arc<dyn ModelService>, ClientError> {
        self.begin(config)?;
        let client = Arc::new(FakeModel::default());
        self.models.lock().push(client.clone());
        Ok(client)
    }

    fn retriever(&self, config: &ClientConfig) -> Result<Arc<dyn RetrieverService>, ClientError> {
        self.begin(config)?;
        let client = Arc::new(FakeRetriever::default());
        self.retrievers.lock().push(client.clone());
        Ok(client)
    }
}
