//! Retriever (corpus) service over REST.

use async_trait::async_trait;
use std::sync::Arc;

use super::rest::{page_query, RestTransport};
use crate::client::{ClientError, RetrieverService};
use crate::metadata::Metadata;
use crate::model::{
    Corpus, CreateCorpusRequest, DeleteCorpusRequest, GetCorpusRequest, ListCorporaRequest,
    ListCorporaResponse,
};

pub struct RestRetrieverClient {
    transport: Arc<RestTransport>,
}

impl RestRetrieverClient {
    pub fn new(transport: Arc<RestTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl RetrieverService for RestRetrieverClient {
    async fn create_corpus(
        &self,
        request: CreateCorpusRequest,
        metadata: Metadata,
    ) -> Result<Corpus, ClientError> {
        self.transport
            .post("corpora", &request.corpus, &metadata)
            .await
    }

    async fn get_corpus(
        &self,
        request: GetCorpusRequest,
        metadata: Metadata,
    ) -> Result<Corpus, ClientError> {
        self.transport.get(&request.name, &[], &metadata).await
    }

    async fn delete_corpus(
        &self,
        request: DeleteCorpusRequest,
        metadata: Metadata,
    ) -> Result<(), ClientError> {
        let query = if request.force {
            vec![("force", "true".to_string())]
        } else {
            Vec::new()
        };
        self.transport.delete(&request.name, &query, &metadata).await
    }

    async fn list_corpora(
        &self,
        request: ListCorporaRequest,
        metadata: Metadata,
    ) -> Result<ListCorporaResponse, ClientError> {
        let query = page_query(request.page_size, request.page_token);
        self.transport.get("corpora", &query, &metadata).await
    }
}
