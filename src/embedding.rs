//! Text embeddings on top of the generative service.
//!
//! Single contents go through `embedContent`; many contents are split into
//! `batchEmbedContents` calls of at most [`EMBEDDING_MAX_BATCH_SIZE`]
//! requests each, and the vectors come back in input order.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::blocking::BlockingClient;
use crate::client::{ClientError, GenerativeService};
use crate::manager::{get_default_generative_async_client, get_default_generative_client};
use crate::metadata::Metadata;
use crate::model::{BatchEmbedContentsRequest, Content, EmbedContentRequest};

pub const DEFAULT_EMB_MODEL: &str = "models/embedding-001";
pub const EMBEDDING_MAX_BATCH_SIZE: usize = 100;

/// What the embedding will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    TaskTypeUnspecified,
    RetrievalQuery,
    RetrievalDocument,
    SemanticSimilarity,
    Classification,
    Clustering,
}

impl FromStr for TaskType {
    type Err = ClientError;

    /// Accepts wire names, short aliases (`query`, `document`,
    /// `similarity`, ...) and integer codes, case-insensitively.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "0" | "task_type_unspecified" | "unspecified" => Ok(TaskType::TaskTypeUnspecified),
            "1" | "retrieval_query" | "query" => Ok(TaskType::RetrievalQuery),
            "2" | "retrieval_document" | "document" => Ok(TaskType::RetrievalDocument),
            "3" | "semantic_similarity" | "similarity" => Ok(TaskType::SemanticSimilarity),
            "4" | "classification" => Ok(TaskType::Classification),
            "5" | "clustering" => Ok(TaskType::Clustering),
            _ => Err(ClientError::InvalidArgument(format!(
                "unknown task type `{value}`"
            ))),
        }
    }
}

impl TryFrom<i32> for TaskType {
    type Error = ClientError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        code.to_string().parse()
    }
}

/// Prefix bare model ids with `models/`.
pub fn make_model_name(name: &str) -> Result<String, ClientError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ClientError::InvalidArgument(
            "model name must not be empty".to_string(),
        ));
    }
    if name.contains('/') {
        Ok(name.to_string())
    } else {
        Ok(format!("models/{name}"))
    }
}

/// Model and options shared by every content of one embedding call.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedParams {
    pub model: String,
    pub task_type: Option<TaskType>,
    pub title: Option<String>,
}

impl Default for EmbedParams {
    fn default() -> Self {
        Self::new(DEFAULT_EMB_MODEL)
    }
}

impl EmbedParams {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            task_type: None,
            title: None,
        }
    }

    pub fn with_task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = Some(task_type);
        self
    }

    /// Only valid together with [`TaskType::RetrievalDocument`].
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn request(&self, model: &str, content: Content) -> EmbedContentRequest {
        EmbedContentRequest {
            model: model.to_string(),
            content,
            task_type: self.task_type,
            title: self.title.clone(),
        }
    }

    /// Normalised model name, after checking the title/task combination.
    fn validate(&self) -> Result<String, ClientError> {
        let has_title = self.title.as_deref().is_some_and(|t| !t.is_empty());
        if has_title && self.task_type != Some(TaskType::RetrievalDocument) {
            return Err(ClientError::InvalidArgument(
                "If a title is specified, the task must be a retrieval document type task."
                    .to_string(),
            ));
        }
        make_model_name(&self.model)
    }

    fn batches<I, C>(&self, contents: I) -> Result<Vec<BatchEmbedContentsRequest>, ClientError>
    where
        I: IntoIterator<Item = C>,
        C: Into<Content>,
    {
        let model = self.validate()?;
        let requests = contents
            .into_iter()
            .map(|content| self.request(&model, content.into()));
        Ok(batched(requests, EMBEDDING_MAX_BATCH_SIZE)
            .into_iter()
            .map(|requests| BatchEmbedContentsRequest {
                model: model.clone(),
                requests,
            })
            .collect())
    }
}

/// Split `items` into consecutive groups of at most `size`.
fn batched<T>(items: impl IntoIterator<Item = T>, size: usize) -> Vec<Vec<T>> {
    items
        .into_iter()
        .chunks(size.max(1))
        .into_iter()
        .map(|chunk| chunk.collect())
        .collect()
}

/// Embed one content. Uses the default generative client when `client` is
/// `None`.
pub async fn embed_content(
    params: &EmbedParams,
    content: impl Into<Content>,
    client: Option<Arc<dyn GenerativeService>>,
) -> Result<Vec<f32>, ClientError> {
    let model = params.validate()?;
    let client = match client {
        Some(client) => client,
        None => get_default_generative_async_client()?,
    };
    let response = client
        .embed_content(params.request(&model, content.into()), Metadata::default())
        .await?;
    Ok(response.embedding.values)
}

/// Embed many contents, one vector per content in input order.
pub async fn embed_contents<I, C>(
    params: &EmbedParams,
    contents: I,
    client: Option<Arc<dyn GenerativeService>>,
) -> Result<Vec<Vec<f32>>, ClientError>
where
    I: IntoIterator<Item = C>,
    C: Into<Content>,
{
    let batches = params.batches(contents)?;
    let client = match client {
        Some(client) => client,
        None => get_default_generative_async_client()?,
    };

    let mut embeddings = Vec::new();
    for batch in batches {
        debug!(size = batch.requests.len(), "Sending embedding batch");
        let response = client.batch_embed_contents(batch, Metadata::default()).await?;
        embeddings.extend(response.embeddings.into_iter().map(|e| e.values));
    }
    Ok(embeddings)
}

/// Blocking counterpart of [`embed_content`].
pub fn embed_content_blocking(
    params: &EmbedParams,
    content: impl Into<Content>,
    client: Option<Arc<BlockingClient<dyn GenerativeService>>>,
) -> Result<Vec<f32>, ClientError> {
    let model = params.validate()?;
    let client = match client {
        Some(client) => client,
        None => get_default_generative_client()?,
    };
    let response =
        client.embed_content(params.request(&model, content.into()), Metadata::default())?;
    Ok(response.embedding.values)
}

/// Blocking counterpart of [`embed_contents`].
pub fn embed_contents_blocking<I, C>(
    params: &EmbedParams,
    contents: I,
    client: Option<Arc<BlockingClient<dyn GenerativeService>>>,
) -> Result<Vec<Vec<f32>>, ClientError>
where
    I: IntoIterator<Item = C>,
    C: Into<Content>,
{
    let batches = params.batches(contents)?;
    let client = match client {
        Some(client) => client,
        None => get_default_generative_client()?,
    };

    let mut embeddings = Vec::new();
    for batch in batches {
        let response = client.batch_embed_contents(batch, Metadata::default())?;
        embeddings.extend(response.embeddings.into_iter().map(|e| e.values));
    }
    Ok(embeddings)
}
