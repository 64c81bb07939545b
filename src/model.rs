//! Request and response messages exchanged with the services.
//!
//! Field names follow the JSON mapping of the REST API (camelCase on the
//! wire). Unknown response fields are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::embedding::TaskType;
use crate::safety::{HarmBlockThreshold, HarmCategory, HarmProbability};

/// A single part of a content message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// A multi-part message from either side of a conversation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

impl Content {
    /// A role-less content holding one text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part { text: text.into() }],
        }
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::text(text)
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::text(text)
    }
}

// --- Generative service ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyRating {
    pub category: HarmCategory,
    pub probability: HarmProbability,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Model resource name, `models/{model}`.
    #[serde(skip)]
    pub model: String,
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub safety_settings: Vec<SafetySetting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub safety_ratings: Vec<SafetyRating>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<Value>,
    pub usage_metadata: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CountTokensRequest {
    #[serde(skip)]
    pub model: String,
    pub contents: Vec<Content>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountTokensResponse {
    #[serde(default)]
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedContentRequest {
    pub model: String,
    pub content: Content,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentEmbedding {
    #[serde(default)]
    pub values: Vec<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbedContentResponse {
    pub embedding: ContentEmbedding,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchEmbedContentsRequest {
    #[serde(skip)]
    pub model: String,
    pub requests: Vec<EmbedContentRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchEmbedContentsResponse {
    #[serde(default)]
    pub embeddings: Vec<ContentEmbedding>,
}

// --- Model service ---

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub name: String,
    pub base_model_id: Option<String>,
    pub version: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub input_token_limit: Option<u32>,
    pub output_token_limit: Option<u32>,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ListModelsRequest {
    pub page_size: Option<u32>,
    pub page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListModelsResponse {
    #[serde(default)]
    pub models: Vec<Model>,
    pub next_page_token: Option<String>,
}

// --- Retriever service ---

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Corpus {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub update_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CreateCorpusRequest {
    pub corpus: Corpus,
}

#[derive(Debug, Clone)]
pub struct GetCorpusRequest {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct DeleteCorpusRequest {
    pub name: String,
    /// Also delete the documents and chunks inside the corpus.
    pub force: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ListCorporaRequest {
    pub page_size: Option<u32>,
    pub page_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCorporaResponse {
    #[serde(default)]
    pub corpora: Vec<Corpus>,
    pub next_page_token: Option<String>,
}

// --- Long-running operations ---

#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    pub metadata: Option<Value>,
    pub error: Option<Status>,
    pub response: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct ListOperationsRequest {
    /// Parent resource whose operations are listed, e.g. `tunedModels/my-model`.
    pub name: String,
    pub filter: Option<String>,
    pub page_size: Option<u32>,
    pub page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOperationsResponse {
    #[serde(default)]
    pub operations: Vec<Operation>,
    pub next_page_token: Option<String>,
}

// --- Text service (PaLM) ---

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextPrompt {
    pub text: String,
}

impl From<&str> for TextPrompt {
    fn from(text: &str) -> Self {
        TextPrompt {
            text: text.to_string(),
        }
    }
}

/// Safety settings here resolve against the old category set.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTextRequest {
    #[serde(skip)]
    pub model: String,
    pub prompt: TextPrompt,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub safety_settings: Vec<SafetySetting>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextCompletion {
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub safety_ratings: Vec<SafetyRating>,
}

/// Why a candidate or prompt was blocked.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentFilter {
    pub reason: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTextResponse {
    #[serde(default)]
    pub candidates: Vec<TextCompletion>,
    #[serde(default)]
    pub filters: Vec<ContentFilter>,
    #[serde(default)]
    pub safety_feedback: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CountTextTokensRequest {
    #[serde(skip)]
    pub model: String,
    pub prompt: TextPrompt,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCount {
    #[serde(default)]
    pub token_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedTextRequest {
    #[serde(skip)]
    pub model: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Embedding {
    #[serde(default)]
    pub value: Vec<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbedTextResponse {
    pub embedding: Option<Embedding>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchEmbedTextRequest {
    #[serde(skip)]
    pub model: String,
    pub texts: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchEmbedTextResponse {
    #[serde(default)]
    pub embeddings: Vec<Embedding>,
}

// --- Discuss service (PaLM) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub content: String,
}

impl Message {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            author: None,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub input: Message,
    pub output: Message,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessagePrompt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Example>,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMessageRequest {
    #[serde(skip)]
    pub model: String,
    pub prompt: MessagePrompt,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateMessageResponse {
    #[serde(default)]
    pub candidates: Vec<Message>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub filters: Vec<ContentFilter>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CountMessageTokensRequest {
    #[serde(skip)]
    pub model: String,
    pub prompt: MessagePrompt,
}
