//! # genai - Generative Language API client
//!
//! A process-wide client manager for the Generative Language API: configure
//! credentials, endpoint and default request metadata once, then obtain
//! cached service clients by name.
//!
//! ## Features
//! - Async service traits, tokio compatible
//! - Blocking variants of every service client
//! - Default metadata merged into every call
//! - REST transport with API key, bearer token and quota project support
//! - Embedding and corpus helpers built on the default clients
//!
//! ## Architecture
//!
//! - **`ClientManager`**: holds the active configuration and one cached client
//!   per service name. `configure` swaps the configuration and empties the cache.
//! - **Service traits**: `GenerativeService`, `TextService`, `DiscussService`,
//!   `ModelService`, `RetrieverService` and `OperationsService`, each method
//!   taking per-call `Metadata`.
//! - **`WithDefaultMetadata`**: decorator appending the configured defaults
//!   after the caller's metadata.
//! - **`BlockingClient`**: synchronous shell owning its own runtime.
//!
//! Service names are `generative`, `text`, `discuss`, `model`, `retriever`
//! and `operations`;
//! a `_async` (or `-async`) suffix selects the async variant.
//!
//! ## Example
//! ```no_run
//! use genai::config::ConfigureOptions;
//! use genai::model::{Content, GenerateContentRequest};
//! use genai::{configure, get_default_generative_async_client, GenerativeService, Metadata};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     configure(
//!         ConfigureOptions::new()
//!             .with_api_key("your-api-key")
//!             .with_default_metadata([("x-team", "search")]),
//!     )?;
//!
//!     let client = get_default_generative_async_client()?;
//!     let request = GenerateContentRequest {
//!         model: "models/gemini-pro".to_string(),
//!         contents: vec![Content::from("Hello!")],
//!         ..GenerateContentRequest::default()
//!     };
//!
//!     let response = client.generate_content(request, Metadata::new()).await?;
//!     println!("{:?}", response);
//!     Ok(())
//! }
//! ```

pub mod blocking;
pub mod client;
pub mod config;
pub mod embedding;
pub mod http;
pub mod manager;
pub mod metadata;
pub mod model;
pub mod options;
pub mod providers;
pub mod retriever;
pub mod safety;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use blocking::BlockingClient;
pub use client::{
    ClientError, DiscussService, GenerativeService, ModelService, OperationsService,
    RetrieverService, TextService,
};
pub use config::ConfigureOptions;
pub use manager::{
    configure, get_default_client, get_default_discuss_async_client, get_default_discuss_client,
    get_default_generative_async_client, get_default_generative_client,
    get_default_model_async_client, get_default_model_client, get_default_operations_client,
    get_default_retriever_async_client, get_default_retriever_client,
    get_default_text_async_client, get_default_text_client, ClientManager, ServiceClient,
};
pub use metadata::{Metadata, WithDefaultMetadata};
