//! HTTP client utilities shared by the REST service clients.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;

use crate::client::ClientError;
use crate::config::ClientConfig;
use crate::metadata::Metadata;
use crate::options::ClientOptions;

pub const DEFAULT_API_ENDPOINT: &str = "generativelanguage.googleapis.com";

/// Build a configured HTTP client from a configuration snapshot.
///
/// # Example
/// ```ignore
/// let client = build_http_client(&config)?;
/// ```
pub fn build_http_client(config: &ClientConfig) -> Result<Client, ClientError> {
    let mut builder = Client::builder();

    if let Some(user_agent) = &config.client_info.user_agent {
        builder = builder.user_agent(user_agent.as_str());
    }

    Ok(builder.build()?)
}

/// Base URL for `options`, defaulting to the public endpoint.
///
/// An endpoint given without a scheme is assumed to be HTTPS.
pub fn base_url(options: &ClientOptions) -> String {
    let endpoint = options
        .api_endpoint
        .as_deref()
        .filter(|e| !e.is_empty())
        .unwrap_or(DEFAULT_API_ENDPOINT)
        .trim_end_matches('/');

    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("https://{endpoint}")
    }
}

/// Send every metadata pair as an HTTP header, preserving order and
/// repeated keys.
///
/// # Example
/// ```ignore
/// let mut req = client.post(url);
/// req = add_metadata_headers(req, &metadata);
/// ```
pub fn add_metadata_headers(mut request: RequestBuilder, metadata: &Metadata) -> RequestBuilder {
    for (key, value) in metadata.iter() {
        request = request.header(key, value);
    }
    request
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiError {
    code: u32,
    message: String,
}

/// Map a non-success response body to a [`ClientError`].
pub fn handle_error_response(status: StatusCode, body: &str) -> ClientError {
    if let Ok(error_resp) = serde_json::from_str::<ApiErrorResponse>(body) {
        ClientError::ProviderError(format!(
            "{}: {}",
            error_resp.error.code, error_resp.error.message
        ))
    } else {
        ClientError::ProviderError(format!("HTTP {}: {}", status, body))
    }
}
