//! JSON-over-HTTP transport shared by the REST service clients.
//! See: <https://ai.google.dev/api/rest>

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::client::ClientError;
use crate::config::{user_agent_tag, ClientConfig};
use crate::http::{add_metadata_headers, base_url, build_http_client, handle_error_response};
use crate::metadata::Metadata;
use crate::options::{Credentials, SecretString, Transport};

pub const API_VERSION: &str = "v1beta";

/// Authenticated HTTP plumbing for one service client.
pub struct RestTransport {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    credentials: Option<Credentials>,
    quota_project_id: Option<String>,
}

impl RestTransport {
    /// Build a transport from a configuration snapshot.
    ///
    /// Only the `rest` transport (or none at all) can be served here.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        match config.transport.unwrap_or_default() {
            Transport::Unspecified | Transport::Rest => {}
            other => {
                return Err(ClientError::Config(format!(
                    "transport `{other}` is not available, use `rest`"
                )))
            }
        }

        let options = &config.client_options;
        let quota_project_id = config
            .credentials
            .as_ref()
            .and_then(|c| c.quota_project_id.clone())
            .or_else(|| options.quota_project_id.clone());

        Ok(Self {
            http: build_http_client(config)?,
            base_url: base_url(options),
            api_key: options.api_key().cloned(),
            credentials: config.credentials.clone(),
            quota_project_id,
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            API_VERSION,
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str, metadata: &Metadata) -> RequestBuilder {
        debug!(%method, path, "Sending request");

        let mut req = self
            .http
            .request(method, self.url(path))
            .header("x-goog-api-client", user_agent_tag());

        if let Some(api_key) = &self.api_key {
            req = req.header("x-goog-api-key", api_key.expose_secret());
        }
        if let Some(credentials) = &self.credentials {
            req = req.bearer_auth(credentials.token.expose_secret());
        }
        if let Some(project) = &self.quota_project_id {
            req = req.header("x-goog-user-project", project);
        }

        add_metadata_headers(req, metadata)
    }

    async fn execute(&self, req: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = req.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(handle_error_response(status, &body));
        }

        Ok(response)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        metadata: &Metadata,
    ) -> Result<T, ClientError> {
        let req = self.request(Method::GET, path, metadata).query(query);
        Ok(self.execute(req).await?.json().await?)
    }

    pub async fn post<B, T>(
        &self,
        path: &str,
        body: &B,
        metadata: &Metadata,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self
            .request(Method::POST, path, metadata)
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        Ok(self.execute(req).await?.json().await?)
    }

    /// POST whose response body carries nothing of interest.
    pub async fn post_empty<B>(
        &self,
        path: &str,
        body: &B,
        metadata: &Metadata,
    ) -> Result<(), ClientError>
    where
        B: Serialize + ?Sized,
    {
        let req = self
            .request(Method::POST, path, metadata)
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        self.execute(req).await?;
        Ok(())
    }

    pub async fn delete(
        &self,
        path: &str,
        query: &[(&str, String)],
        metadata: &Metadata,
    ) -> Result<(), ClientError> {
        let req = self.request(Method::DELETE, path, metadata).query(query);
        self.execute(req).await?;
        Ok(())
    }
}

/// Query pairs for the standard paging fields, skipping unset ones.
pub(crate) fn page_query(
    page_size: Option<u32>,
    page_token: Option<String>,
) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(size) = page_size {
        query.push(("pageSize", size.to_string()));
    }
    if let Some(token) = page_token.filter(|t| !t.is_empty()) {
        query.push(("pageToken", token));
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grpc_transport_is_rejected() {
        let config = ClientConfig {
            transport: Some(Transport::Grpc),
            ..ClientConfig::default()
        };
        assert!(matches!(
            RestTransport::new(&config),
            Err(ClientError::Config(msg)) if msg.contains("grpc")
        ));
    }

    #[test]
    fn test_url_joins_version_and_path() {
        let transport = RestTransport::new(&ClientConfig::default()).unwrap();
        assert_eq!(
            transport.url("/corpora/abc"),
            "https://generativelanguage.googleapis.com/v1beta/corpora/abc"
        );
    }

    #[test]
    fn test_page_query_skips_unset_fields() {
        assert!(page_query(None, None).is_empty());
        assert!(page_query(None, Some(String::new())).is_empty());
        assert_eq!(
            page_query(Some(10), Some("next".to_string())),
            vec![("pageSize", "10".to_string()), ("pageToken", "next".to_string())]
        );
    }
}
