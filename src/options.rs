//! Option structures handed to service client constructors.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::client::ClientError;

/// A secret string type for sensitive data like API keys.
/// Prevents accidental logging or display of secrets.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret string.
    pub fn new(s: String) -> Self {
        Self(s)
    }

    /// Get the underlying secret value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// True when the secret holds no characters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Underlying call mechanism a service client is built to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// Let the collaborator pick its own default.
    #[default]
    Unspecified,
    /// JSON over HTTP/1.1.
    Rest,
    /// gRPC with a blocking channel.
    Grpc,
    /// gRPC on an async channel.
    GrpcAsyncio,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Unspecified => "unspecified",
            Transport::Rest => "rest",
            Transport::Grpc => "grpc",
            Transport::GrpcAsyncio => "grpc_asyncio",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transport {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "unspecified" => Ok(Transport::Unspecified),
            "rest" => Ok(Transport::Rest),
            "grpc" => Ok(Transport::Grpc),
            "grpc_asyncio" | "grpc-asyncio" => Ok(Transport::GrpcAsyncio),
            other => Err(ClientError::InvalidArgument(format!(
                "unknown transport `{other}`, expected one of: rest, grpc, grpc_asyncio"
            ))),
        }
    }
}

/// Bearer credentials used instead of (or alongside) an API key.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    /// OAuth2 access token sent as `Authorization: Bearer`.
    pub token: SecretString,

    /// Project billed for quota, sent as `x-goog-user-project`.
    #[serde(default)]
    pub quota_project_id: Option<String>,
}

impl Credentials {
    pub fn new(token: impl Into<SecretString>) -> Self {
        Self {
            token: token.into(),
            quota_project_id: None,
        }
    }

    pub fn with_quota_project(mut self, project: impl Into<String>) -> Self {
        self.quota_project_id = Some(project.into());
        self
    }
}

/// Endpoint selection and authentication knobs.
///
/// Derives `Deserialize` so a JSON object such as
/// `{"api_endpoint": "localhost:8080", "api_key": "..."}` can be used
/// wherever a typed value is expected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientOptions {
    /// Host (optionally with scheme) serving the API.
    #[serde(default)]
    pub api_endpoint: Option<String>,

    /// API key sent with every request.
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Project billed for quota when no credentials override it.
    #[serde(default)]
    pub quota_project_id: Option<String>,
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<SecretString>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_quota_project(mut self, project: impl Into<String>) -> Self {
        self.quota_project_id = Some(project.into());
        self
    }

    /// The API key, if one is set and non-empty.
    pub fn api_key(&self) -> Option<&SecretString> {
        self.api_key.as_ref().filter(|key| !key.is_empty())
    }
}

/// Identification of the calling library, sent as request headers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientInfo {
    /// Full user-agent string.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl ClientInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Append `tag` to the existing user agent, or make it the only value.
    pub fn append_user_agent(&mut self, tag: &str) {
        self.user_agent = match self.user_agent.take() {
            Some(existing) if !existing.is_empty() => Some(format!("{existing} {tag}")),
            _ => Some(tag.to_string()),
        };
    }
}
