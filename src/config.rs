//! Configuration snapshot shared by every client a manager builds.

use std::sync::Arc;
use tracing::debug;

use crate::client::ClientError;
use crate::metadata::Metadata;
use crate::options::{ClientInfo, ClientOptions, Credentials, SecretString, Transport};

/// Environment variable consulted when no API key is passed explicitly.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Product name appended to every user agent.
pub const USER_AGENT: &str = "genai-rs";

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `<product>/<version>` tag identifying this library.
pub fn user_agent_tag() -> String {
    format!("{USER_AGENT}/{VERSION}")
}

/// Where the fallback API key comes from.
pub type ApiKeySource = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Read [`API_KEY_ENV`] from the process environment.
pub fn env_api_key() -> Option<String> {
    std::env::var(API_KEY_ENV).ok()
}

/// Immutable configuration snapshot. Replaced wholesale on every
/// `configure`.
///
/// `credentials` and `transport` are only present when the caller supplied
/// them, so constructors can fall back to their own defaults.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub credentials: Option<Credentials>,
    pub transport: Option<Transport>,
    pub client_options: ClientOptions,
    pub client_info: ClientInfo,
    pub default_metadata: Metadata,
}

/// Arguments to `configure`. Every field is optional.
///
/// # Example
/// ```
/// use genai::config::ConfigureOptions;
/// use genai::options::Transport;
///
/// let options = ConfigureOptions::new()
///     .with_api_key("my-key")
///     .with_transport(Transport::Rest)
///     .with_default_metadata([("x-goog-request-reason", "testing")]);
/// assert!(options.api_key.is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigureOptions {
    /// Shortcut for `client_options.api_key`. Setting both is an error.
    pub api_key: Option<String>,
    pub credentials: Option<Credentials>,
    pub transport: Option<Transport>,
    pub client_options: Option<ClientOptions>,
    pub client_info: Option<ClientInfo>,
    /// Sent with every request; over REST these become HTTP headers.
    pub default_metadata: Metadata,
}

impl ConfigureOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_client_options(mut self, client_options: ClientOptions) -> Self {
        self.client_options = Some(client_options);
        self
    }

    pub fn with_client_info(mut self, client_info: ClientInfo) -> Self {
        self.client_info = Some(client_info);
        self
    }

    pub fn with_default_metadata(mut self, metadata: impl Into<Metadata>) -> Self {
        self.default_metadata = metadata.into();
        self
    }

    /// Validate the arguments and build the snapshot.
    ///
    /// The API key comes from exactly one of: `client_options.api_key`, the
    /// explicit `api_key`, or `api_key_source`. The source is only consulted
    /// when neither of the first two is given, and an absent key there is
    /// not an error.
    pub fn resolve(self, api_key_source: &ApiKeySource) -> Result<ClientConfig, ClientError> {
        let mut client_options = self.client_options.unwrap_or_default();

        if client_options.api_key().is_some() {
            if self.api_key.is_some() {
                return Err(ClientError::ConfigurationConflict);
            }
        } else {
            let api_key = match self.api_key {
                Some(key) => Some(key),
                None => {
                    let key = api_key_source();
                    debug!(
                        found = key.is_some(),
                        env = API_KEY_ENV,
                        "No explicit API key, checked environment"
                    );
                    key
                }
            };
            client_options.api_key = api_key
                .filter(|key| !key.is_empty())
                .map(SecretString::from);
        }

        let mut client_info = self.client_info.unwrap_or_default();
        client_info.append_user_agent(&user_agent_tag());

        Ok(ClientConfig {
            credentials: self.credentials,
            transport: self.transport,
            client_options,
            client_info,
            default_metadata: self.default_metadata,
        })
    }
}
