//! Corpus management helpers.
//!
//! Every function takes an optional client and otherwise falls back to the
//! process-wide default retriever client.

use futures::stream::{self, Stream, TryStreamExt};
use std::sync::Arc;

use crate::blocking::BlockingClient;
use crate::client::{ClientError, RetrieverService};
use crate::manager::{get_default_retriever_async_client, get_default_retriever_client};
use crate::metadata::Metadata;
use crate::model::{
    Corpus, CreateCorpusRequest, DeleteCorpusRequest, GetCorpusRequest, ListCorporaRequest,
};

const CORPUS_PREFIX: &str = "corpora/";
const MAX_NAME_LENGTH: usize = 40;

/// Corpus ids are lowercase alphanumerics and dashes, must not start or end
/// with a dash, and are fewer than 40 characters long.
pub fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() < MAX_NAME_LENGTH
        && !name.starts_with('-')
        && !name.ends_with('-')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn create_request(
    name: &str,
    display_name: Option<&str>,
) -> Result<CreateCorpusRequest, ClientError> {
    if !valid_name(name) {
        return Err(ClientError::InvalidArgument(format!(
            "invalid corpus name `{name}` (length {}): use lowercase letters, digits and dashes, \
             not starting or ending with a dash, fewer than {MAX_NAME_LENGTH} characters",
            name.len()
        )));
    }
    Ok(CreateCorpusRequest {
        corpus: Corpus {
            name: format!("{CORPUS_PREFIX}{name}"),
            display_name: display_name.map(str::to_string),
            ..Corpus::default()
        },
    })
}

/// Create `corpora/{name}`.
pub async fn create_corpus(
    name: &str,
    display_name: Option<&str>,
    client: Option<Arc<dyn RetrieverService>>,
) -> Result<Corpus, ClientError> {
    let request = create_request(name, display_name)?;
    let client = match client {
        Some(client) => client,
        None => get_default_retriever_async_client()?,
    };
    client.create_corpus(request, Metadata::default()).await
}

/// Fetch a corpus by its full resource name, e.g. `corpora/my-corpus`.
pub async fn get_corpus(
    name: &str,
    client: Option<Arc<dyn RetrieverService>>,
) -> Result<Corpus, ClientError> {
    let client = match client {
        Some(client) => client,
        None => get_default_retriever_async_client()?,
    };
    let request = GetCorpusRequest {
        name: name.to_string(),
    };
    client.get_corpus(request, Metadata::default()).await
}

/// Delete a corpus. With `force`, its documents and chunks go too.
pub async fn delete_corpus(
    name: &str,
    force: bool,
    client: Option<Arc<dyn RetrieverService>>,
) -> Result<(), ClientError> {
    let client = match client {
        Some(client) => client,
        None => get_default_retriever_async_client()?,
    };
    let request = DeleteCorpusRequest {
        name: name.to_string(),
        force,
    };
    client.delete_corpus(request, Metadata::default()).await
}

/// Every corpus the caller owns, following page tokens lazily.
pub fn list_corpora(
    page_size: Option<u32>,
    client: Option<Arc<dyn RetrieverService>>,
) -> Result<impl Stream<Item = Result<Corpus, ClientError>> + Send, ClientError> {
    let client = match client {
        Some(client) => client,
        None => get_default_retriever_async_client()?,
    };

    // `None` once the last page has been fetched.
    let pages = stream::try_unfold(Some(None::<String>), move |state| {
        let client = client.clone();
        async move {
            let Some(page_token) = state else {
                return Ok(None);
            };
            let response = client
                .list_corpora(
                    ListCorporaRequest {
                        page_size,
                        page_token,
                    },
                    Metadata::default(),
                )
                .await?;
            let next = response.next_page_token.filter(|t| !t.is_empty()).map(Some);
            Ok::<_, ClientError>(Some((response.corpora, next)))
        }
    });

    Ok(pages
        .map_ok(|corpora| stream::iter(corpora.into_iter().map(Ok)))
        .try_flatten())
}

pub fn create_corpus_blocking(
    name: &str,
    display_name: Option<&str>,
    client: Option<Arc<BlockingClient<dyn RetrieverService>>>,
) -> Result<Corpus, ClientError> {
    let request = create_request(name, display_name)?;
    let client = match client {
        Some(client) => client,
        None => get_default_retriever_client()?,
    };
    client.create_corpus(request, Metadata::default())
}

pub fn get_corpus_blocking(
    name: &str,
    client: Option<Arc<BlockingClient<dyn RetrieverService>>>,
) -> Result<Corpus, ClientError> {
    let client = match client {
        Some(client) => client,
        None => get_default_retriever_client()?,
    };
    let request = GetCorpusRequest {
        name: name.to_string(),
    };
    client.get_corpus(request, Metadata::default())
}

pub fn delete_corpus_blocking(
    name: &str,
    force: bool,
    client: Option<Arc<BlockingClient<dyn RetrieverService>>>,
) -> Result<(), ClientError> {
    let client = match client {
        Some(client) => client,
        None => get_default_retriever_client()?,
    };
    let request = DeleteCorpusRequest {
        name: name.to_string(),
        force,
    };
    client.delete_corpus(request, Metadata::default())
}

/// Collects every page.
pub fn list_corpora_blocking(
    page_size: Option<u32>,
    client: Option<Arc<BlockingClient<dyn RetrieverService>>>,
) -> Result<Vec<Corpus>, ClientError> {
    let client = match client {
        Some(client) => client,
        None => get_default_retriever_client()?,
    };

    let mut corpora = Vec::new();
    let mut page_token = None;
    loop {
        let response = client.list_corpora(
            ListCorporaRequest {
                page_size,
                page_token,
            },
            Metadata::default(),
        )?;
        corpora.extend(response.corpora);
        match response.next_page_token.filter(|t| !t.is_empty()) {
            Some(token) => page_token = Some(token),
            None => return Ok(corpora),
        }
    }
}
