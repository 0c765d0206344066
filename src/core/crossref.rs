//! Crossref works API client.
//!
//! API: https://api.crossref.org/works/{doi}

use crate::domain::model::WorkMetadata;
use crate::domain::ports::MetadataProvider;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_API_ENDPOINT: &str = "https://api.crossref.org/works";
const USER_AGENT: &str = concat!("ref-matcher/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct WorkResponse {
    message: WorkMessage,
}

#[derive(Debug, Deserialize)]
struct WorkMessage {
    title: Option<Vec<String>>,
    author: Option<Vec<AuthorRecord>>,
}

#[derive(Debug, Deserialize)]
struct AuthorRecord {
    family: Option<String>,
    name: Option<String>,
    #[serde(flatten)]
    other: serde_json::Map<String, serde_json::Value>,
}

pub struct CrossrefClient {
    client: Client,
    endpoint: String,
}

impl CrossrefClient {
    pub fn new(endpoint: impl Into<String>, mailto: Option<&str>) -> Result<Self> {
        // 帶 mailto 的 User-Agent 會進入 Crossref polite pool
        let user_agent = match mailto {
            Some(mail) => format!("{} (mailto:{})", USER_AGENT, mail),
            None => USER_AGENT.to_string(),
        };
        let client = Client::builder().user_agent(user_agent).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    fn work_url(&self, doi: &str) -> String {
        format!("{}/{}", self.endpoint, doi.trim())
    }
}

/// Extracts title and first author from a works response body.
///
/// A missing (or empty) `title` or `author` list yields an empty string. The
/// first author's `family` name wins over `name`; an author with neither is
/// an error.
pub fn parse_work(doi: &str, body: &str) -> Result<WorkMetadata> {
    let response: WorkResponse = serde_json::from_str(body)?;
    let message = response.message;

    let title = message
        .title
        .and_then(|titles| titles.into_iter().next())
        .unwrap_or_default();

    let first_author = match message.author.and_then(|authors| authors.into_iter().next()) {
        None => String::new(),
        Some(AuthorRecord {
            family: Some(family),
            ..
        }) => family,
        Some(AuthorRecord {
            family: None,
            name: Some(name),
            other,
        }) => {
            tracing::warn!(
                doi = %doi,
                name = %name,
                record = %serde_json::Value::Object(other),
                "First author has no family name, using full name"
            );
            name
        }
        Some(AuthorRecord {
            family: None,
            name: None,
            other,
        }) => {
            return Err(EtlError::MetadataError {
                doi: doi.to_string(),
                message: format!(
                    "first author has neither 'family' nor 'name': {}",
                    serde_json::Value::Object(other)
                ),
            })
        }
    };

    Ok(WorkMetadata {
        title,
        first_author,
    })
}

#[async_trait]
impl MetadataProvider for CrossrefClient {
    async fn fetch(&self, doi: &str) -> Result<WorkMetadata> {
        // 空 DOI 會打到 works 列表端點
        if doi.trim().is_empty() {
            return Err(EtlError::MetadataError {
                doi: doi.to_string(),
                message: "empty DOI".to_string(),
            });
        }

        let url = self.work_url(doi);
        tracing::debug!("Making API request to: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(EtlError::ApiStatusError {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        parse_work(doi, &body)
    }
}
