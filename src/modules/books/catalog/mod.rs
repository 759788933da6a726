//! bol.com catalog client: title search and product page extraction.

pub mod extract;
pub mod search;

use std::time::Duration;

use leeslog_kernel::settings::CatalogSettings;
use reqwest::{header, Client};
use url::Url;

pub use extract::{BookPageParser, ExtractError};
pub use search::SearchResultParser;

use super::models::BookDraft;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid selector {0}")]
    Selector(String),

    #[error("invalid catalog url: {0}")]
    Url(#[from] url::ParseError),

    #[error("could not build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },

    #[error("no search results for '{query}'")]
    NoResults { query: String },

    #[error(transparent)]
    Extraction(#[from] ExtractError),
}

/// Client for the catalog site. Selectors are compiled once at construction.
#[derive(Debug, Clone)]
pub struct Catalog {
    client: Client,
    base_url: Url,
    results: SearchResultParser,
    product: BookPageParser,
}

impl Catalog {
    pub fn new(settings: &CatalogSettings) -> Result<Self, CatalogError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static("nl-NL,nl;q=0.9"),
        );

        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(CatalogError::Client)?;

        Ok(Self {
            client,
            base_url: Url::parse(&settings.base_url)?,
            results: SearchResultParser::new()?,
            product: BookPageParser::new()?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Product links for a title, in the order the site lists them.
    pub async fn search(&self, title: &str) -> Result<Vec<Url>, CatalogError> {
        let url = search::search_url(&self.base_url, title)?;
        let html = self.get_text(&url).await?;
        let links = self.results.parse(&html, &self.base_url);

        tracing::info!(query = title, results = links.len(), "catalog search finished");
        Ok(links)
    }

    /// Fetch and parse one product page.
    pub async fn fetch_book(&self, url: &Url) -> Result<BookDraft, CatalogError> {
        let html = self.get_text(url).await?;
        let draft = self.product.parse(&html, url.as_str())?;
        Ok(draft)
    }

    /// Search for a title and extract the first result. No ranking is applied.
    pub async fn lookup(&self, title: &str) -> Result<BookDraft, CatalogError> {
        let links = self.search(title).await?;
        let first = links.first().ok_or_else(|| CatalogError::NoResults {
            query: title.to_string(),
        })?;
        self.fetch_book(first).await
    }

    async fn get_text(&self, url: &Url) -> Result<String, CatalogError> {
        tracing::debug!(%url, "fetching catalog page");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| CatalogError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| CatalogError::Fetch {
            url: url.to_string(),
            source,
        })
    }
}
