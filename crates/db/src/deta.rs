use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::{to_document, RecordStore, StoreError, Stored, EXPIRES_FIELD};

const API_KEY_HEADER: &str = "X-API-Key";
const QUERY_PAGE_LIMIT: usize = 1000;

/// Deta Base collection accessed over its HTTP API.
#[derive(Clone)]
pub struct DetaBase {
    client: Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for DetaBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetaBase")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    #[serde(default)]
    processed: Option<ItemList>,
}

#[derive(Debug, Deserialize)]
struct ItemList {
    #[serde(default)]
    items: Vec<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    paging: Paging,
    #[serde(default)]
    items: Vec<Map<String, Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct Paging {
    #[serde(default)]
    last: Option<String>,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: [Value; 0],
    limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    last: Option<&'a str>,
}

impl DetaBase {
    /// `data_key` is the project key; its project id is the part before the first `_`.
    pub fn new(endpoint: &str, data_key: &str, base: &str) -> Result<Self, StoreError> {
        let project_id = data_key
            .split_once('_')
            .map(|(project, _)| project)
            .filter(|project| !project.is_empty())
            .ok_or_else(|| StoreError::Config("data key has no project id prefix".to_string()))?;

        if base.trim().is_empty() {
            return Err(StoreError::Config("base name is empty".to_string()));
        }

        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url: format!("{}/{}/{}", endpoint.trim_end_matches('/'), project_id, base),
            api_key: data_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl<T> RecordStore<T> for DetaBase
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn put(&self, item: &T) -> Result<String, StoreError> {
        let document = to_document(item)?;

        let response = self
            .client
            .put(format!("{}/items", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&json!({ "items": [document] }))
            .send()
            .await?;
        let body: PutResponse = Self::check(response).await?.json().await?;

        let stored = body
            .processed
            .and_then(|list| list.items.into_iter().next())
            .ok_or(StoreError::MissingKey)?;
        let key = Stored::<Value>::from_document(stored)?.key;

        tracing::debug!(target: "leeslog-db", %key, "document stored");
        Ok(key)
    }

    async fn fetch_all(&self) -> Result<Vec<Stored<T>>, StoreError> {
        let mut documents = Vec::new();
        let mut last: Option<String> = None;

        loop {
            let request = QueryRequest {
                query: [],
                limit: QUERY_PAGE_LIMIT,
                last: last.as_deref(),
            };
            let response = self
                .client
                .post(format!("{}/query", self.base_url))
                .header(API_KEY_HEADER, &self.api_key)
                .json(&request)
                .send()
                .await?;
            let page: QueryResponse = Self::check(response).await?.json().await?;

            for document in page.items {
                documents.push(Stored::from_document(document)?);
            }

            match page.paging.last {
                Some(next) if last.as_deref() != Some(next.as_str()) => last = Some(next),
                _ => break,
            }
        }

        tracing::debug!(target: "leeslog-db", count = documents.len(), "documents fetched");
        Ok(documents)
    }

    async fn soft_delete(&self, key: &str) -> Result<(), StoreError> {
        let expires_at = chrono::Utc::now().timestamp();

        let response = self
            .client
            .patch(format!("{}/items/{}", self.base_url, key))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&json!({ "set": { EXPIRES_FIELD: expires_at } }))
            .send()
            .await?;
        Self::check(response).await?;

        tracing::info!(target: "leeslog-db", %key, expires_at, "document marked expired");
        Ok(())
    }
}
