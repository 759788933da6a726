//! Record store adapters.
//!
//! The store is a flat collection of JSON documents. It assigns a `key` on
//! insert and drops documents whose `__expires` timestamp has passed, which
//! is how records are deleted: [`RecordStore::soft_delete`] sets the expiry to
//! now and leaves the actual removal to the store.

use std::sync::Arc;

use async_trait::async_trait;
use leeslog_kernel::settings::{StoreBackend, StoreSettings};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

mod deta;
mod memory;

pub use deta::DetaBase;
pub use memory::MemoryStore;

/// Document field holding the store-assigned identifier.
pub const KEY_FIELD: &str = "key";
/// Document field holding the unix timestamp after which the store reaps it.
pub const EXPIRES_FIELD: &str = "__expires";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("store responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode stored document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("store did not return a key for the new document")]
    MissingKey,

    #[error("store configuration: {0}")]
    Config(String),
}

/// A document together with the key the store assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Stored<T> {
    pub key: String,
    pub item: T,
}

impl<T: DeserializeOwned> Stored<T> {
    /// Split a raw store document into its key and typed body.
    /// Store bookkeeping fields are removed before decoding the body.
    pub fn from_document(mut document: Map<String, Value>) -> Result<Self, StoreError> {
        let key = match document.remove(KEY_FIELD) {
            Some(Value::String(key)) => key,
            Some(other) => other.to_string(),
            None => return Err(StoreError::MissingKey),
        };
        document.remove(EXPIRES_FIELD);

        let item = serde_json::from_value(Value::Object(document))?;
        Ok(Self { key, item })
    }
}

/// Serialize an item into a document body. Only JSON objects can be stored.
pub(crate) fn to_document<T: Serialize>(item: &T) -> Result<Map<String, Value>, StoreError> {
    match serde_json::to_value(item)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Config(format!(
            "only objects can be stored, got {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Put / fetch / soft-delete over one collection of `T` documents.
#[async_trait]
pub trait RecordStore<T>: Send + Sync
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Insert a new document and return the key the store assigned.
    async fn put(&self, item: &T) -> Result<String, StoreError>;

    /// Every live document, in no particular order.
    async fn fetch_all(&self) -> Result<Vec<Stored<T>>, StoreError>;

    /// Mark the document as expired now. The store removes it on its own schedule.
    async fn soft_delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Build the store selected in settings.
pub fn from_settings<T>(settings: &StoreSettings) -> Result<Arc<dyn RecordStore<T>>, StoreError>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    match settings.backend {
        StoreBackend::Deta => {
            let key = settings
                .data_key()
                .map_err(|e| StoreError::Config(e.to_string()))?;
            let store = DetaBase::new(&settings.endpoint, key, &settings.base)?;
            tracing::info!(
                target: "leeslog-db",
                base = %settings.base,
                "using deta base store"
            );
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!(
                target: "leeslog-db",
                "using in-memory store; records are lost on restart"
            );
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
