use std::sync::Mutex;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::{to_document, RecordStore, StoreError, Stored, EXPIRES_FIELD, KEY_FIELD};

/// In-process store keeping documents as JSON, with the same expiry semantics as Deta Base.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<Vec<Map<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop documents whose expiry is at or before `now`.
    fn reap(documents: &mut Vec<Map<String, Value>>, now: i64) -> usize {
        let before = documents.len();
        documents.retain(|doc| match doc.get(EXPIRES_FIELD).and_then(Value::as_i64) {
            Some(expires_at) => expires_at > now,
            None => true,
        });
        before - documents.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Map<String, Value>>> {
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl<T> RecordStore<T> for MemoryStore
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn put(&self, item: &T) -> Result<String, StoreError> {
        let mut document = to_document(item)?;
        let key = uuid::Uuid::new_v4().simple().to_string();
        document.insert(KEY_FIELD.to_string(), Value::String(key.clone()));

        self.lock().push(document);
        Ok(key)
    }

    async fn fetch_all(&self) -> Result<Vec<Stored<T>>, StoreError> {
        let mut documents = self.lock();
        let reaped = Self::reap(&mut documents, chrono::Utc::now().timestamp());
        if reaped > 0 {
            tracing::debug!(target: "leeslog-db", reaped, "expired documents removed");
        }

        documents
            .iter()
            .cloned()
            .map(Stored::from_document)
            .collect()
    }

    async fn soft_delete(&self, key: &str) -> Result<(), StoreError> {
        let now = chrono::Utc::now().timestamp();
        let mut documents = self.lock();

        // Deta accepts updates to unknown keys silently; mirror that.
        if let Some(document) = documents
            .iter_mut()
            .find(|doc| doc.get(KEY_FIELD).and_then(Value::as_str) == Some(key))
        {
            document.insert(EXPIRES_FIELD.to_string(), Value::from(now));
        }
        Ok(())
    }
}
