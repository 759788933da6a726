use std::{cmp::Reverse, sync::Arc};

use chrono::NaiveDate;
use leeslog_db::RecordStore;
use serde::Serialize;

use super::{
    catalog::Catalog,
    error::BooksError,
    models::{BookDocument, BookDraft, BookForm, BookRecord, NewBook},
    stats::{self, ReadingStats, SkippedRecord},
};
use crate::utils::parse_loose_date;

/// Everything the dashboard shows, read fresh from the store.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub books: Vec<BookRecord>,
    pub stats: ReadingStats,
    pub skipped: Vec<SkippedRecord>,
}

/// Book operations over an injected store and catalog client.
pub struct BookService {
    store: Arc<dyn RecordStore<BookDocument>>,
    catalog: Catalog,
}

impl BookService {
    pub fn new(store: Arc<dyn RecordStore<BookDocument>>, catalog: Catalog) -> Self {
        Self { store, catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Search the catalog and extract the first result.
    pub async fn lookup(&self, title: &str) -> Result<BookDraft, BooksError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(BooksError::missing_fields(vec!["title"]));
        }
        Ok(self.catalog.lookup(title).await?)
    }

    /// Persist a book and return its key. Title and author must be filled in.
    pub async fn add(&self, book: NewBook) -> Result<String, BooksError> {
        let missing = book.missing_required();
        if !missing.is_empty() {
            return Err(BooksError::missing_fields(missing));
        }

        let key = self.store.put(&BookDocument::from(&book)).await?;
        tracing::info!(%key, title = %book.title, "book stored");
        Ok(key)
    }

    pub async fn add_form(&self, form: BookForm) -> Result<String, BooksError> {
        let book = form.into_new_book().map_err(BooksError::validation)?;
        self.add(book).await
    }

    /// All stored books, newest end date first. Books with an unreadable end date go last.
    pub async fn list(&self) -> Result<Vec<BookRecord>, BooksError> {
        let mut books: Vec<BookRecord> = self
            .store
            .fetch_all()
            .await?
            .into_iter()
            .map(BookRecord::from)
            .collect();

        books.sort_by_key(|book| Reverse(parse_loose_date(&book.end_date)));
        tracing::debug!(count = books.len(), "books loaded");
        Ok(books)
    }

    /// Soft-delete the first book in list order with this title, ignoring surrounding
    /// whitespace on either side. Returns its key.
    pub async fn delete_by_title(&self, title: &str) -> Result<String, BooksError> {
        let title = title.trim();
        let key = self
            .list()
            .await?
            .into_iter()
            .find(|book| book.title.trim() == title)
            .map(|book| book.key)
            .ok_or_else(|| BooksError::NotFound(title.to_string()))?;

        self.delete_key(&key).await?;
        Ok(key)
    }

    pub async fn delete_key(&self, key: &str) -> Result<(), BooksError> {
        self.store.soft_delete(key).await?;
        tracing::info!(%key, "book expired");
        Ok(())
    }

    /// Re-read the whole store and aggregate it against `today`.
    pub async fn dashboard(&self, today: NaiveDate) -> Result<Dashboard, BooksError> {
        let books = self.list().await?;
        let (entries, skipped) = stats::coerce(&books);
        let stats = stats::aggregate(&entries, today);

        Ok(Dashboard {
            books,
            stats,
            skipped,
        })
    }
}
