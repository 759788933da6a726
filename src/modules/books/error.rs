use leeslog_db::StoreError;
use leeslog_http::error::AppError;
use serde_json::json;

use super::catalog::CatalogError;

/// Shown to the user when a title cannot be resolved to a product page.
pub const BOOK_NOT_FOUND_MESSAGE: &str = "❌ Kan geen boek met deze titel vinden";

#[derive(Debug, thiserror::Error)]
pub enum BooksError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid book: {message}")]
    Validation {
        message: String,
        fields: Vec<&'static str>,
    },

    #[error("no book titled '{0}'")]
    NotFound(String),
}

impl BooksError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn missing_fields(fields: Vec<&'static str>) -> Self {
        Self::Validation {
            message: format!("missing required fields: {}", fields.join(", ")),
            fields,
        }
    }
}

impl From<BooksError> for AppError {
    fn from(err: BooksError) -> Self {
        match err {
            BooksError::Catalog(
                e @ (CatalogError::NoResults { .. } | CatalogError::Extraction(_)),
            ) => {
                tracing::info!(error = %e, "catalog lookup found no book");
                AppError::not_found_as("book_not_found", BOOK_NOT_FOUND_MESSAGE)
            }
            BooksError::Catalog(e @ (CatalogError::Fetch { .. } | CatalogError::Status { .. })) => {
                AppError::upstream(format!("catalog unavailable: {e}"))
            }
            BooksError::Catalog(e) => AppError::Internal(e.into()),
            BooksError::Store(e) => AppError::upstream(format!("record store failed: {e}")),
            BooksError::Validation { message, fields } => AppError::validation(
                fields
                    .into_iter()
                    .map(|field| json!({ "field": field, "error": "required" }))
                    .collect(),
                message,
            ),
            BooksError::NotFound(title) => AppError::not_found(format!("no book titled '{title}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::catalog::ExtractError;
    use axum::http::StatusCode;

    #[test]
    fn lookup_failures_map_to_book_not_found() {
        let no_results = AppError::from(BooksError::from(CatalogError::NoResults {
            query: "onbekend".into(),
        }));
        assert_eq!(no_results.status(), StatusCode::NOT_FOUND);
        assert_eq!(no_results.public_message(), BOOK_NOT_FOUND_MESSAGE);

        let extraction = AppError::from(BooksError::from(CatalogError::from(
            ExtractError::MissingSpec("Categorieën"),
        )));
        assert_eq!(extraction.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn upstream_failures_map_to_bad_gateway() {
        let status = AppError::from(BooksError::from(CatalogError::Status {
            url: "https://www.bol.com/".into(),
            status: 503,
        }));
        assert_eq!(status.status(), StatusCode::BAD_GATEWAY);

        let store = AppError::from(BooksError::from(StoreError::Status {
            status: 401,
            body: "unauthorized".into(),
        }));
        assert_eq!(store.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn validation_lists_fields() {
        let err = AppError::from(BooksError::missing_fields(vec!["title", "author"]));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        match err {
            AppError::Validation { details, .. } => assert_eq!(details.len(), 2),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn unknown_title_is_not_found() {
        let err = AppError::from(BooksError::NotFound("Dune".into()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
