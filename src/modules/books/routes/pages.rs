//! Browser pages. Every mutation answers with a redirect to `/`, which re-reads the store.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use chrono::Local;
use leeslog_http::error::AppError;
use maud::Markup;

use super::{views, SharedService};
use crate::modules::books::{
    error::BooksError,
    models::{BookForm, DeleteForm, LookupQuery},
};

pub fn router(service: SharedService) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/lookup", get(lookup))
        .route("/books", post(store_book))
        .route("/books/manual", post(store_book))
        .route("/books/delete", post(delete))
        .with_state(service)
}

/// An [`AppError`] rendered as an HTML page with the same status.
pub struct PageError(AppError);

impl From<BooksError> for PageError {
    fn from(err: BooksError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        if let AppError::Internal(e) = &self.0 {
            tracing::error!(error = %e, "page failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self.0, "page failed");
        }
        (status, views::error_page(&self.0.public_message())).into_response()
    }
}

async fn dashboard(State(service): State<SharedService>) -> Result<Markup, PageError> {
    let data = service.dashboard(Local::now().date_naive()).await?;
    Ok(views::dashboard(&data))
}

async fn lookup(
    State(service): State<SharedService>,
    Query(query): Query<LookupQuery>,
) -> Result<Markup, PageError> {
    let draft = service.lookup(&query.title).await?;
    Ok(views::review(&draft, Local::now().date_naive()))
}

/// Both the reviewed lookup draft and the manual entry post the same form shape.
async fn store_book(
    State(service): State<SharedService>,
    Form(form): Form<BookForm>,
) -> Result<Redirect, PageError> {
    service.add_form(form).await?;
    Ok(Redirect::to("/"))
}

async fn delete(
    State(service): State<SharedService>,
    Form(form): Form<DeleteForm>,
) -> Result<Redirect, PageError> {
    service.delete_by_title(&form.title).await?;
    Ok(Redirect::to("/"))
}
