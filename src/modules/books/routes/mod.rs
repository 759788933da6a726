//! HTTP surface of the books module: a JSON API and the server-rendered pages.

use std::sync::Arc;

use super::service::BookService;

pub mod api;
pub mod pages;
mod views;

pub type SharedService = Arc<BookService>;
