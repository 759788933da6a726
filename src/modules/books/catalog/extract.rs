//! Product page parsing.
//!
//! bol.com product pages carry a title span and a flat list of specification
//! `dt`/`dd` pairs. The same label can appear in more than one spec section;
//! the value of the last occurrence is the one that is kept.

use std::collections::HashMap;

use scraper::{ElementRef, Html, Selector};

use super::CatalogError;
use crate::modules::books::models::{
    BookDraft, NewBook, PLACEHOLDER_COVER_URL, PLACEHOLDER_DATE, PLACEHOLDER_RATING,
};

pub const AUTHOR_LABEL: &str = "Hoofdauteur";
pub const LANGUAGE_LABEL: &str = "Taal";
pub const GENRE_LABEL: &str = "Categorieën";
pub const RELEASE_DATE_LABEL: &str = "Oorspronkelijke releasedatum";
pub const PAGES_LABEL: &str = "Aantal pagina's";

/// Marks catalog images that are themselves a "no image" graphic.
const NO_IMAGE_SENTINEL: &str = "noimage_";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("page has no product title")]
    MissingTitle,

    #[error("page has no `{0}` specification")]
    MissingSpec(&'static str),
}

/// Parser for bol.com product pages
#[derive(Debug, Clone)]
pub struct BookPageParser {
    main_content: Selector,
    cover_image: Selector,
    zoom_image: Selector,
    title: Selector,
    spec_title: Selector,
    spec_value: Selector,
}

impl BookPageParser {
    pub fn new() -> Result<Self, CatalogError> {
        Ok(Self {
            main_content: compile("#mainContent")?,
            cover_image: compile("img.book__cover-image")?,
            zoom_image: compile("img#image-zoom-modal-selected-image")?,
            title: compile(r#"span[data-test="title"]"#)?,
            spec_title: compile("dt.specs__title")?,
            spec_value: compile("dd.specs__value")?,
        })
    }

    /// Turn a product page into a draft with placeholder rating and dates.
    pub fn parse(&self, html: &str, source_url: &str) -> Result<BookDraft, ExtractError> {
        let document = Html::parse_document(html);
        let content = document
            .select(&self.main_content)
            .next()
            .unwrap_or_else(|| document.root_element());

        let title = document
            .select(&self.title)
            .next()
            .map(element_text)
            .filter(|title| !title.is_empty())
            .ok_or(ExtractError::MissingTitle)?;

        let cover_url = self.cover_url(content);
        let specs = self.specifications(content);
        let spec = |label: &'static str| {
            specs
                .get(label)
                .cloned()
                .ok_or(ExtractError::MissingSpec(label))
        };

        let author = spec(AUTHOR_LABEL)?;
        let language = spec(LANGUAGE_LABEL)?;
        let genre = first_line(&spec(GENRE_LABEL)?);
        let release_date = spec(RELEASE_DATE_LABEL)?;
        let pages = spec(PAGES_LABEL)?;

        tracing::debug!(%title, %author, url = source_url, "product page parsed");

        Ok(BookDraft {
            book: NewBook {
                title,
                author,
                rating: PLACEHOLDER_RATING,
                language,
                start_date: PLACEHOLDER_DATE.to_string(),
                end_date: PLACEHOLDER_DATE.to_string(),
                genre,
                release_date,
                pages,
                cover_url: Some(cover_url),
            },
            source_url: source_url.to_string(),
        })
    }

    /// Label → value of every specification pair. Later duplicates overwrite earlier ones.
    pub fn specifications(&self, content: ElementRef<'_>) -> HashMap<String, String> {
        content
            .select(&self.spec_title)
            .zip(content.select(&self.spec_value))
            .map(|(label, value)| (element_text(label), element_text(value)))
            .collect()
    }

    fn cover_url(&self, content: ElementRef<'_>) -> String {
        let found = first_src(content, &self.cover_image)
            .or_else(|| first_src(content, &self.zoom_image));

        match found {
            Some(url) if !url.contains(NO_IMAGE_SENTINEL) => url.to_string(),
            _ => PLACEHOLDER_COVER_URL.to_string(),
        }
    }
}

pub(super) fn compile(selector: &str) -> Result<Selector, CatalogError> {
    Selector::parse(selector).map_err(|e| CatalogError::Selector(format!("'{selector}': {e}")))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn first_src<'a>(content: ElementRef<'a>, selector: &Selector) -> Option<&'a str> {
    content
        .select(selector)
        .find_map(|img| img.value().attr("src"))
        .filter(|src| !src.trim().is_empty())
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or_default().trim().to_string()
}
