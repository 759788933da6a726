use std::fmt;

use chrono::NaiveDate;
use leeslog_db::Stored;
use serde::{Deserialize, Serialize};

/// Cover shown when the catalog has no usable image.
pub const PLACEHOLDER_COVER_URL: &str = "https://i.postimg.cc/bvWVrnfN/no-image.png";

/// Rating given to a freshly scraped draft, replaced by the user's choice on submit.
pub const PLACEHOLDER_RATING: Rating = Rating(5);

/// Start and end date of a freshly scraped draft, replaced by the user's dates on submit.
pub const PLACEHOLDER_DATE: &str = "18-11-2000";

/// Star rating from 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(stars: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&stars).then_some(Self(stars))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Accepts a star string (`⭐⭐⭐`) or a digit string (`3`).
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Ok(stars) = text.parse::<u8>() {
            return Self::new(stars);
        }
        let count = text.matches('⭐').count();
        if count == 0 || !text.chars().all(|c| c == '⭐' || c == '\u{fe0f}') {
            return None;
        }
        u8::try_from(count).ok().and_then(Self::new)
    }

    pub fn stars(self) -> String {
        "⭐".repeat(usize::from(self.0))
    }

    pub fn all() -> impl Iterator<Item = Rating> {
        (Self::MIN..=Self::MAX).map(Rating)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stars())
    }
}

impl TryFrom<u8> for Rating {
    type Error = String;

    fn try_from(stars: u8) -> Result<Self, Self::Error> {
        Rating::new(stars).ok_or_else(|| format!("rating must be between 1 and 5, got {stars}"))
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// A book ready to be stored. The store assigns its key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub rating: Rating,
    pub language: String,
    pub start_date: String,
    pub end_date: String,
    pub genre: String,
    pub release_date: String,
    pub pages: String,
    #[serde(default)]
    pub cover_url: Option<String>,
}

impl NewBook {
    /// Names of required fields that are blank.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.author.trim().is_empty() {
            missing.push("author");
        }
        missing
    }
}

/// Result of a catalog lookup: a book with placeholder rating and dates. The review
/// form posts it back as a [`BookForm`] carrying the user's rating and dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookDraft {
    pub book: NewBook,
    pub source_url: String,
}

impl BookDraft {
    pub fn cover_url(&self) -> &str {
        self.book.cover_url.as_deref().unwrap_or(PLACEHOLDER_COVER_URL)
    }
}

/// Form body for storing a book, used both by the review form after a lookup
/// and by manual entry.
#[derive(Debug, Clone, Deserialize)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub rating: u8,
    #[serde(default)]
    pub language: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub pages: String,
    #[serde(default)]
    pub cover_url: Option<String>,
}

impl BookForm {
    pub fn into_new_book(self) -> Result<NewBook, String> {
        let rating = Rating::try_from(self.rating)?;
        Ok(NewBook {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            rating,
            language: self.language.trim().to_string(),
            start_date: self.start_date.to_string(),
            end_date: self.end_date.to_string(),
            genre: self.genre.trim().to_string(),
            release_date: self.release_date.trim().to_string(),
            pages: self.pages.trim().to_string(),
            cover_url: self
                .cover_url
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteForm {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupQuery {
    #[serde(default)]
    pub title: String,
}

/// Stored shape of a book. Field names match the documents already in the `boeken` base.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookDocument {
    #[serde(rename = "Naam")]
    pub title: String,
    #[serde(rename = "Auteur")]
    pub author: String,
    #[serde(rename = "Sterren")]
    pub rating: String,
    #[serde(rename = "Taal")]
    pub language: String,
    #[serde(rename = "Begin Datum")]
    pub start_date: String,
    #[serde(rename = "Eind datum")]
    pub end_date: String,
    #[serde(rename = "Genre")]
    pub genre: String,
    #[serde(rename = "Uitgeef datum")]
    pub release_date: String,
    #[serde(rename = "Aantal Paginas")]
    pub pages: String,
    #[serde(rename = "Afbeelding", skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
}

impl From<&NewBook> for BookDocument {
    fn from(book: &NewBook) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            rating: book.rating.stars(),
            language: book.language.clone(),
            start_date: book.start_date.clone(),
            end_date: book.end_date.clone(),
            genre: book.genre.clone(),
            release_date: book.release_date.clone(),
            pages: book.pages.clone(),
            cover_url: book.cover_url.clone(),
        }
    }
}

/// A stored book as the rest of the app sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookRecord {
    pub key: String,
    pub title: String,
    pub author: String,
    /// `None` when the stored value is not a recognizable rating.
    pub rating: Option<Rating>,
    pub language: String,
    pub start_date: String,
    pub end_date: String,
    pub genre: String,
    pub release_date: String,
    pub pages: String,
    pub cover_url: Option<String>,
}

impl BookRecord {
    pub fn rating_label(&self) -> String {
        self.rating.map(Rating::stars).unwrap_or_else(|| "-".to_string())
    }
}

impl From<Stored<BookDocument>> for BookRecord {
    fn from(stored: Stored<BookDocument>) -> Self {
        let doc = stored.item;
        Self {
            key: stored.key,
            rating: Rating::parse(&doc.rating),
            title: doc.title,
            author: doc.author,
            language: doc.language,
            start_date: doc.start_date,
            end_date: doc.end_date,
            genre: doc.genre,
            release_date: doc.release_date,
            pages: doc.pages,
            cover_url: doc.cover_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_book() -> NewBook {
        NewBook {
            title: "De avond is ongemak".into(),
            author: "Marieke Lucas Rijneveld".into(),
            rating: Rating::new(4).unwrap(),
            language: "Nederlands".into(),
            start_date: "2024-01-02".into(),
            end_date: "2024-01-20".into(),
            genre: "Literatuur & Romans".into(),
            release_date: "2018-08-29".into(),
            pages: "272".into(),
            cover_url: None,
        }
    }

    #[test]
    fn rating_bounds() {
        assert!(Rating::new(0).is_none());
        assert!(Rating::new(6).is_none());
        assert_eq!(Rating::new(3).unwrap().get(), 3);
        assert_eq!(Rating::all().count(), 5);
    }

    #[test]
    fn rating_parses_stars_and_digits() {
        assert_eq!(Rating::parse("⭐⭐⭐⭐"), Rating::new(4));
        assert_eq!(Rating::parse("5"), Rating::new(5));
        assert_eq!(Rating::parse("⭐️⭐️"), Rating::new(2));
        assert_eq!(Rating::parse(""), None);
        assert_eq!(Rating::parse("goed"), None);
        assert_eq!(Rating::parse("⭐⭐⭐⭐⭐⭐"), None);
    }

    #[test]
    fn rating_displays_as_stars() {
        assert_eq!(Rating::new(2).unwrap().to_string(), "⭐⭐");
    }

    #[test]
    fn document_uses_stored_field_names() {
        let doc = BookDocument::from(&sample_book());
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["Naam"], "De avond is ongemak");
        assert_eq!(value["Sterren"], "⭐⭐⭐⭐");
        assert_eq!(value["Eind datum"], "2024-01-20");
        assert_eq!(value["Aantal Paginas"], "272");
        assert!(value.get("Afbeelding").is_none());
    }

    #[test]
    fn legacy_document_without_cover_loads() {
        let doc: BookDocument = serde_json::from_value(json!({
            "Naam": "Oud boek",
            "Auteur": "Iemand",
            "Sterren": "5",
            "Taal": "Engels",
            "Begin Datum": "2022-01-01",
            "Eind datum": "2022-02-01",
            "Genre": "Thrillers",
            "Uitgeef datum": "2001",
            "Aantal Paginas": "300"
        }))
        .unwrap();

        let record = BookRecord::from(Stored {
            key: "abc".into(),
            item: doc,
        });
        assert_eq!(record.key, "abc");
        assert_eq!(record.rating, Rating::new(5));
        assert_eq!(record.cover_url, None);
    }

    #[test]
    fn form_rejects_out_of_range_rating() {
        let form = BookForm {
            title: "T".into(),
            author: "A".into(),
            rating: 9,
            language: String::new(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            genre: String::new(),
            release_date: String::new(),
            pages: "10".into(),
            cover_url: Some("  ".into()),
        };
        assert!(form.into_new_book().is_err());
    }

    #[test]
    fn missing_required_lists_blank_title_and_author() {
        let mut book = sample_book();
        book.title = "  ".into();
        book.author = String::new();
        assert_eq!(book.missing_required(), vec!["title", "author"]);
        assert!(sample_book().missing_required().is_empty());
    }
}
