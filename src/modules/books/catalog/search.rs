use scraper::{Html, Selector};
use url::{form_urlencoded, Url};

use super::{extract::compile, CatalogError};

const SEARCH_PATH: &str = "/nl/nl/s/";

/// Product links in a search result list. Sponsored tiles lack the tracking classes.
const RESULT_LINK: &str =
    "a.product-title.px_list_page_product_click.list_page_product_tracking_target";

/// Lowercase the title and form-encode it, so spaces become `+`.
pub fn normalize_query(title: &str) -> String {
    form_urlencoded::byte_serialize(title.trim().to_lowercase().as_bytes()).collect()
}

/// Search endpoint for a title, first result page only.
pub fn search_url(base_url: &Url, title: &str) -> Result<Url, CatalogError> {
    let mut url = base_url.join(SEARCH_PATH)?;
    url.set_query(Some(&format!(
        "page=1&searchtext={}",
        normalize_query(title)
    )));
    Ok(url)
}

/// Parser for bol.com search result pages
#[derive(Debug, Clone)]
pub struct SearchResultParser {
    result_link: Selector,
}

impl SearchResultParser {
    pub fn new() -> Result<Self, CatalogError> {
        Ok(Self {
            result_link: compile(RESULT_LINK)?,
        })
    }

    /// Result links in page order, resolved against `base_url`. Unresolvable hrefs are skipped.
    pub fn parse(&self, html: &str, base_url: &Url) -> Vec<Url> {
        let document = Html::parse_document(html);
        document
            .select(&self.result_link)
            .filter_map(|link| link.value().attr("href"))
            .filter_map(|href| match base_url.join(href.trim()) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!(href, error = %e, "skipping unresolvable search result");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = include_str!("../../../../tests/fixtures/search_results.html");
    const EMPTY_PAGE: &str = include_str!("../../../../tests/fixtures/search_empty.html");

    fn base() -> Url {
        Url::parse("https://www.bol.com").unwrap()
    }

    #[test]
    fn query_is_lowercased_with_plus_for_spaces() {
        assert_eq!(normalize_query("De Avond Is Ongemak"), "de+avond+is+ongemak");
        assert_eq!(normalize_query("  Dune  "), "dune");
        assert_eq!(normalize_query("Tom & Jerry"), "tom+%26+jerry");
    }

    #[test]
    fn search_url_targets_first_result_page() {
        let url = search_url(&base(), "Mijn Lieve Gunsteling").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.bol.com/nl/nl/s/?page=1&searchtext=mijn+lieve+gunsteling"
        );
    }

    #[test]
    fn results_keep_page_order_and_skip_sponsored_tiles() {
        let links = SearchResultParser::new().unwrap().parse(RESULTS_PAGE, &base());
        let links: Vec<&str> = links.iter().map(Url::as_str).collect();
        assert_eq!(
            links,
            vec![
                "https://www.bol.com/nl/nl/p/de-avond-is-ongemak/9200000090372431/",
                "https://www.bol.com/nl/nl/p/mijn-lieve-gunsteling/9200000112059155/",
            ]
        );
    }

    #[test]
    fn empty_result_page_yields_no_links() {
        let links = SearchResultParser::new().unwrap().parse(EMPTY_PAGE, &base());
        assert!(links.is_empty());
    }
}
