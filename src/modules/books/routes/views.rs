//! maud templates for the browser pages.

use chrono::NaiveDate;
use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::modules::books::{
    models::{BookDraft, BookRecord, Rating},
    service::Dashboard,
    stats::{MonthBucket, Summary, TimelineBar},
};

const BAR_COLOR: &str = "#ff4b4b";
const DEFAULT_RATING: u8 = 4;
const LANGUAGES: [&str; 2] = ["Nederlands", "Engels"];
const DELTA_HINT: &str = "Verschil met dezelfde periode vorig jaar";

const CHART_WIDTH: f64 = 720.0;
const CHART_HEIGHT: f64 = 220.0;
const CHART_MARGIN: f64 = 28.0;
const GANTT_ROW: f64 = 22.0;
const GANTT_LABEL: f64 = 220.0;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; color: #262730; }
h1, h2 { font-weight: 600; }
section { margin: 2rem 0; }
form.inline { display: flex; gap: .5rem; }
form.stacked label { display: block; margin: .5rem 0 .2rem; }
input[type=text], input[type=search], select { padding: .4rem; min-width: 16rem; }
button { background: #ff4b4b; color: white; border: 0; padding: .45rem 1rem; border-radius: .3rem; cursor: pointer; }
.metrics { display: grid; grid-template-columns: repeat(4, 1fr); gap: 1rem; }
.metric .label { font-size: .85rem; color: #6b6f76; }
.metric .value { font-size: 1.8rem; }
.delta.up { color: #09ab3b; }
.delta.down { color: #ff2b2b; }
.banner { padding: .8rem 1rem; border-radius: .3rem; margin: 1rem 0; }
.banner.error { background: #ffe2e2; }
.banner.warning { background: #fff6d6; }
table { border-collapse: collapse; width: 100%; font-size: .9rem; }
th, td { border-bottom: 1px solid #e6e6e6; padding: .35rem .5rem; text-align: left; }
.review { display: flex; gap: 2rem; }
.stars label { margin-right: 1rem; }
svg text { font-size: 10px; fill: #6b6f76; }
"#;

fn layout(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="nl" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                style { (PreEscaped(STYLE)) }
            }
            body {
                h1 { a href="/" style="color: inherit; text-decoration: none;" { "Boeken" } }
                (body)
            }
        }
    }
}

pub fn dashboard(data: &Dashboard) -> Markup {
    layout(
        "Boeken",
        html! {
            (search_form(""))
            @if !data.skipped.is_empty() {
                div.banner.warning {
                    p { "⚠️ Deze boeken tellen niet mee in de statistieken:" }
                    ul {
                        @for skip in &data.skipped {
                            li { (skip.title) ": " (skip.field) " '" (skip.value) "' is onleesbaar" }
                        }
                    }
                }
            }
            (metrics(&data.stats.summary))
            (book_table(&data.books))
            section {
                h2 { "Grafieken" }
                h3 { "Aantal boeken per maand" }
                (bar_chart(&data.stats.monthly, |bucket| bucket.books))
                h3 { "Aantal pagina's per maand" }
                (bar_chart(&data.stats.monthly, |bucket| bucket.pages))
                h3 { "Tijdsduur per boek" }
                (gantt_chart(&data.stats.timeline))
            }
            (manual_form(data.stats.today))
            (delete_form(&data.books))
        },
    )
}

pub fn review(draft: &BookDraft, today: NaiveDate) -> Markup {
    let book = &draft.book;
    layout(
        &book.title,
        html! {
            (search_form(&book.title))
            form.stacked method="post" action="/books" {
                div.review {
                    img src=(draft.cover_url()) width="200" alt=(book.title);
                    div {
                        h2 { (book.title) }
                        p { "Auteur: " (book.author) }
                        p { "Aantal Paginas: " (book.pages) }
                        p { "Taal: " (book.language) }
                        p { "Release datum: " (book.release_date) }
                        p { a href=(draft.source_url) { "Bekijk op bol.com" } }
                    }
                }
                input type="hidden" name="title" value=(book.title);
                input type="hidden" name="author" value=(book.author);
                input type="hidden" name="language" value=(book.language);
                input type="hidden" name="genre" value=(book.genre);
                input type="hidden" name="release_date" value=(book.release_date);
                input type="hidden" name="pages" value=(book.pages);
                input type="hidden" name="cover_url" value=(draft.cover_url());

                p { "Hoeveel sterren geef je het boek?" }
                (rating_picker())
                (date_inputs(today))
                p { button type="submit" { "Opslaan" } }
            }
        },
    )
}

pub fn error_page(message: &str) -> Markup {
    layout(
        "Boeken",
        html! {
            (search_form(""))
            div.banner.error { (message) }
            p { a href="/" { "Terug naar het overzicht" } }
        },
    )
}

fn search_form(value: &str) -> Markup {
    html! {
        form.inline method="get" action="/lookup" {
            input type="search" name="title" value=(value) placeholder="Welk boek heb je gelezen?" required;
            button type="submit" { "Zoeken" }
        }
    }
}

fn metrics(summary: &Summary) -> Markup {
    let books_per_month = summary
        .average_books_per_month
        .map(|avg| format!("{avg:.1}"))
        .unwrap_or_else(|| "-".to_string());
    let pages_per_book = summary
        .average_pages_per_book
        .map(|avg| format!("{avg:.0}"))
        .unwrap_or_else(|| "-".to_string());

    html! {
        section.metrics {
            (metric("Totaal aantal boeken dit jaar", &format!("{} boeken", summary.books_this_year), Some(summary.books_delta)))
            (metric("Totaal aantal pagina's dit jaar", &summary.pages_this_year.to_string(), Some(summary.pages_delta)))
            (metric("Gem. aantal boeken per maand", &books_per_month, None))
            (metric("Gem. aantal pagina's per boek", &pages_per_book, None))
        }
    }
}

fn metric(label: &str, value: &str, delta: Option<i64>) -> Markup {
    html! {
        div.metric {
            div.label { (label) }
            div.value { (value) }
            @if let Some(delta) = delta {
                @if delta < 0 {
                    div.delta.down title=(DELTA_HINT) { "↓ " (delta) }
                } @else {
                    div.delta.up title=(DELTA_HINT) { "↑ +" (delta) }
                }
            }
        }
    }
}

fn book_table(books: &[BookRecord]) -> Markup {
    html! {
        section {
            table {
                thead {
                    tr {
                        th { "Naam" }
                        th { "Auteur" }
                        th { "Sterren" }
                        th { "Aantal Paginas" }
                        th { "Begin Datum" }
                        th { "Eind datum" }
                        th { "Genre" }
                        th { "Uitgeef datum" }
                        th { "Taal" }
                    }
                }
                tbody {
                    @for book in books {
                        tr {
                            td { (book.title) }
                            td { (book.author) }
                            td { (book.rating_label()) }
                            td { (book.pages) }
                            td { (book.start_date) }
                            td { (book.end_date) }
                            td { (book.genre) }
                            td { (book.release_date) }
                            td { (book.language) }
                        }
                    }
                }
            }
        }
    }
}

fn rating_picker() -> Markup {
    html! {
        div.stars {
            @for rating in Rating::all() {
                label {
                    input type="radio" name="rating" value=(rating.get()) checked[rating.get() == DEFAULT_RATING];
                    " " (rating.stars())
                }
            }
        }
    }
}

fn date_inputs(today: NaiveDate) -> Markup {
    let today = today.to_string();
    html! {
        label for="start_date" { "Begin datum" }
        input type="date" id="start_date" name="start_date" value=(today) required;
        label for="end_date" { "Eind datum" }
        input type="date" id="end_date" name="end_date" value=(today) required;
    }
}

fn manual_form(today: NaiveDate) -> Markup {
    html! {
        section {
            h2 { "Handmatige invoer" }
            details {
                summary { "Klik voor handmatige invoer" }
                form.stacked method="post" action="/books/manual" {
                    label for="manual_title" { "Titel" }
                    input type="text" id="manual_title" name="title" required;
                    label for="manual_author" { "Auteur" }
                    input type="text" id="manual_author" name="author" required;
                    p { "Aantal sterren" }
                    (rating_picker())
                    p { "Taal" }
                    @for (i, language) in LANGUAGES.iter().enumerate() {
                        label {
                            input type="radio" name="language" value=(language) checked[i == 0];
                            " " (language)
                        }
                    }
                    (date_inputs(today))
                    label for="manual_genre" { "Genre" }
                    input type="text" id="manual_genre" name="genre";
                    label for="manual_release" { "Uitgeef datum" }
                    input type="text" id="manual_release" name="release_date";
                    label for="manual_pages" { "Aantal paginas" }
                    input type="text" id="manual_pages" name="pages" inputmode="numeric";
                    p { button type="submit" { "Toevoegen" } }
                }
            }
        }
    }
}

fn delete_form(books: &[BookRecord]) -> Markup {
    html! {
        section {
            h2 { "Verwijder boeken" }
            form.inline method="post" action="/books/delete" {
                select name="title" aria-label="Welk boek wil je verwijderen" {
                    @for book in books {
                        option value=(book.title) { (book.title) }
                    }
                }
                button type="submit" disabled[books.is_empty()] { "Boek verwijderen" }
            }
        }
    }
}

fn bar_chart(buckets: &[MonthBucket], value: impl Fn(&MonthBucket) -> u64) -> Markup {
    if buckets.is_empty() {
        return html! { p { "Nog geen gegevens." } };
    }

    let max = buckets.iter().map(&value).max().unwrap_or(0).max(1) as f64;
    let plot_height = CHART_HEIGHT - 2.0 * CHART_MARGIN;
    let slot = (CHART_WIDTH - CHART_MARGIN) / buckets.len() as f64;
    let bar_width = (slot * 0.8).max(1.0);

    html! {
        svg width=(CHART_WIDTH) height=(CHART_HEIGHT) viewBox=(format!("0 0 {CHART_WIDTH} {CHART_HEIGHT}")) role="img" {
            @for (i, bucket) in buckets.iter().enumerate() {
                @let v = value(bucket);
                @let h = v as f64 / max * plot_height;
                @let x = CHART_MARGIN + i as f64 * slot;
                @let y = CHART_MARGIN + plot_height - h;
                rect x=(format!("{x:.1}")) y=(format!("{y:.1}")) width=(format!("{bar_width:.1}")) height=(format!("{h:.1}")) fill=(BAR_COLOR) {
                    title { (bucket.month) ": " (v) }
                }
                text x=(format!("{:.1}", x + bar_width / 2.0)) y=(format!("{:.1}", y - 3.0)) text-anchor="middle" { (v) }
                text x=(format!("{:.1}", x + bar_width / 2.0)) y=(format!("{:.1}", CHART_HEIGHT - 8.0)) text-anchor="middle" { (bucket.month) }
            }
        }
    }
}

fn gantt_chart(bars: &[TimelineBar]) -> Markup {
    let (Some(first), Some(last)) = (
        bars.iter().map(|bar| bar.start.min(bar.end)).min(),
        bars.iter().map(|bar| bar.end.max(bar.start)).max(),
    ) else {
        return html! { p { "Nog geen gegevens." } };
    };

    let days = ((last - first).num_days() + 1) as f64;
    let plot_width = CHART_WIDTH - GANTT_LABEL - CHART_MARGIN;
    let height = bars.len() as f64 * GANTT_ROW + CHART_MARGIN;
    let x_of = |date: NaiveDate| GANTT_LABEL + (date - first).num_days() as f64 / days * plot_width;

    html! {
        svg width=(CHART_WIDTH) height=(format!("{height:.0}")) viewBox=(format!("0 0 {CHART_WIDTH} {height:.0}")) role="img" {
            @for (i, bar) in bars.iter().enumerate() {
                @let y = i as f64 * GANTT_ROW;
                @let x = x_of(bar.start.min(bar.end));
                @let w = (x_of(bar.end.max(bar.start)) - x).max(2.0);
                text x=(format!("{:.1}", GANTT_LABEL - 6.0)) y=(format!("{:.1}", y + GANTT_ROW * 0.65)) text-anchor="end" { (bar.title) }
                rect x=(format!("{x:.1}")) y=(format!("{:.1}", y + 3.0)) width=(format!("{w:.1}")) height=(format!("{:.1}", GANTT_ROW - 6.0)) fill=(BAR_COLOR) {
                    title { (bar.title) ": " (bar.start.to_string()) " - " (bar.end.to_string()) }
                }
            }
            text x=(GANTT_LABEL) y=(format!("{:.0}", height - 8.0)) { (first.to_string()) }
            text x=(format!("{:.0}", CHART_WIDTH - CHART_MARGIN)) y=(format!("{:.0}", height - 8.0)) text-anchor="end" { (last.to_string()) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::stats::{self, ReadingStats};

    fn record(title: &str) -> BookRecord {
        BookRecord {
            key: title.to_lowercase(),
            title: title.to_string(),
            author: "Gerard Reve".into(),
            rating: Rating::new(5),
            language: "Nederlands".into(),
            start_date: "2025-01-01".into(),
            end_date: "2025-01-20".into(),
            genre: "Romans".into(),
            release_date: "1947".into(),
            pages: "260".into(),
            cover_url: None,
        }
    }

    fn dashboard_for(books: Vec<BookRecord>) -> Dashboard {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let (entries, skipped) = stats::coerce(&books);
        let stats: ReadingStats = stats::aggregate(&entries, today);
        Dashboard {
            books,
            stats,
            skipped,
        }
    }

    #[test]
    fn dashboard_lists_books_and_delete_options() {
        let html = dashboard(&dashboard_for(vec![record("De avonden")])).into_string();
        assert!(html.contains("<td>De avonden</td>"));
        assert!(html.contains(r#"<option value="De avonden">"#));
        assert!(html.contains("Totaal aantal boeken dit jaar"));
        assert!(html.contains("<svg"));
    }

    #[test]
    fn empty_dashboard_has_no_averages_and_no_charts() {
        let html = dashboard(&dashboard_for(Vec::new())).into_string();
        assert!(html.contains("Nog geen gegevens."));
        assert!(!html.contains("<svg"));
    }

    #[test]
    fn skipped_records_are_shown_as_warning() {
        let mut broken = record("Kapot");
        broken.pages = "veel".into();
        let html = dashboard(&dashboard_for(vec![broken])).into_string();
        assert!(html.contains("banner warning"));
        assert!(html.contains("veel"));
    }

    #[test]
    fn titles_are_escaped() {
        let html = dashboard(&dashboard_for(vec![record("<script>")])).into_string();
        assert!(!html.contains("<td><script></td>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn rating_picker_defaults_to_four_stars() {
        let html = rating_picker().into_string();
        assert_eq!(html.matches("checked").count(), 1);
        assert!(html.contains(r#"value="4" checked"#));
    }
}
