use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use leeslog_app::books::models::BookRecord;
use leeslog_kernel::settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "leeslog", author, version, about = "Personal reading log")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web app
    Serve,
    /// Look a title up on bol.com and print the draft as JSON
    Lookup {
        /// Book title, as typed in the search box
        title: String,
    },
    /// Print every stored book, newest first
    List,
    /// Print this year's reading statistics
    Stats,
    /// Expire the first stored book with this exact title
    Delete {
        title: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().context("failed to load leeslog settings")?;
    leeslog_telemetry::try_init(&settings.telemetry);

    tracing::debug!(env = ?settings.environment, command = ?cli.command, "leeslog cli");

    let service = || leeslog_app::app::build_service(&settings);
    match cli.command {
        Command::Serve => return leeslog_app::app::serve(settings.clone()).await,
        Command::Lookup { title } => {
            let draft = service()?.lookup(&title).await?;
            println!("{}", serde_json::to_string_pretty(&draft)?);
        }
        Command::List => {
            for book in service()?.list().await? {
                println!("{}", table_row(&book));
            }
        }
        Command::Stats => {
            let dashboard = service()?.dashboard(Local::now().date_naive()).await?;
            let summary = &dashboard.stats.summary;
            println!(
                "books this year:  {} ({:+} vs same period last year)",
                summary.books_this_year, summary.books_delta
            );
            println!(
                "pages this year:  {} ({:+})",
                summary.pages_this_year, summary.pages_delta
            );
            println!(
                "books per month:  {}",
                format_average(summary.average_books_per_month, 1)
            );
            println!(
                "pages per book:   {}",
                format_average(summary.average_pages_per_book, 0)
            );
            for skip in &dashboard.skipped {
                eprintln!("skipped: {skip}");
            }
        }
        Command::Delete { title } => {
            let key = service()?.delete_by_title(&title).await?;
            println!("expired '{title}' ({key})");
        }
    }

    Ok(())
}

fn table_row(book: &BookRecord) -> String {
    format!(
        "{:<12} {:<40} {:<28} {:<6} {:>5}",
        book.end_date,
        book.title,
        book.author,
        book.rating.map(|r| r.get().to_string()).unwrap_or_else(|| "-".into()),
        book.pages
    )
}

fn format_average(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{v:.decimals$}"))
        .unwrap_or_else(|| "-".to_string())
}
