use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use reading_cli::app::{self, BookChoice, DeleteTarget, PacePreview, PlanInput};
use reading_cli::{logging, utils};
use reading_core::{Book, StoredBook};
use reading_core::db::DbConfig;
use reading_core::input::parse_date;
use reading_search::OpenLibraryClient;
use tracing::debug;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Plan how many pages to read per day to finish a book by a deadline.
#[derive(Debug, Parser)]
#[command(name = "reading-planner", version, about, long_about = None)]
struct Cli {
    /// Storage backend (`sqlite` or `json`).
    #[arg(long, global = true, env = "READING_PLANNER_BACKEND", default_value = "sqlite")]
    backend: String,

    /// Storage location. For SQLite a file path or `:memory:`, for JSON a
    /// file path.
    #[arg(long, global = true, env = "READING_PLANNER_DB", default_value = "reading.db")]
    db: String,

    /// Reference date (YYYY-MM-DD) for all calculations. Defaults to the
    /// local date.
    #[arg(long, global = true)]
    today: Option<String>,

    /// Log filter, e.g. `debug` or `warn,reading_core=debug`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Do not print log output to the terminal.
    #[arg(long, global = true)]
    no_stdout_log: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct PlanArgs {
    /// Number of pages, e.g. `412` or `1,024`.
    #[arg(long)]
    pages: Option<String>,

    /// Finish date (YYYY-MM-DD); pages per day is derived from it.
    #[arg(long, conflicts_with = "pages_per_day")]
    deadline: Option<String>,

    /// Fixed pages per day; the deadline is derived from it.
    #[arg(long)]
    pages_per_day: Option<String>,

    /// Reading days, e.g. `mon,wed,fri`.
    #[arg(long)]
    days: Option<String>,
}

impl From<PlanArgs> for PlanInput {
    fn from(args: PlanArgs) -> Self {
        PlanInput {
            pages: args.pages,
            deadline: args.deadline,
            pages_per_day: args.pages_per_day,
            days: args.days,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search the Open Library catalog.
    Search {
        title: String,
        #[arg(long)]
        author: Option<String>,
    },

    /// Plan a new book and save it.
    Add {
        /// Title to search for.
        #[arg(long)]
        title: String,

        #[arg(long)]
        author: Option<String>,

        /// Which search result to use (1-based).
        #[arg(long, default_value_t = 1)]
        pick: usize,

        /// Skip the search and use the title, author and this cover id.
        #[arg(long)]
        cover_id: Option<String>,

        /// Publication year when skipping the search.
        #[arg(long, requires = "cover_id")]
        year: Option<String>,

        #[command(flatten)]
        plan: PlanArgs,
    },

    /// List saved plans.
    List {
        /// Print the stored records as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show one saved plan.
    Show { cover_id: String },

    /// Change a saved plan. Omitted fields keep their values.
    Edit {
        cover_id: String,

        #[command(flatten)]
        plan: PlanArgs,
    },

    /// Delete a saved plan.
    Delete {
        #[arg(long, conflicts_with = "index", required_unless_present = "index")]
        cover: Option<String>,

        /// Position as shown by `list` (1-based).
        #[arg(long)]
        index: Option<usize>,
    },

    /// Preview a pace or deadline without saving anything.
    Pace {
        #[arg(long)]
        pages: String,

        #[arg(long)]
        days: String,

        #[arg(long, conflicts_with = "pages_per_day", required_unless_present = "pages_per_day")]
        deadline: Option<String>,

        #[arg(long)]
        pages_per_day: Option<String>,
    },
}

// ─── logging ─────────────────────────────────────────────────────────────────

fn init_logging(cli: &Cli) -> Result<()> {
    logging::init_default_logging();
    if let Some(level) = &cli.log_level {
        logging::set_log_level(level)?;
    }
    if cli.no_stdout_log {
        logging::set_stdout_enabled(false)?;
    }
    if let Some(path) = &cli.log_file {
        logging::enable_file_logging(path)?;
    }
    Ok(())
}

// ─── output ──────────────────────────────────────────────────────────────────

fn print_book_list(books: &[Book]) {
    if books.is_empty() {
        println!("Book not found");
        return;
    }
    for (i, book) in books.iter().enumerate() {
        println!("{:>3}. {} by {} ({})", i + 1, book.title, book.author, book.year);
        if let Some(url) = book.cover_url() {
            println!("     cover {}: {}", book.cover_id, url);
        }
    }
}

fn print_entry(
    entry: &StoredBook,
    today: NaiveDate,
) {
    println!("{} by {} ({})", entry.title, entry.author, entry.year);
    println!("  pages:         {}", entry.number_of_pages);
    println!("  pages per day: {}", entry.pages_per_day);
    println!("  reading days:  {}", entry.reading_days);
    println!("  deadline:      {}", utils::format_deadline(entry.deadline_date(), today));
    println!("  cover id:      {}", utils::opt_display(Some(&entry.cover_id).filter(|c| !c.is_empty())));
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let result = run(cli).await;
    logging::disable_file_logging();
    result
}

async fn run(cli: Cli) -> Result<()> {
    let today = match &cli.today {
        Some(s) => parse_date(s).context("--today")?,
        None => Local::now().date_naive(),
    };

    if let Command::Pace {
        pages,
        days,
        deadline,
        pages_per_day,
    } = &cli.command
    {
        match app::pace(today, pages, days, deadline.as_deref(), pages_per_day.as_deref())? {
            PacePreview::PagesPerDay {
                pages_per_day: Some(ppd),
                reading_days,
            } => println!("{ppd} pages per day over {reading_days} reading days"),
            PacePreview::PagesPerDay { .. } => println!("No reading days before the deadline"),
            PacePreview::Deadline(Some(date)) => {
                println!("Finish by {} ({date})", utils::format_deadline(date, today))
            }
            PacePreview::Deadline(None) => println!("Select at least one reading day"),
        }
        return Ok(());
    }

    let catalog = OpenLibraryClient::new();
    if let Command::Search { title, author } = &cli.command {
        print_book_list(&app::search(&catalog, title, author.as_deref()).await?);
        return Ok(());
    }

    let db_config = DbConfig {
        backend: cli.backend,
        connection_string: cli.db,
    };
    debug!("connecting to {} backend", db_config.backend);
    let registry = app::build_registry();
    let repo = registry
        .create(&db_config)
        .await
        .with_context(|| format!("cannot open '{}'", db_config.connection_string))?;

    match cli.command {
        Command::Add {
            title,
            author,
            pick,
            cover_id,
            year,
            plan,
        } => {
            let choice = match cover_id {
                Some(cover_id) => BookChoice::Manual(Book {
                    title,
                    author: author.unwrap_or_else(|| "Unknown author".to_string()),
                    year: year.unwrap_or_else(|| "Year Unavailable".to_string()),
                    cover_id,
                }),
                None => BookChoice::Search {
                    title,
                    author,
                    pick,
                },
            };
            let saved = app::add(&*repo, &catalog, today, choice, &plan.into()).await?;
            println!("Saved:");
            print_entry(&saved, today);
        }
        Command::List { json } => {
            let books = app::list(&*repo).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&books)?);
            } else if books.is_empty() {
                println!("No books planned yet");
            } else {
                for (i, entry) in books.iter().enumerate() {
                    println!("{}", utils::entry_line(i + 1, entry, today));
                }
            }
        }
        Command::Show { cover_id } => print_entry(&app::show(&*repo, &cover_id).await?, today),
        Command::Edit { cover_id, plan } => {
            let saved = app::edit(&*repo, today, &cover_id, &plan.into()).await?;
            println!("Updated:");
            print_entry(&saved, today);
        }
        Command::Delete { cover, index } => {
            let target = match (cover, index) {
                (Some(cover), _) => DeleteTarget::Cover(cover),
                (None, Some(index)) => DeleteTarget::Position(index),
                (None, None) => anyhow::bail!("give --cover or --index"),
            };
            let removed = app::delete(&*repo, target).await?;
            println!("Deleted {}", removed.title);
        }
        Command::Search { .. } | Command::Pace { .. } => {}
    }

    Ok(())
}
