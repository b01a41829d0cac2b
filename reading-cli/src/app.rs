//! Command handlers behind the `reading-planner` binary.
//!
//! Each handler takes its collaborators (repository, catalog, reference
//! date) explicitly and returns data; `main` does the printing.

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use reading_core::calculations::PaceCalculator;
use reading_core::db::RepositoryRegistry;
use reading_core::input::{parse_date, parse_page_count, parse_pages_per_day};
use reading_core::search::{BookSearch, SearchQuery};
use reading_core::shelf::{Shelf, ShelfError};
use reading_core::wizard::{PlanChange, WizardSession, WizardStep};
use reading_core::{Book, BookRepository, ReadingDays, StoredBook};
use reading_db_json::JsonRepositoryFactory;
use reading_db_sqlite::SqliteRepositoryFactory;
use tracing::{debug, info};

use crate::utils::parse_weekdays;

/// Registry with every storage backend this binary ships.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry.register(Box::new(JsonRepositoryFactory));
    registry
}

/// Raw plan fields as typed by the user. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanInput {
    pub pages: Option<String>,
    pub deadline: Option<String>,
    pub pages_per_day: Option<String>,
    pub days: Option<String>,
}

/// How `add` picks its book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookChoice {
    /// Search the catalog and take the `pick`th candidate (1-based).
    Search {
        title: String,
        author: Option<String>,
        pick: usize,
    },
    /// Use these details without searching.
    Manual(Book),
}

/// Either side of a pace preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacePreview {
    PagesPerDay {
        pages_per_day: Option<u32>,
        reading_days: u32,
    },
    Deadline(Option<NaiveDate>),
}

/// Where to delete from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Cover(String),
    /// 1-based, as printed by `list`.
    Position(usize),
}

/// Maps shelf failures to user-facing errors.
fn shelf_error(e: ShelfError) -> anyhow::Error {
    if e.is_retryable() {
        anyhow!(e).context("storage is unavailable; nothing was lost")
    } else {
        anyhow!(e)
    }
}

pub async fn search(
    catalog: &dyn BookSearch,
    title: &str,
    author: Option<&str>,
) -> Result<Vec<Book>> {
    let query = SearchQuery::new(title, author)?;
    let books = catalog.search(&query).await?;
    debug!(count = books.len(), "Search finished");
    Ok(books)
}

async fn choose_book(
    catalog: &dyn BookSearch,
    choice: BookChoice,
) -> Result<Book> {
    match choice {
        BookChoice::Manual(book) => Ok(book),
        BookChoice::Search {
            title,
            author,
            pick,
        } => {
            let books = search(catalog, &title, author.as_deref()).await?;
            if books.is_empty() {
                bail!("Book not found");
            }
            let count = books.len();
            pick.checked_sub(1)
                .and_then(|i| books.into_iter().nth(i))
                .ok_or_else(|| anyhow!("--pick must be between 1 and {count}"))
        }
    }
}

/// Applies the user's fields in wizard order. A manual pace goes last so it
/// sees the final page count and reading days.
fn apply_input(
    session: &mut WizardSession,
    input: &PlanInput,
) -> Result<()> {
    if let Some(pages) = &input.pages {
        session.apply(PlanChange::SetTotalPages(parse_page_count(pages)?))?;
    }
    if let Some(days) = &input.days {
        session.apply(PlanChange::SetReadingDays(parse_weekdays(days)?))?;
    }
    if let Some(deadline) = &input.deadline {
        session.apply(PlanChange::SetDeadline(Some(parse_date(deadline)?)))?;
    }
    if let Some(pace) = &input.pages_per_day {
        let target = parse_pages_per_day(pace)?;
        let derived = session.apply(PlanChange::SetPagesPerDay(target))?;
        if derived.pages_per_day != Some(target) {
            bail!("a fixed pace needs a page count and at least one reading day");
        }
    }
    Ok(())
}

/// Moves forward until the summary, failing on the first incomplete step.
fn walk_to_summary(session: &mut WizardSession) -> Result<()> {
    while session.current_step() != WizardStep::Summary {
        let step = session.current_step();
        session
            .advance()
            .with_context(|| format!("cannot continue past '{}'", step.label()))?;
    }
    Ok(())
}

/// Runs the whole wizard and saves the plan.
pub async fn add(
    repo: &dyn BookRepository,
    catalog: &dyn BookSearch,
    today: NaiveDate,
    choice: BookChoice,
    input: &PlanInput,
) -> Result<StoredBook> {
    let mut session = WizardSession::new(today);
    let book = choose_book(catalog, choice).await?;
    info!(title = %book.title, cover_id = %book.cover_id, "Selected book");
    session.apply(PlanChange::SelectBook(book))?;

    apply_input(&mut session, input)?;
    walk_to_summary(&mut session)?;

    Shelf::new(repo).save(&mut session).await.map_err(shelf_error)
}

/// Changes a saved plan. Fields not given keep their saved values,
/// including the saved pace.
pub async fn edit(
    repo: &dyn BookRepository,
    today: NaiveDate,
    cover_id: &str,
    input: &PlanInput,
) -> Result<StoredBook> {
    let shelf = Shelf::new(repo);
    let mut session = shelf.edit(cover_id, today).await.map_err(shelf_error)?;
    apply_input(&mut session, input)?;
    shelf.save(&mut session).await.map_err(shelf_error)
}

pub async fn list(repo: &dyn BookRepository) -> Result<Vec<StoredBook>> {
    Shelf::new(repo).list().await.map_err(shelf_error)
}

pub async fn show(
    repo: &dyn BookRepository,
    cover_id: &str,
) -> Result<StoredBook> {
    Shelf::new(repo).find(cover_id).await.map_err(shelf_error)
}

pub async fn delete(
    repo: &dyn BookRepository,
    target: DeleteTarget,
) -> Result<StoredBook> {
    let shelf = Shelf::new(repo);
    let result = match target {
        DeleteTarget::Cover(cover_id) => shelf.delete(&cover_id).await,
        DeleteTarget::Position(0) => bail!("positions start at 1"),
        DeleteTarget::Position(n) => shelf.delete_at(n - 1).await,
    };
    result.map_err(shelf_error)
}

/// Read-only pace calculation. Uses the deadline when given, else the
/// fixed pace.
pub fn pace(
    today: NaiveDate,
    pages: &str,
    days: &str,
    deadline: Option<&str>,
    pages_per_day: Option<&str>,
) -> Result<PacePreview> {
    let calculator = PaceCalculator::new(today);
    let total = parse_page_count(pages)?;
    let reading_days: ReadingDays = parse_weekdays(days)?;

    match (deadline, pages_per_day) {
        (Some(deadline), _) => {
            let deadline = parse_date(deadline)?;
            Ok(PacePreview::PagesPerDay {
                pages_per_day: calculator.pages_per_day(total, Some(deadline), &reading_days),
                reading_days: calculator.reading_days_until(deadline, &reading_days),
            })
        }
        (None, Some(pace)) => {
            let target = parse_pages_per_day(pace)?;
            let deadline = calculator.deadline_for_pace(total, &reading_days, target)?;
            Ok(PacePreview::Deadline(deadline))
        }
        (None, None) => bail!("give either --deadline or --pages-per-day"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Weekday;
    use pretty_assertions::assert_eq;
    use reading_core::RepositoryError;
    use reading_core::search::SearchError;

    use super::*;

    #[derive(Default)]
    struct MemoryRepository {
        books: Mutex<Vec<StoredBook>>,
    }

    #[async_trait]
    impl BookRepository for MemoryRepository {
        async fn load_books(&self) -> Result<Vec<StoredBook>, RepositoryError> {
            Ok(self.books.lock().unwrap().clone())
        }

        async fn save_books(&self, books: &[StoredBook]) -> Result<(), RepositoryError> {
            *self.books.lock().unwrap() = books.to_vec();
            Ok(())
        }
    }

    /// Returns canned candidates without touching the network.
    struct FixedCatalog(Vec<Book>);

    #[async_trait]
    impl BookSearch for FixedCatalog {
        async fn search(&self, _query: &SearchQuery) -> Result<Vec<Book>, SearchError> {
            Ok(self.0.clone())
        }
    }

    fn date(
        y: i32,
        m: u32,
        d: u32,
    ) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 3, 3)
    }

    fn book(cover_id: &str) -> Book {
        Book {
            title: format!("Book {cover_id}"),
            author: "Someone".to_string(),
            year: "2000".to_string(),
            cover_id: cover_id.to_string(),
        }
    }

    fn by_deadline() -> PlanInput {
        PlanInput {
            pages: Some("300".to_string()),
            deadline: Some("2025-03-24".to_string()),
            pages_per_day: None,
            days: Some("mon,wed,fri".to_string()),
        }
    }

    fn search_choice(pick: usize) -> BookChoice {
        BookChoice::Search {
            title: "Book".to_string(),
            author: None,
            pick,
        }
    }

    // =========================================================================
    // add
    // =========================================================================

    #[tokio::test]
    async fn add_saves_picked_candidate() {
        let repo = MemoryRepository::default();
        let catalog = FixedCatalog(vec![book("1"), book("2")]);

        let saved = add(&repo, &catalog, today(), search_choice(2), &by_deadline())
            .await
            .unwrap();

        assert_eq!(saved.cover_id, "2");
        assert_eq!(saved.pages_per_day, 34);
        assert_eq!(list(&repo).await.unwrap(), vec![saved]);
    }

    #[tokio::test]
    async fn add_with_fixed_pace_derives_deadline() {
        let repo = MemoryRepository::default();
        let input = PlanInput {
            pages: Some("100".to_string()),
            deadline: None,
            pages_per_day: Some("100".to_string()),
            days: Some("sun".to_string()),
        };

        let saved = add(&repo, &FixedCatalog(vec![]), today(), BookChoice::Manual(book("9")), &input)
            .await
            .unwrap();

        assert_eq!(saved.deadline_date(), date(2025, 3, 9));
        assert_eq!(saved.pages_per_day, 100);
    }

    #[tokio::test]
    async fn add_reports_book_not_found() {
        let repo = MemoryRepository::default();

        let err = add(&repo, &FixedCatalog(vec![]), today(), search_choice(1), &by_deadline())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Book not found");
    }

    #[tokio::test]
    async fn add_stops_at_incomplete_step() {
        let repo = MemoryRepository::default();
        let input = PlanInput {
            days: None,
            ..by_deadline()
        };

        let err = add(&repo, &FixedCatalog(vec![book("1")]), today(), search_choice(1), &input)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Reading days"), "got: {err}");
        assert!(list(&repo).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_rejects_bad_page_count() {
        let repo = MemoryRepository::default();
        let input = PlanInput {
            pages: Some("zero".to_string()),
            ..by_deadline()
        };

        let result = add(&repo, &FixedCatalog(vec![book("1")]), today(), search_choice(1), &input).await;

        assert!(result.is_err());
    }

    // =========================================================================
    // edit / delete
    // =========================================================================

    #[tokio::test]
    async fn edit_keeps_saved_pace_unless_changed() {
        let repo = MemoryRepository::default();
        let catalog = FixedCatalog(vec![book("1")]);
        add(&repo, &catalog, today(), search_choice(1), &by_deadline())
            .await
            .unwrap();

        let unchanged = edit(&repo, date(2025, 3, 10), "1", &PlanInput::default())
            .await
            .unwrap();
        assert_eq!(unchanged.pages_per_day, 34);

        let days_changed = PlanInput {
            days: Some("mon".to_string()),
            ..PlanInput::default()
        };
        let changed = edit(&repo, date(2025, 3, 10), "1", &days_changed).await.unwrap();
        // Mondays after 10 March up to 24 March: 17 and 24.
        assert_eq!(changed.pages_per_day, 150);
    }

    #[tokio::test]
    async fn delete_by_position_is_one_based() {
        let repo = MemoryRepository::default();
        let catalog = FixedCatalog(vec![book("1"), book("2")]);
        add(&repo, &catalog, today(), search_choice(1), &by_deadline()).await.unwrap();
        add(&repo, &catalog, today(), search_choice(2), &by_deadline()).await.unwrap();

        let removed = delete(&repo, DeleteTarget::Position(1)).await.unwrap();

        assert_eq!(removed.cover_id, "1");
        assert!(delete(&repo, DeleteTarget::Position(0)).await.is_err());
        assert!(delete(&repo, DeleteTarget::Cover("1".to_string())).await.is_err());
    }

    // =========================================================================
    // pace
    // =========================================================================

    #[test]
    fn pace_from_deadline() {
        let preview = pace(today(), "300", "mon,wed,fri", Some("2025-03-24"), None).unwrap();

        assert_eq!(
            preview,
            PacePreview::PagesPerDay {
                pages_per_day: Some(34),
                reading_days: 9,
            }
        );
    }

    #[test]
    fn pace_from_fixed_pages_per_day() {
        let preview = pace(today(), "100", "sun", None, Some("100")).unwrap();

        assert_eq!(preview, PacePreview::Deadline(Some(date(2025, 3, 9))));
    }

    #[test]
    fn pace_needs_a_driver() {
        assert!(pace(today(), "100", "sun", None, None).is_err());
        assert!(pace(today(), "100", "sun", None, Some("0")).is_err());
    }

    #[test]
    fn registry_has_both_backends() {
        assert_eq!(build_registry().available_backends(), vec!["json", "sqlite"]);
    }

    #[test]
    fn weekday_parsing_feeds_reading_days() {
        assert_eq!(
            parse_weekdays("sat,sun").unwrap(),
            ReadingDays::from_weekdays([Weekday::Sat, Weekday::Sun])
        );
    }
}
