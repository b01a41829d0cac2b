//! Plan mutations and the values derived from them.
//!
//! Changes to the page count, the deadline or the reading days are
//! *forward* changes: they switch manual override off and derive the pace
//! from the deadline. [`PlanChange::SetPagesPerDay`] is the *manual* change:
//! it fixes the pace and derives the deadline instead.

use chrono::{NaiveDate, Weekday};
use tracing::{debug, warn};

use super::steps::StepCompletion;
use crate::calculations::{PaceCalculator, PaceError};
use crate::input::PlanInputError;
use crate::{Book, ReadingDays, ReadingPlan};

/// A single user edit to the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanChange {
    SelectBook(Book),
    ClearBook,
    SetTotalPages(Option<u32>),
    SetDeadline(Option<NaiveDate>),
    ToggleReadingDay(Weekday),
    SetReadingDays(ReadingDays),
    SetPagesPerDay(u32),
}

impl PlanChange {
    fn is_forward(&self) -> bool {
        matches!(
            self,
            PlanChange::SetTotalPages(_)
                | PlanChange::SetDeadline(_)
                | PlanChange::ToggleReadingDay(_)
                | PlanChange::SetReadingDays(_)
        )
    }
}

/// What the UI re-reads after every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedState {
    pub pages_per_day: Option<u32>,
    pub deadline: Option<NaiveDate>,
    pub steps: StepCompletion,
}

impl DerivedState {
    pub fn of(plan: &ReadingPlan) -> Self {
        Self {
            pages_per_day: plan.pages_per_day,
            deadline: plan.deadline,
            steps: StepCompletion::from_plan(plan),
        }
    }
}

/// Applies `change` to a copy of `plan` and recomputes everything derived.
///
/// The input plan is never modified, so a rejected change leaves the
/// caller's state as it was.
///
/// # Errors
///
/// Returns [`PlanInputError::InvalidPageCount`] for a page count of zero and
/// [`PlanInputError::Pace`] for a manual pace of zero.
///
/// # Example
///
/// ```
/// use chrono::{NaiveDate, Weekday};
/// use reading_core::ReadingPlan;
/// use reading_core::wizard::{PlanChange, WizardStep, apply_mutation};
///
/// let today = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
/// let plan = ReadingPlan::new();
///
/// let (plan, _) = apply_mutation(&plan, PlanChange::SetTotalPages(Some(100)), today).unwrap();
/// let (plan, derived) =
///     apply_mutation(&plan, PlanChange::ToggleReadingDay(Weekday::Sun), today).unwrap();
/// assert!(derived.steps.is_complete(WizardStep::ReadingDays));
///
/// let (plan, derived) = apply_mutation(&plan, PlanChange::SetPagesPerDay(100), today).unwrap();
/// assert!(plan.manual_override);
/// assert_eq!(derived.pages_per_day, Some(100));
/// assert_eq!(derived.deadline, NaiveDate::from_ymd_opt(2025, 3, 9));
/// ```
pub fn apply_mutation(
    plan: &ReadingPlan,
    change: PlanChange,
    today: NaiveDate,
) -> Result<(ReadingPlan, DerivedState), PlanInputError> {
    let calculator = PaceCalculator::new(today);
    let mut next = plan.clone();

    if change.is_forward() {
        next.manual_override = false;
    }

    match change {
        PlanChange::SelectBook(book) => next.book = Some(book),
        PlanChange::ClearBook => next.book = None,
        PlanChange::SetTotalPages(Some(0)) => {
            return Err(PlanInputError::InvalidPageCount("0".to_string()));
        }
        PlanChange::SetTotalPages(pages) => next.total_pages = pages,
        PlanChange::SetDeadline(deadline) => next.deadline = deadline,
        PlanChange::ToggleReadingDay(day) => next.reading_days.toggle(day),
        PlanChange::SetReadingDays(days) => next.reading_days = days,
        PlanChange::SetPagesPerDay(target) => adopt_manual_pace(&mut next, &calculator, target)?,
    }

    if !next.manual_override {
        next.pages_per_day =
            calculator.pages_per_day(next.total_pages, next.deadline, &next.reading_days);
        debug!(
            pages_per_day = ?next.pages_per_day,
            deadline = ?next.deadline,
            "Recomputed pace"
        );
    }

    let derived = DerivedState::of(&next);
    Ok((next, derived))
}

/// Fixes the pace at `target` and moves the deadline to match.
///
/// Leaves the plan untouched when the deadline cannot be derived yet.
fn adopt_manual_pace(
    plan: &mut ReadingPlan,
    calculator: &PaceCalculator,
    target: u32,
) -> Result<(), PaceError> {
    match calculator.deadline_for_pace(plan.total_pages, &plan.reading_days, target)? {
        Some(deadline) => {
            plan.deadline = Some(deadline);
            plan.pages_per_day = Some(target);
            plan.manual_override = true;
            debug!(pages_per_day = target, deadline = %deadline, "Adopted manual pace");
        }
        None => {
            warn!(
                pages_per_day = target,
                total_pages = ?plan.total_pages,
                reading_days = %plan.reading_days,
                "Manual pace needs a page count and reading days; plan unchanged"
            );
        }
    }
    Ok(())
}
