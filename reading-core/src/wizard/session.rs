use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info};

use super::mutation::{DerivedState, PlanChange, apply_mutation};
use super::steps::{StepCompletion, WizardStep};
use crate::input::PlanInputError;
use crate::{ReadingPlan, StoredBook, deadline_timestamp};

/// Refused navigation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("step '{0}' is not complete")]
    StepIncomplete(WizardStep),

    #[error("'{0}' is the last step")]
    NoNextStep(WizardStep),
}

/// The plan cannot be saved yet.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FinalizeError {
    #[error("plan is incomplete: {}", step_list(.0))]
    Incomplete(Vec<WizardStep>),
}

fn step_list(steps: &[WizardStep]) -> String {
    steps
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One pass through the wizard, owning the plan being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardSession {
    today: NaiveDate,
    plan: ReadingPlan,
    steps: StepCompletion,
    current: WizardStep,
    /// Cover id of the stored entry being edited, if any.
    editing: Option<String>,
}

impl WizardSession {
    /// An empty plan at the first step.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            plan: ReadingPlan::new(),
            steps: StepCompletion::new(),
            current: WizardStep::BookSearch,
            editing: None,
        }
    }

    /// A session editing a saved entry, opened on the summary.
    ///
    /// The saved pace is kept as-is (manual override) until a forward change.
    pub fn from_stored(
        entry: &StoredBook,
        today: NaiveDate,
    ) -> Self {
        let plan = ReadingPlan::from_stored(entry);
        let steps = StepCompletion::from_plan(&plan);
        Self {
            today,
            plan,
            steps,
            current: WizardStep::Summary,
            editing: Some(entry.cover_id.clone()),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn plan(&self) -> &ReadingPlan {
        &self.plan
    }

    pub fn steps(&self) -> &StepCompletion {
        &self.steps
    }

    pub fn current_step(&self) -> WizardStep {
        self.current
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn derived(&self) -> DerivedState {
        DerivedState {
            pages_per_day: self.plan.pages_per_day,
            deadline: self.plan.deadline,
            steps: self.steps,
        }
    }

    /// Applies a change and refreshes the step flags.
    ///
    /// # Errors
    ///
    /// Returns the [`PlanInputError`] from [`apply_mutation`]; the session
    /// is unchanged in that case.
    pub fn apply(
        &mut self,
        change: PlanChange,
    ) -> Result<DerivedState, PlanInputError> {
        let (plan, derived) = apply_mutation(&self.plan, change, self.today)?;
        self.plan = plan;
        self.steps = derived.steps;
        Ok(derived)
    }

    /// Overrides a single step flag. The next [`WizardSession::apply`]
    /// recomputes all flags from the plan.
    pub fn set_step_complete(
        &mut self,
        step: WizardStep,
        complete: bool,
    ) {
        self.steps.set_step_complete(step, complete);
    }

    /// Moves to the next step.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::StepIncomplete`] if the current step is not
    /// complete, or [`WizardError::NoNextStep`] on the last step.
    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        let Some(next) = self.current.next() else {
            return Err(WizardError::NoNextStep(self.current));
        };
        if !self.steps.can_advance_from(self.current) {
            return Err(WizardError::StepIncomplete(self.current));
        }
        debug!(from = %self.current, to = %next, "Advancing wizard");
        self.current = next;
        Ok(next)
    }

    /// Moves to the previous step. Returns `None` on the first step.
    pub fn back(&mut self) -> Option<WizardStep> {
        let previous = self.current.previous()?;
        self.current = previous;
        Some(previous)
    }

    /// Snapshot of the plan as a storable entry.
    ///
    /// # Errors
    ///
    /// Returns [`FinalizeError::Incomplete`] listing every incomplete step.
    pub fn finalize(&self) -> Result<StoredBook, FinalizeError> {
        let incomplete = self.steps.incomplete_steps();
        let (Some(book), Some(total_pages), Some(deadline), Some(pages_per_day), true) = (
            self.plan.book.as_ref(),
            self.plan.total_pages,
            self.plan.deadline,
            self.plan.pages_per_day,
            incomplete.is_empty(),
        ) else {
            return Err(FinalizeError::Incomplete(incomplete));
        };

        Ok(StoredBook {
            title: book.title.clone(),
            author: book.author.clone(),
            year: book.year.clone(),
            cover_id: book.cover_id.clone(),
            number_of_pages: total_pages,
            deadline: deadline_timestamp(deadline),
            pages_per_day,
            reading_days: self.plan.reading_days,
        })
    }

    /// Discards the plan and returns to the first step.
    pub fn reset(&mut self) {
        info!("Resetting wizard session");
        *self = Self::new(self.today);
    }
}
