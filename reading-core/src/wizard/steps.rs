use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ReadingPlan;

/// The wizard's screens, in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    BookSearch,
    PageCount,
    Deadline,
    ReadingDays,
    Summary,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::BookSearch,
        WizardStep::PageCount,
        WizardStep::Deadline,
        WizardStep::ReadingDays,
        WizardStep::Summary,
    ];

    /// Zero-based position in [`WizardStep::ALL`].
    pub fn index(self) -> usize {
        match self {
            WizardStep::BookSearch => 0,
            WizardStep::PageCount => 1,
            WizardStep::Deadline => 2,
            WizardStep::ReadingDays => 3,
            WizardStep::Summary => 4,
        }
    }

    pub fn next(self) -> Option<WizardStep> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<WizardStep> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WizardStep::BookSearch => "book-search",
            WizardStep::PageCount => "page-count",
            WizardStep::Deadline => "deadline",
            WizardStep::ReadingDays => "reading-days",
            WizardStep::Summary => "summary",
        }
    }

    pub fn parse(s: &str) -> Option<WizardStep> {
        Self::ALL.into_iter().find(|step| step.as_str() == s)
    }

    /// Human-readable screen title.
    pub fn label(self) -> &'static str {
        match self {
            WizardStep::BookSearch => "Find your book",
            WizardStep::PageCount => "Number of pages",
            WizardStep::Deadline => "Deadline or pages per day",
            WizardStep::ReadingDays => "Reading days",
            WizardStep::Summary => "Summary",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completion flag per [`WizardStep`].
///
/// Flags gate forward navigation only; going back is always allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepCompletion {
    flags: [bool; 5],
}

impl StepCompletion {
    /// All steps incomplete.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flags derived from the plan's current fields.
    pub fn from_plan(plan: &ReadingPlan) -> Self {
        let mut steps = Self::new();
        steps.set_step_complete(WizardStep::BookSearch, plan.book.is_some());
        steps.set_step_complete(WizardStep::PageCount, plan.total_pages.is_some());
        steps.set_step_complete(WizardStep::Deadline, plan.deadline.is_some());
        steps.set_step_complete(WizardStep::ReadingDays, plan.reading_days.any());
        steps.set_step_complete(
            WizardStep::Summary,
            plan.book.is_some() && plan.pages_per_day.is_some(),
        );
        steps
    }

    /// Plain assignment; other flags are untouched.
    pub fn set_step_complete(
        &mut self,
        step: WizardStep,
        complete: bool,
    ) {
        self.flags[step.index()] = complete;
    }

    pub fn is_complete(
        &self,
        step: WizardStep,
    ) -> bool {
        self.flags[step.index()]
    }

    /// Moving on from `step` needs `step` complete and a step after it.
    pub fn can_advance_from(
        &self,
        step: WizardStep,
    ) -> bool {
        self.is_complete(step) && step.next().is_some()
    }

    pub fn can_go_back_from(
        &self,
        _step: WizardStep,
    ) -> bool {
        true
    }

    pub fn all_complete(&self) -> bool {
        self.flags.iter().all(|f| *f)
    }

    /// Steps still blocking finalization, in order.
    pub fn incomplete_steps(&self) -> Vec<WizardStep> {
        self.iter()
            .filter(|(_, complete)| !complete)
            .map(|(step, _)| step)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WizardStep, bool)> + '_ {
        WizardStep::ALL
            .into_iter()
            .map(|step| (step, self.is_complete(step)))
    }
}
