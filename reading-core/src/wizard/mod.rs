//! The plan wizard.
//!
//! A [`WizardSession`] owns one [`ReadingPlan`](crate::ReadingPlan) while the
//! user walks through the ordered [`WizardStep`]s. Every change goes through
//! [`apply_mutation`], which returns the updated plan together with the
//! recomputed pace and step flags.

pub mod mutation;
pub mod session;
pub mod steps;

pub use mutation::{DerivedState, PlanChange, apply_mutation};
pub use session::{FinalizeError, WizardError, WizardSession};
pub use steps::{StepCompletion, WizardStep};
