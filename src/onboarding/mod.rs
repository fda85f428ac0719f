//! Onboarding system — the three-step financial profile wizard.
//!
//! Each step's form validates its own fields and yields a partial profile.
//! The session merges that into the accumulated profile and then advances
//! the step sequencer. Leaving the last step fires a one-shot completion
//! signal, which the manager turns into a broadcast event and a hand-off to
//! the profile store.

pub mod accumulator;
pub mod budget;
pub mod manager;
pub mod model;
pub mod routes;
pub mod session;
pub mod state;
pub mod steps;

pub use accumulator::ProfileAccumulator;
pub use budget::{BudgetAllocation, BudgetAmounts};
pub use manager::{OnboardingEvent, OnboardingManager};
pub use model::{Investment, PartialProfile, Profile, RiskAppetite};
pub use routes::{OnboardingRouteState, onboarding_routes};
pub use session::{OnboardingSession, OnboardingStatus, SubmitOutcome};
pub use state::{Advance, CompletionSignal, Step, StepSequencer};
pub use steps::{
    BudgetSliders, FinancialInfo, InvestmentInfo, NumberField, PersonalInfo, StepForm, StepSubmission,
};
