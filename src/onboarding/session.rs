//! One onboarding session: the profile being built, the step sequencer and
//! the completion signal, owned together and passed around explicitly.

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::error::SubmitError;

use super::accumulator::ProfileAccumulator;
use super::budget::BudgetAmounts;
use super::model::Profile;
use super::state::{Advance, Step, StepSequencer};
use super::steps::{StepForm, StepSubmission};

/// What a successful submission led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The profile was updated and the wizard moved onto this step.
    Advanced(Step),
    /// The last step was submitted and the completion signal fired.
    Completed,
}

/// Point-in-time view of a session for the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingStatus {
    pub session_id: String,
    /// `None` once onboarding is complete.
    pub current_step: Option<Step>,
    pub step_index: usize,
    pub progress_percent: u8,
    pub onboarding_complete: bool,
    pub profile: Profile,
    /// The budget split applied to the monthly income.
    pub budget_amounts: BudgetAmounts,
}

/// State for a single user's pass through the wizard.
#[derive(Debug, Clone)]
pub struct OnboardingSession {
    id: String,
    accumulator: ProfileAccumulator,
    sequencer: StepSequencer,
}

impl OnboardingSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            accumulator: ProfileAccumulator::new(),
            sequencer: StepSequencer::new(),
        }
    }

    /// Rebuild a finished session around a profile loaded from storage.
    pub fn restored(id: impl Into<String>, profile: Profile) -> Self {
        Self {
            id: id.into(),
            accumulator: ProfileAccumulator::with_profile(profile),
            sequencer: StepSequencer::completed(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn profile(&self) -> &Profile {
        self.accumulator.profile()
    }

    pub fn current_step(&self) -> Option<Step> {
        self.sequencer.current_step()
    }

    pub fn is_complete(&self) -> bool {
        self.sequencer.is_complete()
    }

    pub fn sequencer(&self) -> &StepSequencer {
        &self.sequencer
    }

    /// Validate a step form, merge its fields, then advance.
    ///
    /// The profile is always updated before the step index moves. Nothing
    /// is merged unless every field passes.
    pub fn submit<F: StepForm>(&mut self, form: &F) -> Result<SubmitOutcome, SubmitError> {
        let expected = self
            .sequencer
            .current_step()
            .ok_or(SubmitError::AlreadyComplete)?;
        if F::STEP != expected {
            return Err(SubmitError::OutOfSequence {
                expected,
                submitted: F::STEP,
            });
        }

        let partial = form.validate()?;
        self.accumulator.merge(partial);

        match self.sequencer.advance() {
            Advance::Moved(step) => {
                info!(session_id = %self.id, step = %step, "Onboarding step advanced");
                Ok(SubmitOutcome::Advanced(step))
            }
            Advance::Completed => {
                self.accumulator.mark_completed(Utc::now());
                info!(session_id = %self.id, "Onboarding complete");
                Ok(SubmitOutcome::Completed)
            }
            // current_step() was Some, so the sequencer cannot already be
            // complete here.
            Advance::AlreadyComplete => Err(SubmitError::AlreadyComplete),
        }
    }

    /// Submit whichever step the tagged submission carries.
    pub fn submit_any(&mut self, submission: &StepSubmission) -> Result<SubmitOutcome, SubmitError> {
        match submission {
            StepSubmission::Personal(form) => self.submit(form),
            StepSubmission::Financial(form) => self.submit(form),
            StepSubmission::Investment(form) => self.submit(form),
        }
    }

    /// Go back one step. Collected data is kept.
    pub fn back(&mut self) -> Option<Step> {
        self.sequencer.retreat()
    }

    /// Restart onboarding: default profile, first step, signal cleared.
    pub fn reset(&mut self) {
        self.accumulator.reset();
        self.sequencer.reset();
        info!(session_id = %self.id, "Onboarding reset");
    }

    pub fn status(&self) -> OnboardingStatus {
        let profile = self.profile();
        OnboardingStatus {
            session_id: self.id.clone(),
            current_step: self.sequencer.current_step(),
            step_index: self.sequencer.current_index(),
            progress_percent: self.sequencer.progress_percent(),
            onboarding_complete: self.sequencer.is_complete(),
            budget_amounts: profile
                .budget_allocation
                .amounts(profile.monthly_income),
            profile: profile.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::model::{Investment, RiskAppetite};
    use crate::onboarding::steps::{FinancialInfo, InvestmentInfo, PersonalInfo};
    use rust_decimal_macros::dec;

    fn complete_session() -> OnboardingSession {
        let mut session = OnboardingSession::new("test");
        session.submit(&PersonalInfo::new("Ada", 34)).unwrap();
        session
            .submit(&FinancialInfo::new(dec!(5000), 60, 25))
            .unwrap();
        session
            .submit(&InvestmentInfo::new(
                RiskAppetite::Medium,
                [Investment::Stocks, Investment::Etfs],
            ))
            .unwrap();
        session
    }

    #[test]
    fn end_to_end_walkthrough() {
        let mut session = OnboardingSession::new("test");

        let outcome = session.submit(&PersonalInfo::new("Ada", 34)).unwrap();
        assert_eq!(outcome, SubmitOutcome::Advanced(Step::Financial));
        assert_eq!(session.profile().name, "Ada");
        assert_eq!(session.sequencer().current_index(), 1);

        let outcome = session
            .submit(&FinancialInfo::new(dec!(5000), 60, 25))
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Advanced(Step::Investment));
        assert_eq!(session.profile().budget_allocation.savings(), 15);
        assert_eq!(session.sequencer().current_index(), 2);

        let outcome = session
            .submit(&InvestmentInfo::new(
                RiskAppetite::Medium,
                [Investment::Stocks, Investment::Etfs],
            ))
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Completed);
        assert!(session.is_complete());
        assert!(session.sequencer().signal().is_raised());

        let p = session.profile();
        assert_eq!(p.name, "Ada");
        assert_eq!(p.age, 34);
        assert_eq!(p.monthly_income, dec!(5000));
        assert_eq!(p.budget_allocation.necessities(), 60);
        assert_eq!(p.budget_allocation.wants(), 25);
        assert_eq!(p.risk_appetite, RiskAppetite::Medium);
        assert_eq!(p.investments.len(), 2);
        assert!(p.completed_at.is_some());
    }

    #[test]
    fn invalid_submission_commits_nothing() {
        let mut session = OnboardingSession::new("test");
        let err = session.submit(&PersonalInfo::new("", 17)).unwrap_err();
        match err {
            SubmitError::Invalid(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation failure, got {other:?}"),
        }
        assert_eq!(session.profile(), &Profile::default());
        assert_eq!(session.current_step(), Some(Step::Personal));
    }

    #[test]
    fn out_of_sequence_submission_is_rejected() {
        let mut session = OnboardingSession::new("test");
        let err = session
            .submit(&FinancialInfo::new(dec!(5000), 50, 30))
            .unwrap_err();
        assert_eq!(
            err,
            SubmitError::OutOfSequence {
                expected: Step::Personal,
                submitted: Step::Financial,
            }
        );
        assert_eq!(session.profile().monthly_income, dec!(0));
    }

    #[test]
    fn submitting_after_completion_does_not_refire() {
        let mut session = complete_session();
        let completed_at = session.profile().completed_at;

        let err = session
            .submit(&InvestmentInfo::new(RiskAppetite::High, [Investment::Crypto]))
            .unwrap_err();
        assert_eq!(err, SubmitError::AlreadyComplete);
        assert_eq!(session.profile().risk_appetite, RiskAppetite::Medium);
        assert_eq!(session.profile().completed_at, completed_at);
    }

    #[test]
    fn back_keeps_collected_data() {
        let mut session = OnboardingSession::new("test");
        session.submit(&PersonalInfo::new("Ada", 34)).unwrap();
        assert_eq!(session.back(), Some(Step::Personal));
        assert_eq!(session.profile().name, "Ada");

        // Resubmitting the step overwrites its fields and moves on again.
        session.submit(&PersonalInfo::new("Grace", 45)).unwrap();
        assert_eq!(session.profile().name, "Grace");
        assert_eq!(session.current_step(), Some(Step::Financial));
    }

    #[test]
    fn reset_after_completion() {
        let mut session = complete_session();
        session.reset();

        assert_eq!(session.profile(), &Profile::default());
        assert_eq!(session.sequencer().current_index(), 0);
        assert!(!session.is_complete());
        assert!(!session.sequencer().signal().is_raised());

        let status = session.status();
        assert_eq!(status.current_step, Some(Step::Personal));
        assert_eq!(status.progress_percent, 0);
    }

    #[test]
    fn submit_any_dispatches_by_step() {
        let mut session = OnboardingSession::new("test");
        let sub = StepSubmission::Personal(PersonalInfo::new("Ada", 34));
        assert_eq!(
            session.submit_any(&sub).unwrap(),
            SubmitOutcome::Advanced(Step::Financial)
        );
    }

    #[test]
    fn restored_session_is_complete() {
        let profile = complete_session().profile().clone();
        let session = OnboardingSession::restored("user-1", profile.clone());
        assert!(session.is_complete());
        assert_eq!(session.profile(), &profile);
        assert_eq!(session.status().progress_percent, 100);
    }

    #[test]
    fn status_serializes_camel_case() {
        let session = OnboardingSession::new("abc");
        let json = serde_json::to_value(session.status()).unwrap();
        assert_eq!(json["sessionId"], "abc");
        assert_eq!(json["currentStep"], "personal");
        assert_eq!(json["stepIndex"], 0);
        assert_eq!(json["onboardingComplete"], false);
        assert!(json["budgetAmounts"]["savings"].is_string());
    }

    #[test]
    fn status_splits_income_by_budget() {
        let mut session = OnboardingSession::new("test");
        session.submit(&PersonalInfo::new("Ada", 34)).unwrap();
        session
            .submit(&FinancialInfo::new(dec!(5000), 60, 25))
            .unwrap();

        let amounts = session.status().budget_amounts;
        assert_eq!(amounts.necessities, dec!(3000));
        assert_eq!(amounts.wants, dec!(1250));
        assert_eq!(amounts.savings, dec!(750));
    }
}
