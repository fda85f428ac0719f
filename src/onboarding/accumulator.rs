//! Profile accumulator — owns the profile for one onboarding session.

use tracing::debug;

use super::model::{PartialProfile, Profile};

/// Builds a [`Profile`] up from the partial updates each step submits.
#[derive(Debug, Clone, Default)]
pub struct ProfileAccumulator {
    profile: Profile,
}

impl ProfileAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing profile, e.g. one loaded from storage.
    pub fn with_profile(profile: Profile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn into_profile(self) -> Profile {
        self.profile
    }

    /// Shallow-merge `partial` into the profile. Fields it does not carry
    /// keep their current value.
    pub fn merge(&mut self, partial: PartialProfile) {
        debug!(fields = ?partial.field_names(), "Merging partial profile");

        let PartialProfile {
            name,
            age,
            monthly_income,
            budget_allocation,
            risk_appetite,
            investments,
        } = partial;

        if let Some(name) = name {
            self.profile.name = name;
        }
        if let Some(age) = age {
            self.profile.age = age;
        }
        if let Some(income) = monthly_income {
            self.profile.monthly_income = income;
        }
        if let Some(budget) = budget_allocation {
            self.profile.budget_allocation = budget;
        }
        if let Some(risk) = risk_appetite {
            self.profile.risk_appetite = risk;
        }
        if let Some(investments) = investments {
            self.profile.investments = investments;
        }
    }

    /// Record when the profile was finalized.
    pub(crate) fn mark_completed(&mut self, at: chrono::DateTime<chrono::Utc>) {
        self.profile.completed_at = Some(at);
    }

    /// Discard everything collected so far.
    pub fn reset(&mut self) {
        self.profile = Profile::default();
    }
}
