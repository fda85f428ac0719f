//! Onboarding state machine — which step the user is on, and whether the
//! flow has finished.

use serde::{Deserialize, Serialize};

/// The steps of the onboarding wizard.
///
/// Progresses linearly: Personal → Financial → Investment → (complete).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Personal,
    Financial,
    Investment,
}

impl Step {
    /// All steps in wizard order.
    pub const ORDER: [Step; 3] = [Self::Personal, Self::Financial, Self::Investment];

    pub fn index(&self) -> usize {
        match self {
            Self::Personal => 0,
            Self::Financial => 1,
            Self::Investment => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Step> {
        Self::ORDER.get(index).copied()
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Personal => "Personal Information",
            Self::Financial => "Financial Overview",
            Self::Investment => "Investment Preferences",
        }
    }

    /// Profile fields this step is allowed to populate.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::Personal => &["name", "age"],
            Self::Financial => &["monthlyIncome", "budgetAllocation"],
            Self::Investment => &["riskAppetite", "investments"],
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Personal => "personal",
            Self::Financial => "financial",
            Self::Investment => "investment",
        };
        write!(f, "{s}")
    }
}

/// One-shot completion flag.
///
/// Raising it more than once between clears has no further effect, so a
/// consumer reacting to the first raise never sees a second one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionSignal {
    raised: bool,
}

impl CompletionSignal {
    /// Raise the signal. Returns `true` only if this call raised it.
    pub fn raise(&mut self) -> bool {
        !std::mem::replace(&mut self.raised, true)
    }

    pub fn is_raised(&self) -> bool {
        self.raised
    }

    pub fn clear(&mut self) {
        self.raised = false;
    }
}

/// Result of [`StepSequencer::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved forward onto this step.
    Moved(Step),
    /// Left the last step; the completion signal was raised by this call.
    Completed,
    /// The flow had already completed; nothing changed.
    AlreadyComplete,
}

/// Tracks progress through the fixed, linear list of steps.
#[derive(Debug, Clone, Default)]
pub struct StepSequencer {
    current: usize,
    complete: bool,
    signal: CompletionSignal,
}

impl StepSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sequencer that has already finished, e.g. for a restored profile.
    pub fn completed() -> Self {
        let mut seq = Self::new();
        seq.current = Self::step_count() - 1;
        seq.complete = true;
        seq.signal.raise();
        seq
    }

    pub fn step_count() -> usize {
        Step::ORDER.len()
    }

    /// Zero-based index of the current step. Stays on the last index once
    /// complete.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The current step, or `None` once the flow is complete.
    pub fn current_step(&self) -> Option<Step> {
        if self.complete {
            None
        } else {
            Step::from_index(self.current)
        }
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn signal(&self) -> &CompletionSignal {
        &self.signal
    }

    /// Move forward by one step. From the last step this enters the
    /// terminal state and raises the completion signal.
    pub fn advance(&mut self) -> Advance {
        if self.complete {
            return Advance::AlreadyComplete;
        }
        if self.current + 1 < Self::step_count() {
            self.current += 1;
            return Advance::Moved(Step::ORDER[self.current]);
        }
        self.complete = true;
        if self.signal.raise() {
            Advance::Completed
        } else {
            Advance::AlreadyComplete
        }
    }

    /// Move back by one step. No-op on the first step and after completion.
    pub fn retreat(&mut self) -> Option<Step> {
        if !self.complete && self.current > 0 {
            self.current -= 1;
        }
        self.current_step()
    }

    pub fn reset(&mut self) {
        self.current = 0;
        self.complete = false;
        self.signal.clear();
    }

    /// Progress bar position: 0 on the first step, 100 on the last.
    pub fn progress_percent(&self) -> u8 {
        if self.complete {
            return 100;
        }
        let last = Self::step_count() - 1;
        (self.current * 100 / last) as u8
    }
}
