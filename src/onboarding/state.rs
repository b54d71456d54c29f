//! Wizard step state machine.

use serde::{Deserialize, Serialize};

/// The steps of the onboarding wizard.
///
/// Progresses `Step1 → Step2 → Step3 → Complete`. The backward edge
/// (`previous`) is a view-state rewind only and never touches the persisted
/// record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Step1,
    Step2,
    Step3,
    Complete,
}

impl WizardStep {
    /// Step number as persisted in `current_step` (Complete is 4, i.e.
    /// "past step 3").
    pub fn number(&self) -> u8 {
        match self {
            Self::Step1 => 1,
            Self::Step2 => 2,
            Self::Step3 => 3,
            Self::Complete => 4,
        }
    }

    /// View step to resume at for a persisted `current_step`.
    ///
    /// A record that never got past registration resumes at step 2; anything
    /// past step 3 is already complete.
    pub fn resume_from(current_step: u8) -> Self {
        match current_step {
            0..=2 => Self::Step2,
            3 => Self::Step3,
            _ => Self::Complete,
        }
    }

    /// The next step in the forward progression, if any.
    pub fn next(&self) -> Option<WizardStep> {
        match self {
            Self::Step1 => Some(Self::Step2),
            Self::Step2 => Some(Self::Step3),
            Self::Step3 => Some(Self::Complete),
            Self::Complete => None,
        }
    }

    /// The step the view rewinds to on "previous", if legal from here.
    pub fn previous(&self) -> Option<WizardStep> {
        match self {
            Self::Step1 => None,
            Self::Step2 => Some(Self::Step1),
            Self::Step3 => Some(Self::Step2),
            Self::Complete => None,
        }
    }

    /// Whether this step is terminal (the read-only success view).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Whether this step collects configurable profile components.
    pub fn is_profile_step(&self) -> bool {
        matches!(self, Self::Step2 | Self::Step3)
    }

    /// Check if a forward transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: WizardStep) -> bool {
        self.next() == Some(target)
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Complete => write!(f, "complete"),
            other => write!(f, "step {}", other.number()),
        }
    }
}
