//! When the administrator may extend the whitelist.

use ballot_types::WorkflowStatus;
use serde::{Deserialize, Serialize};

/// Phase restriction applied to whitelist additions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhitelistPolicy {
    /// Whitelisting is accepted in every phase, including after the tally.
    #[default]
    AnyPhase,
    /// Whitelisting is only accepted while `RegisteringVoters`.
    RegistrationOnly,
}

impl WhitelistPolicy {
    /// Whether a whitelist addition is accepted in `status`.
    pub fn allows(self, status: WorkflowStatus) -> bool {
        match self {
            Self::AnyPhase => true,
            Self::RegistrationOnly => status == WorkflowStatus::RegisteringVoters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_phase_allows_everything() {
        for status in WorkflowStatus::ALL {
            assert!(WhitelistPolicy::AnyPhase.allows(status));
        }
    }

    #[test]
    fn registration_only_allows_first_phase() {
        let allowed: Vec<_> = WorkflowStatus::ALL
            .into_iter()
            .filter(|s| WhitelistPolicy::RegistrationOnly.allows(*s))
            .collect();
        assert_eq!(allowed, vec![WorkflowStatus::RegisteringVoters]);
    }
}
