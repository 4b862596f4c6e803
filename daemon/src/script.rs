//! Scripted elections: a TOML list of commands replayed against a ledger.
//!
//! ```toml
//! administrator = "owner"
//!
//! [[step]]
//! caller = "owner"
//! action = "add_to_whitelist"
//! account = "alice"
//!
//! [[step]]
//! caller = "alice"
//! action = "register_vote"
//! proposal_id = 0
//! ```

use serde::Deserialize;
use std::path::Path;

use ballot_election::{ElectionError, ElectionEvent, ElectionLedger};
use ballot_types::{AccountId, ProposalId};

use crate::error::DaemonError;

/// One ledger command, without its caller.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    AddToWhitelist { account: AccountId },
    StartProposalsRegistration,
    EndProposalsRegistration,
    StartVotingSession,
    EndVotingSession,
    RegisterProposal { description: String },
    RegisterVote { proposal_id: ProposalId },
    TallyVotes,
}

impl Action {
    /// Issue this command on `ledger` as `caller`.
    pub fn apply(
        &self,
        ledger: &mut ElectionLedger,
        caller: &AccountId,
    ) -> Result<ElectionEvent, ElectionError> {
        match self {
            Self::AddToWhitelist { account } => ledger.add_to_whitelist(caller, account.clone()),
            Self::StartProposalsRegistration => ledger.start_proposals_registration(caller),
            Self::EndProposalsRegistration => ledger.end_proposals_registration(caller),
            Self::StartVotingSession => ledger.start_voting_session(caller),
            Self::EndVotingSession => ledger.end_voting_session(caller),
            Self::RegisterProposal { description } => {
                ledger.register_proposal(caller, description.as_str())
            }
            Self::RegisterVote { proposal_id } => ledger.register_vote(caller, *proposal_id),
            Self::TallyVotes => ledger.tally_votes(caller),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Step {
    pub caller: AccountId,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Script {
    pub administrator: AccountId,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

/// Result of one replayed step.
#[derive(Debug)]
pub struct StepOutcome {
    /// 1-based position in the script.
    pub step: usize,
    pub caller: AccountId,
    pub result: Result<ElectionEvent, ElectionError>,
}

impl Script {
    pub fn from_toml_file(path: &Path) -> Result<Self, DaemonError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DaemonError::Script(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse a script, rejecting empty or whitespace-bearing identities.
    pub fn from_toml_str(s: &str) -> Result<Self, DaemonError> {
        let script: Script = toml::from_str(s).map_err(|e| DaemonError::Script(e.to_string()))?;
        if !script.administrator.is_valid() {
            return Err(DaemonError::Script(format!(
                "invalid administrator {:?}",
                script.administrator.as_str()
            )));
        }
        for (i, step) in script.steps.iter().enumerate() {
            let whitelisted = match &step.action {
                Action::AddToWhitelist { account } => Some(account),
                _ => None,
            };
            if let Some(bad) = std::iter::once(&step.caller)
                .chain(whitelisted)
                .find(|id| !id.is_valid())
            {
                return Err(DaemonError::Script(format!(
                    "step {}: invalid account {:?}",
                    i + 1,
                    bad.as_str()
                )));
            }
        }
        Ok(script)
    }

    /// Replay the steps in order. With `stop_on_error`, replay ends at the
    /// first rejected step, which is the last outcome returned.
    pub fn replay(&self, ledger: &mut ElectionLedger, stop_on_error: bool) -> Vec<StepOutcome> {
        let mut outcomes = Vec::with_capacity(self.steps.len());
        for (i, step) in self.steps.iter().enumerate() {
            let result = step.action.apply(ledger, &step.caller);
            let rejected = result.is_err();
            if let Err(error) = &result {
                tracing::warn!(
                    step = i + 1,
                    caller = %step.caller,
                    error = %error,
                    "step rejected"
                );
            }
            outcomes.push(StepOutcome {
                step: i + 1,
                caller: step.caller.clone(),
                result,
            });
            if rejected && stop_on_error {
                break;
            }
        }
        outcomes
    }
}
