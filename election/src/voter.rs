//! Per-identity ballot state.

use ballot_types::ProposalId;
use serde::{Deserialize, Serialize};

/// Ballot record of a whitelisted identity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    /// Set once the administrator whitelists the identity.
    pub is_registered: bool,
    /// Set once the voter casts their vote; never cleared.
    pub has_voted: bool,
    /// Index of the chosen proposal; stays 0 until the voter votes.
    pub voted_proposal_id: ProposalId,
}

impl Voter {
    /// The record created when an identity is whitelisted.
    pub fn registered() -> Self {
        Self {
            is_registered: true,
            ..Self::default()
        }
    }

    /// The chosen proposal, if the voter has voted.
    pub fn vote(&self) -> Option<ProposalId> {
        self.has_voted.then_some(self.voted_proposal_id)
    }
}
