//! The election workflow phase.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::BallotError;

/// The six ordered phases of an election.
///
/// Phases only ever advance one step at a time; `VotesTallied` is terminal.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum WorkflowStatus {
    /// Initial phase: the administrator builds the whitelist.
    #[default]
    RegisteringVoters = 0,
    /// Whitelisted voters may submit proposals.
    ProposalsRegistrationStarted = 1,
    /// Proposal submission is closed; voting has not opened yet.
    ProposalsRegistrationEnded = 2,
    /// Whitelisted voters may cast their single vote.
    VotingSessionStarted = 3,
    /// Voting is closed, awaiting the tally.
    VotingSessionEnded = 4,
    /// Final result confirmed.
    VotesTallied = 5,
}

impl WorkflowStatus {
    /// All phases in order.
    pub const ALL: [WorkflowStatus; 6] = [
        Self::RegisteringVoters,
        Self::ProposalsRegistrationStarted,
        Self::ProposalsRegistrationEnded,
        Self::VotingSessionStarted,
        Self::VotingSessionEnded,
        Self::VotesTallied,
    ];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// The phase immediately after this one, or `None` for the terminal phase.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::RegisteringVoters => Some(Self::ProposalsRegistrationStarted),
            Self::ProposalsRegistrationStarted => Some(Self::ProposalsRegistrationEnded),
            Self::ProposalsRegistrationEnded => Some(Self::VotingSessionStarted),
            Self::VotingSessionStarted => Some(Self::VotingSessionEnded),
            Self::VotingSessionEnded => Some(Self::VotesTallied),
            Self::VotesTallied => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::VotesTallied
    }

    /// Snake-case label, stable for logs and scripts.
    pub fn name(self) -> &'static str {
        match self {
            Self::RegisteringVoters => "registering_voters",
            Self::ProposalsRegistrationStarted => "proposals_registration_started",
            Self::ProposalsRegistrationEnded => "proposals_registration_ended",
            Self::VotingSessionStarted => "voting_session_started",
            Self::VotingSessionEnded => "voting_session_ended",
            Self::VotesTallied => "votes_tallied",
        }
    }
}

impl TryFrom<u8> for WorkflowStatus {
    type Error = BallotError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or(BallotError::UnknownStatus(value))
    }
}

impl FromStr for WorkflowStatus {
    type Err = BallotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.name() == s)
            .ok_or_else(|| BallotError::UnknownStatusName(s.to_string()))
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
