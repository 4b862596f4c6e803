use ballot_types::{AccountId, ProposalId, WorkflowStatus};
use std::fmt;
use thiserror::Error;

/// The role a caller must hold for a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Administrator,
    WhitelistedVoter,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Administrator => f.write_str("administrator"),
            Self::WhitelistedVoter => f.write_str("whitelisted voter"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ElectionError {
    #[error("{caller} is not authorized: caller must be the {role}")]
    NotAuthorized { caller: AccountId, role: Role },

    #[error("workflow not respected: requires {expected}, current status is {actual}")]
    WorkflowViolation {
        expected: WorkflowStatus,
        actual: WorkflowStatus,
    },

    #[error("account {0} is already whitelisted")]
    AlreadyWhitelisted(AccountId),

    #[error("account {0} has already voted")]
    AlreadyVoted(AccountId),

    #[error("proposal {proposal_id} does not exist ({proposal_count} registered)")]
    InvalidProposal {
        proposal_id: ProposalId,
        proposal_count: u32,
    },

    #[error("proposal limit reached: at most {limit} proposals")]
    ProposalLimit { limit: u32 },

    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("snapshot serialization failed: {0}")]
    Serialization(String),
}

/// Fieldless discriminant of [`ElectionError`], handy for asserting precedence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotAuthorized,
    WorkflowViolation,
    AlreadyWhitelisted,
    AlreadyVoted,
    InvalidProposal,
    ProposalLimit,
    CorruptSnapshot,
    Serialization,
}

impl ElectionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAuthorized { .. } => ErrorKind::NotAuthorized,
            Self::WorkflowViolation { .. } => ErrorKind::WorkflowViolation,
            Self::AlreadyWhitelisted(_) => ErrorKind::AlreadyWhitelisted,
            Self::AlreadyVoted(_) => ErrorKind::AlreadyVoted,
            Self::InvalidProposal { .. } => ErrorKind::InvalidProposal,
            Self::ProposalLimit { .. } => ErrorKind::ProposalLimit,
            Self::CorruptSnapshot(_) => ErrorKind::CorruptSnapshot,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }
}
