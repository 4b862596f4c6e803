//! Proposals submitted during the registration phase.

use serde::{Deserialize, Serialize};

/// A proposal and its running vote count.
///
/// Identified by its position in the ledger's proposal list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Free text supplied by the submitter.
    pub description: String,
    /// Votes received so far.
    pub vote_count: u32,
}

impl Proposal {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            vote_count: 0,
        }
    }
}
