//! Proposal index type.

/// Position of a proposal in the ordered proposal list (0-based).
///
/// Assigned at submission time and never reused or changed.
pub type ProposalId = u32;
