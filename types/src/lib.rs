//! Fundamental types for the ballot ledger.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! account identities, proposal indices, the workflow phase enum, and parse errors.

pub mod account;
pub mod error;
pub mod proposal;
pub mod state;

pub use account::AccountId;
pub use error::BallotError;
pub use proposal::ProposalId;
pub use state::WorkflowStatus;
