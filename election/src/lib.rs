//! Single-authority election ledger.
//!
//! Six-phase workflow: RegisteringVoters → ProposalsRegistrationStarted →
//! ProposalsRegistrationEnded → VotingSessionStarted → VotingSessionEnded → VotesTallied.
//! Only the administrator moves the workflow forward, one step per command.
//!
//! Key principle: one whitelisted identity = one vote, cast once, never changed.
//! The winning proposal is tracked incrementally; ties keep whichever proposal
//! reached the leading count first.

pub mod error;
pub mod event;
pub mod ledger;
pub mod policy;
pub mod proposal;
pub mod shared;
pub mod snapshot;
pub mod voter;

pub use error::{ElectionError, ErrorKind, Role};
pub use event::{ElectionEvent, EventBus};
pub use ledger::{ElectionLedger, MAX_PROPOSALS};
pub use policy::WhitelistPolicy;
pub use proposal::Proposal;
pub use shared::SharedElection;
pub use snapshot::{ElectionSnapshot, VoterEntry, SNAPSHOT_VERSION};
pub use voter::Voter;
