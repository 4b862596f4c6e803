//! Errors raised while constructing or parsing shared types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BallotError {
    #[error("invalid account identity: {0:?}")]
    InvalidAccount(String),

    #[error("unknown workflow status: {0}")]
    UnknownStatus(u8),

    #[error("unknown workflow status name: {0}")]
    UnknownStatusName(String),
}
