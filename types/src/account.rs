//! Opaque account identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::BallotError;

/// An opaque participant identity (an address, an account id, a username...).
///
/// The ledger never interprets the contents; it only compares identities for
/// equality and uses them as mapping keys.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Wrap a raw identity string without validation.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Return the raw identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An identity is usable when it is non-empty and contains no whitespace.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty() && !self.0.chars().any(char::is_whitespace)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl FromStr for AccountId {
    type Err = BallotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = Self::new(s);
        if id.is_valid() {
            Ok(id)
        } else {
            Err(BallotError::InvalidAccount(s.to_string()))
        }
    }
}
