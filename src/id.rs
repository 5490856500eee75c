//! Entity identifiers
//!
//! Both entities are keyed by storage-generated integers. The newtypes keep a
//! petition id from being passed where a signature id is expected.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Primary key of a `petition` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PetitionId(pub i64);

/// Primary key of a `signature` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureId(pub i64);

impl PetitionId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl SignatureId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PetitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SignatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PetitionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse()
            .map(PetitionId)
            .map_err(|_| Error::InvalidId(format!("Invalid petition id: {}", s)))
    }
}

impl FromStr for SignatureId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse()
            .map(SignatureId)
            .map_err(|_| Error::InvalidId(format!("Invalid signature id: {}", s)))
    }
}
