//! Visa application outcome labels
//!
//! The target is a closed two-class enumeration with a fixed integer
//! mapping: Certified = 0, Denied = 1. Labels outside the mapping are
//! rejected rather than passed through.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Final decision on a visa application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Application approved
    Certified,
    /// Application rejected
    Denied,
}

impl Outcome {
    /// Fixed class index used in training matrices
    pub fn class(self) -> usize {
        match self {
            Outcome::Certified => 0,
            Outcome::Denied => 1,
        }
    }

    /// Reverse lookup from a class index
    pub fn from_class(class: usize) -> Option<Self> {
        match class {
            0 => Some(Outcome::Certified),
            1 => Some(Outcome::Denied),
            _ => None,
        }
    }

    /// Parse a raw dataset label, rejecting anything outside the mapping
    pub fn parse(label: &str) -> Result<Self> {
        match label {
            "Certified" => Ok(Outcome::Certified),
            "Denied" => Ok(Outcome::Denied),
            other => Err(Error::UnknownLabel {
                label: other.to_string(),
            }),
        }
    }

    /// Display name, identical to the raw dataset label
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Certified => "Certified",
            Outcome::Denied => "Denied",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
