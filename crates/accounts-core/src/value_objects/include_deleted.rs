//! Soft-delete filter applied to every repository read

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Tri-state soft-delete filter.
///
/// Every collection query applies the matching predicate on the deletion
/// timestamp before any other filtering; single lookups apply it too and
/// yield `None` when nothing matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncludeDeleted {
    /// Exclude soft-deleted records
    #[default]
    No,
    /// Include every record
    Yes,
    /// Only soft-deleted records
    Exclusive,
}

impl IncludeDeleted {
    /// SQL predicate on the given deletion column, `None` when unfiltered
    pub fn predicate(self, column: &str) -> Option<String> {
        match self {
            Self::No => Some(format!("{column} IS NULL")),
            Self::Yes => None,
            Self::Exclusive => Some(format!("{column} IS NOT NULL")),
        }
    }

    /// In-memory equivalent of [`Self::predicate`]
    #[inline]
    pub fn admits(self, is_deleted: bool) -> bool {
        match self {
            Self::No => !is_deleted,
            Self::Yes => true,
            Self::Exclusive => is_deleted,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::No => "no",
            Self::Yes => "yes",
            Self::Exclusive => "exclusive",
        }
    }
}

impl fmt::Display for IncludeDeleted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncludeDeleted {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "no" | "0" => Ok(Self::No),
            "yes" | "1" => Ok(Self::Yes),
            "exclusive" | "only" | "2" => Ok(Self::Exclusive),
            other => Err(DomainError::InvalidQuery(format!(
                "Include deleted value \"{other}\" invalid."
            ))),
        }
    }
}
