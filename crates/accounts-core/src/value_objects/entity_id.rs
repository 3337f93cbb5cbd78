//! Entity ID - time-ordered UUID identifying every persisted record
//!
//! Format: canonical hyphenated form, 8-4-4-4-12 hex digits.
//! The short form keeps the first and third groups (`aaaaaaaa-cccc`).

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Length of the canonical hyphenated UUID string
const UUID_LEN: usize = 36;

/// Hyphen positions in the canonical form
const HYPHENS: [usize; 4] = [8, 13, 18, 23];

/// Opaque unique entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Generate a new time-ordered identifier
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wrap an existing UUID
    #[inline]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[inline]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }

    /// Parse from the canonical hyphenated representation
    pub fn parse(s: &str) -> Result<Self, EntityIdParseError> {
        if !is_uuid(s) {
            return Err(EntityIdParseError::InvalidFormat(s.to_string()));
        }
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| EntityIdParseError::InvalidFormat(s.to_string()))
    }

    /// Short representation: first and third groups
    pub fn short(&self) -> String {
        let full = self.0.hyphenated().to_string();
        format!("{}-{}", &full[0..8], &full[14..18])
    }
}

/// Error when parsing an entity ID
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntityIdParseError {
    #[error("UUID invalid: {0}")]
    InvalidFormat(String),
}

/// Check whether a string is a canonical hyphenated UUID (case-insensitive)
pub fn is_uuid(s: &str) -> bool {
    if s.len() != UUID_LEN {
        return false;
    }
    s.bytes().enumerate().all(|(i, b)| {
        if HYPHENS.contains(&i) {
            b == b'-'
        } else {
            b.is_ascii_hexdigit()
        }
    })
}

/// Shorten a UUID string to `group1-group3`.
///
/// Invalid input is returned unchanged unless `strict` is set.
pub fn short_uuid(s: &str, strict: bool) -> Result<String, EntityIdParseError> {
    if !is_uuid(s) {
        if strict {
            return Err(EntityIdParseError::InvalidFormat(s.to_string()));
        }
        return Ok(s.to_string());
    }
    Ok(format!("{}-{}", &s[0..8], &s[14..18]))
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl From<Uuid> for EntityId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<EntityId> for Uuid {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl std::str::FromStr for EntityId {
    type Err = EntityIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityId::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1ec9414c-232a-6b00-b3c8-9e6bdeb6e6b5";

    #[test]
    fn test_is_uuid() {
        assert!(is_uuid(SAMPLE));
        assert!(is_uuid(&SAMPLE.to_uppercase()));
        assert!(!is_uuid("1ec9414c232a6b00b3c89e6bdeb6e6b5"));
        assert!(!is_uuid("1ec9414c-232a-6b00-b3c8-9e6bdeb6e6bz"));
        assert!(!is_uuid("1ec9414c-232a-6b00-b3c8_9e6bdeb6e6b5"));
        assert!(!is_uuid(""));
    }

    #[test]
    fn test_short_uuid() {
        assert_eq!(short_uuid(SAMPLE, false).unwrap(), "1ec9414c-6b00");
        assert_eq!(short_uuid("not-a-uuid", false).unwrap(), "not-a-uuid");
        assert!(short_uuid("not-a-uuid", true).is_err());
    }

    #[test]
    fn test_entity_id_short_matches_helper() {
        let id = EntityId::parse(SAMPLE).unwrap();
        assert_eq!(id.short(), short_uuid(SAMPLE, true).unwrap());
        assert_eq!(id.to_string(), SAMPLE);
    }

    #[test]
    fn test_generate_is_unique_and_parseable() {
        let a = EntityId::generate();
        let b = EntityId::generate();
        assert_ne!(a, b);
        assert_eq!(EntityId::parse(&a.to_string()).unwrap(), a);
    }

    #[test]
    fn test_parse_rejects_braced_form() {
        let braced = format!("{{{SAMPLE}}}");
        assert!(EntityId::parse(&braced).is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let id = EntityId::parse(SAMPLE).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{SAMPLE}\""));
        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
