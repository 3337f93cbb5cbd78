//! Audit trail embedded in every persisted entity
//!
//! Carries identity, lifecycle timestamps, creator/owner/deleter attribution
//! and the soft-delete state. `deleted_at` is set iff the entity is
//! soft-deleted; `undelete` clears the timestamp, deleter and comment together.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde_json::Value;

use crate::error::DomainError;
use crate::serialization::{id_value, text_value, timestamp_value, EntityField, FieldSerialize};
use crate::value_objects::{EntityId, ZoneConverter};

/// Maximum length of a deletion comment
pub const DELETER_COMMENT_MAX: usize = 200;

/// Comment stamped on hard delete when none was recorded
pub const PURGE_COMMENT: &str = "Entity shred pending.";

/// Identity, timestamps and attribution shared by all entities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditTrail {
    pub id: EntityId,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
    pub accessed_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub creator: Option<EntityId>,
    pub owner: Option<EntityId>,
    pub deleter: Option<EntityId>,
    pub deleter_comment: Option<String>,
}

impl AuditTrail {
    /// Fresh trail for a new entity
    pub fn new(creator: Option<EntityId>, owner: Option<EntityId>) -> Self {
        Self {
            id: EntityId::generate(),
            created_at: Utc::now(),
            modified_at: None,
            accessed_at: None,
            deleted_at: None,
            creator,
            owner,
            deleter: None,
            deleter_comment: None,
        }
    }

    /// Stamp the access time. Called for every loaded entity.
    pub fn touch_accessed(&mut self) {
        self.accessed_at = Some(Utc::now());
    }

    /// Stamp the modification time. Called for every persisted update.
    pub fn touch_modified(&mut self) {
        self.modified_at = Some(Utc::now());
    }

    /// Soft delete.
    ///
    /// The comment is trimmed; blank comments are stored as `None`.
    pub fn delete(
        &mut self,
        deleter: Option<EntityId>,
        comment: Option<&str>,
    ) -> Result<(), DomainError> {
        let comment = comment.map(str::trim).filter(|c| !c.is_empty());
        if let Some(c) = comment {
            if c.chars().count() > DELETER_COMMENT_MAX {
                return Err(DomainError::TooLong {
                    field: "deleter_comment",
                    max: DELETER_COMMENT_MAX,
                });
            }
        }

        self.deleted_at = Some(Utc::now());
        self.deleter = deleter;
        self.deleter_comment = comment.map(str::to_string);
        Ok(())
    }

    /// Restore a soft-deleted entity
    pub fn undelete(&mut self) {
        self.deleted_at = None;
        self.deleter = None;
        self.deleter_comment = None;
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Stamp deletion metadata ahead of a hard delete, keeping what is
    /// already recorded.
    pub fn prepare_purge(&mut self) {
        if self.deleted_at.is_none() {
            self.deleted_at = Some(Utc::now());
        }
        if self.deleter_comment.as_deref().map_or(true, str::is_empty) {
            self.deleter_comment = Some(PURGE_COMMENT.to_string());
        }
    }

    // =========================================================================
    // Zone-aware accessors
    // =========================================================================

    pub fn created_at_in(&self, zones: &ZoneConverter) -> DateTime<FixedOffset> {
        zones.read_value(self.created_at)
    }

    pub fn modified_at_in(&self, zones: &ZoneConverter) -> Option<DateTime<FixedOffset>> {
        zones.read(self.modified_at)
    }

    pub fn accessed_at_in(&self, zones: &ZoneConverter) -> Option<DateTime<FixedOffset>> {
        zones.read(self.accessed_at)
    }

    pub fn deleted_at_in(&self, zones: &ZoneConverter) -> Option<DateTime<FixedOffset>> {
        zones.read(self.deleted_at)
    }

    pub fn set_created_at<Tz: TimeZone>(&mut self, value: DateTime<Tz>) {
        self.created_at = value.with_timezone(&Utc);
    }

    pub fn set_modified_at<Tz: TimeZone>(&mut self, zones: &ZoneConverter, value: Option<DateTime<Tz>>) {
        self.modified_at = zones.write(value);
    }

    pub fn set_accessed_at<Tz: TimeZone>(&mut self, zones: &ZoneConverter, value: Option<DateTime<Tz>>) {
        self.accessed_at = zones.write(value);
    }

    pub fn set_deleted_at<Tz: TimeZone>(&mut self, zones: &ZoneConverter, value: Option<DateTime<Tz>>) {
        self.deleted_at = zones.write(value);
    }
}

/// Entity carrying an [`AuditTrail`]
pub trait Audited {
    fn audit(&self) -> &AuditTrail;

    fn audit_mut(&mut self) -> &mut AuditTrail;

    fn id(&self) -> EntityId {
        self.audit().id
    }

    fn is_deleted(&self) -> bool {
        self.audit().is_deleted()
    }
}

impl Audited for AuditTrail {
    fn audit(&self) -> &AuditTrail {
        self
    }

    fn audit_mut(&mut self) -> &mut AuditTrail {
        self
    }
}

/// Serializable audit fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditField {
    Id,
    CreatedAt,
    ModifiedAt,
    AccessedAt,
    DeletedAt,
    Creator,
    Owner,
    Deleter,
    DeleterComment,
}

impl EntityField for AuditField {
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::CreatedAt,
        Self::ModifiedAt,
        Self::AccessedAt,
        Self::DeletedAt,
        Self::Creator,
        Self::Owner,
        Self::Deleter,
        Self::DeleterComment,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::CreatedAt => "created_at",
            Self::ModifiedAt => "modified_at",
            Self::AccessedAt => "accessed_at",
            Self::DeletedAt => "deleted_at",
            Self::Creator => "creator_id",
            Self::Owner => "owner_id",
            Self::Deleter => "deleter_id",
            Self::DeleterComment => "deleter_comment",
        }
    }
}

impl FieldSerialize for AuditTrail {
    type Field = AuditField;

    fn field_value(&self, field: AuditField, zones: &ZoneConverter) -> Value {
        match field {
            AuditField::Id => id_value(Some(self.id)),
            AuditField::CreatedAt => timestamp_value(Some(self.created_at_in(zones))),
            AuditField::ModifiedAt => timestamp_value(self.modified_at_in(zones)),
            AuditField::AccessedAt => timestamp_value(self.accessed_at_in(zones)),
            AuditField::DeletedAt => timestamp_value(self.deleted_at_in(zones)),
            AuditField::Creator => id_value(self.creator),
            AuditField::Owner => id_value(self.owner),
            AuditField::Deleter => id_value(self.deleter),
            AuditField::DeleterComment => text_value(self.deleter_comment.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trail() {
        let creator = EntityId::generate();
        let trail = AuditTrail::new(Some(creator), None);
        assert_eq!(trail.creator, Some(creator));
        assert!(trail.modified_at.is_none());
        assert!(trail.accessed_at.is_none());
        assert!(!trail.is_deleted());
    }

    #[test]
    fn test_delete_then_undelete() {
        let mut trail = AuditTrail::new(None, None);
        let deleter = EntityId::generate();

        trail.delete(Some(deleter), Some("  closed by request  ")).unwrap();
        assert!(trail.is_deleted());
        assert_eq!(trail.deleter, Some(deleter));
        assert_eq!(trail.deleter_comment.as_deref(), Some("closed by request"));

        trail.undelete();
        assert!(!trail.is_deleted());
        assert!(trail.deleter.is_none());
        assert!(trail.deleter_comment.is_none());
    }

    #[test]
    fn test_blank_comment_is_none() {
        let mut trail = AuditTrail::new(None, None);
        trail.delete(None, Some("   ")).unwrap();
        assert!(trail.is_deleted());
        assert!(trail.deleter_comment.is_none());
    }

    #[test]
    fn test_comment_too_long_leaves_entity_untouched() {
        let mut trail = AuditTrail::new(None, None);
        let long = "x".repeat(DELETER_COMMENT_MAX + 1);
        assert!(trail.delete(None, Some(&long)).is_err());
        assert!(!trail.is_deleted());
    }

    #[test]
    fn test_prepare_purge_stamps_missing_metadata() {
        let mut trail = AuditTrail::new(None, None);
        trail.prepare_purge();
        assert!(trail.is_deleted());
        assert_eq!(trail.deleter_comment.as_deref(), Some(PURGE_COMMENT));
    }

    #[test]
    fn test_prepare_purge_keeps_existing_metadata() {
        let mut trail = AuditTrail::new(None, None);
        trail.delete(None, Some("spam account")).unwrap();
        let deleted_at = trail.deleted_at;

        trail.prepare_purge();
        assert_eq!(trail.deleted_at, deleted_at);
        assert_eq!(trail.deleter_comment.as_deref(), Some("spam account"));
    }

    #[test]
    fn test_zone_aware_write_read() {
        let zones = ZoneConverter::parse("+09:00").unwrap();
        let mut trail = AuditTrail::new(None, None);
        let at = FixedOffset::west_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, 8, 0, 0)
            .unwrap();

        trail.set_deleted_at(&zones, Some(at));
        let read = trail.deleted_at_in(&zones).unwrap();
        assert_eq!(read, at);
        assert_eq!(read.offset().local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn test_serialize_fields() {
        let zones = ZoneConverter::utc();
        let trail = AuditTrail::new(None, None);
        let map = trail.serialize_fields(&[AuditField::Id, AuditField::DeletedAt], &zones);

        assert_eq!(map.len(), 2);
        assert_eq!(map["id"], Value::String(trail.id.to_string()));
        assert_eq!(map["deleted_at"], Value::Null);
        assert_eq!(AuditField::from_name("deleter_id"), Some(AuditField::Deleter));
    }
}
