//! User entity - a registered account

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

use super::audit::{AuditField, AuditTrail, Audited};
use crate::error::DomainError;
use crate::serialization::{text_value, timestamp_value, EntityField, FieldSerialize};
use crate::value_objects::{EntityId, ZoneConverter};

/// Role granted to every registered account
pub const ROLE_USER: &str = "ROLE_USER";

/// Role required for account administration
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

pub const USERNAME_MAX: usize = 200;
pub const NAME_MAX: usize = 200;
pub const PASSWORD_HASH_MAX: usize = 128;

/// User account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub audit: AuditTrail,
    pub username: String,
    /// `None` after credential erasure
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub last_seen_at: Option<DateTime<Utc>>,
    roles: BTreeSet<String>,
}

impl User {
    /// Create a new user holding [`ROLE_USER`]
    pub fn new(username: impl Into<String>, creator: Option<EntityId>) -> Self {
        Self {
            audit: AuditTrail::new(creator, None),
            username: username.into(),
            password_hash: None,
            first_name: None,
            last_name: None,
            display_name: None,
            email: None,
            last_seen_at: None,
            roles: BTreeSet::from([ROLE_USER.to_string()]),
        }
    }

    /// Rebuild from persisted parts
    pub fn from_parts(audit: AuditTrail, username: String, roles: impl IntoIterator<Item = String>) -> Self {
        Self {
            audit,
            username,
            password_hash: None,
            first_name: None,
            last_name: None,
            display_name: None,
            email: None,
            last_seen_at: None,
            roles: roles.into_iter().collect(),
        }
    }

    /// `"first last"`, or `None` when both are blank
    pub fn name(&self) -> Option<String> {
        let joined = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        );
        let trimmed = joined.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// `"Display <email>"` for outgoing mail
    pub fn mailer_address(&self) -> Option<String> {
        self.email.as_ref().map(|email| format!("{self} <{email}>"))
    }

    /// Roles, sorted
    pub fn roles(&self) -> Vec<String> {
        self.roles.iter().cloned().collect()
    }

    pub fn set_roles(&mut self, roles: impl IntoIterator<Item = String>) {
        self.roles = roles.into_iter().collect();
    }

    pub fn has_role(&self, role: &str) -> Result<bool, DomainError> {
        let role = require_role(role)?;
        Ok(self.roles.contains(role))
    }

    /// Returns whether the role was newly added
    pub fn add_role(&mut self, role: &str) -> Result<bool, DomainError> {
        let role = require_role(role)?;
        Ok(self.roles.insert(role.to_string()))
    }

    /// Returns whether the role was present
    pub fn remove_role(&mut self, role: &str) -> Result<bool, DomainError> {
        let role = require_role(role)?;
        Ok(self.roles.remove(role))
    }

    /// Drop the stored password hash
    pub fn erase_credentials(&mut self) {
        self.password_hash = None;
    }

    /// Same username and role set as a previously authenticated snapshot
    pub fn matches_identity<'a, I>(&self, username: &str, roles: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let roles: BTreeSet<&str> = roles.into_iter().collect();
        self.username == username && self.roles.iter().map(String::as_str).eq(roles)
    }

    pub fn touch_last_seen(&mut self) {
        self.last_seen_at = Some(Utc::now());
    }

    pub fn last_seen_at_in(&self, zones: &ZoneConverter) -> Option<DateTime<FixedOffset>> {
        zones.read(self.last_seen_at)
    }

    pub fn set_last_seen_at<Tz: TimeZone>(&mut self, zones: &ZoneConverter, value: Option<DateTime<Tz>>) {
        self.last_seen_at = zones.write(value);
    }

    /// Check column limits before persisting
    pub fn validate(&self) -> Result<(), DomainError> {
        let len = self.username.trim().chars().count();
        if len == 0 {
            return Err(DomainError::ValidationError("Username is required".to_string()));
        }
        if len > USERNAME_MAX {
            return Err(DomainError::TooLong {
                field: "username",
                max: USERNAME_MAX,
            });
        }

        for (field, value) in [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("display_name", &self.display_name),
            ("email", &self.email),
        ] {
            if value.as_ref().is_some_and(|v| v.chars().count() > NAME_MAX) {
                return Err(DomainError::TooLong { field, max: NAME_MAX });
            }
        }

        if self
            .password_hash
            .as_ref()
            .is_some_and(|h| h.len() > PASSWORD_HASH_MAX)
        {
            return Err(DomainError::TooLong {
                field: "password",
                max: PASSWORD_HASH_MAX,
            });
        }
        Ok(())
    }
}

fn require_role(role: &str) -> Result<&str, DomainError> {
    let role = role.trim();
    if role.is_empty() {
        return Err(DomainError::ValidationError("Role must not be empty".to_string()));
    }
    Ok(role)
}

impl fmt::Display for User {
    /// Display name, else full name, else id
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(display) = self.display_name.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            return f.write_str(display);
        }
        match self.name() {
            Some(name) => f.write_str(&name),
            None => write!(f, "{}", self.audit.id),
        }
    }
}

impl Audited for User {
    fn audit(&self) -> &AuditTrail {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditTrail {
        &mut self.audit
    }
}

/// Serializable user fields. The password hash is never exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    Audit(AuditField),
    Username,
    FirstName,
    LastName,
    DisplayName,
    Email,
    LastSeenAt,
    Roles,
}

impl UserField {
    /// Fields shown on a profile page
    pub const PROFILE: &'static [Self] = &[
        Self::Audit(AuditField::Id),
        Self::Username,
        Self::FirstName,
        Self::LastName,
        Self::DisplayName,
        Self::Email,
        Self::Audit(AuditField::CreatedAt),
        Self::LastSeenAt,
    ];
}

impl EntityField for UserField {
    const ALL: &'static [Self] = &[
        Self::Audit(AuditField::Id),
        Self::Audit(AuditField::CreatedAt),
        Self::Audit(AuditField::ModifiedAt),
        Self::Audit(AuditField::AccessedAt),
        Self::Audit(AuditField::DeletedAt),
        Self::Audit(AuditField::Creator),
        Self::Audit(AuditField::Owner),
        Self::Audit(AuditField::Deleter),
        Self::Audit(AuditField::DeleterComment),
        Self::Username,
        Self::FirstName,
        Self::LastName,
        Self::DisplayName,
        Self::Email,
        Self::LastSeenAt,
        Self::Roles,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Audit(field) => field.name(),
            Self::Username => "username",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::DisplayName => "display_name",
            Self::Email => "email",
            Self::LastSeenAt => "last_seen_at",
            Self::Roles => "roles",
        }
    }
}

impl FieldSerialize for User {
    type Field = UserField;

    fn field_value(&self, field: UserField, zones: &ZoneConverter) -> Value {
        match field {
            UserField::Audit(field) => self.audit.field_value(field, zones),
            UserField::Username => Value::String(self.username.clone()),
            UserField::FirstName => text_value(self.first_name.as_deref()),
            UserField::LastName => text_value(self.last_name.as_deref()),
            UserField::DisplayName => text_value(self.display_name.as_deref()),
            UserField::Email => text_value(self.email.as_deref()),
            UserField::LastSeenAt => timestamp_value(self.last_seen_at_in(zones)),
            UserField::Roles => Value::Array(self.roles.iter().cloned().map(Value::String).collect()),
        }
    }
}
