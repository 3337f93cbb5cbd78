//! Query criteria and ordering for repository lookups
//!
//! Field names are checked against an entity's allow-list before they reach
//! a query; an unknown or empty name is a programming error.

use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::DomainError;
use crate::value_objects::EntityId;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse `ASC` / `DESC`, trimmed and case-insensitive
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            _ => Err(DomainError::InvalidQuery(format!("Order \"{s}\" invalid."))),
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Ensure a field name is non-empty and present in the allow-list
pub fn validate_field(field: &str, allowed: &[&str]) -> Result<(), DomainError> {
    if field.trim().is_empty() {
        return Err(DomainError::InvalidQuery(
            "Field name must be a non-empty string.".to_string(),
        ));
    }
    if !allowed.contains(&field) {
        return Err(DomainError::InvalidQuery(format!("Field \"{field}\" invalid.")));
    }
    Ok(())
}

/// Ordered list of `(field, direction)` pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBy(Vec<(String, SortOrder)>);

impl OrderBy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asc(self, field: impl Into<String>) -> Self {
        self.then(field, SortOrder::Asc)
    }

    pub fn desc(self, field: impl Into<String>) -> Self {
        self.then(field, SortOrder::Desc)
    }

    pub fn then(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.0.push((field.into(), order));
        self
    }

    /// Build from raw `(field, "asc"|"desc")` pairs
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut order_by = Self::new();
        for (field, order) in pairs {
            order_by = order_by.then(field, SortOrder::parse(order)?);
        }
        Ok(order_by)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SortOrder)> {
        self.0.iter().map(|(f, o)| (f.as_str(), *o))
    }

    pub fn validate(&self, allowed: &[&str]) -> Result<(), DomainError> {
        self.0.iter().try_for_each(|(f, _)| validate_field(f, allowed))
    }
}

/// Value compared against a field in [`Criteria`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CriteriaValue {
    Text(String),
    Uuid(Uuid),
    Bool(bool),
    Null,
}

impl CriteriaValue {
    /// JSON form, comparable with serialized entity fields
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Uuid(u) => Value::String(u.hyphenated().to_string()),
            Self::Bool(b) => Value::Bool(*b),
            Self::Null => Value::Null,
        }
    }
}

impl From<&str> for CriteriaValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CriteriaValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Uuid> for CriteriaValue {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl From<EntityId> for CriteriaValue {
    fn from(id: EntityId) -> Self {
        Self::Uuid(id.into_inner())
    }
}

impl From<bool> for CriteriaValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<CriteriaValue>> From<Option<T>> for CriteriaValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Equality criteria, combined with AND
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria(Vec<(String, CriteriaValue)>);

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// `field = value` (or `field IS NULL` for [`CriteriaValue::Null`])
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<CriteriaValue>) -> Self {
        self.0.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CriteriaValue)> {
        self.0.iter().map(|(f, v)| (f.as_str(), v))
    }

    pub fn validate(&self, allowed: &[&str]) -> Result<(), DomainError> {
        self.0.iter().try_for_each(|(f, _)| validate_field(f, allowed))
    }
}
