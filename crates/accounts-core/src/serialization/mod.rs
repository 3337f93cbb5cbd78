//! Field-driven serialization
//!
//! Each entity declares a field enum and maps every variant to its accessor
//! with an exhaustive `match`, so adding a field without an accessor fails to
//! compile. Timestamps are rendered in the working zone.

use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};

use crate::value_objects::{EntityId, ZoneConverter};

/// A serializable field of an entity type
pub trait EntityField: Copy + Sized + 'static {
    /// Every field, in declaration order
    const ALL: &'static [Self];

    /// Stable field name (also the storage column name)
    fn name(self) -> &'static str;

    /// Reverse of [`Self::name`]
    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }
}

/// Entity whose fields can be read by [`EntityField`]
pub trait FieldSerialize {
    type Field: EntityField;

    /// Value of a single field
    fn field_value(&self, field: Self::Field, zones: &ZoneConverter) -> Value;

    /// Map of the requested fields, in the order given
    fn serialize_fields(&self, fields: &[Self::Field], zones: &ZoneConverter) -> Map<String, Value> {
        fields
            .iter()
            .map(|f| (f.name().to_string(), self.field_value(*f, zones)))
            .collect()
    }

    /// Map of every field
    fn serialize_all(&self, zones: &ZoneConverter) -> Map<String, Value> {
        self.serialize_fields(Self::Field::ALL, zones)
    }
}

pub(crate) fn timestamp_value(value: Option<DateTime<FixedOffset>>) -> Value {
    value.map_or(Value::Null, |v| Value::String(v.to_rfc3339()))
}

pub(crate) fn id_value(value: Option<EntityId>) -> Value {
    value.map_or(Value::Null, |v| Value::String(v.to_string()))
}

pub(crate) fn text_value(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |v| Value::String(v.to_string()))
}
