//! Value objects - immutable types that represent domain concepts

mod entity_id;
mod include_deleted;
mod query;
mod time_zone;

pub use entity_id::{is_uuid, short_uuid, EntityId, EntityIdParseError};
pub use include_deleted::IncludeDeleted;
pub use query::{validate_field, Criteria, CriteriaValue, OrderBy, SortOrder};
pub use time_zone::{parse_offset, ZoneConverter};
