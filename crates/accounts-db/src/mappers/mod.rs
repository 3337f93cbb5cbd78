//! Entity to model mappers
//!
//! - `From<Model> for Entity`: Convert database rows to domain objects
//! - `*Row` structs: borrow entity data for binding into statements

mod user;

pub use user::UserRow;
