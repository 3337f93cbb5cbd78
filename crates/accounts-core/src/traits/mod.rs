//! Repository traits (ports)

mod repositories;

pub use repositories::{RepoResult, SoftDeleteTable, UserRepository, UserPredicate};
