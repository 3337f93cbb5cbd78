//! Business logic services
//!
//! Services borrow the [`ServiceContext`] for the duration of a request and
//! work on the caller's [`SessionData`](accounts_cache::SessionData).

pub mod account;
pub mod auth;
pub mod context;
pub mod error;

pub use account::AccountService;
pub use auth::AuthService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
