//! Data transfer objects
//!
//! - Forms submitted by the browser, with validation
//! - Field errors attached to rejected forms
//! - Views returned to the HTTP layer

pub mod forms;
pub mod views;

pub use forms::{AccountForm, FieldError, FormErrors, LoginForm, RemoveAccountForm, TokenForm};
pub use views::{AccountFormView, AuthOutcome, LoginView, UserSummary};
