//! # accounts-service
//!
//! Application layer: authentication, account management, forms and views.

pub mod dto;
pub mod services;

pub use dto::{
    AccountForm, AccountFormView, AuthOutcome, FieldError, FormErrors, LoginForm, LoginView,
    RemoveAccountForm, TokenForm, UserSummary,
};
pub use services::{
    AccountService, AuthService, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult,
};
