//! Authentication utilities

mod csrf;
mod password;

pub use csrf::{
    CsrfTokenManager, CsrfTokenStorage, ACCOUNT_DELETE_INTENTION, ACCOUNT_INTENTION,
    ADMIN_INTENTION, AUTHENTICATE_INTENTION,
};
pub use password::{hash_password, verify_password, PasswordPolicy, PasswordService};
