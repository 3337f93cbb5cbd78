//! Service results handed to the HTTP layer

use std::collections::BTreeMap;

use accounts_core::{User, ZoneConverter};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::forms::AccountForm;

/// Data for the login page
#[derive(Debug, Clone, Serialize)]
pub struct LoginView {
    pub last_username: Option<String>,
    /// Error of the previous attempt, shown once
    pub error: Option<String>,
    pub csrf_token: String,
}

/// Successful authentication
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub user: User,
    /// Page the visitor was sent away from, if any
    pub target_path: Option<String>,
}

/// Data for the register and edit pages
#[derive(Debug, Clone, Serialize)]
pub struct AccountFormView {
    pub form: AccountForm,
    /// Translated field errors
    pub errors: BTreeMap<String, Vec<String>>,
    pub csrf_token: String,
}

/// Row of the admin user list, timestamps in the working zone
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub roles: Vec<String>,
    pub created_at: DateTime<FixedOffset>,
    pub last_seen_at: Option<DateTime<FixedOffset>>,
    pub deleted_at: Option<DateTime<FixedOffset>>,
    pub deleter_comment: Option<String>,
}

impl UserSummary {
    pub fn new(user: &User, zones: &ZoneConverter) -> Self {
        Self {
            id: user.audit.id.to_string(),
            username: user.username.clone(),
            name: user.name(),
            email: user.email.clone(),
            roles: user.roles(),
            created_at: user.audit.created_at_in(zones),
            last_seen_at: user.last_seen_at_in(zones),
            deleted_at: user.audit.deleted_at_in(zones),
            deleter_comment: user.audit.deleter_comment.clone(),
        }
    }
}
