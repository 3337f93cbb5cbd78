//! Submitted forms and their field errors
//!
//! Forms deserialize from `application/x-www-form-urlencoded` bodies. Field
//! error messages are catalogue ids, translated when the form is rendered.

use std::collections::BTreeMap;
use std::fmt;

use accounts_common::{Translator, DEFAULT_DOMAIN, VALIDATORS_DOMAIN};
use accounts_core::User;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

// ============================================================================
// Field errors
// ============================================================================

/// One rejected constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Catalogue id
    pub message: String,
    /// `%placeholder%` values
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<(String, String)>,
}

/// Field errors keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<FieldError>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.add_with(field, message, Vec::new());
    }

    pub fn add_with(&mut self, field: &str, message: impl Into<String>, params: Vec<(String, String)>) {
        self.0.entry(field.to_string()).or_default().push(FieldError {
            message: message.into(),
            params,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with errors
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> &[FieldError] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// `Err(self)` when any field was rejected
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Translated messages per field
    pub fn translate(&self, translator: &Translator, locale: &str) -> BTreeMap<String, Vec<String>> {
        self.0
            .iter()
            .map(|(field, errors)| {
                let messages = errors
                    .iter()
                    .map(|e| {
                        let params: Vec<(&str, &str)> =
                            e.params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
                        let text = translator.trans_with(&e.message, &params, Some(VALIDATORS_DOMAIN), locale);
                        if text == e.message {
                            translator.trans_with(&e.message, &params, Some(DEFAULT_DOMAIN), locale)
                        } else {
                            text
                        }
                    })
                    .collect();
                (field.clone(), messages)
            })
            .collect()
    }
}

impl From<&ValidationErrors> for FormErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut out = Self::new();
        for (field, errs) in errors.field_errors() {
            for err in errs {
                let message = err
                    .message
                    .as_ref()
                    .map_or_else(|| err.code.to_string(), ToString::to_string);
                let mut params: Vec<(String, String)> = err
                    .params
                    .iter()
                    .filter(|(k, _)| k.as_ref() != "value")
                    .map(|(k, v)| {
                        let v = match v {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        (k.to_string(), v)
                    })
                    .collect();
                params.sort();
                out.add_with(&field, message, params);
            }
        }
        out
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, errors) in &self.0 {
            for e in errors {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {}", e.message)?;
                first = false;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Forms
// ============================================================================

/// Login form
#[derive(Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(rename = "_csrf_token", default)]
    pub csrf_token: String,
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"***")
            .finish_non_exhaustive()
    }
}

/// Register / edit form
#[derive(Clone, Default, Serialize, Deserialize, Validate)]
pub struct AccountForm {
    #[serde(default)]
    #[validate(length(max = 200, message = "username.too_long"))]
    pub username: String,

    #[validate(length(max = 200, message = "name.too_long"))]
    pub first_name: Option<String>,

    #[validate(length(max = 200, message = "name.too_long"))]
    pub last_name: Option<String>,

    #[validate(length(max = 200, message = "name.too_long"))]
    pub display_name: Option<String>,

    #[validate(
        email(message = "email.invalid"),
        length(max = 200, message = "email.too_long")
    )]
    pub email: Option<String>,

    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// Confirmation, compared against `password` by the account service
    #[serde(default, skip_serializing)]
    pub password_repeat: Option<String>,

    #[serde(rename = "_token", default, skip_serializing)]
    pub token: String,
}

impl fmt::Debug for AccountForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish_non_exhaustive()
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AccountForm {
    /// Form pre-filled from a stored user
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            display_name: user.display_name.clone(),
            email: user.email.clone(),
            ..Self::default()
        }
    }

    /// Trim text fields and turn empty inputs into `None`.
    /// Passwords are not trimmed.
    pub fn normalize(&mut self) {
        self.username = self.username.trim().to_string();
        self.first_name = blank_to_none(self.first_name.take());
        self.last_name = blank_to_none(self.last_name.take());
        self.display_name = blank_to_none(self.display_name.take());
        self.email = blank_to_none(self.email.take());
        self.password = self.password.take().filter(|p| !p.is_empty());
        self.password_repeat = self.password_repeat.take().filter(|p| !p.is_empty());
    }

    /// Copy the profile fields onto a user
    pub fn apply_profile(&self, user: &mut User) {
        user.first_name.clone_from(&self.first_name);
        user.last_name.clone_from(&self.last_name);
        user.display_name.clone_from(&self.display_name);
        user.email.clone_from(&self.email);
    }
}

/// Account removal form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoveAccountForm {
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(rename = "_token", default)]
    pub token: String,
}

/// Form carrying only a CSRF token
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenForm {
    #[serde(rename = "_token", default)]
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> AccountForm {
        AccountForm {
            username: "  jdoe ".to_string(),
            first_name: Some(" Jane ".to_string()),
            last_name: Some("   ".to_string()),
            email: Some("jane@example.com".to_string()),
            password: Some("Secret123".to_string()),
            password_repeat: Some("Secret123".to_string()),
            ..AccountForm::default()
        }
    }

    #[test]
    fn test_normalize() {
        let mut form = form();
        form.password_repeat = Some(String::new());
        form.normalize();
        assert_eq!(form.username, "jdoe");
        assert_eq!(form.first_name.as_deref(), Some("Jane"));
        assert!(form.last_name.is_none());
        assert!(form.password_repeat.is_none());
        assert_eq!(form.password.as_deref(), Some("Secret123"));
    }

    #[test]
    fn test_validator_errors_become_field_errors() {
        let mut form = form();
        form.email = Some("not-an-email".to_string());
        form.display_name = Some("x".repeat(201));

        let errors = FormErrors::from(&form.validate().unwrap_err());
        assert_eq!(errors.get("email")[0].message, "email.invalid");
        let too_long = &errors.get("display_name")[0];
        assert_eq!(too_long.message, "name.too_long");
        assert!(too_long.params.contains(&("max".to_string(), "200".to_string())));
        assert!(!errors.has("username"));
    }

    #[test]
    fn test_translate_falls_back_to_messages_domain() {
        let translator = Translator::bundled().unwrap();
        let mut errors = FormErrors::new();
        errors.add_with("display_name", "name.too_long", vec![("max".into(), "200".into())]);
        errors.add("password", "sentence.password_encoding_failed");

        let translated = errors.translate(&translator, "en");
        assert_eq!(translated["display_name"], vec!["This value may not exceed 200 characters."]);
        assert_eq!(
            translated["password"],
            vec!["The password could not be encoded, please try another one."]
        );
    }

    #[test]
    fn test_into_result_and_display() {
        assert!(FormErrors::new().into_result().is_ok());
        let mut errors = FormErrors::new();
        errors.add("email", "email.taken");
        errors.add("username", "username.taken");
        assert_eq!(errors.to_string(), "email: email.taken; username: username.taken");
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_login_form_debug_hides_password() {
        let form = LoginForm {
            username: "jdoe".into(),
            password: "hunter2".into(),
            csrf_token: String::new(),
        };
        assert!(!format!("{form:?}").contains("hunter2"));
    }
}
