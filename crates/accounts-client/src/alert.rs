//! Alert dialogs and error messages
//!
//! Alerts are described, not drawn: an [`AlertSink`] decides how they reach
//! the user. [`LogAlerts`] writes them to the log, [`RecordingAlerts`] keeps
//! them for inspection.

use std::fmt;
use std::str::FromStr;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{error, info};

use crate::error::{ClientError, ClientResult};

/// Icon shown next to an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertIcon {
    Info,
    Success,
    Warning,
    Error,
    Question,
}

impl AlertIcon {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Question => "question",
        }
    }
}

impl fmt::Display for AlertIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertIcon {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "success" => Ok(Self::Success),
            "warning" => Ok(Self::Warning),
            "error" | "danger" => Ok(Self::Error),
            "question" => Ok(Self::Question),
            _ => Err(ClientError::InvalidString(s.to_string())),
        }
    }
}

/// Dialog flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Alert,
    Confirm,
    Prompt,
}

/// A dialog to show
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: Option<String>,
    pub message: String,
    pub icon: AlertIcon,
}

impl Alert {
    /// Plain alert, `info` icon unless given
    pub fn alert(message: impl Into<String>, icon: Option<AlertIcon>) -> ClientResult<Self> {
        Self::build(AlertKind::Alert, message.into(), icon.unwrap_or(AlertIcon::Info))
    }

    /// Yes/no question, `question` icon unless given
    pub fn confirm(message: impl Into<String>, icon: Option<AlertIcon>) -> ClientResult<Self> {
        Self::build(AlertKind::Confirm, message.into(), icon.unwrap_or(AlertIcon::Question))
    }

    /// Question with an input, `question` icon unless given
    pub fn prompt(message: impl Into<String>, icon: Option<AlertIcon>) -> ClientResult<Self> {
        Self::build(AlertKind::Prompt, message.into(), icon.unwrap_or(AlertIcon::Question))
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn build(kind: AlertKind, message: String, icon: AlertIcon) -> ClientResult<Self> {
        if message.is_empty() {
            return Err(ClientError::NotSpecified("Message"));
        }
        Ok(Self {
            kind,
            title: None,
            message,
            icon,
        })
    }
}

/// Receives alerts meant for the user
pub trait AlertSink: Send + Sync {
    fn show(&self, alert: &Alert);
}

/// Sink writing alerts to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlerts;

impl AlertSink for LogAlerts {
    fn show(&self, alert: &Alert) {
        info!(
            icon = %alert.icon,
            title = alert.title.as_deref().unwrap_or(""),
            "{}",
            alert.message
        );
    }
}

/// Sink keeping every alert shown
#[derive(Debug, Default)]
pub struct RecordingAlerts {
    shown: Mutex<Vec<Alert>>,
}

impl RecordingAlerts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.shown.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.shown.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shown.lock().is_empty()
    }
}

impl AlertSink for RecordingAlerts {
    fn show(&self, alert: &Alert) {
        self.shown.lock().push(alert.clone());
    }
}

/// An error reported to the user and the log
#[derive(Debug, Clone, Default)]
pub struct ErrorMessage {
    pub message: String,
    pub icon: Option<AlertIcon>,
    /// Log only
    pub no_alert: bool,
    pub prefix: Option<String>,
}

impl ErrorMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn icon(mut self, icon: AlertIcon) -> Self {
        self.icon = Some(icon);
        self
    }

    #[must_use]
    pub fn no_alert(mut self, no_alert: bool) -> Self {
        self.no_alert = no_alert;
        self
    }

    #[must_use]
    pub fn prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }

    /// Log `prefix: message` and alert unless silenced. Returns the message
    /// as displayed.
    pub fn emit(self, alerts: &dyn AlertSink) -> String {
        let message = non_blank(&self.message).unwrap_or("Unknown error.").to_string();
        let prefix = self
            .prefix
            .as_deref()
            .and_then(non_blank)
            .unwrap_or("Error")
            .to_string();
        let icon = self.icon.unwrap_or(AlertIcon::Error);

        error!("{prefix}: {message}");
        if !self.no_alert {
            alerts.show(&Alert {
                kind: AlertKind::Alert,
                title: Some(prefix),
                message: message.clone(),
                icon,
            });
        }
        message
    }
}

fn non_blank(s: &str) -> Option<&str> {
    Some(s.trim()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_parse() {
        assert_eq!("danger".parse::<AlertIcon>().unwrap(), AlertIcon::Error);
        assert_eq!("question".parse::<AlertIcon>().unwrap(), AlertIcon::Question);
        let err = "fatal".parse::<AlertIcon>().unwrap_err();
        assert_eq!(err.to_string(), "String invalid.");
    }

    #[test]
    fn test_dialog_defaults() {
        assert_eq!(Alert::alert("Hi", None).unwrap().icon, AlertIcon::Info);
        assert_eq!(Alert::confirm("Sure?", None).unwrap().icon, AlertIcon::Question);
        let prompt = Alert::prompt("Name?", Some(AlertIcon::Warning)).unwrap();
        assert_eq!(prompt.kind, AlertKind::Prompt);
        assert_eq!(prompt.icon, AlertIcon::Warning);

        let err = Alert::confirm("", None).unwrap_err();
        assert_eq!(err.to_string(), "Message not specified.");
    }

    #[test]
    fn test_error_message_defaults() {
        let alerts = RecordingAlerts::new();
        let shown = ErrorMessage::new("   ").prefix(Some(" ".into())).emit(&alerts);
        assert_eq!(shown, "Unknown error.");

        let alert = &alerts.alerts()[0];
        assert_eq!(alert.title.as_deref(), Some("Error"));
        assert_eq!(alert.icon, AlertIcon::Error);
    }

    #[test]
    fn test_error_message_no_alert() {
        let alerts = RecordingAlerts::new();
        let shown = ErrorMessage::new(" Offline ")
            .icon(AlertIcon::Warning)
            .no_alert(true)
            .emit(&alerts);
        assert_eq!(shown, "Offline");
        assert!(alerts.is_empty());
    }
}
