//! Buttons, modals, tooltips and toasts
//!
//! Option parsing and class computation for the Bootstrap components the
//! pages use.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{ClientError, ClientResult};

/// Parse an optional attribute value, `None` giving the default
fn parse_or_default<T>(s: Option<&str>) -> ClientResult<T>
where
    T: FromStr<Err = ClientError> + Default,
{
    s.map_or_else(|| Ok(T::default()), str::parse)
}

// ============================================================================
// Sizes
// ============================================================================

macro_rules! size_enum {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            #[serde(rename = "xs")]
            ExtraSmall,
            #[serde(rename = "sm")]
            Small,
            #[default]
            #[serde(rename = "md")]
            Medium,
            #[serde(rename = "lg")]
            Large,
            #[serde(rename = "xl")]
            ExtraLarge,
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    Self::ExtraSmall => "xs",
                    Self::Small => "sm",
                    Self::Medium => "md",
                    Self::Large => "lg",
                    Self::ExtraLarge => "xl",
                }
            }

            pub fn parse(s: Option<&str>) -> ClientResult<Self> {
                parse_or_default(s)
            }
        }

        impl FromStr for $name {
            type Err = ClientError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    "xs" => Ok(Self::ExtraSmall),
                    "sm" => Ok(Self::Small),
                    "md" => Ok(Self::Medium),
                    "lg" => Ok(Self::Large),
                    "xl" => Ok(Self::ExtraLarge),
                    _ => Err(ClientError::InvalidString(s.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

size_enum!(
    /// Button size, `md` by default
    ButtonSize
);
size_enum!(
    /// Modal dialog size, `md` by default
    ModalSize
);

// ============================================================================
// Types
// ============================================================================

/// Button colour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ButtonType {
    /// No colour class
    Plain,
    #[default]
    Primary,
    Secondary,
    Tertiary,
    Inverse,
    Info,
    Success,
    Warning,
    Danger,
    Grey,
}

impl ButtonType {
    /// Class added to the button, empty for [`ButtonType::Plain`]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "",
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Tertiary => "tertiary",
            Self::Inverse => "inverse",
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Danger => "danger",
            Self::Grey => "grey",
        }
    }

    pub fn parse(s: Option<&str>) -> ClientResult<Self> {
        parse_or_default(s)
    }
}

impl FromStr for ButtonType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Plain),
            "primary" => Ok(Self::Primary),
            "secondary" => Ok(Self::Secondary),
            "tertiary" => Ok(Self::Tertiary),
            "inverse" => Ok(Self::Inverse),
            "info" => Ok(Self::Info),
            "success" => Ok(Self::Success),
            "warning" => Ok(Self::Warning),
            "danger" | "error" => Ok(Self::Danger),
            "grey" => Ok(Self::Grey),
            _ => Err(ClientError::InvalidString(s.to_string())),
        }
    }
}

/// Modal colour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ModalType {
    #[default]
    Primary,
    Secondary,
    Tertiary,
    Inverse,
    Info,
    Success,
    Warning,
    Danger,
    Grey,
}

impl ModalType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Tertiary => "tertiary",
            Self::Inverse => "inverse",
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Danger => "danger",
            Self::Grey => "grey",
        }
    }

    pub fn parse(s: Option<&str>) -> ClientResult<Self> {
        parse_or_default(s)
    }
}

impl FromStr for ModalType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "primary" => Ok(Self::Primary),
            "secondary" => Ok(Self::Secondary),
            "tertiary" => Ok(Self::Tertiary),
            "inverse" => Ok(Self::Inverse),
            "info" => Ok(Self::Info),
            "success" => Ok(Self::Success),
            "warning" => Ok(Self::Warning),
            "danger" | "error" => Ok(Self::Danger),
            "grey" => Ok(Self::Grey),
            _ => Err(ClientError::InvalidString(s.to_string())),
        }
    }
}

// ============================================================================
// Modal
// ============================================================================

/// Footer button of a modal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalButton {
    pub text: String,
    pub kind: Option<ButtonType>,
    pub href: Option<String>,
}

impl ModalButton {
    pub fn classes(&self) -> Vec<&'static str> {
        let mut classes = vec!["btn"];
        if let Some(kind) = self.kind.filter(|k| *k != ButtonType::Plain) {
            classes.push(kind.as_str());
        }
        classes
    }

    pub fn href(&self) -> &str {
        self.href.as_deref().unwrap_or("#")
    }
}

/// Options of a customisable modal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalOptions {
    pub body: String,
    pub body_scroll: bool,
    /// Static backdrop, no keyboard dismissal
    pub blocking: bool,
    pub title: Option<String>,
    pub size: Option<ModalSize>,
    pub kind: Option<ModalType>,
    pub no_close: bool,
    pub buttons: Vec<ModalButton>,
}

/// Backdrop behaviour of a modal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backdrop {
    /// Click outside closes
    Dismiss,
    Static,
}

impl ModalOptions {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn backdrop(&self) -> Backdrop {
        if self.blocking {
            Backdrop::Static
        } else {
            Backdrop::Dismiss
        }
    }

    pub fn keyboard(&self) -> bool {
        !self.blocking
    }

    /// Attributes set on the modal element
    pub fn data_attributes(&self) -> Vec<(&'static str, &'static str)> {
        if self.blocking {
            vec![("data-bs-backdrop", "static"), ("data-bs-keyboard", "false")]
        } else {
            Vec::new()
        }
    }

    pub fn dialog_classes(&self) -> Vec<String> {
        let mut classes = vec!["modal-dialog".to_string(), "modal-dialog-centered".to_string()];
        if self.body_scroll {
            classes.push("modal-dialog-scrollable".to_string());
        }
        if let Some(size) = self.size {
            classes.push(format!("modal-{size}"));
        }
        if let Some(kind) = self.kind {
            classes.push(format!("modal-{}", kind.as_str()));
        }
        classes
    }

    /// A header is drawn for a title or a close button
    pub fn has_header(&self) -> bool {
        self.title.is_some() || !self.no_close
    }
}

// ============================================================================
// Tooltip, toast, ids
// ============================================================================

/// Classes of an element copied onto its tooltip
pub fn tooltip_classes<'a>(element_classes: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    element_classes
        .into_iter()
        .filter(|c| {
            c.get(..8)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("tooltip-"))
        })
        .collect()
}

/// Toast behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ToastOptions {
    /// Toasts stay until dismissed
    pub autohide: bool,
}

/// Random identity for a new entity
pub fn generate_entity_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
