//! Accounts Client
//!
//! Browser-side behaviour of the account pages expressed as a library:
//! validated AJAX requests, alert descriptions, UI option parsing and the
//! network-first translations loader with its local cache.

pub mod ajax;
pub mod alert;
pub mod config;
pub mod error;
pub mod storage;
pub mod translations;
pub mod ui;

pub use ajax::{
    ajax_error_message, handle_ajax_error, validate_ajax_response, AjaxMethod, AjaxRequest,
    AjaxResponse, AjaxTransport, PreparedRequest, ReqwestTransport, ValidateOptions,
};
pub use alert::{Alert, AlertIcon, AlertKind, AlertSink, ErrorMessage, LogAlerts, RecordingAlerts};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use storage::{FileStorage, LocalStorage, MemoryStorage};
pub use translations::{
    ClientEvent, LoadSource, LoadState, TranslationLoader, TRANSLATIONS_STORAGE_KEY,
};
pub use ui::{
    generate_entity_id, tooltip_classes, Backdrop, ButtonSize, ButtonType, ModalButton, ModalOptions,
    ModalSize, ModalType, ToastOptions,
};
