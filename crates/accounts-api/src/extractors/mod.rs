//! Axum extractors for request handling
//!
//! Custom extractors for the session, route locale, client address, forms
//! and query strings.

mod client_ip;
mod form;
mod locale;
mod path;
mod query;
mod session;

pub use client_ip::ClientIp;
pub use form::FormBody;
pub use locale::Locale;
pub use path::UserIdPath;
pub use query::{ListParams, ListQuery, SORTABLE};
pub use session::WebSession;
