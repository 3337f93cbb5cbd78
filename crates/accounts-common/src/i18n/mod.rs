//! Translation catalogue

mod translator;

pub use translator::{Catalogue, Translator, TranslatorError, DEFAULT_DOMAIN, VALIDATORS_DOMAIN};
