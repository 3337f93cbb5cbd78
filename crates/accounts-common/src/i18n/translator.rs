//! Message catalogue and translator
//!
//! Catalogue layout:
//! `{"fallback": "en", "defaultDomain": "messages", "translations": {locale: {domain: {id: text}}}}`.
//! The same JSON is served to the browser-side loader and loaded here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Catalogue shipped with the server
const BUNDLED_CATALOGUE: &str = include_str!("../../translations/catalogue.json");

/// Domain used when none is given
pub const DEFAULT_DOMAIN: &str = "messages";

/// Domain holding form validation messages
pub const VALIDATORS_DOMAIN: &str = "validators";

type Domains = BTreeMap<String, BTreeMap<String, String>>;

/// Serialized message catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalogue {
    #[serde(default = "default_fallback")]
    pub fallback: String,
    #[serde(rename = "defaultDomain", default = "default_domain")]
    pub default_domain: String,
    #[serde(default)]
    pub translations: BTreeMap<String, Domains>,
}

fn default_fallback() -> String {
    "en".to_string()
}

fn default_domain() -> String {
    DEFAULT_DOMAIN.to_string()
}

impl Default for Catalogue {
    fn default() -> Self {
        Self {
            fallback: default_fallback(),
            default_domain: default_domain(),
            translations: BTreeMap::new(),
        }
    }
}

impl Catalogue {
    /// Copy restricted to the given locales plus the fallback locale
    pub fn for_locales(&self, locales: &[&str]) -> Self {
        let translations = self
            .translations
            .iter()
            .filter(|(locale, _)| locales.contains(&locale.as_str()) || **locale == self.fallback)
            .map(|(locale, domains)| (locale.clone(), domains.clone()))
            .collect();
        Self {
            fallback: self.fallback.clone(),
            default_domain: self.default_domain.clone(),
            translations,
        }
    }
}

/// Errors raised while loading a catalogue
#[derive(Debug, thiserror::Error)]
pub enum TranslatorError {
    #[error("Invalid translation catalogue: {0}")]
    InvalidCatalogue(#[from] serde_json::Error),

    #[error("Failed to read translation catalogue {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Looks up messages by id, domain and locale
#[derive(Debug, Clone, Default)]
pub struct Translator {
    catalogue: Catalogue,
}

impl Translator {
    pub fn new(catalogue: Catalogue) -> Self {
        Self { catalogue }
    }

    /// Catalogue bundled with the crate
    pub fn bundled() -> Result<Self, TranslatorError> {
        Self::from_json(BUNDLED_CATALOGUE)
    }

    /// Catalogue read from a JSON file
    pub fn from_path(path: &str) -> Result<Self, TranslatorError> {
        let json = std::fs::read_to_string(path).map_err(|source| TranslatorError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, TranslatorError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Merge a JSON catalogue into this one; later messages win
    pub fn load_json(&mut self, json: &str) -> Result<(), TranslatorError> {
        let incoming: Catalogue = serde_json::from_str(json)?;
        self.catalogue.fallback = incoming.fallback;
        self.catalogue.default_domain = incoming.default_domain;
        for (locale, domains) in incoming.translations {
            let target = self.catalogue.translations.entry(locale).or_default();
            for (domain, messages) in domains {
                target.entry(domain).or_default().extend(messages);
            }
        }
        Ok(())
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn has_locale(&self, locale: &str) -> bool {
        self.catalogue.translations.contains_key(locale)
    }

    /// Translate in the default domain
    pub fn trans(&self, id: &str, locale: &str) -> String {
        self.trans_with(id, &[], None, locale)
    }

    /// Translate with `%placeholder%` parameters.
    ///
    /// Falls back to the fallback locale, then to the id itself.
    pub fn trans_with(
        &self,
        id: &str,
        params: &[(&str, &str)],
        domain: Option<&str>,
        locale: &str,
    ) -> String {
        let domain = domain.unwrap_or(&self.catalogue.default_domain);
        let message = self
            .lookup(locale, domain, id)
            .or_else(|| self.lookup(&self.catalogue.fallback, domain, id))
            .unwrap_or(id);

        params
            .iter()
            .fold(message.to_string(), |acc, (key, value)| {
                acc.replace(&format!("%{key}%"), value)
            })
    }

    fn lookup(&self, locale: &str, domain: &str, id: &str) -> Option<&str> {
        self.catalogue
            .translations
            .get(locale)?
            .get(domain)?
            .get(id)
            .map(String::as_str)
    }
}
