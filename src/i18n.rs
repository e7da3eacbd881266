//! Translation catalogues loaded from `<dir>/<lng>/translation.json`

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::constants::languages;

pub const FALLBACK_LANGUAGE: &str = languages::EN;

pub struct I18n {
    dir: PathBuf,
    language: String,
    catalogs: HashMap<String, Value>,
}

impl I18n {
    /// Load the fallback catalogue and the one for `language`.
    ///
    /// A missing catalogue is logged and treated as empty, so lookups fall
    /// through to the key itself.
    pub fn load(dir: impl Into<PathBuf>, language: &str) -> Self {
        let mut i18n = Self {
            dir: dir.into(),
            language: language.to_string(),
            catalogs: HashMap::new(),
        };

        i18n.ensure_loaded(FALLBACK_LANGUAGE);
        i18n.ensure_loaded(language);
        i18n
    }

    /// Build from in-memory catalogues, keyed by language
    pub fn from_catalogs(language: &str, catalogs: HashMap<String, Value>) -> Self {
        Self {
            dir: PathBuf::new(),
            language: language.to_string(),
            catalogs,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn change_language(&mut self, language: &str) {
        self.ensure_loaded(language);
        self.language = language.to_string();
        debug!(language = %language, "Language changed");
    }

    /// Translate `key`: active language, then fallback, then the key
    pub fn t(&self, key: &str) -> String {
        [self.language.as_str(), FALLBACK_LANGUAGE]
            .iter()
            .filter_map(|lng| self.catalogs.get(*lng))
            .find_map(|catalog| lookup(catalog, key))
            .unwrap_or_else(|| key.to_string())
    }

    /// Translate and replace `{{name}}` placeholders. Values are inserted
    /// verbatim.
    pub fn t_with(&self, key: &str, vars: &[(&str, &str)]) -> String {
        let mut text = self.t(key);
        for (name, value) in vars {
            text = text.replace(&format!("{{{{{}}}}}", name), value);
        }
        text
    }

    fn ensure_loaded(&mut self, language: &str) {
        if self.catalogs.contains_key(language) {
            return;
        }

        match read_catalog(&self.dir, language) {
            Ok(catalog) => {
                debug!(language = %language, "Loaded translations");
                self.catalogs.insert(language.to_string(), catalog);
            }
            Err(e) => warn!("No translations for {}: {:#}", language, e),
        }
    }
}

/// Pick the UI language: explicit choice, then the stored preference, then
/// the fallback. Unsupported values are skipped.
pub fn detect_language(explicit: Option<&str>, stored: Option<&str>) -> String {
    explicit
        .into_iter()
        .chain(stored)
        .find(|lng| languages::is_supported(lng))
        .unwrap_or(FALLBACK_LANGUAGE)
        .to_string()
}

fn read_catalog(dir: &Path, language: &str) -> Result<Value> {
    let path = dir.join(language).join("translation.json");
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn lookup(catalog: &Value, key: &str) -> Option<String> {
    key.split('.')
        .try_fold(catalog, |node, part| node.get(part))
        .and_then(Value::as_str)
        .map(str::to_string)
}
