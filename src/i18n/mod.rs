//! Translation dictionaries and message resolution.
//!
//! Each locale has a JSON dictionary at `<data>/<translations>/<locale>.json`
//! holding nested string tables. Lookup never fails a build: an unknown
//! locale, a missing key or a non-string value all echo the key back, so a
//! translation gap shows up in rendered output instead of aborting.
//!
//! Dictionary completeness is checked once at load time instead: every key
//! present in the default locale must exist in every other locale.

pub mod locale;

pub use locale::Locales;

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde_json::Value;
use std::{
    collections::HashMap,
    fs,
    path::Path,
    sync::LazyLock,
};

// ============================================================================
// Types
// ============================================================================

/// Loaded translation tables for all configured locales.
#[derive(Debug, Clone)]
pub struct Translations {
    tables: HashMap<String, Value>,
}

// ============================================================================
// Public API
// ============================================================================

impl Translations {
    /// Load `<locale>.json` dictionaries for every configured locale and
    /// verify completeness against the default locale.
    pub fn load(dir: &Path, locales: &[String], default_locale: &str) -> Result<Self> {
        let mut tables = HashMap::with_capacity(locales.len());

        for locale in locales {
            let path = dir.join(format!("{locale}.json"));
            let content = fs::read_to_string(&path).with_context(|| {
                format!("Failed to read translation dictionary: {}", path.display())
            })?;
            let table: Value = serde_json::from_str(&content).with_context(|| {
                format!("Invalid JSON in translation dictionary: {}", path.display())
            })?;
            if !table.is_object() {
                bail!(
                    "Translation dictionary must be a JSON object: {}",
                    path.display()
                );
            }
            tables.insert(locale.clone(), table);
        }

        let translations = Self { tables };
        translations.check_completeness(locales, default_locale)?;
        Ok(translations)
    }

    /// Resolve a dot-separated key for a locale, interpolating `{{name}}`
    /// placeholders from `params`.
    ///
    /// The locale folds to its primary subtag first (`zh-CN` reads the
    /// `zh` dictionary). Fail-soft: any miss echoes the key back verbatim.
    pub fn resolve(&self, locale: &str, key: &str, params: &[(&str, &str)]) -> String {
        let Some(table) = self.tables.get(&locale::base_tag(locale)) else {
            return key.to_string();
        };

        let mut node = table;
        for segment in key.split('.') {
            match node.get(segment) {
                Some(next) => node = next,
                None => return key.to_string(),
            }
        }

        match node.as_str() {
            Some(text) => interpolate(text, params),
            None => key.to_string(),
        }
    }

    /// Number of loaded dictionaries.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Every key of the default locale must resolve to a string in every
    /// other locale. Reports all gaps at once.
    fn check_completeness(&self, locales: &[String], default_locale: &str) -> Result<()> {
        let Some(default_table) = self.tables.get(default_locale) else {
            bail!("No translation dictionary for default locale `{default_locale}`");
        };

        let mut required = Vec::new();
        collect_string_paths(default_table, "", &mut required);

        let mut report = Vec::new();
        for locale in locales {
            if locale == default_locale {
                continue;
            }
            let Some(table) = self.tables.get(locale) else {
                continue;
            };
            let missing: Vec<&str> = required
                .iter()
                .filter(|path| !resolves_to_string(table, path))
                .map(String::as_str)
                .collect();
            if !missing.is_empty() {
                report.push(format!("`{locale}` is missing: {}", missing.join(", ")));
            }
        }

        if !report.is_empty() {
            bail!("Incomplete translation dictionaries; {}", report.join("; "));
        }
        Ok(())
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Replace `{{name}}` placeholders with values from `params`.
/// Placeholders without a matching param are left untouched.
fn interpolate(text: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() || !text.contains("{{") {
        return text.to_string();
    }

    static RE_PARAM: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").unwrap());

    RE_PARAM
        .replace_all(text, |caps: &regex::Captures| {
            let name = &caps[1];
            params
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| (*v).to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Collect dot-paths of all string leaves in a nested table.
fn collect_string_paths(value: &Value, prefix: &str, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                collect_string_paths(child, &path, out);
            }
        }
        Value::String(_) => out.push(prefix.to_string()),
        _ => {}
    }
}

fn resolves_to_string(table: &Value, path: &str) -> bool {
    let mut node = table;
    for segment in path.split('.') {
        match node.get(segment) {
            Some(next) => node = next,
            None => return false,
        }
    }
    node.is_string()
}

// ============================================================================
// Tests
// ============================================================================
