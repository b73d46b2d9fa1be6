//! Locale-aware URL path arithmetic.
//!
//! Every public page path carries its locale as the first segment
//! (`/zh/pricing`, `/en/about`). `Locales` owns the configured locale set
//! and answers the prefix questions: strip, prepend, extract, normalize.

// ============================================================================
// Types
// ============================================================================

/// The configured locale set plus the default locale.
#[derive(Debug, Clone)]
pub struct Locales {
    locales: Vec<String>,
    default_locale: String,
}

// ============================================================================
// Public API
// ============================================================================

impl Locales {
    pub fn new(locales: Vec<String>, default_locale: String) -> Self {
        Self {
            locales,
            default_locale,
        }
    }

    /// All supported locales, in configuration order.
    pub fn all(&self) -> &[String] {
        &self.locales
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn is_supported(&self, tag: &str) -> bool {
        self.locales.iter().any(|l| l == tag)
    }

    /// Remove a leading locale segment from a path.
    ///
    /// `/zh/about` becomes `/about`, a bare `/en` becomes `/`, and paths
    /// without a locale prefix pass through unchanged. The result always
    /// starts with `/`.
    pub fn strip_prefix(&self, path: &str) -> String {
        let path = ensure_leading_slash(path);
        for locale in &self.locales {
            let bare = format!("/{locale}");
            if path == bare {
                return "/".to_string();
            }
            if let Some(rest) = path.strip_prefix(&bare)
                && rest.starts_with('/')
            {
                return rest.to_string();
            }
        }
        path
    }

    /// Prepend a locale segment to a path.
    ///
    /// Any existing locale prefix is stripped first, so the operation is
    /// idempotent. The site root maps to the bare `/{locale}`.
    pub fn prefix(&self, path: &str, locale: &str) -> String {
        let base = self.strip_prefix(path);
        if base == "/" {
            format!("/{locale}")
        } else {
            format!("/{locale}{base}")
        }
    }

    /// Extract the locale from a path's first segment.
    ///
    /// Falls back to the default locale when the first segment is not a
    /// supported locale.
    pub fn extract(&self, path: &str) -> &str {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let first = trimmed.split('/').next().unwrap_or("");
        self.locales
            .iter()
            .find(|l| l.as_str() == first)
            .map(String::as_str)
            .unwrap_or(&self.default_locale)
    }

    /// Normalize a raw language tag to a supported locale.
    ///
    /// `zh-CN` folds to `zh`, case is ignored, and anything outside the
    /// supported set falls back to the default locale.
    pub fn normalize(&self, tag: &str) -> &str {
        let base = base_tag(tag);
        self.locales
            .iter()
            .find(|l| l.as_str() == base)
            .map(String::as_str)
            .unwrap_or(&self.default_locale)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Fold a language tag to its lowercase primary subtag (`zh-CN` -> `zh`).
pub fn base_tag(tag: &str) -> String {
    let lowered = tag.to_ascii_lowercase();
    lowered
        .split('-')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn ensure_leading_slash(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

// ============================================================================
// Tests
// ============================================================================
