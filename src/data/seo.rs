//! The SEO data document.
//!
//! One JSON file (`seo-config.json` by default) drives all generated
//! metadata: the global site block, per-page overrides, the static page
//! list for the sitemap and the robots rules. Text fields that face
//! readers are [`LocalizedText`] and resolve per locale.
//!
//! The document is open: unknown fields are ignored so a site can carry
//! extra SEO data without breaking the build.

use super::source::{CachePolicy, FileSource, resolve_path};
use super::DataError;
use crate::config::SiteConfig;
use serde::Deserialize;
use std::{collections::BTreeMap, sync::Arc};

// ============================================================================
// Constants
// ============================================================================

/// Base URL of last resort when neither config, environment nor the
/// document itself provides one.
pub const FALLBACK_BASE_URL: &str = "https://example.com";

/// Environment variable that overrides the document's `global.siteUrl`.
pub const SITE_URL_ENV: &str = "SITE_URL";

/// Environment variable pointing at an alternative SEO document.
pub const SEO_PATH_ENV: &str = "SEO_CONFIG_PATH";

const DEFAULT_FILE_STEM: &str = "seo-config";

// ============================================================================
// Localized Text
// ============================================================================

/// A text field that is either one string for all locales or a map from
/// locale to string.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    ByLocale(BTreeMap<String, String>),
}

impl Default for LocalizedText {
    fn default() -> Self {
        Self::Plain(String::new())
    }
}

impl LocalizedText {
    /// Resolve for a locale: requested, then default locale, then the
    /// first available value, then the empty string.
    pub fn resolve(&self, locale: &str, default_locale: &str) -> &str {
        match self {
            Self::Plain(text) => text,
            Self::ByLocale(map) => map
                .get(locale)
                .or_else(|| map.get(default_locale))
                .or_else(|| map.values().next())
                .map(String::as_str)
                .unwrap_or(""),
        }
    }
}

// ============================================================================
// Document Types
// ============================================================================

/// One value or a list. Robots rules accept both spellings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::One(one) => std::slice::from_ref(one),
            Self::Many(many) => many,
        };
        slice.iter().map(String::as_str)
    }
}

/// An OpenGraph image reference.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OgImage {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub alt: Option<String>,
}

/// Global OpenGraph defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalOpenGraph {
    #[serde(rename = "type", default)]
    pub og_type: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default)]
    pub images: Vec<OgImage>,
}

/// Global Twitter card defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalTwitter {
    #[serde(default)]
    pub card: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
}

/// The `global` block: site-wide defaults every page inherits.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSeo {
    pub site_url: String,
    pub site_name: String,
    /// Title template for the html `<title>`, `%s` is the page title
    #[serde(default = "defaults::title_template")]
    pub title_template: String,
    #[serde(default)]
    pub default_description: LocalizedText,
    #[serde(default)]
    pub default_keywords: Vec<String>,
    #[serde(default)]
    pub default_og_image: Option<String>,
    #[serde(default)]
    pub open_graph: Option<GlobalOpenGraph>,
    #[serde(default)]
    pub twitter: Option<GlobalTwitter>,
}

/// Page-level OpenGraph overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOpenGraph {
    #[serde(default)]
    pub title: Option<LocalizedText>,
    #[serde(default)]
    pub description: Option<LocalizedText>,
    #[serde(rename = "type", default)]
    pub og_type: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<OgImage>>,
}

/// Page-level Twitter card overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTwitter {
    #[serde(default)]
    pub card: Option<String>,
    #[serde(default)]
    pub title: Option<LocalizedText>,
    #[serde(default)]
    pub description: Option<LocalizedText>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub creator: Option<String>,
}

/// Per-page SEO entry, keyed by site-relative path.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSeo {
    /// Site-relative path without locale prefix, e.g. `/` or `/about`
    pub path: String,
    #[serde(default)]
    pub title: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub og_image: Option<String>,
    #[serde(default)]
    pub no_index: Option<bool>,
    #[serde(default)]
    pub canonical: Option<String>,
    #[serde(default)]
    pub open_graph: Option<PageOpenGraph>,
    #[serde(default)]
    pub twitter: Option<PageTwitter>,
}

/// A static page entry for the sitemap.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapPage {
    pub path: String,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub change_frequency: Option<String>,
    #[serde(default)]
    pub priority: Option<f32>,
}

/// The `sitemap` block.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SitemapSection {
    #[serde(default)]
    pub pages: Vec<SitemapPage>,
}

/// A single robots.txt rule group.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotsRule {
    pub user_agent: String,
    #[serde(default)]
    pub allow: Option<OneOrMany>,
    #[serde(default)]
    pub disallow: Option<OneOrMany>,
    #[serde(default)]
    pub crawl_delay: Option<u32>,
}

/// The `robots` block.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RobotsSection {
    #[serde(default)]
    pub rules: Vec<RobotsRule>,
    #[serde(default)]
    pub sitemap: Option<OneOrMany>,
}

/// The whole SEO document.
///
/// All four sections are required, matching the document contract.
#[derive(Debug, Clone, Deserialize)]
pub struct SeoDocument {
    pub global: GlobalSeo,
    pub pages: Vec<PageSeo>,
    pub sitemap: SitemapSection,
    pub robots: RobotsSection,
}

impl SeoDocument {
    /// Look up a page entry by site-relative path.
    ///
    /// The query is normalized (empty becomes `/`, a leading slash is
    /// ensured), then matched exactly against the document's `path`
    /// values. `/about/` and `/about` are different paths.
    pub fn page(&self, path: &str) -> Option<&PageSeo> {
        let normalized = if path.is_empty() {
            "/".to_string()
        } else if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        self.pages.iter().find(|page| page.path == normalized)
    }

    pub fn base_url(&self) -> &str {
        &self.global.site_url
    }
}

mod defaults {
    pub fn title_template() -> String {
        "%s".to_string()
    }
}

// ============================================================================
// Store
// ============================================================================

/// Owns the SEO document source. Loaded once per process.
pub struct SeoStore {
    source: FileSource<SeoDocument>,
}

impl SeoStore {
    /// Resolve the document path and wire up the base URL override.
    ///
    /// Base URL precedence: `[site] url` (which the CLI `--base-url` flag
    /// and serve mode already write into), then the `SITE_URL` environment
    /// variable, then the document's own `global.siteUrl`, then a literal
    /// fallback. Trailing slashes are stripped.
    pub fn new(config: &SiteConfig) -> Self {
        let default_path = config.build.data.dir.join(DEFAULT_FILE_STEM);
        let path = resolve_path(
            config.build.data.seo.as_deref(),
            SEO_PATH_ENV,
            &default_path,
        );

        let base_override = config
            .site
            .url
            .clone()
            .or_else(|| std::env::var(SITE_URL_ENV).ok());

        let source = FileSource::new(path, CachePolicy::Once)
            .with_validator(validate)
            .with_transform(move |mut doc: SeoDocument| {
                if let Some(url) = &base_override {
                    doc.global.site_url = url.clone();
                }
                if doc.global.site_url.is_empty() {
                    doc.global.site_url = FALLBACK_BASE_URL.to_string();
                }
                while doc.global.site_url.len() > 1 && doc.global.site_url.ends_with('/') {
                    doc.global.site_url.pop();
                }
                doc
            });

        Self { source }
    }

    pub fn document(&self) -> Result<Arc<SeoDocument>, DataError> {
        self.source.get()
    }

    pub fn path(&self) -> &std::path::Path {
        self.source.path()
    }
}

fn validate(doc: &SeoDocument) -> Result<(), DataError> {
    if doc.global.site_name.is_empty() {
        return Err(DataError::Invalid(
            "seo: global.siteName must not be empty".into(),
        ));
    }
    for (i, page) in doc.pages.iter().enumerate() {
        if page.path.is_empty() {
            return Err(DataError::Invalid(format!(
                "seo: pages[{i}].path must not be empty"
            )));
        }
    }
    for (i, rule) in doc.robots.rules.iter().enumerate() {
        if rule.user_agent.is_empty() {
            return Err(DataError::Invalid(format!(
                "seo: robots.rules[{i}].userAgent must not be empty"
            )));
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const FULL_DOC: &str = r#"{
        "global": {
            "siteUrl": "https://acme.example.com",
            "siteName": "Acme",
            "titleTemplate": "%s | Acme",
            "defaultDescription": {
                "zh": "面向团队的协作平台",
                "en": "A collaboration platform for teams"
            },
            "defaultKeywords": ["collaboration", "teams"],
            "defaultOgImage": "/og-image.jpg",
            "openGraph": {
                "type": "website",
                "locale": "zh_CN",
                "siteName": "Acme",
                "images": [
                    { "url": "/og-image.jpg", "width": 1200, "height": 630, "alt": "Acme" }
                ]
            },
            "twitter": { "card": "summary_large_image", "creator": "@acme" }
        },
        "pages": [
            {
                "path": "/",
                "title": { "zh": "首页", "en": "Home" },
                "description": { "zh": "欢迎", "en": "Welcome" }
            },
            {
                "path": "/pricing",
                "title": "Pricing",
                "description": { "zh": "定价方案", "en": "Pricing plans" },
                "noIndex": false,
                "openGraph": { "type": "product" }
            }
        ],
        "sitemap": {
            "pages": [
                { "path": "/", "priority": 0.9, "changeFrequency": "weekly" },
                { "path": "/pricing", "priority": 0.8, "lastModified": "2025-03-01" }
            ]
        },
        "robots": {
            "rules": [
                { "userAgent": "*", "allow": "/", "disallow": ["/admin", "/api"] }
            ],
            "sitemap": "https://acme.example.com/sitemap.xml"
        }
    }"#;

    fn parse(json: &str) -> SeoDocument {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_full_document() {
        let doc = parse(FULL_DOC);

        assert_eq!(doc.global.site_url, "https://acme.example.com");
        assert_eq!(doc.global.site_name, "Acme");
        assert_eq!(doc.global.title_template, "%s | Acme");
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.sitemap.pages.len(), 2);
        assert_eq!(doc.robots.rules.len(), 1);
    }

    #[test]
    fn test_missing_section_rejected() {
        let json = r#"{"global": {"siteUrl": "https://a.com", "siteName": "A"}}"#;
        assert!(serde_json::from_str::<SeoDocument>(json).is_err());
    }

    #[test]
    fn test_unknown_fields_tolerated() {
        // The document is open; extra blocks like `verification` pass through
        let json = r#"{
            "global": {
                "siteUrl": "https://a.com",
                "siteName": "A",
                "verification": { "google": "token" }
            },
            "pages": [],
            "sitemap": { "pages": [] },
            "robots": { "rules": [] }
        }"#;
        assert!(serde_json::from_str::<SeoDocument>(json).is_ok());
    }

    #[test]
    fn test_localized_text_plain() {
        let text = LocalizedText::Plain("Pricing".to_string());
        assert_eq!(text.resolve("zh", "zh"), "Pricing");
        assert_eq!(text.resolve("en", "zh"), "Pricing");
    }

    #[test]
    fn test_localized_text_by_locale() {
        let doc = parse(FULL_DOC);
        let desc = &doc.global.default_description;

        assert_eq!(desc.resolve("zh", "zh"), "面向团队的协作平台");
        assert_eq!(desc.resolve("en", "zh"), "A collaboration platform for teams");
    }

    #[test]
    fn test_localized_text_falls_back_to_default_locale() {
        let doc = parse(FULL_DOC);
        let desc = &doc.global.default_description;

        // "fr" is not in the map, the default locale value wins
        assert_eq!(desc.resolve("fr", "zh"), "面向团队的协作平台");
    }

    #[test]
    fn test_localized_text_falls_back_to_first_value() {
        let text: LocalizedText =
            serde_json::from_str(r#"{"de": "Preise"}"#).unwrap();
        assert_eq!(text.resolve("fr", "zh"), "Preise");
    }

    #[test]
    fn test_localized_text_empty_map() {
        let text: LocalizedText = serde_json::from_str("{}").unwrap();
        assert_eq!(text.resolve("zh", "zh"), "");
    }

    #[test]
    fn test_page_lookup_exact() {
        let doc = parse(FULL_DOC);

        assert!(doc.page("/pricing").is_some());
        assert!(doc.page("/missing").is_none());
        // Trailing slash is a different path
        assert!(doc.page("/pricing/").is_none());
    }

    #[test]
    fn test_page_lookup_normalizes_query() {
        let doc = parse(FULL_DOC);

        assert!(doc.page("").is_some_and(|p| p.path == "/"));
        assert!(doc.page("pricing").is_some_and(|p| p.path == "/pricing"));
    }

    #[test]
    fn test_one_or_many_forms() {
        let doc = parse(FULL_DOC);
        let rule = &doc.robots.rules[0];

        let allow: Vec<&str> = rule.allow.as_ref().unwrap().iter().collect();
        let disallow: Vec<&str> = rule.disallow.as_ref().unwrap().iter().collect();

        assert_eq!(allow, vec!["/"]);
        assert_eq!(disallow, vec!["/admin", "/api"]);
    }

    #[test]
    fn test_validate_rejects_empty_site_name() {
        let json = r#"{
            "global": { "siteUrl": "https://a.com", "siteName": "" },
            "pages": [],
            "sitemap": { "pages": [] },
            "robots": { "rules": [] }
        }"#;
        let doc = parse(json);
        assert!(matches!(validate(&doc), Err(DataError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_empty_page_path() {
        let json = r#"{
            "global": { "siteUrl": "https://a.com", "siteName": "A" },
            "pages": [ { "path": "" } ],
            "sitemap": { "pages": [] },
            "robots": { "rules": [] }
        }"#;
        let doc = parse(json);
        let err = validate(&doc).unwrap_err();
        assert!(err.to_string().contains("pages[0].path"));
    }

    #[test]
    fn test_store_loads_document() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("seo-config.json"), FULL_DOC).unwrap();

        let mut config = SiteConfig::default();
        config.build.data.dir = tmp.path().to_path_buf();

        let store = SeoStore::new(&config);
        let doc = store.document().unwrap();
        assert_eq!(doc.global.site_name, "Acme");
    }

    #[test]
    fn test_store_config_url_overrides_document() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("seo-config.json"), FULL_DOC).unwrap();

        let mut config = SiteConfig::default();
        config.build.data.dir = tmp.path().to_path_buf();
        config.site.url = Some("https://staging.acme.example.com/".to_string());

        let store = SeoStore::new(&config);
        let doc = store.document().unwrap();
        // Override applied, trailing slash stripped
        assert_eq!(doc.global.site_url, "https://staging.acme.example.com");
    }

    #[test]
    fn test_store_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let custom = tmp.path().join("custom-seo.json");
        fs::write(&custom, FULL_DOC).unwrap();

        let mut config = SiteConfig::default();
        config.build.data.seo = Some(custom.clone());

        let store = SeoStore::new(&config);
        assert_eq!(store.path(), custom.as_path());
        assert!(store.document().is_ok());
    }

    #[test]
    fn test_store_missing_document() {
        let tmp = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.build.data.dir = tmp.path().to_path_buf();

        let store = SeoStore::new(&config);
        assert!(matches!(store.document(), Err(DataError::NotFound(_))));
    }
}
