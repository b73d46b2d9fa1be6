//! `[build]` section configuration.
//!
//! Contains build settings: paths, data document locations, minification,
//! and sitemap/robots output.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Main BuildConfig
// ============================================================================

/// `[build]` section in loka.toml - build pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// content = "content"      # Markdown source directory
/// output = "public"        # Output directory
/// minify = true            # Minify HTML
///
/// [build.data]
/// dir = "data"
/// translations = "i18n"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Content source directory, one subdirectory per locale of
    /// Markdown files.
    #[serde(default = "defaults::build::content")]
    #[educe(Default = defaults::build::content())]
    pub content: PathBuf,

    /// Build output directory.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Minify HTML output (removes whitespace).
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub minify: bool,

    /// Clear output directory before each build.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub clean: bool,

    /// Data document locations (SEO, pricing, translations).
    #[serde(default)]
    pub data: DataConfig,

    /// Sitemap generation settings.
    #[serde(default)]
    pub sitemap: SitemapConfig,

    /// robots.txt generation settings.
    #[serde(default)]
    pub robots: RobotsConfig,
}

// ============================================================================
// Sub-configurations
// ============================================================================

/// `[build.data]` section - data document locations.
///
/// The SEO and pricing documents are JSON files. Their paths resolve in
/// order: explicit setting here, `SEO_CONFIG_PATH`/`PRICING_CONFIG_PATH`
/// environment variable, then `<dir>/seo-config.json` and
/// `<dir>/pricing-config.json`.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    /// Directory holding the JSON data documents.
    #[serde(default = "defaults::build::data::dir")]
    #[educe(Default = defaults::build::data::dir())]
    pub dir: PathBuf,

    /// Explicit path to the SEO document.
    #[serde(default = "defaults::build::data::seo")]
    #[educe(Default = defaults::build::data::seo())]
    pub seo: Option<PathBuf>,

    /// Explicit path to the pricing document.
    #[serde(default = "defaults::build::data::pricing")]
    #[educe(Default = defaults::build::data::pricing())]
    pub pricing: Option<PathBuf>,

    /// Translation dictionary directory, relative to `dir`.
    /// Holds one `<locale>.json` per supported locale.
    #[serde(default = "defaults::build::data::translations")]
    #[educe(Default = defaults::build::data::translations())]
    pub translations: PathBuf,
}

/// `[build.sitemap]` section - sitemap.xml generation.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SitemapConfig {
    /// Enable sitemap.xml generation.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Output path for the sitemap file, relative to the output directory.
    #[serde(default = "defaults::build::sitemap::path")]
    #[educe(Default = defaults::build::sitemap::path())]
    pub path: PathBuf,
}

/// `[build.robots]` section - robots.txt generation.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct RobotsConfig {
    /// Enable robots.txt generation.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Output path for the robots file, relative to the output directory.
    #[serde(default = "defaults::build::robots::path")]
    #[educe(Default = defaults::build::robots::path())]
    pub path: PathBuf,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use std::path::PathBuf;

    #[test]
    fn test_build_config_defaults() {
        let config = r#"
            [site]
            name = "Test"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.build.content, PathBuf::from("content"));
        assert_eq!(config.build.output, PathBuf::from("public"));
        assert!(config.build.minify);
        assert!(!config.build.clean);
        assert_eq!(config.build.data.dir, PathBuf::from("data"));
        assert_eq!(config.build.data.translations, PathBuf::from("i18n"));
        assert!(config.build.data.seo.is_none());
        assert!(config.build.data.pricing.is_none());
    }

    #[test]
    fn test_build_paths_custom() {
        let config = r#"
            [site]
            name = "Test"
            [build]
            content = "pages"
            output = "dist"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.build.content, PathBuf::from("pages"));
        assert_eq!(config.build.output, PathBuf::from("dist"));
    }

    #[test]
    fn test_data_config() {
        let config = r#"
            [site]
            name = "Test"
            [build.data]
            dir = "config"
            seo = "config/seo.json"
            pricing = "config/pricing.json"
            translations = "messages"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.build.data.dir, PathBuf::from("config"));
        assert_eq!(config.build.data.seo, Some(PathBuf::from("config/seo.json")));
        assert_eq!(
            config.build.data.pricing,
            Some(PathBuf::from("config/pricing.json"))
        );
        assert_eq!(config.build.data.translations, PathBuf::from("messages"));
    }

    #[test]
    fn test_sitemap_config() {
        let config = r#"
            [site]
            name = "Test"
            [build.sitemap]
            enable = false
            path = "custom-sitemap.xml"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert!(!config.build.sitemap.enable);
        assert_eq!(config.build.sitemap.path, PathBuf::from("custom-sitemap.xml"));
    }

    #[test]
    fn test_sitemap_config_defaults() {
        let config = r#"
            [site]
            name = "Test"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert!(config.build.sitemap.enable);
        assert_eq!(config.build.sitemap.path, PathBuf::from("sitemap.xml"));
    }

    #[test]
    fn test_robots_config_defaults() {
        let config = r#"
            [site]
            name = "Test"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert!(config.build.robots.enable);
        assert_eq!(config.build.robots.path, PathBuf::from("robots.txt"));
    }

    #[test]
    fn test_build_minify_disabled() {
        let config = r#"
            [site]
            name = "Test"
            [build]
            minify = false
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();
        assert!(!config.build.minify);
    }

    #[test]
    fn test_build_clean_enabled() {
        let config = r#"
            [site]
            name = "Test"
            [build]
            clean = true
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();
        assert!(config.build.clean);
    }

    #[test]
    fn test_unknown_field_rejection() {
        let config = r#"
            [site]
            name = "Test"
            [build]
            unknown_field = "should_fail"
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);

        assert!(result.is_err());
    }

    #[test]
    fn test_data_unknown_field_rejection() {
        let config = r#"
            [site]
            name = "Test"
            [build.data]
            unknown = "field"
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);
        assert!(result.is_err());
    }

    #[test]
    fn test_sitemap_unknown_field_rejection() {
        let config = r#"
            [site]
            name = "Test"
            [build.sitemap]
            unknown = "field"
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);
        assert!(result.is_err());
    }
}
