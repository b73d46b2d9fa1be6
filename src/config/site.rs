//! `[site]` section configuration.
//!
//! Contains site identity and the supported locale set.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[site]` section in loka.toml - site identity and locales.
///
/// # Example
/// ```toml
/// [site]
/// name = "Acme"
/// url = "https://acme.example.com"
/// locales = ["zh", "en"]
/// default_locale = "zh"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteSection {
    /// Site name used in scaffolding and preview pages.
    ///
    /// The SEO document's `global.siteName` is authoritative for metadata.
    #[serde(default = "defaults::site::name")]
    #[educe(Default = defaults::site::name())]
    pub name: String,

    /// Base URL override for absolute links in sitemap/canonical URLs.
    ///
    /// When unset, the base URL comes from the `SITE_URL` environment
    /// variable, then the SEO document's `global.siteUrl`.
    #[serde(default = "defaults::site::url")]
    #[educe(Default = defaults::site::url())]
    pub url: Option<String>,

    /// Supported locale codes. Content, dictionaries and page output are
    /// all keyed by these.
    #[serde(default = "defaults::site::locales")]
    #[educe(Default = defaults::site::locales())]
    pub locales: Vec<String>,

    /// Locale used as the fallback for content, configs and translations.
    /// Must be a member of `locales`.
    #[serde(default = "defaults::site::default_locale")]
    #[educe(Default = defaults::site::default_locale())]
    pub default_locale: String,
}
