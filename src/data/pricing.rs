//! The pricing data document.
//!
//! `pricing-config.json` maps locale codes to complete pricing tables.
//! Unlike the SEO document this one is re-read when its mtime changes,
//! so price edits show up in serve mode without a restart.

use super::source::{CachePolicy, FileSource, resolve_path};
use super::DataError;
use crate::config::SiteConfig;
use crate::i18n::locale;
use serde::Deserialize;
use std::collections::BTreeMap;

// ============================================================================
// Constants
// ============================================================================

/// Environment variable pointing at an alternative pricing document.
pub const PRICING_PATH_ENV: &str = "PRICING_CONFIG_PATH";

const DEFAULT_FILE_STEM: &str = "pricing-config";

// ============================================================================
// Document Types
// ============================================================================

/// A feature row within a pricing tier.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PricingFeature {
    pub name: String,
    pub included: bool,
    #[serde(default)]
    pub highlighted: Option<bool>,
}

/// Monthly and optional yearly price for a tier.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TierPrice {
    pub monthly: f64,
    #[serde(default)]
    pub yearly: Option<f64>,
    pub currency: String,
}

/// One plan in a pricing table.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PricingTier {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: TierPrice,
    #[serde(default)]
    pub recommended: Option<bool>,
    #[serde(default)]
    pub popular: Option<bool>,
    #[serde(default)]
    pub badge: Option<String>,
    pub features: Vec<PricingFeature>,
    #[serde(default)]
    pub button_text: Option<String>,
    #[serde(default)]
    pub button_link: Option<String>,
}

/// A frequently asked question attached to the pricing page.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

/// The pricing table for one locale.
///
/// `productName` and `tiers` are required; parsing fails without them.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PricingTable {
    pub product_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub billing_cycle: Option<String>,
    pub tiers: Vec<PricingTier>,
    #[serde(default)]
    pub faq: Option<Vec<FaqItem>>,
}

impl PricingTable {
    /// The table handed out when no locale in the document matches.
    pub fn builtin() -> Self {
        Self {
            product_name: "Product Pricing".to_string(),
            description: None,
            billing_cycle: None,
            tiers: Vec::new(),
            faq: None,
        }
    }
}

/// The whole document: locale code to pricing table.
pub type PricingDocument = BTreeMap<String, PricingTable>;

// ============================================================================
// Store
// ============================================================================

/// Owns the pricing document source and the locale fallback chain.
pub struct PricingStore {
    source: FileSource<PricingDocument>,
    default_locale: String,
}

impl PricingStore {
    pub fn new(config: &SiteConfig) -> Self {
        let default_path = config.build.data.dir.join(DEFAULT_FILE_STEM);
        let path = resolve_path(
            config.build.data.pricing.as_deref(),
            PRICING_PATH_ENV,
            &default_path,
        );

        Self {
            source: FileSource::new(path, CachePolicy::Mtime),
            default_locale: config.site.default_locale.clone(),
        }
    }

    /// The pricing table for a locale.
    ///
    /// The raw tag is folded to its primary subtag first, then the chain
    /// runs: requested, configured default, `zh`, `en`, builtin table.
    pub fn table(&self, locale: &str) -> Result<PricingTable, DataError> {
        let doc = self.source.get()?;
        let normalized = locale::base_tag(locale);

        let chain = [normalized.as_str(), &self.default_locale, "zh", "en"];
        for key in chain {
            if let Some(table) = doc.get(key) {
                return Ok(table.clone());
            }
        }
        Ok(PricingTable::builtin())
    }

    /// Whether the document carries a table for this locale.
    pub fn has_locale(&self, locale: &str) -> Result<bool, DataError> {
        let doc = self.source.get()?;
        Ok(doc.contains_key(&locale::base_tag(locale)))
    }

    /// Locale codes present in the document.
    pub fn supported_locales(&self) -> Result<Vec<String>, DataError> {
        let doc = self.source.get()?;
        Ok(doc.keys().cloned().collect())
    }

    pub fn path(&self) -> &std::path::Path {
        self.source.path()
    }
}

// ============================================================================
// Tests
// ============================================================================
