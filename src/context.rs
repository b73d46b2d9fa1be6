//! Build-wide state.
//!
//! One `BuildContext` is constructed per build and passed explicitly to
//! whatever needs it. All fatal loading happens here: translation
//! dictionaries (including the completeness check), the content index
//! and the data stores. After construction the context is read-only, so
//! it can be shared freely across rayon workers.

use anyhow::{Context, Result};

use crate::config::SiteConfig;
use crate::content::ContentStore;
use crate::data::{PricingStore, SeoStore};
use crate::i18n::{Locales, Translations};

pub struct BuildContext {
    pub config: &'static SiteConfig,
    pub locales: Locales,
    pub translations: Translations,
    pub content: ContentStore,
    pub seo: SeoStore,
    pub pricing: PricingStore,
}

impl BuildContext {
    pub fn new(config: &'static SiteConfig) -> Result<Self> {
        let locales = Locales::new(
            config.site.locales.clone(),
            config.site.default_locale.clone(),
        );

        let translations = Translations::load(
            &config.translations_dir(),
            locales.all(),
            locales.default_locale(),
        )
        .context("Failed to load translation dictionaries")?;

        let content = ContentStore::scan(
            &config.build.content,
            locales.all(),
            locales.default_locale(),
        )
        .with_context(|| {
            format!(
                "Failed to index content under {}",
                config.build.content.display()
            )
        })?;

        let seo = SeoStore::new(config);
        let pricing = PricingStore::new(config);

        Ok(Self {
            config,
            locales,
            translations,
            content,
            seo,
            pricing,
        })
    }
}
