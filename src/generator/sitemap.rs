//! Sitemap generation.
//!
//! Every configured locale gets its own URL per page: the static pages
//! from the SEO document's `sitemap.pages` list, then every Markdown
//! content item. Static entries default to priority 0.8, content entries
//! use 0.7, both default to a weekly change frequency.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/zh/about</loc>
//!     <lastmod>2025-01-01</lastmod>
//!     <changefreq>weekly</changefreq>
//!     <priority>0.7</priority>
//!   </url>
//! </urlset>
//! ```

use crate::{
    config::SiteConfig,
    content::{ContentQuery, ContentStore},
    context::BuildContext,
    data::seo::SeoDocument,
    i18n::Locales,
    log,
    utils::date,
    utils::minify::{MinifyType, minify},
};
use anyhow::{Context, Result};
use std::fs;

// ============================================================================
// Constants
// ============================================================================

/// XML namespace for sitemap
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

const DEFAULT_CHANGEFREQ: &str = "weekly";
const STATIC_PAGE_PRIORITY: f32 = 0.8;
const CONTENT_PAGE_PRIORITY: f32 = 0.7;

// ============================================================================
// Public API
// ============================================================================

/// Build and write the sitemap if enabled in config.
pub fn build_sitemap(ctx: &BuildContext) -> Result<()> {
    if ctx.config.build.sitemap.enable {
        let seo = ctx.seo.document()?;
        let sitemap = Sitemap::collect(&ctx.locales, &seo, &ctx.content)?;
        sitemap.write(ctx.config)?;
    }
    Ok(())
}

// ============================================================================
// Sitemap Implementation
// ============================================================================

/// Sitemap data structure
struct Sitemap {
    /// List of URL entries
    urls: Vec<UrlEntry>,
}

/// Single URL entry in the sitemap
struct UrlEntry {
    /// Full URL location
    loc: String,
    /// Last modification date, YYYY-MM-DD
    lastmod: String,
    changefreq: String,
    priority: f32,
}

impl Sitemap {
    /// Collect entries: locales x static pages, then locales x content.
    fn collect(locales: &Locales, seo: &SeoDocument, content: &ContentStore) -> Result<Self> {
        let base_url = seo.base_url();
        let today = date::today_ymd();
        let mut urls = Vec::new();

        for locale in locales.all() {
            for page in &seo.sitemap.pages {
                urls.push(UrlEntry {
                    loc: format!("{base_url}{}", locales.prefix(&page.path, locale)),
                    lastmod: ymd_or(page.last_modified.as_deref(), &today),
                    changefreq: page
                        .change_frequency
                        .clone()
                        .unwrap_or_else(|| DEFAULT_CHANGEFREQ.to_string()),
                    priority: page.priority.unwrap_or(STATIC_PAGE_PRIORITY),
                });
            }
        }

        for locale in locales.all() {
            let query = ContentQuery {
                locale: Some(locale.clone()),
                ..Default::default()
            };
            for item in content.list(&query)? {
                urls.push(UrlEntry {
                    loc: format!("{base_url}/{locale}/{}", item.slug),
                    lastmod: ymd_or(item.frontmatter.last_modified.as_deref(), &today),
                    changefreq: DEFAULT_CHANGEFREQ.to_string(),
                    priority: CONTENT_PAGE_PRIORITY,
                });
            }
        }

        Ok(Self { urls })
    }

    /// Generate sitemap XML string.
    fn into_xml(self) -> String {
        let mut xml = String::with_capacity(4096);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
        xml.push('\n');

        for entry in self.urls {
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", entry.lastmod));
            xml.push_str(&format!(
                "    <changefreq>{}</changefreq>\n",
                escape_xml(&entry.changefreq)
            ));
            xml.push_str(&format!("    <priority>{}</priority>\n", entry.priority));
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }

    /// Write sitemap to output file.
    fn write(self, config: &'static SiteConfig) -> Result<()> {
        let sitemap_path = &config.build.sitemap.path;
        let xml = self.into_xml();
        let xml = minify(MinifyType::Xml(xml.as_bytes()), config);

        fs::write(sitemap_path, &*xml)
            .with_context(|| format!("Failed to write sitemap to {}", sitemap_path.display()))?;

        log!("sitemap"; "{}", sitemap_path.file_name().unwrap_or_default().to_string_lossy());
        Ok(())
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Normalize a raw date to YYYY-MM-DD, or fall back to `today`.
fn ymd_or(raw: Option<&str>, today: &str) -> String {
    raw.and_then(date::lastmod_ymd)
        .unwrap_or_else(|| today.to_string())
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

// ============================================================================
// Tests
// ============================================================================
