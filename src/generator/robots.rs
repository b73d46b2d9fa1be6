//! robots.txt generation.
//!
//! Rules come verbatim from the SEO document's `robots` block. Sitemap
//! references are absolutized against the base URL; when none are
//! configured, the generated `sitemap.xml` is advertised.
//!
//! # Output Format
//!
//! ```text
//! User-agent: *
//! Allow: /
//! Disallow: /admin
//!
//! Sitemap: https://example.com/sitemap.xml
//! ```

use crate::{
    config::SiteConfig,
    context::BuildContext,
    data::seo::{OneOrMany, SeoDocument},
    log,
};
use anyhow::{Context, Result};
use std::fmt::Write;
use std::fs;

// ============================================================================
// Public API
// ============================================================================

/// Build and write robots.txt if enabled in config.
pub fn build_robots(ctx: &BuildContext) -> Result<()> {
    if ctx.config.build.robots.enable {
        let seo = ctx.seo.document()?;
        let robots = Robots::collect(&seo);
        robots.write(ctx.config)?;
    }
    Ok(())
}

// ============================================================================
// Robots Implementation
// ============================================================================

struct Robots {
    rules: Vec<RuleBlock>,
    /// Absolute sitemap URLs
    sitemaps: Vec<String>,
}

/// One User-agent block.
struct RuleBlock {
    user_agent: String,
    allow: Vec<String>,
    disallow: Vec<String>,
    crawl_delay: Option<u32>,
}

impl Robots {
    fn collect(seo: &SeoDocument) -> Self {
        let base_url = seo.base_url();

        let rules = seo
            .robots
            .rules
            .iter()
            .map(|rule| RuleBlock {
                user_agent: rule.user_agent.clone(),
                allow: collect_paths(rule.allow.as_ref()),
                disallow: collect_paths(rule.disallow.as_ref()),
                crawl_delay: rule.crawl_delay,
            })
            .collect();

        let sitemaps = match &seo.robots.sitemap {
            Some(entries) => entries
                .iter()
                .map(|entry| absolutize(base_url, entry))
                .collect(),
            None => vec![format!("{base_url}/sitemap.xml")],
        };

        Self { rules, sitemaps }
    }

    fn into_text(self) -> String {
        let mut out = String::with_capacity(512);

        for rule in &self.rules {
            let _ = writeln!(out, "User-agent: {}", rule.user_agent);
            for path in &rule.allow {
                let _ = writeln!(out, "Allow: {path}");
            }
            for path in &rule.disallow {
                let _ = writeln!(out, "Disallow: {path}");
            }
            if let Some(delay) = rule.crawl_delay {
                let _ = writeln!(out, "Crawl-delay: {delay}");
            }
            out.push('\n');
        }

        for sitemap in &self.sitemaps {
            let _ = writeln!(out, "Sitemap: {sitemap}");
        }
        out
    }

    fn write(self, config: &'static SiteConfig) -> Result<()> {
        let robots_path = &config.build.robots.path;
        let text = self.into_text();

        fs::write(robots_path, &text)
            .with_context(|| format!("Failed to write robots.txt to {}", robots_path.display()))?;

        log!("robots"; "{}", robots_path.file_name().unwrap_or_default().to_string_lossy());
        Ok(())
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn collect_paths(value: Option<&OneOrMany>) -> Vec<String> {
    value
        .map(|v| v.iter().map(str::to_string).collect())
        .unwrap_or_default()
}

fn absolutize(base_url: &str, entry: &str) -> String {
    if entry.starts_with("http") {
        entry.to_string()
    } else {
        format!("{base_url}{entry}")
    }
}

// ============================================================================
// Tests
// ============================================================================
