//! Site initialization.
//!
//! Creates a new site skeleton: default configuration, one content
//! directory per locale with a sample page, and the data documents the
//! build reads (SEO, pricing, translation dictionaries). The generated
//! site builds as-is.

use crate::{config::SiteConfig, log};
use anyhow::{Context, Result, bail};
use std::{fs, path::Path};

// ============================================================================
// Constants
// ============================================================================

/// Files to write ignore patterns to
const IGNORE_FILES: &[&str] = &[".gitignore", ".ignore"];

/// Default config filename
const CONFIG_FILE: &str = "loka.toml";

const SAMPLE_PAGE_ZH: &str = "---\ntitle: 关于我们\ndescription: 了解我们的团队与使命。\ndate: 2024-01-01\ntags:\n  - company\n---\n\n# 关于我们\n\n我们构建多语言网站。\n";

const SAMPLE_PAGE_EN: &str = "---\ntitle: About Us\ndescription: Learn about our team and mission.\ndate: 2024-01-01\ntags:\n  - company\n---\n\n# About Us\n\nWe build multilingual websites.\n";

const SAMPLE_DICT_ZH: &str = r#"{
  "home": {
    "title": "首页",
    "subtitle": "欢迎来到我们的网站"
  }
}
"#;

const SAMPLE_DICT_EN: &str = r#"{
  "home": {
    "title": "Home",
    "subtitle": "Welcome to our website"
  }
}
"#;

const SAMPLE_SEO: &str = r#"{
  "global": {
    "siteUrl": "https://example.com",
    "siteName": "My Site",
    "titleTemplate": "%s | My Site",
    "defaultDescription": {
      "zh": "一个多语言站点",
      "en": "A multilingual site"
    }
  },
  "pages": [
    {
      "path": "/",
      "title": { "zh": "首页", "en": "Home" },
      "description": { "zh": "一个多语言站点", "en": "A multilingual site" }
    }
  ],
  "sitemap": {
    "pages": [
      { "path": "/", "priority": 0.9 }
    ]
  },
  "robots": {
    "rules": [
      { "userAgent": "*", "allow": "/" }
    ]
  }
}
"#;

const SAMPLE_PRICING: &str = r#"{
  "zh": {
    "productName": "我的产品",
    "description": "选择适合你的方案",
    "tiers": []
  },
  "en": {
    "productName": "My Product",
    "description": "Pick the plan that fits",
    "tiers": []
  }
}
"#;

// ============================================================================
// Public API
// ============================================================================

/// Create a new site with default structure
pub fn new_site(config: &'static SiteConfig, has_name: bool) -> Result<()> {
    let root = config.get_root();

    // Safety check: if no name was provided (init in current dir),
    // the directory must be completely empty
    if !has_name && !is_dir_empty(root)? {
        bail!(
            "Current directory is not empty. Use `loka init <SITE_NAME>` to create in a subdirectory."
        );
    }

    let defaults = SiteConfig::default();

    init_site_structure(root, &defaults)?;
    init_default_config(root, &defaults)?;
    init_sample_files(root, &defaults)?;
    init_ignored_files(root, &[Path::new("/public/")])?;

    log!("init"; "site created at {}", root.display());

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Check if a directory is completely empty
fn is_dir_empty(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    Ok(fs::read_dir(path)?.next().is_none())
}

/// Create the content and data directory skeleton
fn init_site_structure(root: &Path, defaults: &SiteConfig) -> Result<()> {
    let mut dirs = Vec::new();
    for locale in &defaults.site.locales {
        dirs.push(defaults.build.content.join(locale));
    }
    dirs.push(defaults.translations_dir());

    for dir in dirs {
        let path = root.join(&dir);
        if path.exists() {
            bail!(
                "Path `{}` already exists. Try `loka init <SITE_NAME>` instead.",
                path.display()
            );
        }
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
    }
    Ok(())
}

/// Write default configuration file
fn init_default_config(root: &Path, defaults: &SiteConfig) -> Result<()> {
    let content = toml::to_string_pretty(defaults)?;
    fs::write(root.join(CONFIG_FILE), content)?;
    Ok(())
}

/// Write one sample page per locale plus the SEO, pricing and
/// translation documents
fn init_sample_files(root: &Path, defaults: &SiteConfig) -> Result<()> {
    let content = root.join(&defaults.build.content);
    let i18n = root.join(defaults.translations_dir());
    let data = root.join(&defaults.build.data.dir);

    let samples: &[(&Path, &str, &str)] = &[
        (&content, "zh/about.md", SAMPLE_PAGE_ZH),
        (&content, "en/about.md", SAMPLE_PAGE_EN),
        (&i18n, "zh.json", SAMPLE_DICT_ZH),
        (&i18n, "en.json", SAMPLE_DICT_EN),
        (&data, "seo-config.json", SAMPLE_SEO),
        (&data, "pricing-config.json", SAMPLE_PRICING),
    ];

    for (dir, name, body) in samples {
        let path = dir.join(name);
        fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}

/// Initialize .gitignore and .ignore files with specified paths
fn init_ignored_files(root: &Path, paths: &[&Path]) -> Result<()> {
    let content = paths
        .iter()
        .filter_map(|p| p.to_str())
        .collect::<Vec<_>>()
        .join("\n");

    for filename in IGNORE_FILES {
        let path = root.join(filename);
        if !path.exists() {
            fs::write(&path, &content)?;
        }
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
