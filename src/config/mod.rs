//! Site configuration management for `loka.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                      |
//! |-------------|----------------------------------------------|
//! | `[site]`    | Site identity, base URL, supported locales   |
//! | `[build]`   | Build paths, data documents, sitemap, robots |
//! | `[serve]`   | Preview server (port, interface)             |
//! | `[extra]`   | User-defined custom fields                   |
//!
//! # Example
//!
//! ```toml
//! [site]
//! name = "Acme"
//! locales = ["zh", "en"]
//! default_locale = "zh"
//!
//! [build]
//! content = "content"
//! output = "public"
//! minify = true
//!
//! [serve]
//! port = 5277
//!
//! [extra]
//! analytics_id = "UA-12345"
//! ```

mod build;
pub mod defaults;
mod error;
mod serve;
mod site;

pub use error::ConfigError;

// Internal imports used in this module
use build::BuildConfig;
use serve::ServeConfig;
use site::SiteSection;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing loka.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// CLI arguments reference
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Site identity and locale set
    #[serde(default)]
    pub site: SiteSection,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Preview server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// User-defined extra fields
    #[serde(default)]
    pub extra: HashMap<String, toml::Value>,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Get CLI arguments reference
    pub fn get_cli(&self) -> &'static Cli {
        self.cli.unwrap()
    }

    /// Directory holding the `<locale>.json` translation dictionaries.
    pub fn translations_dir(&self) -> PathBuf {
        self.build.data.dir.join(&self.build.data.translations)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        self.cli = Some(cli);

        // Determine the final root path based on command
        let root = match &cli.command {
            Commands::Init { name: Some(name) } => {
                let base = cli
                    .root
                    .as_ref()
                    .cloned()
                    .unwrap_or_else(|| self.get_root().to_owned());
                base.join(name)
            }
            _ => cli
                .root
                .as_ref()
                .cloned()
                .unwrap_or_else(|| self.get_root().to_owned()),
        };

        self.set_root(&root);
        self.update_path_with_root(&root);

        if let Some(args) = cli.build_args() {
            Self::update_option(&mut self.build.minify, args.minify.as_ref());
            Self::update_option(&mut self.build.sitemap.enable, args.sitemap.as_ref());
            if args.clean {
                self.build.clean = true;
            }
            if let Some(base_url) = &args.base_url {
                self.site.url = Some(base_url.clone());
            }
        }

        if let Commands::Serve {
            interface, port, ..
        } = &cli.command
        {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
            self.site.url = Some(format!(
                "http://{}:{}",
                self.serve.interface, self.serve.port
            ));
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Update all paths relative to root directory and normalize to absolute paths
    fn update_path_with_root(&mut self, root: &Path) {
        let cli = self.get_cli();

        // Apply CLI overrides first
        Self::update_option(&mut self.build.content, cli.content.as_ref());
        Self::update_option(&mut self.build.output, cli.output.as_ref());

        // Normalize root to absolute path
        let root = Self::normalize_path(root);
        self.set_root(&root);

        // Normalize config path
        self.config_path = Self::normalize_path(&root.join(&cli.config));

        // Normalize all directory paths
        self.build.content = Self::normalize_path(&root.join(&self.build.content));
        self.build.output = Self::normalize_path(&root.join(&self.build.output));
        self.build.data.dir = Self::normalize_path(&root.join(&self.build.data.dir));

        // Explicit data document paths resolve against the root
        if let Some(seo) = self.build.data.seo.take() {
            self.build.data.seo = Some(Self::normalize_path(&root.join(seo)));
        }
        if let Some(pricing) = self.build.data.pricing.take() {
            self.build.data.pricing = Some(Self::normalize_path(&root.join(pricing)));
        }

        // Generated files land inside the output directory
        self.build.sitemap.path = self.build.output.join(&self.build.sitemap.path);
        self.build.robots.path = self.build.output.join(&self.build.robots.path);
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration for the current command
    pub fn validate(&self) -> Result<()> {
        let cli = self.get_cli();

        if !self.config_path.exists() {
            bail!("Config file not found");
        }

        if self.site.locales.is_empty() {
            bail!(ConfigError::Validation(
                "[site.locales] must list at least one locale".into()
            ));
        }

        if !self.site.locales.contains(&self.site.default_locale) {
            bail!(ConfigError::Validation(format!(
                "[site.default_locale] `{}` is not in [site.locales]",
                self.site.default_locale
            )));
        }

        if let Some(url) = &self.site.url
            && !url.starts_with("http")
        {
            bail!(ConfigError::Validation(
                "[site.url] must start with http:// or https://".into()
            ));
        }

        match &cli.command {
            Commands::Init { .. } if self.get_root().exists() => {
                bail!("Path already exists");
            }
            Commands::Build { .. } | Commands::Serve { .. } => {
                if !self.build.content.is_dir() {
                    bail!(ConfigError::Validation(format!(
                        "[build.content] directory not found: {}",
                        self.build.content.display()
                    )));
                }
                if !self.build.data.dir.is_dir() {
                    bail!(ConfigError::Validation(format!(
                        "[build.data.dir] directory not found: {}",
                        self.build.data.dir.display()
                    )));
                }
            }
            _ => {}
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
