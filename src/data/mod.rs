//! Structured JSON data documents.
//!
//! Two documents drive the generated site besides Markdown content:
//!
//! | Document | Default location | Purpose |
//! |----------|------------------|---------|
//! | SEO      | `<data>/seo-config.json`     | Global and per-page metadata, sitemap pages, robots rules |
//! | Pricing  | `<data>/pricing-config.json` | Per-locale pricing tables |
//!
//! Both load through [`source::FileSource`], which resolves the file path
//! (explicit config, then environment variable, then default), parses and
//! validates it, and caches the result according to a [`source::CachePolicy`].

pub mod pricing;
pub mod seo;
pub mod source;

pub use pricing::PricingStore;
pub use seo::SeoStore;

use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading or validating a data document.
#[derive(Error, Debug)]
pub enum DataError {
    /// Document file does not exist
    #[error("Data document not found: {0}")]
    NotFound(PathBuf),

    /// Filesystem error while reading the document
    #[error("Failed to read data document: {0}")]
    Io(PathBuf, #[source] std::io::Error),

    /// Document is not valid JSON or does not match the expected shape
    #[error("Invalid JSON in data document {0}: {1}")]
    Json(PathBuf, #[source] serde_json::Error),

    /// Document parsed but failed semantic validation
    #[error("Invalid data document: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_error_display() {
        let error = DataError::NotFound(PathBuf::from("/data/seo-config.json"));
        assert_eq!(
            error.to_string(),
            "Data document not found: /data/seo-config.json"
        );
    }

    #[test]
    fn test_data_error_invalid_display() {
        let error = DataError::Invalid("global.siteName must not be empty".to_string());
        assert!(error.to_string().contains("global.siteName"));
    }

    #[test]
    fn test_data_error_json_preserves_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{bad").unwrap_err();
        let error = DataError::Json(PathBuf::from("seo-config.json"), json_err);

        assert!(error.to_string().contains("seo-config.json"));
        assert!(std::error::Error::source(&error).is_some());
    }
}
