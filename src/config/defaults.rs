//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [site] Section Defaults
// ============================================================================

pub mod site {
    pub fn url() -> Option<String> {
        None
    }

    pub fn name() -> String {
        "My Site".into()
    }

    pub fn locales() -> Vec<String> {
        vec!["zh".into(), "en".into()]
    }

    pub fn default_locale() -> String {
        "zh".into()
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn content() -> PathBuf {
        "content".into()
    }

    pub fn output() -> PathBuf {
        "public".into()
    }

    pub mod data {
        use std::path::PathBuf;

        pub fn dir() -> PathBuf {
            "data".into()
        }

        pub fn seo() -> Option<PathBuf> {
            None
        }

        pub fn pricing() -> Option<PathBuf> {
            None
        }

        pub fn translations() -> PathBuf {
            "i18n".into()
        }
    }

    pub mod sitemap {
        use std::path::PathBuf;

        pub fn path() -> PathBuf {
            "sitemap.xml".into()
        }
    }

    pub mod robots {
        use std::path::PathBuf;

        pub fn path() -> PathBuf {
            "robots.txt".into()
        }
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        5277
    }
}
