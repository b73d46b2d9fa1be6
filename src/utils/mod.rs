//! Utility modules for the site generator.

pub mod date;
pub mod minify;
