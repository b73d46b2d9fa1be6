//! Generated site artifacts: sitemap.xml and robots.txt.

pub mod robots;
pub mod sitemap;

pub use robots::build_robots;
pub use sitemap::build_sitemap;
