//! Site build pipeline.
//!
//! One build renders every locale variant of every page into the output
//! directory, then writes the sitemap and robots files. Pages render in
//! parallel; the first failure aborts the run.

use crate::{
    config::SiteConfig,
    content::{ContentPage, ContentQuery},
    context::BuildContext,
    data::seo::SeoDocument,
    generator::{build_robots, build_sitemap},
    log,
    metadata::{MetadataOverrides, PageMetadata, build_metadata},
    render::{html_escape, render_page, render_pricing_section},
    utils::minify::{MinifyType, minify},
};
use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
};
use walkdir::WalkDir;

// ============================================================================
// Types
// ============================================================================

/// One page to render: a locale-prefixed URL path plus its source.
struct Route {
    locale: String,
    /// URL path of the rendered page, e.g. `/zh/about`.
    path: String,
    kind: RouteKind,
}

enum RouteKind {
    /// Declared in the SEO document's sitemap page list.
    Static { seo_path: String },
    /// Backed by a Markdown file.
    Content { page: Arc<ContentPage> },
}

// ============================================================================
// Public API
// ============================================================================

/// Build the whole site into `config.build.output`.
pub fn build_site(config: &'static SiteConfig) -> Result<()> {
    let ctx = BuildContext::new(config)?;
    let seo = ctx.seo.document()?;

    prepare_output(&config.build.output, config.build.clean)?;

    log!("build"; "indexed {} content pages", ctx.content.page_count());

    let routes = collect_routes(&ctx, &seo)?;
    log!("build"; "rendering {} pages", routes.len());

    let has_error = AtomicBool::new(false);
    routes.par_iter().try_for_each(|route| {
        if has_error.load(Ordering::Relaxed) {
            return Err(anyhow!("Aborted"));
        }

        if let Err(error) = render_route(&ctx, &seo, route) {
            if !has_error.swap(true, Ordering::Relaxed) {
                log!("error"; "{}: {:#}", route.path, error);
            }
            return Err(anyhow!("Build failed"));
        }

        Ok(())
    })?;

    let (sitemap_result, robots_result) =
        rayon::join(|| build_sitemap(&ctx), || build_robots(&ctx));
    sitemap_result?;
    robots_result?;

    log_build_result(&config.build.output)?;

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

fn prepare_output(output: &Path, clean: bool) -> Result<()> {
    if clean && output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to clean output directory: {}", output.display()))?;
    }

    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))?;

    Ok(())
}

/// Enumerate every page of the site: for each locale, the SEO document's
/// static pages plus all Markdown content. When both map to the same URL
/// path the static page wins.
fn collect_routes(ctx: &BuildContext, seo: &SeoDocument) -> Result<Vec<Route>> {
    let mut routes = Vec::new();

    for locale in ctx.locales.all() {
        let mut taken = HashSet::new();

        for page in &seo.sitemap.pages {
            let path = ctx.locales.prefix(&page.path, locale);
            if taken.insert(path.clone()) {
                routes.push(Route {
                    locale: locale.clone(),
                    path,
                    kind: RouteKind::Static {
                        seo_path: page.path.clone(),
                    },
                });
            }
        }

        let query = ContentQuery {
            locale: Some(locale.clone()),
            ..Default::default()
        };
        for page in ctx.content.list(&query)? {
            let path = format!("/{locale}/{}", page.slug);
            if taken.insert(path.clone()) {
                routes.push(Route {
                    locale: locale.clone(),
                    path,
                    kind: RouteKind::Content { page },
                });
            }
        }
    }

    Ok(routes)
}

fn render_route(ctx: &BuildContext, seo: &SeoDocument, route: &Route) -> Result<()> {
    let (meta, heading, body) = match &route.kind {
        RouteKind::Static { seo_path } => {
            let meta = build_metadata(&route.path, &MetadataOverrides::default(), &ctx.locales, seo);

            let key = page_key(seo_path);
            let title_key = format!("{key}.title");
            let resolved = ctx.translations.resolve(&route.locale, &title_key, &[]);
            let heading = if resolved == title_key {
                meta.title.clone()
            } else {
                resolved
            };

            let body = static_page_body(ctx, seo_path, &key, &route.locale, &meta)?;
            (meta, heading, body)
        }
        RouteKind::Content { page } => {
            let overrides = MetadataOverrides {
                title: Some(page.title.clone()),
                description: page.frontmatter.description.clone(),
                og_image: page.frontmatter.image.clone(),
                ..Default::default()
            };
            let meta = build_metadata(&route.path, &overrides, &ctx.locales, seo);

            // Markdown that opens with its own <h1> keeps it.
            let heading = if page.html.trim_start().starts_with("<h1") {
                String::new()
            } else {
                page.title.clone()
            };

            (meta, heading, page.html.clone())
        }
    };

    let html = render_page(&meta, &seo.global.title_template, &heading, &body);
    let minified = minify(MinifyType::Html(html.as_bytes()), ctx.config);

    let out_path = output_path(&ctx.config.build.output, &route.path);
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(&out_path, &*minified)
        .with_context(|| format!("Failed to write page: {}", out_path.display()))?;

    log!("content"; "{}", route.path);

    Ok(())
}

/// Body markup for a static page: a translated blurb paragraph, and the
/// pricing table on the pricing page.
fn static_page_body(
    ctx: &BuildContext,
    seo_path: &str,
    key: &str,
    locale: &str,
    meta: &PageMetadata,
) -> Result<String> {
    let mut body = String::new();

    let subtitle_key = format!("{key}.subtitle");
    let blurb = ctx.translations.resolve(locale, &subtitle_key, &[]);
    let blurb = if blurb == subtitle_key {
        meta.description.clone()
    } else {
        blurb
    };
    if !blurb.is_empty() {
        body.push_str(&format!("<p>{}</p>\n", html_escape(&blurb)));
    }

    if seo_path == "/pricing" {
        let table = ctx.pricing.table(locale)?;
        body.push_str(&render_pricing_section(&table));
    }

    Ok(body)
}

/// Translation key prefix for a static page path: `/` becomes `home`,
/// nested paths join their segments with dots.
fn page_key(seo_path: &str) -> String {
    let trimmed = seo_path.trim_matches('/');
    if trimmed.is_empty() {
        "home".to_string()
    } else {
        trimmed.replace('/', ".")
    }
}

fn output_path(output: &Path, route_path: &str) -> PathBuf {
    output
        .join(route_path.trim_start_matches('/'))
        .join("index.html")
}

fn log_build_result(output: &Path) -> Result<()> {
    let mut count = 0usize;
    for entry in WalkDir::new(output) {
        let entry = entry?;
        if entry.file_type().is_file() {
            count += 1;
        }
    }

    if count == 0 {
        log!("warn"; "output directory is empty, check your config");
    } else {
        log!("build"; "done, {count} files");
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn scaffold_site(root: &Path) {
        write_file(
            &root.join("content/zh/about.md"),
            "---\ntitle: 关于我们\ndescription: 公司介绍\n---\n# 关于我们\n\n正文。\n",
        );
        write_file(
            &root.join("content/en/about.md"),
            "---\ntitle: About Us\n---\n# About Us\n\nBody.\n",
        );
        write_file(
            &root.join("data/i18n/zh.json"),
            r#"{"home": {"title": "首页", "subtitle": "欢迎"}}"#,
        );
        write_file(
            &root.join("data/i18n/en.json"),
            r#"{"home": {"title": "Home", "subtitle": "Welcome"}}"#,
        );
        write_file(
            &root.join("data/seo-config.json"),
            r#"{
                "global": {
                    "siteUrl": "https://example.com",
                    "siteName": "Example",
                    "titleTemplate": "%s | Example",
                    "defaultDescription": {"zh": "默认描述", "en": "Default description"}
                },
                "pages": [{
                    "path": "/",
                    "title": {"zh": "首页", "en": "Home"},
                    "description": {"zh": "首页描述", "en": "Home description"}
                }],
                "sitemap": {"pages": [{"path": "/", "priority": 0.9}]},
                "robots": {"rules": [{"userAgent": "*", "allow": "/"}]}
            }"#,
        );
        write_file(
            &root.join("data/pricing-config.json"),
            r#"{"zh": {
                "productName": "产品",
                "description": "描述",
                "tiers": []
            }}"#,
        );
    }

    fn make_config(root: &Path) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.site.locales = vec!["zh".to_string(), "en".to_string()];
        config.site.default_locale = "zh".to_string();
        config.build.content = root.join("content");
        config.build.output = root.join("dist");
        config.build.data.dir = root.join("data");
        config.build.sitemap.path = root.join("dist/sitemap.xml");
        config.build.robots.path = root.join("dist/robots.txt");
        config
    }

    fn leak_config(root: &Path) -> &'static SiteConfig {
        Box::leak(Box::new(make_config(root)))
    }

    #[test]
    fn test_build_site_end_to_end() {
        let dir = TempDir::new().unwrap();
        scaffold_site(dir.path());
        let config = leak_config(dir.path());

        build_site(config).unwrap();

        let out = &config.build.output;
        assert!(out.join("zh/index.html").is_file());
        assert!(out.join("en/index.html").is_file());
        assert!(out.join("zh/about/index.html").is_file());
        assert!(out.join("en/about/index.html").is_file());
        assert!(out.join("sitemap.xml").is_file());
        assert!(out.join("robots.txt").is_file());
    }

    #[test]
    fn test_build_site_home_page_markup() {
        let dir = TempDir::new().unwrap();
        scaffold_site(dir.path());
        let config = leak_config(dir.path());

        build_site(config).unwrap();

        let html = fs::read_to_string(config.build.output.join("zh/index.html")).unwrap();
        assert!(html.contains("<h1>首页</h1>"));
        assert!(html.contains("<p>欢迎</p>"));
        assert!(html.contains("首页 | Example"));
        assert!(html.contains("https://example.com/zh"));
    }

    #[test]
    fn test_build_site_content_page_markup() {
        let dir = TempDir::new().unwrap();
        scaffold_site(dir.path());
        let config = leak_config(dir.path());

        build_site(config).unwrap();

        let html = fs::read_to_string(config.build.output.join("zh/about/index.html")).unwrap();
        // The Markdown body supplies the heading, so exactly one <h1>.
        assert_eq!(html.matches("<h1").count(), 1);
        assert!(html.contains("关于我们"));
        assert!(html.contains("公司介绍"));
    }

    #[test]
    fn test_build_site_clean_removes_stale_output() {
        let dir = TempDir::new().unwrap();
        scaffold_site(dir.path());
        let mut config = make_config(dir.path());
        config.build.clean = true;
        let config: &'static SiteConfig = Box::leak(Box::new(config));

        let stale = config.build.output.join("stale.html");
        write_file(&stale, "old");

        build_site(config).unwrap();
        assert!(!stale.exists());
    }

    #[test]
    fn test_build_site_keeps_output_without_clean() {
        let dir = TempDir::new().unwrap();
        scaffold_site(dir.path());
        let config = leak_config(dir.path());

        let stale = config.build.output.join("stale.html");
        write_file(&stale, "old");

        build_site(config).unwrap();
        assert!(stale.exists());
    }

    #[test]
    fn test_page_key() {
        assert_eq!(page_key("/"), "home");
        assert_eq!(page_key("/about"), "about");
        assert_eq!(page_key("/docs/intro"), "docs.intro");
    }

    #[test]
    fn test_output_path() {
        let out = Path::new("/tmp/dist");
        assert_eq!(
            output_path(out, "/zh/about"),
            PathBuf::from("/tmp/dist/zh/about/index.html")
        );
        assert_eq!(
            output_path(out, "/en"),
            PathBuf::from("/tmp/dist/en/index.html")
        );
    }

    #[test]
    fn test_collect_routes_static_page_wins() {
        let dir = TempDir::new().unwrap();
        scaffold_site(dir.path());
        // A content file that collides with a static sitemap page.
        write_file(
            &dir.path().join("content/zh/pricing.md"),
            "---\ntitle: 价格\n---\nShadowed.\n",
        );
        write_file(
            &dir.path().join("content/en/pricing.md"),
            "---\ntitle: Pricing\n---\nShadowed.\n",
        );
        write_file(
            &dir.path().join("data/seo-config.json"),
            r#"{
                "global": {
                    "siteUrl": "https://example.com",
                    "siteName": "Example",
                    "titleTemplate": "%s",
                    "defaultDescription": {"zh": "默认", "en": "Default"}
                },
                "pages": [],
                "sitemap": {"pages": [{"path": "/"}, {"path": "/pricing"}]},
                "robots": {"rules": []}
            }"#,
        );
        let config = leak_config(dir.path());

        let ctx = BuildContext::new(config).unwrap();
        let seo = ctx.seo.document().unwrap();
        let routes = collect_routes(&ctx, &seo).unwrap();

        let pricing: Vec<_> = routes.iter().filter(|r| r.path == "/zh/pricing").collect();
        assert_eq!(pricing.len(), 1);
        assert!(matches!(pricing[0].kind, RouteKind::Static { .. }));
    }

    #[test]
    fn test_build_site_renders_pricing_section() {
        let dir = TempDir::new().unwrap();
        scaffold_site(dir.path());
        write_file(
            &dir.path().join("data/seo-config.json"),
            r#"{
                "global": {
                    "siteUrl": "https://example.com",
                    "siteName": "Example",
                    "titleTemplate": "%s",
                    "defaultDescription": {"zh": "默认", "en": "Default"}
                },
                "pages": [],
                "sitemap": {"pages": [{"path": "/"}, {"path": "/pricing"}]},
                "robots": {"rules": []}
            }"#,
        );
        write_file(
            &dir.path().join("data/pricing-config.json"),
            r#"{"zh": {
                "productName": "团队版",
                "description": "为团队准备",
                "tiers": [{
                    "id": "pro",
                    "name": "专业版",
                    "price": {"monthly": 99, "yearly": 999, "currency": "¥"},
                    "features": [{"name": "无限项目", "included": true}],
                    "buttonText": "开始使用",
                    "buttonLink": "/signup"
                }]
            }}"#,
        );
        let config = leak_config(dir.path());

        build_site(config).unwrap();

        let html = fs::read_to_string(config.build.output.join("zh/pricing/index.html")).unwrap();
        assert!(html.contains("团队版"));
        assert!(html.contains("专业版"));
    }
}
