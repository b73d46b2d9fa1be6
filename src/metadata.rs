//! Per-page metadata resolution.
//!
//! [`build_metadata`] merges three layers for one request path: caller
//! overrides (frontmatter of a content page), the matching `pages` entry
//! of the SEO document, and the `global` block. Overrides win, then the
//! page entry, then the global defaults.
//!
//! An empty string never wins a merge. A page entry whose localized title
//! resolves to `""` is treated the same as a page entry without a title,
//! so the next layer takes over.

use crate::data::seo::{GlobalSeo, OgImage, PageSeo, SeoDocument};
use crate::i18n::Locales;

// ============================================================================
// Constants
// ============================================================================

const DEFAULT_TITLE: &str = "Page";
const DEFAULT_SITE_NAME: &str = "Your Company Name";
const DEFAULT_OG_IMAGE: &str = "/og-image.jpg";
const DEFAULT_OG_TYPE: &str = "website";
const DEFAULT_OG_LOCALE: &str = "en_US";
const DEFAULT_TWITTER_CARD: &str = "summary_large_image";
const DEFAULT_TWITTER_CREATOR: &str = "@yourcompany";

// ============================================================================
// Types
// ============================================================================

/// Caller-supplied overrides, the strongest merge layer.
///
/// Content pages fill these from frontmatter; static pages usually pass
/// the default.
#[derive(Debug, Clone, Default)]
pub struct MetadataOverrides {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub og_image: Option<String>,
    pub no_index: Option<bool>,
    pub canonical: Option<String>,
}

/// Fully merged OpenGraph data, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOpenGraph {
    pub og_type: Option<String>,
    pub locale: Option<String>,
    pub site_name: Option<String>,
    pub title: String,
    pub description: String,
    /// Only set when the page has no OpenGraph entry of its own
    pub url: Option<String>,
    pub images: Vec<OgImage>,
}

/// Fully merged Twitter card data.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTwitter {
    pub card: Option<String>,
    pub creator: Option<String>,
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
}

/// Everything the head of one rendered page needs.
#[derive(Debug, Clone)]
pub struct PageMetadata {
    /// Locale extracted from the request path
    pub locale: String,
    pub base_url: String,
    /// Bare page title; the title template applies at render time
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub canonical_url: String,
    pub no_index: bool,
    pub open_graph: ResolvedOpenGraph,
    pub twitter: ResolvedTwitter,
}

// ============================================================================
// Public API
// ============================================================================

/// Resolve the metadata for one locale-prefixed path.
///
/// `path` keeps its locale prefix (`/zh/pricing`); the prefix decides the
/// locale and the stripped path finds the SEO page entry. The canonical
/// URL defaults to the prefixed path, so each locale variant is its own
/// canonical page.
pub fn build_metadata(
    path: &str,
    overrides: &MetadataOverrides,
    locales: &Locales,
    seo: &SeoDocument,
) -> PageMetadata {
    let locale = locales.extract(path);
    let default_locale = locales.default_locale();
    let base_path = locales.strip_prefix(path);

    let global = &seo.global;
    let page = seo.page(&base_path);
    let base_url = seo.base_url();

    let title = non_empty(overrides.title.as_deref())
        .or_else(|| non_empty(page.map(|p| p.title.resolve(locale, default_locale))))
        .unwrap_or(DEFAULT_TITLE)
        .to_string();

    let description = non_empty(overrides.description.as_deref())
        .or_else(|| non_empty(page.map(|p| p.description.resolve(locale, default_locale))))
        .unwrap_or_else(|| global.default_description.resolve(locale, default_locale))
        .to_string();

    let keywords = overrides
        .keywords
        .clone()
        .or_else(|| page.and_then(|p| p.keywords.clone()))
        .unwrap_or_else(|| global.default_keywords.clone());

    let og_image = non_empty(overrides.og_image.as_deref())
        .or_else(|| non_empty(page.and_then(|p| p.og_image.as_deref())))
        .or_else(|| non_empty(global.default_og_image.as_deref()));

    let no_index = overrides
        .no_index
        .or_else(|| page.and_then(|p| p.no_index))
        .unwrap_or(false);

    let canonical = non_empty(overrides.canonical.as_deref())
        .or_else(|| non_empty(page.and_then(|p| p.canonical.as_deref())))
        .unwrap_or(path);

    let og_image_url = match og_image {
        Some(image) => absolutize(base_url, image),
        None => format!(
            "{base_url}{}",
            non_empty(global.default_og_image.as_deref()).unwrap_or(DEFAULT_OG_IMAGE)
        ),
    };
    let canonical_url = absolutize(base_url, canonical);

    let open_graph = resolve_open_graph(
        page,
        global,
        locale,
        default_locale,
        &title,
        &description,
        &og_image_url,
        &canonical_url,
    );
    let twitter = resolve_twitter(page, global, locale, default_locale, &title, &description, &og_image_url);

    PageMetadata {
        locale: locale.to_string(),
        base_url: base_url.to_string(),
        title,
        description,
        keywords,
        canonical_url,
        no_index,
        open_graph,
        twitter,
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Empty strings lose merges, exactly like absent values.
fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.is_empty())
}

fn absolutize(base_url: &str, path_or_url: &str) -> String {
    if path_or_url.starts_with("http") {
        path_or_url.to_string()
    } else {
        format!("{base_url}{path_or_url}")
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_open_graph(
    page: Option<&PageSeo>,
    global: &GlobalSeo,
    locale: &str,
    default_locale: &str,
    title: &str,
    description: &str,
    og_image_url: &str,
    canonical_url: &str,
) -> ResolvedOpenGraph {
    let site_name = non_empty(Some(global.site_name.as_str())).unwrap_or(DEFAULT_SITE_NAME);

    let defaults = match &global.open_graph {
        Some(og) => ResolvedOpenGraph {
            og_type: og.og_type.clone(),
            locale: og.locale.clone(),
            site_name: og.site_name.clone(),
            title: String::new(),
            description: String::new(),
            url: None,
            images: og.images.clone(),
        },
        None => ResolvedOpenGraph {
            og_type: Some(DEFAULT_OG_TYPE.to_string()),
            locale: Some(DEFAULT_OG_LOCALE.to_string()),
            site_name: Some(site_name.to_string()),
            title: String::new(),
            description: String::new(),
            url: None,
            images: vec![OgImage {
                url: og_image_url.to_string(),
                width: Some(1200),
                height: Some(630),
                alt: Some(title.to_string()),
            }],
        },
    };

    match page.and_then(|p| p.open_graph.as_ref()) {
        Some(page_og) => ResolvedOpenGraph {
            og_type: page_og.og_type.clone().or(defaults.og_type),
            locale: page_og.locale.clone().or(defaults.locale),
            site_name: defaults.site_name,
            title: non_empty(
                page_og
                    .title
                    .as_ref()
                    .map(|t| t.resolve(locale, default_locale)),
            )
            .unwrap_or(title)
            .to_string(),
            description: non_empty(
                page_og
                    .description
                    .as_ref()
                    .map(|t| t.resolve(locale, default_locale)),
            )
            .unwrap_or(description)
            .to_string(),
            url: None,
            images: page_og.images.clone().unwrap_or(defaults.images),
        },
        None => ResolvedOpenGraph {
            title: title.to_string(),
            description: description.to_string(),
            url: Some(canonical_url.to_string()),
            ..defaults
        },
    }
}

fn resolve_twitter(
    page: Option<&PageSeo>,
    global: &GlobalSeo,
    locale: &str,
    default_locale: &str,
    title: &str,
    description: &str,
    og_image_url: &str,
) -> ResolvedTwitter {
    let defaults = match &global.twitter {
        Some(tw) => ResolvedTwitter {
            card: tw.card.clone(),
            creator: tw.creator.clone(),
            title: String::new(),
            description: String::new(),
            images: Vec::new(),
        },
        None => ResolvedTwitter {
            card: Some(DEFAULT_TWITTER_CARD.to_string()),
            creator: Some(DEFAULT_TWITTER_CREATOR.to_string()),
            title: String::new(),
            description: String::new(),
            images: Vec::new(),
        },
    };

    match page.and_then(|p| p.twitter.as_ref()) {
        Some(page_tw) => ResolvedTwitter {
            card: page_tw.card.clone().or(defaults.card),
            creator: page_tw.creator.clone().or(defaults.creator),
            title: non_empty(
                page_tw
                    .title
                    .as_ref()
                    .map(|t| t.resolve(locale, default_locale)),
            )
            .unwrap_or(title)
            .to_string(),
            description: non_empty(
                page_tw
                    .description
                    .as_ref()
                    .map(|t| t.resolve(locale, default_locale)),
            )
            .unwrap_or(description)
            .to_string(),
            images: page_tw
                .images
                .clone()
                .unwrap_or_else(|| vec![og_image_url.to_string()]),
        },
        None => ResolvedTwitter {
            title: title.to_string(),
            description: description.to_string(),
            images: vec![og_image_url.to_string()],
            ..defaults
        },
    }
}

// ============================================================================
// Tests
// ============================================================================
