//! HTML page emission.
//!
//! [`render_page`] turns resolved metadata plus a body fragment into a
//! complete document: `<html lang>`, the full head (title, description,
//! robots, canonical, OpenGraph, Twitter) and a `<main>` wrapper. All
//! attribute and text values go through [`html_escape`]; body fragments
//! are trusted HTML from the Markdown renderer or our own builders.

use std::borrow::Cow;
use std::fmt::Write;

use crate::data::pricing::PricingTable;
use crate::metadata::PageMetadata;

// ============================================================================
// Constants
// ============================================================================

/// Extended googlebot directives, appended after index/follow.
const GOOGLEBOT_DIRECTIVES: &str = "max-video-preview:-1, max-image-preview:large, max-snippet:-1";

// ============================================================================
// Public API
// ============================================================================

/// Render one complete HTML document.
///
/// `title_template` is the SEO document's template where `%s` stands for
/// the page title. `body_html` is embedded verbatim inside `<main>` after
/// the `<h1>` heading. An empty `heading` emits no `<h1>`, for bodies
/// that already open with their own.
pub fn render_page(
    meta: &PageMetadata,
    title_template: &str,
    heading: &str,
    body_html: &str,
) -> String {
    let title = title_template.replace("%s", &meta.title);

    let mut out = String::with_capacity(body_html.len() + 2048);
    out.push_str("<!doctype html>\n");
    let _ = writeln!(out, "<html lang=\"{}\">", html_escape(&meta.locale));
    out.push_str("<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(out, "<title>{}</title>", html_escape(&title));

    push_meta(&mut out, "description", &meta.description);
    if !meta.keywords.is_empty() {
        push_meta(&mut out, "keywords", &meta.keywords.join(", "));
    }

    let robots = if meta.no_index {
        "noindex, nofollow"
    } else {
        "index, follow"
    };
    push_meta(&mut out, "robots", robots);
    push_meta(
        &mut out,
        "googlebot",
        &format!("{robots}, {GOOGLEBOT_DIRECTIVES}"),
    );

    let _ = writeln!(
        out,
        "<link rel=\"canonical\" href=\"{}\">",
        html_escape(&meta.canonical_url)
    );

    push_open_graph(&mut out, meta);
    push_twitter(&mut out, meta);

    out.push_str("</head>\n<body>\n<main>\n");
    if !heading.is_empty() {
        let _ = writeln!(out, "<h1>{}</h1>", html_escape(heading));
    }
    out.push_str(body_html);
    if !body_html.ends_with('\n') && !body_html.is_empty() {
        out.push('\n');
    }
    out.push_str("</main>\n</body>\n</html>\n");
    out
}

/// Static markup for a pricing table.
///
/// A plain section with one card per tier. The interactive billing
/// toggle of a client app has no static equivalent and is not emitted.
pub fn render_pricing_section(table: &PricingTable) -> String {
    let mut out = String::new();
    out.push_str("<section class=\"pricing\">\n");
    let _ = writeln!(out, "<h2>{}</h2>", html_escape(&table.product_name));
    if let Some(description) = &table.description {
        let _ = writeln!(out, "<p>{}</p>", html_escape(description));
    }

    out.push_str("<ul class=\"tiers\">\n");
    for tier in &table.tiers {
        let class = if tier.recommended.unwrap_or(false) {
            "tier recommended"
        } else {
            "tier"
        };
        let _ = writeln!(out, "<li class=\"{class}\" id=\"{}\">", html_escape(&tier.id));
        let _ = writeln!(out, "<h3>{}</h3>", html_escape(&tier.name));
        if let Some(badge) = &tier.badge {
            let _ = writeln!(out, "<span class=\"badge\">{}</span>", html_escape(badge));
        }
        let _ = writeln!(
            out,
            "<p class=\"price\">{} {}</p>",
            html_escape(&tier.price.currency),
            tier.price.monthly
        );
        if let Some(description) = &tier.description {
            let _ = writeln!(out, "<p>{}</p>", html_escape(description));
        }

        out.push_str("<ul class=\"features\">\n");
        for feature in &tier.features {
            let class = if feature.included { "included" } else { "excluded" };
            let _ = writeln!(
                out,
                "<li class=\"{class}\">{}</li>",
                html_escape(&feature.name)
            );
        }
        out.push_str("</ul>\n");

        if let (Some(text), Some(link)) = (&tier.button_text, &tier.button_link) {
            let _ = writeln!(
                out,
                "<a href=\"{}\">{}</a>",
                html_escape(link),
                html_escape(text)
            );
        }
        out.push_str("</li>\n");
    }
    out.push_str("</ul>\n");

    if let Some(faq) = &table.faq
        && !faq.is_empty()
    {
        out.push_str("<section class=\"faq\">\n");
        for item in faq {
            let _ = writeln!(out, "<h3>{}</h3>", html_escape(&item.question));
            let _ = writeln!(out, "<p>{}</p>", html_escape(&item.answer));
        }
        out.push_str("</section>\n");
    }

    out.push_str("</section>\n");
    out
}

/// Escape HTML special characters.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
#[inline]
pub fn html_escape(s: &str) -> Cow<'_, str> {
    // Fast path: check if escaping is needed
    if !s.contains(['<', '>', '&', '"']) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

// ============================================================================
// Helper Functions
// ============================================================================

/// `<meta name content>`, skipped entirely for empty content.
fn push_meta(out: &mut String, name: &str, content: &str) {
    if content.is_empty() {
        return;
    }
    let _ = writeln!(
        out,
        "<meta name=\"{name}\" content=\"{}\">",
        html_escape(content)
    );
}

/// `<meta property content>` for the OpenGraph namespace.
fn push_property(out: &mut String, property: &str, content: &str) {
    if content.is_empty() {
        return;
    }
    let _ = writeln!(
        out,
        "<meta property=\"{property}\" content=\"{}\">",
        html_escape(content)
    );
}

fn push_open_graph(out: &mut String, meta: &PageMetadata) {
    let og = &meta.open_graph;
    if let Some(og_type) = &og.og_type {
        push_property(out, "og:type", og_type);
    }
    if let Some(locale) = &og.locale {
        push_property(out, "og:locale", locale);
    }
    if let Some(site_name) = &og.site_name {
        push_property(out, "og:site_name", site_name);
    }
    push_property(out, "og:title", &og.title);
    push_property(out, "og:description", &og.description);
    if let Some(url) = &og.url {
        push_property(out, "og:url", url);
    }
    for image in &og.images {
        push_property(out, "og:image", &image.url);
        if let Some(width) = image.width {
            push_property(out, "og:image:width", &width.to_string());
        }
        if let Some(height) = image.height {
            push_property(out, "og:image:height", &height.to_string());
        }
        if let Some(alt) = &image.alt {
            push_property(out, "og:image:alt", alt);
        }
    }
}

fn push_twitter(out: &mut String, meta: &PageMetadata) {
    let tw = &meta.twitter;
    if let Some(card) = &tw.card {
        push_meta(out, "twitter:card", card);
    }
    if let Some(creator) = &tw.creator {
        push_meta(out, "twitter:creator", creator);
    }
    push_meta(out, "twitter:title", &tw.title);
    push_meta(out, "twitter:description", &tw.description);
    for image in &tw.images {
        push_meta(out, "twitter:image", image);
    }
}

// ============================================================================
// Tests
// ============================================================================
