//! Markdown to HTML conversion.
//!
//! Uses pulldown-cmark with the GFM extensions (tables, strikethrough,
//! task lists, footnotes). Raw HTML blocks pass through unchanged per
//! CommonMark.
//!
//! The first level-1 heading is captured during the event walk so pages
//! without a frontmatter title can fall back to it.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html::push_html};

// ============================================================================
// Types
// ============================================================================

/// Result of rendering one Markdown body.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub html: String,
    /// Plain text of the first `<h1>`, if the document has one
    pub first_heading: Option<String>,
}

// ============================================================================
// Public API
// ============================================================================

/// Render Markdown to HTML and capture the first h1 text.
pub fn render(content: &str) -> Rendered {
    let options = Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES;
    let parser = Parser::new_ext(content, options);

    let mut first_heading: Option<String> = None;
    let mut in_first_h1 = false;
    let mut heading_text = String::new();

    let events: Vec<Event> = parser
        .inspect(|event| match event {
            Event::Start(Tag::Heading {
                level: pulldown_cmark::HeadingLevel::H1,
                ..
            }) if first_heading.is_none() => {
                in_first_h1 = true;
                heading_text.clear();
            }
            Event::End(TagEnd::Heading(pulldown_cmark::HeadingLevel::H1)) if in_first_h1 => {
                in_first_h1 = false;
                first_heading = Some(heading_text.trim().to_string());
            }
            Event::Text(text) if in_first_h1 => heading_text.push_str(text),
            Event::Code(code) if in_first_h1 => heading_text.push_str(code),
            _ => {}
        })
        .collect();

    let mut html = String::with_capacity(content.len() * 2);
    push_html(&mut html, events.into_iter());

    Rendered {
        html,
        first_heading,
    }
}

// ============================================================================
// Tests
// ============================================================================
