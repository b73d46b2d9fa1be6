//! Preview server for built output.
//!
//! A lightweight HTTP server over the build output directory:
//!
//! - Static file serving with `index.html` resolution for directories
//! - Redirect of locale-less paths into the default locale, mirroring
//!   how the production site routes visitors
//! - Directory listing for folders without an index
//! - Graceful shutdown on Ctrl+C

use crate::{config::SiteConfig, log};
use anyhow::{Context, Result};
use std::{
    fs,
    io::Cursor,
    net::{IpAddr, SocketAddr},
    path::Path,
    sync::Arc,
};
use tiny_http::{Header, Request, Response, Server, StatusCode};

// ============================================================================
// Constants
// ============================================================================

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

// ============================================================================
// Server Entry Point
// ============================================================================

/// Start the preview server. Blocks until Ctrl+C.
pub fn serve_site(config: &'static SiteConfig) -> Result<()> {
    let interface: IpAddr = config.serve.interface.parse()?;
    let (server, addr) = try_bind_port(interface, config.serve.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    // Set up Ctrl+C handler for graceful shutdown
    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{addr}");

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, config) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr)> {
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < max_retries => {
                continue;
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to bind after {} attempts (ports {}-{}): {}",
                    max_retries,
                    base_port,
                    port,
                    e
                ));
            }
        }
    }
    unreachable!()
}

// ============================================================================
// Request Handling
// ============================================================================

/// Handle a single HTTP request.
///
/// Resolution order:
/// 1. Exact file match → serve file
/// 2. Directory with index.html → serve index.html
/// 3. Directory without index.html → generate listing
/// 4. Locale-less path that exists under the default locale → redirect
/// 5. Nothing found → 404
fn handle_request(request: Request, config: &SiteConfig) -> Result<()> {
    let serve_root = &config.build.output;

    // Decode URL-encoded characters (e.g., %20 → space)
    let url_path = urlencoding::decode(request.url())
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    // Strip query string before resolving the path
    let path_without_query = url_path.split('?').next().unwrap_or(&url_path);
    let request_path = path_without_query.trim_matches('/');
    let local_path = serve_root.join(request_path);

    if local_path.is_file() {
        return serve_file(request, &local_path);
    }

    if local_path.is_dir() {
        let index_path = local_path.join("index.html");
        if index_path.is_file() {
            return serve_file(request, &index_path);
        }

        if let Ok(listing) = generate_directory_listing(&local_path, request_path) {
            return serve_html(request, listing);
        }
    }

    if let Some(target) = locale_redirect_target(config, request_path) {
        let candidate = serve_root
            .join(target.trim_start_matches('/'))
            .join("index.html");
        if candidate.is_file() {
            return serve_redirect(request, &target);
        }
    }

    serve_not_found(request)
}

/// Redirect target for a path that does not start with a supported
/// locale, like the production site's locale detection. Returns `None`
/// when the path is already locale-prefixed.
fn locale_redirect_target(config: &SiteConfig, request_path: &str) -> Option<String> {
    let first = request_path.split('/').next().unwrap_or("");
    if config.site.locales.iter().any(|l| l == first) {
        return None;
    }

    let default = &config.site.default_locale;
    if request_path.is_empty() {
        Some(format!("/{default}"))
    } else {
        Some(format!("/{default}/{request_path}"))
    }
}

// ============================================================================
// Response Helpers
// ============================================================================

/// Serve a file with appropriate content type.
fn serve_file(request: Request, path: &Path) -> Result<()> {
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let content_type = guess_content_type(path);

    let response = Response::from_data(content)
        .with_header(Header::from_bytes("Content-Type", content_type).unwrap());

    request.respond(response)?;
    Ok(())
}

/// Serve HTML content.
fn serve_html(request: Request, content: String) -> Result<()> {
    let response = Response::from_string(content)
        .with_header(Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap());
    request.respond(response)?;
    Ok(())
}

/// Serve a 302 redirect.
fn serve_redirect(request: Request, location: &str) -> Result<()> {
    let response = Response::new(
        StatusCode(302),
        vec![Header::from_bytes("Location", location).unwrap()],
        Cursor::new(""),
        Some(0),
        None,
    );
    request.respond(response)?;
    Ok(())
}

/// Serve 404 Not Found response.
fn serve_not_found(request: Request) -> Result<()> {
    let response = Response::new(
        StatusCode(404),
        vec![Header::from_bytes("Content-Type", "text/plain").unwrap()],
        Cursor::new("404 Not Found"),
        Some(13),
        None,
    );
    request.respond(response)?;
    Ok(())
}

// ============================================================================
// Content Type Detection
// ============================================================================

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

// ============================================================================
// Directory Listing
// ============================================================================

/// Generate an HTML listing of directories and `.html` files, with a
/// parent link when not at the root. Hidden entries are skipped.
fn generate_directory_listing(dir_path: &Path, request_path: &str) -> std::io::Result<String> {
    let mut items = Vec::new();
    for entry in fs::read_dir(dir_path)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

        if name.starts_with('.') || (!is_dir && !name.ends_with(".html")) {
            continue;
        }

        let href = if request_path.is_empty() {
            format!("/{name}")
        } else {
            format!("/{request_path}/{name}")
        };
        items.push(format!(r#"<li><a href="{href}">{name}</a></li>"#));
    }
    items.sort();

    let parent_link = if request_path.is_empty() {
        String::new()
    } else {
        let parent_path = Path::new(request_path)
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        if parent_path.is_empty() {
            r#"<li><a href="/">..</a></li>"#.to_string()
        } else {
            format!(r#"<li><a href="/{parent_path}">..</a></li>"#)
        }
    };

    Ok(format!(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>/{request_path}</title></head>\n<body>\n<h1>/{request_path}</h1>\n<ul>\n{parent_link}\n{}\n</ul>\n</body></html>\n",
        items.join("\n")
    ))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_content_type() {
        assert_eq!(
            guess_content_type(Path::new("index.html")),
            "text/html; charset=utf-8"
        );
        assert_eq!(
            guess_content_type(Path::new("sitemap.xml")),
            "application/xml; charset=utf-8"
        );
        assert_eq!(
            guess_content_type(Path::new("robots.txt")),
            "text/plain; charset=utf-8"
        );
        assert_eq!(
            guess_content_type(Path::new("unknown.bin")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_locale_redirect_target() {
        let config = SiteConfig::default();

        assert_eq!(
            locale_redirect_target(&config, ""),
            Some("/zh".to_string())
        );
        assert_eq!(
            locale_redirect_target(&config, "about"),
            Some("/zh/about".to_string())
        );
        assert_eq!(
            locale_redirect_target(&config, "docs/intro"),
            Some("/zh/docs/intro".to_string())
        );
    }

    #[test]
    fn test_locale_redirect_skips_prefixed_paths() {
        let config = SiteConfig::default();

        assert_eq!(locale_redirect_target(&config, "zh"), None);
        assert_eq!(locale_redirect_target(&config, "en/about"), None);
    }

    #[test]
    fn test_directory_listing_filters_entries() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "x").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join(".hidden"), "x").unwrap();
        fs::create_dir(dir.path().join("zh")).unwrap();

        let listing = generate_directory_listing(dir.path(), "").unwrap();

        assert!(listing.contains(r#"<a href="/index.html">index.html</a>"#));
        assert!(listing.contains(r#"<a href="/zh">zh</a>"#));
        assert!(!listing.contains("notes.txt"));
        assert!(!listing.contains(".hidden"));
    }

    #[test]
    fn test_directory_listing_parent_link() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::create_dir(dir.path().join("about")).unwrap();

        let listing = generate_directory_listing(dir.path(), "zh").unwrap();
        assert!(listing.contains(r#"<a href="/">..</a>"#));

        let listing = generate_directory_listing(dir.path(), "zh/docs").unwrap();
        assert!(listing.contains(r#"<a href="/zh">..</a>"#));
    }
}
