//! Markdown content service.
//!
//! Content lives under one directory per locale, e.g. `content/zh/about.md`.
//! [`ContentStore::scan`] indexes every `.md` file up front and keeps the
//! raw sources in memory; parsing and rendering happen lazily per page and
//! are cached behind an `RwLock`.
//!
//! A page's slug is its path relative to the locale directory without the
//! `.md` extension (`blog/post-1.md` becomes `blog/post-1`). Frontmatter
//! may override it with an explicit `slug` field.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use walkdir::WalkDir;

use crate::utils::date;

pub mod frontmatter;
pub mod markdown;

pub use frontmatter::Frontmatter;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Missing content directory for locale `{0}`: {1}")]
    LocaleDirMissing(String, PathBuf),
    #[error("Failed to scan content directory {0}")]
    Scan(PathBuf, #[source] walkdir::Error),
    #[error("Failed to read content file: {0}")]
    Read(PathBuf, #[source] std::io::Error),
    #[error("Invalid frontmatter in {0}")]
    Parse(PathBuf, #[source] serde_yaml_ng::Error),
}

/// One parsed and rendered content page.
#[derive(Debug, Clone)]
pub struct ContentPage {
    /// Final slug, after any frontmatter override
    pub slug: String,
    pub locale: String,
    /// Frontmatter title, or the first h1 of the body when that is empty
    pub title: String,
    pub html: String,
    pub frontmatter: Frontmatter,
    /// Source path relative to the content root, e.g. `zh/about.md`
    pub file_path: String,
}

/// Sort key for [`ContentStore::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Frontmatter `date`; pages without one sort as the epoch
    #[default]
    Date,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Filters and ordering for [`ContentStore::list`].
#[derive(Debug, Clone, Default)]
pub struct ContentQuery {
    /// Restrict to one locale; `None` walks every configured locale
    pub locale: Option<String>,
    /// Keep only pages whose frontmatter tags contain this value
    pub tag: Option<String>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    /// Applied after sorting
    pub limit: Option<usize>,
}

/// Raw source of one indexed file.
#[derive(Debug, Clone)]
struct SourceFile {
    raw: String,
    file_path: String,
}

/// In-memory index of all content files, plus a parse cache.
#[derive(Debug)]
pub struct ContentStore {
    locales: Vec<String>,
    default_locale: String,
    files: HashMap<String, BTreeMap<String, SourceFile>>,
    cache: RwLock<HashMap<(String, String), Arc<ContentPage>>>,
}

// ============================================================================
// Public API
// ============================================================================

impl ContentStore {
    /// Index every Markdown file under `content_dir/<locale>/`.
    ///
    /// Each configured locale must have its directory present, even if
    /// empty. Raw file contents are read eagerly so later lookups never
    /// touch the filesystem.
    pub fn scan(
        content_dir: &Path,
        locales: &[String],
        default_locale: &str,
    ) -> Result<Self, ContentError> {
        let mut files = HashMap::new();

        for locale in locales {
            let locale_dir = content_dir.join(locale);
            if !locale_dir.is_dir() {
                return Err(ContentError::LocaleDirMissing(locale.clone(), locale_dir));
            }
            files.insert(locale.clone(), index_locale_dir(&locale_dir, locale)?);
        }

        Ok(Self {
            locales: locales.to_vec(),
            default_locale: default_locale.to_string(),
            files,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Look up one page by slug.
    ///
    /// The slug is trimmed of surrounding slashes and an empty slug means
    /// `index`. An unsupported locale reads the default locale's files
    /// instead. Returns `Ok(None)` when no such file exists.
    pub fn load(&self, locale: &str, slug: &str) -> Result<Option<Arc<ContentPage>>, ContentError> {
        let slug = normalize_slug(slug);
        let locale = if self.files.contains_key(locale) {
            locale
        } else {
            self.default_locale.as_str()
        };
        let Some(source) = self.files.get(locale).and_then(|map| map.get(&slug)) else {
            return Ok(None);
        };

        let key = (locale.to_string(), slug.clone());
        {
            let cache = self.cache.read();
            if let Some(page) = cache.get(&key) {
                return Ok(Some(page.clone()));
            }
        }

        let page = Arc::new(parse_page(locale, &slug, source)?);

        let mut cache = self.cache.write();
        let entry = cache.entry(key).or_insert(page);
        Ok(Some(entry.clone()))
    }

    /// List pages across locales with filtering, sorting and a limit.
    ///
    /// Fails fast on the first page that does not parse. A locale that is
    /// not configured yields nothing rather than falling back.
    pub fn list(&self, query: &ContentQuery) -> Result<Vec<Arc<ContentPage>>, ContentError> {
        let locales: Vec<&str> = match &query.locale {
            Some(locale) => vec![locale.as_str()],
            None => self.locales.iter().map(String::as_str).collect(),
        };

        let mut pages = Vec::new();
        for locale in locales {
            let Some(map) = self.files.get(locale) else {
                continue;
            };
            for slug in map.keys() {
                let Some(page) = self.load(locale, slug)? else {
                    continue;
                };
                if let Some(tag) = &query.tag
                    && !page.frontmatter.tags.iter().any(|t| t == tag)
                {
                    continue;
                }
                pages.push(page);
            }
        }

        match query.sort_by {
            SortBy::Date => {
                pages.sort_by_key(|page| date::sort_key(page.frontmatter.date.as_deref()));
            }
            SortBy::Title => {
                pages.sort_by(|a, b| a.title.cmp(&b.title));
            }
        }
        if query.sort_order == SortOrder::Desc {
            pages.reverse();
        }
        if let Some(limit) = query.limit {
            pages.truncate(limit);
        }

        Ok(pages)
    }

    /// Number of indexed files across all locales.
    pub fn page_count(&self) -> usize {
        self.files.values().map(BTreeMap::len).sum()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn normalize_slug(slug: &str) -> String {
    let trimmed = slug.trim_matches('/');
    if trimmed.is_empty() {
        "index".to_string()
    } else {
        trimmed.to_string()
    }
}

fn index_locale_dir(
    locale_dir: &Path,
    locale: &str,
) -> Result<BTreeMap<String, SourceFile>, ContentError> {
    let mut map = BTreeMap::new();

    for entry in WalkDir::new(locale_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| ContentError::Scan(locale_dir.to_path_buf(), e))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "md") {
            continue;
        }
        let Ok(rel) = path.strip_prefix(locale_dir) else {
            continue;
        };

        let rel_str = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let Some(slug) = rel_str.strip_suffix(".md") else {
            continue;
        };

        let raw = fs::read_to_string(path)
            .map_err(|e| ContentError::Read(path.to_path_buf(), e))?;
        map.insert(
            slug.to_string(),
            SourceFile {
                raw,
                file_path: format!("{locale}/{rel_str}"),
            },
        );
    }

    Ok(map)
}

fn parse_page(locale: &str, slug: &str, source: &SourceFile) -> Result<ContentPage, ContentError> {
    let (frontmatter, body) = frontmatter::parse(&source.raw)
        .map_err(|e| ContentError::Parse(PathBuf::from(&source.file_path), e))?;
    let rendered = markdown::render(body);

    let title = if frontmatter.title.is_empty() {
        rendered.first_heading.clone().unwrap_or_default()
    } else {
        frontmatter.title.clone()
    };
    let slug = frontmatter
        .slug
        .clone()
        .unwrap_or_else(|| slug.to_string());

    Ok(ContentPage {
        slug,
        locale: locale.to_string(),
        title,
        html: rendered.html,
        frontmatter,
        file_path: source.file_path.clone(),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn locales() -> Vec<String> {
        vec!["zh".to_string(), "en".to_string()]
    }

    fn scaffold(pages: &[(&str, &str)]) -> (TempDir, ContentStore) {
        let dir = TempDir::new().unwrap();
        for locale in ["zh", "en"] {
            fs::create_dir_all(dir.path().join(locale)).unwrap();
        }
        for (rel, content) in pages {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, content).unwrap();
        }
        let store = ContentStore::scan(dir.path(), &locales(), "zh").unwrap();
        (dir, store)
    }

    #[test]
    fn test_scan_missing_locale_dir() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("zh")).unwrap();

        let err = ContentStore::scan(dir.path(), &locales(), "zh").unwrap_err();
        assert!(matches!(err, ContentError::LocaleDirMissing(ref l, _) if l == "en"));
    }

    #[test]
    fn test_scan_counts_nested_files() {
        let (_dir, store) = scaffold(&[
            ("zh/about.md", "# 关于"),
            ("zh/blog/post-1.md", "# 一"),
            ("en/about.md", "# About"),
            ("zh/notes.txt", "not markdown"),
        ]);
        assert_eq!(store.page_count(), 3);
    }

    #[test]
    fn test_load_renders_markdown() {
        let (_dir, store) = scaffold(&[(
            "zh/about.md",
            "---\ntitle: 关于我们\n---\n# 标题\n\n**正文**",
        )]);
        let page = store.load("zh", "about").unwrap().unwrap();

        assert_eq!(page.title, "关于我们");
        assert_eq!(page.locale, "zh");
        assert_eq!(page.file_path, "zh/about.md");
        assert!(page.html.contains("<strong>正文</strong>"));
    }

    #[test]
    fn test_load_missing_slug_is_none() {
        let (_dir, store) = scaffold(&[("zh/about.md", "# About")]);
        assert!(store.load("zh", "missing").unwrap().is_none());
    }

    #[test]
    fn test_load_normalizes_slug() {
        let (_dir, store) = scaffold(&[
            ("zh/about.md", "# About"),
            ("zh/index.md", "# Home"),
        ]);

        assert!(store.load("zh", "/about/").unwrap().is_some());
        let home = store.load("zh", "").unwrap().unwrap();
        assert_eq!(home.slug, "index");
    }

    #[test]
    fn test_load_nested_slug() {
        let (_dir, store) = scaffold(&[("zh/blog/post-1.md", "# Post")]);
        let page = store.load("zh", "blog/post-1").unwrap().unwrap();

        assert_eq!(page.slug, "blog/post-1");
        assert_eq!(page.file_path, "zh/blog/post-1.md");
    }

    #[test]
    fn test_load_unsupported_locale_falls_back() {
        let (_dir, store) = scaffold(&[("zh/about.md", "# 关于")]);
        let page = store.load("fr", "about").unwrap().unwrap();

        assert_eq!(page.locale, "zh");
    }

    #[test]
    fn test_load_frontmatter_slug_wins() {
        let (_dir, store) = scaffold(&[("zh/draft.md", "---\nslug: launch\n---\n# Launch")]);
        let page = store.load("zh", "draft").unwrap().unwrap();

        assert_eq!(page.slug, "launch");
    }

    #[test]
    fn test_load_title_falls_back_to_heading() {
        let (_dir, store) = scaffold(&[("zh/hello.md", "# Hello\n\n**World**")]);
        let page = store.load("zh", "hello").unwrap().unwrap();

        assert_eq!(page.title, "Hello");
        assert!(page.html.contains("<h1>Hello</h1>"));
    }

    #[test]
    fn test_load_caches_parsed_pages() {
        let (_dir, store) = scaffold(&[("zh/about.md", "# About")]);

        let first = store.load("zh", "about").unwrap().unwrap();
        let second = store.load("zh", "about").unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_load_parse_error() {
        let (_dir, store) = scaffold(&[("zh/bad.md", "---\ntitle: [unclosed\n---\nBody")]);
        let err = store.load("zh", "bad").unwrap_err();

        assert!(matches!(err, ContentError::Parse(_, _)));
    }

    #[test]
    fn test_list_sorts_by_date_ascending() {
        let (_dir, store) = scaffold(&[
            ("zh/a.md", "---\ntitle: A\ndate: \"2025-02-01\"\n---\n"),
            ("zh/b.md", "---\ntitle: B\ndate: \"2024-12-31\"\n---\n"),
            ("zh/c.md", "---\ntitle: C\n---\n"),
        ]);
        let query = ContentQuery {
            locale: Some("zh".to_string()),
            ..Default::default()
        };
        let pages = store.list(&query).unwrap();

        let titles: Vec<&str> = pages.iter().map(|p| p.title.as_str()).collect();
        // Dateless pages sort as the epoch, so `c` comes first ascending
        assert_eq!(titles, ["C", "B", "A"]);
    }

    #[test]
    fn test_list_descending_with_limit() {
        let (_dir, store) = scaffold(&[
            ("zh/a.md", "---\ntitle: A\ndate: \"2025-02-01\"\n---\n"),
            ("zh/b.md", "---\ntitle: B\ndate: \"2024-12-31\"\n---\n"),
            ("zh/c.md", "---\ntitle: C\n---\n"),
        ]);
        let query = ContentQuery {
            locale: Some("zh".to_string()),
            sort_order: SortOrder::Desc,
            limit: Some(2),
            ..Default::default()
        };
        let pages = store.list(&query).unwrap();

        let titles: Vec<&str> = pages.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["A", "B"]);
    }

    #[test]
    fn test_list_sorts_by_title() {
        let (_dir, store) = scaffold(&[
            ("zh/x.md", "---\ntitle: Beta\n---\n"),
            ("zh/y.md", "---\ntitle: Alpha\n---\n"),
        ]);
        let query = ContentQuery {
            locale: Some("zh".to_string()),
            sort_by: SortBy::Title,
            ..Default::default()
        };
        let pages = store.list(&query).unwrap();

        let titles: Vec<&str> = pages.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["Alpha", "Beta"]);
    }

    #[test]
    fn test_list_filters_by_tag() {
        let (_dir, store) = scaffold(&[
            ("zh/a.md", "---\ntitle: A\ntags: [news]\n---\n"),
            ("zh/b.md", "---\ntitle: B\ntags: [guide]\n---\n"),
        ]);
        let query = ContentQuery {
            locale: Some("zh".to_string()),
            tag: Some("guide".to_string()),
            ..Default::default()
        };
        let pages = store.list(&query).unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title, "B");
    }

    #[test]
    fn test_list_walks_locales_in_config_order() {
        let (_dir, store) = scaffold(&[
            ("en/about.md", "---\ntitle: About\n---\n"),
            ("zh/about.md", "---\ntitle: 关于\n---\n"),
        ]);
        let pages = store.list(&ContentQuery::default()).unwrap();

        let locales: Vec<&str> = pages.iter().map(|p| p.locale.as_str()).collect();
        assert_eq!(locales, ["zh", "en"]);
    }

    #[test]
    fn test_list_unknown_locale_is_empty() {
        let (_dir, store) = scaffold(&[("zh/about.md", "# About")]);
        let query = ContentQuery {
            locale: Some("fr".to_string()),
            ..Default::default()
        };

        assert!(store.list(&query).unwrap().is_empty());
    }
}
