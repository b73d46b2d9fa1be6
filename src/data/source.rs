//! Cached loading of JSON data documents.
//!
//! `FileSource` owns one document file: path resolution, parsing,
//! validation, an optional transform, and caching. The cache policy decides
//! whether a loaded document lives for the whole process or is re-checked
//! against the file's mtime on every access.

use super::DataError;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};

// ============================================================================
// Types
// ============================================================================

/// When a cached document is considered stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Load once, never re-read
    Once,
    /// Re-read when the file mtime changes
    Mtime,
}

type Validate<T> = fn(&T) -> Result<(), DataError>;
type Transform<T> = Box<dyn Fn(T) -> T + Send + Sync>;

/// A single JSON document on disk, parsed into `T` and cached.
pub struct FileSource<T> {
    path: PathBuf,
    policy: CachePolicy,
    transform: Option<Transform<T>>,
    validate: Option<Validate<T>>,
    cache: RwLock<Option<Cached<T>>>,
}

struct Cached<T> {
    value: Arc<T>,
    mtime: Option<SystemTime>,
}

// ============================================================================
// Public API
// ============================================================================

impl<T: DeserializeOwned> FileSource<T> {
    pub fn new(path: PathBuf, policy: CachePolicy) -> Self {
        Self {
            path,
            policy,
            transform: None,
            validate: None,
            cache: RwLock::new(None),
        }
    }

    /// Applied after validation, before caching. Used for overrides that
    /// come from outside the document, like the base URL.
    pub fn with_transform(mut self, f: impl Fn(T) -> T + Send + Sync + 'static) -> Self {
        self.transform = Some(Box::new(f));
        self
    }

    /// Semantic validation of the raw parsed document.
    pub fn with_validator(mut self, f: Validate<T>) -> Self {
        self.validate = Some(f);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the document, loading it if absent or stale.
    pub fn get(&self) -> Result<Arc<T>, DataError> {
        // Fast path: cached and fresh (read lock only)
        {
            let cache = self.cache.read();
            if let Some(cached) = cache.as_ref()
                && self.is_fresh(cached)
            {
                return Ok(Arc::clone(&cached.value));
            }
        }

        // Slow path: load and cache (upgrade to write lock)
        let mut cache = self.cache.write();
        // Double-check after acquiring write lock
        if let Some(cached) = cache.as_ref()
            && self.is_fresh(cached)
        {
            return Ok(Arc::clone(&cached.value));
        }

        let (value, mtime) = self.load()?;
        let value = Arc::new(value);
        *cache = Some(Cached {
            value: Arc::clone(&value),
            mtime,
        });
        Ok(value)
    }
}

// ============================================================================
// Path Resolution
// ============================================================================

/// Resolve the document path: explicit config wins, then an environment
/// variable, then the default. A candidate without an extension gets
/// `.json` appended.
pub fn resolve_path(explicit: Option<&Path>, env_var: &str, default: &Path) -> PathBuf {
    let candidate = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(env_var).ok().map(PathBuf::from))
        .unwrap_or_else(|| default.to_path_buf());

    if candidate.extension().is_none() {
        candidate.with_extension("json")
    } else {
        candidate
    }
}

// ============================================================================
// Internal Implementation
// ============================================================================

impl<T: DeserializeOwned> FileSource<T> {
    fn is_fresh(&self, cached: &Cached<T>) -> bool {
        match self.policy {
            CachePolicy::Once => true,
            CachePolicy::Mtime => file_mtime(&self.path) == cached.mtime,
        }
    }

    fn load(&self) -> Result<(T, Option<SystemTime>), DataError> {
        if !self.path.exists() {
            return Err(DataError::NotFound(self.path.clone()));
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|err| DataError::Io(self.path.clone(), err))?;
        let mut value: T = serde_json::from_str(&content)
            .map_err(|err| DataError::Json(self.path.clone(), err))?;

        if let Some(validate) = self.validate {
            validate(&value)?;
        }
        if let Some(transform) = &self.transform {
            value = transform(value);
        }

        Ok((value, file_mtime(&self.path)))
    }
}

fn file_mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::{thread, time::Duration};
    use tempfile::TempDir;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Doc {
        name: String,
        #[serde(default)]
        count: u32,
    }

    fn write_doc(dir: &TempDir, json: &str) -> PathBuf {
        let path = dir.path().join("doc.json");
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_get_parses_document() {
        let tmp = TempDir::new().unwrap();
        let path = write_doc(&tmp, r#"{"name": "seo", "count": 3}"#);

        let source: FileSource<Doc> = FileSource::new(path, CachePolicy::Once);
        let doc = source.get().unwrap();

        assert_eq!(doc.name, "seo");
        assert_eq!(doc.count, 3);
    }

    #[test]
    fn test_get_missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("absent.json");

        let source: FileSource<Doc> = FileSource::new(path, CachePolicy::Once);
        assert!(matches!(source.get(), Err(DataError::NotFound(_))));
    }

    #[test]
    fn test_get_invalid_json_is_json_error() {
        let tmp = TempDir::new().unwrap();
        let path = write_doc(&tmp, "{broken");

        let source: FileSource<Doc> = FileSource::new(path, CachePolicy::Once);
        assert!(matches!(source.get(), Err(DataError::Json(_, _))));
    }

    #[test]
    fn test_once_policy_ignores_file_changes() {
        let tmp = TempDir::new().unwrap();
        let path = write_doc(&tmp, r#"{"name": "first"}"#);

        let source: FileSource<Doc> = FileSource::new(path.clone(), CachePolicy::Once);
        assert_eq!(source.get().unwrap().name, "first");

        fs::write(&path, r#"{"name": "second"}"#).unwrap();
        assert_eq!(source.get().unwrap().name, "first");
    }

    #[test]
    fn test_mtime_policy_reloads_on_change() {
        let tmp = TempDir::new().unwrap();
        let path = write_doc(&tmp, r#"{"name": "first"}"#);

        let source: FileSource<Doc> = FileSource::new(path.clone(), CachePolicy::Mtime);
        assert_eq!(source.get().unwrap().name, "first");

        // Ensure the rewrite lands on a different mtime
        thread::sleep(Duration::from_millis(50));
        fs::write(&path, r#"{"name": "second"}"#).unwrap();
        assert_eq!(source.get().unwrap().name, "second");
    }

    #[test]
    fn test_mtime_policy_caches_between_changes() {
        let tmp = TempDir::new().unwrap();
        let path = write_doc(&tmp, r#"{"name": "stable"}"#);

        let source: FileSource<Doc> = FileSource::new(path, CachePolicy::Mtime);
        let first = source.get().unwrap();
        let second = source.get().unwrap();

        // Same Arc, no reload happened
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_transform_applies_before_cache() {
        let tmp = TempDir::new().unwrap();
        let path = write_doc(&tmp, r#"{"name": "raw"}"#);

        let source: FileSource<Doc> =
            FileSource::new(path, CachePolicy::Once).with_transform(|mut doc: Doc| {
                doc.name = format!("{}+transformed", doc.name);
                doc
            });

        assert_eq!(source.get().unwrap().name, "raw+transformed");
    }

    #[test]
    fn test_validator_rejects_document() {
        let tmp = TempDir::new().unwrap();
        let path = write_doc(&tmp, r#"{"name": ""}"#);

        let source: FileSource<Doc> =
            FileSource::new(path, CachePolicy::Once).with_validator(|doc| {
                if doc.name.is_empty() {
                    return Err(DataError::Invalid("name must not be empty".into()));
                }
                Ok(())
            });

        assert!(matches!(source.get(), Err(DataError::Invalid(_))));
    }

    #[test]
    fn test_resolve_path_explicit_wins() {
        let resolved = resolve_path(
            Some(Path::new("/custom/seo.json")),
            "LOKA_TEST_UNSET_VAR",
            Path::new("/data/seo-config"),
        );
        assert_eq!(resolved, PathBuf::from("/custom/seo.json"));
    }

    #[test]
    fn test_resolve_path_default_appends_json() {
        let resolved = resolve_path(None, "LOKA_TEST_UNSET_VAR", Path::new("/data/seo-config"));
        assert_eq!(resolved, PathBuf::from("/data/seo-config.json"));
    }

    #[test]
    fn test_resolve_path_keeps_existing_extension() {
        let resolved = resolve_path(
            Some(Path::new("/custom/seo.jsonc")),
            "LOKA_TEST_UNSET_VAR",
            Path::new("/data/seo-config"),
        );
        assert_eq!(resolved, PathBuf::from("/custom/seo.jsonc"));
    }
}
