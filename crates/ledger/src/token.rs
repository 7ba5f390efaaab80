use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use tracing::debug;

/// The service's access tokens stay valid for several days, so one is kept
/// on disk and reused while the file is young enough (by modification
/// time). Single-writer; concurrent runs against the same file are not
/// supported.
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
    max_age: Duration,
}

const DEFAULT_MAX_AGE: Duration = Duration::from_secs(5 * 24 * 60 * 60);

impl TokenCache {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            max_age: DEFAULT_MAX_AGE,
        }
    }

    pub fn with_max_age(path: PathBuf, max_age: Duration) -> Self {
        Self { path, max_age }
    }

    /// The cached token, if present and still fresh.
    pub fn load(&self) -> Option<String> {
        let modified = fs::metadata(&self.path).ok()?.modified().ok()?;
        let age = SystemTime::now().duration_since(modified).ok()?;
        if age >= self.max_age {
            debug!(path = %self.path.display(), "cached token expired");
            return None;
        }
        let token = fs::read_to_string(&self.path).ok()?;
        let token = token.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    pub fn store(&self, token: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_token_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::new(dir.path().join("token.txt"));
        cache.store("abc123").unwrap();
        assert_eq!(cache.load().as_deref(), Some("abc123"));
    }

    #[test]
    fn missing_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::new(dir.path().join("token.txt"));
        assert!(cache.load().is_none());
    }

    #[test]
    fn zero_max_age_always_expires() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::with_max_age(dir.path().join("token.txt"), Duration::ZERO);
        cache.store("abc123").unwrap();
        assert!(cache.load().is_none());
    }

    #[test]
    fn whitespace_only_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::new(dir.path().join("token.txt"));
        cache.store("  \n").unwrap();
        assert!(cache.load().is_none());
    }

    #[test]
    fn store_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::new(dir.path().join("nested/deeper/token.txt"));
        cache.store("abc123").unwrap();
        assert_eq!(cache.load().as_deref(), Some("abc123"));
    }
}
