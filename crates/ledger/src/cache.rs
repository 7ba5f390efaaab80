use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use tracing::{debug, info};

use moneta_core::{Category, Wallet};

use crate::client::LedgerClient;
use crate::error::LedgerError;

/// Categories for every wallet, persisted as JSON. The remote category
/// listing is slow, so it is fetched once and reused until the file goes
/// stale. Single-writer, like the token cache.
#[derive(Debug, Clone)]
pub struct CategoryCache {
    path: PathBuf,
    max_age: Duration,
}

const DEFAULT_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

impl CategoryCache {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            max_age: DEFAULT_MAX_AGE,
        }
    }

    pub fn with_max_age(path: PathBuf, max_age: Duration) -> Self {
        Self { path, max_age }
    }

    /// Cached categories while the file is fresh; a fetch-and-persist
    /// otherwise.
    pub fn load_or_fetch(
        &self,
        client: &LedgerClient,
        wallets: &[Wallet],
    ) -> Result<Vec<Category>, LedgerError> {
        if self.is_fresh() {
            if let Some(categories) = self.read() {
                debug!(count = categories.len(), "using cached categories");
                return Ok(categories);
            }
        }
        self.refresh(client, wallets)
    }

    /// Fetches every wallet's categories and rewrites the cache file.
    pub fn refresh(
        &self,
        client: &LedgerClient,
        wallets: &[Wallet],
    ) -> Result<Vec<Category>, LedgerError> {
        info!(wallets = wallets.len(), "fetching wallet categories");
        let mut categories = Vec::new();
        for wallet in wallets {
            categories.extend(client.wallet_categories(&wallet.id)?);
        }
        self.write(&categories)?;
        Ok(categories)
    }

    fn is_fresh(&self) -> bool {
        let Ok(metadata) = fs::metadata(&self.path) else {
            return false;
        };
        let Ok(modified) = metadata.modified() else {
            return false;
        };
        SystemTime::now()
            .duration_since(modified)
            .map(|age| age < self.max_age)
            .unwrap_or(false)
    }

    fn read(&self) -> Option<Vec<Category>> {
        let content = fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn write(&self, categories: &[Category]) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(categories)?)?;
        Ok(())
    }
}
