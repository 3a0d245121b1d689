use crate::database::DatabaseError;
use crate::error::ResultMessage;
use crate::error::RustyTableError;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Backend identifier accepted by this crate
pub const DRIVER_DUCKDB: &str = "duckdb";

/// Address selecting a private in-memory database
pub const MEMORY_ADDRESS: &str = ":memory:";

/// Connection settings for [`crate::database::Database`].
///
/// Keys are camelCase when loaded from YAML:
///
/// ```yaml
/// address: file:///var/tmp/harness.duckdb
/// username: harness
/// password: secret
/// driver: duckdb
/// poolSize: 4
/// acquireTimeoutMs: 5000
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DatabaseConfig {
    /// `:memory:`, a `file://` URL or a filesystem path
    #[serde(default = "default_address")]
    pub address: String,
    /// Accepted for compatibility; the embedded engine has no authentication
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_driver")]
    pub driver: String,
    /// Maximum number of pooled connections
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    /// How long a checkout waits for a free connection
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

fn default_address() -> String {
    MEMORY_ADDRESS.to_owned()
}

fn default_driver() -> String {
    DRIVER_DUCKDB.to_owned()
}

const fn default_pool_size() -> usize {
    5
}

const fn default_acquire_timeout_ms() -> u64 {
    30_000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            address: default_address(),
            username: String::new(),
            password: String::new(),
            driver: default_driver(),
            pool_size: default_pool_size(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
        }
    }
}

/// Where the database lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Memory,
    File(PathBuf),
}

impl DatabaseConfig {
    /// In-memory database with default pool settings.
    pub fn in_memory() -> Self {
        DatabaseConfig::default()
    }

    /// On-disk database at `path` with default pool settings.
    pub fn file(path: impl AsRef<Path>) -> Self {
        DatabaseConfig {
            address: path.as_ref().to_string_lossy().into_owned(),
            ..DatabaseConfig::default()
        }
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn from_yaml_str(text: &str) -> Result<DatabaseConfig, RustyTableError> {
        let config: DatabaseConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<DatabaseConfig, RustyTableError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(RustyTableError::from)
            .with_prefix(&format!("Read database config '{}'", path.display()))?;
        DatabaseConfig::from_yaml_str(&text)
    }

    /// Checks the driver and pool settings.
    pub fn validate(&self) -> Result<(), DatabaseError> {
        if !self.driver.eq_ignore_ascii_case(DRIVER_DUCKDB) {
            return Err(DatabaseError::UnsupportedDriver(self.driver.to_owned()));
        }
        if self.pool_size == 0 {
            return Err(DatabaseError::InvalidConfig("poolSize must be greater than zero".to_owned()));
        }
        if self.acquire_timeout_ms == 0 {
            return Err(DatabaseError::InvalidConfig("acquireTimeoutMs must be greater than zero".to_owned()));
        }
        self.target().map(|_| ())
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    /// Resolves the address to a database location.
    pub fn target(&self) -> Result<Target, DatabaseError> {
        let address = self.address.trim();
        if address.is_empty() || address == MEMORY_ADDRESS {
            return Ok(Target::Memory);
        }
        if address.starts_with("file:") {
            let url = Url::parse(address).map_err(|error| DatabaseError::InvalidConfig(format!("address '{address}': {error}")))?;
            let path = url
                .to_file_path()
                .map_err(|_| DatabaseError::InvalidConfig(format!("address '{address}' is not a local file")))?;
            return Ok(Target::File(path));
        }
        Ok(Target::File(PathBuf::from(address)))
    }
}
