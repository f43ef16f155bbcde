//! # Stockroom Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOCKROOM_DB_PATH=/var/lib/stockroom/stockroom.db                  │
//! │     STOCKROOM_NOTIFIER_MODE=webhook                                    │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/stockroom/stockroom.toml (Linux)                         │
//! │     ~/Library/Application Support/com.stockroom.stockroom/ (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     ./stockroom.db, log notifier, 24h cooldown                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "stockroom.db"
//! max_connections = 5
//!
//! [inventory]
//! default_threshold = 5
//! notification_cooldown_hours = 24
//! default_page_size = 5
//! max_page_size = 100
//!
//! [notifier]
//! mode = "webhook"  # log | webhook
//! webhook_url = "https://relay.example.com/mail"
//! from_address = "stockroom@example.com"
//! timeout_secs = 10
//! queue_capacity = 256
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use stockroom_core::{
    NotificationThrottle, DEFAULT_LOW_STOCK_THRESHOLD, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
    NOTIFICATION_COOLDOWN_HOURS,
};
use stockroom_db::DbConfig;

use crate::error::{ServiceError, ServiceResult};

// =============================================================================
// Notifier Mode
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifierMode {
    /// Alerts are written to the log only.
    #[default]
    Log,

    /// Alerts are POSTed to a mail relay.
    Webhook,
}

impl std::fmt::Display for NotifierMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifierMode::Log => write!(f, "log"),
            NotifierMode::Webhook => write!(f, "webhook"),
        }
    }
}

impl std::str::FromStr for NotifierMode {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "log" | "none" => Ok(NotifierMode::Log),
            "webhook" | "http" => Ok(NotifierMode::Webhook),
            other => Err(ServiceError::Config(format!(
                "Unknown notifier mode: '{}'. Valid options: log, webhook",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a writer waits for SQLite's write lock (seconds).
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("stockroom.db")
}

fn default_max_connections() -> u32 {
    5
}

fn default_busy_timeout() -> u64 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
            busy_timeout_secs: default_busy_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySettings {
    /// Threshold for products created without one.
    #[serde(default = "default_threshold")]
    pub default_threshold: i64,

    #[serde(default = "default_cooldown_hours")]
    pub notification_cooldown_hours: i64,

    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

fn default_threshold() -> i64 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

fn default_cooldown_hours() -> i64 {
    NOTIFICATION_COOLDOWN_HOURS
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_max_page_size() -> u32 {
    MAX_PAGE_SIZE
}

impl Default for InventorySettings {
    fn default() -> Self {
        InventorySettings {
            default_threshold: default_threshold(),
            notification_cooldown_hours: default_cooldown_hours(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierSettings {
    #[serde(default)]
    pub mode: NotifierMode,

    /// Mail relay endpoint; required in webhook mode.
    #[serde(default)]
    pub webhook_url: Option<String>,

    #[serde(default = "default_from_address")]
    pub from_address: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Alerts queued beyond this are dropped.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_from_address() -> String {
    "stockroom@localhost".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_queue_capacity() -> usize {
    256
}

impl Default for NotifierSettings {
    fn default() -> Self {
        NotifierSettings {
            mode: NotifierMode::default(),
            webhook_url: None,
            from_address: default_from_address(),
            timeout_secs: default_timeout(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockroomConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub inventory: InventorySettings,

    #[serde(default)]
    pub notifier: NotifierSettings,
}

impl StockroomConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (stockroom.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ServiceResult<Self> {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// [`load`](Self::load) with overrides read through `lookup` instead of
    /// the process environment.
    pub fn load_with(
        config_path: Option<PathBuf>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ServiceResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(lookup);
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn save(&self, config_path: Option<PathBuf>) -> ServiceResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ServiceError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    pub fn validate(&self) -> ServiceResult<()> {
        if self.database.max_connections == 0 {
            return Err(ServiceError::Config(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.inventory.default_threshold < 0 {
            return Err(ServiceError::Config(
                "inventory.default_threshold must not be negative".into(),
            ));
        }

        if self.inventory.notification_cooldown_hours < 0 {
            return Err(ServiceError::Config(
                "inventory.notification_cooldown_hours must not be negative".into(),
            ));
        }

        let inv = &self.inventory;
        if inv.default_page_size == 0 || inv.max_page_size == 0 {
            return Err(ServiceError::Config("page sizes must be greater than 0".into()));
        }
        if inv.default_page_size > inv.max_page_size {
            return Err(ServiceError::Config(format!(
                "inventory.default_page_size ({}) exceeds max_page_size ({})",
                inv.default_page_size, inv.max_page_size
            )));
        }

        if self.notifier.mode == NotifierMode::Webhook {
            match self.notifier.webhook_url.as_deref() {
                Some(url) if url.starts_with("http://") || url.starts_with("https://") => {}
                Some(url) => {
                    return Err(ServiceError::Config(format!(
                        "Webhook URL must start with http:// or https://, got: {}",
                        url
                    )))
                }
                None => {
                    return Err(ServiceError::Config(
                        "notifier.webhook_url is required in webhook mode".into(),
                    ))
                }
            }
        }

        if self.notifier.queue_capacity == 0 {
            return Err(ServiceError::Config(
                "notifier.queue_capacity must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `STOCKROOM_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("STOCKROOM_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(max) = lookup("STOCKROOM_DB_MAX_CONNECTIONS") {
            if let Ok(m) = max.parse::<u32>() {
                self.database.max_connections = m;
            }
        }

        if let Some(threshold) = lookup("STOCKROOM_LOW_STOCK_THRESHOLD") {
            if let Ok(t) = threshold.parse::<i64>() {
                debug!(threshold = t, "Overriding default threshold from environment");
                self.inventory.default_threshold = t;
            }
        }

        if let Some(hours) = lookup("STOCKROOM_NOTIFY_COOLDOWN_HOURS") {
            if let Ok(h) = hours.parse::<i64>() {
                self.inventory.notification_cooldown_hours = h;
            }
        }

        if let Some(mode) = lookup("STOCKROOM_NOTIFIER_MODE") {
            match mode.parse() {
                Ok(parsed) => {
                    debug!(mode = %mode, "Overriding notifier mode from environment");
                    self.notifier.mode = parsed;
                }
                Err(_) => warn!(mode = %mode, "Unknown notifier mode in environment"),
            }
        }

        if let Some(url) = lookup("STOCKROOM_WEBHOOK_URL") {
            debug!(url = %url, "Overriding webhook URL from environment");
            self.notifier.webhook_url = Some(url);
        }

        if let Some(from) = lookup("STOCKROOM_NOTIFY_FROM") {
            self.notifier.from_address = from;
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stockroom", "stockroom")
            .map(|dirs| dirs.config_dir().join("stockroom.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path)
            .max_connections(self.database.max_connections)
            .busy_timeout(Duration::from_secs(self.database.busy_timeout_secs))
    }

    pub fn throttle(&self) -> NotificationThrottle {
        NotificationThrottle::with_cooldown_hours(self.inventory.notification_cooldown_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("log".parse::<NotifierMode>().unwrap(), NotifierMode::Log);
        assert_eq!("Webhook".parse::<NotifierMode>().unwrap(), NotifierMode::Webhook);
        assert!("smtp".parse::<NotifierMode>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = StockroomConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.inventory.default_threshold, 5);
        assert_eq!(config.inventory.notification_cooldown_hours, 24);
        assert_eq!(config.inventory.default_page_size, 5);
        assert_eq!(config.notifier.mode, NotifierMode::Log);
        assert_eq!(config.throttle().cooldown(), chrono::Duration::hours(24));
    }

    #[test]
    fn test_config_validation() {
        let mut config = StockroomConfig::default();

        config.database.max_connections = 0;
        assert!(config.validate().is_err());
        config.database.max_connections = 5;

        config.inventory.default_page_size = 200;
        assert!(config.validate().is_err());
        config.inventory.default_page_size = 5;

        config.notifier.mode = NotifierMode::Webhook;
        assert!(config.validate().is_err());

        config.notifier.webhook_url = Some("ftp://relay".into());
        assert!(config.validate().is_err());

        config.notifier.webhook_url = Some("https://relay.example.com/mail".into());
        assert!(config.validate().is_ok());

        config.notifier.queue_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: StockroomConfig = toml::from_str(
            r#"
            [inventory]
            notification_cooldown_hours = 12
            "#,
        )
        .unwrap();

        assert_eq!(config.inventory.notification_cooldown_hours, 12);
        assert_eq!(config.inventory.max_page_size, 100);
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("STOCKROOM_DB_PATH", "/tmp/s.db"),
            ("STOCKROOM_LOW_STOCK_THRESHOLD", "3"),
            ("STOCKROOM_NOTIFIER_MODE", "webhook"),
            ("STOCKROOM_WEBHOOK_URL", "http://localhost:8025/mail"),
            ("STOCKROOM_DB_MAX_CONNECTIONS", "many"),
        ]
        .into_iter()
        .collect();

        let mut config = StockroomConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, PathBuf::from("/tmp/s.db"));
        assert_eq!(config.inventory.default_threshold, 3);
        assert_eq!(config.notifier.mode, NotifierMode::Webhook);
        // Unparseable values are ignored
        assert_eq!(config.database.max_connections, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("stockroom.toml");

        let mut config = StockroomConfig::default();
        config.inventory.default_threshold = 8;
        config.save(Some(path.clone())).unwrap();

        let loaded = StockroomConfig::load_with(Some(path.clone()), |_| None).unwrap();
        assert_eq!(loaded.inventory.default_threshold, 8);

        // Overrides still win over the file
        let loaded = StockroomConfig::load_with(Some(path), |key| {
            (key == "STOCKROOM_LOW_STOCK_THRESHOLD").then(|| "2".to_string())
        })
        .unwrap();
        assert_eq!(loaded.inventory.default_threshold, 2);
    }

    #[test]
    fn test_toml_serialization() {
        let config = StockroomConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[notifier]"));
        assert!(toml_str.contains("mode = \"log\""));

        let parsed: StockroomConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.inventory.max_page_size, config.inventory.max_page_size);
    }
}
