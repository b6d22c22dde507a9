//! Application configuration.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::args::CliArgs;
use super::storage::ConfigError;

const APP_NAME: &str = "imagehub";
const APP_QUALIFIER: &str = "com";
const APP_ORGANIZATION: &str = "imagehub";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Directory all relative paths resolve against.
    #[serde(default = "default_content_root")]
    pub content_root: PathBuf,

    /// HTTP listener.
    #[serde(default)]
    pub server: ServerConfig,

    /// Image storage.
    #[serde(default)]
    pub images: ImagesConfig,

    /// Legacy path rewrites.
    #[serde(default)]
    pub rewrites: RewritesConfig,

    /// Derivative caching.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Image storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// Image root, relative to the content root.
    #[serde(default = "default_images_root")]
    pub root: PathBuf,

    /// Sentinel served when nothing matched, relative to the image root.
    #[serde(default = "default_not_found")]
    pub not_found: PathBuf,

    /// Namespace whose extensionless identifiers always map to WebP.
    #[serde(default = "default_schema_namespace")]
    pub schema_namespace: String,

    /// Folder used for derivative lookups when none is given.
    #[serde(default = "default_folder")]
    pub default_folder: String,

    /// Convert served JPEGs to WebP once and serve the WebP afterwards.
    #[serde(default = "default_true")]
    pub convert_to_webp: bool,

    /// Upload size limit in megabytes, reported by the settings endpoint.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            root: default_images_root(),
            not_found: default_not_found(),
            schema_namespace: default_schema_namespace(),
            default_folder: default_folder(),
            convert_to_webp: true,
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

/// Rewrite table configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewritesConfig {
    /// Rewrite file, relative to the content root.
    #[serde(default = "default_rewrites_path")]
    pub path: PathBuf,

    /// Legacy URL prefix stripped from both sides of each rule.
    #[serde(default = "default_legacy_prefix")]
    pub legacy_prefix: String,

    /// Idle time after which the cached table is dropped.
    #[serde(default = "default_two_hours")]
    pub sliding_expiration_secs: u64,
}

impl Default for RewritesConfig {
    fn default() -> Self {
        Self {
            path: default_rewrites_path(),
            legacy_prefix: default_legacy_prefix(),
            sliding_expiration_secs: default_two_hours(),
        }
    }
}

/// Derivative cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Enable the derivative cache.
    #[serde(default = "default_true")]
    pub enable_cache: bool,

    /// Lifetime of a cached derivative in seconds.
    #[serde(default = "default_two_hours")]
    pub cache_duration_secs: u64,

    /// Optional bound on cached derivatives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<usize>,

    /// Period of the expired-entry sweep in seconds; zero disables it.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enable_cache: true,
            cache_duration_secs: default_two_hours(),
            max_entries: None,
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_content_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    5080
}

fn default_images_root() -> PathBuf {
    PathBuf::from("images")
}

fn default_not_found() -> PathBuf {
    PathBuf::from("nenalezeno.webp")
}

fn default_schema_namespace() -> String {
    "schema".to_string()
}

fn default_folder() -> String {
    "product".to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_max_upload_mb() -> u32 {
    10
}

fn default_rewrites_path() -> PathBuf {
    PathBuf::from("conf/rewrites.conf")
}

fn default_legacy_prefix() -> String {
    "/img/".to_string()
}

const fn default_two_hours() -> u64 {
    2 * 60 * 60
}

const fn default_sweep_interval() -> u64 {
    300
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: CliArgs) {
        if let Some(config_path) = args.config {
            self.config = Some(config_path);
        }
        if let Some(log_path) = args.log_path {
            self.log_path = Some(log_path);
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(content_root) = args.content_root {
            self.content_root = content_root;
        }
        if let Some(host) = args.host {
            self.server.host = host;
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(enable_cache) = args.enable_cache {
            self.cache.enable_cache = enable_cache;
        }
        if let Some(convert_to_webp) = args.convert_to_webp {
            self.images.convert_to_webp = convert_to_webp;
        }
    }

    /// Checks values that would otherwise fail at runtime.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Validation("server.host must not be empty".into()));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Validation("server.port must not be 0".into()));
        }
        if self.rewrites.sliding_expiration_secs == 0 {
            return Err(ConfigError::Validation(
                "rewrites.sliding_expiration_secs must be positive".into(),
            ));
        }
        if self.cache.cache_duration_secs == 0 {
            return Err(ConfigError::Validation(
                "cache.cache_duration_secs must be positive".into(),
            ));
        }
        if self.cache.max_entries == Some(0) {
            return Err(ConfigError::Validation(
                "cache.max_entries must be positive when set".into(),
            ));
        }
        if self.images.not_found.as_os_str().is_empty() {
            return Err(ConfigError::Validation("images.not_found must not be empty".into()));
        }
        Ok(())
    }

    /// Absolute image root.
    #[must_use]
    pub fn images_root(&self) -> PathBuf {
        self.content_root.join(&self.images.root)
    }

    /// Absolute rewrite file path.
    #[must_use]
    pub fn rewrites_path(&self) -> PathBuf {
        self.content_root.join(&self.rewrites.path)
    }

    /// `host:port` listener address.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Sliding window of the rewrite table.
    #[must_use]
    pub const fn sliding_expiration(&self) -> Duration {
        Duration::from_secs(self.rewrites.sliding_expiration_secs)
    }

    /// Lifetime of cached derivatives.
    #[must_use]
    pub const fn cache_duration(&self) -> Duration {
        Duration::from_secs(self.cache.cache_duration_secs)
    }

    /// Sweep period, `None` when disabled.
    #[must_use]
    pub const fn sweep_interval(&self) -> Option<Duration> {
        if self.cache.sweep_interval_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.cache.sweep_interval_secs))
        }
    }

    /// Returns the platform config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            log_level: LogLevel::Info,
            content_root: default_content_root(),
            server: ServerConfig::default(),
            images: ImagesConfig::default(),
            rewrites: RewritesConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}
