use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments, each also readable from the environment.
#[derive(Debug, Parser)]
#[command(
    name = "imagehub",
    version,
    about = "Image server with legacy rewrites, derivatives and WebP conversion",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", env = "IMAGEHUB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory relative paths resolve against.
    #[arg(long, value_name = "DIR", env = "IMAGEHUB_CONTENT_ROOT")]
    pub content_root: Option<PathBuf>,

    /// Bind address.
    #[arg(long, env = "IMAGEHUB_HOST")]
    pub host: Option<String>,

    /// Bind port.
    #[arg(short, long, env = "IMAGEHUB_PORT")]
    pub port: Option<u16>,

    /// Log file path.
    #[arg(long, value_name = "PATH", env = "IMAGEHUB_LOG_PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, env = "IMAGEHUB_LOG_LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Enable the derivative cache.
    #[arg(long, env = "IMAGEHUB_ENABLE_CACHE")]
    pub enable_cache: Option<bool>,

    /// Convert served JPEGs to WebP.
    #[arg(long, env = "IMAGEHUB_CONVERT_TO_WEBP")]
    pub convert_to_webp: Option<bool>,
}
