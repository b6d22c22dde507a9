use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use imagehub::application::{CacheAdminService, ImageResolutionService, PathResolver};
use imagehub::domain::ports::CacheInventory;
use imagehub::infrastructure::cache::{DerivativeCache, RewriteTableCache};
use imagehub::infrastructure::config::{AppConfig, CliArgs, ConfigStore};
use imagehub::infrastructure::image::{DirectoryCatalog, ImageStore, ImageTranscoder};
use imagehub::presentation::{AppState, serve};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    let file_layer = match &config.log_path {
        Some(log_path) => {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;

            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .init();

    if let Some(log_path) = &config.log_path {
        info!(path = %log_path.display(), "Logging initialized");
    }

    Ok(())
}

fn load_config() -> Result<AppConfig> {
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();

    let store = ConfigStore::new()?;
    let mut config = store.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    config.validate()?;

    Ok(config)
}

async fn build_state(config: &AppConfig) -> Result<Arc<AppState>> {
    let store = ImageStore::new(config.images_root(), &config.images.not_found);
    store.ensure_root().await?;

    let rewrites = Arc::new(RewriteTableCache::new(
        config.rewrites_path(),
        config.rewrites.legacy_prefix.clone(),
        config.sliding_expiration(),
    ));
    match rewrites.rebuild().await {
        Ok(table) => info!(count = table.len(), "Rewrite table warmed"),
        Err(e) => warn!(
            path = %rewrites.source().display(),
            error = %e,
            "Rewrite table not warmed, rebuilding on first request"
        ),
    }

    let derivatives = if config.cache.enable_cache {
        info!(
            ttl_secs = config.cache.cache_duration_secs,
            max_entries = ?config.cache.max_entries,
            "Derivative cache enabled"
        );
        Arc::new(DerivativeCache::new(
            config.cache_duration(),
            config.cache.max_entries,
        ))
    } else {
        info!("Derivative cache disabled");
        Arc::new(DerivativeCache::disabled())
    };

    let resolver = Arc::new(PathResolver::new(
        Arc::clone(&rewrites),
        store.clone(),
        config.images.schema_namespace.clone(),
    ));
    let images = Arc::new(
        ImageResolutionService::new(
            resolver,
            Arc::new(DirectoryCatalog::new(config.images_root())),
            Arc::new(ImageTranscoder::new()),
            Arc::clone(&derivatives),
            store,
        )
        .with_webp_conversion(config.images.convert_to_webp),
    );

    let admin = Arc::new(CacheAdminService::new(vec![
        Arc::clone(&rewrites) as Arc<dyn CacheInventory>,
        derivatives as Arc<dyn CacheInventory>,
    ]));
    if let Some(period) = config.sweep_interval() {
        Arc::clone(&admin).spawn_sweeper(period);
    }

    Ok(Arc::new(AppState {
        images,
        rewrites,
        admin,
        cache_settings: config.cache.clone(),
        max_upload_mb: config.images.max_upload_mb,
        default_folder: config.images.default_folder.clone(),
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = load_config()?;
    init_logging(&config)?;

    info!(
        version = imagehub::VERSION,
        config = ?config.config,
        images = %config.images_root().display(),
        "Starting {}",
        imagehub::NAME
    );

    let state = build_state(&config).await?;
    serve(state, &config.bind_address()).await?;

    info!("Server stopped");
    Ok(())
}
