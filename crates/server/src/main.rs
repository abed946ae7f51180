//! yatube-rs server entry point.

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, extract::DefaultBodyLimit};
use fred::prelude::*;
use tokio::signal;
use tower_http::{
    compression::CompressionLayer, limit::RequestBodyLimitLayer, services::ServeDir,
    timeout::TimeoutLayer, trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use yatube_api::AppState;
use yatube_common::{Config, InMemoryPageCache, LocalStorage, RedisPageCache, SharedPageCache};
use yatube_core::{
    CommentService, FollowingService, GroupService, MediaService, PostService, UserService,
};
use yatube_db::repositories::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};

/// Slack on top of the image size limit for the rest of the post form.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "yatube=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Redis when configured, otherwise an in-process cache swept once a minute.
async fn build_page_cache(config: &Config) -> anyhow::Result<SharedPageCache> {
    if let Some(url) = &config.cache.redis_url {
        info!("Connecting to Redis page cache...");
        let fred_config = fred::types::config::Config::from_url(url)?;
        let client = fred::clients::Client::new(fred_config, None, None, None);
        client.connect();
        client.wait_for_connect().await?;
        info!("Connected to Redis page cache");

        return Ok(Arc::new(RedisPageCache::new(
            Arc::new(client),
            config.cache.prefix.clone(),
        )));
    }

    let cache = Arc::new(InMemoryPageCache::new());
    let sweeper = Arc::clone(&cache);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            sweeper.purge_expired().await;
        }
    });
    info!("Using in-memory page cache");

    Ok(cache)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    init_tracing(&config);

    info!("Starting yatube-rs server...");

    let db = yatube_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    yatube_db::migrate(&db).await?;
    info!("Migrations completed");

    let page_cache = build_page_cache(&config).await?;

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let group_repo = GroupRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let follow_repo = FollowRepository::new(Arc::clone(&db));

    // Initialize services
    let storage = Arc::new(LocalStorage::from_settings(&config.storage));
    let media = MediaService::new(storage, config.storage.max_upload_bytes);

    let post_service = PostService::new(
        post_repo.clone(),
        user_repo.clone(),
        group_repo.clone(),
        media,
    );
    let following_service =
        FollowingService::new(follow_repo, post_repo.clone(), post_service.clone());
    let comment_service = CommentService::new(comment_repo, post_repo, user_repo.clone());
    let user_service = UserService::new(user_repo);
    let group_service = GroupService::new(group_repo);

    let state = AppState {
        user_service,
        post_service,
        comment_service,
        group_service,
        following_service,
        page_cache,
        index_ttl: Duration::from_secs(config.cache.index_ttl_secs),
        secure_cookies: config.server.secure_cookies,
    };

    // Build router
    // Uploaded images are served here unless they live on another host.
    let mut app = Router::new();
    let media_mount = config.storage.base_url.trim_end_matches('/');
    if media_mount.starts_with('/') {
        app = app.nest_service(media_mount, ServeDir::new(&config.storage.base_path));
    }
    let app = app
        .merge(yatube_api::router(state))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(
            config.storage.max_upload_bytes + FORM_OVERHEAD_BYTES,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http());

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
