//! Seed Authority Server Binary
//!
//! Runs the seed authority HTTP server with file-backed key material and
//! object storage.

use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use seedgate_authority::{
    create_router, AllowlistLoader, AllowlistSource, AppState, AuthorityConfig, CachedAllowlist,
    FsObjectStore, LocalIdentity, QuerySignedUrls, ServerSettings, SystemClock,
};

#[tokio::main]
async fn main() {
    let settings = ServerSettings::from_env().expect("Invalid server settings");

    // Initialize logging
    let log_level = settings.log_level.parse().unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let config = AuthorityConfig::from_env().expect("Invalid authority configuration");

    // Signing identity
    let mut identity = LocalIdentity::load(
        settings.key_name.clone(),
        &settings.signing_key_path,
        &settings.certificate_path,
    )
    .expect("Failed to load signing key material");
    if let Some(account) = &settings.service_account {
        identity = identity.with_service_account(account.clone());
    }
    let identity = Arc::new(identity);

    // Allowlist storage
    let store = Arc::new(FsObjectStore::new(settings.object_root.clone()));
    let loader: Arc<dyn AllowlistSource> = Arc::new(AllowlistLoader::new(store));
    let allowlist: Arc<dyn AllowlistSource> = match settings.allowlist_cache_ttl {
        Some(ttl) => Arc::new(CachedAllowlist::new(loader, ttl)),
        None => loader,
    };

    let platform = Arc::new(
        QuerySignedUrls::new(&settings.signed_url_base).expect("Invalid SEEDGATE_SIGNED_URL_BASE"),
    );

    info!(
        key_name = %settings.key_name,
        bucket = ?config.bucket,
        policy = ?config.policy,
        port = settings.port,
        "Starting seed authority"
    );

    let state = Arc::new(AppState::new(
        config,
        allowlist,
        identity,
        platform,
        Arc::new(SystemClock),
    ));

    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", settings.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    info!(addr = %addr, "Seed authority listening");

    axum::serve(listener, app).await.expect("Server error");
}
