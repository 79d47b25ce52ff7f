//! # StyleSync Binary
//!
//! The entry point that assembles the application based on compile-time features.

use actix_web::{web, App, HttpServer};
use ss_api::random::ThreadRandom;
use ss_api::{configure_routes, middleware, FacadeOptions, Ports, StyleSync};
use ss_config::Settings;
use ss_core::traits::{AuthProvider, LocalStore, ObjectStore, RowStore};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

// Feature-gated imports: each port is compiled to order
#[cfg(feature = "backend-rest")]
use ss_backend_rest::RestBackend;

#[cfg(feature = "local-sqlite")]
use ss_local_sqlite::SqliteLocalStore;

#[cfg(feature = "storage-local")]
use ss_storage_local::LocalObjectStore;

#[cfg(feature = "auth-simple")]
use ss_auth_simple::SimpleAuthProvider;

#[cfg(not(any(feature = "backend-rest", feature = "auth-simple")))]
compile_error!("enable `backend-rest` or `auth-simple` so sessions can be resolved");

fn init_logging(settings: &Settings) {
    // RUST_LOG wins over the configured filter.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if settings.log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Creates the directory holding a file-backed SQLite database.
#[cfg(feature = "local-sqlite")]
fn ensure_database_dir(url: &str) -> std::io::Result<()> {
    let path = url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
    if path.starts_with(':') {
        return Ok(());
    }
    match std::path::Path::new(path.split('?').next().unwrap_or(path)).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

/// Offline row store: the demo categories plus the configured buckets.
#[cfg(not(feature = "backend-rest"))]
fn memory_backend(settings: &Settings) -> anyhow::Result<Arc<ss_backend_memory::MemoryBackend>> {
    let backend = ss_backend_memory::MemoryBackend::with_buckets(&[settings.storage.items_bucket.as_str(), settings.storage.avatars_bucket.as_str()]);
    let categories = ss_api::mock::categories(chrono::Utc::now())
        .into_iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    backend.seed(ss_core::query::Table::Categories, categories);
    Ok(Arc::new(backend))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    init_logging(&settings);

    // 1. Rows (and, unless overridden below, objects and auth)
    #[cfg(feature = "backend-rest")]
    let remote = {
        let (url, key) = settings.require_backend()?;
        info!(url, "Using hosted backend");
        Arc::new(RestBackend::new(url, key.clone()))
    };
    #[cfg(not(feature = "backend-rest"))]
    let remote = {
        info!("No hosted backend compiled in, using the in-memory store");
        memory_backend(&settings)?
    };
    let rows: Arc<dyn RowStore> = remote.clone();

    // 2. Object storage
    #[cfg(feature = "storage-local")]
    let local_objects = {
        let store = LocalObjectStore::new(settings.storage.root.clone().into(), settings.storage.url_prefix.clone());
        for bucket in [&settings.storage.items_bucket, &settings.storage.avatars_bucket] {
            store.create_bucket(bucket).await?;
        }
        Arc::new(store)
    };
    #[cfg(feature = "storage-local")]
    let objects: Arc<dyn ObjectStore> = local_objects;
    #[cfg(not(feature = "storage-local"))]
    let objects: Arc<dyn ObjectStore> = remote.clone();

    // 3. Auth
    #[cfg(feature = "auth-simple")]
    let auth: Arc<dyn AuthProvider> =
        Arc::new(SimpleAuthProvider::new(chrono::Duration::hours(settings.auth.session_ttl_hours)));
    #[cfg(all(feature = "backend-rest", not(feature = "auth-simple")))]
    let auth: Arc<dyn AuthProvider> = remote.clone();

    // 4. Local fallback cache
    #[cfg(feature = "local-sqlite")]
    let local: Arc<dyn LocalStore> = {
        ensure_database_dir(&settings.local.database_url)?;
        Arc::new(SqliteLocalStore::connect(&settings.local.database_url).await?)
    };
    #[cfg(not(feature = "local-sqlite"))]
    let local: Arc<dyn LocalStore> = Arc::new(ss_backend_memory::MemoryLocalStore::new());

    let options = FacadeOptions {
        items_bucket: settings.storage.items_bucket.clone(),
        avatars_bucket: settings.storage.avatars_bucket.clone(),
        mock_data: settings.fallback.mock_data,
    };
    let state = web::Data::new(StyleSync::new(
        Ports { rows, objects, auth, local, random: Arc::new(ThreadRandom) },
        options,
    ));

    let (host, port) = (settings.server.host.clone(), settings.server.port);
    info!("StyleSync starting on http://{host}:{port}");

    #[cfg(feature = "storage-local")]
    let (storage_root, storage_prefix) = (settings.storage.root.clone(), settings.storage.url_prefix.clone());

    HttpServer::new(move || {
        let app = App::new()
            .wrap(middleware::standard_middleware())
            .wrap(middleware::cors_policy())
            .app_data(state.clone())
            .configure(configure_routes);
        #[cfg(feature = "storage-local")]
        let app = app.service(actix_files::Files::new(&storage_prefix, &storage_root));
        app
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;
    Ok(())
}
