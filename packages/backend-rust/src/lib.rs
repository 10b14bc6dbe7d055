pub mod config;
pub mod db;
pub mod logging;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod workers;

use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::DatabaseProxy;
use crate::services::AffinityService;
use crate::state::AppState;
use crate::store::Stores;

/// Picks the Postgres store when a database is reachable, the memory store otherwise.
pub async fn connect_stores() -> (Stores, Option<Arc<DatabaseProxy>>) {
    if std::env::var("DATABASE_URL").map_or(true, |v| v.trim().is_empty()) {
        tracing::info!("DATABASE_URL not set, using in-memory store");
        return (Stores::memory(), None);
    }

    match DatabaseProxy::from_env().await {
        Ok(proxy) => (Stores::postgres(Arc::clone(&proxy)), Some(proxy)),
        Err(err) => {
            tracing::warn!(error = %err, "database proxy not initialized, using in-memory store");
            (Stores::memory(), None)
        }
    }
}

pub fn build_app(state: AppState) -> axum::Router {
    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub fn create_app_with(
    affinity: AffinityService,
    db_proxy: Option<Arc<DatabaseProxy>>,
) -> axum::Router {
    build_app(AppState::new(affinity, db_proxy))
}
