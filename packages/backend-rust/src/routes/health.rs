use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;
use crate::store::StoreKind;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/info", get(info))
        .route("/live", get(live))
        .route("/database", get(database))
}

enum DbCheckStatus {
    /// Memory store in use, nothing to probe
    NotConfigured,
    Connected { latency_ms: Option<u64> },
    Timeout,
    Disconnected,
}

impl DbCheckStatus {
    fn label(&self) -> &'static str {
        match self {
            DbCheckStatus::NotConfigured => "memory",
            DbCheckStatus::Connected { .. } => "connected",
            DbCheckStatus::Timeout => "timeout",
            DbCheckStatus::Disconnected => "disconnected",
        }
    }

    fn is_ok(&self) -> bool {
        matches!(
            self,
            DbCheckStatus::NotConfigured | DbCheckStatus::Connected { .. }
        )
    }
}

async fn database_check(state: &AppState) -> DbCheckStatus {
    if state.store_kind() == StoreKind::Memory {
        return DbCheckStatus::NotConfigured;
    }
    let Some(proxy) = state.db_proxy() else {
        return DbCheckStatus::Disconnected;
    };

    let result = proxy.check_health().await;
    if result.healthy {
        return DbCheckStatus::Connected {
            latency_ms: result.latency_ms,
        };
    }
    if result.error.as_deref() == Some("timeout") {
        return DbCheckStatus::Timeout;
    }
    DbCheckStatus::Disconnected
}

async fn root(State(state): State<AppState>) -> Response {
    let db_status = database_check(&state).await;
    let ok = db_status.is_ok();

    let response = HealthResponse {
        database: db_status.label(),
        store: state.store_kind().as_str(),
        timestamp: now_iso(),
        status: if ok { "ok" } else { "degraded" },
    };

    let status_code = if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(response)).into_response()
}

async fn info(State(state): State<AppState>) -> Response {
    let affinity = state.affinity();
    let response = HealthInfoResponse {
        service: "affinity-backend",
        version: env!("CARGO_PKG_VERSION"),
        start_time: system_time_iso(state.started_at_system()),
        uptime: state.uptime_seconds(),
        domains: affinity.domain_index().domains().to_vec(),
    };

    Json(response).into_response()
}

async fn live(State(state): State<AppState>) -> Response {
    Json(LivenessResponse {
        status: "healthy",
        timestamp: now_iso(),
        uptime: state.uptime_seconds(),
    })
    .into_response()
}

async fn database(State(state): State<AppState>) -> Response {
    let db_status = database_check(&state).await;
    let latency_ms = match db_status {
        DbCheckStatus::Connected { latency_ms } => latency_ms,
        _ => None,
    };

    let status_code = if db_status.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(DatabaseResponse {
            status: db_status.label(),
            latency_ms,
            timestamp: now_iso(),
        }),
    )
        .into_response()
}

fn system_time_iso(time: std::time::SystemTime) -> String {
    let datetime: chrono::DateTime<chrono::Utc> = time.into();
    datetime.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[derive(Serialize)]
struct HealthResponse {
    database: &'static str,
    store: &'static str,
    timestamp: String,
    status: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthInfoResponse {
    service: &'static str,
    version: &'static str,
    start_time: String,
    uptime: u64,
    domains: Vec<String>,
}

#[derive(Serialize)]
struct LivenessResponse {
    status: &'static str,
    timestamp: String,
    uptime: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DatabaseResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
    timestamp: String,
}
