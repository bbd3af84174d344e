use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;

use crate::app_state::AppState;
use crate::db;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    store: &'static str,
}

/// Readiness: pings the database when the PostgreSQL backend is in use
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store = match &state.db {
        Some(pool) => match db::ping(pool).await {
            Ok(()) => "healthy",
            Err(e) => {
                tracing::warn!(error = %e, "database ping failed");
                "unhealthy"
            }
        },
        None => "memory",
    };

    let body = HealthResponse {
        status: if store == "unhealthy" { "degraded" } else { "ok" },
        version: env!("CARGO_PKG_VERSION"),
        store,
    };

    if store == "unhealthy" {
        HttpResponse::ServiceUnavailable().json(body)
    } else {
        HttpResponse::Ok().json(body)
    }
}

/// Liveness: the process is up
pub async fn liveness_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "alive" }))
}
