use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yatube_service::config::{Config, StoreBackend};
use yatube_service::db::{self, MemoryStore};
use yatube_service::middleware::{JwtVerifier, MetricsMiddleware};
use yatube_service::pagination::Paginator;
use yatube_service::routes::configure_routes;
use yatube_service::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(anyhow::Error::msg)?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    if config.app.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting yatube-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(env = %config.app.env, store = ?config.store, "Configuration loaded");

    let jwt = match config.auth.jwt_public_key_pem.as_deref() {
        Some(pem) => Some(Arc::new(
            JwtVerifier::from_rsa_pem(pem).context("Failed to initialize JWT verifier")?,
        )),
        None => {
            tracing::warn!("JWT public key not configured; every bearer token will be rejected");
            None
        }
    };

    let paginator = Paginator::from(config.pagination);

    let state = match config.store.backend {
        StoreBackend::Postgres => {
            let pool = db::create_pool(&config.store)
                .await
                .context("Failed to connect to database")?;
            if config.store.run_migrations {
                db::run_migrations(&pool)
                    .await
                    .context("Failed to run migrations")?;
                tracing::info!("Database migrations applied");
            }
            AppState::postgres(pool, jwt, paginator)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on shutdown");
            AppState::in_memory(Arc::new(MemoryStore::new()), jwt, paginator)
        }
    };

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server on {}", bind_address);

    let state = web::Data::new(state);
    let allowed_origins = config.cors.allowed_origins.clone();

    HttpServer::new(move || {
        // Build CORS configuration
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin.is_empty() {
                continue;
            }
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(MetricsMiddleware)
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(configure_routes)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await
    .context("HTTP server failed")?;

    tracing::info!("yatube-service shut down");
    Ok(())
}
