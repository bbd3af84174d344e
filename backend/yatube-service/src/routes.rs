//! Route configuration
//!
//! Resources live under `/api/v1`, behind the identity middleware. Every
//! resource answers HEAD like GET, answers OPTIONS with its `Allow` list and
//! answers unsupported verbs with 405; unknown paths under the scope answer
//! 404.

use actix_web::http::{header, Method};
use actix_web::{web, HttpResponse, Route};

use crate::error::{AppError, NON_FIELD_ERRORS};
use crate::handlers;
use crate::metrics;
use crate::middleware::IdentityMiddleware;

/// Configure all routes for the application
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        // Non-numeric ids can never match a row
        web::PathConfig::default()
            .error_handler(|_, req| AppError::NotFound(req.path().to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::field(NON_FIELD_ERRORS, err.to_string()).into()),
    )
    .route("/metrics", web::get().to(metrics::serve_metrics))
    .service(
        web::scope("/api/v1")
            .wrap(IdentityMiddleware)
            .route("/health", web::get().to(handlers::health_check))
            .route("/health/live", web::get().to(handlers::liveness_check))
            .configure(configure_posts)
            .configure(configure_comments)
            .configure(configure_groups)
            .configure(configure_follows)
            .default_service(web::to(handlers::not_found)),
    );
}

fn configure_posts(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/posts/")
            .route(web::get().to(handlers::list_posts))
            .route(web::head().to(handlers::list_posts))
            .route(options("GET, POST, HEAD, OPTIONS"))
            .route(web::post().to(handlers::create_post))
            .default_service(web::to(handlers::method_not_allowed)),
    )
    .service(
        web::resource("/posts/{id}/")
            .route(web::get().to(handlers::get_post))
            .route(web::head().to(handlers::get_post))
            .route(options("GET, PUT, PATCH, DELETE, HEAD, OPTIONS"))
            .route(web::put().to(handlers::update_post))
            .route(web::patch().to(handlers::update_post))
            .route(web::delete().to(handlers::delete_post))
            .default_service(web::to(handlers::method_not_allowed)),
    );
}

fn configure_comments(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/posts/{post_id}/comments/")
            .route(web::get().to(handlers::list_comments))
            .route(web::head().to(handlers::list_comments))
            .route(options("GET, POST, HEAD, OPTIONS"))
            .route(web::post().to(handlers::create_comment))
            .default_service(web::to(handlers::method_not_allowed)),
    )
    .service(
        web::resource("/posts/{post_id}/comments/{id}/")
            .route(web::get().to(handlers::get_comment))
            .route(web::head().to(handlers::get_comment))
            .route(options("GET, PUT, PATCH, DELETE, HEAD, OPTIONS"))
            .route(web::put().to(handlers::update_comment))
            .route(web::patch().to(handlers::update_comment))
            .route(web::delete().to(handlers::delete_comment))
            .default_service(web::to(handlers::method_not_allowed)),
    );
}

fn configure_groups(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/groups/")
            .route(web::get().to(handlers::list_groups))
            .route(web::head().to(handlers::list_groups))
            .route(options("GET, HEAD, OPTIONS"))
            .default_service(web::to(handlers::method_not_allowed)),
    )
    .service(
        web::resource("/groups/{id}/")
            .route(web::get().to(handlers::get_group))
            .route(web::head().to(handlers::get_group))
            .route(options("GET, HEAD, OPTIONS"))
            .default_service(web::to(handlers::method_not_allowed)),
    );
}

fn configure_follows(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/follow/")
            .route(web::get().to(handlers::list_follows))
            .route(web::head().to(handlers::list_follows))
            .route(options("GET, POST, HEAD, OPTIONS"))
            .route(web::post().to(handlers::create_follow))
            .default_service(web::to(handlers::method_not_allowed)),
    );
}

/// OPTIONS answer listing the verbs a resource accepts.
fn options(allow: &'static str) -> Route {
    web::route().method(Method::OPTIONS).to(move || async move {
        HttpResponse::Ok()
            .insert_header((header::ALLOW, allow))
            .finish()
    })
}
