/// HTTP middleware utilities for yatube-service
///
/// Provides optional bearer-token identity, access control policies and
/// request metrics. Anonymous requests pass through the identity middleware
/// untouched; whether they may proceed is decided per resource by the
/// permission policies.
pub mod jwt;
pub mod permissions;

pub use jwt::{Claims, JwtVerifier};
pub use permissions::{AllowAny, IsAuthenticated, IsAuthorOrReadOnly, Owned, Permission};

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::time::Instant;

use crate::app_state::AppState;
use crate::error::{AppError, Result as AppResult};
use crate::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};
use crate::models::User;

// =====================================================================
// Identity
// =====================================================================

/// Acting identity of the request, `None` for anonymous callers.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    /// The identity, or 401 for anonymous callers.
    pub fn require(&self) -> AppResult<&User> {
        self.0.as_ref().ok_or(AppError::AuthenticationRequired)
    }
}

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = Ready<std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(Ok(CurrentUser(req.extensions().get::<User>().cloned())))
    }
}

/// Resolves `Authorization: Bearer <token>` into a [`User`] stored in the
/// request extensions. Requests without the header stay anonymous; a header
/// that cannot be verified is rejected with 401.
pub struct IdentityMiddleware;

impl<S, B> Transform<S, ServiceRequest> for IdentityMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = IdentityMiddlewareService<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(IdentityMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct IdentityMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for IdentityMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let token = match req.headers().get("Authorization") {
                None => None,
                Some(value) => {
                    let header = value
                        .to_str()
                        .map_err(|_| AppError::InvalidToken("malformed header".into()))?;
                    let token = header.strip_prefix("Bearer ").ok_or_else(|| {
                        AppError::InvalidToken("invalid Authorization scheme".into())
                    })?;
                    Some(token.trim().to_string())
                }
            };

            if let Some(token) = token {
                let state = req
                    .app_data::<web::Data<AppState>>()
                    .cloned()
                    .ok_or_else(|| AppError::Internal("application state missing".into()))?;

                let user = authenticate(&state, &token).await?;
                req.extensions_mut().insert(user);
            }

            service.call(req).await
        })
    }
}

async fn authenticate(state: &AppState, token: &str) -> AppResult<User> {
    let verifier = state.jwt.as_ref().ok_or_else(|| {
        tracing::warn!("bearer token received but no JWT public key is configured");
        AppError::InvalidToken("token verification unavailable".into())
    })?;

    let claims = verifier.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "bearer token rejected");
        AppError::InvalidToken("token is invalid or expired".into())
    })?;

    let user = claims
        .user()
        .map_err(|e| AppError::InvalidToken(e.to_string()))?;

    // Local mirror of identity-provider users backs username lookups and joins
    state.users.upsert(&user).await?;

    Ok(user)
}

// =====================================================================
// Metrics middleware
// =====================================================================

pub struct MetricsMiddleware;

impl<S, B> Transform<S, ServiceRequest> for MetricsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = MetricsMiddlewareService<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MetricsMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct MetricsMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for MetricsMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let start = Instant::now();

        Box::pin(async move {
            let res = service.call(req).await;
            let status = match &res {
                Ok(resp) => resp.status().as_u16(),
                Err(err) => err.as_response_error().status_code().as_u16(),
            };
            let elapsed = start.elapsed();
            let status_label = status.to_string();

            HTTP_REQUESTS_TOTAL
                .with_label_values(&[method.as_str(), status_label.as_str()])
                .inc();
            HTTP_REQUEST_DURATION_SECONDS
                .with_label_values(&[method.as_str()])
                .observe(elapsed.as_secs_f64());

            tracing::debug!(%method, %path, status, elapsed_ms = elapsed.as_millis() as u64, "request completed");
            res
        })
    }
}
