use std::rc::Rc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::PgPool;

use crate::auth::token::verify_token;
use crate::error::AppError;

/// Bearer-token authentication for everything under `/api`.
///
/// A request passes if its JWT verifies *and* matches the token currently
/// recorded for the account in `auth_tokens`. The second check is what makes
/// tokens revocable: a password reset deletes the row and every outstanding
/// JWT for that account stops working, and a re-login replaces the row.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    // Rc because the token check awaits a database query, so the call future
    // must own a handle to the inner service.
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Skip authentication for health check, auth endpoints and the
        // password-reset flow (its whole point is a user without a session).
        let path = req.path();
        if path == "/health"
            || path.starts_with("/api/auth/login")
            || path.starts_with("/api/auth/register")
            || path.starts_with("/api/password/")
        {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let token = req
                .headers()
                .get("Authorization")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::to_owned)
                .ok_or_else(|| AppError::Unauthorized("Missing token".into()))?;

            let claims = verify_token(&token)?;

            let pool = req
                .app_data::<web::Data<PgPool>>()
                .cloned()
                .ok_or_else(|| {
                    AppError::InternalServerError("Database pool not configured".into())
                })?;

            let recorded: Option<(String,)> =
                sqlx::query_as("SELECT token FROM auth_tokens WHERE user_id = $1")
                    .bind(claims.sub)
                    .fetch_optional(pool.get_ref())
                    .await
                    .map_err(AppError::from)?;

            match recorded {
                Some((recorded_token,)) if recorded_token == token => {}
                _ => return Err(AppError::Unauthorized("Token has been revoked".into()).into()),
            }

            req.extensions_mut().insert(claims.sub);
            req.extensions_mut().insert(claims);

            service.call(req).await
        })
    }
}
