use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
};

use actix_web::{
    body::EitherBody,
    cookie::{time, Cookie, SameSite},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
};
use futures::future::LocalBoxFuture;

use crate::{
    auth::TokenCodec,
    errors::{AppError, AppResult},
};

/// Identity resolved from a verified session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

impl AuthenticatedUser {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

pub fn resolve_session(codec: &TokenCodec, token: Option<&str>) -> AppResult<AuthenticatedUser> {
    let token = token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing session cookie".to_string()))?;

    let user_id = codec.verify(token)?;
    Ok(AuthenticatedUser { user_id })
}

/// Cookie handed to the client after login; lives exactly as long as the token.
pub fn session_cookie(name: &str, token: String, lifetime: chrono::Duration) -> Cookie<'static> {
    Cookie::build(name.to_string(), token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(lifetime.num_seconds()))
        .finish()
}

/// Rejects every request in the wrapped scope that does not carry a valid
/// session cookie, and exposes [`AuthenticatedUser`] to the handlers that do.
pub struct SessionMiddleware {
    codec: Arc<TokenCodec>,
    cookie_name: Rc<str>,
}

impl SessionMiddleware {
    pub fn new(codec: Arc<TokenCodec>, cookie_name: &str) -> Self {
        Self {
            codec,
            cookie_name: Rc::from(cookie_name),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service: Rc::new(service),
            codec: Arc::clone(&self.codec),
            cookie_name: Rc::clone(&self.cookie_name),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
    codec: Arc<TokenCodec>,
    cookie_name: Rc<str>,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = req
            .cookie(&self.cookie_name)
            .map(|cookie| cookie.value().to_string());

        match resolve_session(&self.codec, token.as_deref()) {
            Ok(user) => {
                req.extensions_mut().insert(user);

                let service = Rc::clone(&self.service);
                Box::pin(async move {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                })
            }
            Err(err) => {
                log::warn!("rejected session for {} {}: {}", req.method(), req.path(), err);

                let response = req
                    .into_response(err.error_response())
                    .map_into_right_body();
                Box::pin(async move { Ok(response) })
            }
        }
    }
}

// Extractor for authenticated user in handlers
impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let user = req
            .extensions()
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()));

        ready(user)
    }
}
