use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

use crate::services::auth_service;
use crate::utils::error::AppError;

/// JWT gate for protected routes: extracts the bearer token, verifies it
/// through the token layer and attaches the decoded claims to the request.
/// Trusts the token alone; no database lookup happens here.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let header = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let bearer = match header {
            Some(value) => value,
            None => {
                return Box::pin(async move {
                    Err(AppError::Authentication("Authentication required".to_string()).into())
                });
            }
        };

        let token = match bearer.strip_prefix("Bearer ") {
            Some(token) => token,
            None => {
                return Box::pin(async move {
                    Err(AppError::Authentication("Invalid token".to_string()).into())
                });
            }
        };

        match auth_service::verify_token(token) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res)
                })
            }
            Err(_) => Box::pin(async move {
                Err(AppError::Authentication("Invalid token".to_string()).into())
            }),
        }
    }
}
