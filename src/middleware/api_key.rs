use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    Error, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::sync::Arc;

use crate::config::{AppConfig, TIER_ADMIN, TIER_NONE};

pub const API_KEY_HEADER: &str = "api_key";

pub const NO_ACCESS_MESSAGE: &str =
    "Authorization failed. Your api_key is missing from header or invalid on the backend.";
pub const READ_ONLY_MESSAGE: &str =
    "Authorization failed. Your api_key only allows for read operations on the database.";

/// Gates a scope by the access tier of the `api_key` header: tier 0 may
/// read and write, tier 1 may only read, anything else is rejected.
pub struct ApiKeyAuth {
    config: Arc<AppConfig>,
}

impl ApiKeyAuth {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self { config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ApiKeyAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyAuthService {
            service,
            config: self.config.clone(),
        }))
    }
}

pub struct ApiKeyAuthService<S> {
    service: S,
    config: Arc<AppConfig>,
}

/// Message for a rejected request, `None` when the tier allows the method
fn rejection(tier: u8, method: &Method) -> Option<&'static str> {
    if tier >= TIER_NONE {
        return Some(NO_ACCESS_MESSAGE);
    }
    let read_only = method == Method::GET || method == Method::HEAD;
    if !read_only && tier != TIER_ADMIN {
        return Some(READ_ONLY_MESSAGE);
    }
    None
}

impl<S, B> Service<ServiceRequest> for ApiKeyAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let api_key = req
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok());
        let tier = self.config.access_tier(api_key);

        if let Some(message) = rejection(tier, req.method()) {
            log::warn!("🔒 {} {} rejected (tier {})", req.method(), req.path(), tier);
            let response = HttpResponse::Forbidden().body(message);
            let res = req.into_response(response).map_into_right_body();
            return Box::pin(async move { Ok(res) });
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TIER_READ_ONLY;

    #[test]
    fn test_rejection_rules() {
        assert_eq!(rejection(TIER_ADMIN, &Method::DELETE), None);
        assert_eq!(rejection(TIER_ADMIN, &Method::GET), None);
        assert_eq!(rejection(TIER_READ_ONLY, &Method::GET), None);
        assert_eq!(rejection(TIER_READ_ONLY, &Method::POST), Some(READ_ONLY_MESSAGE));
        assert_eq!(rejection(TIER_READ_ONLY, &Method::PUT), Some(READ_ONLY_MESSAGE));
        assert_eq!(rejection(TIER_NONE, &Method::GET), Some(NO_ACCESS_MESSAGE));
        assert_eq!(rejection(7, &Method::DELETE), Some(NO_ACCESS_MESSAGE));
    }
}
