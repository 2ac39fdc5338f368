mod claims;
mod error;
mod jwt;

use std::{
    fmt::Display,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::body::Body;
use config::AuthConfig;
use error::AuthError;
use http::{
    HeaderValue, Request, Response, StatusCode,
    header::{CONTENT_TYPE, WWW_AUTHENTICATE},
};
use jwt::JwtAuth;
use serde::Serialize;

use tower::Layer;

type AuthResult<T> = Result<T, AuthError>;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_description: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            error_description: None,
        }
    }

    fn with_description(error: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            error_description: Some(description.into()),
        }
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"error":"internal_error"}"#.to_string())
    }
}

impl From<AuthError> for ErrorResponse {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Unauthorized => ErrorResponse::new("unauthorized"),
            AuthError::InvalidToken(msg) => ErrorResponse::with_description("invalid_token", msg),
        }
    }
}

/// Rejects requests without a valid HS256 token and exposes the caller as
/// [`config::AuthContext`] to the handlers.
#[derive(Clone)]
pub struct AuthLayer(Arc<AuthLayerInner>);

struct AuthLayerInner {
    jwt: JwtAuth,
}

impl AuthLayer {
    pub fn new(config: &AuthConfig) -> Self {
        let jwt = JwtAuth::new(config);
        Self(Arc::new(AuthLayerInner { jwt }))
    }
}

impl<Service> Layer<Service> for AuthLayer
where
    Service: Send + Clone,
{
    type Service = AuthService<Service>;

    fn layer(&self, next: Service) -> Self::Service {
        AuthService {
            next,
            layer: self.0.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthService<Service> {
    next: Service,
    layer: Arc<AuthLayerInner>,
}

impl<Service, ReqBody> tower::Service<Request<ReqBody>> for AuthService<Service>
where
    Service: tower::Service<Request<ReqBody>, Response = Response<Body>> + Send + Clone + 'static,
    Service::Future: Send,
    Service::Error: Display + 'static,
    ReqBody: http_body::Body + Send + 'static,
{
    type Response = http::Response<Body>;
    type Error = Service::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response<Body>, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.next.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let mut next = self.next.clone();
        let layer = self.layer.clone();

        let (mut parts, body) = req.into_parts();

        Box::pin(async move {
            match layer.jwt.authenticate(&parts) {
                Ok(context) => {
                    log::debug!("Authenticated request from {}", context.display_name());

                    parts.extensions.insert(context);
                    next.call(Request::from_parts(parts, body)).await
                }
                Err(auth_error) => {
                    log::debug!("Rejecting unauthenticated request to {}: {auth_error}", parts.uri.path());

                    let error_response = ErrorResponse::from(auth_error);

                    let mut response = Response::new(Body::from(error_response.to_json()));
                    *response.status_mut() = StatusCode::UNAUTHORIZED;

                    let headers = response.headers_mut();
                    headers.insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

                    Ok(response)
                }
            }
        })
    }
}
