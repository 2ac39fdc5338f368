//! Hardening headers added to every response.

use axum::Router;
use http::{
    HeaderValue,
    header::{REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS},
};
use tower_http::set_header::SetResponseHeaderLayer;

pub(super) fn inject_headers(app: Router) -> Router {
    // Handlers setting one of these themselves keep their value.
    app.layer(SetResponseHeaderLayer::if_not_present(
        X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    ))
    .layer(SetResponseHeaderLayer::if_not_present(
        X_FRAME_OPTIONS,
        HeaderValue::from_static("SAMEORIGIN"),
    ))
    .layer(SetResponseHeaderLayer::if_not_present(
        REFERRER_POLICY,
        HeaderValue::from_static("no-referrer"),
    ))
}
