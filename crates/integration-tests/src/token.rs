//! Session tokens for the authentication tests.

use jwt_compact::{AlgorithmExt, Claims, Header, TimeOptions, alg::Hs256, alg::Hs256Key};
use serde::Serialize;

#[derive(Debug, Default, Serialize)]
pub struct TestClaims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Signs an HS256 token valid for the given duration; negative durations yield expired tokens.
pub fn sign(secret: &str, claims: TestClaims, valid_for: chrono::Duration) -> String {
    let key = Hs256Key::new(secret.as_bytes());
    let claims = Claims::new(claims).set_duration_and_issuance(&TimeOptions::default(), valid_for);

    Hs256.token(&Header::empty(), &claims, &key).unwrap()
}

/// Token for the given subject, valid for an hour.
pub fn for_subject(secret: &str, subject: &str) -> String {
    let claims = TestClaims {
        sub: Some(subject.to_string()),
        iss: None,
    };

    sign(secret, claims, chrono::Duration::hours(1))
}
