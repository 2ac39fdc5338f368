use config::{AuthConfig, AuthContext};
use http::{
    header::{AUTHORIZATION, COOKIE},
    request::Parts,
};
use jwt_compact::{
    AlgorithmExt, TimeOptions, UntrustedToken,
    alg::{Hs256, Hs256Key},
};
use secrecy::ExposeSecret;

use super::{AuthResult, claims::CanvasClaims, error::AuthError};

const BEARER_TOKEN_LENGTH: usize = 6;

pub struct JwtAuth {
    key: Hs256Key,
    issuer: Option<String>,
    cookie_name: String,
}

impl JwtAuth {
    pub fn new(config: &AuthConfig) -> Self {
        JwtAuth {
            key: Hs256Key::new(config.secret.expose_secret().as_bytes()),
            issuer: config.issuer.clone(),
            cookie_name: config.cookie_name.to_string(),
        }
    }

    /// Verifies the token of the request, read from the Authorization header or
    /// else from the session cookie.
    pub fn authenticate(&self, parts: &Parts) -> AuthResult<AuthContext> {
        let token_str = match parts.headers.get(AUTHORIZATION) {
            Some(header) => bearer_token(header.to_str().map_err(|_| AuthError::InvalidToken("invalid token"))?)?,
            None => self.cookie_token(parts).ok_or(AuthError::InvalidToken("missing token"))?,
        };

        let token = UntrustedToken::new(token_str).map_err(|_| AuthError::InvalidToken("invalid token"))?;

        if token.algorithm() != "HS256" {
            return Err(AuthError::InvalidToken("unsupported algorithm"));
        }

        let token = Hs256
            .validator::<CanvasClaims>(&self.key)
            .validate(&token)
            .map_err(|e| {
                log::debug!("Token rejected: {e}");
                AuthError::Unauthorized
            })?;

        let claims = token.claims();
        let time_options = TimeOptions::default();

        // Tokens without an expiration claim never expire.
        if claims.expiration.is_some() && claims.validate_expiration(&time_options).is_err() {
            return Err(AuthError::InvalidToken("token expired"));
        }

        if claims.not_before.is_some() && claims.validate_maturity(&time_options).is_err() {
            return Err(AuthError::InvalidToken("token not yet valid"));
        }

        if !self.validate_issuer(&claims.custom) {
            return Err(AuthError::Unauthorized);
        }

        Ok(AuthContext {
            subject: claims.custom.sub.clone(),
            issuer: claims.custom.iss.clone(),
        })
    }

    fn cookie_token<'a>(&self, parts: &'a Parts) -> Option<&'a str> {
        parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .map(|(_, value)| value.trim_matches('"'))
            .filter(|value| !value.is_empty())
    }

    fn validate_issuer(&self, claims: &CanvasClaims) -> bool {
        let Some(expected_issuer) = &self.issuer else {
            return true;
        };

        match claims.iss.as_deref() {
            Some(issuer) if issuer == expected_issuer => true,
            Some(_) => {
                log::debug!("Token rejected: invalid issuer");
                false
            }
            None => {
                log::debug!("Token rejected: missing issuer claim");
                false
            }
        }
    }
}

/// RFC 7235: the authentication scheme is case-insensitive.
fn bearer_token(header: &str) -> AuthResult<&str> {
    let scheme = header.get(..BEARER_TOKEN_LENGTH);

    if scheme.is_some_and(|scheme| scheme.eq_ignore_ascii_case("bearer"))
        && header.as_bytes().get(BEARER_TOKEN_LENGTH) == Some(&b' ')
    {
        let token = header[BEARER_TOKEN_LENGTH + 1..].trim();

        if token.is_empty() {
            return Err(AuthError::InvalidToken("missing token"));
        }

        Ok(token)
    } else if header.eq_ignore_ascii_case("bearer") {
        Err(AuthError::InvalidToken("missing token"))
    } else {
        Err(AuthError::InvalidToken("token must be prefixed with Bearer"))
    }
}
