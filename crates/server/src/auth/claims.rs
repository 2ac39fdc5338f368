use serde::{Deserialize, Serialize};

/// Claims read from canvas session tokens, next to the registered time claims.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CanvasClaims {
    /// Subject claim - identifies the user the token was issued to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Issuer claim - identifies the principal that issued the JWT
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}
