//! Runtime authentication context.
//!
//! Inserted into request extensions by the server's auth layer, as opposed to
//! [`crate::AuthConfig`] which specifies how callers are authenticated.

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Subject claim of the verified token.
    pub subject: Option<String>,
    /// Issuer claim of the verified token.
    pub issuer: Option<String>,
}

impl AuthContext {
    /// A printable name for logging.
    pub fn display_name(&self) -> &str {
        self.subject.as_deref().unwrap_or("<no subject>")
    }
}
