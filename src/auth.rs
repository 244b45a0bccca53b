//! Bearer credential handed to the core by the session manager
//!
//! The core never stores or refreshes credentials. The composition root builds
//! an `AuthContext` once (from the CLI, the environment or a token file) and
//! passes it explicitly into every gateway call.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::ClientError;

pub const TOKEN_ENV_VAR: &str = "TUNESTREAM_TOKEN";

/// Opaque bearer credential
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Blank tokens are treated as absent
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

#[derive(Clone, Debug, Default)]
pub struct AuthContext {
    token: Option<AuthToken>,
}

impl AuthContext {
    pub fn signed_in(token: AuthToken) -> Self {
        Self { token: Some(token) }
    }

    pub fn anonymous() -> Self {
        Self { token: None }
    }

    pub fn from_raw(raw: Option<String>) -> Self {
        Self {
            token: raw.and_then(AuthToken::new),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }

    /// The token, or `AuthenticationRequired` when signed out
    pub fn require(&self) -> Result<&AuthToken, ClientError> {
        self.token.as_ref().ok_or(ClientError::AuthenticationRequired)
    }
}

/// Resolve the credential: explicit value, then token file, then environment
pub fn resolve_auth(explicit: Option<String>, token_file: Option<&Path>) -> Result<AuthContext> {
    if let Some(token) = explicit.and_then(AuthToken::new) {
        tracing::debug!("Using token passed on the command line");
        return Ok(AuthContext::signed_in(token));
    }

    if let Some(path) = token_file {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read token file {}", path.display()))?;
        if let Some(token) = AuthToken::new(raw) {
            tracing::debug!(path = %path.display(), "Using token from file");
            return Ok(AuthContext::signed_in(token));
        }
        tracing::warn!(path = %path.display(), "Token file is empty");
    }

    let context = AuthContext::from_raw(std::env::var(TOKEN_ENV_VAR).ok());
    if !context.is_signed_in() {
        tracing::info!("No credential found, continuing signed out");
    }
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_blank_token_is_absent() {
        assert!(AuthToken::new("   ").is_none());
        assert!(!AuthContext::from_raw(Some(String::new())).is_signed_in());
        assert!(matches!(
            AuthContext::anonymous().require(),
            Err(ClientError::AuthenticationRequired)
        ));
    }

    #[test]
    fn test_bearer_header_and_redacted_debug() {
        let token = AuthToken::new(" abc123\n").unwrap();
        assert_eq!(token.bearer(), "Bearer abc123");
        assert_eq!(format!("{token:?}"), "AuthToken(***)");
    }

    #[test]
    fn test_resolve_prefers_explicit_then_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "from-file")?;

        let ctx = resolve_auth(Some("from-cli".to_string()), Some(file.path()))?;
        assert_eq!(ctx.require()?.bearer(), "Bearer from-cli");

        let ctx = resolve_auth(None, Some(file.path()))?;
        assert_eq!(ctx.require()?.bearer(), "Bearer from-file");
        Ok(())
    }

    #[test]
    fn test_resolve_missing_file_is_error() {
        let result = resolve_auth(None, Some(Path::new("/nonexistent/tunestream/token")));
        assert!(result.is_err());
    }
}
