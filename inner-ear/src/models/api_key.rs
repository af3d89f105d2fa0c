use std::fmt;

use crate::error::{InnerEarError, Result};

/// A caller-supplied Gemini API key.
///
/// Lives only for the duration of one request. `Debug` and `Display` are
/// redacted so the key cannot end up in logs by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Accepts a key from a request body. Absent, empty and whitespace-only
    /// keys are all `MissingCredential`.
    pub fn from_request(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            Some(key) if !key.is_empty() => Ok(Self(key.to_string())),
            _ => Err(InnerEarError::MissingCredential),
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}
