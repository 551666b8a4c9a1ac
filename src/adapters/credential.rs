//! Credential types for the two Supabase client handles.
//!
//! [`RestrictedCredential`] wraps the public anon key and may be shown or
//! embedded anywhere. [`PrivilegedCredential`] wraps the service-role key: it
//! has no `Serialize` impl, prints as `[REDACTED]` and is zeroized on drop.

use std::fmt;
use zeroize::Zeroize;

pub const REDACTED: &str = "[REDACTED]";

/// A value that must not end up in logs or response bodies.
///
/// Use [`Secret::expose`] at the single place where the raw value is needed.
pub struct Secret<T: Zeroize> {
    inner: T,
}

pub type SecretString = Secret<String>;

impl<T: Zeroize> Secret<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn expose(&self) -> &T {
        &self.inner
    }
}

impl<T: Zeroize + Clone> Clone for Secret<T> {
    fn clone(&self) -> Self {
        Self::new(self.inner.clone())
    }
}

impl<T: Zeroize> Drop for Secret<T> {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T: Zeroize> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

/// Public (anon) key. Safe to ship to a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictedCredential(String);

impl RestrictedCredential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Service-role key. Only ever held by the provisioning function process.
#[derive(Debug, Clone)]
pub struct PrivilegedCredential(SecretString);

impl PrivilegedCredential {
    /// Returns `None` for a blank key so callers cannot build a handle around it.
    pub fn new(key: SecretString) -> Option<Self> {
        if key.expose().trim().is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.expose()
    }

    /// Replaces every occurrence of the key in `text`.
    pub fn scrub(&self, text: &str) -> String {
        text.replace(self.expose(), REDACTED)
    }
}
