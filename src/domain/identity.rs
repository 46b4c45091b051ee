//! Client identity resolved for a request.
//!
//! Every request is rate limited against exactly one identity: an API token
//! when one is present, else the client network address. The storage key is
//! namespaced by kind so the same raw value arriving through different
//! channels never shares a counter.

use std::fmt;

/// The identity a rate limit check is scoped to.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub enum Identity {
    /// An opaque API token extracted from request headers.
    Token(String),
    /// A client network address (no port).
    Address(String),
}

impl Identity {
    /// Creates a token identity.
    pub fn token(value: impl Into<String>) -> Self {
        Identity::Token(value.into())
    }

    /// Creates an address identity.
    ///
    /// An empty value is valid: requests whose origin cannot be resolved are
    /// still rate limited, as one shared anonymous bucket.
    pub fn address(value: impl Into<String>) -> Self {
        Identity::Address(value.into())
    }

    /// The raw token or address value.
    pub fn raw(&self) -> &str {
        match self {
            Identity::Token(v) | Identity::Address(v) => v,
        }
    }

    /// The string representation of the identity kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Identity::Token(_) => "token",
            Identity::Address(_) => "ip",
        }
    }

    /// Returns the namespaced key this identity is stored under.
    pub fn storage_key(&self) -> String {
        format!("{}:{}", self.kind(), self.raw())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.raw())
    }
}
