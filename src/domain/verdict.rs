//! Outcome of a single rate limit check.

use std::fmt;

/// The allow/deny outcome of one check, with a denial reason.
///
/// A verdict is a pure value returned per check; it is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Why the verdict was reached.
    pub reason: Reason,
}

/// Reason attached to a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// Within budget.
    Allowed,
    /// An unexpired block marker exists for the identifier.
    Blocked,
    /// This request pushed the window count over the limit.
    LimitExceeded,
}

impl Verdict {
    /// Verdict for a request within budget.
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            reason: Reason::Allowed,
        }
    }

    /// Verdict for a denied request.
    pub fn denied(reason: Reason) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }

    /// Returns true if the request was allowed.
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }
}

impl Reason {
    /// Returns the string representation of the reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::Allowed => "allowed",
            Reason::Blocked => "blocked",
            Reason::LimitExceeded => "limit_exceeded",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
