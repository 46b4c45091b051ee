//! Domain - pure value types for admission control.
//!
//! No I/O here: the identity a check is keyed on and the verdict it returns.

mod identity;
mod verdict;

pub use identity::Identity;
pub use verdict::{Reason, Verdict};
