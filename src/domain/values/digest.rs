//! Stored digest of a secret.

use serde::{Deserialize, Serialize};

/// A hashed secret together with the algorithm that produced it.
///
/// Keeping the algorithm next to the value lets digests made with an older
/// algorithm still verify after the default changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    /// Lowercase hex-encoded MAC.
    pub value: String,
    /// Algorithm name, e.g. `hmac-sha256`.
    pub algorithm: String,
}

impl Digest {
    pub fn new(value: impl Into<String>, algorithm: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            algorithm: algorithm.into(),
        }
    }
}
