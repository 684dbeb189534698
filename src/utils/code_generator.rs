//! Random short code generation.
//!
//! Codes are drawn uniformly from the base62 alphabet (`[A-Za-z0-9]`). With the
//! default length of 7 there are 62^7 (about 3.5 * 10^12) possible codes, so
//! collisions are rare and handled by retrying.

use rand::Rng;
use rand::distr::Alphanumeric;

use crate::domain::ports::CodeGenerator;

/// Default number of characters in a generated code.
pub const DEFAULT_CODE_LENGTH: usize = 7;

/// Accepted range for a configured code length.
pub const CODE_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 4..=16;

/// Codes that would shadow a route and are never handed out.
///
/// Matching is case-insensitive: `/Health` must not look like a redirect either.
pub const RESERVED_CODES: &[&str] = &["health", "api"];

pub fn is_reserved(code: &str) -> bool {
    RESERVED_CODES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(code))
}

/// Base62 generator backed by the thread-local CSPRNG.
#[derive(Debug, Clone)]
pub struct RandomCodeGenerator {
    length: usize,
}

impl RandomCodeGenerator {
    /// Creates a generator producing codes of `length` characters.
    ///
    /// `length` is expected to be within [`CODE_LENGTH_RANGE`]; configuration
    /// validation enforces that before a generator is built.
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomCodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH)
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}
