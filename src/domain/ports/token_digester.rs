use crate::domain::values::Digest;
use crate::error::AppResult;

/// Turns bearer secrets into storable digests and checks them later.
///
/// Digests are deterministic for a given key and algorithm. `verify` has no
/// side effects and must compare in constant time.
#[cfg_attr(test, mockall::automock)]
pub trait TokenDigester: Send + Sync {
    fn digest(&self, plain: &str) -> AppResult<Digest>;

    /// # Errors
    ///
    /// Fails if `digest.algorithm` is not one this digester supports.
    fn verify(&self, plain: &str, digest: &Digest) -> AppResult<bool>;
}
