/// Source of candidate short codes.
///
/// Uniqueness is not the generator's job: the store rejects duplicates and the
/// shortener retries.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}
