//! Short URL creation and resolution.
//!
//! # Code allocation
//!
//! A candidate code is drawn from the injected [`CodeGenerator`] and inserted
//! in its own transaction. The insert is the uniqueness check: there is no
//! "does this code exist?" read first, so two requests drawing the same code
//! cannot both succeed. A collision rolls the transaction back and a new code
//! is drawn, up to `max_attempts` times.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::entities::{ShortUrl, is_valid_code_format};
use crate::domain::ports::{CodeGenerator, UnitOfWork, run};
use crate::domain::repositories::{CodeError, ShortUrlRepository};
use crate::domain::values::ValidUrl;
use crate::error::{AppError, AppResult, ApplicationError};
use crate::utils::code_generator::is_reserved;

/// Default bound on code generation attempts per request.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 8;

/// Accepted range for a configured attempt bound.
pub const MAX_ATTEMPTS_RANGE: std::ops::RangeInclusive<u32> = 1..=32;

/// One page of a user's short URLs.
#[derive(Debug, Clone)]
pub struct OwnedPage {
    pub items: Vec<ShortUrl>,
    pub total: i64,
}

pub struct ShortenerService {
    unit_of_work: Arc<dyn UnitOfWork>,
    short_urls: Arc<dyn ShortUrlRepository>,
    code_generator: Arc<dyn CodeGenerator>,
    max_attempts: u32,
}

impl ShortenerService {
    pub fn new(
        unit_of_work: Arc<dyn UnitOfWork>,
        short_urls: Arc<dyn ShortUrlRepository>,
        code_generator: Arc<dyn CodeGenerator>,
    ) -> Self {
        Self {
            unit_of_work,
            short_urls,
            code_generator,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Overrides the attempt bound. Values below 1 are raised to 1.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Validates `raw_url` and stores it under a freshly allocated code.
    ///
    /// The deadline is checked before each attempt. An attempt that has
    /// started always runs to completion, so a timeout never hides a write
    /// that actually happened.
    ///
    /// # Errors
    ///
    /// - [`crate::error::DomainError::InvalidUrl`] if `raw_url` is not an
    ///   absolute http(s) URL; storage is not touched
    /// - [`ApplicationError::MaxCodeGenerationAttempts`] if every attempt collided
    /// - [`ApplicationError::Timeout`] if `deadline` passes between attempts
    /// - storage errors, unchanged and without retry
    pub async fn shorten(
        &self,
        raw_url: &str,
        owner_id: Option<String>,
        deadline: Option<Instant>,
    ) -> AppResult<ShortUrl> {
        let url = ValidUrl::parse(raw_url)?;

        for attempt in 1..=self.max_attempts {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(ApplicationError::Timeout {
                    operation: "shorten",
                }
                .into());
            }

            let code = self.code_generator.generate();

            if is_reserved(&code) {
                debug!(attempt, code = %code, "Generated a reserved code, retrying");
                metrics::counter!("shortener_code_collisions_total").increment(1);
                continue;
            }

            let candidate = ShortUrl::new(code, url.clone(), owner_id.clone())?;

            let saved = run(self.unit_of_work.as_ref(), move |tx| {
                Box::pin(async move { tx.short_urls().save(candidate).await })
            })
            .await;

            match saved {
                Ok(short_url) => {
                    info!(
                        code = %short_url.code(),
                        attempt,
                        owner = ?short_url.owner_id(),
                        "Short URL created"
                    );
                    return Ok(short_url);
                }
                Err(CodeError::Collision(code)) => {
                    debug!(attempt, code = %code, "Short code collision, retrying");
                    metrics::counter!("shortener_code_collisions_total").increment(1);
                }
                Err(CodeError::Storage(e)) => return Err(e),
            }
        }

        warn!(
            attempts = self.max_attempts,
            "Short code space exhausted for this request"
        );
        metrics::counter!("shortener_code_exhausted_total").increment(1);

        Err(ApplicationError::MaxCodeGenerationAttempts {
            attempts: self.max_attempts,
        }
        .into())
    }

    /// Looks up the short URL for `code`.
    ///
    /// Codes that could never have been issued are reported as not found
    /// without reading storage.
    ///
    /// # Errors
    ///
    /// - [`ApplicationError::ResourceNotFound`] if no short URL uses `code`
    /// - [`ApplicationError::Timeout`] if the read outlives `deadline`
    pub async fn resolve(&self, code: &str, deadline: Option<Instant>) -> AppResult<ShortUrl> {
        if !is_valid_code_format(code) {
            return Err(ApplicationError::not_found("short_url", code).into());
        }

        let lookup = self.short_urls.find_by_code(code);

        let found = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, lookup)
                .await
                .map_err(|_| {
                    AppError::from(ApplicationError::Timeout {
                        operation: "resolve",
                    })
                })??,
            None => lookup.await?,
        };

        found.ok_or_else(|| ApplicationError::not_found("short_url", code).into())
    }

    /// Returns one page of `owner_id`'s short URLs, newest first.
    ///
    /// `page` is 1-based.
    pub async fn list_owned(
        &self,
        owner_id: &str,
        page: i64,
        page_size: i64,
    ) -> AppResult<OwnedPage> {
        let offset = (page.max(1) - 1) * page_size;

        let items = self
            .short_urls
            .list_by_owner(owner_id, offset, page_size)
            .await?;
        let total = self.short_urls.count_by_owner(owner_id).await?;

        Ok(OwnedPage { items, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockUnitOfWork;
    use crate::domain::repositories::MockShortUrlRepository;
    use crate::error::ErrorKind;
    use crate::infrastructure::memory::MemoryStore;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Hands out a fixed sequence of codes, repeating the last one.
    struct SequenceCodeGenerator {
        codes: Mutex<VecDeque<String>>,
        last: Mutex<String>,
        calls: AtomicU32,
    }

    impl SequenceCodeGenerator {
        fn new(codes: &[&str]) -> Self {
            Self {
                codes: Mutex::new(codes.iter().map(|c| c.to_string()).collect()),
                last: Mutex::new(String::new()),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl CodeGenerator for SequenceCodeGenerator {
        fn generate(&self) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut last = self.last.lock().unwrap();
            if let Some(next) = self.codes.lock().unwrap().pop_front() {
                *last = next;
            }
            last.clone()
        }
    }

    fn service(store: &MemoryStore, generator: Arc<SequenceCodeGenerator>) -> ShortenerService {
        ShortenerService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            generator,
        )
    }

    async fn seed(store: &MemoryStore, code: &str) {
        let generator = Arc::new(SequenceCodeGenerator::new(&[code]));
        service(store, generator)
            .shorten("https://seed.example.com", None, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_shorten_then_resolve_round_trips() {
        let store = MemoryStore::new();
        let service = service(&store, Arc::new(SequenceCodeGenerator::new(&["abc1234"])));

        let created = service
            .shorten("https://example.com/some/long/path", None, None)
            .await
            .unwrap();

        assert!(created.is_persisted());
        assert_eq!(created.code(), "abc1234");

        let resolved = service.resolve("abc1234", None).await.unwrap();
        assert_eq!(resolved.url().as_str(), "https://example.com/some/long/path");
        assert_eq!(resolved, created);
    }

    #[tokio::test]
    async fn test_malformed_url_never_begins_a_transaction() {
        let mut unit_of_work = MockUnitOfWork::new();
        unit_of_work.expect_begin().times(0);

        let generator = Arc::new(SequenceCodeGenerator::new(&["abc1234"]));
        let service = ShortenerService::new(
            Arc::new(unit_of_work),
            Arc::new(MockShortUrlRepository::new()),
            generator.clone(),
        );

        let err = service.shorten("not a url", None, None).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidUrl);
        assert!(err.to_string().starts_with("Invalid Url"));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_generated_code_is_never_persisted() {
        let store = MemoryStore::new();
        let service = service(&store, Arc::new(SequenceCodeGenerator::new(&[""])));

        let err = service
            .shorten("https://example.com", None, None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidShortCode);
        assert_eq!(store.short_url_count(), 0);
    }

    #[tokio::test]
    async fn test_exhaustion_after_exactly_max_attempts() {
        let store = MemoryStore::new();
        seed(&store, "taken").await;

        let generator = Arc::new(SequenceCodeGenerator::new(&["taken"]));
        let service = service(&store, generator.clone()).with_max_attempts(3);

        let err = service
            .shorten("https://example.com", None, None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MaxCodeGenerationAttempts);
        assert!(matches!(
            err,
            AppError::Application(ApplicationError::MaxCodeGenerationAttempts { attempts: 3 })
        ));
        assert_eq!(generator.calls(), 3);
        assert_eq!(store.short_url_count(), 1);
    }

    #[tokio::test]
    async fn test_collisions_then_success_stores_one_record() {
        let store = MemoryStore::new();
        seed(&store, "taken").await;

        let generator = Arc::new(SequenceCodeGenerator::new(&["taken", "taken", "fresh"]));
        let service = service(&store, generator.clone());

        let created = service
            .shorten("https://example.com/new", Some("42".to_string()), None)
            .await
            .unwrap();

        assert_eq!(created.code(), "fresh");
        assert_eq!(created.owner_id(), Some("42"));
        assert_eq!(generator.calls(), 3);
        assert_eq!(store.short_url_count(), 2);
    }

    #[tokio::test]
    async fn test_reserved_code_counts_as_collision() {
        let store = MemoryStore::new();
        let generator = Arc::new(SequenceCodeGenerator::new(&["health", "api", "ok1"]));
        let service = service(&store, generator.clone());

        let created = service
            .shorten("https://example.com", None, None)
            .await
            .unwrap();

        assert_eq!(created.code(), "ok1");
        assert_eq!(generator.calls(), 3);
    }

    #[tokio::test]
    async fn test_reserved_codes_only_exhaust() {
        let store = MemoryStore::new();
        let generator = Arc::new(SequenceCodeGenerator::new(&["health"]));
        let service = service(&store, generator).with_max_attempts(2);

        let err = service
            .shorten("https://example.com", None, None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MaxCodeGenerationAttempts);
        assert_eq!(store.short_url_count(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_is_not_retried() {
        let mut unit_of_work = MockUnitOfWork::new();
        unit_of_work
            .expect_begin()
            .times(1)
            .returning(|| Err(AppError::storage("connection refused")));

        let generator = Arc::new(SequenceCodeGenerator::new(&["abc1234"]));
        let service = ShortenerService::new(
            Arc::new(unit_of_work),
            Arc::new(MockShortUrlRepository::new()),
            generator.clone(),
        );

        let err = service
            .shorten("https://example.com", None, None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_elapsed_deadline_times_out_before_any_attempt() {
        let mut unit_of_work = MockUnitOfWork::new();
        unit_of_work.expect_begin().times(0);

        let service = ShortenerService::new(
            Arc::new(unit_of_work),
            Arc::new(MockShortUrlRepository::new()),
            Arc::new(SequenceCodeGenerator::new(&["abc1234"])),
        );

        let deadline = Instant::now() - Duration::from_millis(1);
        let err = service
            .shorten("https://example.com", None, Some(deadline))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::OperationTimedOut);
    }

    #[tokio::test]
    async fn test_same_code_drawn_concurrently_loser_retries() {
        let store = MemoryStore::new();
        let first_generator = Arc::new(SequenceCodeGenerator::new(&["same", "aaa1111"]));
        let second_generator = Arc::new(SequenceCodeGenerator::new(&["same", "bbb2222"]));
        let a = service(&store, first_generator.clone());
        let b = service(&store, second_generator.clone());

        let (first, second) = tokio::join!(
            a.shorten("https://a.example.com", None, None),
            b.shorten("https://b.example.com", None, None),
        );

        let first = first.unwrap();
        let second = second.unwrap();

        assert_ne!(first.code(), second.code());
        assert!(first.code() == "same" || second.code() == "same");
        assert_eq!(first_generator.calls() + second_generator.calls(), 3);
        assert_eq!(store.short_url_count(), 2);
    }

    #[tokio::test]
    async fn test_same_code_with_single_attempt_leaves_one_winner() {
        let store = MemoryStore::new();
        let a = service(&store, Arc::new(SequenceCodeGenerator::new(&["same"])))
            .with_max_attempts(1);
        let b = service(&store, Arc::new(SequenceCodeGenerator::new(&["same"])))
            .with_max_attempts(1);

        let (first, second) = tokio::join!(
            a.shorten("https://a.example.com", None, None),
            b.shorten("https://b.example.com", None, None),
        );

        let outcomes = [first, second];
        let winners = outcomes.iter().filter(|r| r.is_ok()).count();
        let exhausted = outcomes
            .iter()
            .filter(|r| {
                r.as_ref()
                    .is_err_and(|e| e.kind() == ErrorKind::MaxCodeGenerationAttempts)
            })
            .count();

        assert_eq!(winners, 1);
        assert_eq!(exhausted, 1);
        assert_eq!(store.short_url_count(), 1);
    }

    #[tokio::test]
    async fn test_resolve_unknown_code_is_not_found() {
        let store = MemoryStore::new();
        let service = service(&store, Arc::new(SequenceCodeGenerator::new(&["x"])));

        let err = service.resolve("nope123", None).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
    }

    #[tokio::test]
    async fn test_resolve_malformed_code_skips_lookup() {
        let mut short_urls = MockShortUrlRepository::new();
        short_urls.expect_find_by_code().times(0);

        let service = ShortenerService::new(
            Arc::new(MockUnitOfWork::new()),
            Arc::new(short_urls),
            Arc::new(SequenceCodeGenerator::new(&["x"])),
        );

        let err = service.resolve("bad-code!", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
    }

    #[tokio::test]
    async fn test_resolve_propagates_storage_errors() {
        let mut short_urls = MockShortUrlRepository::new();
        short_urls
            .expect_find_by_code()
            .withf(|code| code == "abc1234")
            .returning(|_| Err(AppError::storage("down")));

        let service = ShortenerService::new(
            Arc::new(MockUnitOfWork::new()),
            Arc::new(short_urls),
            Arc::new(SequenceCodeGenerator::new(&["x"])),
        );

        let err = service
            .resolve("abc1234", Some(Instant::now() + Duration::from_secs(5)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[tokio::test]
    async fn test_list_owned_pages() {
        let store = MemoryStore::new();
        let generator = Arc::new(SequenceCodeGenerator::new(&["c1", "c2", "c3"]));
        let service = service(&store, generator);

        for _ in 0..3 {
            service
                .shorten("https://example.com", Some("7".to_string()), None)
                .await
                .unwrap();
        }

        let page = service.list_owned("7", 2, 2).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);

        let empty = service.list_owned("8", 1, 20).await.unwrap();
        assert_eq!(empty.total, 0);
        assert!(empty.items.is_empty());
    }
}
