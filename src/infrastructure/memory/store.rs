//! In-process implementation of every storage port.
//!
//! Rows inserted inside a transaction are tagged with that transaction's id.
//! Readers skip tagged rows, while writers still see them, so two open
//! transactions cannot both claim the same code or email. Commit clears the
//! tags; rollback deletes the tagged rows and replays the undo log for
//! updates and deletes.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::entities::{Session, SessionRotation, ShortUrl, User};
use crate::domain::ports::{Transaction, UnitOfWork};
use crate::domain::repositories::{
    CodeError, SessionRepository, SessionWriter, ShortUrlRepository, ShortUrlWriter,
    UserRepository, UserSaveError, UserWriter,
};
use crate::domain::values::{Digest, ValidEmail};
use crate::error::AppResult;

type TxId = u64;

#[derive(Debug)]
struct Row<T> {
    value: T,
    pending: Option<TxId>,
}

impl<T> Row<T> {
    fn committed(&self) -> bool {
        self.pending.is_none()
    }

    fn visible_to(&self, tx: TxId) -> bool {
        self.pending.is_none_or(|owner| owner == tx)
    }
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    next_tx: TxId,
    short_urls: BTreeMap<u64, Row<ShortUrl>>,
    users: BTreeMap<u64, Row<User>>,
    sessions: BTreeMap<u64, Row<Session>>,
}

impl State {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn commit(&mut self, tx: TxId) {
        clear_pending(&mut self.short_urls, tx);
        clear_pending(&mut self.users, tx);
        clear_pending(&mut self.sessions, tx);
    }

    fn rollback(&mut self, tx: TxId, undo: Vec<Undo>) {
        self.short_urls.retain(|_, row| row.pending != Some(tx));
        self.users.retain(|_, row| row.pending != Some(tx));
        self.sessions.retain(|_, row| row.pending != Some(tx));

        for entry in undo.into_iter().rev() {
            match entry {
                Undo::RestoreSession(id, session) => {
                    self.sessions.insert(
                        id,
                        Row {
                            value: session,
                            pending: None,
                        },
                    );
                }
            }
        }
    }
}

fn clear_pending<T>(table: &mut BTreeMap<u64, Row<T>>, tx: TxId) {
    for row in table.values_mut() {
        if row.pending == Some(tx) {
            row.pending = None;
        }
    }
}

fn parse_id(id: &str) -> Option<u64> {
    id.parse().ok()
}

/// Committed state to put back if a transaction rolls back.
#[derive(Debug)]
enum Undo {
    RestoreSession(u64, Session),
}

/// Shared in-memory store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        lock_state(&self.state)
    }

    /// Number of committed short URLs.
    pub fn short_url_count(&self) -> usize {
        self.lock()
            .short_urls
            .values()
            .filter(|row| row.committed())
            .count()
    }
}

fn lock_state(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl UnitOfWork for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn Transaction>> {
        let tx_id = {
            let mut state = self.lock();
            state.next_tx += 1;
            state.next_tx
        };

        Ok(Box::new(MemoryTransaction {
            state: Arc::clone(&self.state),
            tx_id,
            undo: Vec::new(),
            finished: false,
        }))
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[async_trait]
impl ShortUrlRepository for MemoryStore {
    async fn find_by_code(&self, code: &str) -> AppResult<Option<ShortUrl>> {
        Ok(self
            .lock()
            .short_urls
            .values()
            .find(|row| row.committed() && row.value.code() == code)
            .map(|row| row.value.clone()))
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<ShortUrl>> {
        let state = self.lock();
        let mut owned: Vec<(&u64, &ShortUrl)> = state
            .short_urls
            .iter()
            .filter(|(_, row)| row.committed() && row.value.is_owned_by(owner_id))
            .map(|(id, row)| (id, &row.value))
            .collect();

        owned.sort_by(|(a_id, a), (b_id, b)| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b_id.cmp(a_id))
        });

        Ok(owned
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .map(|(_, short_url)| short_url.clone())
            .collect())
    }

    async fn count_by_owner(&self, owner_id: &str) -> AppResult<i64> {
        let count = self
            .lock()
            .short_urls
            .values()
            .filter(|row| row.committed() && row.value.is_owned_by(owner_id))
            .count();

        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_email(&self, email: &ValidEmail) -> AppResult<Option<User>> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|row| row.committed() && row.value.email == *email)
            .map(|row| row.value.clone()))
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };

        Ok(self
            .lock()
            .users
            .get(&id)
            .filter(|row| row.committed())
            .map(|row| row.value.clone()))
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Session>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };

        Ok(self
            .lock()
            .sessions
            .get(&id)
            .filter(|row| row.committed())
            .map(|row| row.value.clone()))
    }
}

/// A transaction against a [`MemoryStore`].
pub struct MemoryTransaction {
    state: Arc<Mutex<State>>,
    tx_id: TxId,
    undo: Vec<Undo>,
    finished: bool,
}

impl MemoryTransaction {
    fn lock(&self) -> MutexGuard<'_, State> {
        lock_state(&self.state)
    }

    fn finish_rollback(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        let undo = std::mem::take(&mut self.undo);
        lock_state(&self.state).rollback(self.tx_id, undo);
        debug!(tx = self.tx_id, "Memory transaction rolled back");
    }

    fn delete_session(&mut self, state: &mut State, id: u64) -> bool {
        let Some(row) = state.sessions.get(&id) else {
            return false;
        };

        if !row.visible_to(self.tx_id) {
            return false;
        }

        if let Some(row) = state.sessions.remove(&id)
            && row.committed()
        {
            self.undo.push(Undo::RestoreSession(id, row.value));
        }

        true
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        self.finish_rollback();
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    fn short_urls(&mut self) -> &mut dyn ShortUrlWriter {
        self
    }

    fn users(&mut self) -> &mut dyn UserWriter {
        self
    }

    fn sessions(&mut self) -> &mut dyn SessionWriter {
        self
    }

    async fn commit(mut self: Box<Self>) -> AppResult<()> {
        self.finished = true;
        self.undo.clear();
        self.lock().commit(self.tx_id);
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> AppResult<()> {
        self.finish_rollback();
        Ok(())
    }
}

#[async_trait]
impl ShortUrlWriter for MemoryTransaction {
    async fn save(&mut self, short_url: ShortUrl) -> Result<ShortUrl, CodeError> {
        let tx_id = self.tx_id;
        let mut state = self.lock();

        if state
            .short_urls
            .values()
            .any(|row| row.value.code() == short_url.code())
        {
            return Err(CodeError::Collision(short_url.code().to_string()));
        }

        let id = state.allocate_id();
        let saved = short_url.with_id(id.to_string());
        state.short_urls.insert(
            id,
            Row {
                value: saved.clone(),
                pending: Some(tx_id),
            },
        );

        Ok(saved)
    }
}

#[async_trait]
impl UserWriter for MemoryTransaction {
    async fn save(&mut self, mut user: User) -> Result<User, UserSaveError> {
        let tx_id = self.tx_id;
        let mut state = self.lock();

        if state.users.values().any(|row| row.value.email == user.email) {
            return Err(UserSaveError::EmailTaken(user.email.to_string()));
        }

        let id = state.allocate_id();
        user.id = Some(id.to_string());
        state.users.insert(
            id,
            Row {
                value: user.clone(),
                pending: Some(tx_id),
            },
        );

        Ok(user)
    }
}

#[async_trait]
impl SessionWriter for MemoryTransaction {
    async fn save(&mut self, mut session: Session) -> AppResult<Session> {
        let tx_id = self.tx_id;
        let mut state = self.lock();

        let id = state.allocate_id();
        session.id = Some(id.to_string());
        state.sessions.insert(
            id,
            Row {
                value: session.clone(),
                pending: Some(tx_id),
            },
        );

        Ok(session)
    }

    async fn rotate(
        &mut self,
        id: &str,
        expected_refresh: &Digest,
        rotation: SessionRotation,
    ) -> AppResult<bool> {
        let Some(id) = parse_id(id) else {
            return Ok(false);
        };

        let tx_id = self.tx_id;
        let state_handle = Arc::clone(&self.state);
        let mut state = lock_state(&state_handle);

        let Some(row) = state.sessions.get_mut(&id) else {
            return Ok(false);
        };

        if !row.visible_to(tx_id) || row.value.refresh_digest != *expected_refresh {
            return Ok(false);
        }

        let previous = row.value.clone();
        row.value = previous.clone().rotated(rotation);

        if row.committed() {
            self.undo.push(Undo::RestoreSession(id, previous));
        }

        Ok(true)
    }

    async fn delete(&mut self, id: &str) -> AppResult<bool> {
        let Some(id) = parse_id(id) else {
            return Ok(false);
        };

        let state_handle = Arc::clone(&self.state);
        let mut state = lock_state(&state_handle);

        Ok(self.delete_session(&mut state, id))
    }

    async fn delete_for_user(&mut self, user_id: &str) -> AppResult<u64> {
        let state_handle = Arc::clone(&self.state);
        let mut state = lock_state(&state_handle);

        let ids: Vec<u64> = state
            .sessions
            .iter()
            .filter(|(_, row)| row.visible_to(self.tx_id) && row.value.user_id == user_id)
            .map(|(id, _)| *id)
            .collect();

        let mut deleted = 0;
        for id in ids {
            if self.delete_session(&mut state, id) {
                deleted += 1;
            }
        }

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::ValidUrl;
    use chrono::{Duration, Utc};

    fn short_url(code: &str) -> ShortUrl {
        ShortUrl::new(code, ValidUrl::parse("https://example.com").unwrap(), None).unwrap()
    }

    fn session(user_id: &str, refresh: &str) -> Session {
        let now = Utc::now();
        Session {
            id: None,
            user_id: user_id.to_string(),
            access_digest: Digest::new("access", "hmac-sha256"),
            refresh_digest: Digest::new(refresh, "hmac-sha256"),
            access_expires_at: now + Duration::minutes(15),
            refresh_expires_at: now + Duration::days(30),
            created_at: now,
        }
    }

    fn rotation(refresh: &str) -> SessionRotation {
        let now = Utc::now();
        SessionRotation {
            access_digest: Digest::new("access2", "hmac-sha256"),
            refresh_digest: Digest::new(refresh, "hmac-sha256"),
            access_expires_at: now + Duration::minutes(15),
            refresh_expires_at: now + Duration::days(30),
        }
    }

    #[tokio::test]
    async fn test_commit_makes_insert_visible() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        let saved = tx.short_urls().save(short_url("abc")).await.unwrap();
        assert!(saved.is_persisted());
        assert!(store.find_by_code("abc").await.unwrap().is_none());

        tx.commit().await.unwrap();
        assert_eq!(store.find_by_code("abc").await.unwrap(), Some(saved));
        assert_eq!(store.short_url_count(), 1);
    }

    #[tokio::test]
    async fn test_rollback_discards_insert() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        tx.short_urls().save(short_url("abc")).await.unwrap();
        tx.rollback().await.unwrap();

        assert!(store.find_by_code("abc").await.unwrap().is_none());
        assert_eq!(store.short_url_count(), 0);
    }

    #[tokio::test]
    async fn test_drop_without_commit_rolls_back() {
        let store = MemoryStore::new();

        {
            let mut tx = store.begin().await.unwrap();
            tx.short_urls().save(short_url("abc")).await.unwrap();
        }

        assert_eq!(store.short_url_count(), 0);
        let mut tx = store.begin().await.unwrap();
        assert!(tx.short_urls().save(short_url("abc")).await.is_ok());
    }

    #[tokio::test]
    async fn test_pending_code_collides_across_transactions() {
        let store = MemoryStore::new();

        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();

        first.short_urls().save(short_url("same")).await.unwrap();
        let err = second.short_urls().save(short_url("same")).await.unwrap_err();

        assert!(matches!(err, CodeError::Collision(code) if code == "same"));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        let email = ValidEmail::parse("a@example.com").unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.users()
            .save(User::new(email.clone(), "hash".to_string()))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let err = tx
            .users()
            .save(User::new(email.clone(), "hash".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, UserSaveError::EmailTaken(_)));

        let found = store.find_by_email(&email).await.unwrap().unwrap();
        assert!(UserRepository::find_by_id(&store, found.id.as_deref().unwrap())
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_rotate_is_compare_and_swap() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        let saved = tx.sessions().save(session("1", "r1")).await.unwrap();
        tx.commit().await.unwrap();
        let id = saved.id.unwrap();

        let mut tx = store.begin().await.unwrap();
        let expected = Digest::new("r1", "hmac-sha256");
        assert!(tx.sessions().rotate(&id, &expected, rotation("r2")).await.unwrap());
        assert!(!tx.sessions().rotate(&id, &expected, rotation("r3")).await.unwrap());
        tx.commit().await.unwrap();

        let current = SessionRepository::find_by_id(&store, &id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.refresh_digest.value, "r2");
    }

    #[tokio::test]
    async fn test_rollback_restores_rotated_and_deleted_sessions() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        let a = tx.sessions().save(session("1", "ra")).await.unwrap();
        let b = tx.sessions().save(session("1", "rb")).await.unwrap();
        tx.commit().await.unwrap();
        let (a, b) = (a.id.unwrap(), b.id.unwrap());

        let mut tx = store.begin().await.unwrap();
        let expected = Digest::new("ra", "hmac-sha256");
        assert!(tx.sessions().rotate(&a, &expected, rotation("changed")).await.unwrap());
        assert!(tx.sessions().delete(&b).await.unwrap());
        tx.rollback().await.unwrap();

        let restored_a = SessionRepository::find_by_id(&store, &a)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(restored_a.refresh_digest.value, "ra");
        assert!(SessionRepository::find_by_id(&store, &b)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_delete_for_user() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        tx.sessions().save(session("1", "a")).await.unwrap();
        tx.sessions().save(session("1", "b")).await.unwrap();
        let other = tx.sessions().save(session("2", "c")).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.sessions().delete_for_user("1").await.unwrap(), 2);
        tx.commit().await.unwrap();

        assert!(SessionRepository::find_by_id(&store, other.id.as_deref().unwrap())
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_list_by_owner_pages_newest_first() {
        let store = MemoryStore::new();
        let url = ValidUrl::parse("https://example.com").unwrap();

        let mut tx = store.begin().await.unwrap();
        for code in ["a1", "a2", "a3"] {
            let owned = ShortUrl::new(code, url.clone(), Some("9".to_string())).unwrap();
            tx.short_urls().save(owned).await.unwrap();
        }
        tx.short_urls().save(short_url("other")).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.count_by_owner("9").await.unwrap(), 3);

        let first_page = store.list_by_owner("9", 0, 2).await.unwrap();
        let codes: Vec<_> = first_page.iter().map(|s| s.code()).collect();
        assert_eq!(codes, vec!["a3", "a2"]);

        let second_page = store.list_by_owner("9", 2, 2).await.unwrap();
        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].code(), "a1");
    }
}
