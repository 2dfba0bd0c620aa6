/// In-memory store for tests
///
/// Mirrors the PostgreSQL semantics the components rely on: case-insensitive
/// email uniqueness, strict `expires > now` lookups, `expires <= now` purges
/// and cascading resource deletion with the owning user. Tokens are not
/// cascaded, matching the schema.
///
/// [`MemoryStore::set_failing`] makes every call fail with a storage error.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{ResourceStore, Store, TokenStore, UserStore};
use crate::error::{Error, Result};
use crate::models::{AccessToken, CreateUser, Resource, User, UserId};
use crate::quota::Quota;

#[derive(Debug, Default)]
struct Inner {
    users: BTreeMap<UserId, User>,
    last_user_id: UserId,
    tokens: HashMap<String, AccessToken>,
    resources: Vec<Resource>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles failure injection
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of stored tokens, expired or not
    pub fn token_count(&self) -> usize {
        self.lock().tokens.len()
    }

    /// Whether a token with this digest is stored
    pub fn contains_token(&self, digest: &str) -> bool {
        self.lock().tokens.contains_key(digest)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn guard(&self) -> Result<MutexGuard<'_, Inner>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Storage(sqlx::Error::PoolTimedOut));
        }
        Ok(self.lock())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: CreateUser) -> Result<User> {
        let mut inner = self.guard()?;

        let taken = inner
            .users
            .values()
            .any(|u| u.email.to_lowercase() == user.email.to_lowercase());
        if taken {
            return Err(Error::Conflict(format!(
                "user '{}' already exists",
                user.email
            )));
        }

        inner.last_user_id += 1;
        let stored = User {
            id: inner.last_user_id,
            email: user.email,
            password_hash: user.password_hash,
            is_admin: user.is_admin,
            quota: user.quota,
        };
        inner.users.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let inner = self.guard()?;
        let email = email.to_lowercase();

        Ok(inner
            .users
            .values()
            .find(|u| u.email.to_lowercase() == email)
            .cloned())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.guard()?.users.get(&id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.guard()?.users.values().cloned().collect())
    }

    async fn update_quota(&self, id: UserId, quota: Quota) -> Result<bool> {
        let mut inner = self.guard()?;
        match inner.users.get_mut(&id) {
            Some(user) => {
                user.quota = quota;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_user(&self, id: UserId) -> Result<bool> {
        let mut inner = self.guard()?;
        if inner.users.remove(&id).is_none() {
            return Ok(false);
        }
        inner.resources.retain(|r| r.user_id != id);
        Ok(true)
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn insert_token(&self, token: AccessToken) -> Result<()> {
        let mut inner = self.guard()?;
        if inner.tokens.contains_key(&token.token) {
            return Err(Error::Conflict("duplicate token".to_string()));
        }
        inner.tokens.insert(token.token.clone(), token);
        Ok(())
    }

    async fn find_active_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AccessToken>> {
        Ok(self
            .guard()?
            .tokens
            .get(token)
            .filter(|t| !t.is_expired_at(now))
            .cloned())
    }

    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut inner = self.guard()?;
        let before = inner.tokens.len();
        inner.tokens.retain(|_, t| !t.is_expired_at(now));
        Ok((before - inner.tokens.len()) as u64)
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn count_resources(&self, user_id: UserId) -> Result<u64> {
        Ok(self
            .guard()?
            .resources
            .iter()
            .filter(|r| r.user_id == user_id)
            .count() as u64)
    }

    async fn insert_resource(&self, resource: Resource) -> Result<Resource> {
        let mut inner = self.guard()?;
        if !inner.users.contains_key(&resource.user_id) {
            // Mirrors the foreign key on resources.user_id
            return Err(Error::NotFound("user"));
        }
        inner.resources.push(resource.clone());
        Ok(resource)
    }

    async fn list_resources(&self, user_id: UserId) -> Result<Vec<Resource>> {
        Ok(self
            .guard()?
            .resources
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_resource(&self, user_id: UserId, key: &str) -> Result<Option<Resource>> {
        Ok(self
            .guard()?
            .resources
            .iter()
            .find(|r| r.user_id == user_id && r.key == key)
            .cloned())
    }

    async fn delete_resource(&self, user_id: UserId, key: &str) -> Result<bool> {
        let mut inner = self.guard()?;
        let before = inner.resources.len();
        inner
            .resources
            .retain(|r| !(r.user_id == user_id && r.key == key));
        Ok(inner.resources.len() < before)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<()> {
        self.guard().map(|_| ())
    }
}
