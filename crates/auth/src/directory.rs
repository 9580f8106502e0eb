//! Application-owned user records (uid → role/status).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use depthstudio_core::{DomainError, DomainResult, UserId};

use crate::User;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The backing store could not be read or written.
    #[error("user directory unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// User record store.
///
/// Records are never removed; access is revoked by status changes only.
pub trait UserDirectory: Send + Sync {
    fn get(&self, id: &UserId) -> Result<Option<User>, DirectoryError>;

    /// Insert `user` unless a record with the same id exists; returns the stored record.
    fn insert_if_absent(&self, user: User) -> Result<User, DirectoryError>;

    /// Apply `change` to an existing record atomically; returns the updated record.
    ///
    /// A change that fails leaves the stored record untouched.
    fn update(
        &self,
        id: &UserId,
        change: &mut dyn FnMut(&mut User) -> DomainResult<()>,
    ) -> Result<User, DirectoryError>;

    /// All records, ordered by id.
    fn list(&self) -> Result<Vec<User>, DirectoryError>;
}

impl<S> UserDirectory for Arc<S>
where
    S: UserDirectory + ?Sized,
{
    fn get(&self, id: &UserId) -> Result<Option<User>, DirectoryError> {
        (**self).get(id)
    }

    fn insert_if_absent(&self, user: User) -> Result<User, DirectoryError> {
        (**self).insert_if_absent(user)
    }

    fn update(
        &self,
        id: &UserId,
        change: &mut dyn FnMut(&mut User) -> DomainResult<()>,
    ) -> Result<User, DirectoryError> {
        (**self).update(id, change)
    }

    fn list(&self) -> Result<Vec<User>, DirectoryError> {
        (**self).list()
    }
}

/// In-memory user directory for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    inner: RwLock<HashMap<UserId, User>>,
}

fn poisoned() -> DirectoryError {
    DirectoryError::Unavailable("lock poisoned".to_string())
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed records (bootstrap and tests). Existing ids are overwritten.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let map = users.into_iter().map(|u| (u.id.clone(), u)).collect();
        Self {
            inner: RwLock::new(map),
        }
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn get(&self, id: &UserId) -> Result<Option<User>, DirectoryError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(id).cloned())
    }

    fn insert_if_absent(&self, user: User) -> Result<User, DirectoryError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.entry(user.id.clone()).or_insert(user).clone())
    }

    fn update(
        &self,
        id: &UserId,
        change: &mut dyn FnMut(&mut User) -> DomainResult<()>,
    ) -> Result<User, DirectoryError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let current = map.get(id).ok_or(DomainError::NotFound)?;

        let mut next = current.clone();
        change(&mut next)?;
        map.insert(id.clone(), next.clone());
        Ok(next)
    }

    fn list(&self) -> Result<Vec<User>, DirectoryError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let mut users: Vec<User> = map.values().cloned().collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(users)
    }
}
