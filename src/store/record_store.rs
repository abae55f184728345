//! Record Store
//!
//! Lock-guarded pair of tables exposed to request handlers and the
//! sync scheduler.

use bytes::Bytes;
use parking_lot::Mutex;

use crate::error::{Result, StoreError};
use crate::model::{CollectionKind, Post, User};
use crate::snapshot::{self, SnapshotDocument, SnapshotRef};

use super::{Counters, Table};

/// Tables guarded together by the store lock
#[derive(Debug, Default)]
struct StoreState {
    posts: Table<Post>,
    users: Table<User>,
}

impl StoreState {
    fn from_document(document: SnapshotDocument) -> Self {
        Self {
            posts: Table::from_records(document.posts),
            users: Table::from_records(document.users),
        }
    }
}

/// The in-memory record store
///
/// ## Concurrency Model: one coarse lock
///
/// - Every operation, reads included, holds `state` for its whole traversal,
///   so no caller can observe a delete halfway through renumbering.
/// - [`snapshot_now`](Self::snapshot_now) serializes under the same lock and
///   releases it as soon as the buffer exists; file I/O happens outside.
/// - Operations never block on anything else while holding the lock.
///
/// ## Identity churn on delete
///
/// Deleting a record renumbers every record after it. An id a caller held
/// before a delete may afterwards name a different record.
#[derive(Debug, Default)]
pub struct RecordStore {
    state: Mutex<StoreState>,
}

impl RecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a decoded snapshot, reconstructing both counters
    pub fn from_document(document: SnapshotDocument) -> Self {
        Self {
            state: Mutex::new(StoreState::from_document(document)),
        }
    }

    // =========================================================================
    // Posts
    // =========================================================================

    /// Insert a new post (id `0`) or replace an existing one
    pub fn insert_post(&self, post: Post) -> Result<Post> {
        self.state.lock().posts.insert(post)
    }

    /// Get a post by id
    pub fn get_post(&self, id: u64) -> Result<Post> {
        self.state
            .lock()
            .posts
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound {
                collection: CollectionKind::Posts,
                id,
            })
    }

    /// All posts in id order
    pub fn list_posts(&self) -> Vec<Post> {
        self.state.lock().posts.list(|_| true)
    }

    /// Posts matching the predicate, in id order
    ///
    /// The predicate runs under the store lock and must not call back into
    /// the store.
    pub fn filter_posts<F>(&self, predicate: F) -> Vec<Post>
    where
        F: FnMut(&Post) -> bool,
    {
        self.state.lock().posts.list(predicate)
    }

    /// All posts written by the given user
    pub fn posts_by_author(&self, author_id: u64) -> Vec<Post> {
        self.filter_posts(|p| p.author_id == author_id)
    }

    /// Delete a post, renumbering every post after it
    ///
    /// Deleting from an empty collection, or an id with no record, is a
    /// no-op. Returns the removed post.
    pub fn delete_post(&self, id: u64) -> Option<Post> {
        self.state.lock().posts.delete(id)
    }

    /// Number of stored posts
    pub fn post_count(&self) -> usize {
        self.state.lock().posts.len()
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Insert a new user (id `0`) or replace an existing one
    ///
    /// Email uniqueness is not checked; see [`find_user_by_email`](Self::find_user_by_email).
    pub fn insert_user(&self, user: User) -> Result<User> {
        self.state.lock().users.insert(user)
    }

    /// Get a user by id
    pub fn get_user(&self, id: u64) -> Result<User> {
        self.state
            .lock()
            .users
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound {
                collection: CollectionKind::Users,
                id,
            })
    }

    /// All users in id order
    pub fn list_users(&self) -> Vec<User> {
        self.state.lock().users.list(|_| true)
    }

    /// Users matching the predicate, in id order
    ///
    /// The predicate runs under the store lock and must not call back into
    /// the store.
    pub fn filter_users<F>(&self, predicate: F) -> Vec<User>
    where
        F: FnMut(&User) -> bool,
    {
        self.state.lock().users.list(predicate)
    }

    /// First user registered with the given email
    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        let state = self.state.lock();
        state
            .users
            .records()
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    /// User holding the given refresh secret
    pub fn find_user_by_refresh_secret(&self, secret: &str) -> Option<User> {
        if secret.is_empty() {
            return None;
        }
        let state = self.state.lock();
        state
            .users
            .records()
            .iter()
            .find(|u| u.refresh_secret.as_deref() == Some(secret))
            .cloned()
    }

    /// Delete a user with the same renumbering rules as posts
    ///
    /// Posts keep their `author_id`; nothing cascades.
    pub fn delete_user(&self, id: u64) -> Option<User> {
        self.state.lock().users.delete(id)
    }

    /// Number of stored users
    pub fn user_count(&self) -> usize {
        self.state.lock().users.len()
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Serialize the whole store
    ///
    /// The lock is held until the buffer is complete, so the snapshot never
    /// mixes states from before and after a concurrent mutation.
    pub fn snapshot_now(&self) -> Result<Bytes> {
        let state = self.state.lock();
        let bytes = snapshot::encode(&SnapshotRef {
            posts: state.posts.records(),
            users: state.users.records(),
        })?;
        drop(state);
        Ok(Bytes::from(bytes))
    }

    /// Replace the whole store with a serialized snapshot
    ///
    /// The bytes are decoded before the lock is taken; on a decode error the
    /// current state is left untouched.
    pub fn restore(&self, bytes: &[u8]) -> Result<()> {
        let document = snapshot::decode(bytes)?;
        let fresh = StoreState::from_document(document);
        *self.state.lock() = fresh;
        Ok(())
    }

    /// Current id counters of both tables
    pub fn counters(&self) -> Counters {
        let state = self.state.lock();
        Counters {
            posts: state.posts.counter(),
            users: state.users.counter(),
        }
    }
}
