//! In-memory user store.
//!
//! [`UserStore`] is the only owner of the user collection. Every operation
//! takes the lock once and performs its check-compute-mutate sequence inside
//! that critical section, so concurrent creates can never hand out the same
//! id or both pass the duplicate-email check.

use crate::user::{NewUser, User};
use chrono::Utc;
use parking_lot::RwLock;
use thiserror::Error;

/// Failures reported by [`UserStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No user has this id.
    #[error("user {id} not found")]
    NotFound {
        /// The id that was looked up.
        id: i64,
    },

    /// Another user already owns this email.
    #[error("email {email} is already in use")]
    DuplicateEmail {
        /// The conflicting email.
        email: String,
    },
}

/// Thread-safe, insertion-ordered collection of users.
///
/// Reads share the lock; mutations take it exclusively.
///
/// # Example
///
/// ```
/// use roster_core::{NewUser, UserStore};
///
/// let store = UserStore::with_seed_data();
/// let ann = store.create(NewUser::new("Ann", "ann@x.com", "User")).unwrap();
/// assert_eq!(ann.id, 3);
/// ```
#[derive(Debug, Default)]
pub struct UserStore {
    users: RwLock<Vec<User>>,
}

impl UserStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the two default users.
    #[must_use]
    pub fn with_seed_data() -> Self {
        let now = Utc::now();
        let users = vec![
            User {
                id: 1,
                name: "John Doe".to_string(),
                email: "john@example.com".to_string(),
                role: "Admin".to_string(),
                created_at: now,
            },
            User {
                id: 2,
                name: "Jane Smith".to_string(),
                email: "jane@example.com".to_string(),
                role: "User".to_string(),
                created_at: now,
            },
        ];
        Self {
            users: RwLock::new(users),
        }
    }

    /// Returns a snapshot of all users in insertion order.
    pub fn list(&self) -> Vec<User> {
        self.users.read().clone()
    }

    /// Returns the user with this id.
    pub fn get(&self, id: i64) -> Result<User, StoreError> {
        self.users
            .read()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }

    /// Inserts a new user, assigning `max(id) + 1` (or 1) and the creation
    /// timestamp.
    pub fn create(&self, candidate: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write();

        if users.iter().any(|u| u.email == candidate.email) {
            return Err(StoreError::DuplicateEmail {
                email: candidate.email,
            });
        }

        let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let user = User {
            id,
            name: candidate.name,
            email: candidate.email,
            role: candidate.role,
            created_at: Utc::now(),
        };
        users.push(user.clone());

        tracing::debug!(user_id = id, "user created");
        Ok(user)
    }

    /// Overwrites name, email and role of an existing user.
    ///
    /// A missing id wins over a conflicting email.
    pub fn update(&self, id: i64, patch: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write();

        let index = users
            .iter()
            .position(|u| u.id == id)
            .ok_or(StoreError::NotFound { id })?;

        if users.iter().any(|u| u.id != id && u.email == patch.email) {
            return Err(StoreError::DuplicateEmail { email: patch.email });
        }

        let user = &mut users[index];
        user.name = patch.name;
        user.email = patch.email;
        user.role = patch.role;

        tracing::debug!(user_id = id, "user updated");
        Ok(user.clone())
    }

    /// Removes the user with this id.
    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut users = self.users.write();
        let index = users
            .iter()
            .position(|u| u.id == id)
            .ok_or(StoreError::NotFound { id })?;
        users.remove(index);

        tracing::debug!(user_id = id, "user deleted");
        Ok(())
    }

    /// Returns the number of users.
    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    /// Returns `true` if the store holds no users.
    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}
