//! Session identity.
//!
//! Authentication itself belongs to the hosted platform; this crate only
//! needs to know who is signed in right now. [`AuthProvider`] is that seam.
//! [`SessionAuth`] is the provided implementation: an interior-mutable slot
//! the embedding shell updates as the platform session changes. Every
//! component receives its provider through [`SessionContext`] — there is no
//! ambient global user.
//!
//! [`SessionContext`]: crate::SessionContext

use std::sync::RwLock;

use uuid::Uuid;

pub mod roles;

pub trait AuthProvider: Send + Sync {
    /// The signed-in user, or `None` when nobody is.
    fn current_user(&self) -> Option<Uuid>;
}

#[derive(Debug, Default)]
pub struct SessionAuth {
    user: RwLock<Option<Uuid>>,
}

impl SessionAuth {
    /// Start signed out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `user` already signed in.
    pub fn signed_in(user: Uuid) -> Self {
        Self {
            user: RwLock::new(Some(user)),
        }
    }

    pub fn sign_in(&self, user: Uuid) {
        *self.user.write().unwrap_or_else(|e| e.into_inner()) = Some(user);
    }

    pub fn sign_out(&self) {
        *self.user.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl AuthProvider for SessionAuth {
    fn current_user(&self) -> Option<Uuid> {
        *self.user.read().unwrap_or_else(|e| e.into_inner())
    }
}
