//! Identity provider seam.
//!
//! The board only needs to know whether someone is signed in. Everything
//! else about accounts sits behind [`IdentityProvider`]; the bundled
//! [`LocalIdentityProvider`] keeps accounts in the data directory so the
//! terminal client works without an external service.

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::info;

use crate::storage::{accounts_path, read_json, remove_file, session_path, write_json};

/// Errors from sign-up, sign-in and friends.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("Password must not be empty")]
    EmptyPassword,

    #[error("An account for {0} already exists")]
    EmailInUse(String),

    #[error("Wrong email or password")]
    InvalidCredentials,

    #[error("No account for {0}")]
    UnknownAccount(String),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Account storage failed: {0}")]
    Storage(#[from] io::Error),
}

/// The signed-in user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub uid: String,
    pub email: String,
    /// How the user signed in (`password` or `federated`).
    pub provider: String,
}

pub type SessionCallback = Arc<dyn Fn(Option<&User>) + Send + Sync>;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates an account and signs it in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError>;

    async fn sign_in_with_federated_provider(&self) -> Result<User, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    fn current_user(&self) -> Option<User>;

    /// Calls `callback` now with the current user, and again on every
    /// sign-in or sign-out until the subscription is dropped.
    fn observe_session(&self, callback: SessionCallback) -> SessionSubscription;
}

#[derive(Default)]
struct HubState {
    current: Option<User>,
    next_id: u64,
    observers: Vec<(u64, SessionCallback)>,
}

/// Current user plus the observers waiting for it to change.
#[derive(Clone, Default)]
pub struct SessionHub {
    inner: Arc<Mutex<HubState>>,
}

impl SessionHub {
    pub fn new(current: Option<User>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HubState {
                current,
                ..HubState::default()
            })),
        }
    }

    pub fn current(&self) -> Option<User> {
        self.inner.lock().current.clone()
    }

    /// Replaces the current user and notifies every observer.
    pub fn set(&self, user: Option<User>) {
        let observers: Vec<SessionCallback> = {
            let mut state = self.inner.lock();
            state.current = user.clone();
            state.observers.iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };
        // Called without the lock so observers may read the session.
        for cb in observers {
            cb(user.as_ref());
        }
    }

    pub fn subscribe(&self, callback: SessionCallback) -> SessionSubscription {
        let (id, current) = {
            let mut state = self.inner.lock();
            let id = state.next_id;
            state.next_id += 1;
            state.observers.push((id, Arc::clone(&callback)));
            (id, state.current.clone())
        };
        callback(current.as_ref());
        SessionSubscription {
            hub: Arc::downgrade(&self.inner),
            id,
        }
    }

    pub fn observer_count(&self) -> usize {
        self.inner.lock().observers.len()
    }
}

/// Keeps a session observer attached. Dropping it detaches the observer.
pub struct SessionSubscription {
    hub: Weak<Mutex<HubState>>,
    id: u64,
}

impl SessionSubscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            inner.lock().observers.retain(|(id, _)| *id != self.id);
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct Account {
    uid: String,
    email: String,
    password_sha256: String,
}

const FEDERATED_UID: &str = "federated-local";

fn password_digest(email: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AuthError::InvalidEmail(email)),
    }
}

/// Accounts and the current session stored as JSON files.
pub struct LocalIdentityProvider {
    accounts_path: PathBuf,
    session_path: PathBuf,
    hub: SessionHub,
}

impl LocalIdentityProvider {
    /// Opens the provider, restoring a session saved by an earlier run.
    pub fn new(accounts_path: impl Into<PathBuf>, session_path: impl Into<PathBuf>) -> Result<Self, AuthError> {
        let session_path = session_path.into();
        let current: Option<User> = read_json(&session_path)?;
        Ok(Self {
            accounts_path: accounts_path.into(),
            session_path,
            hub: SessionHub::new(current),
        })
    }

    /// Uses the files in the data directory.
    pub fn open_default() -> Result<Self, AuthError> {
        Self::new(accounts_path(), session_path())
    }

    fn accounts(&self) -> Result<Vec<Account>, AuthError> {
        Ok(read_json(&self.accounts_path)?.unwrap_or_default())
    }

    fn start_session(&self, user: User) -> Result<User, AuthError> {
        write_json(&self.session_path, &user)?;
        self.hub.set(Some(user.clone()));
        info!(email = %user.email, provider = %user.provider, "signed in");
        Ok(user)
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }
        let mut accounts = self.accounts()?;
        if accounts.iter().any(|a| a.email == email) {
            return Err(AuthError::EmailInUse(email));
        }
        let account = Account {
            uid: uuid::Uuid::new_v4().simple().to_string(),
            password_sha256: password_digest(&email, password),
            email,
        };
        let user = User {
            uid: account.uid.clone(),
            email: account.email.clone(),
            provider: "password".to_string(),
        };
        accounts.push(account);
        write_json(&self.accounts_path, &accounts)?;
        self.start_session(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = normalize_email(email)?;
        let digest = password_digest(&email, password);
        let account = self
            .accounts()?
            .into_iter()
            .find(|a| a.email == email && a.password_sha256 == digest)
            .ok_or(AuthError::InvalidCredentials)?;
        self.start_session(User {
            uid: account.uid,
            email: account.email,
            provider: "password".to_string(),
        })
    }

    async fn sign_in_with_federated_provider(&self) -> Result<User, AuthError> {
        self.start_session(User {
            uid: FEDERATED_UID.to_string(),
            email: "federated@localhost".to_string(),
            provider: "federated".to_string(),
        })
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        remove_file(&self.session_path)?;
        self.hub.set(None);
        info!("signed out");
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let email = normalize_email(email)?;
        if !self.accounts()?.iter().any(|a| a.email == email) {
            return Err(AuthError::UnknownAccount(email));
        }
        info!(%email, "password reset requested");
        Ok(())
    }

    fn current_user(&self) -> Option<User> {
        self.hub.current()
    }

    fn observe_session(&self, callback: SessionCallback) -> SessionSubscription {
        self.hub.subscribe(callback)
    }
}
