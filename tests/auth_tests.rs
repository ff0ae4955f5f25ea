use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::{tempdir, TempDir};

use taskboard::auth::{AuthError, IdentityProvider, LocalIdentityProvider, SessionHub, User};
use taskboard::commands::require_user;
use taskboard::error::BoardError;

fn provider(dir: &TempDir) -> LocalIdentityProvider {
    LocalIdentityProvider::new(dir.path().join("accounts.json"), dir.path().join("session.json")).unwrap()
}

fn user(email: &str) -> User {
    User {
        uid: email.to_string(),
        email: email.to_string(),
        provider: "password".into(),
    }
}

#[tokio::test]
async fn test_sign_up_starts_session() {
    let dir = tempdir().unwrap();
    let identity = provider(&dir);
    assert!(identity.current_user().is_none());

    let user = identity.sign_up("  Me@Example.com ", "secret").await.unwrap();

    assert_eq!(user.email, "me@example.com");
    assert_eq!(user.provider, "password");
    assert_eq!(identity.current_user(), Some(user));
}

#[tokio::test]
async fn test_sign_up_rejects_bad_input() {
    let dir = tempdir().unwrap();
    let identity = provider(&dir);

    assert!(matches!(
        identity.sign_up("not-an-email", "secret").await,
        Err(AuthError::InvalidEmail(_))
    ));
    assert!(matches!(
        identity.sign_up("me@example.com", "").await,
        Err(AuthError::EmptyPassword)
    ));
    identity.sign_up("me@example.com", "secret").await.unwrap();
    assert!(matches!(
        identity.sign_up("ME@example.com", "other").await,
        Err(AuthError::EmailInUse(_))
    ));
}

#[tokio::test]
async fn test_sign_in_checks_password() {
    let dir = tempdir().unwrap();
    let identity = provider(&dir);
    let created = identity.sign_up("me@example.com", "secret").await.unwrap();
    identity.sign_out().await.unwrap();

    assert!(matches!(
        identity.sign_in("me@example.com", "wrong").await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(identity.current_user().is_none());

    let signed_in = identity.sign_in("me@example.com", "secret").await.unwrap();
    assert_eq!(signed_in.uid, created.uid);
}

#[tokio::test]
async fn test_session_survives_restart() {
    let dir = tempdir().unwrap();
    let user = provider(&dir).sign_up("me@example.com", "secret").await.unwrap();

    assert_eq!(provider(&dir).current_user(), Some(user));
}

#[tokio::test]
async fn test_sign_out_clears_session_file() {
    let dir = tempdir().unwrap();
    let identity = provider(&dir);
    identity.sign_up("me@example.com", "secret").await.unwrap();

    identity.sign_out().await.unwrap();

    assert!(identity.current_user().is_none());
    assert!(provider(&dir).current_user().is_none());
    // Signing out twice is harmless.
    identity.sign_out().await.unwrap();
}

#[tokio::test]
async fn test_federated_sign_in() {
    let dir = tempdir().unwrap();
    let identity = provider(&dir);
    let user = identity.sign_in_with_federated_provider().await.unwrap();
    assert_eq!(user.provider, "federated");
    assert_eq!(identity.current_user(), Some(user));
}

#[tokio::test]
async fn test_password_reset_needs_known_account() {
    let dir = tempdir().unwrap();
    let identity = provider(&dir);
    assert!(matches!(
        identity.send_password_reset("nobody@example.com").await,
        Err(AuthError::UnknownAccount(_))
    ));
    identity.sign_up("me@example.com", "secret").await.unwrap();
    identity.send_password_reset("me@example.com").await.unwrap();
}

#[tokio::test]
async fn test_observer_sees_sign_in_and_out() {
    let dir = tempdir().unwrap();
    let identity = provider(&dir);
    let seen: Arc<Mutex<Vec<Option<String>>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&seen);
    let subscription = identity.observe_session(Arc::new(move |user: Option<&User>| {
        sink.lock().push(user.map(|u| u.email.clone()));
    }));
    identity.sign_up("me@example.com", "secret").await.unwrap();
    identity.sign_out().await.unwrap();
    subscription.unsubscribe();
    identity.sign_in("me@example.com", "secret").await.unwrap();

    assert_eq!(
        *seen.lock(),
        vec![None, Some("me@example.com".to_string()), None]
    );
}

#[test]
fn test_dropping_subscription_detaches_observer() {
    let hub = SessionHub::new(None);
    let count = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&count);
    let subscription = hub.subscribe(Arc::new(move |_: Option<&User>| {
        *counter.lock() += 1;
    }));
    assert_eq!(hub.observer_count(), 1);
    assert_eq!(*count.lock(), 1);

    hub.set(Some(user("a@example.com")));
    assert_eq!(*count.lock(), 2);

    drop(subscription);
    assert_eq!(hub.observer_count(), 0);
    hub.set(None);
    assert_eq!(*count.lock(), 2);
}

#[test]
fn test_observer_may_read_session_during_callback() {
    let hub = SessionHub::new(None);
    let reader = hub.clone();
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    let _subscription = hub.subscribe(Arc::new(move |_: Option<&User>| {
        *sink.lock() = reader.current();
    }));

    hub.set(Some(user("a@example.com")));

    assert_eq!(seen.lock().clone(), Some(user("a@example.com")));
}

#[tokio::test]
async fn test_board_commands_require_a_user() {
    let dir = tempdir().unwrap();
    let identity = provider(&dir);
    assert!(matches!(
        require_user(&identity),
        Err(BoardError::Auth(AuthError::NotSignedIn))
    ));
    identity.sign_up("me@example.com", "secret").await.unwrap();
    assert!(require_user(&identity).is_ok());
}
