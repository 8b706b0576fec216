//! Session lifecycle through the `App` facade with in-memory providers.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use std::sync::Arc;

use libris_client::error::{ClientError, ServiceError, ValidationError};
use libris_client::guard::{Access, GuardOutcome, ROLE_ADMIN};
use libris_client::mocks::{
    MockAuthService, MockCommentService, MockCredentialStore, MockFavoritesService,
    RecordingNavigator, RecordingNotifier, claims_for, token_for,
};
use libris_client::providers::NoticeLevel;
use libris_client::{App, AppContext, LoginCredentials, Registration, Route};
use libris_testing::{init_test_tracing, test_clock};

/// 2025-01-01T00:00:00Z, the instant of `test_clock()`
const NOW: i64 = 1_735_689_600;
const IN_AN_HOUR: i64 = NOW + 3_600;

type TestApp = App<MockAuthService, MockFavoritesService, MockCommentService>;

struct Harness {
    app: TestApp,
    credentials: MockCredentialStore,
    navigator: RecordingNavigator,
    notifier: RecordingNotifier,
    auth: MockAuthService,
    favorites: MockFavoritesService,
}

fn harness(auth: MockAuthService, favorites: MockFavoritesService) -> Harness {
    init_test_tracing();
    let credentials = MockCredentialStore::new();
    let navigator = RecordingNavigator::new();
    let notifier = RecordingNotifier::new();

    let context = AppContext {
        clock: Arc::new(test_clock()),
        credentials: Arc::new(credentials.clone()),
        navigator: Arc::new(navigator.clone()),
        notifier: Arc::new(notifier.clone()),
    };
    let app = App::new(context, auth.clone(), favorites.clone(), MockCommentService::new());

    Harness { app, credentials, navigator, notifier, auth, favorites }
}

fn ana() -> MockAuthService {
    let mut claims = claims_for("u-ana", &["USER"], IN_AN_HOUR);
    claims.name = Some("Ana".into());
    MockAuthService::new().with_user("ana@example.org", "Secret1!", claims)
}

#[tokio::test]
async fn test_cold_start_without_credential() {
    let h = harness(MockAuthService::new(), MockFavoritesService::with_records(&["b1"]));
    assert!(h.app.session().await.is_loading);

    h.app.start().await.unwrap();

    let session = h.app.session().await;
    assert!(!session.is_loading);
    assert!(!session.is_authenticated);

    let favorites = h.app.favorites().await;
    assert!(favorites.ids.is_empty());
    assert!(!favorites.is_loading);
    assert_eq!(h.favorites.list_calls(), 0);
    assert!(h.navigator.routes().is_empty());
}

#[tokio::test]
async fn test_start_restores_stored_credential() {
    let favorites = MockFavoritesService::with_records(&["b1", "b2", "b1"]);
    let h = harness(MockAuthService::new(), favorites);
    h.credentials.set(&token_for("u-1", &["USER", ROLE_ADMIN], IN_AN_HOUR));

    h.app.start().await.unwrap();

    let session = h.app.session().await;
    assert!(session.is_authenticated);
    assert_eq!(session.user_id.as_deref(), Some("u-1"));
    assert!(session.has_role(ROLE_ADMIN));

    let favorites = h.app.favorites().await;
    assert_eq!(favorites.count(), 2);
    assert_eq!(favorites.scope.as_deref(), Some("u-1"));
}

#[tokio::test]
async fn test_start_discards_expired_credential() {
    let h = harness(MockAuthService::new(), MockFavoritesService::new());
    h.credentials.set(&token_for("u-1", &["USER"], NOW - 1));

    h.app.start().await.unwrap();

    assert!(!h.app.session().await.is_authenticated);
    assert_eq!(h.credentials.get(), None);
}

#[tokio::test]
async fn test_start_discards_garbage_credential() {
    let h = harness(MockAuthService::new(), MockFavoritesService::new());
    h.credentials.set("not-a-token");

    h.app.start().await.unwrap();

    assert!(!h.app.session().await.is_authenticated);
    assert_eq!(h.credentials.get(), None);
}

#[tokio::test]
async fn test_login_stores_token_and_loads_favorites() {
    let h = harness(ana(), MockFavoritesService::with_records(&["b7"]));
    h.app.start().await.unwrap();

    let session = h
        .app
        .login(&LoginCredentials::new("ana@example.org", "Secret1!"))
        .await
        .unwrap();

    assert!(session.is_authenticated);
    assert_eq!(session.user_name.as_deref(), Some("Ana"));
    assert!(h.credentials.get().is_some());
    assert_eq!(h.navigator.last(), Some(Route::Home));
    assert!(h.app.is_favorite(&"b7".into()).await);
}

#[tokio::test]
async fn test_login_with_wrong_password_is_rejected() {
    let h = harness(ana(), MockFavoritesService::new());
    h.app.start().await.unwrap();

    let result = h.app.login(&LoginCredentials::new("ana@example.org", "Wrong1!x")).await;

    assert!(matches!(result, Err(ClientError::Service(ServiceError::Unauthorized))));
    assert!(!h.app.session().await.is_authenticated);
    assert_eq!(h.credentials.get(), None);
    let notices = h.notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_login_validates_before_calling_backend() {
    let h = harness(ana(), MockFavoritesService::new());
    h.app.start().await.unwrap();

    let result = h.app.login(&LoginCredentials::new("ana.example.org", "Secret1!")).await;

    assert!(matches!(result, Err(ClientError::Validation(ValidationError::InvalidEmail))));
    assert!(h.notifier.notices().is_empty());
}

#[tokio::test]
async fn test_logout_clears_everything() {
    let h = harness(ana(), MockFavoritesService::with_records(&["b1"]));
    h.app.start().await.unwrap();
    h.app.login(&LoginCredentials::new("ana@example.org", "Secret1!")).await.unwrap();

    h.app.logout().await.unwrap();

    assert!(!h.app.session().await.is_authenticated);
    assert_eq!(h.credentials.get(), None);
    assert!(h.app.favorites().await.ids.is_empty());
    assert_eq!(h.navigator.last(), Some(Route::Login));
    assert_eq!(h.auth.logout_calls(), 1);
}

#[tokio::test]
async fn test_logout_while_signed_out_skips_backend() {
    let h = harness(ana(), MockFavoritesService::new());
    h.app.start().await.unwrap();

    h.app.logout().await.unwrap();

    assert_eq!(h.auth.logout_calls(), 0);
    assert_eq!(h.navigator.last(), Some(Route::Login));
}

#[tokio::test]
async fn test_register_then_login() {
    let h = harness(MockAuthService::new(), MockFavoritesService::new());
    h.app.start().await.unwrap();

    let registration = Registration::new("Rui Costa", "rui@example.org", "Passw0rd!");
    h.app.register(&registration).await.unwrap();
    assert!(!h.app.session().await.is_authenticated);

    let again = h.app.register(&registration).await;
    assert!(matches!(again, Err(ClientError::Service(ServiceError::Conflict(_)))));

    let session = h
        .app
        .login(&LoginCredentials::new("rui@example.org", "Passw0rd!"))
        .await
        .unwrap();
    assert_eq!(session.user_name.as_deref(), Some("Rui Costa"));
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let h = harness(MockAuthService::new(), MockFavoritesService::new());
    h.app.start().await.unwrap();

    let result = h
        .app
        .register(&Registration::new("Rui Costa", "rui@example.org", "password"))
        .await;

    assert!(matches!(result, Err(ClientError::Validation(ValidationError::WeakPassword))));
}

#[tokio::test]
async fn test_guard_waits_for_initialization() {
    let h = harness(MockAuthService::new(), MockFavoritesService::new());
    h.credentials.set(&token_for("u-1", &["USER"], IN_AN_HOUR));

    let mut admin = h.app.guard(Access::admin());
    let mut member = h.app.guard(Access::Authenticated);
    assert_eq!(admin.current(), GuardOutcome::Pending);
    assert_eq!(member.current(), GuardOutcome::Pending);

    h.app.start().await.unwrap();

    assert_eq!(admin.resolved().await, Some(GuardOutcome::Redirect(Route::Forbidden)));
    assert_eq!(member.resolved().await, Some(GuardOutcome::Allow));

    h.app.logout().await.unwrap();
    assert_eq!(member.next_change().await, Some(GuardOutcome::Redirect(Route::Login)));
}

#[tokio::test]
async fn test_session_watch_never_outruns_favorites() {
    let h = harness(ana(), MockFavoritesService::with_records(&["b1"]));
    h.app.start().await.unwrap();
    h.app.login(&LoginCredentials::new("ana@example.org", "Secret1!")).await.unwrap();
    let mut session = h.app.watch_session();
    assert!(session.borrow_and_update().is_authenticated);

    h.app.logout().await.unwrap();

    assert!(session.has_changed().unwrap());
    assert!(!session.borrow_and_update().is_authenticated);
    let favorites = h.app.watch_favorites().borrow().clone();
    assert!(favorites.ids.is_empty());
    assert_eq!(favorites.scope, None);
}

#[tokio::test]
async fn test_rejected_credential_forces_logout() {
    let favorites = MockFavoritesService::new();
    favorites.fail_list(ServiceError::Unauthorized);
    let h = harness(MockAuthService::new(), favorites);
    h.credentials.set(&token_for("u-1", &["USER"], IN_AN_HOUR));

    h.app.start().await.unwrap();

    assert!(!h.app.session().await.is_authenticated);
    assert_eq!(h.credentials.get(), None);
    assert_eq!(h.navigator.last(), Some(Route::Login));
    assert!(h.app.favorites().await.ids.is_empty());
}

#[tokio::test]
async fn test_handle_service_error_ignores_other_failures() {
    let h = harness(MockAuthService::new(), MockFavoritesService::new());
    h.credentials.set(&token_for("u-1", &["USER"], IN_AN_HOUR));
    h.app.start().await.unwrap();

    let ended = h
        .app
        .handle_service_error(&ServiceError::Http { status: 404, message: "missing".into() })
        .await
        .unwrap();

    assert!(!ended);
    assert!(h.app.session().await.is_authenticated);

    assert!(h.app.handle_service_error(&ServiceError::Unauthorized).await.unwrap());
    assert!(!h.app.session().await.is_authenticated);
}
