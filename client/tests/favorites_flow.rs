//! Favorites reconciliation through the `App` facade.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use std::sync::Arc;

use libris_client::error::ServiceError;
use libris_client::favorites::MutationPhase;
use libris_client::mocks::{
    MockAuthService, MockCommentService, MockCredentialStore, MockFavoritesService,
    RecordingNavigator, RecordingNotifier, claims_for,
};
use libris_client::providers::{Notice, NoticeLevel};
use libris_client::{App, AppContext, ItemId, LoginCredentials, Route};
use libris_testing::{init_test_tracing, test_clock};

const IN_AN_HOUR: i64 = 1_735_689_600 + 3_600;

type TestApp = App<MockAuthService, MockFavoritesService, MockCommentService>;

fn accounts() -> MockAuthService {
    MockAuthService::new()
        .with_user("ana@example.org", "Secret1!", claims_for("u-ana", &["USER"], IN_AN_HOUR))
        .with_user("rui@example.org", "Secret2!", claims_for("u-rui", &["USER"], IN_AN_HOUR))
}

async fn signed_in(
    favorites: &MockFavoritesService,
    notifier: &RecordingNotifier,
) -> (TestApp, RecordingNavigator) {
    init_test_tracing();
    let navigator = RecordingNavigator::new();
    let context = AppContext {
        clock: Arc::new(test_clock()),
        credentials: Arc::new(MockCredentialStore::new()),
        navigator: Arc::new(navigator.clone()),
        notifier: Arc::new(notifier.clone()),
    };
    let app = App::new(context, accounts(), favorites.clone(), MockCommentService::new());
    app.start().await.unwrap();
    app.login(&LoginCredentials::new("ana@example.org", "Secret1!")).await.unwrap();
    (app, navigator)
}

/// Notices after the login greeting.
fn favorite_notices(notifier: &RecordingNotifier) -> Vec<Notice> {
    notifier.notices().into_iter().skip(1).collect()
}

#[tokio::test]
async fn test_add_and_remove() {
    let favorites = MockFavoritesService::new();
    let notifier = RecordingNotifier::new();
    let (app, _) = signed_in(&favorites, &notifier).await;
    let book = ItemId::new("b1");

    app.toggle_favorite(book.clone(), true).await.unwrap();
    assert!(app.is_favorite(&book).await);
    assert!(favorites.remote_contains("b1"));

    app.toggle_favorite(book.clone(), false).await.unwrap();
    assert!(!app.is_favorite(&book).await);
    assert!(!favorites.remote_contains("b1"));

    assert_eq!(
        favorite_notices(&notifier),
        vec![Notice::success("Added to favorites"), Notice::success("Removed from favorites")]
    );
}

#[tokio::test]
async fn test_adding_existing_favorite_is_a_success() {
    let favorites = MockFavoritesService::new();
    let notifier = RecordingNotifier::new();
    let (app, _) = signed_in(&favorites, &notifier).await;

    // Present remotely, unknown locally
    favorites.set_records(&["b1"]);
    app.toggle_favorite(ItemId::new("b1"), true).await.unwrap();

    let state = app.favorites().await;
    assert!(state.contains(&ItemId::new("b1")));
    assert_eq!(state.pending[&ItemId::new("b1")].phase, MutationPhase::Confirmed);
    assert_eq!(
        favorite_notices(&notifier),
        vec![Notice::success("This book is already in your favorites")]
    );
}

#[tokio::test]
async fn test_failed_add_rolls_back() {
    let favorites = MockFavoritesService::new();
    let notifier = RecordingNotifier::new();
    let (app, _) = signed_in(&favorites, &notifier).await;

    favorites.fail_next_add(ServiceError::Network("connection reset".into()));
    app.toggle_favorite(ItemId::new("b1"), true).await.unwrap();

    let state = app.favorites().await;
    assert!(!state.contains(&ItemId::new("b1")));
    assert_eq!(state.pending[&ItemId::new("b1")].phase, MutationPhase::RolledBack);
    assert!(state.last_error.is_some());

    let notices = favorite_notices(&notifier);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_failed_remove_restores_item() {
    let favorites = MockFavoritesService::with_records(&["b1"]);
    let notifier = RecordingNotifier::new();
    let (app, _) = signed_in(&favorites, &notifier).await;
    assert!(app.is_favorite(&ItemId::new("b1")).await);

    favorites.fail_next_remove(ServiceError::Http { status: 400, message: "nope".into() });
    app.toggle_favorite(ItemId::new("b1"), false).await.unwrap();

    assert!(app.is_favorite(&ItemId::new("b1")).await);
    assert!(favorites.remote_contains("b1"));
}

#[tokio::test]
async fn test_favorites_watch_sees_settled_toggle() {
    let favorites = MockFavoritesService::new();
    let notifier = RecordingNotifier::new();
    let (app, _) = signed_in(&favorites, &notifier).await;
    let mut watch = app.watch_favorites();
    watch.mark_unchanged();

    app.toggle_favorite(ItemId::new("b9"), true).await.unwrap();

    assert!(watch.has_changed().unwrap());
    let state = watch.borrow_and_update().clone();
    assert!(state.contains(&ItemId::new("b9")));
    assert_eq!(state.in_flight(), 0);
    assert_eq!(state.pending[&ItemId::new("b9")].phase, MutationPhase::Confirmed);
}

#[tokio::test]
async fn test_double_add_with_both_failing_leaves_item_out() {
    let favorites = MockFavoritesService::new();
    let notifier = RecordingNotifier::new();
    let (app, _) = signed_in(&favorites, &notifier).await;
    favorites.fail_next_add(ServiceError::Server { status: 500 });
    favorites.fail_next_add(ServiceError::Server { status: 500 });

    let book = ItemId::new("b1");
    let (first, second) = tokio::join!(
        app.toggle_favorite(book.clone(), true),
        app.toggle_favorite(book.clone(), true),
    );
    first.unwrap();
    second.unwrap();

    assert!(!app.is_favorite(&book).await);
    assert!(!favorites.remote_contains("b1"));
}

#[tokio::test]
async fn test_favorites_follow_the_signed_in_user() {
    let favorites = MockFavoritesService::with_records(&["ana-1", "ana-2"]);
    let notifier = RecordingNotifier::new();
    let (app, _) = signed_in(&favorites, &notifier).await;
    assert_eq!(app.favorites().await.count(), 2);

    app.logout().await.unwrap();
    assert_eq!(app.favorites().await.count(), 0);
    assert_eq!(app.favorites().await.scope, None);

    favorites.set_records(&["rui-1"]);
    app.login(&LoginCredentials::new("rui@example.org", "Secret2!")).await.unwrap();

    let state = app.favorites().await;
    assert_eq!(state.scope.as_deref(), Some("u-rui"));
    assert_eq!(state.ids.iter().map(ItemId::as_str).collect::<Vec<_>>(), ["rui-1"]);
}

#[tokio::test]
async fn test_toggle_rejected_credential_signs_out() {
    let favorites = MockFavoritesService::new();
    let notifier = RecordingNotifier::new();
    let (app, navigator) = signed_in(&favorites, &notifier).await;

    favorites.fail_next_add(ServiceError::Unauthorized);
    app.toggle_favorite(ItemId::new("b1"), true).await.unwrap();

    assert!(!app.session().await.is_authenticated);
    assert!(app.favorites().await.ids.is_empty());
    assert_eq!(navigator.last(), Some(Route::Login));
}

#[tokio::test]
async fn test_refetch_reconciles_with_backend() {
    let favorites = MockFavoritesService::new();
    let notifier = RecordingNotifier::new();
    let (app, _) = signed_in(&favorites, &notifier).await;

    favorites.set_records(&["b3", "b3", "b4"]);
    app.refetch_favorites().await.unwrap();

    let state = app.favorites().await;
    assert_eq!(state.count(), 2);
    assert!(!state.is_loading);
}
