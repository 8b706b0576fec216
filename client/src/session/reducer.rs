//! Session reducer.
//!
//! # State machine
//!
//! ```text
//!            Initialize
//! Loading ──────────────┬──► Authenticated ◄─┐
//!                       │        │ Logout    │ Login (valid)
//!                       │        ▼           │
//!                       └──► Unauthenticated ┘
//! ```
//!
//! `Loading` is left exactly once. `Login` and `Logout` received while still
//! loading are ignored; the [`App`](crate::app::App) always initializes
//! first.

use std::sync::Arc;

use libris_core::effect::Effect;
use libris_core::environment::Clock;
use libris_core::reducer::Reducer;
use libris_core::{smallvec, SmallVec};

use crate::providers::{CredentialStore, Navigator};
use crate::routes::Route;
use crate::token::{self, Claims};

use super::types::{Session, SessionAction};

/// Dependencies of the session reducer.
#[derive(Clone)]
pub struct SessionEnvironment {
    /// Time source for expiry checks
    pub clock: Arc<dyn Clock>,
    /// Durable credential slot
    pub credentials: Arc<dyn CredentialStore>,
    /// Navigation side effect
    pub navigator: Arc<dyn Navigator>,
}

impl SessionEnvironment {
    /// Create a session environment.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        credentials: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self { clock, credentials, navigator }
    }
}

/// Reducer owning the process-wide [`Session`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionReducer;

impl SessionReducer {
    /// Create a session reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Claims of `token` if it decodes and is unexpired.
    fn valid_claims(token: &str, env: &SessionEnvironment) -> Option<Claims> {
        match token::decode(token) {
            Ok(claims) if claims.is_valid_at(env.clock.now()) => Some(claims),
            Ok(claims) => {
                tracing::debug!(expires_at = claims.expires_at, "Credential expired");
                None
            },
            Err(error) => {
                tracing::debug!(%error, "Credential could not be decoded");
                None
            },
        }
    }

    fn clear_slot(env: &SessionEnvironment) {
        if let Err(error) = env.credentials.clear() {
            tracing::warn!(%error, "Failed to clear stored credential");
        }
    }

    fn navigate(env: &SessionEnvironment, route: Route) -> Effect<SessionAction> {
        let navigator = Arc::clone(&env.navigator);
        Effect::future(async move {
            navigator.navigate(route);
            None
        })
    }

    fn initialize(state: &mut Session, env: &SessionEnvironment) {
        let stored = match env.credentials.load() {
            Ok(stored) => stored,
            Err(error) => {
                tracing::warn!(%error, "Failed to read stored credential");
                None
            },
        };

        let claims = stored.as_deref().and_then(|token| Self::valid_claims(token, env));

        *state = match &claims {
            Some(claims) => {
                tracing::info!(user_id = %claims.subject, "Session restored");
                Session::authenticated(claims)
            },
            None => {
                if stored.is_some() {
                    Self::clear_slot(env);
                }
                tracing::info!("No active session");
                Session::unauthenticated()
            },
        };
    }

    fn logout(
        state: &mut Session,
        env: &SessionEnvironment,
    ) -> SmallVec<[Effect<SessionAction>; 4]> {
        Self::clear_slot(env);
        *state = Session::unauthenticated();
        smallvec![Self::navigate(env, Route::Login)]
    }
}

impl Reducer for SessionReducer {
    type State = Session;
    type Action = SessionAction;
    type Environment = SessionEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            SessionAction::Initialize => {
                if !state.is_loading {
                    tracing::warn!("Session already initialized, ignoring");
                    return SmallVec::new();
                }
                Self::initialize(state, env);
                SmallVec::new()
            },

            _ if state.is_loading => {
                tracing::warn!(?action, "Session not initialized, ignoring");
                SmallVec::new()
            },

            SessionAction::Login { token } => {
                if let Err(error) = env.credentials.store(&token) {
                    tracing::warn!(%error, "Failed to persist credential");
                }

                match Self::valid_claims(&token, env) {
                    Some(claims) => {
                        tracing::info!(user_id = %claims.subject, "Logged in");
                        *state = Session::authenticated(&claims);
                        smallvec![Self::navigate(env, Route::Home)]
                    },
                    None => {
                        tracing::warn!("Rejected login credential, logging out");
                        Self::logout(state, env)
                    },
                }
            },

            SessionAction::Logout => {
                tracing::info!("Logged out");
                Self::logout(state, env)
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use crate::mocks::{MockCredentialStore, RecordingNavigator, token_for};
    use libris_testing::{ReducerTest, assertions, mocks::FixedClock, test_clock};

    const NOW: i64 = 1_735_689_600; // test_clock()

    struct Fixture {
        credentials: MockCredentialStore,
        navigator: RecordingNavigator,
    }

    impl Fixture {
        fn new() -> Self {
            Self { credentials: MockCredentialStore::new(), navigator: RecordingNavigator::new() }
        }

        fn env(&self) -> SessionEnvironment {
            SessionEnvironment::new(
                Arc::new(test_clock()),
                Arc::new(self.credentials.clone()),
                Arc::new(self.navigator.clone()),
            )
        }
    }

    #[test]
    fn test_initialize_with_valid_token() {
        let fx = Fixture::new();
        fx.credentials.set(&token_for("u-1", &["ADMIN"], NOW + 3600));

        ReducerTest::new(SessionReducer::new())
            .with_env(fx.env())
            .given_state(Session::loading())
            .when_action(SessionAction::Initialize)
            .then_state(|s| {
                assert!(s.is_authenticated);
                assert!(!s.is_loading);
                assert_eq!(s.user_id.as_deref(), Some("u-1"));
                assert!(s.has_role("ADMIN"));
            })
            .then_effects(assertions::assert_no_effects)
            .run();

        assert!(fx.credentials.get().is_some());
    }

    #[test]
    fn test_initialize_with_expired_token_clears_slot() {
        let fx = Fixture::new();
        fx.credentials.set(&token_for("u-1", &[], NOW - 1));

        ReducerTest::new(SessionReducer::new())
            .with_env(fx.env())
            .given_state(Session::loading())
            .when_action(SessionAction::Initialize)
            .then_state(|s| assert_eq!(*s, Session::unauthenticated()))
            .run();

        assert_eq!(fx.credentials.get(), None);
    }

    #[test]
    fn test_initialize_with_token_expiring_now_is_rejected() {
        let fx = Fixture::new();
        fx.credentials.set(&token_for("u-1", &[], NOW));

        let mut state = Session::loading();
        let _ = SessionReducer.reduce(&mut state, SessionAction::Initialize, &fx.env());

        assert!(!state.is_authenticated);
    }

    #[test]
    fn test_initialize_with_malformed_token_clears_slot() {
        let fx = Fixture::new();
        fx.credentials.set("not-a-token");

        ReducerTest::new(SessionReducer::new())
            .with_env(fx.env())
            .given_state(Session::loading())
            .when_action(SessionAction::Initialize)
            .then_state(|s| {
                assert!(!s.is_authenticated);
                assert!(!s.is_loading);
            })
            .run();

        assert_eq!(fx.credentials.get(), None);
        assert!(fx.navigator.routes().is_empty());
    }

    #[test]
    fn test_initialize_with_empty_slot() {
        let fx = Fixture::new();

        ReducerTest::new(SessionReducer::new())
            .with_env(fx.env())
            .given_state(Session::loading())
            .when_action(SessionAction::Initialize)
            .then_state(|s| assert_eq!(*s, Session::unauthenticated()))
            .run();
    }

    #[test]
    fn test_initialize_runs_once() {
        let fx = Fixture::new();
        let env = fx.env();
        let mut state = Session::loading();
        let _ = SessionReducer.reduce(&mut state, SessionAction::Initialize, &env);

        // A credential appearing later must not be picked up by a second pass
        fx.credentials.set(&token_for("u-2", &[], NOW + 60));
        let effects = SessionReducer.reduce(&mut state, SessionAction::Initialize, &env);

        assert!(effects.is_empty());
        assert_eq!(state, Session::unauthenticated());
    }

    #[test]
    fn test_initialize_tolerates_unreadable_slot() {
        let fx = Fixture::new();
        fx.credentials.fail_io(true);

        let mut state = Session::loading();
        let _ = SessionReducer.reduce(&mut state, SessionAction::Initialize, &fx.env());

        assert_eq!(state, Session::unauthenticated());
    }

    #[test]
    fn test_login_with_valid_token() {
        let fx = Fixture::new();
        let token = token_for("u-7", &["BIBLIOTECARIO"], NOW + 60);

        ReducerTest::new(SessionReducer::new())
            .with_env(fx.env())
            .given_state(Session::unauthenticated())
            .when_action(SessionAction::Login { token: token.clone() })
            .then_state(|s| {
                assert!(s.is_authenticated);
                assert_eq!(s.user_id.as_deref(), Some("u-7"));
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();

        assert_eq!(fx.credentials.get(), Some(token));
    }

    #[tokio::test]
    async fn test_login_navigates_home() {
        let fx = Fixture::new();
        let mut state = Session::unauthenticated();
        let effects = SessionReducer.reduce(
            &mut state,
            SessionAction::Login { token: token_for("u-7", &[], NOW + 60) },
            &fx.env(),
        );

        for effect in effects {
            if let Effect::Future(fut) = effect {
                assert!(fut.await.is_none());
            }
        }
        assert_eq!(fx.navigator.routes(), vec![Route::Home]);
    }

    #[tokio::test]
    async fn test_login_with_expired_token_falls_back_to_logout() {
        let fx = Fixture::new();
        let env = SessionEnvironment::new(
            Arc::new(FixedClock::at_epoch_seconds(NOW + 120)),
            Arc::new(fx.credentials.clone()),
            Arc::new(fx.navigator.clone()),
        );
        let mut state = Session::unauthenticated();

        let effects = SessionReducer.reduce(
            &mut state,
            SessionAction::Login { token: token_for("u-7", &[], NOW + 60) },
            &env,
        );
        for effect in effects {
            if let Effect::Future(fut) = effect {
                let _ = fut.await;
            }
        }

        assert_eq!(state, Session::unauthenticated());
        assert_eq!(fx.credentials.get(), None);
        assert_eq!(fx.navigator.routes(), vec![Route::Login]);
    }

    #[test]
    fn test_login_survives_slot_write_failure() {
        let fx = Fixture::new();
        fx.credentials.fail_io(true);

        let mut state = Session::unauthenticated();
        let _ = SessionReducer.reduce(
            &mut state,
            SessionAction::Login { token: token_for("u-7", &[], NOW + 60) },
            &fx.env(),
        );

        assert!(state.is_authenticated);
    }

    #[test]
    fn test_logout_resets_session_and_slot() {
        let fx = Fixture::new();
        let token = token_for("u-1", &["ADMIN"], NOW + 60);
        fx.credentials.set(&token);
        let claims = token::decode(&token).unwrap();

        ReducerTest::new(SessionReducer::new())
            .with_env(fx.env())
            .given_state(Session::authenticated(&claims))
            .when_action(SessionAction::Logout)
            .then_state(|s| assert_eq!(*s, Session::unauthenticated()))
            .then_effects(assertions::assert_has_future_effect)
            .run();

        assert_eq!(fx.credentials.get(), None);
    }

    #[test]
    fn test_login_while_loading_is_ignored() {
        let fx = Fixture::new();

        ReducerTest::new(SessionReducer::new())
            .with_env(fx.env())
            .given_state(Session::loading())
            .when_action(SessionAction::Login { token: token_for("u-1", &[], NOW + 60) })
            .then_state(|s| assert!(s.is_loading))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_debug_redacts_token() {
        let action = SessionAction::Login { token: "secret.token.value".into() };
        assert!(!format!("{action:?}").contains("secret"));
    }
}
