//! Process-wide authentication state.
//!
//! The session is derived entirely from the bearer token in the credential
//! slot. See [`SessionReducer`] for the lifecycle.

mod reducer;
mod types;

pub use reducer::{SessionEnvironment, SessionReducer};
pub use types::{Session, SessionAction, SessionPhase};
