//! Book comments: ranking, display flattening and a reducer that keeps one
//! book's thread in sync with the backend.

pub mod ranking;
mod reducer;
mod types;

pub use ranking::{DEFAULT_MAX_INDENT, count_all, flatten_for_display, rank};
pub use reducer::{CommentsEnvironment, CommentsReducer};
pub use types::{
    Comment, CommentsAction, CommentsState, MutationKind, NewComment, RankingPolicy,
};
