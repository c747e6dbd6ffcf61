//! Pure session and data state for the app shell.
//!
//! # Design
//! Each container is a plain struct plus a closed action enum and a
//! `reduce(&State, Action) -> State` function. Reducers never touch the
//! network; callers run a request through `GlucoVisionClient` and feed
//! the outcome back in as an action.

pub mod auth;
pub mod glucose;

pub use auth::{AuthAction, AuthState};
pub use glucose::{GlucoseAction, GlucoseState};
