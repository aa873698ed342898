/// State management module
///
/// This module handles all application state, including:
/// - The session state machine and its transitions (session.rs)
/// - Shared data structures and the edit history (data.rs)

pub mod data;
pub mod session;

pub use data::History;
pub use session::{AppState, Effect, Session, SessionEvent};
