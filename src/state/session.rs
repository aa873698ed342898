/// Session state machine
///
/// The whole application state lives in one `Session` value. Every user
/// action or task completion becomes a `SessionEvent`; `Session::apply`
/// either performs the transition and returns the `Effect` the shell must
/// run, or rejects the event and leaves the session untouched.

use chrono::{DateTime, Utc};
use std::fmt;

use super::data::{History, HistoryEntry};
use crate::media::EncodedImage;

/// The five application states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    #[default]
    Idle,
    Editing,
    Processing,
    Completed,
    Error,
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AppState::Idle => "Idle",
            AppState::Editing => "Editing",
            AppState::Processing => "Processing",
            AppState::Completed => "Completed",
            AppState::Error => "Error",
        };
        f.write_str(name)
    }
}

/// Inputs to the state machine
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A picked or dropped file finished reading
    ImageLoaded(EncodedImage),
    /// User pressed "Remove Watermark" or "Try Again"
    EditRequested,
    /// The remote edit returned an image
    EditSucceeded {
        result: EncodedImage,
        created_at: DateTime<Utc>,
    },
    /// The remote edit failed; the message is shown verbatim
    EditFailed(String),
    /// User pressed "Discard" or "Start New"
    Discarded,
    /// User clicked a history thumbnail
    HistorySelected(usize),
}

impl SessionEvent {
    fn name(&self) -> &'static str {
        match self {
            SessionEvent::ImageLoaded(_) => "ImageLoaded",
            SessionEvent::EditRequested => "EditRequested",
            SessionEvent::EditSucceeded { .. } => "EditSucceeded",
            SessionEvent::EditFailed(_) => "EditFailed",
            SessionEvent::Discarded => "Discarded",
            SessionEvent::HistorySelected(_) => "HistorySelected",
        }
    }
}

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Send this (unmarked) original to the remote edit client
    Submit(EncodedImage),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("{event} is not allowed while {state}")]
    Invalid { state: AppState, event: &'static str },

    #[error("no image is selected")]
    NoImageSelected,

    #[error("history entry {0} does not exist")]
    UnknownHistoryEntry(usize),
}

/// Process-wide session state
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: AppState,
    selected: Option<EncodedImage>,
    result: Option<EncodedImage>,
    error: Option<String>,
    history: History,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    /// The image being edited (or the original of the shown result)
    pub fn selected(&self) -> Option<&EncodedImage> {
        self.selected.as_ref()
    }

    pub fn result(&self) -> Option<&EncodedImage> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Apply one event
    pub fn apply(&mut self, event: SessionEvent) -> Result<Effect, TransitionError> {
        let from = self.state;
        let name = event.name();

        let effect = match (from, event) {
            (AppState::Idle, SessionEvent::ImageLoaded(image)) => {
                self.selected = Some(image);
                self.result = None;
                self.error = None;
                self.state = AppState::Editing;
                Effect::None
            }

            // Error -> Processing is the retry path: same original, same request
            (AppState::Editing | AppState::Error, SessionEvent::EditRequested) => {
                let original = self
                    .selected
                    .clone()
                    .ok_or(TransitionError::NoImageSelected)?;
                self.error = None;
                self.state = AppState::Processing;
                Effect::Submit(original)
            }

            (AppState::Processing, SessionEvent::EditSucceeded { result, created_at }) => {
                let original = self
                    .selected
                    .clone()
                    .ok_or(TransitionError::NoImageSelected)?;
                self.history.record(HistoryEntry {
                    original,
                    result: result.clone(),
                    created_at,
                });
                self.result = Some(result);
                self.state = AppState::Completed;
                Effect::None
            }

            (AppState::Processing, SessionEvent::EditFailed(message)) => {
                self.error = Some(message);
                self.state = AppState::Error;
                Effect::None
            }

            (
                AppState::Editing | AppState::Completed | AppState::Error,
                SessionEvent::Discarded,
            ) => {
                self.selected = None;
                self.result = None;
                self.error = None;
                self.state = AppState::Idle;
                Effect::None
            }

            // Selection re-enters Completed; an in-flight edit must land first
            (state, SessionEvent::HistorySelected(index)) if state != AppState::Processing => {
                let entry = self
                    .history
                    .get(index)
                    .ok_or(TransitionError::UnknownHistoryEntry(index))?;
                self.selected = Some(entry.original.clone());
                self.result = Some(entry.result.clone());
                self.error = None;
                self.state = AppState::Completed;
                Effect::None
            }

            (state, _) => {
                return Err(TransitionError::Invalid { state, event: name });
            }
        };

        if from != self.state {
            log::info!("🔀 {} -> {} ({})", from, self.state, name);
        }

        Ok(effect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn image(tag: &str) -> EncodedImage {
        EncodedImage::from_bytes("image/png", tag.as_bytes())
    }

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    fn succeed(session: &mut Session, tag: &str, millis: i64) {
        session
            .apply(SessionEvent::EditSucceeded {
                result: image(tag),
                created_at: at(millis),
            })
            .unwrap();
    }

    fn editing(tag: &str) -> Session {
        let mut session = Session::new();
        session.apply(SessionEvent::ImageLoaded(image(tag))).unwrap();
        session
    }

    fn completed(original: &str, result: &str) -> Session {
        let mut session = editing(original);
        session.apply(SessionEvent::EditRequested).unwrap();
        succeed(&mut session, result, 1);
        session
    }

    fn errored(original: &str, message: &str) -> Session {
        let mut session = editing(original);
        session.apply(SessionEvent::EditRequested).unwrap();
        session
            .apply(SessionEvent::EditFailed(message.to_string()))
            .unwrap();
        session
    }

    #[test]
    fn starts_idle_and_empty() {
        let session = Session::new();
        assert_eq!(session.state(), AppState::Idle);
        assert!(session.selected().is_none());
        assert!(session.result().is_none());
        assert!(session.error().is_none());
        assert!(session.history().is_empty());
    }

    #[test]
    fn upload_edit_then_failure_walkthrough() {
        let mut session = Session::new();

        session.apply(SessionEvent::ImageLoaded(image("photo.jpg"))).unwrap();
        assert_eq!(session.state(), AppState::Editing);

        let effect = session.apply(SessionEvent::EditRequested).unwrap();
        assert_eq!(effect, Effect::Submit(image("photo.jpg")));
        assert_eq!(session.state(), AppState::Processing);

        succeed(&mut session, "R1", 10);
        assert_eq!(session.state(), AppState::Completed);
        assert_eq!(session.result(), Some(&image("R1")));
        assert_eq!(session.history().len(), 1);
        let entry = session.history().get(0).unwrap();
        assert_eq!(entry.original, image("photo.jpg"));
        assert_eq!(entry.result, image("R1"));
        assert_eq!(entry.created_at, at(10));

        // Pick the entry again and re-run the edit against a failing service
        session.apply(SessionEvent::HistorySelected(0)).unwrap();
        session.apply(SessionEvent::Discarded).unwrap();
        session.apply(SessionEvent::ImageLoaded(image("photo.jpg"))).unwrap();
        session.apply(SessionEvent::EditRequested).unwrap();
        session
            .apply(SessionEvent::EditFailed("quota exceeded".to_string()))
            .unwrap();

        assert_eq!(session.state(), AppState::Error);
        assert_eq!(session.error(), Some("quota exceeded"));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn failure_never_touches_history() {
        let session = errored("a", "boom");
        assert!(session.history().is_empty());
        assert!(session.result().is_none());
        assert_eq!(session.selected(), Some(&image("a")));
    }

    #[test]
    fn retry_resubmits_the_same_original() {
        let mut session = errored("photo", "network down");

        let effect = session.apply(SessionEvent::EditRequested).unwrap();
        assert_eq!(effect, Effect::Submit(image("photo")));
        assert_eq!(session.state(), AppState::Processing);
        assert!(session.error().is_none());

        succeed(&mut session, "fixed", 2);
        assert_eq!(session.state(), AppState::Completed);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history().get(0).unwrap().original, image("photo"));
    }

    #[test]
    fn retry_can_fail_again() {
        let mut session = errored("photo", "first");
        session.apply(SessionEvent::EditRequested).unwrap();
        session
            .apply(SessionEvent::EditFailed("second".to_string()))
            .unwrap();

        assert_eq!(session.state(), AppState::Error);
        assert_eq!(session.error(), Some("second"));
        assert!(session.history().is_empty());
    }

    #[test]
    fn discard_clears_everything_from_each_allowed_state() {
        for mut session in [editing("a"), completed("a", "b"), errored("a", "oops")] {
            let history_len = session.history().len();
            session.apply(SessionEvent::Discarded).unwrap();

            assert_eq!(session.state(), AppState::Idle);
            assert!(session.selected().is_none());
            assert!(session.result().is_none());
            assert!(session.error().is_none());
            assert_eq!(session.history().len(), history_len);
        }
    }

    #[test]
    fn discard_is_rejected_while_idle_or_processing() {
        let mut idle = Session::new();
        assert_eq!(
            idle.apply(SessionEvent::Discarded),
            Err(TransitionError::Invalid {
                state: AppState::Idle,
                event: "Discarded"
            })
        );

        let mut processing = editing("a");
        processing.apply(SessionEvent::EditRequested).unwrap();
        assert!(processing.apply(SessionEvent::Discarded).is_err());
        assert_eq!(processing.state(), AppState::Processing);
        assert_eq!(processing.selected(), Some(&image("a")));
    }

    #[test]
    fn only_one_edit_in_flight() {
        let mut session = editing("a");
        session.apply(SessionEvent::EditRequested).unwrap();

        let second = session.apply(SessionEvent::EditRequested);
        assert!(matches!(second, Err(TransitionError::Invalid { .. })));
        assert_eq!(session.state(), AppState::Processing);
    }

    #[test]
    fn edit_requires_an_editing_or_error_state() {
        let mut idle = Session::new();
        assert!(idle.apply(SessionEvent::EditRequested).is_err());

        let mut done = completed("a", "b");
        assert!(done.apply(SessionEvent::EditRequested).is_err());
        assert_eq!(done.history().len(), 1);
    }

    #[test]
    fn outcomes_outside_processing_are_rejected() {
        let mut session = editing("a");
        let late = session.apply(SessionEvent::EditSucceeded {
            result: image("late"),
            created_at: at(5),
        });
        assert!(late.is_err());
        assert!(session.apply(SessionEvent::EditFailed("late".into())).is_err());

        assert_eq!(session.state(), AppState::Editing);
        assert!(session.history().is_empty());
    }

    #[test]
    fn upload_only_from_idle() {
        let mut session = editing("a");
        assert!(session.apply(SessionEvent::ImageLoaded(image("b"))).is_err());
        assert_eq!(session.selected(), Some(&image("a")));
    }

    #[test]
    fn selecting_history_restores_pair_without_reordering() {
        let mut session = completed("first", "R1");
        session.apply(SessionEvent::Discarded).unwrap();
        session.apply(SessionEvent::ImageLoaded(image("second"))).unwrap();
        session.apply(SessionEvent::EditRequested).unwrap();
        succeed(&mut session, "R2", 2);

        let before: Vec<HistoryEntry> = session.history().iter().cloned().collect();

        session.apply(SessionEvent::HistorySelected(1)).unwrap();
        assert_eq!(session.state(), AppState::Completed);
        assert_eq!(session.selected(), Some(&image("first")));
        assert_eq!(session.result(), Some(&image("R1")));

        session.apply(SessionEvent::HistorySelected(0)).unwrap();
        assert_eq!(session.selected(), Some(&image("second")));
        assert_eq!(session.result(), Some(&image("R2")));

        let after: Vec<HistoryEntry> = session.history().iter().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn history_selection_from_error_and_idle() {
        let mut session = completed("a", "b");
        session.apply(SessionEvent::Discarded).unwrap();
        session.apply(SessionEvent::HistorySelected(0)).unwrap();
        assert_eq!(session.state(), AppState::Completed);

        session.apply(SessionEvent::Discarded).unwrap();
        session.apply(SessionEvent::ImageLoaded(image("c"))).unwrap();
        session.apply(SessionEvent::EditRequested).unwrap();
        session.apply(SessionEvent::EditFailed("x".into())).unwrap();

        session.apply(SessionEvent::HistorySelected(0)).unwrap();
        assert_eq!(session.state(), AppState::Completed);
        assert!(session.error().is_none());
        assert_eq!(session.result(), Some(&image("b")));
    }

    #[test]
    fn history_selection_guards() {
        let mut session = completed("a", "b");
        assert_eq!(
            session.apply(SessionEvent::HistorySelected(3)),
            Err(TransitionError::UnknownHistoryEntry(3))
        );

        session.apply(SessionEvent::Discarded).unwrap();
        session.apply(SessionEvent::ImageLoaded(image("c"))).unwrap();
        session.apply(SessionEvent::EditRequested).unwrap();
        assert!(matches!(
            session.apply(SessionEvent::HistorySelected(0)),
            Err(TransitionError::Invalid { state: AppState::Processing, .. })
        ));
        assert_eq!(session.selected(), Some(&image("c")));
    }
}
