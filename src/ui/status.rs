/// Header status indicator: a colored dot plus a short label per state
use iced::Color;

use crate::state::AppState;

pub fn status_label(state: AppState) -> &'static str {
    match state {
        AppState::Idle => "Ready to start",
        AppState::Editing => "Edit Mode",
        AppState::Processing => "Processing...",
        AppState::Completed => "Done",
        AppState::Error => "Error encountered",
    }
}

pub fn status_color(state: AppState) -> Color {
    match state {
        // Slate, amber, emerald
        AppState::Idle => Color::from_rgb8(100, 116, 139),
        AppState::Processing => Color::from_rgb8(245, 158, 11),
        AppState::Editing | AppState::Completed | AppState::Error => {
            Color::from_rgb8(16, 185, 129)
        }
    }
}

/// Discard is offered whenever there is something to throw away
pub fn can_discard(state: AppState) -> bool {
    matches!(state, AppState::Editing | AppState::Completed | AppState::Error)
}
