/// History sidebar
///
/// Two-column grid of result thumbnails, newest first. Renderer handles
/// are derived from the session history and built once per entry.
use chrono::Local;
use iced::widget::image::Handle;
use iced::widget::{button, column, container, scrollable, text, Column, Image, Row};
use iced::{Alignment, ContentFit, Element, Length};
use std::collections::VecDeque;

use crate::state::History;
use crate::Message;

const THUMBNAIL_SIZE: f32 = 130.0;
const COLUMNS: usize = 2;

#[derive(Debug, Default)]
pub struct HistoryPanel {
    thumbnails: VecDeque<Handle>,
}

impl HistoryPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build handles for entries recorded since the last sync
    ///
    /// History only grows at the front, so the missing handles are
    /// always the newest entries.
    pub fn sync(&mut self, history: &History) {
        let missing = history.len().saturating_sub(self.thumbnails.len());
        let fresh: Vec<Handle> = history
            .iter()
            .take(missing)
            .map(|entry| super::preview_handle(&entry.result))
            .collect();
        for handle in fresh.into_iter().rev() {
            self.thumbnails.push_front(handle);
        }
    }

    /// Handle for the entry at `index` (same indexing as the session history)
    pub fn handle(&self, index: usize) -> Option<&Handle> {
        self.thumbnails.get(index)
    }

    pub fn view<'a>(&'a self, history: &'a History) -> Element<'a, Message> {
        let heading = text("Recent Edits").size(14);

        if history.is_empty() {
            let empty = container(text("No history yet").size(14))
                .width(Length::Fill)
                .padding(48)
                .center_x(Length::Fill);
            return column![heading, empty].spacing(16).into();
        }

        let tiles: Vec<Element<'a, Message>> = history
            .iter()
            .zip(&self.thumbnails)
            .enumerate()
            .map(|(index, (entry, handle))| {
                let edited_at = entry.created_at.with_timezone(&Local).format("%H:%M:%S");
                button(
                    column![
                        Image::new(handle.clone())
                            .content_fit(ContentFit::Cover)
                            .width(Length::Fixed(THUMBNAIL_SIZE))
                            .height(Length::Fixed(THUMBNAIL_SIZE)),
                        text(edited_at.to_string()).size(10),
                    ]
                    .spacing(4)
                    .align_x(Alignment::Center),
                )
                .padding(0)
                .style(button::text)
                .on_press(Message::HistorySelected(index))
                .into()
            })
            .collect();

        let mut grid = Column::new().spacing(12);
        let mut tiles = tiles.into_iter().peekable();
        while tiles.peek().is_some() {
            let row = Row::with_children(tiles.by_ref().take(COLUMNS))
                .spacing(12)
                .align_y(Alignment::Center);
            grid = grid.push(row);
        }

        column![heading, scrollable(grid).height(Length::Fill)]
            .spacing(16)
            .into()
    }
}
