use chrono::Utc;
use iced::widget::image::Handle;
use iced::widget::{button, column, container, horizontal_space, row, text, Column, Image, Row};
use iced::{event, task, window, Alignment, ContentFit, Element, Length, Subscription, Task, Theme};
use std::path::PathBuf;

mod config;
mod media;
mod remote;
mod state;
mod ui;

use config::Config;
use media::{export, intake, EncodedImage, ExportError, IntakeError};
use remote::{EditError, RemoteEditClient};
use state::{AppState, Effect, Session, SessionEvent};
use ui::canvas::{Editor, LoadedImage, MarkEvent};
use ui::history::HistoryPanel;
use ui::status;

/// Main application state
struct MagicEraser {
    /// The session state machine (current image, result, error, history)
    session: Session,
    /// Remote edit client, or the reason it could not be built
    client: Result<RemoteEditClient, EditError>,
    /// Editing surface for the selected image (None if it failed to decode)
    editor: Option<Editor>,
    /// Thumbnails for the history sidebar
    history: HistoryPanel,
    /// Renderer handle for the result shown in Completed
    result_preview: Option<Handle>,
    /// The outstanding edit request; aborted if the app goes away first
    in_flight: Option<task::Handle>,
    /// Transient note under the main view (intake / export outcomes)
    notice: Option<String>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked "Choose File"
    PickImage,
    /// A file was dropped on the window
    FileDropped(PathBuf),
    /// Background file read completed
    ImageRead(Result<EncodedImage, IntakeError>),
    /// Pointer input on the editor canvas
    Mark(MarkEvent),
    /// User clicked "Clear marks"
    ClearMarks,
    /// User clicked "Remove Watermark" or "Try Again"
    RemoveWatermark,
    /// The remote edit finished
    EditFinished(Result<EncodedImage, EditError>),
    /// User clicked "Discard" or "Start New"
    Discard,
    /// User clicked a history thumbnail
    HistorySelected(usize),
    /// User clicked "Download Result" or "Save Image"
    Download,
    /// Background PNG export completed
    Saved(Result<PathBuf, ExportError>),
}

impl MagicEraser {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        (Self::with_config(Config::from_env()), Task::none())
    }

    fn with_config(config: Config) -> Self {
        let client = RemoteEditClient::new(&config.remote);
        match &client {
            Ok(client) if !client.has_api_key() => {
                log::warn!("⚠️  No API key configured (set API_KEY); every edit will fail");
            }
            Ok(client) => log::info!("🎨 Magic Eraser ready: {client:?}"),
            Err(e) => log::error!("❌ Remote edit client unavailable: {e}"),
        }

        MagicEraser {
            session: Session::new(),
            client,
            editor: None,
            history: HistoryPanel::new(),
            result_preview: None,
            in_flight: None,
            notice: None,
        }
    }

    /// Feed an event to the session, logging rejected transitions
    fn dispatch(&mut self, event: SessionEvent) -> Option<Effect> {
        match self.session.apply(event) {
            Ok(effect) => Some(effect),
            Err(e) => {
                log::warn!("⚠️  Ignored: {e}");
                None
            }
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickImage => {
                if self.session.state() != AppState::Idle {
                    return Task::none();
                }
                match intake::pick_image() {
                    Some(path) => Self::read(path),
                    None => Task::none(),
                }
            }
            Message::FileDropped(path) => {
                if self.session.state() != AppState::Idle {
                    log::debug!("Ignoring dropped file outside Idle: {}", path.display());
                    return Task::none();
                }
                Self::read(path)
            }
            Message::ImageRead(Ok(image)) => {
                if self.dispatch(SessionEvent::ImageLoaded(image)).is_some() {
                    self.notice = None;
                    // Malformed files only fail here, when the editor decodes them
                    self.editor = match self.session.selected().map(LoadedImage::decode) {
                        Some(Ok(loaded)) => {
                            log::info!("🖼️  Loaded {}x{} image", loaded.width, loaded.height);
                            Some(Editor::new(loaded))
                        }
                        Some(Err(e)) => {
                            log::warn!("⚠️  Could not display image: {e}");
                            None
                        }
                        None => None,
                    };
                }
                Task::none()
            }
            Message::ImageRead(Err(e)) => {
                log::error!("❌ {e}");
                self.notice = Some(e.to_string());
                Task::none()
            }
            Message::Mark(event) => {
                if self.session.state() == AppState::Editing {
                    if let Some(editor) = &mut self.editor {
                        log::trace!("mark {event:?}");
                        editor.apply_mark(event);
                    }
                }
                Task::none()
            }
            Message::ClearMarks => {
                if let Some(editor) = &mut self.editor {
                    editor.clear_marks();
                }
                Task::none()
            }
            Message::RemoveWatermark => match self.dispatch(SessionEvent::EditRequested) {
                Some(Effect::Submit(original)) => self.submit(original),
                _ => Task::none(),
            },
            Message::EditFinished(outcome) => {
                self.in_flight = None;
                match outcome {
                    Ok(result) => {
                        let event = SessionEvent::EditSucceeded {
                            result,
                            created_at: Utc::now(),
                        };
                        if self.dispatch(event).is_some() {
                            self.history.sync(self.session.history());
                            self.result_preview = self.history.handle(0).cloned();
                        }
                    }
                    Err(e) => {
                        log::error!("❌ Gemini API error: {e}");
                        self.dispatch(SessionEvent::EditFailed(e.to_string()));
                    }
                }
                Task::none()
            }
            Message::Discard => {
                if self.dispatch(SessionEvent::Discarded).is_some() {
                    self.editor = None;
                    self.result_preview = None;
                    self.notice = None;
                }
                Task::none()
            }
            Message::HistorySelected(index) => {
                if self.dispatch(SessionEvent::HistorySelected(index)).is_some() {
                    self.result_preview = self.history.handle(index).cloned();
                    self.notice = None;
                }
                Task::none()
            }
            Message::Download => {
                let Some(result) = self.session.result().cloned() else {
                    return Task::none();
                };
                let file_name = export::export_file_name(Utc::now());
                match export::pick_save_path(&file_name) {
                    Some(path) => Task::perform(export::save_png(result, path), Message::Saved),
                    None => Task::none(),
                }
            }
            Message::Saved(Ok(path)) => {
                self.notice = Some(format!("Saved to {}", path.display()));
                Task::none()
            }
            Message::Saved(Err(e)) => {
                log::error!("❌ Export failed: {e}");
                self.notice = Some(e.to_string());
                Task::none()
            }
        }
    }

    fn read(path: PathBuf) -> Task<Message> {
        Task::perform(intake::read_image(path), Message::ImageRead)
    }

    /// Launch the remote edit for `original`
    fn submit(&mut self, original: EncodedImage) -> Task<Message> {
        let client = match &self.client {
            Ok(client) => client.clone(),
            Err(e) => return Task::done(Message::EditFinished(Err(e.clone()))),
        };

        let (task, handle) = Task::perform(
            async move { client.remove_watermark(original).await },
            Message::EditFinished,
        )
        .abortable();
        self.in_flight = Some(handle.abort_on_drop());
        task
    }

    fn subscription(&self) -> Subscription<Message> {
        event::listen_with(|event, _status, _window| match event {
            iced::Event::Window(window::Event::FileDropped(path)) => {
                Some(Message::FileDropped(path))
            }
            _ => None,
        })
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let sidebar = container(
            column![
                text("Magic Eraser").size(24),
                self.history.view(self.session.history()),
                text("Powered by Gemini 2.5 Flash").size(10),
            ]
            .spacing(24)
            .padding(24),
        )
        .width(Length::Fixed(320.0))
        .height(Length::Fill)
        .style(container::bordered_box);

        let main = column![self.header(), self.body()]
            .width(Length::Fill)
            .height(Length::Fill);

        row![sidebar, main].into()
    }

    fn header(&self) -> Element<Message> {
        let state = self.session.state();

        let discard = status::can_discard(state).then(|| {
            button("Discard")
                .style(button::text)
                .on_press(Message::Discard)
        });
        let download = (state == AppState::Completed).then(|| {
            button("Download Result")
                .style(button::primary)
                .on_press(Message::Download)
        });

        Row::new()
            .push(text("●").color(status::status_color(state)))
            .push(text(status::status_label(state)).size(14))
            .push(horizontal_space())
            .push_maybe(discard)
            .push_maybe(download)
            .spacing(12)
            .padding([24, 32])
            .align_y(Alignment::Center)
            .into()
    }

    fn body(&self) -> Element<Message> {
        let content: Element<Message> = match self.session.state() {
            AppState::Idle => self.upload_prompt(),
            AppState::Editing => self.editing_view(),
            AppState::Processing => column![
                text("Removing watermark with AI...").size(20),
                text("This usually takes a few seconds...").size(14),
            ]
            .spacing(8)
            .align_x(Alignment::Center)
            .into(),
            AppState::Completed => self.result_view(),
            AppState::Error => column![
                text("Something went wrong").size(22),
                text(self.session.error().unwrap_or_default()),
                button("Try Again")
                    .style(button::secondary)
                    .on_press(Message::RemoveWatermark),
            ]
            .spacing(16)
            .align_x(Alignment::Center)
            .into(),
        };

        let notice = self.notice.as_deref().map(|note| text(note).size(14));

        container(
            Column::new()
                .push(content)
                .push_maybe(notice)
                .spacing(16)
                .align_x(Alignment::Center),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(32)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
    }

    fn upload_prompt(&self) -> Element<Message> {
        let steps = row![
            text("1  Upload Photo").size(12),
            text("2  AI Detection").size(12),
            text("3  Instant Magic").size(12),
        ]
        .spacing(32);

        column![
            text("Upload an image").size(28),
            text("Click to browse, or drop a file on the window. Supports PNG, JPG, and WEBP.")
                .size(14),
            button("Choose File").padding(10).on_press(Message::PickImage),
            steps,
        ]
        .spacing(20)
        .align_x(Alignment::Center)
        .into()
    }

    fn editing_view(&self) -> Element<Message> {
        let surface: Element<Message> = match &self.editor {
            Some(editor) => editor.view(),
            None => text("This image could not be displayed.").into(),
        };
        let has_marks = self
            .editor
            .as_ref()
            .is_some_and(|editor| !editor.marks().is_empty());

        column![
            container(surface).width(Length::Fill).height(Length::Fill),
            text("Paint over the watermark").size(12),
            row![
                button("Clear marks")
                    .style(button::secondary)
                    .on_press_maybe(has_marks.then_some(Message::ClearMarks)),
                button("Remove Watermark")
                    .padding(14)
                    .style(button::primary)
                    .on_press(Message::RemoveWatermark),
            ]
            .spacing(16),
            text("Our AI automatically detects and intelligently fills watermarked areas.")
                .size(12),
        ]
        .spacing(16)
        .align_x(Alignment::Center)
        .into()
    }

    fn result_view(&self) -> Element<Message> {
        let picture: Element<Message> = match &self.result_preview {
            Some(handle) => Image::new(handle.clone())
                .content_fit(ContentFit::Contain)
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => text("Result unavailable").into(),
        };

        column![
            container(picture).width(Length::Fill).height(Length::Fill),
            text("Watermark successfully removed").size(14),
            row![
                button("Start New")
                    .style(button::secondary)
                    .on_press(Message::Discard),
                button("Save Image")
                    .style(button::primary)
                    .on_press(Message::Download),
            ]
            .spacing(16),
        ]
        .spacing(16)
        .align_x(Alignment::Center)
        .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    iced::application("Magic Eraser", MagicEraser::update, MagicEraser::view)
        .subscription(MagicEraser::subscription)
        .theme(MagicEraser::theme)
        .centered()
        .run_with(MagicEraser::new)
}
