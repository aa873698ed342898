/// Editor canvas
///
/// Shows the selected image scaled to fit the available space and lets the
/// user paint translucent marks over it. Marks are guidance for the user
/// only; they are never sent with the edit request.

use iced::mouse::{self, Cursor};
use iced::touch;
use iced::widget::canvas::{self, Cache, Frame, LineCap, LineJoin, Path, Program, Stroke};
use iced::widget::image::Handle;
use iced::widget::{container, responsive, stack, text, Canvas, Image};
use iced::{Color, ContentFit, Element, Length, Point, Rectangle, Renderer, Size, Theme};
use std::io::Cursor as ByteCursor;

use crate::media::EncodedImage;
use crate::Message;

/// Brush width in screen pixels
pub const BRUSH_SIZE: f32 = 30.0;

/// Semi-transparent red for marking, rgba(239, 68, 68, 0.4)
pub const MARK_COLOR: Color = Color::from_rgba(0.937, 0.267, 0.267, 0.4);

/// Result of fitting an image into a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub scale: f32,
    pub width: f32,
    pub height: f32,
}

/// Scale `image` to fit inside `surface`, preserving aspect ratio
///
/// scale = min(surface.w / image.w, surface.h / image.h). Returns `None`
/// when either size has a zero (or negative) dimension.
pub fn fit_within(image: Size, surface: Size) -> Option<Fit> {
    if image.width <= 0.0 || image.height <= 0.0 || surface.width <= 0.0 || surface.height <= 0.0 {
        return None;
    }

    let scale = (surface.width / image.width).min(surface.height / image.height);

    // Clamp so rounding never pushes a side past the surface
    Some(Fit {
        scale,
        width: (image.width * scale).min(surface.width),
        height: (image.height * scale).min(surface.height),
    })
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum DecodeError {
    #[error("{0}")]
    Payload(String),

    #[error("unrecognised image: {0}")]
    Image(String),
}

/// A decoded-enough image: pixel size plus a renderer handle
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub handle: Handle,
    pub width: u32,
    pub height: u32,
}

impl LoadedImage {
    /// Read the image header for its size; pixels are decoded by the renderer
    pub fn decode(encoded: &EncodedImage) -> Result<Self, DecodeError> {
        let bytes = encoded
            .decode_bytes()
            .map_err(|e| DecodeError::Payload(e.to_string()))?;

        let (width, height) = image::ImageReader::new(ByteCursor::new(&bytes))
            .with_guessed_format()
            .map_err(|e| DecodeError::Image(e.to_string()))?
            .into_dimensions()
            .map_err(|e| DecodeError::Image(e.to_string()))?;

        Ok(Self {
            handle: Handle::from_bytes(bytes),
            width,
            height,
        })
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }
}

/// Pointer input translated to image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkEvent {
    Began(Point),
    Moved(Point),
    Ended,
}

/// Freehand strokes in image pixel coordinates
#[derive(Debug, Clone, Default)]
pub struct Marks {
    strokes: Vec<Vec<Point>>,
    drawing: bool,
}

impl Marks {
    pub fn apply(&mut self, event: MarkEvent) {
        match event {
            MarkEvent::Began(point) => {
                self.strokes.push(vec![point]);
                self.drawing = true;
            }
            MarkEvent::Moved(point) => {
                if self.drawing {
                    if let Some(stroke) = self.strokes.last_mut() {
                        stroke.push(point);
                    }
                }
            }
            MarkEvent::Ended => {
                self.drawing = false;
            }
        }
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        self.drawing = false;
    }

    pub fn strokes(&self) -> &[Vec<Point>] {
        &self.strokes
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}

/// Editing surface for one image
pub struct Editor {
    image: LoadedImage,
    marks: Marks,
    cache: Cache,
}

impl Editor {
    pub fn new(image: LoadedImage) -> Self {
        Self {
            image,
            marks: Marks::default(),
            cache: Cache::new(),
        }
    }

    pub fn marks(&self) -> &Marks {
        &self.marks
    }

    pub fn apply_mark(&mut self, event: MarkEvent) {
        self.marks.apply(event);
        self.cache.clear();
    }

    pub fn clear_marks(&mut self) {
        self.marks.clear();
        self.cache.clear();
    }

    pub fn view(&self) -> Element<'_, Message> {
        responsive(move |surface| {
            let Some(fit) = fit_within(self.image.size(), surface) else {
                return text("").into();
            };

            let picture = Image::new(self.image.handle.clone())
                .content_fit(ContentFit::Fill)
                .width(Length::Fixed(fit.width))
                .height(Length::Fixed(fit.height));

            let marking = Canvas::new(MarkingCanvas {
                marks: &self.marks,
                cache: &self.cache,
                scale: fit.scale,
            })
            .width(Length::Fixed(fit.width))
            .height(Length::Fixed(fit.height));

            container(stack![picture, marking])
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into()
        })
        .into()
    }
}

/// Canvas program drawing the marks over the image
pub struct MarkingCanvas<'a> {
    marks: &'a Marks,
    cache: &'a Cache,
    /// Screen pixels per image pixel
    scale: f32,
}

impl MarkingCanvas<'_> {
    fn to_image(&self, point: Point) -> Point {
        Point::new(point.x / self.scale, point.y / self.scale)
    }

    fn to_screen(&self, point: Point) -> Point {
        Point::new(point.x * self.scale, point.y * self.scale)
    }

    fn draw_marks(&self, frame: &mut Frame) {
        for points in self.marks.strokes() {
            match points.as_slice() {
                [] => {}
                [only] => {
                    frame.fill(&Path::circle(self.to_screen(*only), BRUSH_SIZE / 2.0), MARK_COLOR);
                }
                [first, rest @ ..] => {
                    let path = Path::new(|builder| {
                        builder.move_to(self.to_screen(*first));
                        for point in rest {
                            builder.line_to(self.to_screen(*point));
                        }
                    });
                    frame.stroke(
                        &path,
                        Stroke::default()
                            .with_width(BRUSH_SIZE)
                            .with_color(MARK_COLOR)
                            .with_line_cap(LineCap::Round)
                            .with_line_join(LineJoin::Round),
                    );
                }
            }
        }
    }
}

impl Program<Message> for MarkingCanvas<'_> {
    type State = DrawState;

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let marks = self.cache.draw(renderer, bounds.size(), |frame| self.draw_marks(frame));
        vec![marks]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        match event {
            // Pointer down - begin a stroke
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(position) = cursor.position_in(bounds) {
                    state.is_drawing = true;
                    return captured(MarkEvent::Began(self.to_image(position)));
                }
            }
            canvas::Event::Touch(touch::Event::FingerPressed { position, .. }) => {
                if bounds.contains(position) {
                    state.is_drawing = true;
                    let local = Point::new(position.x - bounds.x, position.y - bounds.y);
                    return captured(MarkEvent::Began(self.to_image(local)));
                }
            }

            // Pointer move while down - extend the stroke
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if state.is_drawing {
                    if let Some(position) = cursor.position_in(bounds) {
                        return captured(MarkEvent::Moved(self.to_image(position)));
                    }
                }
            }
            canvas::Event::Touch(touch::Event::FingerMoved { position, .. }) => {
                if state.is_drawing && bounds.contains(position) {
                    let local = Point::new(position.x - bounds.x, position.y - bounds.y);
                    return captured(MarkEvent::Moved(self.to_image(local)));
                }
            }

            // Pointer up - end the stroke
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left))
            | canvas::Event::Touch(touch::Event::FingerLifted { .. })
            | canvas::Event::Touch(touch::Event::FingerLost { .. }) => {
                if state.is_drawing {
                    state.is_drawing = false;
                    return captured(MarkEvent::Ended);
                }
            }

            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}

fn captured(event: MarkEvent) -> (canvas::event::Status, Option<Message>) {
    (canvas::event::Status::Captured, Some(Message::Mark(event)))
}

/// State for paint interactions
#[derive(Debug, Clone, Default)]
pub struct DrawState {
    pub is_drawing: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_fit_properties(image: Size, surface: Size) {
        let fit = fit_within(image, surface).unwrap();
        let eps = 1e-3;

        assert!(fit.width <= surface.width + eps);
        assert!(fit.height <= surface.height + eps);
        assert!(
            (fit.width - surface.width).abs() < eps || (fit.height - surface.height).abs() < eps,
            "{image:?} in {surface:?} touches neither side: {fit:?}"
        );
        let aspect_in = image.width / image.height;
        let aspect_out = fit.width / fit.height;
        assert!((aspect_in - aspect_out).abs() / aspect_in < 1e-3);
    }

    #[test]
    fn fit_preserves_aspect_and_touches_one_side() {
        let surfaces = [Size::new(800.0, 600.0), Size::new(300.0, 900.0), Size::new(1.0, 1.0)];
        let images = [
            Size::new(4000.0, 3000.0),
            Size::new(100.0, 50.0),
            Size::new(50.0, 100.0),
            Size::new(800.0, 600.0),
            Size::new(1.0, 7000.0),
        ];
        for surface in surfaces {
            for image in images {
                assert_fit_properties(image, surface);
            }
        }
    }

    #[test]
    fn fit_scales_up_small_images() {
        let fit = fit_within(Size::new(100.0, 50.0), Size::new(800.0, 600.0)).unwrap();
        assert_eq!(fit.scale, 8.0);
        assert_eq!((fit.width, fit.height), (800.0, 400.0));
    }

    #[test]
    fn fit_rejects_degenerate_sizes() {
        assert!(fit_within(Size::new(0.0, 10.0), Size::new(100.0, 100.0)).is_none());
        assert!(fit_within(Size::new(10.0, 10.0), Size::new(100.0, 0.0)).is_none());
    }

    #[test]
    fn marks_follow_pointer_lifecycle() {
        let mut marks = Marks::default();

        // Moves without a press are ignored
        marks.apply(MarkEvent::Moved(Point::new(1.0, 1.0)));
        assert!(marks.is_empty());

        marks.apply(MarkEvent::Began(Point::new(0.0, 0.0)));
        marks.apply(MarkEvent::Moved(Point::new(5.0, 5.0)));
        marks.apply(MarkEvent::Ended);
        marks.apply(MarkEvent::Moved(Point::new(9.0, 9.0)));
        marks.apply(MarkEvent::Began(Point::new(20.0, 20.0)));
        marks.apply(MarkEvent::Ended);

        assert_eq!(
            marks.strokes(),
            &[
                vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)],
                vec![Point::new(20.0, 20.0)],
            ]
        );

        marks.clear();
        assert!(marks.is_empty());
    }

    #[test]
    fn canvas_reports_points_in_image_coordinates() {
        let marks = Marks::default();
        let cache = Cache::new();
        let program = MarkingCanvas {
            marks: &marks,
            cache: &cache,
            scale: 0.5,
        };
        let bounds = Rectangle::new(Point::new(100.0, 50.0), Size::new(200.0, 100.0));
        let mut state = DrawState::default();

        let press = canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left));
        let (status, message) =
            program.update(&mut state, press, bounds, Cursor::Available(Point::new(110.0, 60.0)));
        assert_eq!(status, canvas::event::Status::Captured);
        assert!(matches!(
            message,
            Some(Message::Mark(MarkEvent::Began(p))) if p == Point::new(20.0, 20.0)
        ));
        assert!(state.is_drawing);

        let moved = canvas::Event::Mouse(mouse::Event::CursorMoved {
            position: Point::new(150.0, 100.0),
        });
        let (_, message) =
            program.update(&mut state, moved, bounds, Cursor::Available(Point::new(150.0, 100.0)));
        assert!(matches!(
            message,
            Some(Message::Mark(MarkEvent::Moved(p))) if p == Point::new(100.0, 100.0)
        ));

        let release = canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left));
        let (_, message) =
            program.update(&mut state, release, bounds, Cursor::Available(Point::new(150.0, 100.0)));
        assert!(matches!(message, Some(Message::Mark(MarkEvent::Ended))));
        assert!(!state.is_drawing);
    }

    #[test]
    fn presses_outside_the_image_are_ignored() {
        let marks = Marks::default();
        let cache = Cache::new();
        let program = MarkingCanvas {
            marks: &marks,
            cache: &cache,
            scale: 1.0,
        };
        let bounds = Rectangle::new(Point::ORIGIN, Size::new(10.0, 10.0));
        let mut state = DrawState::default();

        let press = canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left));
        let (status, message) =
            program.update(&mut state, press, bounds, Cursor::Available(Point::new(50.0, 50.0)));
        assert_eq!(status, canvas::event::Status::Ignored);
        assert!(message.is_none());
        assert!(!state.is_drawing);
    }

    #[test]
    fn decode_reads_dimensions_and_rejects_garbage() {
        let pixels = image::RgbaImage::from_pixel(6, 4, image::Rgba([0, 0, 0, 255]));
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(pixels)
            .write_to(&mut ByteCursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let loaded = LoadedImage::decode(&EncodedImage::from_bytes("image/png", &png)).unwrap();
        assert_eq!((loaded.width, loaded.height), (6, 4));
        assert_eq!(loaded.size(), Size::new(6.0, 4.0));

        let garbage = EncodedImage::from_bytes("image/png", b"not an image at all");
        assert!(LoadedImage::decode(&garbage).is_err());
    }
}
