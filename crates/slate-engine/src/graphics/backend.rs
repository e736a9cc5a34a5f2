use std::fmt;

use crate::coords::{Rect, Vec2};
use crate::image::Image;

/// Per-character width reported by backends that have no font support.
pub const FALLBACK_CHAR_ADVANCE: f32 = 5.0;

/// Error returned by [`RasterBackend::draw_image`].
#[derive(Debug, Clone, PartialEq)]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "backend error: {}", self.message)
    }
}

impl std::error::Error for BackendError {}

/// Canvas-style rasterizer the drawing context renders through.
///
/// Path coordinates are user space; the backend maps them through the
/// transform last passed to [`set_transform`](Self::set_transform).
/// `save`/`restore` snapshot the transform, clip, styles, alpha, line width
/// and smoothing flag.
pub trait RasterBackend {
    /// Width of `text` in the backend's own text metrics.
    fn measure_text(&mut self, text: &str) -> f32;

    /// Blits `src` (whole image when `None`) of `image` into `dst`.
    fn draw_image(&mut self, image: &dyn Image, src: Option<Rect>, dst: Rect)
        -> Result<(), BackendError>;

    fn fill_rect(&mut self, rect: Rect);

    /// Appends a closed rectangle subpath.
    fn rect(&mut self, rect: Rect);

    fn move_to(&mut self, p: Vec2);

    fn line_to(&mut self, p: Vec2);

    fn begin_path(&mut self);

    fn close_path(&mut self);

    fn fill(&mut self);

    fn stroke(&mut self);

    /// Intersects the clip region with the current path.
    fn clip(&mut self);

    fn save(&mut self);

    fn restore(&mut self);

    /// Replaces the current transform with `[a c e; b d f; 0 0 1]`.
    fn set_transform(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32);

    /// CSS color string, e.g. `rgb(255,0,0)`.
    fn set_fill_style(&mut self, style: &str);

    fn set_stroke_style(&mut self, style: &str);

    fn global_alpha(&self) -> f32;

    fn set_global_alpha(&mut self, alpha: f32);

    fn line_width(&self) -> f32;

    fn set_line_width(&mut self, width: f32);

    fn set_image_smoothing(&mut self, enabled: bool);
}
