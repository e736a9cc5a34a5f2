use crate::coords::Viewport;
use crate::paint::Color;

use super::ImageScaleQuality;

/// Initial state for a [`RasterDrawingContext`](super::RasterDrawingContext).
///
/// Use `..Default::default()` to override individual fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextConfig {
    /// Surface size; `clear` fills exactly this area.
    pub viewport: Viewport,
    /// Pixel size used by `draw_string`.
    pub font_size: f32,
    pub image_scale_quality: ImageScaleQuality,
    /// Color `begin`/`clear` fill with when none is given.
    pub clear_color: Color,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            font_size: 12.0,
            image_scale_quality: ImageScaleQuality::Low,
            clear_color: Color::BLACK,
        }
    }
}
