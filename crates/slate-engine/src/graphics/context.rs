use crate::coords::Rect;
use crate::image::Image;
use crate::math::AffineMatrix;
use crate::paint::Color;
use crate::text::Font;

/// Resampling used when an image is drawn at a different size.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum ImageScaleQuality {
    /// Nearest-neighbour (smoothing off).
    #[default]
    Low,
    /// Bilinear (smoothing on).
    High,
}

impl ImageScaleQuality {
    #[inline]
    pub fn smoothing(self) -> bool {
        matches!(self, ImageScaleQuality::High)
    }
}

/// Immediate-mode drawing surface.
///
/// Two stacks carry composable state. The transform stack starts with one
/// identity entry and the opacity stack with one `1.0` entry; neither seed
/// entry can be popped. Opacity entries are absolute, not multiplied into the
/// entry below.
///
/// A frame is `begin` → draw calls → `end`.
pub trait DrawingContext {
    // ── frame ─────────────────────────────────────────────────────────────

    /// Starts a frame. With `clear` set the surface is filled with
    /// `clear_color` (the configured clear color when `None`). The current
    /// color is reset to black either way.
    fn begin(&mut self, clear: bool, clear_color: Option<Color>);

    /// Finishes a frame.
    fn end(&mut self);

    /// Fills the whole surface, ignoring the current transform and opacity.
    fn clear(&mut self, color: Option<Color>);

    // ── draw state ────────────────────────────────────────────────────────

    fn color(&self) -> Color;

    fn set_color(&mut self, color: Color);

    fn font(&self) -> Option<&Font>;

    fn set_font(&mut self, font: Option<Font>);

    fn font_size(&self) -> f32;

    fn set_font_size(&mut self, size: f32);

    fn image_scale_quality(&self) -> ImageScaleQuality;

    fn set_image_scale_quality(&mut self, quality: ImageScaleQuality);

    // ── transform stack ───────────────────────────────────────────────────

    /// Active transform (top of the stack).
    fn transformation(&self) -> AffineMatrix;

    /// Replaces the top entry.
    fn set_transformation(&mut self, m: AffineMatrix);

    fn push_transformation(&mut self, m: AffineMatrix);

    /// Removes the top entry and returns it. `None` at depth 1.
    fn pop_transformation(&mut self) -> Option<AffineMatrix>;

    /// `translation(tx, ty)` composed after the active transform.
    fn translation(&self, tx: f32, ty: f32) -> AffineMatrix {
        AffineMatrix::translation(tx, ty).multiply_matrix(self.transformation())
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        let m = self.translation(tx, ty);
        self.set_transformation(m);
    }

    fn push_translation(&mut self, tx: f32, ty: f32) {
        let m = self.translation(tx, ty);
        self.push_transformation(m);
    }

    /// Rotation by `angle` radians about `(cx, cy)` composed after the
    /// active transform.
    fn rotation(&self, angle: f32, cx: f32, cy: f32) -> AffineMatrix {
        AffineMatrix::translation(cx, cy)
            .multiply_matrix(AffineMatrix::rotation(angle))
            .multiply_matrix(AffineMatrix::translation(-cx, -cy))
            .multiply_matrix(self.transformation())
    }

    fn rotate(&mut self, angle: f32, cx: f32, cy: f32) {
        let m = self.rotation(angle, cx, cy);
        self.set_transformation(m);
    }

    fn push_rotation(&mut self, angle: f32, cx: f32, cy: f32) {
        let m = self.rotation(angle, cx, cy);
        self.push_transformation(m);
    }

    // ── opacity stack ─────────────────────────────────────────────────────

    fn opacity(&self) -> f32;

    /// Replaces the top entry. The value is stored as given; the backend
    /// receives it clamped to `[0, 1]`.
    fn set_opacity(&mut self, opacity: f32);

    fn push_opacity(&mut self, opacity: f32);

    /// Removes the top entry and returns it. `None` at depth 1.
    fn pop_opacity(&mut self) -> Option<f32>;

    // ── images ────────────────────────────────────────────────────────────

    /// Blits `src` of `image` into `dst`. A negative destination width or
    /// height mirrors the image along that axis, keeping it inside
    /// `x..x+|w|` / `y..y+|h|`.
    fn draw_scaled_sub_image(&mut self, image: &dyn Image, src: Rect, dst: Rect);

    fn draw_image(&mut self, image: &dyn Image, x: f32, y: f32) {
        let (w, h) = (image.width() as f32, image.height() as f32);
        self.draw_sub_image(image, x, y, 0.0, 0.0, w, h);
    }

    /// Blits the `(sx, sy, sw, sh)` region unscaled at `(x, y)`.
    fn draw_sub_image(
        &mut self,
        image: &dyn Image,
        x: f32,
        y: f32,
        sx: f32,
        sy: f32,
        sw: f32,
        sh: f32,
    ) {
        self.draw_scaled_sub_image(image, Rect::new(sx, sy, sw, sh), Rect::new(x, y, sw, sh));
    }

    fn draw_scaled_image(&mut self, image: &dyn Image, x: f32, y: f32, w: f32, h: f32) {
        let src = Rect::new(0.0, 0.0, image.width() as f32, image.height() as f32);
        self.draw_scaled_sub_image(image, src, Rect::new(x, y, w, h));
    }

    // ── primitives ────────────────────────────────────────────────────────

    /// Rectangle outline; `strength` is rounded to whole pixels.
    fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32, strength: f32);

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32);

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, strength: f32);

    fn fill_triangle(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32);

    // ── text ──────────────────────────────────────────────────────────────

    /// Draws `text` with the current font, font size and color, pen starting
    /// at `(x, y)` (top of the line). Characters without a glyph are skipped.
    fn draw_string(&mut self, text: &str, x: f32, y: f32);

    /// Width of `text` set in `font` at the font's own size.
    fn string_width(&mut self, font: &Font, text: &str) -> f32;

    // ── clipping ──────────────────────────────────────────────────────────

    /// Intersects the clip region with a rectangle until the matching
    /// [`disable_scissor`](Self::disable_scissor).
    fn scissor(&mut self, x: f32, y: f32, w: f32, h: f32);

    fn disable_scissor(&mut self);
}
