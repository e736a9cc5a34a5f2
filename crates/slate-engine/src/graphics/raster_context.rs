use crate::coords::{Rect, Vec2, Viewport};
use crate::image::Image;
use crate::math::AffineMatrix;
use crate::paint::Color;
use crate::text::{Font, FontSystem, GlyphAtlas, FIRST_BAKED_CHAR};

use super::{ContextConfig, DrawingContext, ImageScaleQuality, RasterBackend};

/// Per-context settings that are not stacked.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawState {
    pub color: Color,
    pub font: Option<Font>,
    pub font_size: f32,
    /// Innermost open scissor rectangle, in the user space it was set in.
    pub scissor: Option<Rect>,
    pub image_scale_quality: ImageScaleQuality,
}

/// [`DrawingContext`] rendering through a [`RasterBackend`].
///
/// Owns the backend for its lifetime; [`into_parts`](Self::into_parts) hands
/// it back. Text goes through `G`, a [`FontSystem`] unless overridden.
pub struct RasterDrawingContext<B, G = FontSystem> {
    backend: B,
    glyphs: G,
    config: ContextConfig,
    transformations: Vec<AffineMatrix>,
    opacities: Vec<f32>,
    scissors: Vec<Rect>,
    state: DrawState,
}

impl<B: RasterBackend, G: GlyphAtlas> RasterDrawingContext<B, G> {
    pub fn new(backend: B, glyphs: G) -> Self {
        Self::with_config(backend, glyphs, ContextConfig::default())
    }

    pub fn with_config(backend: B, glyphs: G, config: ContextConfig) -> Self {
        let state = DrawState {
            color: Color::BLACK,
            font: None,
            font_size: config.font_size,
            scissor: None,
            image_scale_quality: config.image_scale_quality,
        };
        let mut ctx = Self {
            backend,
            glyphs,
            config,
            transformations: vec![AffineMatrix::IDENTITY],
            opacities: vec![1.0],
            scissors: Vec::new(),
            state,
        };
        ctx.sync_backend();
        ctx
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn glyphs(&self) -> &G {
        &self.glyphs
    }

    pub fn glyphs_mut(&mut self) -> &mut G {
        &mut self.glyphs
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    pub fn into_parts(self) -> (B, G) {
        (self.backend, self.glyphs)
    }

    pub fn viewport(&self) -> Viewport {
        self.config.viewport
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    pub fn transformation_depth(&self) -> usize {
        self.transformations.len()
    }

    pub fn opacity_depth(&self) -> usize {
        self.opacities.len()
    }

    /// Number of open [`scissor`](DrawingContext::scissor) regions.
    pub fn scissor_depth(&self) -> usize {
        self.scissors.len()
    }

    // ── backend sync ──────────────────────────────────────────────────────

    fn apply_transformation(&mut self) {
        let (a, b, c, d, e, f) = self.transformation().to_canvas_2x3();
        self.backend.set_transform(a, b, c, d, e, f);
    }

    fn apply_color(&mut self) {
        let css = self.state.color.to_css();
        self.backend.set_fill_style(&css);
        self.backend.set_stroke_style(&css);
    }

    /// Pushes every piece of mirrored state to the backend.
    fn sync_backend(&mut self) {
        self.apply_transformation();
        self.apply_color();
        self.backend.set_global_alpha(self.effective_alpha());
        self.backend
            .set_image_smoothing(self.state.image_scale_quality.smoothing());
    }

    /// Top opacity entry clamped to what a backend accepts.
    fn effective_alpha(&self) -> f32 {
        self.opacity().clamp(0.0, 1.0)
    }

    fn stroke_path(&mut self, strength: f32) {
        self.backend.set_global_alpha(self.effective_alpha());
        let previous = self.backend.line_width();
        self.backend.set_line_width(strength.round());
        self.backend.stroke();
        self.backend.set_line_width(previous);
    }

    fn fill_path(&mut self) {
        let opacity = self.effective_alpha();
        self.backend
            .set_global_alpha(opacity * self.state.color.alpha_float());
        self.backend.fill();
        self.backend.set_global_alpha(opacity);
    }
}

impl<B: RasterBackend, G: GlyphAtlas> DrawingContext for RasterDrawingContext<B, G> {
    // ── frame ─────────────────────────────────────────────────────────────

    fn begin(&mut self, clear: bool, clear_color: Option<Color>) {
        if clear {
            self.clear(clear_color);
        } else {
            self.set_color(Color::BLACK);
        }
    }

    fn end(&mut self) {
        self.glyphs.bake_pending();
        if !self.scissors.is_empty() {
            log::warn!(
                "RasterDrawingContext: frame ended with {} open scissor region(s)",
                self.scissors.len()
            );
        }
    }

    fn clear(&mut self, color: Option<Color>) {
        let color = color.unwrap_or(self.config.clear_color);
        let bounds = self.config.viewport.bounds();

        self.backend.save();
        self.backend.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        self.backend.set_global_alpha(color.alpha_float());
        self.backend.set_fill_style(&color.to_css());
        self.backend.fill_rect(bounds);
        self.backend.restore();

        self.set_color(Color::BLACK);
    }

    // ── draw state ────────────────────────────────────────────────────────

    fn color(&self) -> Color {
        self.state.color
    }

    fn set_color(&mut self, color: Color) {
        self.state.color = color;
        self.apply_color();
    }

    fn font(&self) -> Option<&Font> {
        self.state.font.as_ref()
    }

    fn set_font(&mut self, font: Option<Font>) {
        self.state.font = font;
    }

    fn font_size(&self) -> f32 {
        self.state.font_size
    }

    fn set_font_size(&mut self, size: f32) {
        self.state.font_size = size;
    }

    fn image_scale_quality(&self) -> ImageScaleQuality {
        self.state.image_scale_quality
    }

    fn set_image_scale_quality(&mut self, quality: ImageScaleQuality) {
        self.state.image_scale_quality = quality;
        self.backend.set_image_smoothing(quality.smoothing());
    }

    // ── transform stack ───────────────────────────────────────────────────

    fn transformation(&self) -> AffineMatrix {
        self.transformations
            .last()
            .copied()
            .unwrap_or(AffineMatrix::IDENTITY)
    }

    fn set_transformation(&mut self, m: AffineMatrix) {
        match self.transformations.last_mut() {
            Some(top) => *top = m,
            None => self.transformations.push(m),
        }
        self.apply_transformation();
    }

    fn push_transformation(&mut self, m: AffineMatrix) {
        self.transformations.push(m);
        self.apply_transformation();
    }

    fn pop_transformation(&mut self) -> Option<AffineMatrix> {
        if self.transformations.len() <= 1 {
            log::warn!("RasterDrawingContext: pop_transformation on the base entry, ignored");
            return None;
        }
        let popped = self.transformations.pop();
        self.apply_transformation();
        popped
    }

    // ── opacity stack ─────────────────────────────────────────────────────

    fn opacity(&self) -> f32 {
        self.opacities.last().copied().unwrap_or(1.0)
    }

    fn set_opacity(&mut self, opacity: f32) {
        match self.opacities.last_mut() {
            Some(top) => *top = opacity,
            None => self.opacities.push(opacity),
        }
        self.backend.set_global_alpha(self.effective_alpha());
    }

    fn push_opacity(&mut self, opacity: f32) {
        self.opacities.push(opacity);
        self.backend.set_global_alpha(self.effective_alpha());
    }

    fn pop_opacity(&mut self) -> Option<f32> {
        if self.opacities.len() <= 1 {
            log::warn!("RasterDrawingContext: pop_opacity on the base entry, ignored");
            return None;
        }
        let popped = self.opacities.pop();
        self.backend.set_global_alpha(self.effective_alpha());
        popped
    }

    // ── images ────────────────────────────────────────────────────────────

    fn draw_scaled_sub_image(&mut self, image: &dyn Image, src: Rect, dst: Rect) {
        let (dw, dh) = (dst.size.x, dst.size.y);
        let mirror = AffineMatrix::translation(
            dst.origin.x + if dw < 0.0 { -dw } else { 0.0 },
            dst.origin.y + if dh < 0.0 { -dh } else { 0.0 },
        )
        .multiply_matrix(AffineMatrix::scale(dw.signum(), dh.signum()));
        let (a, b, c, d, e, f) = self.transformation().multiply_matrix(mirror).to_canvas_2x3();

        self.backend.save();
        self.backend.set_global_alpha(self.effective_alpha());
        self.backend.set_transform(a, b, c, d, e, f);
        let result = self
            .backend
            .draw_image(image, Some(src), Rect::new(0.0, 0.0, dw.abs(), dh.abs()));
        self.backend.restore();

        if let Err(e) = result {
            log::debug!("RasterDrawingContext: image blit skipped: {e}");
        }
    }

    // ── primitives ────────────────────────────────────────────────────────

    fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32, strength: f32) {
        self.backend.begin_path();
        self.backend.rect(Rect::new(x, y, w, h));
        self.stroke_path(strength);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let opacity = self.effective_alpha();
        self.backend
            .set_global_alpha(opacity * self.state.color.alpha_float());
        self.backend.fill_rect(Rect::new(x, y, w, h));
        self.backend.set_global_alpha(opacity);
    }

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, strength: f32) {
        self.backend.begin_path();
        self.backend.move_to(Vec2::new(x1, y1));
        self.backend.line_to(Vec2::new(x2, y2));
        self.stroke_path(strength);
    }

    fn fill_triangle(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) {
        self.backend.begin_path();
        self.backend.move_to(Vec2::new(x1, y1));
        self.backend.line_to(Vec2::new(x2, y2));
        self.backend.line_to(Vec2::new(x3, y3));
        self.backend.close_path();
        self.fill_path();
    }

    // ── text ──────────────────────────────────────────────────────────────

    fn draw_string(&mut self, text: &str, x: f32, y: f32) {
        let Some(font) = self.state.font.clone() else {
            log::debug!("RasterDrawingContext: draw_string without a font, skipped");
            return;
        };
        let size = self.state.font_size;
        let color = self.state.color;

        self.glyphs.request(&font, size, color);
        let atlas = self.glyphs.image(&font, size, color);
        if atlas.is_empty() {
            log::trace!("RasterDrawingContext: atlas for {size}px not ready, text deferred");
            return;
        }
        let (aw, ah) = (atlas.width(), atlas.height());

        let opacity = self.effective_alpha();
        self.backend.set_global_alpha(opacity);
        let mut pen_x = x;
        for ch in text.chars() {
            let Some(index) = (ch as u32).checked_sub(FIRST_BAKED_CHAR) else {
                continue;
            };
            let Some(quad) = self.glyphs.baked_quad(&font, size, index, pen_x, y) else {
                log::trace!("RasterDrawingContext: no glyph for {ch:?}");
                continue;
            };
            pen_x += quad.advance;
            if !quad.is_drawable() {
                continue;
            }
            let src = quad.source_rect(aw, ah);
            let atlas = self.glyphs.image(&font, size, color);
            if let Err(e) = self.backend.draw_image(atlas, Some(src), quad.dst) {
                log::debug!("RasterDrawingContext: glyph blit skipped: {e}");
            }
        }
    }

    fn string_width(&mut self, font: &Font, text: &str) -> f32 {
        let size = font.size();
        let color = self.state.color;
        self.glyphs.request(font, size, color);
        if self.glyphs.image(font, size, color).is_empty() {
            return self.backend.measure_text(text);
        }
        text.chars()
            .filter_map(|ch| (ch as u32).checked_sub(FIRST_BAKED_CHAR))
            .filter_map(|index| self.glyphs.baked_quad(font, size, index, 0.0, 0.0))
            .map(|quad| quad.advance)
            .sum()
    }

    // ── clipping ──────────────────────────────────────────────────────────

    fn scissor(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let rect = Rect::new(x, y, w, h);
        self.backend.save();
        self.backend.begin_path();
        self.backend.rect(rect);
        self.backend.clip();
        self.scissors.push(rect);
        self.state.scissor = Some(rect);
    }

    fn disable_scissor(&mut self) {
        if self.scissors.pop().is_none() {
            log::warn!("RasterDrawingContext: disable_scissor without an open scissor, ignored");
            return;
        }
        self.state.scissor = self.scissors.last().copied();
        self.backend.restore();
        // Stack changes made inside the region outlive the restore.
        self.sync_backend();
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;
    use crate::graphics::{BackendCall, RecordingBackend};
    use crate::image::PixelImage;
    use crate::text::{FontId, FontStyle, GlyphQuad};

    /// Atlas that becomes ready on the first `bake_pending`. Carries 'A'..='Y'
    /// and space; 'Z' is missing.
    struct FakeAtlas {
        ready: bool,
        image: PixelImage,
        empty: PixelImage,
    }

    impl FakeAtlas {
        fn new() -> Self {
            Self {
                ready: false,
                image: PixelImage::from_fn(8, 8, |_, _| Color::WHITE),
                empty: PixelImage::empty(),
            }
        }
    }

    impl GlyphAtlas for FakeAtlas {
        fn request(&mut self, _font: &Font, _size: f32, _color: Color) {}

        fn image(&self, _font: &Font, _size: f32, _color: Color) -> &dyn Image {
            if self.ready { &self.image } else { &self.empty }
        }

        fn baked_quad(&self, _font: &Font, _size: f32, index: u32, pen_x: f32, pen_y: f32)
            -> Option<GlyphQuad>
        {
            if !self.ready {
                return None;
            }
            match char::from_u32(index + FIRST_BAKED_CHAR)? {
                ' ' => Some(GlyphQuad {
                    uv: Rect::new(0.0, 0.0, 0.0, 0.0),
                    dst: Rect::new(pen_x, pen_y, 0.0, 0.0),
                    advance: 4.0,
                }),
                'A'..='Y' => Some(GlyphQuad {
                    uv: Rect::new(0.0, 0.0, 0.5, 0.5),
                    dst: Rect::new(pen_x, pen_y, 4.0, 8.0),
                    advance: 6.0,
                }),
                _ => None,
            }
        }

        fn bake_pending(&mut self) {
            self.ready = true;
        }
    }

    type TestContext = RasterDrawingContext<RecordingBackend, FakeAtlas>;

    fn ctx() -> TestContext {
        RasterDrawingContext::new(RecordingBackend::new(), FakeAtlas::new())
    }

    fn font() -> Font {
        Font::new(FontId::new(0), "Test", FontStyle::REGULAR, 12.0)
    }

    fn image_draws(ctx: &TestContext) -> Vec<(Rect, AffineMatrix, f32)> {
        ctx.backend()
            .calls()
            .iter()
            .filter_map(|c| match c {
                BackendCall::DrawImage { dst, transform, alpha, .. } => Some((*dst, *transform, *alpha)),
                _ => None,
            })
            .collect()
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    // ── frame ─────────────────────────────────────────────────────────────

    #[test]
    fn begin_clears_viewport_and_resets_color() {
        let mut c = ctx();
        c.push_translation(50.0, 50.0);
        c.set_color(Color::RED);
        c.backend_mut().take_calls();

        c.begin(true, Some(Color::BLUE));

        let fill = c.backend().calls().iter().find_map(|call| match call {
            BackendCall::FillRect { rect, transform, style, .. } => Some((*rect, *transform, style.clone())),
            _ => None,
        });
        let (rect, transform, style) = fill.unwrap();
        assert_eq!(rect, Viewport::default().bounds());
        assert_eq!(transform, AffineMatrix::IDENTITY);
        assert_eq!(style, "rgb(0,0,255)");
        assert_eq!(c.color(), Color::BLACK);
        assert_eq!(c.backend().fill_style(), "rgb(0,0,0)");
        assert_eq!(c.backend().transform(), AffineMatrix::translation(50.0, 50.0));
    }

    #[test]
    fn begin_without_clear_only_resets_color() {
        let mut c = ctx();
        c.set_color(Color::GREEN);
        c.backend_mut().take_calls();
        c.begin(false, None);
        assert!(!c.backend().calls().iter().any(|call| matches!(call, BackendCall::FillRect { .. })));
        assert_eq!(c.color(), Color::BLACK);
    }

    // ── transform stack ───────────────────────────────────────────────────

    #[test]
    fn translate_then_inverse_translate_restores() {
        let mut c = ctx();
        c.translate(13.0, -7.5);
        assert_eq!(c.transformation(), AffineMatrix::translation(13.0, -7.5));
        c.translate(-13.0, 7.5);
        assert!(c.transformation().approx_eq(AffineMatrix::IDENTITY, 1e-6));
        assert_eq!(c.transformation_depth(), 1);
        assert!(c.backend().transform().approx_eq(AffineMatrix::IDENTITY, 1e-6));
    }

    #[test]
    fn translate_composes_after_current() {
        let mut c = ctx();
        c.set_transformation(AffineMatrix::scale(2.0, 2.0));
        c.translate(1.0, 0.0);
        // T · S: scale first, then translate.
        let p = c.transformation().multiply_vector(Vec2::new(3.0, 0.0));
        assert_eq!(p, Vec2::new(7.0, 0.0));
    }

    #[test]
    fn rotation_about_pivot_keeps_pivot_fixed() {
        let mut c = ctx();
        c.rotate(FRAC_PI_2, 10.0, 10.0);
        let m = c.transformation();
        assert!(m.multiply_vector(Vec2::new(10.0, 10.0)).approx_eq(Vec2::new(10.0, 10.0), 1e-4));
        assert!(m.multiply_vector(Vec2::new(20.0, 10.0)).approx_eq(Vec2::new(10.0, 20.0), 1e-4));
    }

    #[test]
    fn pop_returns_pushed_entry_and_reapplies_top() {
        let mut c = ctx();
        c.push_translation(10.0, 0.0);
        c.push_rotation(1.0, 0.0, 0.0);
        assert_eq!(c.transformation_depth(), 3);

        let popped = c.pop_transformation().unwrap();
        assert!(popped.approx_eq(c.rotation(1.0, 0.0, 0.0), 1e-6));
        assert_eq!(c.backend().transform(), AffineMatrix::translation(10.0, 0.0));

        assert_eq!(c.pop_transformation(), Some(AffineMatrix::translation(10.0, 0.0)));
        assert_eq!(c.pop_transformation(), None);
        assert_eq!(c.transformation_depth(), 1);
        assert_eq!(c.backend().transform(), AffineMatrix::IDENTITY);
    }

    // ── opacity stack ─────────────────────────────────────────────────────

    #[test]
    fn opacity_entries_are_absolute() {
        let mut c = ctx();
        c.push_opacity(0.5);
        c.push_opacity(0.2);
        assert_eq!(c.opacity(), 0.2);
        assert_eq!(c.pop_opacity(), Some(0.2));
        assert_eq!(c.opacity(), 0.5);
        assert_eq!(c.backend().global_alpha(), 0.5);
        assert_eq!(c.pop_opacity(), Some(0.5));
        assert_eq!(c.pop_opacity(), None);
        assert_eq!(c.opacity(), 1.0);
        assert_eq!(c.opacity_depth(), 1);
    }

    #[test]
    fn opacity_keeps_literal_value_and_clamps_backend_alpha() {
        let mut c = ctx();
        c.push_opacity(1.5);
        assert_eq!(c.opacity(), 1.5);
        assert_eq!(c.backend().global_alpha(), 1.0);

        c.set_color(Color::WHITE);
        c.fill_rect(0.0, 0.0, 1.0, 1.0);
        let alpha = c.backend().calls().iter().find_map(|call| match call {
            BackendCall::FillRect { alpha, .. } => Some(*alpha),
            _ => None,
        });
        assert_eq!(alpha, Some(1.0));

        c.set_opacity(-0.25);
        assert_eq!(c.opacity(), -0.25);
        assert_eq!(c.backend().global_alpha(), 0.0);
        assert_eq!(c.pop_opacity(), Some(-0.25));
        assert_eq!(c.opacity_depth(), 1);
    }

    // ── primitives ────────────────────────────────────────────────────────

    #[test]
    fn fill_alpha_is_opacity_times_color_alpha() {
        let mut c = ctx();
        c.set_color(Color::RED.with_alpha(51));
        c.push_opacity(0.5);
        c.fill_rect(1.0, 2.0, 3.0, 4.0);

        let alpha = c.backend().calls().iter().find_map(|call| match call {
            BackendCall::FillRect { rect, alpha, .. } => {
                assert_eq!(*rect, Rect::new(1.0, 2.0, 3.0, 4.0));
                Some(*alpha)
            }
            _ => None,
        });
        assert!(approx(alpha.unwrap(), 0.5 * 0.2));
        assert_eq!(c.backend().global_alpha(), 0.5);
    }

    #[test]
    fn fill_triangle_closes_path_with_fill_alpha() {
        let mut c = ctx();
        c.set_color(Color::WHITE.with_alpha(102));
        c.backend_mut().take_calls();
        c.fill_triangle(0.0, 0.0, 4.0, 0.0, 0.0, 4.0);

        let calls = c.backend().calls();
        assert_eq!(calls[0], BackendCall::BeginPath);
        assert_eq!(calls[1], BackendCall::MoveTo(Vec2::new(0.0, 0.0)));
        assert_eq!(calls[4], BackendCall::ClosePath);
        let fill_alpha = calls.iter().find_map(|call| match call {
            BackendCall::Fill { alpha, .. } => Some(*alpha),
            _ => None,
        });
        assert!(approx(fill_alpha.unwrap(), 0.4));
    }

    #[test]
    fn stroke_width_is_rounded_and_ignores_color_alpha() {
        let mut c = ctx();
        c.set_color(Color::BLUE.with_alpha(0));
        c.push_opacity(0.75);
        c.draw_rect(0.0, 0.0, 10.0, 10.0, 2.6);
        c.draw_line(0.0, 0.0, 5.0, 5.0, 1.4);

        let strokes: Vec<(f32, f32)> = c
            .backend()
            .calls()
            .iter()
            .filter_map(|call| match call {
                BackendCall::Stroke { alpha, line_width, .. } => Some((*alpha, *line_width)),
                _ => None,
            })
            .collect();
        assert_eq!(strokes, vec![(0.75, 3.0), (0.75, 1.0)]);
        assert_eq!(c.backend().line_width(), 1.0);
    }

    // ── images ────────────────────────────────────────────────────────────

    #[test]
    fn negative_width_mirrors_inside_destination() {
        let mut c = ctx();
        let img = PixelImage::from_fn(2, 1, |x, _| if x == 0 { Color::RED } else { Color::BLUE });
        c.draw_scaled_sub_image(&img, Rect::new(0.0, 0.0, 2.0, 1.0), Rect::new(10.0, 20.0, -2.0, 1.0));

        let draws = image_draws(&c);
        assert_eq!(draws.len(), 1);
        let (dst, transform, _) = draws[0];
        assert_eq!(dst, Rect::new(0.0, 0.0, 2.0, 1.0));
        // Source pixel (0,0) lands at (x + |w|, y).
        assert_eq!(transform.multiply_vector(Vec2::new(0.0, 0.0)), Vec2::new(12.0, 20.0));
        assert_eq!(transform.multiply_vector(Vec2::new(2.0, 1.0)), Vec2::new(10.0, 21.0));

        assert_eq!(c.transformation(), AffineMatrix::IDENTITY);
        assert_eq!(c.transformation_depth(), 1);
        assert_eq!(c.backend().transform(), AffineMatrix::IDENTITY);
        assert_eq!(c.backend().save_depth(), 0);
    }

    #[test]
    fn negative_width_and_height_mirror_through_a_point() {
        let mut c = ctx();
        c.push_translation(5.0, 0.0);
        let img = PixelImage::from_fn(2, 3, |_, _| Color::WHITE);
        c.draw_scaled_sub_image(&img, Rect::new(0.0, 0.0, 2.0, 3.0), Rect::new(10.0, 20.0, -2.0, -3.0));

        let (dst, transform, _) = image_draws(&c)[0];
        assert_eq!(dst, Rect::new(0.0, 0.0, 2.0, 3.0));
        // Source (0,0) lands at (x + |w|, y + |h|), after the active translation.
        assert_eq!(transform.multiply_vector(Vec2::new(0.0, 0.0)), Vec2::new(17.0, 23.0));
        assert_eq!(transform.multiply_vector(Vec2::new(2.0, 3.0)), Vec2::new(15.0, 20.0));

        assert_eq!(c.transformation(), AffineMatrix::translation(5.0, 0.0));
        assert_eq!(c.transformation_depth(), 2);
        assert_eq!(c.backend().transform(), AffineMatrix::translation(5.0, 0.0));
        assert_eq!(c.backend().save_depth(), 0);
    }

    #[test]
    fn mirror_composes_with_active_transform() {
        let mut c = ctx();
        c.translate(100.0, 0.0);
        let img = PixelImage::from_fn(4, 4, |_, _| Color::WHITE);
        c.draw_scaled_image(&img, 0.0, 0.0, 4.0, -4.0);

        let (_, transform, _) = image_draws(&c)[0];
        assert_eq!(transform.multiply_vector(Vec2::new(0.0, 0.0)), Vec2::new(100.0, 4.0));
        assert_eq!(c.backend().transform(), AffineMatrix::translation(100.0, 0.0));
    }

    #[test]
    fn draw_image_uses_full_source_at_opacity() {
        let mut c = ctx();
        c.push_opacity(0.25);
        let img = PixelImage::from_fn(3, 2, |_, _| Color::WHITE);
        c.draw_image(&img, 5.0, 6.0);

        let src = c.backend().calls().iter().find_map(|call| match call {
            BackendCall::DrawImage { src, .. } => *src,
            _ => None,
        });
        assert_eq!(src, Some(Rect::new(0.0, 0.0, 3.0, 2.0)));
        let (dst, transform, alpha) = image_draws(&c)[0];
        assert_eq!(dst, Rect::new(0.0, 0.0, 3.0, 2.0));
        assert_eq!(transform, AffineMatrix::translation(5.0, 6.0));
        assert_eq!(alpha, 0.25);
    }

    #[test]
    fn backend_blit_error_is_swallowed() {
        let mut c = ctx();
        c.backend_mut().reject_images(true);
        let img = PixelImage::from_fn(2, 2, |_, _| Color::WHITE);
        c.draw_image(&img, 0.0, 0.0);
        assert!(image_draws(&c).is_empty());
        assert_eq!(c.backend().save_depth(), 0);

        c.backend_mut().reject_images(false);
        c.draw_image(&PixelImage::empty(), 0.0, 0.0);
        assert!(image_draws(&c).is_empty());
    }

    #[test]
    fn image_scale_quality_toggles_smoothing() {
        let mut c = ctx();
        assert_eq!(c.image_scale_quality(), ImageScaleQuality::Low);
        assert!(!c.backend().image_smoothing());
        c.set_image_scale_quality(ImageScaleQuality::High);
        assert!(c.backend().image_smoothing());
    }

    // ── text ──────────────────────────────────────────────────────────────

    #[test]
    fn draw_string_waits_for_atlas() {
        let mut c = ctx();
        c.set_font(Some(font()));
        c.draw_string("AB", 0.0, 0.0);
        assert!(image_draws(&c).is_empty());

        c.end();
        c.draw_string("AB", 0.0, 0.0);
        assert_eq!(image_draws(&c).len(), 2);
    }

    #[test]
    fn draw_string_skips_unsupported_and_blank_glyphs() {
        let mut c = ctx();
        c.set_font(Some(font()));
        c.end();
        c.draw_string("AZ B\u{7}", 2.0, 3.0);

        let xs: Vec<f32> = image_draws(&c).iter().map(|(dst, _, _)| dst.origin.x).collect();
        // 'A' at the pen, 'Z' has no glyph, ' ' only advances.
        assert_eq!(xs, vec![2.0, 12.0]);
        assert!(image_draws(&c).iter().all(|(dst, _, _)| dst.origin.y == 3.0));

        let src = c.backend().calls().iter().find_map(|call| match call {
            BackendCall::DrawImage { src, .. } => *src,
            _ => None,
        });
        assert_eq!(src, Some(Rect::new(0.0, 0.0, 4.0, 4.0)));
    }

    #[test]
    fn draw_string_without_font_is_noop() {
        let mut c = ctx();
        c.end();
        c.draw_string("A", 0.0, 0.0);
        assert!(image_draws(&c).is_empty());
    }

    #[test]
    fn string_width_falls_back_until_baked() {
        let mut c = ctx();
        let f = font();
        assert_eq!(c.string_width(&f, "abc"), 15.0);
        assert!(c.backend().calls().contains(&BackendCall::MeasureText("abc".into())));

        c.end();
        assert_eq!(c.string_width(&f, "A B"), 16.0);
        assert_eq!(f.char_width(&mut c, 'A'), 6.0);
        assert_eq!(f.chars_width(&mut c, "xAAx", 1, 2), 12.0);
        assert_eq!(f.string_width(&mut c, "Z"), 0.0);
    }

    // ── clipping ──────────────────────────────────────────────────────────

    #[test]
    fn scissor_depth_tracks_nesting() {
        let mut c = ctx();
        c.scissor(0.0, 0.0, 50.0, 50.0);
        c.scissor(10.0, 10.0, 5.0, 5.0);
        assert_eq!(c.scissor_depth(), 2);
        assert_eq!(c.state().scissor, Some(Rect::new(10.0, 10.0, 5.0, 5.0)));
        assert_eq!(c.backend().save_depth(), 2);

        c.disable_scissor();
        assert_eq!(c.state().scissor, Some(Rect::new(0.0, 0.0, 50.0, 50.0)));
        c.disable_scissor();
        assert_eq!(c.scissor_depth(), 0);
        assert_eq!(c.state().scissor, None);

        let restores = |c: &TestContext| {
            c.backend().calls().iter().filter(|call| **call == BackendCall::Restore).count()
        };
        let before = restores(&c);
        c.disable_scissor();
        assert_eq!(restores(&c), before);
    }

    #[test]
    fn state_changed_inside_scissor_survives_disable() {
        let mut c = ctx();
        c.scissor(0.0, 0.0, 20.0, 20.0);
        c.push_translation(3.0, 4.0);
        c.set_color(Color::RED);
        c.push_opacity(0.4);
        c.disable_scissor();

        assert_eq!(c.backend().transform(), AffineMatrix::translation(3.0, 4.0));
        assert_eq!(c.backend().fill_style(), "rgb(255,0,0)");
        assert_eq!(c.backend().global_alpha(), 0.4);
        assert_eq!(c.backend().save_depth(), 0);
    }
}
