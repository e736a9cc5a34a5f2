use crate::coords::{Rect, Vec2};
use crate::image::Image;
use crate::math::AffineMatrix;

use super::{BackendError, RasterBackend, FALLBACK_CHAR_ADVANCE};

/// One call received by a [`RecordingBackend`].
///
/// Drawing calls carry the state in effect when they were issued, so a
/// test can assert what would have been rendered without reading pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    MeasureText(String),
    DrawImage {
        src: Option<Rect>,
        dst: Rect,
        transform: AffineMatrix,
        alpha: f32,
    },
    FillRect {
        rect: Rect,
        transform: AffineMatrix,
        alpha: f32,
        style: String,
    },
    Rect(Rect),
    MoveTo(Vec2),
    LineTo(Vec2),
    BeginPath,
    ClosePath,
    Fill {
        alpha: f32,
        style: String,
    },
    Stroke {
        alpha: f32,
        line_width: f32,
        style: String,
    },
    Clip,
    Save,
    Restore,
    SetTransform(AffineMatrix),
    SetFillStyle(String),
    SetStrokeStyle(String),
    SetGlobalAlpha(f32),
    SetLineWidth(f32),
    SetImageSmoothing(bool),
}

#[derive(Debug, Clone)]
struct RecordedState {
    transform: AffineMatrix,
    fill_style: String,
    stroke_style: String,
    alpha: f32,
    line_width: f32,
    smoothing: bool,
}

impl Default for RecordedState {
    fn default() -> Self {
        Self {
            transform: AffineMatrix::IDENTITY,
            fill_style: "rgb(0,0,0)".to_owned(),
            stroke_style: "rgb(0,0,0)".to_owned(),
            alpha: 1.0,
            line_width: 1.0,
            smoothing: true,
        }
    }
}

/// [`RasterBackend`] that renders nothing and logs every call.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    state: RecordedState,
    saved: Vec<RecordedState>,
    reject_images: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `draw_image` fail with a [`BackendError`].
    pub fn reject_images(&mut self, reject: bool) {
        self.reject_images = reject;
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Returns the log so far and starts a new one.
    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn transform(&self) -> AffineMatrix {
        self.state.transform
    }

    pub fn fill_style(&self) -> &str {
        &self.state.fill_style
    }

    pub fn stroke_style(&self) -> &str {
        &self.state.stroke_style
    }

    pub fn image_smoothing(&self) -> bool {
        self.state.smoothing
    }

    pub fn save_depth(&self) -> usize {
        self.saved.len()
    }
}

impl RasterBackend for RecordingBackend {
    fn measure_text(&mut self, text: &str) -> f32 {
        self.calls.push(BackendCall::MeasureText(text.to_owned()));
        text.chars().count() as f32 * FALLBACK_CHAR_ADVANCE
    }

    fn draw_image(&mut self, image: &dyn Image, src: Option<Rect>, dst: Rect)
        -> Result<(), BackendError>
    {
        if self.reject_images {
            return Err(BackendError::new("image draws rejected"));
        }
        if image.is_empty() {
            return Err(BackendError::new("source image has no pixels"));
        }
        self.calls.push(BackendCall::DrawImage {
            src,
            dst,
            transform: self.state.transform,
            alpha: self.state.alpha,
        });
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.calls.push(BackendCall::FillRect {
            rect,
            transform: self.state.transform,
            alpha: self.state.alpha,
            style: self.state.fill_style.clone(),
        });
    }

    fn rect(&mut self, rect: Rect) {
        self.calls.push(BackendCall::Rect(rect));
    }

    fn move_to(&mut self, p: Vec2) {
        self.calls.push(BackendCall::MoveTo(p));
    }

    fn line_to(&mut self, p: Vec2) {
        self.calls.push(BackendCall::LineTo(p));
    }

    fn begin_path(&mut self) {
        self.calls.push(BackendCall::BeginPath);
    }

    fn close_path(&mut self) {
        self.calls.push(BackendCall::ClosePath);
    }

    fn fill(&mut self) {
        self.calls.push(BackendCall::Fill {
            alpha: self.state.alpha,
            style: self.state.fill_style.clone(),
        });
    }

    fn stroke(&mut self) {
        self.calls.push(BackendCall::Stroke {
            alpha: self.state.alpha,
            line_width: self.state.line_width,
            style: self.state.stroke_style.clone(),
        });
    }

    fn clip(&mut self) {
        self.calls.push(BackendCall::Clip);
    }

    fn save(&mut self) {
        self.saved.push(self.state.clone());
        self.calls.push(BackendCall::Save);
    }

    fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
        self.calls.push(BackendCall::Restore);
    }

    fn set_transform(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        let m = AffineMatrix::from_canvas_2x3(a, b, c, d, e, f);
        self.state.transform = m;
        self.calls.push(BackendCall::SetTransform(m));
    }

    fn set_fill_style(&mut self, style: &str) {
        self.state.fill_style = style.to_owned();
        self.calls.push(BackendCall::SetFillStyle(style.to_owned()));
    }

    fn set_stroke_style(&mut self, style: &str) {
        self.state.stroke_style = style.to_owned();
        self.calls.push(BackendCall::SetStrokeStyle(style.to_owned()));
    }

    fn global_alpha(&self) -> f32 {
        self.state.alpha
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha;
        self.calls.push(BackendCall::SetGlobalAlpha(alpha));
    }

    fn line_width(&self) -> f32 {
        self.state.line_width
    }

    fn set_line_width(&mut self, width: f32) {
        self.state.line_width = width;
        self.calls.push(BackendCall::SetLineWidth(width));
    }

    fn set_image_smoothing(&mut self, enabled: bool) {
        self.state.smoothing = enabled;
        self.calls.push(BackendCall::SetImageSmoothing(enabled));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_returns_saved_state() {
        let mut b = RecordingBackend::new();
        b.save();
        b.set_transform(2.0, 0.0, 0.0, 2.0, 5.0, 6.0);
        b.set_global_alpha(0.3);
        b.set_fill_style("rgb(1,2,3)");
        b.restore();
        assert_eq!(b.transform(), AffineMatrix::IDENTITY);
        assert_eq!(b.global_alpha(), 1.0);
        assert_eq!(b.fill_style(), "rgb(0,0,0)");
        assert_eq!(b.save_depth(), 0);
    }

    #[test]
    fn unbalanced_restore_keeps_state() {
        let mut b = RecordingBackend::new();
        b.set_line_width(4.0);
        b.restore();
        assert_eq!(b.line_width(), 4.0);
    }

    #[test]
    fn measure_text_counts_chars() {
        let mut b = RecordingBackend::new();
        assert_eq!(b.measure_text("héllo"), 5.0 * FALLBACK_CHAR_ADVANCE);
    }
}
