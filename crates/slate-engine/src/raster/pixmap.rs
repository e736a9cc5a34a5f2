use std::rc::Rc;

use crate::coords::{Rect, Vec2};
use crate::graphics::{BackendError, RasterBackend, FALLBACK_CHAR_ADVANCE};
use crate::image::Image;
use crate::math::AffineMatrix;
use crate::paint::Color;

use super::scanline::fill_nonzero;

#[derive(Debug, Clone)]
struct SubPath {
    points: Vec<Vec2>,
    closed: bool,
}

/// Everything `save`/`restore` snapshots.
#[derive(Debug, Clone)]
struct RasterState {
    transform: AffineMatrix,
    fill: Color,
    stroke: Color,
    alpha: f32,
    line_width: f32,
    smoothing: bool,
    /// Per-pixel clip; `None` means unclipped.
    clip: Option<Rc<Vec<bool>>>,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            transform: AffineMatrix::IDENTITY,
            fill: Color::BLACK,
            stroke: Color::BLACK,
            alpha: 1.0,
            line_width: 1.0,
            smoothing: true,
            clip: None,
        }
    }
}

/// In-memory ARGB surface rendered on the CPU.
///
/// Paths are transformed to device space as they are built, so a transform
/// change mid-path only affects later points.
#[derive(Debug)]
pub struct PixmapBackend {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    state: RasterState,
    saved: Vec<RasterState>,
    path: Vec<SubPath>,
}

impl PixmapBackend {
    /// Transparent surface of `width × height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
            state: RasterState::default(),
            saved: Vec::new(),
            path: Vec::new(),
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        self.at(x, y)
    }

    /// Pixels as RGBA bytes, row-major, for image encoders.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for &v in &self.pixels {
            let c = Color::from_value(v);
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn clipped(&self, x: u32, y: u32) -> bool {
        match &self.state.clip {
            Some(mask) => !mask.get(self.index(x, y)).copied().unwrap_or(false),
            None => false,
        }
    }

    /// Source-over blend of `color` scaled by `alpha` onto pixel `(x, y)`.
    fn blend(&mut self, x: u32, y: u32, color: Color, alpha: f32) {
        if x >= self.width || y >= self.height || self.clipped(x, y) {
            return;
        }
        let sa = color.alpha_float() * alpha;
        if sa <= 0.0 {
            return;
        }
        let i = self.index(x, y);
        if sa >= 1.0 {
            self.pixels[i] = color.value();
            return;
        }
        let dst = Color::from_value(self.pixels[i]);
        let da = dst.alpha_float();
        if da <= 0.0 {
            self.pixels[i] = color.with_alpha_float(sa).value();
            return;
        }
        let out_a = sa + da * (1.0 - sa);
        let mix = |s: f32, d: f32| (s * sa + d * da * (1.0 - sa)) / out_a;
        self.pixels[i] = Color::from_floats(
            mix(color.red_float(), dst.red_float()),
            mix(color.green_float(), dst.green_float()),
            mix(color.blue_float(), dst.blue_float()),
            out_a,
        )
        .value();
    }

    fn fill_polygons(&mut self, polygons: &[Vec<Vec2>], color: Color) {
        let mut covered = Vec::new();
        fill_nonzero(polygons, self.width, self.height, |x, y| covered.push((x, y)));
        let alpha = self.state.alpha;
        for (x, y) in covered {
            self.blend(x, y, color, alpha);
        }
    }

    fn device_rect(&self, rect: Rect) -> Vec<Vec2> {
        rect.corners()
            .iter()
            .map(|&p| self.state.transform.multiply_vector(p))
            .collect()
    }

    /// Each segment becomes a quad `line_width` wide, all wound the same way
    /// so overlaps union. Closed subpaths extend segments by half the width
    /// to fill the corners.
    fn stroke_polygons(&self) -> Vec<Vec<Vec2>> {
        let scale = self.state.transform.determinant().abs().sqrt();
        let half = self.state.line_width * scale * 0.5;
        let mut quads = Vec::new();

        for sub in &self.path {
            let pts = &sub.points;
            let mut segments: Vec<(Vec2, Vec2)> = pts.windows(2).map(|w| (w[0], w[1])).collect();
            if sub.closed && pts.len() > 2 {
                if let (Some(&last), Some(&first)) = (pts.last(), pts.first()) {
                    segments.push((last, first));
                }
            }
            for (a, b) in segments {
                let d = b - a;
                if d.length() <= f32::EPSILON {
                    continue;
                }
                let dir = d.normalized();
                let (a, b) = if sub.closed {
                    (a - dir * half, b + dir * half)
                } else {
                    (a, b)
                };
                let n = dir.perp() * half;
                let mut quad = vec![a + n, b + n, b - n, a - n];
                if signed_area(&quad) < 0.0 {
                    quad.reverse();
                }
                quads.push(quad);
            }
        }
        quads
    }

    fn sample(&self, image: &dyn Image, src: Rect, sx: f32, sy: f32) -> Color {
        let x0 = src.origin.x.max(0.0);
        let y0 = src.origin.y.max(0.0);
        let x_max = (src.origin.x + src.size.x).min(image.width() as f32) - 1.0;
        let y_max = (src.origin.y + src.size.y).min(image.height() as f32) - 1.0;
        let clamp_x = |x: f32| x.clamp(x0, x_max.max(x0)) as u32;
        let clamp_y = |y: f32| y.clamp(y0, y_max.max(y0)) as u32;

        if !self.state.smoothing {
            return image.at(clamp_x(sx.floor()), clamp_y(sy.floor()));
        }

        let fx = sx - 0.5;
        let fy = sy - 0.5;
        let (bx, by) = (fx.floor(), fy.floor());
        let (tx, ty) = (fx - bx, fy - by);
        let taps = [
            (image.at(clamp_x(bx), clamp_y(by)), (1.0 - tx) * (1.0 - ty)),
            (image.at(clamp_x(bx + 1.0), clamp_y(by)), tx * (1.0 - ty)),
            (image.at(clamp_x(bx), clamp_y(by + 1.0)), (1.0 - tx) * ty),
            (image.at(clamp_x(bx + 1.0), clamp_y(by + 1.0)), tx * ty),
        ];

        // Premultiplied average so transparent taps don't darken edges.
        let (mut r, mut g, mut b, mut a) = (0.0, 0.0, 0.0, 0.0);
        for (c, w) in taps {
            let ca = c.alpha_float() * w;
            r += c.red_float() * ca;
            g += c.green_float() * ca;
            b += c.blue_float() * ca;
            a += ca;
        }
        if a <= 0.0 {
            return Color::TRANSPARENT;
        }
        Color::from_floats(r / a, g / a, b / a, a)
    }
}

fn signed_area(poly: &[Vec2]) -> f32 {
    let n = poly.len();
    (0..n)
        .map(|i| {
            let (a, b) = (poly[i], poly[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f32>()
        * 0.5
}

impl Image for PixmapBackend {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn at(&self, x: u32, y: u32) -> Color {
        if x >= self.width || y >= self.height {
            return Color::TRANSPARENT;
        }
        Color::from_value(self.pixels[self.index(x, y)])
    }
}

impl RasterBackend for PixmapBackend {
    fn measure_text(&mut self, text: &str) -> f32 {
        text.chars().count() as f32 * FALLBACK_CHAR_ADVANCE
    }

    fn draw_image(&mut self, image: &dyn Image, src: Option<Rect>, dst: Rect)
        -> Result<(), BackendError>
    {
        if image.is_empty() {
            return Err(BackendError::new("source image has no pixels"));
        }
        let src = src.unwrap_or_else(|| Rect::new(0.0, 0.0, image.width() as f32, image.height() as f32));
        if src.is_empty() || dst.is_empty() {
            return Ok(());
        }
        if !src.is_finite() || !dst.is_finite() {
            return Err(BackendError::new("non-finite image rectangle"));
        }
        let inverse = match self.state.transform.inverse() {
            Ok(m) => m,
            Err(e) => {
                log::trace!("PixmapBackend: singular transform ({e}), image skipped");
                return Ok(());
            }
        };

        let bounds = Rect::from_points(&self.device_rect(dst));
        let x0 = bounds.origin.x.floor().clamp(0.0, self.width as f32) as u32;
        let y0 = bounds.origin.y.floor().clamp(0.0, self.height as f32) as u32;
        let x1 = bounds.max().x.ceil().clamp(0.0, self.width as f32) as u32;
        let y1 = bounds.max().y.ceil().clamp(0.0, self.height as f32) as u32;
        let (kx, ky) = (src.size.x / dst.size.x, src.size.y / dst.size.y);
        let alpha = self.state.alpha;

        for y in y0..y1 {
            for x in x0..x1 {
                let u = inverse.multiply_vector(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                if !dst.contains(u) {
                    continue;
                }
                let sx = src.origin.x + (u.x - dst.origin.x) * kx;
                let sy = src.origin.y + (u.y - dst.origin.y) * ky;
                let color = self.sample(image, src, sx, sy);
                self.blend(x, y, color, alpha);
            }
        }
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect) {
        let poly = self.device_rect(rect);
        self.fill_polygons(&[poly], self.state.fill);
    }

    fn rect(&mut self, rect: Rect) {
        let points = self.device_rect(rect);
        self.path.push(SubPath { points, closed: true });
    }

    fn move_to(&mut self, p: Vec2) {
        let p = self.state.transform.multiply_vector(p);
        self.path.push(SubPath { points: vec![p], closed: false });
    }

    fn line_to(&mut self, p: Vec2) {
        let p = self.state.transform.multiply_vector(p);
        match self.path.last_mut() {
            Some(sub) if !sub.closed => sub.points.push(p),
            _ => self.path.push(SubPath { points: vec![p], closed: false }),
        }
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn close_path(&mut self) {
        if let Some(sub) = self.path.last_mut() {
            sub.closed = true;
        }
    }

    fn fill(&mut self) {
        let polygons: Vec<Vec<Vec2>> = self.path.iter().map(|s| s.points.clone()).collect();
        self.fill_polygons(&polygons, self.state.fill);
    }

    fn stroke(&mut self) {
        let quads = self.stroke_polygons();
        self.fill_polygons(&quads, self.state.stroke);
    }

    fn clip(&mut self) {
        let polygons: Vec<Vec<Vec2>> = self.path.iter().map(|s| s.points.clone()).collect();
        let mut mask = vec![false; self.pixels.len()];
        let width = self.width as usize;
        fill_nonzero(&polygons, self.width, self.height, |x, y| {
            mask[y as usize * width + x as usize] = true;
        });
        if let Some(previous) = &self.state.clip {
            for (m, p) in mask.iter_mut().zip(previous.iter()) {
                *m &= *p;
            }
        }
        self.state.clip = Some(Rc::new(mask));
    }

    fn save(&mut self) {
        self.saved.push(self.state.clone());
    }

    fn restore(&mut self) {
        match self.saved.pop() {
            Some(state) => self.state = state,
            None => log::debug!("PixmapBackend: restore without save, ignored"),
        }
    }

    fn set_transform(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.state.transform = AffineMatrix::from_canvas_2x3(a, b, c, d, e, f);
    }

    fn set_fill_style(&mut self, style: &str) {
        match Color::from_css(style) {
            Ok(c) => self.state.fill = c,
            Err(e) => log::debug!("PixmapBackend: {e}"),
        }
    }

    fn set_stroke_style(&mut self, style: &str) {
        match Color::from_css(style) {
            Ok(c) => self.state.stroke = c,
            Err(e) => log::debug!("PixmapBackend: {e}"),
        }
    }

    fn global_alpha(&self) -> f32 {
        self.state.alpha
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        if alpha.is_finite() {
            self.state.alpha = alpha.clamp(0.0, 1.0);
        }
    }

    fn line_width(&self) -> f32 {
        self.state.line_width
    }

    fn set_line_width(&mut self, width: f32) {
        if width.is_finite() && width > 0.0 {
            self.state.line_width = width;
        }
    }

    fn set_image_smoothing(&mut self, enabled: bool) {
        self.state.smoothing = enabled;
    }
}
