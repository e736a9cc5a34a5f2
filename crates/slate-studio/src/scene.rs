use slate_engine::graphics::{DrawingContext, ImageScaleQuality};
use slate_engine::image::PixelImage;
use slate_engine::paint::Color;

/// Static content shared by every frame.
pub struct Scene {
    checker: PixelImage,
    frame: u32,
}

impl Scene {
    pub fn new() -> Self {
        let checker = PixelImage::from_fn(8, 8, |x, y| {
            match ((x / 2) + (y / 2)) % 2 {
                0 => Color::ORANGE,
                _ => Color::PURPLE.with_alpha(160),
            }
        });
        Self { checker, frame: 0 }
    }

    /// Draws one frame between `begin` and `end`.
    pub fn render(&mut self, g: &mut dyn DrawingContext) {
        g.begin(true, Some(Color::from_rgb_bytes(24, 26, 32)));

        button(g, 10.0, 10.0);

        // ── transforms ────────────────────────────────────────────────────
        g.push_rotation(0.3, 330.0, 60.0);
        g.set_color(Color::CYAN);
        g.draw_rect(280.0, 20.0, 100.0, 80.0, 3.0);
        g.pop_transformation();

        g.set_color(Color::YELLOW);
        g.draw_line(20.0, 150.0, 620.0, 150.0, 2.0);
        g.set_color(Color::GREEN);
        g.fill_triangle(420.0, 110.0, 470.0, 30.0, 520.0, 110.0);

        // ── images ────────────────────────────────────────────────────────
        g.set_image_scale_quality(ImageScaleQuality::Low);
        g.draw_scaled_image(&self.checker, 20.0, 180.0, 96.0, 96.0);
        g.push_opacity(0.6);
        g.draw_scaled_image(&self.checker, 236.0, 180.0, -96.0, 96.0);
        g.pop_opacity();
        g.set_image_scale_quality(ImageScaleQuality::High);
        g.draw_scaled_image(&self.checker, 260.0, 180.0, 96.0, 96.0);

        // ── clipping ──────────────────────────────────────────────────────
        g.scissor(400.0, 180.0, 60.0, 60.0);
        g.set_color(Color::PINK);
        g.fill_rect(380.0, 160.0, 120.0, 120.0);
        g.disable_scissor();

        // ── text ──────────────────────────────────────────────────────────
        if let Some(font) = g.font().cloned() {
            g.set_color(Color::WHITE);
            g.draw_string("Slate engine", 20.0, 300.0);
            let width = font.string_width(g, "Slate engine");
            g.set_color(Color::RED);
            g.draw_line(20.0, 300.0 + font.height(), 20.0 + width, 300.0 + font.height(), 1.0);
        }

        g.end();
        self.frame += 1;
    }

    pub fn frames_rendered(&self) -> u32 {
        self.frame
    }
}

fn button(g: &mut dyn DrawingContext, x: f32, y: f32) {
    g.set_color(Color::BLACK);
    g.fill_rect(x + 10.0, y + 10.0, 200.0, 100.0);
    g.set_color(Color::BLUE);
    g.fill_rect(x, y, 200.0, 100.0);
}
