mod config;
mod scene;

use anyhow::{Context, Result};
use clap::Parser;

use slate_engine::coords::Viewport;
use slate_engine::graphics::{ContextConfig, DrawingContext, RasterDrawingContext};
use slate_engine::logging::{init_logging, LoggingConfig};
use slate_engine::raster::PixmapBackend;
use slate_engine::text::{FontStyle, FontSystem};

use config::StudioConfig;
use scene::Scene;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = StudioConfig::parse();
    log::info!("rendering {} frame(s) to {}", config.frames, config.output.display());

    let mut fonts = FontSystem::new();
    let font = match &config.font {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read font {}", path.display()))?;
            Some(fonts.load_font("body", FontStyle::REGULAR, 18.0, &bytes)?)
        }
        None => {
            log::info!("no font given (--font or SLATE_FONT); skipping the text sample");
            None
        }
    };

    let backend = PixmapBackend::new(config.width, config.height);
    let mut ctx = RasterDrawingContext::with_config(
        backend,
        fonts,
        ContextConfig {
            viewport: Viewport::new(config.width as f32, config.height as f32),
            font_size: 18.0,
            ..ContextConfig::default()
        },
    );
    ctx.set_font(font);

    let mut scene = Scene::new();
    for _ in 0..config.frames {
        scene.render(&mut ctx);
    }
    log::debug!("rendered {} frame(s)", scene.frames_rendered());

    let pixmap = ctx.into_backend();
    image::save_buffer(
        &config.output,
        &pixmap.to_rgba8(),
        config.width,
        config.height,
        image::ExtendedColorType::Rgba8,
    )
    .with_context(|| format!("failed to write {}", config.output.display()))?;

    log::info!("wrote {}", config.output.display());
    Ok(())
}
