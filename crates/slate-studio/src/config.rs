use std::path::PathBuf;

use clap::Parser;

/// Renders the demo scene with the software backend and saves the last frame.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(version, about, long_about = None)]
pub struct StudioConfig {
    /// PNG written after the last frame.
    #[arg(default_value = "slate-studio.png")]
    pub output: PathBuf,

    /// Frames rendered before saving. Text needs at least two: the first
    /// frame schedules the glyph atlas, later frames draw with it.
    #[arg(default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    pub frames: u32,

    /// TrueType/OpenType file for the text sample.
    #[arg(long, env = "SLATE_FONT")]
    pub font: Option<PathBuf>,

    #[arg(long, default_value_t = 640, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    #[arg(long, default_value_t = 480, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,
}
