//! Text rendering through baked glyph atlases.
//!
//! A [`Font`] names a loaded face plus a default size. A [`GlyphAtlas`]
//! turns (font, size, color, character) into an atlas image and a
//! [`GlyphQuad`] per character. [`FontSystem`] is the fontdue-backed atlas.
//!
//! Atlas baking is deferred: the first request for a size only schedules it,
//! and the image stays empty until [`GlyphAtlas::bake_pending`] runs (the
//! drawing context calls it from `end()`). Text drawn before that is skipped
//! for the frame; re-issuing the draw next frame picks up the baked atlas.

mod atlas;
mod font;
mod font_system;

pub use atlas::{GlyphAtlas, GlyphQuad, FIRST_BAKED_CHAR, LAST_BAKED_CHAR};
pub use font::{Font, FontId, FontStyle};
pub use font_system::{FontLoadError, FontSystem, MAX_TINTED_SHEETS};
