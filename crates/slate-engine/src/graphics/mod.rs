//! Stateful 2D drawing.
//!
//! [`DrawingContext`] is the drawing surface API. [`RasterDrawingContext`]
//! implements it on top of any [`RasterBackend`] (a canvas-like path/blit
//! primitive set) and any [`GlyphAtlas`](crate::text::GlyphAtlas).
//!
//! Every state change is pushed to the backend as it happens, so the
//! backend's own transform, alpha and styles always mirror the top of the
//! context's stacks.

mod backend;
mod config;
mod context;
mod raster_context;
mod recording;

pub use backend::{BackendError, RasterBackend, FALLBACK_CHAR_ADVANCE};
pub use config::ContextConfig;
pub use context::{DrawingContext, ImageScaleQuality};
pub use raster_context::{DrawState, RasterDrawingContext};
pub use recording::{BackendCall, RecordingBackend};
