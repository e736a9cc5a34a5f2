//! Geometry value types shared by the drawing context and backends.
//!
//! User space:
//! - origin top-left
//! - +X right, +Y down
//! - units are surface pixels before the active transform is applied

mod rect;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
