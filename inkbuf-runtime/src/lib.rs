//! Software drawing surfaces for low bit depth displays.
//!
//! Packed 1 and 2 bits-per-pixel gray buffers and a 32-bit true color buffer share one
//! [`render::DrawBuf`] interface: clipped fills, glyph stamping, and streaming scaled image
//! compositing with ordered dithering down to whatever the surface stores.

/// Viewer settings
pub mod config;

/// Graphics primitives, such as color, dithering and typeface
pub mod graphics;

/// Positions, sizes and the clip rectangle
pub mod layout;

/// Draw buffers and everything that writes into them
pub mod render;
