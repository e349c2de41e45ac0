//! Evaluates the glyph shaders on the CPU.
//!
//! The shader crate is compiled natively and its stage functions are driven
//! by a small rasterizer, which makes it possible to check what the GPU would
//! draw without a device.

pub mod atlas;
pub mod error;
pub mod glyph;
pub mod mask;
pub mod raster;

pub use atlas::{GlyphAtlas, GlyphBitmap};
pub use error::{Result, RunnerError};
pub use glyph::{glyph_quad, Rect};
pub use mask::{AlphaMask, FilterMode, MaskRegion, Sampler, MAX_TEXTURE_DIMENSION};
pub use raster::{draw, DrawCall, DrawStats, Scissor, Target};
