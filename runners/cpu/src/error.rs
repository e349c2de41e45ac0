use std::io;

use thiserror::Error;

use crate::mask::{MaskRegion, MAX_TEXTURE_DIMENSION};

pub type Result<T, E = RunnerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("alpha mask must not be empty, got {width}x{height}")]
    EmptyMask { width: u32, height: u32 },
    #[error(
        "alpha mask {width}x{height} exceeds the {max} texel limit",
        max = MAX_TEXTURE_DIMENSION
    )]
    MaskTooLarge { width: u32, height: u32 },
    #[error("update region {region:?} lies outside the {width}x{height} alpha mask")]
    RegionOutOfBounds {
        region: MaskRegion,
        width: u32,
        height: u32,
    },
    #[error("update region {region:?} needs {expected} bytes, got {actual}")]
    DataLength {
        region: MaskRegion,
        expected: usize,
        actual: usize,
    },
    #[error("glyph of {width}x{height} texels does not fit any alpha mask")]
    GlyphTooLarge { width: u32, height: u32 },
    #[error("invalid scissor rect `{0}`, expected `x,y,width,height`")]
    InvalidScissor(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}
