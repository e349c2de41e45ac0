//! Single channel glyph cache texture and the sampler used to read it.

use spirv_std::glam::{vec4, Vec2, Vec4};
use strum::{Display, EnumString};

use crate::error::{Result, RunnerError};

/// Largest width or height a 2D texture may have.
pub const MAX_TEXTURE_DIMENSION: u32 = 16384;

/// A texel rectangle, `max` exclusive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MaskRegion {
    pub min: [u32; 2],
    pub max: [u32; 2],
}

impl MaskRegion {
    /// Edges past `u32::MAX` saturate, so [`AlphaMask::update`] rejects the
    /// region instead of it wrapping around.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            min: [x, y],
            max: [x.saturating_add(width), y.saturating_add(height)],
        }
    }

    pub fn width(&self) -> u32 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> u32 {
        self.max[1] - self.min[1]
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

/// Sampler state. Addressing is always clamp-to-edge.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Sampler {
    pub filter: FilterMode,
}

/// An R8 UNORM texture.
#[derive(Clone, Debug)]
pub struct AlphaMask {
    width: u32,
    height: u32,
    texels: Vec<u8>,
}

impl AlphaMask {
    /// A cleared mask.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RunnerError::EmptyMask { width, height });
        }
        if width > MAX_TEXTURE_DIMENSION || height > MAX_TEXTURE_DIMENSION {
            return Err(RunnerError::MaskTooLarge { width, height });
        }
        Ok(Self {
            width,
            height,
            texels: vec![0; width as usize * height as usize],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn texel(&self, x: u32, y: u32) -> u8 {
        self.texels[y as usize * self.width as usize + x as usize]
    }

    /// Copies the tightly packed `data` into `region`.
    pub fn update(&mut self, region: MaskRegion, data: &[u8]) -> Result<()> {
        if region.min[0] > region.max[0]
            || region.min[1] > region.max[1]
            || region.max[0] > self.width
            || region.max[1] > self.height
        {
            return Err(RunnerError::RegionOutOfBounds {
                region,
                width: self.width,
                height: self.height,
            });
        }

        let row_len = region.width() as usize;
        let expected = row_len * region.height() as usize;
        if data.len() != expected {
            return Err(RunnerError::DataLength {
                region,
                expected,
                actual: data.len(),
            });
        }
        if expected == 0 {
            return Ok(());
        }

        for (row, src) in data.chunks_exact(row_len).enumerate() {
            let start =
                (region.min[1] as usize + row) * self.width as usize + region.min[0] as usize;
            self.texels[start..start + row_len].copy_from_slice(src);
        }
        Ok(())
    }

    /// Replaces the mask with a cleared one large enough for `suggested`.
    ///
    /// Previous contents are dropped, everything has to be uploaded again.
    pub fn grow(&mut self, suggested: (u32, u32)) -> Result<(u32, u32)> {
        let (width, height) = grown_dimensions(self.dimensions(), suggested);
        log::warn!(
            "Increasing glyph texture size {old:?} -> {new:?}. \
             Consider starting with `--initial-mask-size {w}x{h}` to avoid resizing",
            old = self.dimensions(),
            new = (width, height),
            w = width,
            h = height,
        );
        *self = Self::new(width, height)?;
        Ok((width, height))
    }

    /// Reads the mask at `uv` like an R8 texture would: `(r, 0, 0, 1)`.
    pub fn sample(&self, sampler: &Sampler, uv: Vec2) -> Vec4 {
        let red = match sampler.filter {
            FilterMode::Nearest => {
                let x = (uv.x * self.width as f32).floor();
                let y = (uv.y * self.height as f32).floor();
                self.fetch(x as i64, y as i64)
            }
            FilterMode::Linear => {
                let x = uv.x * self.width as f32 - 0.5;
                let y = uv.y * self.height as f32 - 0.5;
                let (x0, y0) = (x.floor(), y.floor());
                let (fx, fy) = (x - x0, y - y0);
                let (x0, y0) = (x0 as i64, y0 as i64);

                let top = lerp(self.fetch(x0, y0), self.fetch(x0 + 1, y0), fx);
                let bottom = lerp(self.fetch(x0, y0 + 1), self.fetch(x0 + 1, y0 + 1), fx);
                lerp(top, bottom, fy)
            }
        };
        vec4(red, 0.0, 0.0, 1.0)
    }

    fn fetch(&self, x: i64, y: i64) -> f32 {
        let x = x.clamp(0, self.width as i64 - 1) as u32;
        let y = y.clamp(0, self.height as i64 - 1) as u32;
        f32::from(self.texel(x, y)) / 255.0
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Size to grow to when `suggested` no longer fits in `current`.
///
/// A suggestion past the texture limit is capped at the limit, unless the
/// mask is already there, in which case the suggestion is returned as is and
/// creating the mask fails.
pub fn grown_dimensions(current: (u32, u32), suggested: (u32, u32)) -> (u32, u32) {
    let max = MAX_TEXTURE_DIMENSION;
    if (suggested.0 > max || suggested.1 > max) && (current.0 < max || current.1 < max) {
        (max, max)
    } else {
        suggested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spirv_std::glam::vec2;

    fn checker() -> AlphaMask {
        let mut mask = AlphaMask::new(2, 2).unwrap();
        mask.update(MaskRegion::new(0, 0, 2, 2), &[0, 255, 255, 0]).unwrap();
        mask
    }

    #[test]
    fn rejects_bad_dimensions() {
        assert!(matches!(
            AlphaMask::new(0, 4),
            Err(RunnerError::EmptyMask { .. })
        ));
        assert!(matches!(
            AlphaMask::new(4, MAX_TEXTURE_DIMENSION + 1),
            Err(RunnerError::MaskTooLarge { .. })
        ));
    }

    #[test]
    fn update_writes_region_rows() {
        let mut mask = AlphaMask::new(4, 3).unwrap();
        mask.update(MaskRegion::new(1, 1, 2, 2), &[1, 2, 3, 4]).unwrap();
        assert_eq!(mask.texel(0, 0), 0);
        assert_eq!(mask.texel(1, 1), 1);
        assert_eq!(mask.texel(2, 1), 2);
        assert_eq!(mask.texel(1, 2), 3);
        assert_eq!(mask.texel(2, 2), 4);
        assert_eq!(mask.texel(3, 2), 0);
    }

    #[test]
    fn update_checks_region_and_length() {
        let mut mask = AlphaMask::new(4, 4).unwrap();
        assert!(matches!(
            mask.update(MaskRegion::new(3, 0, 2, 1), &[0, 0]),
            Err(RunnerError::RegionOutOfBounds { .. })
        ));
        assert!(matches!(
            mask.update(MaskRegion::new(u32::MAX, 0, 2, 1), &[0, 0]),
            Err(RunnerError::RegionOutOfBounds { .. })
        ));
        assert!(matches!(
            mask.update(MaskRegion::new(0, 0, 2, 2), &[0, 0, 0]),
            Err(RunnerError::DataLength {
                expected: 4,
                actual: 3,
                ..
            })
        ));
    }

    #[test]
    fn nearest_sampling_clamps_to_edge() {
        let mask = checker();
        let sampler = Sampler {
            filter: FilterMode::Nearest,
        };
        assert_eq!(mask.sample(&sampler, vec2(0.25, 0.25)), vec4(0.0, 0.0, 0.0, 1.0));
        assert_eq!(mask.sample(&sampler, vec2(0.75, 0.25)), vec4(1.0, 0.0, 0.0, 1.0));
        assert_eq!(mask.sample(&sampler, vec2(0.25, 0.75)).x, 1.0);
        assert_eq!(mask.sample(&sampler, vec2(-3.0, 0.1)).x, 0.0);
        assert_eq!(mask.sample(&sampler, vec2(7.0, 0.1)).x, 1.0);
    }

    #[test]
    fn linear_sampling_blends_neighbours() {
        let mask = checker();
        let sampler = Sampler::default();
        assert_eq!(sampler.filter, FilterMode::Linear);
        assert_eq!(mask.sample(&sampler, vec2(0.25, 0.25)).x, 0.0);
        assert_eq!(mask.sample(&sampler, vec2(0.5, 0.5)).x, 0.5);
        assert_eq!(mask.sample(&sampler, vec2(0.5, 0.25)).x, 0.5);
    }

    #[test]
    fn growth_caps_at_texture_limit() {
        let max = MAX_TEXTURE_DIMENSION;
        assert_eq!(grown_dimensions((256, 256), (512, 512)), (512, 512));
        assert_eq!(grown_dimensions((8192, 8192), (16400, 16400)), (max, max));
        assert_eq!(grown_dimensions((max, 8192), (max + 1, 16384)), (max, max));
        assert_eq!(grown_dimensions((max, max), (max * 2, max)), (max * 2, max));
    }

    #[test]
    fn grow_clears_contents() {
        let mut mask = checker();
        assert_eq!(mask.grow((4, 4)).unwrap(), (4, 4));
        assert_eq!(mask.dimensions(), (4, 4));
        assert!((0..4).all(|y| (0..4).all(|x| mask.texel(x, y) == 0)));
    }

    #[test]
    fn filter_mode_parses_from_flags() {
        assert_eq!("nearest".parse::<FilterMode>().unwrap(), FilterMode::Nearest);
        assert_eq!("Linear".parse::<FilterMode>().unwrap(), FilterMode::Linear);
        assert!("bicubic".parse::<FilterMode>().is_err());
    }
}
