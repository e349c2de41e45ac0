//! Procedural glyph bitmaps packed into an [`AlphaMask`].

use spirv_std::glam::vec2;

use crate::error::{Result, RunnerError};
use crate::glyph::Rect;
use crate::mask::{AlphaMask, MaskRegion, MAX_TEXTURE_DIMENSION};

/// Empty texels kept between neighbours so linear filtering does not bleed.
const PADDING: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    /// Row-major, one byte per texel.
    pub coverage: Vec<u8>,
}

impl GlyphBitmap {
    fn from_distance(radius: f32, coverage: impl Fn(f32) -> f32) -> Self {
        let size = (2.0 * radius).ceil() as u32 + 2;
        let center = size as f32 / 2.0;
        let coverage = (0..size)
            .flat_map(|y| (0..size).map(move |x| (x, y)))
            .map(|(x, y)| {
                let d = vec2(x as f32 + 0.5 - center, y as f32 + 0.5 - center).length();
                (coverage(d).clamp(0.0, 1.0) * 255.0).round() as u8
            })
            .collect();
        Self {
            width: size,
            height: size,
            coverage,
        }
    }

    /// An anti-aliased filled circle.
    pub fn disc(radius: f32) -> Self {
        Self::from_distance(radius, |d| radius - d + 0.5)
    }

    /// An anti-aliased circle outline whose outer edge sits at `radius`.
    pub fn ring(radius: f32, thickness: f32) -> Self {
        let half = thickness / 2.0;
        let mid = radius - half;
        Self::from_distance(radius, |d| half - (d - mid).abs() + 0.5)
    }
}

/// Places glyphs left to right on shelves.
///
/// On failure returns the size the mask should grow to.
fn shelf_pack(
    (width, height): (u32, u32),
    glyphs: &[GlyphBitmap],
) -> std::result::Result<Vec<MaskRegion>, (u32, u32)> {
    let suggested = (width.saturating_mul(2), height.saturating_mul(2));
    let (mut x, mut y, mut shelf) = (0, 0, 0);
    let mut regions = Vec::with_capacity(glyphs.len());

    for glyph in glyphs {
        if glyph.width > width {
            return Err(suggested);
        }
        if x + glyph.width > width {
            x = 0;
            y += shelf + PADDING;
            shelf = 0;
        }
        if y + glyph.height > height {
            return Err(suggested);
        }

        regions.push(MaskRegion::new(x, y, glyph.width, glyph.height));
        x += glyph.width + PADDING;
        shelf = shelf.max(glyph.height);
    }
    Ok(regions)
}

pub struct GlyphAtlas {
    mask: AlphaMask,
    regions: Vec<MaskRegion>,
}

impl GlyphAtlas {
    /// Uploads `glyphs` into a mask of `initial` size, growing it until they fit.
    pub fn build(glyphs: &[GlyphBitmap], initial: (u32, u32)) -> Result<Self> {
        if let Some(glyph) = glyphs
            .iter()
            .find(|g| g.width > MAX_TEXTURE_DIMENSION || g.height > MAX_TEXTURE_DIMENSION)
        {
            return Err(RunnerError::GlyphTooLarge {
                width: glyph.width,
                height: glyph.height,
            });
        }

        let mut mask = AlphaMask::new(initial.0, initial.1)?;
        let regions = loop {
            match shelf_pack(mask.dimensions(), glyphs) {
                Ok(regions) => break regions,
                Err(suggested) => {
                    mask.grow(suggested)?;
                }
            }
        };

        for (glyph, region) in glyphs.iter().zip(&regions) {
            mask.update(*region, &glyph.coverage)?;
        }
        log::debug!(
            "packed {} glyphs into a {:?} alpha mask",
            regions.len(),
            mask.dimensions()
        );

        Ok(Self { mask, regions })
    }

    pub fn mask(&self) -> &AlphaMask {
        &self.mask
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Normalized texture rect of glyph `index`.
    pub fn tex_rect(&self, index: usize) -> Rect {
        let region = self.regions[index];
        let size = vec2(self.mask.width() as f32, self.mask.height() as f32);
        Rect::new(
            vec2(region.min[0] as f32, region.min[1] as f32) / size,
            vec2(region.max[0] as f32, region.max[1] as f32) / size,
        )
    }
}
