//! Native evaluation of the glyph pipeline.
//!
//! Each quad runs the vertex stage four times, the resulting strip is split
//! into two triangles and every covered pixel center runs the fragment stage.
//! Rows are shaded in parallel; within a row quads blend in submission order.

use std::io::{self, Write};
use std::ops::Add;

use glyph_shader::VertexOutput;
use rayon::prelude::*;
use shared::{DrawConstants, QuadInstance};
use spirv_std::glam::{vec2, Vec2, Vec4};

use crate::mask::{AlphaMask, Sampler};

/// Pixel rectangle that limits where a draw may write.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Scissor {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Everything that stays fixed for the duration of one draw.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DrawCall {
    pub constants: DrawConstants,
    pub scissor: Option<Scissor>,
}

impl DrawCall {
    pub fn new(constants: DrawConstants) -> Self {
        Self {
            constants,
            scissor: None,
        }
    }

    pub fn with_scissor(self, scissor: Scissor) -> Self {
        Self {
            scissor: Some(scissor),
            ..self
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub triangles: usize,
    pub fragments: u64,
    pub discarded: u64,
}

impl Add for DrawStats {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            triangles: self.triangles + other.triangles,
            fragments: self.fragments + other.fragments,
            discarded: self.discarded + other.discarded,
        }
    }
}

/// Linear RGBA color target.
#[derive(Clone, Debug)]
pub struct Target {
    width: u32,
    height: u32,
    pixels: Vec<Vec4>,
}

impl Target {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec4::ZERO; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Vec4] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Vec4 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    pub fn clear(&mut self, color: Vec4) {
        self.pixels.fill(color);
    }

    /// Writes the target as a binary PPM, sRGB encoded, alpha dropped.
    pub fn write_ppm(&self, mut out: impl Write) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        let bytes: Vec<u8> = self
            .pixels
            .iter()
            .flat_map(|p| [p.x, p.y, p.z])
            .map(|c| (srgb_oetf(c).clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect();
        out.write_all(&bytes)
    }
}

// apply the srgb OETF (i.e. do "linear to sRGB")
fn srgb_oetf(x: f32) -> f32 {
    if x <= 0.0031308 {
        x * 12.92
    } else {
        1.055 * x.powf(1.0 / 2.4) - 0.055
    }
}

/// A vertex after the perspective divide and viewport transform, with its
/// attributes pre-divided by `w` for perspective correct interpolation.
#[derive(Copy, Clone, Debug)]
struct ScreenVertex {
    pos: Vec2,
    inv_w: f32,
    color: Vec4,
    tex_pos: Vec2,
}

impl ScreenVertex {
    fn new(out: &VertexOutput, width: f32, height: f32) -> Option<Self> {
        let w = out.position.w;
        if !(w > 0.0) {
            return None;
        }
        let inv_w = 1.0 / w;
        let ndc = out.position.truncate() * inv_w;
        Some(Self {
            pos: vec2((ndc.x + 1.0) * 0.5 * width, (1.0 - ndc.y) * 0.5 * height),
            inv_w,
            color: out.color * inv_w,
            tex_pos: out.tex_pos * inv_w,
        })
    }
}

/// Signed edge function, evaluated in a fixed endpoint order so the two
/// triangles sharing an edge always get exactly opposite values.
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    let raw = |a: Vec2, b: Vec2| (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    if (a.y, a.x) > (b.y, b.x) {
        -raw(b, a)
    } else {
        raw(a, b)
    }
}

/// Top edges run right, left edges run up (y grows downwards).
fn is_top_left(a: Vec2, b: Vec2) -> bool {
    (a.y == b.y && b.x > a.x) || b.y < a.y
}

#[derive(Copy, Clone, Debug)]
struct Triangle {
    v: [ScreenVertex; 3],
    area: f32,
    top_left: [bool; 3],
    x_range: (u32, u32),
    y_range: (u32, u32),
}

impl Triangle {
    fn new(
        a: ScreenVertex,
        b: ScreenVertex,
        c: ScreenVertex,
        width: u32,
        height: u32,
    ) -> Option<Self> {
        // no culling: flip to a single winding
        let (b, c) = if edge(a.pos, b.pos, c.pos) < 0.0 {
            (c, b)
        } else {
            (b, c)
        };
        let area = edge(a.pos, b.pos, c.pos);
        if !(area > 0.0) {
            return None;
        }

        let min = a.pos.min(b.pos).min(c.pos);
        let max = a.pos.max(b.pos).max(c.pos);
        let span = |lo: f32, hi: f32, limit: u32| {
            let lo = lo.floor().max(0.0) as u32;
            let hi = (hi.ceil().max(0.0) as u32).min(limit);
            (lo.min(limit), hi)
        };

        Some(Self {
            v: [a, b, c],
            area,
            top_left: [
                is_top_left(b.pos, c.pos),
                is_top_left(c.pos, a.pos),
                is_top_left(a.pos, b.pos),
            ],
            x_range: span(min.x, max.x, width),
            y_range: span(min.y, max.y, height),
        })
    }

    /// Barycentric weights of `p`, or `None` if the fill rule leaves it out.
    fn weights(&self, p: Vec2) -> Option<[f32; 3]> {
        let [a, b, c] = self.v;
        let w = [
            edge(b.pos, c.pos, p),
            edge(c.pos, a.pos, p),
            edge(a.pos, b.pos, p),
        ];
        for (w, top_left) in w.iter().zip(self.top_left) {
            if *w < 0.0 || (*w == 0.0 && !top_left) {
                return None;
            }
        }
        Some(w.map(|w| w / self.area))
    }

    fn interpolate(&self, [l0, l1, l2]: [f32; 3]) -> (Vec4, Vec2) {
        let [a, b, c] = self.v;
        let w = 1.0 / (l0 * a.inv_w + l1 * b.inv_w + l2 * c.inv_w);
        let color = (a.color * l0 + b.color * l1 + c.color * l2) * w;
        let tex_pos = (a.tex_pos * l0 + b.tex_pos * l1 + c.tex_pos * l2) * w;
        (color, tex_pos)
    }
}

/// Runs the vertex stage for one quad and assembles its strip.
fn setup_quad(
    constants: &DrawConstants,
    quad: &QuadInstance,
    width: u32,
    height: u32,
) -> Vec<Triangle> {
    let (w, h) = (width as f32, height as f32);
    let verts: [Option<ScreenVertex>; 4] = [0, 1, 2, 3].map(|vertex_index| {
        let out = glyph_shader::vs_indexed(constants, quad, vertex_index);
        ScreenVertex::new(&out, w, h)
    });

    // TODO: clip against w = 0 instead of dropping triangles with a vertex behind the eye
    [[0, 1, 2], [1, 2, 3]]
        .into_iter()
        .filter_map(|[i, j, k]| Triangle::new(verts[i]?, verts[j]?, verts[k]?, width, height))
        .collect()
}

fn blend(dst: Vec4, src: Vec4) -> Vec4 {
    let inv = 1.0 - src.w;
    let rgb = src.truncate() * src.w + dst.truncate() * inv;
    rgb.extend(src.w + dst.w * inv)
}

/// Draws `quads` into `target`, sampling `mask` through `sampler`.
pub fn draw(
    target: &mut Target,
    mask: &AlphaMask,
    sampler: &Sampler,
    call: &DrawCall,
    quads: &[QuadInstance],
) -> DrawStats {
    let (width, height) = (target.width, target.height);
    if width == 0 || height == 0 {
        return DrawStats::default();
    }

    let triangles: Vec<Triangle> = quads
        .par_iter()
        .flat_map_iter(|quad| setup_quad(&call.constants, quad, width, height))
        .collect();

    let (x_clip, y_clip) = match call.scissor {
        Some(s) => (
            (s.x.min(width), s.x.saturating_add(s.width).min(width)),
            (s.y.min(height), s.y.saturating_add(s.height).min(height)),
        ),
        None => ((0, width), (0, height)),
    };

    let stats = target
        .pixels
        .par_chunks_mut(width as usize)
        .enumerate()
        .map(|(y, row)| {
            let y = y as u32;
            let mut stats = DrawStats::default();
            if y < y_clip.0 || y >= y_clip.1 {
                return stats;
            }

            for tri in &triangles {
                if y < tri.y_range.0 || y >= tri.y_range.1 {
                    continue;
                }
                let x_start = tri.x_range.0.max(x_clip.0);
                let x_end = tri.x_range.1.min(x_clip.1);
                for x in x_start..x_end {
                    let center = vec2(x as f32 + 0.5, y as f32 + 0.5);
                    let Some(weights) = tri.weights(center) else {
                        continue;
                    };

                    let (color, tex_pos) = tri.interpolate(weights);
                    let coverage = mask.sample(sampler, tex_pos).x;
                    stats.fragments += 1;
                    match glyph_shader::fs(color, coverage) {
                        Some(src) => {
                            let dst = &mut row[x as usize];
                            *dst = blend(*dst, src);
                        }
                        None => stats.discarded += 1,
                    }
                }
            }
            stats
        })
        .reduce(DrawStats::default, |a, b| a + b);

    DrawStats {
        triangles: triangles.len(),
        ..stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::MaskRegion;
    use spirv_std::glam::{vec3, vec4};

    fn solid_mask(value: u8) -> AlphaMask {
        let mut mask = AlphaMask::new(1, 1).unwrap();
        mask.update(MaskRegion::new(0, 0, 1, 1), &[value]).unwrap();
        mask
    }

    fn quad(x0: f32, y0: f32, x1: f32, y1: f32, color: Vec4) -> QuadInstance {
        QuadInstance::new(
            vec3(x0, y0, 0.0),
            vec2(x1, y1),
            vec2(0.0, 0.0),
            vec2(1.0, 1.0),
            color,
        )
    }

    #[test]
    fn quad_covers_each_pixel_once() {
        let mut target = Target::new(8, 8);
        let call = DrawCall::new(DrawConstants::orthographic(8, 8));
        let stats = draw(
            &mut target,
            &solid_mask(255),
            &Sampler::default(),
            &call,
            &[quad(2.0, 2.0, 6.0, 6.0, vec4(1.0, 1.0, 1.0, 0.5))],
        );

        assert_eq!(stats.triangles, 2);
        assert_eq!(stats.fragments, 16);
        assert_eq!(stats.discarded, 0);
        for y in 0..8 {
            for x in 0..8 {
                let inside = (2..6).contains(&x) && (2..6).contains(&y);
                let expected = if inside {
                    vec4(0.5, 0.5, 0.5, 0.5)
                } else {
                    Vec4::ZERO
                };
                assert_eq!(target.pixel(x, y), expected, "pixel {x},{y}");
            }
        }
    }

    #[test]
    fn empty_coverage_discards_everything() {
        let mut target = Target::new(4, 4);
        target.clear(vec4(0.0, 0.0, 1.0, 1.0));
        let call = DrawCall::new(DrawConstants::orthographic(4, 4));
        let stats = draw(
            &mut target,
            &solid_mask(0),
            &Sampler::default(),
            &call,
            &[quad(0.0, 0.0, 4.0, 4.0, Vec4::ONE)],
        );

        assert_eq!(stats.fragments, 16);
        assert_eq!(stats.discarded, 16);
        assert!(target.pixels().iter().all(|p| *p == vec4(0.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn quads_blend_in_submission_order() {
        let mut target = Target::new(2, 2);
        let call = DrawCall::new(DrawConstants::orthographic(2, 2));
        let quads = [
            quad(0.0, 0.0, 2.0, 2.0, vec4(1.0, 0.0, 0.0, 1.0)),
            quad(0.0, 0.0, 2.0, 2.0, vec4(0.0, 0.0, 1.0, 0.5)),
        ];
        draw(&mut target, &solid_mask(255), &Sampler::default(), &call, &quads);
        assert_eq!(target.pixel(1, 1), vec4(0.5, 0.0, 0.5, 1.0));
    }

    #[test]
    fn scissor_limits_writes() {
        let mut target = Target::new(4, 4);
        let call = DrawCall::new(DrawConstants::orthographic(4, 4)).with_scissor(Scissor {
            x: 1,
            y: 1,
            width: 2,
            height: 10,
        });
        let stats = draw(
            &mut target,
            &solid_mask(255),
            &Sampler::default(),
            &call,
            &[quad(0.0, 0.0, 4.0, 4.0, Vec4::ONE)],
        );

        assert_eq!(stats.fragments, 6);
        assert_eq!(target.pixel(0, 1), Vec4::ZERO);
        assert_eq!(target.pixel(1, 0), Vec4::ZERO);
        assert_eq!(target.pixel(1, 1), Vec4::ONE);
        assert_eq!(target.pixel(2, 3), Vec4::ONE);
        assert_eq!(target.pixel(3, 3), Vec4::ZERO);
    }

    #[test]
    fn flipped_quads_still_draw() {
        // glyph quads put `left_top` at the larger y
        let mut target = Target::new(4, 4);
        let call = DrawCall::new(DrawConstants::orthographic(4, 4));
        let stats = draw(
            &mut target,
            &solid_mask(255),
            &Sampler::default(),
            &call,
            &[quad(0.0, 4.0, 4.0, 0.0, Vec4::ONE)],
        );
        assert_eq!(stats.fragments, 16);
        assert!(target.pixels().iter().all(|p| *p == Vec4::ONE));
    }

    #[test]
    fn ppm_header_and_encoding() {
        let mut target = Target::new(2, 1);
        target.clear(vec4(1.0, 0.0, 0.0, 1.0));
        let mut out = Vec::new();
        target.write_ppm(&mut out).unwrap();
        assert_eq!(&out[..11], b"P6\n2 1\n255\n");
        assert_eq!(&out[11..], &[255, 0, 0, 255, 0, 0]);
    }
}
