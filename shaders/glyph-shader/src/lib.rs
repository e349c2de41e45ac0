//! Alpha-masked glyph quads.
//!
//! The vertex stage expands one [`QuadInstance`] into the four corners of a
//! triangle strip, the fragment stage tints the red channel of the glyph cache
//! texture with the quad color. Both stages are plain functions as well, so the
//! CPU runner and the tests can evaluate them natively.

#![cfg_attr(target_arch = "spirv", no_std)]
// HACK(eddyb) can't easily see warnings otherwise from `spirv-builder` builds.
#![deny(warnings)]

use shared::{DrawConstants, QuadCorner, QuadInstance};
use spirv_std::glam::{vec2, Vec2, Vec3, Vec4};
use spirv_std::{spirv, Image, Sampler};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VertexOutput {
    /// Clip space.
    pub position: Vec4,
    pub color: Vec4,
    pub tex_pos: Vec2,
}

/// Position and texture coordinate of `corner`, before projection.
pub fn quad_corner(quad: &QuadInstance, corner: QuadCorner) -> (Vec2, Vec2) {
    let left_top = quad.left_top();
    let right_bottom = quad.right_bottom();
    let tex_left_top = quad.tex_left_top();
    let tex_right_bottom = quad.tex_right_bottom();

    let (x, u) = if corner.is_right() {
        (right_bottom.x, tex_right_bottom.x)
    } else {
        (left_top.x, tex_left_top.x)
    };
    let (y, v) = if corner.is_bottom() {
        (right_bottom.y, tex_right_bottom.y)
    } else {
        (left_top.y, tex_left_top.y)
    };
    (vec2(x, y), vec2(u, v))
}

/// The quad is planar: every corner takes its depth from `left_top.z`.
pub fn vs(constants: &DrawConstants, quad: &QuadInstance, corner: QuadCorner) -> VertexOutput {
    let (pos, tex_pos) = quad_corner(quad, corner);
    VertexOutput {
        position: constants.projection() * pos.extend(quad.left_top().z).extend(1.0),
        color: quad.color(),
        tex_pos,
    }
}

/// Like [`vs`], but straight from the vertex index.
///
/// An index outside `0..4` produces a zero clip position and texture
/// coordinate, which the rasterizer discards as degenerate.
pub fn vs_indexed(
    constants: &DrawConstants,
    quad: &QuadInstance,
    vertex_index: u32,
) -> VertexOutput {
    match QuadCorner::from_vertex_index(vertex_index) {
        Some(corner) => vs(constants, quad, corner),
        None => VertexOutput {
            position: Vec4::ZERO,
            color: quad.color(),
            tex_pos: Vec2::ZERO,
        },
    }
}

/// Applies the glyph coverage `mask` to `color`.
///
/// Returns `None` when the fragment should be discarded, which is whenever the
/// coverage is not strictly positive. There is no tolerance: the smallest
/// positive coverage is kept.
pub fn fs(color: Vec4, mask: f32) -> Option<Vec4> {
    if mask > 0.0 {
        Some(color.truncate().extend(color.w * mask))
    } else {
        None
    }
}

#[spirv(vertex)]
#[allow(clippy::too_many_arguments)]
pub fn main_vs(
    #[spirv(vertex_index)] vert_idx: i32,
    #[spirv(push_constant)] constants: &DrawConstants,
    left_top: Vec3,
    right_bottom: Vec2,
    tex_left_top: Vec2,
    tex_right_bottom: Vec2,
    color: Vec4,
    #[spirv(position)] builtin_pos: &mut Vec4,
    out_color: &mut Vec4,
    out_tex_pos: &mut Vec2,
) {
    let quad = QuadInstance::new(left_top, right_bottom, tex_left_top, tex_right_bottom, color);
    let out = vs_indexed(constants, &quad, vert_idx as u32);

    *builtin_pos = out.position;
    *out_color = out.color;
    *out_tex_pos = out.tex_pos;
}

#[spirv(fragment)]
pub fn main_fs(
    #[spirv(descriptor_set = 0, binding = 0)] glyph_cache: &Image!(2D, type=f32, sampled),
    #[spirv(descriptor_set = 0, binding = 1)] sampler: &Sampler,
    color: Vec4,
    tex_pos: Vec2,
    output: &mut Vec4,
) {
    let coverage: Vec4 = glyph_cache.sample(*sampler, tex_pos);
    match fs(color, coverage.x) {
        Some(color) => *output = color,
        None => spirv_std::arch::kill(),
    }
}
