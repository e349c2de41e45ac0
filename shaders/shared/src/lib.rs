//! Types shared between the glyph shaders and the code that feeds them.

#![cfg_attr(target_arch = "spirv", no_std)]
// HACK(eddyb) can't easily see warnings otherwise from `spirv-builder` builds.
#![deny(warnings)]

use bytemuck::{Pod, Zeroable};
use spirv_std::glam::{vec2, vec3, vec4, Mat4, Vec2, Vec3, Vec4};

/// One glyph quad as it sits in the per-instance vertex buffer.
///
/// The four vertex shader invocations of an instance all read the same
/// record and pick their corner from the vertex index.
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct QuadInstance {
    /// `z` is shared by all four corners.
    pub left_top: [f32; 3],
    pub right_bottom: [f32; 2],
    pub tex_left_top: [f32; 2],
    pub tex_right_bottom: [f32; 2],
    pub color: [f32; 4],
}

impl QuadInstance {
    pub fn new(
        left_top: Vec3,
        right_bottom: Vec2,
        tex_left_top: Vec2,
        tex_right_bottom: Vec2,
        color: Vec4,
    ) -> Self {
        Self {
            left_top: left_top.to_array(),
            right_bottom: right_bottom.to_array(),
            tex_left_top: tex_left_top.to_array(),
            tex_right_bottom: tex_right_bottom.to_array(),
            color: color.to_array(),
        }
    }

    pub fn left_top(&self) -> Vec3 {
        vec3(self.left_top[0], self.left_top[1], self.left_top[2])
    }

    pub fn right_bottom(&self) -> Vec2 {
        vec2(self.right_bottom[0], self.right_bottom[1])
    }

    pub fn tex_left_top(&self) -> Vec2 {
        vec2(self.tex_left_top[0], self.tex_left_top[1])
    }

    pub fn tex_right_bottom(&self) -> Vec2 {
        vec2(self.tex_right_bottom[0], self.tex_right_bottom[1])
    }

    pub fn color(&self) -> Vec4 {
        vec4(self.color[0], self.color[1], self.color[2], self.color[3])
    }
}

/// Per-draw constants, pushed as a push constant block before the draw and
/// left untouched until it completes.
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct DrawConstants {
    /// Column-major, applied as `projection * position`.
    pub projection: [f32; 16],
}

impl DrawConstants {
    #[rustfmt::skip]
    pub const IDENTITY: Self = Self {
        projection: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub fn new(projection: Mat4) -> Self {
        Self {
            projection: projection.to_cols_array(),
        }
    }

    /// Constants for drawing in pixel coordinates on a `width` x `height` target.
    pub fn orthographic(width: u32, height: u32) -> Self {
        Self::new(orthographic_projection(width, height))
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::from_cols_array(&self.projection)
    }
}

impl Default for DrawConstants {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Which corner of its quad a vertex shader invocation produces.
///
/// The order forms a triangle strip: `0-1-2` and `1-2-3`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum QuadCorner {
    TopLeft = 0,
    TopRight = 1,
    BottomLeft = 2,
    BottomRight = 3,
}

impl QuadCorner {
    pub const ALL: [Self; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    /// `None` for anything outside `0..4`.
    pub fn from_vertex_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::TopLeft),
            1 => Some(Self::TopRight),
            2 => Some(Self::BottomLeft),
            3 => Some(Self::BottomRight),
            _ => None,
        }
    }

    pub fn is_right(self) -> bool {
        matches!(self, Self::TopRight | Self::BottomRight)
    }

    pub fn is_bottom(self) -> bool {
        matches!(self, Self::BottomLeft | Self::BottomRight)
    }
}

/// Maps pixel coordinates (origin top left, y down) into clip space.
///
/// Depth is flattened to zero.
#[rustfmt::skip]
pub fn orthographic_projection(width: u32, height: u32) -> Mat4 {
    let width = width as f32;
    let height = height as f32;
    Mat4::from_cols_array(&[
         2.0 / width, 0.0,           0.0, 0.0,
         0.0,         -2.0 / height, 0.0, 0.0,
         0.0,         0.0,           0.0, 0.0,
        -1.0,         1.0,           0.0, 1.0,
    ])
}
