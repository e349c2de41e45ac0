use shared::QuadInstance;
use spirv_std::glam::{vec2, Vec2, Vec4};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Whether the two rects share any area. Touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// Builds the quad for one positioned glyph.
///
/// Sides of `pixel` sticking out of `bounds` are cut off, and the texture
/// rect is cut by the same fraction so the glyph keeps its aspect. A glyph
/// that does not overlap `bounds` at all has no quad.
pub fn glyph_quad(
    mut pixel: Rect,
    mut tex: Rect,
    bounds: Rect,
    z: f32,
    color: Vec4,
) -> Option<QuadInstance> {
    if !pixel.overlaps(&bounds) {
        return None;
    }

    if pixel.max.x > bounds.max.x {
        let old_width = pixel.width();
        pixel.max.x = bounds.max.x;
        tex.max.x = tex.min.x + tex.width() * pixel.width() / old_width;
    }

    if pixel.min.x < bounds.min.x {
        let old_width = pixel.width();
        pixel.min.x = bounds.min.x;
        tex.min.x = tex.max.x - tex.width() * pixel.width() / old_width;
    }

    if pixel.max.y > bounds.max.y {
        let old_height = pixel.height();
        pixel.max.y = bounds.max.y;
        tex.max.y = tex.min.y + tex.height() * pixel.height() / old_height;
    }

    if pixel.min.y < bounds.min.y {
        let old_height = pixel.height();
        pixel.min.y = bounds.min.y;
        tex.min.y = tex.max.y - tex.height() * pixel.height() / old_height;
    }

    Some(QuadInstance::new(
        vec2(pixel.min.x, pixel.max.y).extend(z),
        vec2(pixel.max.x, pixel.min.y),
        vec2(tex.min.x, tex.max.y),
        vec2(tex.max.x, tex.min.y),
        color,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use spirv_std::glam::vec4;

    fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> Rect {
        Rect::new(vec2(x0, y0), vec2(x1, y1))
    }

    const WHITE: Vec4 = Vec4::ONE;

    #[test]
    fn unclipped_glyph_maps_corners() {
        let quad = glyph_quad(
            rect(2.0, 4.0, 10.0, 20.0),
            rect(0.0, 0.0, 0.5, 0.25),
            rect(0.0, 0.0, 100.0, 100.0),
            0.5,
            vec4(1.0, 0.5, 0.25, 1.0),
        )
        .unwrap();
        assert_eq!(quad.left_top, [2.0, 20.0, 0.5]);
        assert_eq!(quad.right_bottom, [10.0, 4.0]);
        assert_eq!(quad.tex_left_top, [0.0, 0.25]);
        assert_eq!(quad.tex_right_bottom, [0.5, 0.0]);
        assert_eq!(quad.color, [1.0, 0.5, 0.25, 1.0]);
    }

    #[test]
    fn clipping_keeps_texture_aspect() {
        let tex = rect(0.0, 0.0, 1.0, 1.0);

        let right = glyph_quad(
            rect(0.0, 0.0, 10.0, 10.0),
            tex,
            rect(0.0, 0.0, 5.0, 20.0),
            0.0,
            WHITE,
        )
        .unwrap();
        assert_eq!(right.right_bottom[0], 5.0);
        assert_eq!(right.tex_right_bottom[0], 0.5);

        let left = glyph_quad(
            rect(0.0, 0.0, 10.0, 10.0),
            tex,
            rect(5.0, 0.0, 20.0, 20.0),
            0.0,
            WHITE,
        )
        .unwrap();
        assert_eq!(left.left_top[0], 5.0);
        assert_eq!(left.tex_left_top[0], 0.5);

        let bottom = glyph_quad(
            rect(0.0, 0.0, 10.0, 8.0),
            tex,
            rect(0.0, 0.0, 20.0, 2.0),
            0.0,
            WHITE,
        )
        .unwrap();
        assert_eq!(bottom.left_top[1], 2.0);
        assert_eq!(bottom.tex_left_top[1], 0.25);

        let top = glyph_quad(
            rect(0.0, 0.0, 10.0, 8.0),
            tex,
            rect(0.0, 6.0, 20.0, 20.0),
            0.0,
            WHITE,
        )
        .unwrap();
        assert_eq!(top.right_bottom[1], 6.0);
        assert_eq!(top.tex_right_bottom[1], 0.75);
    }

    #[test]
    fn glyphs_outside_bounds_have_no_quad() {
        let tex = rect(0.0, 0.0, 1.0, 1.0);
        let bounds = rect(20.0, 20.0, 30.0, 30.0);
        for pixel in [
            rect(0.0, 20.0, 10.0, 30.0),
            rect(40.0, 20.0, 50.0, 30.0),
            rect(20.0, 0.0, 30.0, 10.0),
            rect(20.0, 40.0, 30.0, 50.0),
        ] {
            assert_eq!(glyph_quad(pixel, tex, bounds, 0.0, WHITE), None, "{pixel:?}");
        }

        // Touching an edge is still outside.
        assert_eq!(
            glyph_quad(rect(10.0, 20.0, 20.0, 30.0), tex, bounds, 0.0, WHITE),
            None
        );
        assert!(glyph_quad(rect(11.0, 20.0, 21.0, 30.0), tex, bounds, 0.0, WHITE).is_some());
    }
}
