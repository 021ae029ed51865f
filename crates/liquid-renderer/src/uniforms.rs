//! Projection uniforms for 2D point sprites

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec4};

/// Uniform block for GPU (matches `Uniforms` in particle.wgsl)
///
/// The matrix occupies the first 64 bytes; the two scalars are followed by
/// explicit padding so the block stays a multiple of 16 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Uniforms {
    pub ndc_matrix: [[f32; 4]; 4],
    pub ptm_ratio: f32,
    pub point_size: f32,
    pub _padding: [f32; 2],
}

/// Orthographic projection in the OpenGL convention, column-major.
pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let width = right - left;
    let height = top - bottom;
    let depth = far - near;
    Mat4::from_cols(
        Vec4::new(2.0 / width, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 / height, 0.0, 0.0),
        Vec4::new(0.0, 0.0, -2.0 / depth, 0.0),
        Vec4::new(
            -(right + left) / width,
            -(top + bottom) / height,
            -(far + near) / depth,
            1.0,
        ),
    )
}

impl Uniforms {
    /// Map `[0, width] × [0, height]` pixels to normalized device coordinates.
    pub fn new(viewport: Vec2, ptm_ratio: f32, point_size: f32) -> Self {
        let projection = orthographic(0.0, viewport.x, 0.0, viewport.y, -1.0, 1.0);
        Self {
            ndc_matrix: projection.to_cols_array_2d(),
            ptm_ratio,
            point_size,
            _padding: [0.0; 2],
        }
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.ndc_matrix)
    }

    /// Where a world-space particle centre lands in NDC
    pub fn world_to_ndc(&self, world: Vec2) -> Vec2 {
        let clip = self.projection() * (world * self.ptm_ratio).extend(0.0).extend(1.0);
        clip.truncate().truncate() / clip.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(matrix: Mat4, x: f32, y: f32) -> Vec4 {
        matrix * Vec4::new(x, y, 0.0, 1.0)
    }

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 80);
        assert_eq!(std::mem::size_of::<Uniforms>() % 16, 0);
        assert_eq!(std::mem::offset_of!(Uniforms, ptm_ratio), 64);
        assert_eq!(std::mem::offset_of!(Uniforms, point_size), 68);
    }

    #[test]
    fn test_orthographic_corners() {
        let cases = [
            (0.0, 320.0, 0.0, 568.0),
            (0.0, 1920.0, 0.0, 1080.0),
            (-5.0, 17.0, 3.0, 4.0),
            (10.0, 10.5, -100.0, 100.0),
        ];
        for (left, right, bottom, top) in cases {
            let matrix = orthographic(left, right, bottom, top, -1.0, 1.0);
            let low = project(matrix, left, bottom);
            let high = project(matrix, right, top);
            assert!((low.x + 1.0).abs() < 1e-5 && (low.y + 1.0).abs() < 1e-5);
            assert!((high.x - 1.0).abs() < 1e-5 && (high.y - 1.0).abs() < 1e-5);
            assert_eq!(low.w, 1.0);
        }
    }

    #[test]
    fn test_orthographic_matches_gl_convention() {
        let ours = orthographic(0.0, 800.0, 0.0, 600.0, -1.0, 1.0);
        let glam = Mat4::orthographic_rh_gl(0.0, 800.0, 0.0, 600.0, -1.0, 1.0);
        assert!(ours.abs_diff_eq(glam, 1e-6));
    }

    #[test]
    fn test_world_to_ndc_scales_by_ratio() {
        let uniforms = Uniforms::new(Vec2::new(640.0, 480.0), 32.0, 18.0);
        // 10m x 7.5m is the top right corner at 32 px/m
        let ndc = uniforms.world_to_ndc(Vec2::new(10.0, 7.5));
        assert!((ndc - Vec2::ONE).length() < 1e-5);
        let centre = uniforms.world_to_ndc(Vec2::new(5.0, 3.75));
        assert!(centre.length() < 1e-5);
    }
}
