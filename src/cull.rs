//! View frustum for visibility culling.

use glam::{Mat4, Vec3, Vec4};

/// World-space bounding sphere of a renderable node.
#[derive(Debug, Clone, Copy)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// View frustum defined by six planes (left, right, bottom, top, near, far).
///
/// Planes point inward; a point is inside when its signed distance to every
/// plane is non-negative. Built from a combined view-projection matrix with
/// WebGPU's [0,1] NDC depth range.
#[derive(Debug, Clone)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    /// Create frustum from a combined view-projection matrix.
    pub fn from_view_proj(vp_matrix: &Mat4) -> Self {
        let m = vp_matrix.transpose();

        let planes = [
            m.w_axis + m.x_axis, // left
            m.w_axis - m.x_axis, // right
            m.w_axis + m.y_axis, // bottom
            m.w_axis - m.y_axis, // top
            m.z_axis,            // near (z >= 0 in NDC)
            m.w_axis - m.z_axis, // far
        ]
        .map(normalize_plane);

        Self { planes }
    }

    /// Test whether a bounding sphere is at least partially inside.
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        self.planes.iter().all(|plane| {
            let distance = plane.truncate().dot(sphere.center) + plane.w;
            distance >= -sphere.radius
        })
    }
}

fn normalize_plane(plane: Vec4) -> Vec4 {
    let len = plane.truncate().length();
    if len > 0.0 {
        plane / len
    } else {
        plane
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_frustum() -> Frustum {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        Frustum::from_view_proj(&(proj * view))
    }

    #[test]
    fn test_sphere_at_focus_is_visible() {
        let f = test_frustum();
        assert!(f.intersects_sphere(&BoundingSphere::new(Vec3::ZERO, 1.0)));
    }

    #[test]
    fn test_sphere_behind_camera_is_culled() {
        let f = test_frustum();
        assert!(!f.intersects_sphere(&BoundingSphere::new(Vec3::new(0.0, 0.0, 50.0), 1.0)));
    }

    #[test]
    fn test_sphere_beyond_far_plane_is_culled() {
        let f = test_frustum();
        assert!(!f.intersects_sphere(&BoundingSphere::new(Vec3::new(0.0, 0.0, -200.0), 1.0)));
    }

    #[test]
    fn test_large_sphere_straddling_edge_is_visible() {
        let f = test_frustum();
        // Center outside the left plane but radius reaches back in.
        assert!(f.intersects_sphere(&BoundingSphere::new(Vec3::new(-60.0, 0.0, -20.0), 45.0)));
    }
}
