//! CPU mirrors of the clamp shader math
//!
//! The vertex/fragment functions run on the GPU; these mirrors keep the
//! formulas testable and document the exact contract the WGSL implements.

use glam::Vec4;

use crate::overlay::DepthOffset;

/// Horizon fade factor for a vertex at `vert_distance` from the camera.
///
/// Saturates to 1 one unit inside the horizon, reaches 0 exactly at it, and
/// falls linearly in between.
pub fn horizon_alpha(horizon_distance: f32, vert_distance: f32) -> f32 {
    (horizon_distance - vert_distance).clamp(0.0, 1.0)
}

/// Depth-offset bias for a clamped vertex at distance `range`.
///
/// `range` clamps into the offset's range window and maps linearly onto the
/// bias window, saturating at both ends.
pub fn depth_offset_bias(range: f32, offset: &DepthOffset) -> f32 {
    let ratio = (range.clamp(offset.min_range, offset.max_range) - offset.min_range)
        / (offset.max_range - offset.min_range);
    offset.min_bias + ratio * (offset.max_bias - offset.min_bias)
}

/// Pushed-toward-camera position for a clamped view-space point.
///
/// Returns the simulated view-space position (still scaled by the original
/// w) and the simulated range `range - bias`.
pub fn simulated_view_position(clamped: Vec4, bias: f32) -> (Vec4, f32) {
    let clamped3 = clamped.truncate() / clamped.w;
    let range = clamped3.length();
    let adj_vec = clamped3.normalize_or_zero();
    let offset3 = clamped3 - adj_vec * bias;
    ((offset3 * clamped.w).extend(clamped.w), range - bias)
}

/// Depth-buffer value of a simulated clip-space vertex ([0,1] NDC depth).
pub fn simulated_depth(sim_clip: Vec4) -> f32 {
    sim_clip.z / sim_clip.w
}

/// Fragment depth written for a simulated vertex.
///
/// A depth beyond 1 with a negative simulated range means the offset pushed
/// the point behind the viewer; those snap to the near plane instead of
/// being discarded. Everything else floors at 0.
pub fn fragment_depth(sim_depth: f32, sim_range: f32) -> f32 {
    let snapped = if sim_depth > 1.0 && sim_range < 0.0 {
        0.0
    } else {
        sim_depth
    };
    snapped.max(0.0)
}

/// Distance term the horizon fade uses for a view-space position.
pub fn vertex_distance(view_pos: Vec4) -> f32 {
    (view_pos.truncate() / view_pos.w).length()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizon_alpha_saturation() {
        assert_eq!(horizon_alpha(1000.0, 999.0), 1.0);
        assert_eq!(horizon_alpha(1000.0, 1000.5), 0.0);
        assert_eq!(horizon_alpha(1000.0, 999.5), 0.5);
        // Saturated on both sides of the fade band.
        assert_eq!(horizon_alpha(1000.0, 10.0), 1.0);
        assert_eq!(horizon_alpha(1000.0, 5000.0), 0.0);
    }

    #[test]
    fn test_horizon_alpha_monotonic() {
        let mut last = f32::INFINITY;
        for i in 0..200 {
            let d = 990.0 + i as f32 * 0.1;
            let a = horizon_alpha(1000.0, d);
            assert!(a <= last);
            last = a;
        }
    }

    #[test]
    fn test_bias_midpoint() {
        let offset = DepthOffset {
            min_bias: 0.01,
            max_bias: 10.0,
            min_range: 100.0,
            max_range: 10_000.0,
        };
        let bias = depth_offset_bias(5050.0, &offset);
        assert!((bias - 5.005).abs() < 1e-4);
    }

    #[test]
    fn test_bias_saturates_outside_window() {
        let offset = DepthOffset {
            min_bias: 0.01,
            max_bias: 10.0,
            min_range: 100.0,
            max_range: 10_000.0,
        };
        assert_eq!(depth_offset_bias(1.0, &offset), 0.01);
        assert_eq!(depth_offset_bias(50_000.0, &offset), 10.0);
    }

    #[test]
    fn test_bias_is_linear_in_window() {
        let offset = DepthOffset {
            min_bias: 1.0,
            max_bias: 3.0,
            min_range: 0.0,
            max_range: 100.0,
        };
        assert!((depth_offset_bias(25.0, &offset) - 1.5).abs() < 1e-6);
        assert!((depth_offset_bias(75.0, &offset) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_fragment_depth_snaps_behind_viewer() {
        assert_eq!(fragment_depth(1.2, -3.0), 0.0);
    }

    #[test]
    fn test_fragment_depth_keeps_far_fragments() {
        // Positive simulated range: genuinely past the far plane, no snap;
        // the rasterizer clamps the written value to 1.
        assert!(fragment_depth(1.2, 3.0) >= 1.0);
    }

    #[test]
    fn test_fragment_depth_floors_at_zero() {
        assert_eq!(fragment_depth(-0.25, 10.0), 0.0);
    }

    #[test]
    fn test_simulated_position_moves_toward_camera() {
        let clamped = Vec4::new(0.0, 0.0, -100.0, 1.0);
        let (sim, sim_range) = simulated_view_position(clamped, 10.0);
        assert!((sim.z - -90.0).abs() < 1e-4);
        assert!((sim_range - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_simulated_range_goes_negative_past_eye() {
        let clamped = Vec4::new(0.0, 0.0, -5.0, 1.0);
        let (_, sim_range) = simulated_view_position(clamped, 8.0);
        assert!(sim_range < 0.0);
    }

    #[test]
    fn test_vertex_distance_divides_w() {
        let d = vertex_distance(Vec4::new(0.0, 0.0, -20.0, 2.0));
        assert!((d - 10.0).abs() < 1e-6);
    }
}
