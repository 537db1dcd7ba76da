//! Look-at camera with keyboard view rotation.

use glam::{Mat4, Vec3};

use crate::params::{CameraConfig, RenderConfig};
use crate::state::FrameState;

/// Fixed look-at camera; the frame state's view rotation is applied on top
#[derive(Debug, Clone)]
pub struct CameraSystem {
    config: CameraConfig,
}

impl CameraSystem {
    pub fn new(config: CameraConfig) -> Self {
        Self { config }
    }

    pub fn eye(&self) -> Vec3 {
        Vec3::from_array(self.config.eye)
    }

    /// View matrix: look-at, then clockwise rotation by the view angles (X, then Y, then Z)
    pub fn view_matrix(&self, state: &FrameState) -> Mat4 {
        let target = Vec3::from_array(self.config.target);
        let r = state.view_rotation;
        Mat4::look_at_rh(self.eye(), target, Vec3::Y)
            * Mat4::from_rotation_x(-r.x.to_radians())
            * Mat4::from_rotation_y(-r.y.to_radians())
            * Mat4::from_rotation_z(-r.z.to_radians())
    }

    /// Perspective projection for the frame's aspect ratio
    pub fn projection_matrix(&self, state: &FrameState, render_config: &RenderConfig) -> Mat4 {
        Mat4::perspective_rh(
            render_config.fov_degrees.to_radians(),
            state.aspect_ratio,
            render_config.near_plane,
            render_config.far_plane,
        )
    }

    /// Tuple of (view, projection)
    pub fn matrices(&self, state: &FrameState, render_config: &RenderConfig) -> (Mat4, Mat4) {
        (
            self.view_matrix(state),
            self.projection_matrix(state, render_config),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn target_lands_on_view_axis() {
        let camera = CameraSystem::new(CameraConfig::default());
        let view = camera.view_matrix(&FrameState::default());
        let p = view.transform_point3(Vec3::ZERO);

        // Origin sits straight ahead (-Z in view space) at the eye distance
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.z, -camera.eye().length(), epsilon = 1e-5);
    }

    #[test]
    fn view_rotation_turns_the_world() {
        let camera = CameraSystem::new(CameraConfig::front(4.0));
        let mut state = FrameState::default();
        let still = camera.view_matrix(&state).transform_point3(Vec3::X);
        state.view_rotation.y = 90.0;
        let turned = camera.view_matrix(&state).transform_point3(Vec3::X);

        assert_relative_eq!(still.x, 1.0, epsilon = 1e-6);
        // A clockwise quarter turn about Y carries +X to +Z, toward the camera
        assert_relative_eq!(turned.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(turned.z, -3.0, epsilon = 1e-5);
    }

    #[test]
    fn projection_follows_aspect_ratio() {
        let camera = CameraSystem::new(CameraConfig::default());
        let render_config = RenderConfig::default();
        let mut state = FrameState::default();

        state.aspect_ratio = 1.0;
        let square = camera.projection_matrix(&state, &render_config);
        state.aspect_ratio = 2.0;
        let wide = camera.projection_matrix(&state, &render_config);

        assert_relative_eq!(square.x_axis.x, 2.0 * wide.x_axis.x, epsilon = 1e-5);
        assert_eq!(square.y_axis.y, wide.y_axis.y);
    }
}
