//! Camera placement.

/// Fixed look-at camera; the per-frame view rotation is applied on top
#[derive(Debug, Clone)]
pub struct CameraConfig {
    /// Eye position (model units)
    pub eye: [f32; 3],

    /// Look-at target (model units)
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [0.0, 1.0, 3.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

impl CameraConfig {
    /// Camera straight down the Z axis, used by the single-object demos
    pub fn front(distance: f32) -> Self {
        Self {
            eye: [0.0, 0.0, distance],
            target: [0.0, 0.0, 0.0],
        }
    }
}
