//! Model matrix stack and normal matrix.

use glam::{Mat3, Mat4, Vec3};

/// Stack of model matrices; the base entry is never popped.
///
/// Transforms multiply onto the right of the top entry, so the last one applied
/// is the first to act on vertices.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    stack: Vec<Mat4>,
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixStack {
    pub fn new() -> Self {
        Self {
            stack: vec![Mat4::IDENTITY],
        }
    }

    /// Duplicate the top entry
    pub fn push(&mut self) {
        let top = self.top();
        self.stack.push(top);
    }

    /// Drop the top entry. Returns `false` (and leaves the stack alone) at the base.
    pub fn pop(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn top(&self) -> Mat4 {
        *self.stack.last().unwrap_or(&Mat4::IDENTITY)
    }

    pub fn top_mut(&mut self) -> &mut Mat4 {
        if self.stack.is_empty() {
            self.stack.push(Mat4::IDENTITY);
        }
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    pub fn translate(&mut self, offset: Vec3) -> &mut Self {
        *self.top_mut() *= Mat4::from_translation(offset);
        self
    }

    pub fn scale(&mut self, factor: Vec3) -> &mut Self {
        *self.top_mut() *= Mat4::from_scale(factor);
        self
    }

    pub fn rotate_deg(&mut self, degrees: f32, axis: Vec3) -> &mut Self {
        *self.top_mut() *= Mat4::from_axis_angle(axis.normalize_or_zero(), degrees.to_radians());
        self
    }

    /// Run `f` between a push and the matching pop
    pub fn with_pushed<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.push();
        let result = f(self);
        self.pop();
        result
    }
}

/// Matrix for transforming normals into view space: transpose(inverse(mat3(view * model)))
pub fn normal_matrix(view: Mat4, model: Mat4) -> Mat3 {
    Mat3::from_mat4(view * model).inverse().transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn base_survives_extra_pops() {
        let mut stack = MatrixStack::new();
        stack.translate(Vec3::X);
        assert!(!stack.pop());
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.top(), Mat4::from_translation(Vec3::X));
    }

    #[test]
    fn push_pop_restores_parent() {
        let mut stack = MatrixStack::new();
        stack.translate(Vec3::new(1.0, 2.0, 3.0));
        let parent = stack.top();

        stack.push();
        stack.scale(Vec3::splat(2.0)).rotate_deg(90.0, Vec3::Y);
        assert_ne!(stack.top(), parent);
        assert!(stack.pop());
        assert_eq!(stack.top(), parent);
    }

    #[test]
    fn with_pushed_is_balanced() {
        let mut stack = MatrixStack::new();
        let inner = stack.with_pushed(|s| {
            s.translate(Vec3::Z);
            s.depth()
        });
        assert_eq!(inner, 2);
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.top(), Mat4::IDENTITY);
    }

    #[test]
    fn last_transform_acts_first() {
        let mut stack = MatrixStack::new();
        stack.translate(Vec3::X).scale(Vec3::splat(2.0));
        let p = stack.top().transform_point3(Vec3::X);
        // Scaled to (2,0,0), then moved by +1 in X
        assert_relative_eq!(p.x, 3.0);
    }

    #[test]
    fn rotation_uses_degrees() {
        let mut stack = MatrixStack::new();
        stack.rotate_deg(90.0, Vec3::Z);
        let p = stack.top().transform_point3(Vec3::X);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let model = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let nm = normal_matrix(Mat4::IDENTITY, model);
        // Surface normal of the plane x = y stretched along X
        let n = (nm * Vec3::new(1.0, -1.0, 0.0)).normalize();
        let tangent = model.transform_vector3(Vec3::new(1.0, 1.0, 0.0));
        assert_relative_eq!(n.dot(tangent), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn normal_matrix_of_rotation_is_rotation() {
        let model = Mat4::from_rotation_y(0.7);
        let nm = normal_matrix(Mat4::IDENTITY, model);
        let expected = Mat3::from_rotation_y(0.7);
        for (a, b) in nm.to_cols_array().iter().zip(expected.to_cols_array()) {
            assert_relative_eq!(*a, b, epsilon = 1e-6);
        }
    }
}
