//! Hand-built meshes: vertex layout, shape builders and the noise terrain.

mod shapes;
mod terrain;

use std::collections::HashSet;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

pub use terrain::height_colour;

/// Vertex data shared by every mesh (position, normal, uv, colour)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub colour: [f32; 4],
}

/// Default vertex colour
pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// How a mesh is rasterised
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DrawMode {
    Points,
    Lines,
    #[default]
    Fill,
}

impl DrawMode {
    /// Next mode in the points → lines → fill cycle
    pub fn next(self) -> Self {
        match self {
            DrawMode::Points => DrawMode::Lines,
            DrawMode::Lines => DrawMode::Fill,
            DrawMode::Fill => DrawMode::Points,
        }
    }
}

/// Indexed triangle mesh (counter-clockwise front faces)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Set every vertex colour
    pub fn with_colour(mut self, colour: [f32; 4]) -> Self {
        for v in &mut self.vertices {
            v.colour = colour;
        }
        self
    }

    /// Append a flat planar polygon given counter-clockwise corners (3 or 4).
    ///
    /// The normal comes from the first two edges; uvs span `[0, uv_scale]`.
    fn push_face(&mut self, corners: &[Vec3], uv_scale: f32) {
        debug_assert!(corners.len() == 3 || corners.len() == 4);
        let normal = (corners[1] - corners[0])
            .cross(corners[2] - corners[0])
            .normalize_or_zero();
        let uvs: &[[f32; 2]] = if corners.len() == 3 {
            &[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]
        } else {
            &[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]
        };

        let base = self.vertices.len() as u32;
        for (corner, uv) in corners.iter().zip(uvs) {
            self.vertices.push(Vertex {
                position: corner.to_array(),
                normal: normal.to_array(),
                uv: [uv[0] * uv_scale, uv[1] * uv_scale],
                colour: WHITE,
            });
        }
        for i in 1..corners.len() as u32 - 1 {
            self.indices.extend_from_slice(&[base, base + i, base + i + 1]);
        }
    }

    /// Unique triangle edges as a line list, for wireframe drawing
    pub fn line_indices(&self) -> Vec<u32> {
        let mut seen = HashSet::new();
        let mut lines = Vec::new();
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                if seen.insert((a.min(b), a.max(b))) {
                    lines.extend_from_slice(&[a, b]);
                }
            }
        }
        lines
    }

    /// Replace normals with area-weighted averages of adjacent face normals.
    pub fn recompute_normals(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.vertices.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let pa = Vec3::from_array(self.vertices[a].position);
            let pb = Vec3::from_array(self.vertices[b].position);
            let pc = Vec3::from_array(self.vertices[c].position);
            let face = (pb - pa).cross(pc - pa);
            accum[a] += face;
            accum[b] += face;
            accum[c] += face;
        }
        for (vertex, n) in self.vertices.iter_mut().zip(accum) {
            vertex.normal = n.try_normalize().unwrap_or(Vec3::Y).to_array();
        }
    }
}
