//! Primitive shapes built by formula.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use super::{Mesh, Vertex, WHITE};
use crate::error::ParamError;

impl Mesh {
    /// Flat quad in the XZ plane facing +Y, uvs running `0..uv_repeat` for texture tiling
    pub fn quad(half_extent: f32, uv_repeat: f32) -> Self {
        let h = half_extent;
        let mut mesh = Mesh::default();
        mesh.push_face(
            &[
                Vec3::new(-h, 0.0, h),
                Vec3::new(h, 0.0, h),
                Vec3::new(h, 0.0, -h),
                Vec3::new(-h, 0.0, -h),
            ],
            uv_repeat,
        );
        mesh
    }

    /// Unit cube centred on the origin, one flat quad per face
    pub fn cube() -> Self {
        // (normal, u, v) with u × v = normal
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        let mut mesh = Mesh::default();
        for (n, u, v) in faces {
            let (c, u, v) = (n * 0.5, u * 0.5, v * 0.5);
            mesh.push_face(&[c - u - v, c + u - v, c + u + v, c - u + v], 1.0);
        }
        mesh
    }

    /// UV sphere of radius 1 with `lats` bands from pole to pole and `longs` slices.
    pub fn sphere(lats: u32, longs: u32) -> Result<Self, ParamError> {
        if lats < 2 {
            return Err(ParamError::invalid("lats", lats, "must be >= 2"));
        }
        if longs < 3 {
            return Err(ParamError::invalid("longs", longs, "must be >= 3"));
        }

        let ring = longs + 1;
        let mut vertices = Vec::with_capacity((ring * (lats + 1)) as usize);
        for i in 0..=lats {
            let theta = PI * i as f32 / lats as f32;
            for j in 0..=longs {
                let phi = TAU * j as f32 / longs as f32;
                let p = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
                vertices.push(Vertex {
                    position: p.to_array(),
                    normal: p.to_array(),
                    uv: [j as f32 / longs as f32, i as f32 / lats as f32],
                    colour: WHITE,
                });
            }
        }

        let mut indices = Vec::with_capacity((lats * longs * 6) as usize);
        for i in 0..lats {
            for j in 0..longs {
                let a = i * ring + j;
                let b = a + ring;
                indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
            }
        }

        Ok(Self { vertices, indices })
    }

    /// Closed cylinder of radius 1 and height 1 (y in [-0.5, 0.5]) around the Y axis
    pub fn cylinder(segments: u32) -> Result<Self, ParamError> {
        if segments < 3 {
            return Err(ParamError::invalid("segments", segments, "must be >= 3"));
        }

        let mut mesh = Mesh::default();
        let angle = |j: u32| TAU * j as f32 / segments as f32;

        // Side: bottom/top pairs, smooth radial normals
        for j in 0..=segments {
            let (s, c) = angle(j).sin_cos();
            let u = j as f32 / segments as f32;
            for (y, v) in [(-0.5, 0.0), (0.5, 1.0)] {
                mesh.vertices.push(Vertex {
                    position: [c, y, s],
                    normal: [c, 0.0, s],
                    uv: [u, v],
                    colour: WHITE,
                });
            }
        }
        for j in 0..segments {
            let (a, b) = (2 * j, 2 * j + 1);
            let (c, d) = (a + 2, b + 2);
            mesh.indices.extend_from_slice(&[a, b, c, c, b, d]);
        }

        // Caps: centre plus ring, flat normals
        for (y, ny) in [(0.5f32, 1.0f32), (-0.5, -1.0)] {
            let centre = mesh.vertices.len() as u32;
            mesh.vertices.push(Vertex {
                position: [0.0, y, 0.0],
                normal: [0.0, ny, 0.0],
                uv: [0.5, 0.5],
                colour: WHITE,
            });
            for j in 0..=segments {
                let (s, c) = angle(j).sin_cos();
                mesh.vertices.push(Vertex {
                    position: [c, y, s],
                    normal: [0.0, ny, 0.0],
                    uv: [0.5 + 0.5 * c, 0.5 + 0.5 * s],
                    colour: WHITE,
                });
            }
            for j in 0..segments {
                let (r0, r1) = (centre + 1 + j, centre + 2 + j);
                if ny > 0.0 {
                    mesh.indices.extend_from_slice(&[centre, r1, r0]);
                } else {
                    mesh.indices.extend_from_slice(&[centre, r0, r1]);
                }
            }
        }

        Ok(mesh)
    }

    /// Right triangular prism: right-angled triangle in XY, extruded along Z, unit extents
    pub fn tri_prism() -> Self {
        let h = 0.5;
        let (a, b, c) = (Vec3::new(-h, -h, 0.0), Vec3::new(h, -h, 0.0), Vec3::new(-h, h, 0.0));
        let (front, back) = (Vec3::new(0.0, 0.0, h), Vec3::new(0.0, 0.0, -h));

        let mut mesh = Mesh::default();
        mesh.push_face(&[a + front, b + front, c + front], 1.0);
        mesh.push_face(&[a + back, c + back, b + back], 1.0);
        mesh.push_face(&[a + front, a + back, b + back, b + front], 1.0);
        mesh.push_face(&[a + front, c + front, c + back, a + back], 1.0);
        mesh.push_face(&[b + front, b + back, c + back, c + front], 1.0);
        mesh
    }
}
