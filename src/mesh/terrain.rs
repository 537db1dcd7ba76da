//! Noise-displaced terrain heightfield.

use super::{Mesh, Vertex};
use crate::error::ParamError;
use crate::noise::{GradientNoise, NoiseField};
use crate::params::TerrainParams;

const WATER: [f32; 4] = [0.1, 0.25, 0.6, 1.0];
const SAND: [f32; 4] = [0.76, 0.7, 0.5, 1.0];
const GRASS: [f32; 4] = [0.2, 0.55, 0.2, 1.0];
const ROCK: [f32; 4] = [0.45, 0.4, 0.35, 1.0];
const SNOW: [f32; 4] = [0.95, 0.95, 0.97, 1.0];

/// Vertex colour for a terrain height.
///
/// Bands are measured above `sea_level` as a fraction of the peak height
/// (`height_scale / 2`): below sea is water, then sand, grass, rock and snow.
pub fn height_colour(y: f32, sea_level: f32, height_scale: f32) -> [f32; 4] {
    let peak = (height_scale / 2.0).max(f32::EPSILON);
    let h = (y - sea_level) / peak;
    match h {
        h if h < 0.0 => WATER,
        h if h < 0.1 => SAND,
        h if h < 0.45 => GRASS,
        h if h < 0.75 => ROCK,
        _ => SNOW,
    }
}

impl Mesh {
    /// Build a `xsize` × `zsize` vertex grid displaced by a noise field.
    ///
    /// The grid spans `width` × `depth` centred on the origin. Height is
    /// `(value - 0.5) * height_scale`; normals are smoothed over adjacent faces.
    pub fn terrain<N: GradientNoise + ?Sized>(
        params: &TerrainParams,
        noise: &N,
    ) -> Result<Self, ParamError> {
        if params.xsize < 2 {
            return Err(ParamError::invalid("xsize", params.xsize as f64, "must be >= 2"));
        }
        if params.zsize < 2 {
            return Err(ParamError::invalid("zsize", params.zsize as f64, "must be >= 2"));
        }
        if !params.height_scale.is_finite() {
            return Err(ParamError::invalid(
                "height_scale",
                params.height_scale,
                "must be finite",
            ));
        }

        let field = NoiseField::generate(params.xsize, params.zsize, &params.noise, noise)?;
        let (nx, nz) = (params.xsize, params.zsize);
        let (half_w, half_d) = (params.width / 2.0, params.depth / 2.0);

        let mut vertices = Vec::with_capacity(nx * nz);
        for (i, &value) in field.values().iter().enumerate() {
            let (z, x) = (i / nx, i % nx);
            let (u, v) = (x as f32 / (nx - 1) as f32, z as f32 / (nz - 1) as f32);
            let y = (value - 0.5) * params.height_scale;
            vertices.push(Vertex {
                position: [u * params.width - half_w, y, v * params.depth - half_d],
                normal: [0.0, 1.0, 0.0],
                uv: [u, v],
                colour: height_colour(y, params.sea_level, params.height_scale),
            });
        }

        // Counter-clockwise seen from above
        let mut indices = Vec::with_capacity((nx - 1) * (nz - 1) * 6);
        for z in 0..nz - 1 {
            for x in 0..nx - 1 {
                let top_left = (z * nx + x) as u32;
                let top_right = top_left + 1;
                let bottom_left = ((z + 1) * nx + x) as u32;
                let bottom_right = bottom_left + 1;

                indices.extend_from_slice(&[
                    top_left,
                    bottom_left,
                    top_right,
                    top_right,
                    bottom_left,
                    bottom_right,
                ]);
            }
        }

        let mut mesh = Self { vertices, indices };
        mesh.recompute_normals();
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::ClassicPerlin;
    use crate::params::NoiseParams;
    use approx::assert_relative_eq;

    fn small_params() -> TerrainParams {
        TerrainParams {
            xsize: 20,
            zsize: 12,
            ..Default::default()
        }
    }

    #[test]
    fn grid_counts_and_extent() {
        let params = small_params();
        let mesh = Mesh::terrain(&params, &ClassicPerlin).unwrap();
        assert_eq!(mesh.vertices.len(), 20 * 12);
        assert_eq!(mesh.indices.len(), 19 * 11 * 6);

        let first = mesh.vertices[0].position;
        let last = mesh.vertices.last().unwrap().position;
        assert_relative_eq!(first[0], -1.0);
        assert_relative_eq!(first[2], -1.0);
        assert_relative_eq!(last[0], 1.0);
        assert_relative_eq!(last[2], 1.0);
    }

    #[test]
    fn heights_stay_within_half_scale() {
        let params = small_params();
        let mesh = Mesh::terrain(&params, &ClassicPerlin).unwrap();
        let half = params.height_scale / 2.0;
        for v in &mesh.vertices {
            assert!(v.position[1].abs() <= half + 1e-6);
        }
    }

    #[test]
    fn triangles_face_up() {
        let mesh = Mesh::terrain(&small_params(), &ClassicPerlin).unwrap();
        for tri in mesh.indices.chunks_exact(3) {
            let p = |i: u32| glam::Vec3::from_array(mesh.vertices[i as usize].position);
            let n = (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]));
            assert!(n.y > 0.0);
        }
        for v in &mesh.vertices {
            assert!(v.normal[1] > 0.0);
            assert_relative_eq!(glam::Vec3::from_array(v.normal).length(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn flat_field_is_sand_coloured_plane() {
        let params = TerrainParams {
            xsize: 4,
            zsize: 4,
            noise: NoiseParams {
                octaves: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mesh = Mesh::terrain(&params, &ClassicPerlin).unwrap();
        for v in &mesh.vertices {
            assert_eq!(v.position[1], 0.0);
            assert_relative_eq!(v.normal[1], 1.0, epsilon = 1e-6);
            assert_eq!(v.colour, SAND);
        }
    }

    #[test]
    fn colour_bands_rise_with_height() {
        assert_eq!(height_colour(-0.1, 0.0, 0.5), WATER);
        assert_eq!(height_colour(0.01, 0.0, 0.5), SAND);
        assert_eq!(height_colour(0.1, 0.0, 0.5), GRASS);
        assert_eq!(height_colour(0.15, 0.0, 0.5), ROCK);
        assert_eq!(height_colour(0.25, 0.0, 0.5), SNOW);
        // Raising the sea level floods low ground
        assert_eq!(height_colour(0.05, 0.1, 0.5), WATER);
    }

    #[test]
    fn rejects_degenerate_grid() {
        let params = TerrainParams {
            xsize: 1,
            ..Default::default()
        };
        assert!(matches!(
            Mesh::terrain(&params, &ClassicPerlin),
            Err(ParamError::InvalidParameter { name: "xsize", .. })
        ));
    }
}
