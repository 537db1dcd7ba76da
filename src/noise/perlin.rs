//! Classic 2-D Perlin noise with a polynomial permutation.
//!
//! Gradients come from a hash of the lattice coordinates (`(34x² + x) mod 289`), so the
//! noise needs no permutation table and no seed. The periodic variant wraps lattice
//! coordinates before hashing.

use super::GradientNoise;

/// Seedless classic Perlin noise. Zero at every integer lattice point.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicPerlin;

/// Output scale bringing the interpolated gradients to roughly [-1, 1].
const OUTPUT_SCALE: f64 = 2.3;

#[inline]
fn mod289(x: f64) -> f64 {
    x - (x / 289.0).floor() * 289.0
}

#[inline]
fn permute(x: f64) -> f64 {
    mod289((x * 34.0 + 1.0) * x)
}

/// First-order Taylor approximation of `1/sqrt(r)` around the gradient lengths used here.
#[inline]
fn taylor_inv_sqrt(r: f64) -> f64 {
    1.792_842_914_001_59 - 0.853_734_720_953_14 * r
}

/// Quintic fade curve `6t⁵ - 15t⁴ + 10t³`
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Floored modulo (result takes the sign of `y`)
#[inline]
fn floor_mod(x: f64, y: f64) -> f64 {
    x - y * (x / y).floor()
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Dot product of the hashed corner gradient with the offset `(fx, fy)`.
#[inline]
fn corner(ix: f64, iy: f64, fx: f64, fy: f64) -> f64 {
    let hash = permute(permute(ix) + iy);
    let mut gx = 2.0 * (hash / 41.0).fract() - 1.0;
    let gy = gx.abs() - 0.5;
    gx -= (gx + 0.5).floor();
    let norm = taylor_inv_sqrt(gx * gx + gy * gy);
    gx * norm * fx + gy * norm * fy
}

impl ClassicPerlin {
    fn eval(x: f64, y: f64, period: Option<(f64, f64)>) -> f64 {
        let (x0, y0) = (x.floor(), y.floor());
        let (fx0, fy0) = (x - x0, y - y0);
        let (fx1, fy1) = (fx0 - 1.0, fy0 - 1.0);

        let (mut ix0, mut iy0, mut ix1, mut iy1) = (x0, y0, x0 + 1.0, y0 + 1.0);
        if let Some((px, py)) = period {
            ix0 = floor_mod(ix0, px);
            ix1 = floor_mod(ix1, px);
            iy0 = floor_mod(iy0, py);
            iy1 = floor_mod(iy1, py);
        }
        // Keep the hash inputs small to avoid precision loss in the polynomial.
        let (ix0, iy0, ix1, iy1) = (mod289(ix0), mod289(iy0), mod289(ix1), mod289(iy1));

        let n00 = corner(ix0, iy0, fx0, fy0);
        let n10 = corner(ix1, iy0, fx1, fy0);
        let n01 = corner(ix0, iy1, fx0, fy1);
        let n11 = corner(ix1, iy1, fx1, fy1);

        let (u, v) = (fade(fx0), fade(fy0));
        OUTPUT_SCALE * lerp(lerp(n00, n10, u), lerp(n01, n11, u), v)
    }
}

impl GradientNoise for ClassicPerlin {
    fn sample(&self, x: f64, y: f64) -> f64 {
        Self::eval(x, y, None)
    }

    fn sample_periodic(&self, x: f64, y: f64, period_x: f64, period_y: f64) -> f64 {
        Self::eval(x, y, Some((period_x, period_y)))
    }
}
