//! Seed fill, hole filling and distance transforms
//!
//! - [`seedfill_gray`]: grayscale reconstruction by dilation of a seed
//!   under a mask
//! - [`fill_holes`]: fill background regions not connected to the border
//! - [`distance_function`]: exact Euclidean distance transform

use crate::conncomp::{ConnectivityType, neighbors};
use crate::error::{RegionError, RegionResult};
use cytoseg_core::{FPix, Mask};

/// Seed fill for float rasters (morphological reconstruction)
///
/// Reconstructs `seed` by geodesic dilation under `mask`: the output is
/// the largest raster `<= mask` that can be reached from the seed by
/// spreading values along connected paths.
///
/// # Arguments
///
/// * `seed` - Seed raster; values above `mask` are clipped to it
/// * `mask` - Upper bound raster
/// * `connectivity` - Connectivity type
///
/// # Returns
///
/// The reconstructed raster.
pub fn seedfill_gray(
    seed: &FPix,
    mask: &FPix,
    connectivity: ConnectivityType,
) -> RegionResult<FPix> {
    if seed.dimensions() != mask.dimensions() {
        return Err(RegionError::InvalidParameters(
            "seed and mask must have the same dimensions".to_string(),
        ));
    }
    let (w, h) = (seed.width() as usize, seed.height() as usize);
    let m = mask.data();
    let mut output = seed.zip_with(mask, f32::min)?;
    let out = output.data_mut();
    let eight = connectivity == ConnectivityType::EightWay;

    let mut changed = true;
    while changed {
        changed = false;

        // Forward pass (top-left to bottom-right)
        for y in 0..h {
            for x in 0..w {
                let i = y * w + x;
                let mut max_neighbor = out[i];
                if x > 0 {
                    max_neighbor = max_neighbor.max(out[i - 1]);
                }
                if y > 0 {
                    max_neighbor = max_neighbor.max(out[i - w]);
                    if eight {
                        if x > 0 {
                            max_neighbor = max_neighbor.max(out[i - w - 1]);
                        }
                        if x + 1 < w {
                            max_neighbor = max_neighbor.max(out[i - w + 1]);
                        }
                    }
                }
                let new_val = max_neighbor.min(m[i]);
                if new_val > out[i] {
                    out[i] = new_val;
                    changed = true;
                }
            }
        }

        // Backward pass (bottom-right to top-left)
        for y in (0..h).rev() {
            for x in (0..w).rev() {
                let i = y * w + x;
                let mut max_neighbor = out[i];
                if x + 1 < w {
                    max_neighbor = max_neighbor.max(out[i + 1]);
                }
                if y + 1 < h {
                    max_neighbor = max_neighbor.max(out[i + w]);
                    if eight {
                        if x + 1 < w {
                            max_neighbor = max_neighbor.max(out[i + w + 1]);
                        }
                        if x > 0 {
                            max_neighbor = max_neighbor.max(out[i + w - 1]);
                        }
                    }
                }
                let new_val = max_neighbor.min(m[i]);
                if new_val > out[i] {
                    out[i] = new_val;
                    changed = true;
                }
            }
        }
    }

    Ok(output)
}

/// Fill holes in a mask
///
/// Fills interior holes (background regions that cannot reach the image
/// border through `connectivity`-connected background).
pub fn fill_holes(mask: &Mask, connectivity: ConnectivityType) -> RegionResult<Mask> {
    let (w, h) = (mask.width() as i32, mask.height() as i32);
    let src = mask.data();
    let mut outside = vec![false; src.len()];
    let mut stack: Vec<usize> = Vec::new();

    for y in 0..h {
        for x in 0..w {
            let on_border = x == 0 || y == 0 || x == w - 1 || y == h - 1;
            let i = (y * w + x) as usize;
            if on_border && !src[i] && !outside[i] {
                outside[i] = true;
                stack.push(i);
            }
        }
    }
    while let Some(i) = stack.pop() {
        let (x, y) = ((i as i32) % w, (i as i32) / w);
        for n in neighbors(x, y, w, h, connectivity) {
            if !src[n] && !outside[n] {
                outside[n] = true;
                stack.push(n);
            }
        }
    }

    let mut result = mask.clone();
    for (v, &o) in result.data_mut().iter_mut().zip(&outside) {
        *v = !o;
    }
    Ok(result)
}

/// Boundary condition for distance function computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryCondition {
    /// Pixels beyond the image edge count as background
    Background,
    /// Pixels beyond the image edge are ignored; only background pixels
    /// inside the image are distance targets
    Foreground,
}

const FAR: f64 = 1e20;

/// Compute the Euclidean distance from each foreground pixel to the
/// nearest background pixel.
///
/// Exact transform by separable lower envelopes of parabolas
/// (Felzenszwalb & Huttenlocher). Background pixels are 0. With
/// [`BoundaryCondition::Foreground`] and no background pixel at all, every
/// value is `f32::INFINITY`.
pub fn distance_function(mask: &Mask, boundary_cond: BoundaryCondition) -> RegionResult<FPix> {
    let (w, h) = (mask.width() as usize, mask.height() as usize);
    let mut sq: Vec<f64> = mask
        .data()
        .iter()
        .map(|&fg| if fg { FAR } else { 0.0 })
        .collect();

    let n = w.max(h);
    let mut f = vec![0.0f64; n];
    let mut d = vec![0.0f64; n];
    let mut v = vec![0usize; n];
    let mut z = vec![0.0f64; n + 1];

    // Columns
    for x in 0..w {
        for y in 0..h {
            f[y] = sq[y * w + x];
        }
        edt_1d(&f[..h], &mut d[..h], &mut v, &mut z);
        for y in 0..h {
            sq[y * w + x] = d[y];
        }
    }
    // Rows
    for y in 0..h {
        let row = &mut sq[y * w..(y + 1) * w];
        f[..w].copy_from_slice(row);
        edt_1d(&f[..w], &mut d[..w], &mut v, &mut z);
        row.copy_from_slice(&d[..w]);
    }

    let mut out = FPix::new(mask.width(), mask.height())?;
    for (i, (o, &s)) in out.data_mut().iter_mut().zip(&sq).enumerate() {
        let mut dist = if s >= FAR * 0.1 {
            f64::INFINITY
        } else {
            s.sqrt()
        };
        if boundary_cond == BoundaryCondition::Background && mask.data()[i] {
            let (x, y) = (i % w, i / w);
            let edge = (x + 1).min(w - x).min(y + 1).min(h - y) as f64;
            dist = dist.min(edge);
        }
        *o = dist as f32;
    }
    Ok(out)
}

/// 1-D squared distance transform of sampled function `f`
fn edt_1d(f: &[f64], d: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    if n == 0 {
        return;
    }
    let mut k = 0usize;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;
    for q in 1..n {
        let qf = q as f64;
        loop {
            let p = v[k] as f64;
            let s = ((f[q] + qf * qf) - (f[v[k]] + p * p)) / (2.0 * qf - 2.0 * p);
            if s <= z[k] && k > 0 {
                k -= 1;
                continue;
            }
            if s <= z[k] {
                // k == 0: the new parabola dominates everywhere
                v[0] = q;
                z[0] = f64::NEG_INFINITY;
                z[1] = f64::INFINITY;
            } else {
                k += 1;
                v[k] = q;
                z[k] = s;
                z[k + 1] = f64::INFINITY;
            }
            break;
        }
    }
    let mut k = 0usize;
    for (q, dq) in d.iter_mut().enumerate() {
        let qf = q as f64;
        while z[k + 1] < qf {
            k += 1;
        }
        let p = v[k] as f64;
        *dq = (qf - p) * (qf - p) + f[v[k]];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seedfill_gray_reconstructs_connected_peak() {
        // Two peaks; the seed only touches the left one
        let mask = FPix::from_data(7, 1, vec![1.0, 5.0, 1.0, 0.0, 1.0, 6.0, 1.0]).unwrap();
        let mut seed = FPix::new(7, 1).unwrap();
        seed.set_pixel(1, 0, 5.0).unwrap();
        let rec = seedfill_gray(&seed, &mask, ConnectivityType::FourWay).unwrap();
        assert_eq!(rec.data(), &[1.0, 5.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_fill_holes() {
        let mut mask = Mask::new(5, 5).unwrap();
        for y in 1..4 {
            for x in 1..4 {
                if (x, y) != (2, 2) {
                    mask.set(x, y, true).unwrap();
                }
            }
        }
        let filled = fill_holes(&mask, ConnectivityType::FourWay).unwrap();
        assert!(filled.get(2, 2));
        assert_eq!(filled.count(), 9);
    }

    #[test]
    fn test_distance_function_exact() {
        let mut mask = Mask::new_with_value(7, 7, true).unwrap();
        mask.set(0, 0, false).unwrap();
        let d = distance_function(&mask, BoundaryCondition::Foreground).unwrap();
        assert_eq!(d.get_pixel(0, 0).unwrap(), 0.0);
        assert_eq!(d.get_pixel(3, 0).unwrap(), 3.0);
        assert!((d.get_pixel(3, 4).unwrap() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_distance_function_boundary() {
        let mask = Mask::new_with_value(5, 5, true).unwrap();
        let fg = distance_function(&mask, BoundaryCondition::Foreground).unwrap();
        assert!(fg.data().iter().all(|v| v.is_infinite()));
        let bg = distance_function(&mask, BoundaryCondition::Background).unwrap();
        assert_eq!(bg.get_pixel(0, 2).unwrap(), 1.0);
        assert_eq!(bg.get_pixel(2, 2).unwrap(), 3.0);
    }
}
