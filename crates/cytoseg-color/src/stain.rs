//! Stain vectors
//!
//! A stain is described by its optical-density direction in RGB: the
//! relative amount of red, green and blue light it absorbs. Three stain
//! vectors form the unmixing basis used by colour deconvolution; when only
//! two are known the third is a residual orthogonal to both.

use crate::error::{ColorError, ColorResult};

/// A single normalised stain vector
#[derive(Debug, Clone, PartialEq)]
pub struct StainVector {
    name: String,
    rgb: [f64; 3],
    residual: bool,
}

impl StainVector {
    /// Create a stain vector, normalised to unit length
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::InvalidStain`] if a component is non-finite or
    /// negative, or if the vector is zero.
    pub fn new(name: impl Into<String>, rgb: [f64; 3]) -> ColorResult<Self> {
        let name = name.into();
        if rgb.iter().any(|c| !c.is_finite()) {
            return Err(ColorError::InvalidStain {
                name,
                reason: "non-finite component",
            });
        }
        if rgb.iter().any(|&c| c < 0.0) {
            return Err(ColorError::InvalidStain {
                name,
                reason: "negative component",
            });
        }
        let Some(rgb) = normalize(rgb) else {
            return Err(ColorError::InvalidStain {
                name,
                reason: "zero vector",
            });
        };
        Ok(Self {
            name,
            rgb,
            residual: false,
        })
    }

    /// Residual stain orthogonal to two others
    fn residual_of(a: &StainVector, b: &StainVector) -> ColorResult<Self> {
        let [a0, a1, a2] = a.rgb;
        let [b0, b1, b2] = b.rgb;
        let cross = [a1 * b2 - a2 * b1, a2 * b0 - a0 * b2, a0 * b1 - a1 * b0];
        let rgb = normalize(cross).ok_or(ColorError::SingularStains)?;
        Ok(Self {
            name: "Residual".to_string(),
            rgb,
            residual: true,
        })
    }

    /// Preset vector from constants known to be valid
    fn preset(name: &str, rgb: [f64; 3]) -> Self {
        let norm = rgb.iter().map(|c| c * c).sum::<f64>().sqrt();
        Self {
            name: name.to_string(),
            rgb: rgb.map(|c| c / norm),
            residual: false,
        }
    }

    /// Stain name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit optical-density direction
    pub fn rgb(&self) -> [f64; 3] {
        self.rgb
    }

    /// Whether this is the residual (background-like) vector
    pub fn is_residual(&self) -> bool {
        self.residual
    }
}

fn normalize(v: [f64; 3]) -> Option<[f64; 3]> {
    let norm = v.iter().map(|c| c * c).sum::<f64>().sqrt();
    (norm > 1e-12).then(|| v.map(|c| c / norm))
}

/// A full unmixing basis: three stains plus the white-point background
#[derive(Debug, Clone, PartialEq)]
pub struct StainVectors {
    name: String,
    stains: [StainVector; 3],
    background: [f64; 3],
}

impl StainVectors {
    /// Build a basis from two stains and an optional third
    ///
    /// Without a third stain the residual is the normalised cross product
    /// of the first two.
    ///
    /// # Errors
    ///
    /// Returns an error if the background has a component `<= 0` or the
    /// stains are linearly dependent.
    pub fn new(
        name: impl Into<String>,
        stain1: StainVector,
        stain2: StainVector,
        stain3: Option<StainVector>,
        background: [f64; 3],
    ) -> ColorResult<Self> {
        if background.iter().any(|&b| !(b > 0.0 && b.is_finite())) {
            return Err(ColorError::InvalidParameters(format!(
                "background must be positive, got {background:?}"
            )));
        }
        let stain3 = match stain3 {
            Some(s) => s,
            None => StainVector::residual_of(&stain1, &stain2)?,
        };
        let vectors = Self {
            name: name.into(),
            stains: [stain1, stain2, stain3],
            background,
        };
        vectors.inverse()?;
        Ok(vectors)
    }

    /// Default hematoxylin and DAB vectors
    pub fn hematoxylin_dab() -> Self {
        Self::preset(
            "H-DAB default",
            StainVector::preset("Hematoxylin", [0.651, 0.701, 0.290]),
            StainVector::preset("DAB", [0.269, 0.568, 0.778]),
        )
    }

    /// Default hematoxylin and eosin vectors
    pub fn hematoxylin_eosin() -> Self {
        Self::preset(
            "H&E default",
            StainVector::preset("Hematoxylin", [0.644, 0.717, 0.267]),
            StainVector::preset("Eosin", [0.093, 0.954, 0.283]),
        )
    }

    fn preset(name: &str, stain1: StainVector, stain2: StainVector) -> Self {
        let [a0, a1, a2] = stain1.rgb;
        let [b0, b1, b2] = stain2.rgb;
        let residual = StainVector::preset(
            "Residual",
            [a1 * b2 - a2 * b1, a2 * b0 - a0 * b2, a0 * b1 - a1 * b0],
        );
        Self {
            name: name.to_string(),
            stains: [
                stain1,
                stain2,
                StainVector {
                    residual: true,
                    ..residual
                },
            ],
            background: [255.0; 3],
        }
    }

    /// Basis name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All three stains, residual included
    pub fn stains(&self) -> &[StainVector; 3] {
        &self.stains
    }

    /// Stains that produce output channels
    pub fn non_residual(&self) -> impl Iterator<Item = &StainVector> {
        self.stains.iter().filter(|s| !s.residual)
    }

    /// White-point intensity per RGB channel
    pub fn background(&self) -> [f64; 3] {
        self.background
    }

    /// Replace the background white point
    pub fn with_background(mut self, background: [f64; 3]) -> ColorResult<Self> {
        if background.iter().any(|&b| !(b > 0.0 && b.is_finite())) {
            return Err(ColorError::InvalidParameters(format!(
                "background must be positive, got {background:?}"
            )));
        }
        self.background = background;
        Ok(self)
    }

    /// Inverse of the matrix whose rows are the stain vectors
    ///
    /// Optical densities `od` (row vector) unmix to concentrations
    /// `od * inverse`.
    pub fn inverse(&self) -> ColorResult<[[f64; 3]; 3]> {
        let m = self.stains.each_ref().map(|s| s.rgb);
        let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);
        if det.abs() < 1e-9 {
            return Err(ColorError::SingularStains);
        }
        let inv_det = 1.0 / det;
        let mut inv = [[0.0; 3]; 3];
        for (r, row) in inv.iter_mut().enumerate() {
            for (c, v) in row.iter_mut().enumerate() {
                // Cofactor of m[c][r] (transpose for the adjugate)
                let (r1, r2) = ((c + 1) % 3, (c + 2) % 3);
                let (c1, c2) = ((r + 1) % 3, (r + 2) % 3);
                *v = (m[r1][c1] * m[r2][c2] - m[r1][c2] * m[r2][c1]) * inv_det;
            }
        }
        Ok(inv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stain_normalized() {
        let s = StainVector::new("A", [3.0, 4.0, 0.0]).unwrap();
        assert_eq!(s.rgb(), [0.6, 0.8, 0.0]);
        assert!(!s.is_residual());
    }

    #[test]
    fn test_invalid_stain() {
        assert!(StainVector::new("zero", [0.0; 3]).is_err());
        assert!(StainVector::new("neg", [-1.0, 0.5, 0.5]).is_err());
        assert!(StainVector::new("nan", [f64::NAN, 0.5, 0.5]).is_err());
    }

    #[test]
    fn test_residual_is_orthogonal() {
        let hdab = StainVectors::hematoxylin_dab();
        let [h, d, r] = hdab.stains().each_ref().map(|s| s.rgb());
        let dot = |a: [f64; 3], b: [f64; 3]| a[0] * b[0] + a[1] * b[1] + a[2] * b[2];
        assert!(dot(h, r).abs() < 1e-12);
        assert!(dot(d, r).abs() < 1e-12);
        assert!(hdab.stains()[2].is_residual());
        assert_eq!(hdab.non_residual().count(), 2);
    }

    #[test]
    fn test_inverse() {
        let he = StainVectors::hematoxylin_eosin();
        let inv = he.inverse().unwrap();
        // Each stain vector unmixes to a unit concentration of itself
        for (i, s) in he.stains().iter().enumerate() {
            let v = s.rgb();
            for (j, _) in he.stains().iter().enumerate() {
                let c: f64 = (0..3).map(|k| v[k] * inv[k][j]).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((c - expected).abs() < 1e-9, "stain {i} channel {j}: {c}");
            }
        }
    }

    #[test]
    fn test_dependent_stains_rejected() {
        let a = StainVector::new("A", [1.0, 0.0, 0.0]).unwrap();
        let b = StainVector::new("B", [2.0, 0.0, 0.0]).unwrap();
        assert!(matches!(
            StainVectors::new("bad", a, b, None, [255.0; 3]),
            Err(ColorError::SingularStains)
        ));
    }
}
