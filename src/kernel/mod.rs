//! Correlation kernel implementations.
//!
//! A kernel reduces two equal-length feature vectors to their NCC moments.
//! The row drivers in [`crate::ncc`] and the `rayon` module are generic over
//! the kernel so the scalar and SIMD paths share the same zero-denominator
//! handling.

/// Sums needed for one NCC score.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Moments {
    /// `sum(a * b)`.
    pub dot: f64,
    /// `sum(a * a)`.
    pub sq_a: f64,
    /// `sum(b * b)`.
    pub sq_b: f64,
}

impl Moments {
    /// Returns `dot / sqrt(sq_a * sq_b)`, or `None` when the denominator is
    /// exactly zero.
    #[inline]
    pub fn score(&self) -> Option<f32> {
        let denom = (self.sq_a * self.sq_b).sqrt();
        if denom == 0.0 {
            None
        } else {
            Some((self.dot / denom) as f32)
        }
    }
}

/// Kernel trait for scoring a pair of feature vectors.
pub trait Kernel {
    /// Accumulates the NCC moments of `a` and `b`.
    ///
    /// Callers guarantee `a.len() == b.len()`.
    fn moments(a: &[f32], b: &[f32]) -> Moments;

    /// Scores two vectors, returning `0.0` when either has zero energy.
    #[inline]
    fn score(a: &[f32], b: &[f32]) -> f32 {
        Self::moments(a, b).score().unwrap_or(0.0)
    }
}

/// Scores one row of cells; returns how many had a zero denominator.
pub(crate) fn score_row<K: Kernel>(
    row_a: &[f32],
    row_b: &[f32],
    cell_len: usize,
    out: &mut [f32],
) -> usize {
    let mut zero_denominators = 0usize;
    for ((a, b), score) in row_a
        .chunks_exact(cell_len)
        .zip(row_b.chunks_exact(cell_len))
        .zip(out.iter_mut())
    {
        *score = match K::moments(a, b).score() {
            Some(value) => value,
            None => {
                zero_denominators += 1;
                0.0
            }
        };
    }
    zero_denominators
}

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;

/// Kernel used by [`crate::correlate`] and [`crate::Ncc`].
#[cfg(feature = "simd")]
pub type DefaultKernel = simd::NccSimd;

/// Kernel used by [`crate::correlate`] and [`crate::Ncc`].
#[cfg(not(feature = "simd"))]
pub type DefaultKernel = scalar::NccScalar;
