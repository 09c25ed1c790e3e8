//! Scalar reference kernel.

use crate::kernel::{Kernel, Moments};

/// Scalar NCC kernel accumulating in `f64`.
pub struct NccScalar;

impl Kernel for NccScalar {
    #[inline]
    fn moments(a: &[f32], b: &[f32]) -> Moments {
        let mut m = Moments::default();
        for (&va, &vb) in a.iter().zip(b.iter()) {
            let va = f64::from(va);
            let vb = f64::from(vb);
            m.dot += va * vb;
            m.sq_a += va * va;
            m.sq_b += vb * vb;
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use super::NccScalar;
    use crate::kernel::Kernel;

    #[test]
    fn score_ignores_vector_scale() {
        let a = [1.0f32, -2.0, 3.0, 0.5];
        let b = [2.0f32, -4.0, 6.0, 1.0];
        assert!((NccScalar::score(&a, &b) - 1.0).abs() < 1e-6);

        let neg: Vec<f32> = a.iter().map(|v| -3.0 * v).collect();
        assert!((NccScalar::score(&a, &neg) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn score_is_zero_for_zero_vector() {
        let a = [0.0f32; 4];
        let b = [1.0f32, 2.0, 3.0, 4.0];
        assert_eq!(NccScalar::moments(&a, &b).score(), None);
        assert_eq!(NccScalar::score(&a, &b), 0.0);
        assert_eq!(NccScalar::score(&a, &a), 0.0);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        let a = [1.0f32, 0.0, -1.0, 0.0];
        let b = [0.0f32, 1.0, 0.0, -1.0];
        assert_eq!(NccScalar::score(&a, &b), 0.0);
    }
}
