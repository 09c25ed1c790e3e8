//! SIMD-accelerated kernel using the `wide` crate.
//!
//! Each block of 8 samples is widened to two `f64x4` halves before any
//! product is formed, so the three sums have the same range as
//! [`crate::kernel::scalar::NccScalar`] and stay finite for any finite `f32`
//! input. The tail that does not fill a block falls back to scalar code.

use crate::kernel::{Kernel, Moments};
use wide::f64x4;

const BLOCK: usize = 8;

/// Widens 4 f32 values into f64x4.
#[inline]
fn load_f64x4(slice: &[f32]) -> f64x4 {
    f64x4::from([
        f64::from(slice[0]),
        f64::from(slice[1]),
        f64::from(slice[2]),
        f64::from(slice[3]),
    ])
}

#[inline]
fn hsum(v: f64x4) -> f64 {
    v.to_array().iter().sum()
}

/// Running sums for one half of a block.
#[derive(Clone, Copy)]
struct Lanes {
    dot: f64x4,
    sq_a: f64x4,
    sq_b: f64x4,
}

impl Lanes {
    const ZERO: Self = Self {
        dot: f64x4::ZERO,
        sq_a: f64x4::ZERO,
        sq_b: f64x4::ZERO,
    };

    #[inline]
    fn accumulate(&mut self, a: &[f32], b: &[f32]) {
        let va = load_f64x4(a);
        let vb = load_f64x4(b);
        self.dot += va * vb;
        self.sq_a += va * va;
        self.sq_b += vb * vb;
    }
}

/// SIMD NCC kernel.
pub struct NccSimd;

impl Kernel for NccSimd {
    fn moments(a: &[f32], b: &[f32]) -> Moments {
        let len = a.len().min(b.len());
        let simd_end = len / BLOCK * BLOCK;

        let mut lo = Lanes::ZERO;
        let mut hi = Lanes::ZERO;
        for (ca, cb) in a[..simd_end]
            .chunks_exact(BLOCK)
            .zip(b[..simd_end].chunks_exact(BLOCK))
        {
            lo.accumulate(&ca[..4], &cb[..4]);
            hi.accumulate(&ca[4..], &cb[4..]);
        }

        let mut m = Moments {
            dot: hsum(lo.dot + hi.dot),
            sq_a: hsum(lo.sq_a + hi.sq_a),
            sq_b: hsum(lo.sq_b + hi.sq_b),
        };

        for (&va, &vb) in a[simd_end..len].iter().zip(&b[simd_end..len]) {
            let va = f64::from(va);
            let vb = f64::from(vb);
            m.dot += va * vb;
            m.sq_a += va * va;
            m.sq_b += vb * vb;
        }
        m
    }
}
