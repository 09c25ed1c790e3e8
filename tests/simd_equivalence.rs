#![cfg(feature = "simd")]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stereocorr::lowlevel::{correlate_with, Kernel, NccScalar, NccSimd};
use stereocorr::{correlate, preprocess_patches, FeatureField, ImageView};

#[test]
fn simd_moments_match_scalar_for_all_tail_lengths() {
    let mut rng = StdRng::seed_from_u64(1234);
    for len in [1usize, 7, 8, 9, 16, 25, 27, 49, 75] {
        let a: Vec<f32> = (0..len).map(|_| rng.random_range(-1.0f32..1.0)).collect();
        let b: Vec<f32> = (0..len).map(|_| rng.random_range(-1.0f32..1.0)).collect();
        let s = NccScalar::moments(&a, &b);
        let v = NccSimd::moments(&a, &b);
        assert!((s.dot - v.dot).abs() < 1e-5, "len {len}");
        assert!((s.sq_a - v.sq_a).abs() < 1e-5, "len {len}");
        assert!((s.sq_b - v.sq_b).abs() < 1e-5, "len {len}");
        assert!((NccScalar::score(&a, &b) - NccSimd::score(&a, &b)).abs() < 1e-5);
    }
}

#[test]
fn simd_correlation_matches_scalar() {
    let (width, height, channels) = (21, 17, 3);
    let mut rng = StdRng::seed_from_u64(77);
    let a: Vec<f32> = (0..width * height * channels)
        .map(|_| rng.random_range(0.0f32..1.0))
        .collect();
    let b: Vec<f32> = (0..width * height * channels)
        .map(|_| rng.random_range(0.0f32..1.0))
        .collect();
    let fa = preprocess_patches(ImageView::from_slice(&a, width, height, channels).unwrap(), 5)
        .unwrap();
    let fb = preprocess_patches(ImageView::from_slice(&b, width, height, channels).unwrap(), 5)
        .unwrap();

    let scalar = correlate_with::<NccScalar>(&fa, &fb).unwrap();
    let simd = correlate_with::<NccSimd>(&fa, &fb).unwrap();
    for (s, v) in scalar.data().iter().zip(simd.data()) {
        assert!((s - v).abs() < 1e-5);
    }
}

#[test]
fn simd_sums_do_not_overflow_for_large_features() {
    let v = vec![1e20f32, -1e20, 2e20, 0.0, 1e20, -3e20, 1e20, 5e19, 0.0];
    let a = FeatureField::new(v.clone(), 1, 1, 1, 3).unwrap();
    let b = FeatureField::new(v.iter().map(|x| -0.5 * x).collect(), 1, 1, 1, 3).unwrap();

    let m = NccSimd::moments(a.vector(0, 0).unwrap(), a.vector(0, 0).unwrap());
    assert!(m.dot.is_finite() && m.sq_a.is_finite() && m.sq_b.is_finite());

    let same = correlate(&a, &a).unwrap();
    assert!((same.data()[0] - 1.0).abs() < 1e-6, "got {}", same.data()[0]);
    let opposite = correlate_with::<NccSimd>(&a, &b).unwrap();
    assert!((opposite.data()[0] + 1.0).abs() < 1e-6, "got {}", opposite.data()[0]);
}

#[test]
fn simd_matches_scalar_near_f32_max() {
    let mut rng = StdRng::seed_from_u64(4242);
    for len in [8usize, 9, 27, 75] {
        let a: Vec<f32> = (0..len)
            .map(|_| rng.random_range(-1.0f32..1.0) * 1e37)
            .collect();
        let b: Vec<f32> = (0..len)
            .map(|_| rng.random_range(-1.0f32..1.0) * 3e38)
            .collect();
        let s = NccScalar::score(&a, &b);
        let v = NccSimd::score(&a, &b);
        assert!(v.is_finite(), "len {len}");
        assert!((s - v).abs() < 1e-5, "len {len}: scalar {s}, simd {v}");
    }
}
