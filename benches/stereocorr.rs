use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use stereocorr::lowlevel::{correlate_with, NccScalar};
use stereocorr::{
    correlate, preprocess_patches, Extrinsics, Field, ImageView, Intrinsics, PinholeCamera,
};

fn make_image(width: usize, height: usize, channels: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height * channels);
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let value = ((x * 13) ^ (y * 7) ^ (x * y) ^ (c * 31)) & 0xFF;
                data.push(value as f32 / 255.0);
            }
        }
    }
    data
}

fn bench_preprocess(c: &mut Criterion) {
    let (width, height, channels) = (320, 240, 3);
    let image = make_image(width, height, channels);
    let view = ImageView::from_slice(&image, width, height, channels).unwrap();

    let mut group = c.benchmark_group("preprocess_patches");
    for window_size in [3usize, 5, 7] {
        group.bench_function(format!("w{window_size}"), |b| {
            b.iter(|| preprocess_patches(black_box(view), window_size).unwrap())
        });
        #[cfg(feature = "rayon")]
        group.bench_function(format!("w{window_size}_par"), |b| {
            b.iter(|| {
                stereocorr::lowlevel::preprocess_patches_par(black_box(view), window_size).unwrap()
            })
        });
    }
    group.finish();
}

fn bench_correlate(c: &mut Criterion) {
    let (width, height, channels) = (320, 240, 3);
    let left = make_image(width, height, channels);
    let right: Vec<f32> = left.iter().map(|v| 1.0 - v).collect();
    let fl = preprocess_patches(
        ImageView::from_slice(&left, width, height, channels).unwrap(),
        5,
    )
    .unwrap();
    let fr = preprocess_patches(
        ImageView::from_slice(&right, width, height, channels).unwrap(),
        5,
    )
    .unwrap();

    let mut group = c.benchmark_group("correlate");
    group.bench_function("default", |b| {
        b.iter(|| correlate(black_box(&fl), black_box(&fr)).unwrap())
    });
    group.bench_function("scalar", |b| {
        b.iter(|| correlate_with::<NccScalar>(black_box(&fl), black_box(&fr)).unwrap())
    });
    #[cfg(feature = "rayon")]
    group.bench_function("par", |b| {
        b.iter(|| {
            stereocorr::lowlevel::correlate_par::<stereocorr::lowlevel::DefaultKernel>(
                black_box(&fl),
                black_box(&fr),
            )
            .unwrap()
        })
    });
    group.finish();
}

fn bench_project(c: &mut Criterion) {
    let k = Intrinsics::from_params(500.0, 500.0, 320.0, 240.0, 0.0).unwrap();
    let camera = PinholeCamera::new(k, Extrinsics::identity());
    let (width, height) = (640, 480);
    let mut data = Vec::with_capacity(width * height * 3);
    for v in 0..height {
        for u in 0..width {
            data.extend_from_slice(&camera.unproject_pixel([u as f64, v as f64], 2.0));
        }
    }
    let points = Field::new(data, width, height, 3).unwrap();

    c.bench_function("project_640x480", |b| {
        b.iter(|| camera.project(black_box(&points)).unwrap())
    });
}

criterion_group!(benches, bench_preprocess, bench_correlate, bench_project);
criterion_main!(benches);
