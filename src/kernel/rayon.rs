//! Rayon-parallel drivers (feature-gated).
//!
//! Every kernel in this crate is a pure per-pixel map, so the drivers here
//! shard the output buffer by rows with `par_chunks_mut` and run the same
//! per-row code as the sequential paths. Results are bit-identical to the
//! sequential versions.

use crate::field::{FeatureField, Field, PointField, ProjectionField, ScoreField};
use crate::geometry::{projection_output, PinholeCamera};
use crate::image::ImageView;
use crate::kernel::{score_row, Kernel};
use crate::ncc::check_shapes;
use crate::patch::{allocate_features, normalize_row, PatchStats};
use crate::trace::{kernel_event, kernel_span};
use crate::util::StereoCorrResult;
use rayon::prelude::*;

/// Row-parallel [`PinholeCamera::project`].
pub fn project_par(
    camera: &PinholeCamera,
    points: &PointField,
) -> StereoCorrResult<ProjectionField> {
    let _span = kernel_span!(
        "project",
        width = points.width(),
        height = points.height(),
        parallel = true
    )
    .entered();

    let mut out = projection_output(points)?;
    let out_row_len = out.row_len();
    let in_row_len = points.row_len();
    out.data_mut()
        .par_chunks_mut(out_row_len)
        .zip(points.data().par_chunks(in_row_len))
        .for_each(|(dst_row, src_row)| {
            for (dst, src) in dst_row.chunks_exact_mut(2).zip(src_row.chunks_exact(3)) {
                let uv = camera.project_point([src[0], src[1], src[2]]);
                dst.copy_from_slice(&uv);
            }
        });

    kernel_event!("points_projected", count = points.width() * points.height());
    Ok(out)
}

/// Row-parallel [`crate::preprocess_patches`].
pub fn preprocess_patches_par<T: Copy + Into<f32> + Sync>(
    image: ImageView<'_, T>,
    window_size: usize,
) -> StereoCorrResult<FeatureField> {
    let _span = kernel_span!(
        "preprocess_patches",
        width = image.width(),
        height = image.height(),
        channels = image.channels(),
        window_size = window_size,
        parallel = true
    )
    .entered();

    let mut features = allocate_features(image, window_size)?;
    let row_len = features.as_field().row_len();
    let stats = features
        .field_mut()
        .data_mut()
        .par_chunks_mut(row_len)
        .enumerate()
        .map(|(y, row)| normalize_row(image, window_size, y, row))
        .reduce(PatchStats::default, |a, b| a + b);

    kernel_event!(
        "patches_normalized",
        normalized = stats.normalized,
        degenerate = stats.degenerate
    );
    Ok(features)
}

/// Row-parallel [`crate::ncc::correlate_with`].
pub fn correlate_par<K: Kernel>(
    a: &FeatureField,
    b: &FeatureField,
) -> StereoCorrResult<ScoreField> {
    let _span = kernel_span!(
        "correlate",
        width = a.width(),
        height = a.height(),
        vector_len = a.vector_len(),
        parallel = true
    )
    .entered();

    check_shapes(a, b)?;
    let mut scores = Field::zeros(a.width(), a.height(), 1)?;
    let width = a.width();
    let cell_len = a.vector_len();
    let row_len = a.as_field().row_len();
    let zero_denominators: usize = scores
        .data_mut()
        .par_chunks_mut(width)
        .zip(a.as_field().data().par_chunks(row_len))
        .zip(b.as_field().data().par_chunks(row_len))
        .map(|((out, row_a), row_b)| score_row::<K>(row_a, row_b, cell_len, out))
        .sum();

    kernel_event!("correlation_scored", zero_denominators = zero_denominators);
    Ok(scores)
}
