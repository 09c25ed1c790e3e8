//! Patch-feature preprocessing for normalized cross-correlation.
//!
//! Every image is normalized once; the resulting feature field can then be
//! correlated against any number of other fields of the same layout.
//!
//! For a window of side `2k + 1`, pixels within `k` of any border get the zero
//! vector, as do interior windows whose mean-subtracted norm is below
//! [`NORM_EPS`]. The two conditions are independent.

mod window;

pub use window::{normalize_window, WindowStatus, NORM_EPS};

use std::ops::{Add, AddAssign};

use crate::field::FeatureField;
use crate::image::ImageView;
use crate::trace::{kernel_event, kernel_span};
use crate::util::StereoCorrResult;
use window::normalize_window_unchecked;

/// Window counts gathered while normalizing a field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct PatchStats {
    pub(crate) normalized: usize,
    pub(crate) degenerate: usize,
}

impl Add for PatchStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            normalized: self.normalized + rhs.normalized,
            degenerate: self.degenerate + rhs.degenerate,
        }
    }
}

impl AddAssign for PatchStats {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Builds the patch-feature field of an image.
///
/// `window_size` must be a positive odd integer. Each interior pixel gets a
/// vector of `channels * window_size^2` values; see [`normalize_window`] for
/// the layout. Images smaller than the window produce an all-zero field.
pub fn preprocess_patches<T: Copy + Into<f32>>(
    image: ImageView<'_, T>,
    window_size: usize,
) -> StereoCorrResult<FeatureField> {
    let _span = kernel_span!(
        "preprocess_patches",
        width = image.width(),
        height = image.height(),
        channels = image.channels(),
        window_size = window_size,
        parallel = false
    )
    .entered();

    let mut features = allocate_features(image, window_size)?;
    let row_len = features.as_field().row_len();
    let mut stats = PatchStats::default();
    for (y, row) in features
        .field_mut()
        .data_mut()
        .chunks_exact_mut(row_len)
        .enumerate()
    {
        stats += normalize_row(image, window_size, y, row);
    }

    kernel_event!(
        "patches_normalized",
        normalized = stats.normalized,
        degenerate = stats.degenerate
    );
    Ok(features)
}

pub(crate) fn allocate_features<T>(
    image: ImageView<'_, T>,
    window_size: usize,
) -> StereoCorrResult<FeatureField> {
    FeatureField::zeros(image.width(), image.height(), image.channels(), window_size)
}

/// Fills one output row. Margin rows and margin cells stay zero.
pub(crate) fn normalize_row<T: Copy + Into<f32>>(
    image: ImageView<'_, T>,
    window_size: usize,
    y: usize,
    row: &mut [f32],
) -> PatchStats {
    let mut stats = PatchStats::default();
    let k = window_size / 2;
    let width = image.width();
    if y < k || y + k >= image.height() || width < window_size {
        return stats;
    }

    let cell_len = row.len() / width;
    for x in k..width - k {
        let cell = &mut row[x * cell_len..(x + 1) * cell_len];
        match normalize_window_unchecked(image, x, y, window_size, cell) {
            WindowStatus::Normalized => stats.normalized += 1,
            WindowStatus::Degenerate => stats.degenerate += 1,
            WindowStatus::OutOfBounds => {}
        }
    }
    stats
}
