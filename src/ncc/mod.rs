//! Normalized cross-correlation between patch-feature fields.
//!
//! Normalization is paid once per image ([`crate::preprocess_patches`]) and
//! correlation once per image pair ([`correlate`]). [`Ncc`] bundles both
//! behind a validated [`NccConfig`] and picks the sequential or parallel path.

use crate::field::{FeatureField, Field, ScoreField};
use crate::image::ImageView;
use crate::kernel::{score_row, DefaultKernel, Kernel};
use crate::patch::preprocess_patches;
use crate::trace::{kernel_event, kernel_span};
use crate::util::{StereoCorrError, StereoCorrResult};

/// NCC pipeline configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NccConfig {
    /// Side length of the square patch window; positive and odd.
    pub window_size: usize,
    /// Run row-parallel drivers when the `rayon` feature is enabled.
    pub parallel: bool,
}

impl Default for NccConfig {
    fn default() -> Self {
        Self {
            window_size: 5,
            parallel: false,
        }
    }
}

impl NccConfig {
    /// Checks that the window size is a positive odd integer.
    pub fn validate(&self) -> StereoCorrResult<()> {
        if self.window_size == 0 || self.window_size % 2 == 0 {
            return Err(StereoCorrError::InvalidWindowSize {
                window_size: self.window_size,
            });
        }
        Ok(())
    }
}

/// Preprocesses images and correlates feature fields with one configuration.
#[derive(Clone, Debug)]
pub struct Ncc {
    cfg: NccConfig,
}

impl Ncc {
    /// Creates a pipeline after validating `cfg`.
    pub fn new(cfg: NccConfig) -> StereoCorrResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Replaces the configuration.
    pub fn with_config(self, cfg: NccConfig) -> StereoCorrResult<Self> {
        Self::new(cfg)
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &NccConfig {
        &self.cfg
    }

    /// Builds the patch-feature field of `image`.
    pub fn preprocess<T: Copy + Into<f32> + Sync>(
        &self,
        image: ImageView<'_, T>,
    ) -> StereoCorrResult<FeatureField> {
        #[cfg(feature = "rayon")]
        if self.cfg.parallel {
            return crate::kernel::rayon::preprocess_patches_par(image, self.cfg.window_size);
        }
        preprocess_patches(image, self.cfg.window_size)
    }

    /// Correlates two feature fields of the same layout.
    pub fn correlate(&self, a: &FeatureField, b: &FeatureField) -> StereoCorrResult<ScoreField> {
        #[cfg(feature = "rayon")]
        if self.cfg.parallel {
            return crate::kernel::rayon::correlate_par::<DefaultKernel>(a, b);
        }
        correlate_with::<DefaultKernel>(a, b)
    }
}

pub(crate) fn check_shapes(a: &FeatureField, b: &FeatureField) -> StereoCorrResult<()> {
    let (left, right) = (a.shape(), b.shape());
    if left != right {
        return Err(StereoCorrError::ShapeMismatch { left, right });
    }
    Ok(())
}

/// Computes the per-pixel NCC score of two feature fields.
///
/// Both fields must share width, height, channel count and window size. The
/// score is `sum(a * b) / sqrt(sum(a^2) * sum(b^2))`, or `0` where that
/// denominator is zero. Inputs are not assumed to be unit vectors.
pub fn correlate(a: &FeatureField, b: &FeatureField) -> StereoCorrResult<ScoreField> {
    correlate_with::<DefaultKernel>(a, b)
}

/// [`correlate`] with an explicit kernel.
pub fn correlate_with<K: Kernel>(a: &FeatureField, b: &FeatureField) -> StereoCorrResult<ScoreField> {
    let _span = kernel_span!(
        "correlate",
        width = a.width(),
        height = a.height(),
        vector_len = a.vector_len(),
        parallel = false
    )
    .entered();

    check_shapes(a, b)?;
    let mut scores = Field::zeros(a.width(), a.height(), 1)?;
    let width = a.width();
    let cell_len = a.vector_len();
    let row_len = a.as_field().row_len();
    let mut zero_denominators = 0usize;
    for ((out, row_a), row_b) in scores
        .data_mut()
        .chunks_exact_mut(width)
        .zip(a.as_field().data().chunks_exact(row_len))
        .zip(b.as_field().data().chunks_exact(row_len))
    {
        zero_denominators += score_row::<K>(row_a, row_b, cell_len, out);
    }

    kernel_event!("correlation_scored", zero_denominators = zero_denominators);
    Ok(scores)
}
