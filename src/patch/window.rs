//! Per-pixel window extraction and normalization.

use crate::image::ImageView;
use crate::util::{StereoCorrError, StereoCorrResult};

/// Windows whose mean-subtracted norm falls below this are treated as flat.
pub const NORM_EPS: f64 = 1e-6;

/// Outcome of normalizing a single window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowStatus {
    /// The window was written as a unit vector.
    Normalized,
    /// The window fits but has no texture; the vector is zero.
    Degenerate,
    /// The window leaves the image; the vector is zero.
    OutOfBounds,
}

/// Extracts and normalizes the window centred on `(cx, cy)` into `out`.
///
/// `out` must hold `channels * window_size^2` values. They are written
/// channel-major, then by window row, then by window column; each channel
/// block has its own mean removed and the whole vector is scaled to unit
/// length.
pub fn normalize_window<T: Copy + Into<f32>>(
    image: ImageView<'_, T>,
    cx: usize,
    cy: usize,
    window_size: usize,
    out: &mut [f32],
) -> StereoCorrResult<WindowStatus> {
    if window_size == 0 || window_size % 2 == 0 {
        return Err(StereoCorrError::InvalidWindowSize { window_size });
    }
    let expected = image.channels() * window_size * window_size;
    if out.len() != expected {
        return Err(StereoCorrError::InvalidCellLength {
            expected,
            got: out.len(),
        });
    }
    Ok(normalize_window_unchecked(image, cx, cy, window_size, out))
}

/// Same as [`normalize_window`] with the layout checks already done.
pub(crate) fn normalize_window_unchecked<T: Copy + Into<f32>>(
    image: ImageView<'_, T>,
    cx: usize,
    cy: usize,
    window_size: usize,
    out: &mut [f32],
) -> WindowStatus {
    let k = window_size / 2;
    if cx < k || cy < k || cx + k >= image.width() || cy + k >= image.height() {
        out.fill(0.0);
        return WindowStatus::OutOfBounds;
    }

    let channels = image.channels();
    let area = window_size * window_size;
    let x0 = (cx - k) * channels;
    let x1 = (cx + k + 1) * channels;

    for wy in 0..window_size {
        let Some(row) = image.row(cy - k + wy) else {
            out.fill(0.0);
            return WindowStatus::OutOfBounds;
        };
        for (wx, pixel) in row[x0..x1].chunks_exact(channels).enumerate() {
            for (c, &value) in pixel.iter().enumerate() {
                out[c * area + wy * window_size + wx] = value.into();
            }
        }
    }

    let mut norm_sq = 0.0f64;
    for block in out.chunks_exact_mut(area) {
        let mean = block.iter().map(|&v| f64::from(v)).sum::<f64>() / area as f64;
        for value in block.iter_mut() {
            let centered = f64::from(*value) - mean;
            norm_sq += centered * centered;
            *value = centered as f32;
        }
    }

    let norm = norm_sq.sqrt();
    if norm < NORM_EPS {
        out.fill(0.0);
        return WindowStatus::Degenerate;
    }
    let inv_norm = 1.0 / norm;
    for value in out.iter_mut() {
        *value = (f64::from(*value) * inv_norm) as f32;
    }
    WindowStatus::Normalized
}
