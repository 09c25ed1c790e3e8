//! Dense per-pixel fields produced and consumed by the kernels.
//!
//! A `Field<T>` is a `height x width` grid where every cell holds the same
//! number of values (`cell_len`). Cells are stored row-major with the cell
//! values innermost, matching the `(height, width, cell_len)` array layout
//! used by the surrounding pipeline.

use std::fmt;

use crate::util::{StereoCorrError, StereoCorrResult};

/// Owned `height x width x cell_len` grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Field<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
    cell_len: usize,
}

/// Grid of 3D world points, one `[x, y, z]` per pixel.
pub type PointField = Field<f64>;

/// Grid of 2D pixel coordinates, one `[u, v]` per pixel.
pub type ProjectionField = Field<f64>;

/// Grid of scalar correlation scores.
pub type ScoreField = Field<f32>;

fn checked_len(width: usize, height: usize, cell_len: usize) -> StereoCorrResult<usize> {
    if width == 0 || height == 0 {
        return Err(StereoCorrError::InvalidDimensions { width, height });
    }
    if cell_len == 0 {
        return Err(StereoCorrError::InvalidCellLength {
            expected: 1,
            got: 0,
        });
    }
    width
        .checked_mul(height)
        .and_then(|v| v.checked_mul(cell_len))
        .ok_or(StereoCorrError::InvalidDimensions { width, height })
}

impl<T> Field<T> {
    /// Wraps a row-major buffer whose length is exactly
    /// `width * height * cell_len`.
    pub fn new(data: Vec<T>, width: usize, height: usize, cell_len: usize) -> StereoCorrResult<Self> {
        let expected = checked_len(width, height, cell_len)?;
        if data.len() != expected {
            return Err(StereoCorrError::BufferSizeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            cell_len,
        })
    }

    /// Returns the field width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the field height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of values stored per cell.
    pub fn cell_len(&self) -> usize {
        self.cell_len
    }

    /// Returns the number of values in one row of cells.
    pub fn row_len(&self) -> usize {
        self.width * self.cell_len
    }

    /// Returns the backing buffer.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Consumes the field and returns the backing buffer.
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Returns the values of cell `(x, y)` if it is within bounds.
    pub fn cell(&self, x: usize, y: usize) -> Option<&[T]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y * self.width + x) * self.cell_len;
        self.data.get(start..start + self.cell_len)
    }

    /// Returns all cells of row `y` as one contiguous slice.
    pub fn row(&self, y: usize) -> Option<&[T]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.row_len();
        self.data.get(start..start + self.row_len())
    }

    pub(crate) fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T: Copy + Default> Field<T> {
    /// Allocates a field with every value set to `T::default()`.
    pub fn zeros(width: usize, height: usize, cell_len: usize) -> StereoCorrResult<Self> {
        let len = checked_len(width, height, cell_len)?;
        Ok(Self {
            data: vec![T::default(); len],
            width,
            height,
            cell_len,
        })
    }
}

impl Field<f32> {
    /// Returns the scalar at `(x, y)` of a single-value field.
    pub fn value(&self, x: usize, y: usize) -> Option<f32> {
        self.cell(x, y).and_then(|cell| cell.first().copied())
    }
}

/// Layout of a patch-feature field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureShape {
    /// Field width in pixels.
    pub width: usize,
    /// Field height in pixels.
    pub height: usize,
    /// Image channels folded into each vector.
    pub channels: usize,
    /// Side length of the square patch window.
    pub window_size: usize,
}

impl FeatureShape {
    /// Length of one feature vector: `channels * window_size^2`.
    pub fn vector_len(&self) -> usize {
        self.channels * self.window_size * self.window_size
    }
}

impl fmt::Display for FeatureShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} ({} channels, window {})",
            self.width, self.height, self.channels, self.window_size
        )
    }
}

/// Per-pixel patch feature vectors.
///
/// Each cell holds `channels * window_size^2` values flattened channel-major,
/// then by window row, then by window column. A zero vector marks a pixel
/// whose window leaves the image or has no texture.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureField {
    field: Field<f32>,
    channels: usize,
    window_size: usize,
}

impl FeatureField {
    /// Wraps externally produced feature vectors.
    ///
    /// The vectors need not be unit length; correlation normalizes them.
    pub fn new(
        data: Vec<f32>,
        width: usize,
        height: usize,
        channels: usize,
        window_size: usize,
    ) -> StereoCorrResult<Self> {
        validate_layout(channels, window_size)?;
        let cell_len = channels * window_size * window_size;
        let field = Field::new(data, width, height, cell_len)?;
        Ok(Self {
            field,
            channels,
            window_size,
        })
    }

    /// Wraps flat vectors of `vector_len` values whose layout may be unknown.
    ///
    /// With `channels` given, `vector_len` must equal
    /// `channels * window_size^2` for some odd `window_size`. Without it each
    /// vector is treated as `vector_len` channels over a 1x1 window; scores
    /// do not depend on the layout.
    pub fn from_vectors(
        data: Vec<f32>,
        width: usize,
        height: usize,
        vector_len: usize,
        channels: Option<usize>,
    ) -> StereoCorrResult<Self> {
        let (channels, window_size) = match channels {
            None => (vector_len, 1),
            Some(0) => return Err(StereoCorrError::InvalidChannels { channels: 0 }),
            Some(channels) => {
                let side = ((vector_len / channels) as f64).sqrt().round() as usize;
                if side * side * channels != vector_len {
                    return Err(StereoCorrError::InvalidInput(
                        "vector length must be channels * window_size^2",
                    ));
                }
                (channels, side)
            }
        };
        Self::new(data, width, height, channels, window_size)
    }

    pub(crate) fn zeros(
        width: usize,
        height: usize,
        channels: usize,
        window_size: usize,
    ) -> StereoCorrResult<Self> {
        validate_layout(channels, window_size)?;
        let cell_len = channels
            .checked_mul(window_size * window_size)
            .ok_or(StereoCorrError::InvalidWindowSize { window_size })?;
        let field = Field::zeros(width, height, cell_len)?;
        Ok(Self {
            field,
            channels,
            window_size,
        })
    }

    /// Returns the field layout.
    pub fn shape(&self) -> FeatureShape {
        FeatureShape {
            width: self.field.width(),
            height: self.field.height(),
            channels: self.channels,
            window_size: self.window_size,
        }
    }

    /// Returns the field width in pixels.
    pub fn width(&self) -> usize {
        self.field.width()
    }

    /// Returns the field height in pixels.
    pub fn height(&self) -> usize {
        self.field.height()
    }

    /// Returns the number of image channels per vector.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the patch window side length.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Returns the length of each feature vector.
    pub fn vector_len(&self) -> usize {
        self.field.cell_len()
    }

    /// Returns the feature vector at `(x, y)` if it is within bounds.
    pub fn vector(&self, x: usize, y: usize) -> Option<&[f32]> {
        self.field.cell(x, y)
    }

    /// Returns the underlying grid.
    pub fn as_field(&self) -> &Field<f32> {
        &self.field
    }

    /// Consumes the feature field and returns the underlying grid.
    pub fn into_field(self) -> Field<f32> {
        self.field
    }

    pub(crate) fn field_mut(&mut self) -> &mut Field<f32> {
        &mut self.field
    }
}

fn validate_layout(channels: usize, window_size: usize) -> StereoCorrResult<()> {
    if channels == 0 {
        return Err(StereoCorrError::InvalidChannels { channels });
    }
    if window_size == 0 || window_size % 2 == 0 {
        return Err(StereoCorrError::InvalidWindowSize { window_size });
    }
    Ok(())
}

/// World positions of the four image corners at a fixed depth.
///
/// Indexed `[row][col]`: `[0][0]` is pixel `(0, 0)`, `[0][1]` is
/// `(width - 1, 0)`, `[1][0]` is `(0, height - 1)` and `[1][1]` is
/// `(width - 1, height - 1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CornerField {
    corners: [[[f64; 3]; 2]; 2],
}

impl CornerField {
    pub(crate) fn new(corners: [[[f64; 3]; 2]; 2]) -> Self {
        Self { corners }
    }

    /// Returns the corner at grid position `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Option<[f64; 3]> {
        self.corners.get(row)?.get(col).copied()
    }

    /// Returns the raw `2 x 2 x 3` array.
    pub fn as_array(&self) -> &[[[f64; 3]; 2]; 2] {
        &self.corners
    }

    /// Returns the pixel each corner was unprojected from, same indexing.
    pub fn pixels(width: usize, height: usize) -> [[[f64; 2]; 2]; 2] {
        let right = width.saturating_sub(1) as f64;
        let bottom = height.saturating_sub(1) as f64;
        [[[0.0, 0.0], [right, 0.0]], [[0.0, bottom], [right, bottom]]]
    }

    /// Packs the corners into a `2 x 2` point field.
    pub fn to_point_field(&self) -> PointField {
        let data = self
            .corners
            .iter()
            .flat_map(|row| row.iter().flat_map(|p| p.iter().copied()))
            .collect();
        Field {
            data,
            width: 2,
            height: 2,
            cell_len: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CornerField, FeatureField, Field};
    use crate::util::StereoCorrError;

    #[test]
    fn from_vectors_without_channels_accepts_any_length() {
        let features = FeatureField::from_vectors(vec![0.5f32; 2 * 9], 2, 1, 9, None).unwrap();
        assert_eq!((features.channels(), features.window_size()), (9, 1));
        assert_eq!(features.vector_len(), 9);
    }

    #[test]
    fn from_vectors_with_channels_recovers_window() {
        let features = FeatureField::from_vectors(vec![0.0f32; 27], 1, 1, 27, Some(3)).unwrap();
        assert_eq!((features.channels(), features.window_size()), (3, 3));

        let gray = FeatureField::from_vectors(vec![0.0f32; 9], 1, 1, 9, Some(1)).unwrap();
        assert_eq!(gray.window_size(), 3);
    }

    #[test]
    fn from_vectors_rejects_layouts_that_do_not_fit() {
        let err = FeatureField::from_vectors(vec![0.0f32; 9], 1, 1, 9, Some(3)).unwrap_err();
        assert!(matches!(err, StereoCorrError::InvalidInput(_)));

        let err = FeatureField::from_vectors(vec![0.0f32; 9], 1, 1, 9, Some(0)).unwrap_err();
        assert_eq!(err, StereoCorrError::InvalidChannels { channels: 0 });

        let err = FeatureField::from_vectors(vec![0.0f32; 12], 1, 1, 12, Some(3)).unwrap_err();
        assert_eq!(err, StereoCorrError::InvalidWindowSize { window_size: 2 });
    }

    #[test]
    fn field_cells_are_row_major() {
        let data: Vec<f64> = (0..12).map(f64::from).collect();
        let field = Field::new(data, 3, 2, 2).unwrap();
        assert_eq!(field.cell(0, 0).unwrap(), &[0.0, 1.0]);
        assert_eq!(field.cell(2, 0).unwrap(), &[4.0, 5.0]);
        assert_eq!(field.cell(1, 1).unwrap(), &[8.0, 9.0]);
        assert_eq!(field.row(1).unwrap().len(), 6);
        assert!(field.cell(3, 0).is_none());
        assert!(field.row(2).is_none());
    }

    #[test]
    fn field_rejects_wrong_length() {
        let err = Field::new(vec![0.0f32; 5], 2, 2, 1).err().unwrap();
        assert_eq!(
            err,
            StereoCorrError::BufferSizeMismatch {
                expected: 4,
                got: 5
            }
        );
    }

    #[test]
    fn feature_field_rejects_even_window() {
        let err = FeatureField::new(vec![0.0; 16], 1, 1, 4, 2).err().unwrap();
        assert_eq!(err, StereoCorrError::InvalidWindowSize { window_size: 2 });
    }

    #[test]
    fn corner_point_field_keeps_grid_order() {
        let corners = CornerField::new([
            [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0]],
            [[0.0, 1.0, 1.0], [1.0, 1.0, 1.0]],
        ]);
        let field = corners.to_point_field();
        assert_eq!(field.cell(1, 0).unwrap(), &[1.0, 0.0, 1.0]);
        assert_eq!(field.cell(0, 1).unwrap(), &[0.0, 1.0, 1.0]);
        assert_eq!(CornerField::pixels(5, 4)[1][1], [4.0, 3.0]);
    }
}
