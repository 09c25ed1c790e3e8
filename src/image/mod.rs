//! Image views over interleaved pixel buffers.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! Pixels are interleaved (channel axis innermost) and the stride counts
//! elements between the starts of consecutive rows, so a stride larger than
//! `width * channels` represents padded rows.

use crate::util::{StereoCorrError, StereoCorrResult};

#[cfg(feature = "image-io")]
pub mod io;

/// Borrowed interleaved image view with an explicit stride.
#[derive(Copy, Clone)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    channels: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width * channels`.
    pub fn from_slice(
        data: &'a [T],
        width: usize,
        height: usize,
        channels: usize,
    ) -> StereoCorrResult<Self> {
        let stride = width
            .checked_mul(channels)
            .ok_or(StereoCorrError::InvalidDimensions { width, height })?;
        Self::new(data, width, height, channels, stride)
    }

    /// Creates a view with an explicit stride in elements.
    pub fn new(
        data: &'a [T],
        width: usize,
        height: usize,
        channels: usize,
        stride: usize,
    ) -> StereoCorrResult<Self> {
        let needed = required_len(width, height, channels, stride)?;
        if data.len() < needed {
            return Err(StereoCorrError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of interleaved channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the channel values of pixel `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a [T]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = y
            .checked_mul(self.stride)?
            .checked_add(x.checked_mul(self.channels)?)?;
        self.data.get(start..start + self.channels)
    }

    /// Returns a contiguous slice for row `y` with length `width * channels`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width * self.channels)?;
        self.data.get(start..end)
    }
}

fn required_len(
    width: usize,
    height: usize,
    channels: usize,
    stride: usize,
) -> StereoCorrResult<usize> {
    if width == 0 || height == 0 {
        return Err(StereoCorrError::InvalidDimensions { width, height });
    }
    if channels == 0 {
        return Err(StereoCorrError::InvalidChannels { channels });
    }
    let row_len = width
        .checked_mul(channels)
        .ok_or(StereoCorrError::InvalidDimensions { width, height })?;
    if stride < row_len {
        return Err(StereoCorrError::InvalidStride { row_len, stride });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(row_len))
        .ok_or(StereoCorrError::InvalidDimensions { width, height })
}

/// Owned contiguous interleaved image.
#[derive(Clone, Debug)]
pub struct OwnedImage<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
    channels: usize,
}

impl<T> OwnedImage<T> {
    /// Wraps a contiguous buffer of exactly `width * height * channels` values.
    pub fn new(data: Vec<T>, width: usize, height: usize, channels: usize) -> StereoCorrResult<Self> {
        let expected = required_len(width, height, channels, width * channels)?;
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
            channels,
        })
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, T> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            channels: self.channels,
            stride: self.width * self.channels,
        }
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of interleaved channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the contiguous pixel buffer.
    pub fn data(&self) -> &[T] {
        &self.data
    }
}
