//! Low-level building blocks for custom stereo pipelines.
//!
//! These expose the per-pixel primitives and kernel plumbing behind the
//! top-level functions. Most users should prefer [`crate::project`],
//! [`crate::unproject_corners`], [`crate::preprocess_patches`] and
//! [`crate::correlate`].

pub use crate::kernel::scalar::NccScalar;
#[cfg(feature = "simd")]
pub use crate::kernel::simd::NccSimd;
pub use crate::kernel::{DefaultKernel, Kernel, Moments};
pub use crate::ncc::correlate_with;
pub use crate::patch::{normalize_window, WindowStatus, NORM_EPS};
pub use crate::util::math::{
    det3, extend_to_homogeneous, invert3, invert4, Mat3, Mat34, Mat4, SINGULAR_DET_EPS,
};

#[cfg(feature = "rayon")]
pub use crate::kernel::rayon::{correlate_par, preprocess_patches_par, project_par};
