//! stereocorr provides the geometric and photometric kernels used by
//! multi-view stereo pipelines.
//!
//! Three pieces make up the crate: pinhole projection and corner
//! unprojection ([`geometry`]), patch-feature normalization ([`patch`]) and
//! normalized cross-correlation between feature fields ([`ncc`]). All kernels
//! are pure per-pixel maps; the `rayon` feature adds row-parallel drivers and
//! the `simd` feature vectorizes the correlation inner loop.

pub mod field;
pub mod geometry;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod ncc;
pub mod patch;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use crate::image::io;

pub use crate::field::{
    CornerField, FeatureField, FeatureShape, Field, PointField, ProjectionField, ScoreField,
};
pub use crate::geometry::{project, unproject_corners, Extrinsics, Intrinsics, PinholeCamera};
pub use crate::image::{ImageView, OwnedImage};
pub use crate::ncc::{correlate, Ncc, NccConfig};
pub use crate::patch::preprocess_patches;
pub use crate::util::{StereoCorrError, StereoCorrResult};
