//! Pinhole projection and corner unprojection.
//!
//! `Intrinsics` and `Extrinsics` validate invertibility once at construction
//! and cache their inverses, so the per-pixel loops below never fail.
//!
//! Projection divides by the homogeneous `w` produced by `K * Rt * X`. Points
//! with `w == 0` (on the camera's principal plane) project to non-finite
//! coordinates; callers are expected to keep such points out of the field.

use crate::field::{CornerField, Field, PointField, ProjectionField};
use crate::trace::{kernel_event, kernel_span};
use crate::util::math::{
    extend_to_homogeneous, invert3, invert4, mul3, mul34, mul4, scale3, Mat3, Mat34, Mat4,
    IDENTITY34,
};
use crate::util::{StereoCorrError, StereoCorrResult};

/// Camera intrinsics `K` with its cached inverse.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intrinsics {
    k: Mat3,
    k_inv: Mat3,
}

impl Intrinsics {
    /// Wraps a 3x3 intrinsics matrix, rejecting singular ones.
    pub fn new(k: Mat3) -> StereoCorrResult<Self> {
        let k_inv = invert3(&k).map_err(|det| StereoCorrError::SingularMatrix {
            matrix: "intrinsics",
            det,
        })?;
        Ok(Self { k, k_inv })
    }

    /// Builds `K` from focal lengths, principal point and skew.
    pub fn from_params(fx: f64, fy: f64, cx: f64, cy: f64, skew: f64) -> StereoCorrResult<Self> {
        Self::new([[fx, skew, cx], [0.0, fy, cy], [0.0, 0.0, 1.0]])
    }

    /// Returns `K`.
    pub fn matrix(&self) -> &Mat3 {
        &self.k
    }

    /// Returns `K^-1`.
    pub fn inverse(&self) -> &Mat3 {
        &self.k_inv
    }
}

/// World-to-camera rigid transform `[R | t]` with the inverse of its 4x4
/// homogeneous extension.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extrinsics {
    rt: Mat34,
    inv: Mat4,
}

impl Extrinsics {
    /// Wraps a 3x4 extrinsics matrix, rejecting ones whose homogeneous
    /// extension is singular.
    pub fn new(rt: Mat34) -> StereoCorrResult<Self> {
        let inv = invert4(&extend_to_homogeneous(&rt)).map_err(|det| {
            StereoCorrError::SingularMatrix {
                matrix: "extrinsics",
                det,
            }
        })?;
        Ok(Self { rt, inv })
    }

    /// Camera at the world origin looking down +z.
    pub fn identity() -> Self {
        Self {
            rt: IDENTITY34,
            inv: extend_to_homogeneous(&IDENTITY34),
        }
    }

    /// Builds `[R | t]` from a rotation and a translation.
    pub fn from_rotation_translation(r: Mat3, t: [f64; 3]) -> StereoCorrResult<Self> {
        Self::new([
            [r[0][0], r[0][1], r[0][2], t[0]],
            [r[1][0], r[1][1], r[1][2], t[1]],
            [r[2][0], r[2][1], r[2][2], t[2]],
        ])
    }

    /// Returns `[R | t]`.
    pub fn matrix(&self) -> &Mat34 {
        &self.rt
    }

    /// Returns `[R | t]` with the `[0, 0, 0, 1]` row appended.
    pub fn homogeneous(&self) -> Mat4 {
        extend_to_homogeneous(&self.rt)
    }

    /// Returns the camera-to-world transform.
    pub fn inverse(&self) -> &Mat4 {
        &self.inv
    }
}

/// Calibrated pinhole camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinholeCamera {
    intrinsics: Intrinsics,
    extrinsics: Extrinsics,
}

impl PinholeCamera {
    /// Pairs intrinsics with a pose.
    pub fn new(intrinsics: Intrinsics, extrinsics: Extrinsics) -> Self {
        Self {
            intrinsics,
            extrinsics,
        }
    }

    /// Returns the intrinsics.
    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    /// Returns the extrinsics.
    pub fn extrinsics(&self) -> &Extrinsics {
        &self.extrinsics
    }

    /// Projects a world point to pixel coordinates `(u, v)`.
    ///
    /// The result is non-finite when the point lies on the camera's
    /// principal plane.
    #[inline]
    pub fn project_point(&self, point: [f64; 3]) -> [f64; 2] {
        let cam = mul34(self.extrinsics.matrix(), [point[0], point[1], point[2], 1.0]);
        let pix = mul3(self.intrinsics.matrix(), cam);
        [pix[0] / pix[2], pix[1] / pix[2]]
    }

    /// Lifts pixel `(u, v)` to the world point at camera depth `depth`.
    pub fn unproject_pixel(&self, pixel: [f64; 2], depth: f64) -> [f64; 3] {
        let k_inv = scale3(self.intrinsics.inverse(), depth);
        unproject_with(&k_inv, self.extrinsics.inverse(), pixel)
    }

    /// Projects every cell of a point field.
    pub fn project(&self, points: &PointField) -> StereoCorrResult<ProjectionField> {
        let _span = kernel_span!(
            "project",
            width = points.width(),
            height = points.height(),
            parallel = false
        )
        .entered();
        let mut out = projection_output(points)?;
        for (dst, src) in out
            .data_mut()
            .chunks_exact_mut(2)
            .zip(points.data().chunks_exact(3))
        {
            let uv = self.project_point([src[0], src[1], src[2]]);
            dst.copy_from_slice(&uv);
        }
        kernel_event!("points_projected", count = points.width() * points.height());
        Ok(out)
    }

    /// Unprojects the four corners of a `width x height` image at `depth`.
    pub fn unproject_corners(
        &self,
        width: usize,
        height: usize,
        depth: f64,
    ) -> StereoCorrResult<CornerField> {
        let _span = kernel_span!("unproject_corners", width = width, height = height).entered();
        if width == 0 || height == 0 {
            return Err(StereoCorrError::InvalidDimensions { width, height });
        }
        if !depth.is_finite() {
            return Err(StereoCorrError::InvalidInput("depth must be finite"));
        }

        let k_inv = scale3(self.intrinsics.inverse(), depth);
        let rt_inv = self.extrinsics.inverse();
        let pixels = CornerField::pixels(width, height);
        let mut corners = [[[0.0; 3]; 2]; 2];
        for (out_row, pix_row) in corners.iter_mut().zip(pixels.iter()) {
            for (out, &pix) in out_row.iter_mut().zip(pix_row.iter()) {
                *out = unproject_with(&k_inv, rt_inv, pix);
            }
        }
        Ok(CornerField::new(corners))
    }
}

fn unproject_with(k_inv_scaled: &Mat3, rt_inv: &Mat4, pixel: [f64; 2]) -> [f64; 3] {
    let cam = mul3(k_inv_scaled, [pixel[0], pixel[1], 1.0]);
    let world = mul4(rt_inv, [cam[0], cam[1], cam[2], 1.0]);
    [world[0] / world[3], world[1] / world[3], world[2] / world[3]]
}

pub(crate) fn projection_output(points: &PointField) -> StereoCorrResult<ProjectionField> {
    if points.cell_len() != 3 {
        return Err(StereoCorrError::InvalidCellLength {
            expected: 3,
            got: points.cell_len(),
        });
    }
    Field::zeros(points.width(), points.height(), 2)
}

/// Projects a field of world points into pixel coordinates.
///
/// See [`PinholeCamera::project`].
pub fn project(
    k: &Intrinsics,
    rt: &Extrinsics,
    points: &PointField,
) -> StereoCorrResult<ProjectionField> {
    PinholeCamera::new(*k, *rt).project(points)
}

/// Unprojects the corners of a `width x height` image to world points at
/// `depth`.
///
/// See [`PinholeCamera::unproject_corners`].
pub fn unproject_corners(
    k: &Intrinsics,
    width: usize,
    height: usize,
    depth: f64,
    rt: &Extrinsics,
) -> StereoCorrResult<CornerField> {
    PinholeCamera::new(*k, *rt).unproject_corners(width, height, depth)
}
