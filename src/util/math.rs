//! Fixed-size linear algebra for calibration matrices.
//!
//! Matrices are row-major nested arrays. Inverses use closed-form cofactor
//! expansion, which is exact enough at 3x3 and 4x4 and avoids pulling in a
//! general solver.

/// 3x3 row-major matrix (intrinsics).
pub type Mat3 = [[f64; 3]; 3];
/// 3x4 row-major matrix (extrinsics without the projective row).
pub type Mat34 = [[f64; 4]; 3];
/// 4x4 row-major matrix (homogeneous rigid transform).
pub type Mat4 = [[f64; 4]; 4];

/// Determinants with a smaller magnitude are treated as singular.
pub const SINGULAR_DET_EPS: f64 = 1e-12;

/// 3x3 identity.
pub const IDENTITY3: Mat3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// 3x4 identity extrinsics (camera at the world origin).
pub const IDENTITY34: Mat34 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
];

fn is_singular(det: f64) -> bool {
    !det.is_finite() || det.abs() < SINGULAR_DET_EPS
}

/// Determinant of a 3x3 matrix.
pub fn det3(m: &Mat3) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Inverts a 3x3 matrix via its adjugate.
///
/// Returns `Err(det)` when the matrix is singular.
pub fn invert3(m: &Mat3) -> Result<Mat3, f64> {
    let det = det3(m);
    if is_singular(det) {
        return Err(det);
    }
    let inv_det = 1.0 / det;
    Ok([
        [
            (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv_det,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det,
        ],
        [
            (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv_det,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det,
        ],
        [
            (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv_det,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det,
        ],
    ])
}

/// Inverts a 4x4 matrix by Laplace expansion over 2x2 minors.
///
/// Returns `Err(det)` when the matrix is singular.
pub fn invert4(m: &Mat4) -> Result<Mat4, f64> {
    // Minors of the top two rows.
    let s0 = m[0][0] * m[1][1] - m[1][0] * m[0][1];
    let s1 = m[0][0] * m[1][2] - m[1][0] * m[0][2];
    let s2 = m[0][0] * m[1][3] - m[1][0] * m[0][3];
    let s3 = m[0][1] * m[1][2] - m[1][1] * m[0][2];
    let s4 = m[0][1] * m[1][3] - m[1][1] * m[0][3];
    let s5 = m[0][2] * m[1][3] - m[1][2] * m[0][3];

    // Minors of the bottom two rows.
    let c5 = m[2][2] * m[3][3] - m[3][2] * m[2][3];
    let c4 = m[2][1] * m[3][3] - m[3][1] * m[2][3];
    let c3 = m[2][1] * m[3][2] - m[3][1] * m[2][2];
    let c2 = m[2][0] * m[3][3] - m[3][0] * m[2][3];
    let c1 = m[2][0] * m[3][2] - m[3][0] * m[2][2];
    let c0 = m[2][0] * m[3][1] - m[3][0] * m[2][1];

    let det = s0 * c5 - s1 * c4 + s2 * c3 + s3 * c2 - s4 * c1 + s5 * c0;
    if is_singular(det) {
        return Err(det);
    }
    let d = 1.0 / det;

    Ok([
        [
            (m[1][1] * c5 - m[1][2] * c4 + m[1][3] * c3) * d,
            (-m[0][1] * c5 + m[0][2] * c4 - m[0][3] * c3) * d,
            (m[3][1] * s5 - m[3][2] * s4 + m[3][3] * s3) * d,
            (-m[2][1] * s5 + m[2][2] * s4 - m[2][3] * s3) * d,
        ],
        [
            (-m[1][0] * c5 + m[1][2] * c2 - m[1][3] * c1) * d,
            (m[0][0] * c5 - m[0][2] * c2 + m[0][3] * c1) * d,
            (-m[3][0] * s5 + m[3][2] * s2 - m[3][3] * s1) * d,
            (m[2][0] * s5 - m[2][2] * s2 + m[2][3] * s1) * d,
        ],
        [
            (m[1][0] * c4 - m[1][1] * c2 + m[1][3] * c0) * d,
            (-m[0][0] * c4 + m[0][1] * c2 - m[0][3] * c0) * d,
            (m[3][0] * s4 - m[3][1] * s2 + m[3][3] * s0) * d,
            (-m[2][0] * s4 + m[2][1] * s2 - m[2][3] * s0) * d,
        ],
        [
            (-m[1][0] * c3 + m[1][1] * c1 - m[1][2] * c0) * d,
            (m[0][0] * c3 - m[0][1] * c1 + m[0][2] * c0) * d,
            (-m[3][0] * s3 + m[3][1] * s1 - m[3][2] * s0) * d,
            (m[2][0] * s3 - m[2][1] * s1 + m[2][2] * s0) * d,
        ],
    ])
}

/// Appends the `[0, 0, 0, 1]` row to a 3x4 transform.
pub fn extend_to_homogeneous(rt: &Mat34) -> Mat4 {
    [rt[0], rt[1], rt[2], [0.0, 0.0, 0.0, 1.0]]
}

/// Computes `m * v` for a 3x3 matrix.
#[inline]
pub fn mul3(m: &Mat3, v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// Computes `m * v` for a 3x4 matrix and a homogeneous 4-vector.
#[inline]
pub fn mul34(m: &Mat34, v: [f64; 4]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for (o, row) in out.iter_mut().zip(m.iter()) {
        *o = row[0] * v[0] + row[1] * v[1] + row[2] * v[2] + row[3] * v[3];
    }
    out
}

/// Computes `m * v` for a 4x4 matrix.
#[inline]
pub fn mul4(m: &Mat4, v: [f64; 4]) -> [f64; 4] {
    let mut out = [0.0; 4];
    for (o, row) in out.iter_mut().zip(m.iter()) {
        *o = row[0] * v[0] + row[1] * v[1] + row[2] * v[2] + row[3] * v[3];
    }
    out
}

/// Multiplies every entry of a 3x3 matrix by `s`.
pub fn scale3(m: &Mat3, s: f64) -> Mat3 {
    let mut out = *m;
    for row in out.iter_mut() {
        for value in row.iter_mut() {
            *value *= s;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{
        det3, extend_to_homogeneous, invert3, invert4, mul3, mul34, mul4, Mat3, Mat4, IDENTITY34,
    };

    fn matmul3(a: &Mat3, b: &Mat3) -> Mat3 {
        let mut out = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                out[i][j] = (0..3).map(|k| a[i][k] * b[k][j]).sum();
            }
        }
        out
    }

    fn matmul4(a: &Mat4, b: &Mat4) -> Mat4 {
        let mut out = [[0.0; 4]; 4];
        for i in 0..4 {
            for j in 0..4 {
                out[i][j] = (0..4).map(|k| a[i][k] * b[k][j]).sum();
            }
        }
        out
    }

    #[test]
    fn invert3_recovers_identity() {
        let k = [[520.0, 0.5, 320.0], [0.0, 515.0, 240.0], [0.0, 0.0, 1.0]];
        let inv = invert3(&k).unwrap();
        let prod = matmul3(&k, &inv);
        for (i, row) in prod.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((value - expected).abs() < 1e-9, "({i},{j}) = {value}");
            }
        }
    }

    #[test]
    fn invert3_rejects_singular() {
        let m = [[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 0.0, 1.0]];
        assert_eq!(det3(&m), 0.0);
        assert!(invert3(&m).is_err());
    }

    #[test]
    fn invert4_recovers_identity() {
        let m = [
            [0.0, -1.0, 0.0, 2.5],
            [1.0, 0.0, 0.0, -1.0],
            [0.0, 0.0, 1.0, 4.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let inv = invert4(&m).unwrap();
        let prod = matmul4(&m, &inv);
        for (i, row) in prod.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((value - expected).abs() < 1e-12, "({i},{j}) = {value}");
            }
        }
    }

    #[test]
    fn invert4_rejects_singular() {
        let mut m = extend_to_homogeneous(&IDENTITY34);
        m[2] = [0.0, 0.0, 0.0, 3.0];
        assert!(invert4(&m).is_err());
    }

    #[test]
    fn products_match_hand_computed() {
        let m = [[1.0, 2.0, 3.0], [0.0, 1.0, 0.0], [0.0, 0.0, 2.0]];
        assert_eq!(mul3(&m, [1.0, 1.0, 1.0]), [6.0, 1.0, 2.0]);

        let rt = [[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 2.0], [0.0, 0.0, 1.0, 3.0]];
        assert_eq!(mul34(&rt, [1.0, 1.0, 1.0, 1.0]), [2.0, 3.0, 4.0]);

        let h = extend_to_homogeneous(&rt);
        assert_eq!(mul4(&h, [0.0, 0.0, 0.0, 1.0]), [1.0, 2.0, 3.0, 1.0]);
    }
}
