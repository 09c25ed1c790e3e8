//! Python bindings for the stereocorr kernels.
//!
//! Array shapes follow the usual numpy conventions: `K` is `(3, 3)`, `Rt` is
//! `(3, 4)`, point fields are `(H, W, 3)`, images are `(H, W, C)` and feature
//! fields are `(H, W, C * ncc_size**2)`.

use numpy::ndarray::{Array2, Array3};
use numpy::{
    IntoPyArray, PyArray2, PyArray3, PyReadonlyArray2, PyReadonlyArray3, PyUntypedArrayMethods,
};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use stereocorr::lowlevel::{correlate_par, preprocess_patches_par, DefaultKernel};
use stereocorr::{
    correlate, preprocess_patches, unproject_corners as rust_unproject_corners, Extrinsics,
    FeatureField, Field, ImageView, Intrinsics, PinholeCamera, StereoCorrError,
};

/// Convert a StereoCorrError to a Python exception.
fn to_py_err(err: StereoCorrError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn shape_err(err: numpy::ndarray::ShapeError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn intrinsics_from(k: &PyReadonlyArray2<'_, f64>) -> PyResult<Intrinsics> {
    let k = k.as_array();
    if k.shape() != [3, 3] {
        return Err(PyValueError::new_err("K must have shape (3, 3)"));
    }
    let mut m = [[0.0; 3]; 3];
    for (i, row) in m.iter_mut().enumerate() {
        for (j, value) in row.iter_mut().enumerate() {
            *value = k[[i, j]];
        }
    }
    Intrinsics::new(m).map_err(to_py_err)
}

fn extrinsics_from(rt: &PyReadonlyArray2<'_, f64>) -> PyResult<Extrinsics> {
    let rt = rt.as_array();
    if rt.shape() != [3, 4] {
        return Err(PyValueError::new_err("Rt must have shape (3, 4)"));
    }
    let mut m = [[0.0; 4]; 3];
    for (i, row) in m.iter_mut().enumerate() {
        for (j, value) in row.iter_mut().enumerate() {
            *value = rt[[i, j]];
        }
    }
    Extrinsics::new(m).map_err(to_py_err)
}

fn features_from(
    array: &PyReadonlyArray3<'_, f32>,
    channels: Option<usize>,
) -> PyResult<FeatureField> {
    let shape = array.shape();
    let (height, width, len) = (shape[0], shape[1], shape[2]);
    let data = array.as_slice()?.to_vec();
    FeatureField::from_vectors(data, width, height, len, channels).map_err(to_py_err)
}

/// Project 3D points into a calibrated camera.
///
/// Args:
///     K: (3, 3) intrinsics
///     Rt: (3, 4) extrinsics
///     points: (H, W, 3) world points
///
/// Returns:
///     (H, W, 2) pixel coordinates
#[pyfunction]
#[allow(non_snake_case)]
fn project<'py>(
    py: Python<'py>,
    K: PyReadonlyArray2<'py, f64>,
    Rt: PyReadonlyArray2<'py, f64>,
    points: PyReadonlyArray3<'py, f64>,
) -> PyResult<Bound<'py, PyArray3<f64>>> {
    let camera = PinholeCamera::new(intrinsics_from(&K)?, extrinsics_from(&Rt)?);
    let shape = points.shape();
    let (height, width) = (shape[0], shape[1]);
    let field = Field::new(points.as_slice()?.to_vec(), width, height, shape[2])
        .map_err(to_py_err)?;
    let projected = camera.project(&field).map_err(to_py_err)?;
    let out = Array3::from_shape_vec((height, width, 2), projected.into_data())
        .map_err(shape_err)?;
    Ok(out.into_pyarray(py))
}

/// Unproject the corners of a height-by-width image to world coordinates at
/// depth d.
///
/// Returns:
///     (2, 2, 3) corner positions
#[pyfunction]
#[allow(non_snake_case)]
fn unproject_corners<'py>(
    py: Python<'py>,
    K: PyReadonlyArray2<'py, f64>,
    width: usize,
    height: usize,
    depth: f64,
    Rt: PyReadonlyArray2<'py, f64>,
) -> PyResult<Bound<'py, PyArray3<f64>>> {
    let k = intrinsics_from(&K)?;
    let rt = extrinsics_from(&Rt)?;
    let corners = rust_unproject_corners(&k, width, height, depth, &rt).map_err(to_py_err)?;
    let data = corners.to_point_field().into_data();
    let out = Array3::from_shape_vec((2, 2, 3), data).map_err(shape_err)?;
    Ok(out.into_pyarray(py))
}

/// Prepare normalized patch vectors for normalized cross-correlation.
///
/// Args:
///     image: (H, W, C) float32 image
///     ncc_size: odd patch side length
///     parallel: use the row-parallel kernel (default: False)
///
/// Returns:
///     (H, W, C * ncc_size**2) float32 array
#[pyfunction]
#[pyo3(signature = (image, ncc_size, parallel = false))]
fn preprocess_ncc<'py>(
    py: Python<'py>,
    image: PyReadonlyArray3<'py, f32>,
    ncc_size: usize,
    parallel: bool,
) -> PyResult<Bound<'py, PyArray3<f32>>> {
    let shape = image.shape();
    let (height, width, channels) = (shape[0], shape[1], shape[2]);
    let view = ImageView::from_slice(image.as_slice()?, width, height, channels)
        .map_err(to_py_err)?;
    let features = if parallel {
        preprocess_patches_par(view, ncc_size)
    } else {
        preprocess_patches(view, ncc_size)
    }
    .map_err(to_py_err)?;
    let len = features.vector_len();
    let out = Array3::from_shape_vec((height, width, len), features.into_field().into_data())
        .map_err(shape_err)?;
    Ok(out.into_pyarray(py))
}

/// Compute normalized cross-correlation between two preprocessed images.
///
/// Args:
///     image1: (H, W, C * ncc_size**2) output of preprocess_ncc
///     image2: same shape as image1
///     channels: image channels folded into each vector; when given, the
///         vector length must be channels * ncc_size**2 (default: None,
///         any length is accepted)
///     parallel: use the row-parallel kernel (default: False)
///
/// Returns:
///     (H, W) float32 scores
#[pyfunction]
#[pyo3(signature = (image1, image2, channels = None, parallel = false))]
fn compute_ncc<'py>(
    py: Python<'py>,
    image1: PyReadonlyArray3<'py, f32>,
    image2: PyReadonlyArray3<'py, f32>,
    channels: Option<usize>,
    parallel: bool,
) -> PyResult<Bound<'py, PyArray2<f32>>> {
    let a = features_from(&image1, channels)?;
    let b = features_from(&image2, channels)?;
    let (height, width) = (a.height(), a.width());
    let scores = if parallel {
        correlate_par::<DefaultKernel>(&a, &b)
    } else {
        correlate(&a, &b)
    }
    .map_err(to_py_err)?;
    let out = Array2::from_shape_vec((height, width), scores.into_data()).map_err(shape_err)?;
    Ok(out.into_pyarray(py))
}

/// Python module for the stereocorr kernels.
#[pymodule]
fn _stereocorr(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(project, m)?)?;
    m.add_function(wrap_pyfunction!(unproject_corners, m)?)?;
    m.add_function(wrap_pyfunction!(preprocess_ncc, m)?)?;
    m.add_function(wrap_pyfunction!(compute_ncc, m)?)?;

    // Add version
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
