//! Shape-checked elementwise and matrix helpers over `ndarray` views.
//!
//! Every helper returns a fresh array. Operands of the wrong shape produce
//! `LaminaError::ShapeMismatch` instead of panicking inside ndarray.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};

use crate::error::{LaminaError, Result};

fn same_len(what: &'static str, a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> Result<()> {
    if a.len() != b.len() {
        return Err(LaminaError::shape(what, a.len(), b.len()));
    }
    Ok(())
}

pub fn add(a: ArrayView1<f64>, b: ArrayView1<f64>) -> Result<Array1<f64>> {
    same_len("add operands", &a, &b)?;
    Ok(Zip::from(&a).and(&b).map_collect(|x, y| x + y))
}

pub fn sub(a: ArrayView1<f64>, b: ArrayView1<f64>) -> Result<Array1<f64>> {
    same_len("sub operands", &a, &b)?;
    Ok(Zip::from(&a).and(&b).map_collect(|x, y| x - y))
}

pub fn mul(a: ArrayView1<f64>, b: ArrayView1<f64>) -> Result<Array1<f64>> {
    same_len("mul operands", &a, &b)?;
    Ok(Zip::from(&a).and(&b).map_collect(|x, y| x * y))
}

pub fn dot(a: ArrayView1<f64>, b: ArrayView1<f64>) -> Result<f64> {
    same_len("dot operands", &a, &b)?;
    Ok(a.dot(&b))
}

pub fn scale(a: ArrayView1<f64>, s: f64) -> Array1<f64> {
    a.mapv(|x| x * s)
}

pub fn matmul(a: ArrayView2<f64>, b: ArrayView2<f64>) -> Result<Array2<f64>> {
    if a.ncols() != b.nrows() {
        return Err(LaminaError::shape("matmul inner dimension", a.ncols(), b.nrows()));
    }
    Ok(a.dot(&b))
}

/// `m · v`, one entry per row of `m`.
pub fn mat_vec(m: ArrayView2<f64>, v: ArrayView1<f64>) -> Result<Array1<f64>> {
    if m.ncols() != v.len() {
        return Err(LaminaError::shape("matrix-vector operand", m.ncols(), v.len()));
    }
    Ok(m.dot(&v))
}

/// `vᵀ · m`, one entry per column of `m`.
pub fn vec_mat(v: ArrayView1<f64>, m: ArrayView2<f64>) -> Result<Array1<f64>> {
    if v.len() != m.nrows() {
        return Err(LaminaError::shape("vector-matrix operand", m.nrows(), v.len()));
    }
    Ok(v.dot(&m))
}
