use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;

use crate::activation::Activations;
use crate::error::{LaminaError, Result};
use crate::f::vector;

/// A fully-connected layer.
///
/// `w` has one row per unit and `d_in + 1` columns. Column 0 holds the unit's
/// bias, columns `1..=d_in` its input weights.
#[derive(Debug, Clone)]
pub struct Dense {
    w: Array2<f64>,
    activation: Activations,
}

fn check_units(d_out: usize) -> Result<()> {
    if d_out == 0 {
        return Err(LaminaError::shape("layer units", 1, 0));
    }
    Ok(())
}

impl Dense {
    pub fn new(d_in: usize, d_out: usize, activation: Activations) -> Result<Dense> {
        check_units(d_out)?;
        Ok(Dense {
            w: Array2::random((d_out, d_in + 1), Uniform::new(0., 1.)),
            activation,
        })
    }

    pub fn new_using<R: Rng + ?Sized>(
        d_in: usize,
        d_out: usize,
        activation: Activations,
        rng: &mut R,
    ) -> Result<Dense> {
        check_units(d_out)?;
        Ok(Dense {
            w: Array2::random_using((d_out, d_in + 1), Uniform::new(0., 1.), rng),
            activation,
        })
    }

    /// Builds a layer from an explicit `[d_out][d_in + 1]` matrix, bias first.
    pub fn with_weights(w: Array2<f64>, activation: Activations) -> Result<Dense> {
        check_units(w.nrows())?;
        if w.ncols() == 0 {
            return Err(LaminaError::shape("layer weight row (bias column)", 1, 0));
        }
        Ok(Dense { w, activation })
    }

    pub fn d_in(&self) -> usize {
        self.w.ncols() - 1
    }

    pub fn d_out(&self) -> usize {
        self.w.nrows()
    }

    pub fn activation(&self) -> Activations {
        self.activation
    }

    pub fn weights(&self) -> ArrayView2<'_, f64> {
        self.w.view()
    }

    pub fn biases(&self) -> ArrayView1<'_, f64> {
        self.w.column(0)
    }

    /// Input weights only, bias column dropped. Column `j` belongs to input `j`.
    pub fn input_weights(&self) -> ArrayView2<'_, f64> {
        self.w.slice(s![.., 1..])
    }

    pub fn feed_forward(&self, inputs: ArrayView1<f64>) -> Result<Array1<f64>> {
        if inputs.len() != self.d_in() {
            return Err(LaminaError::shape("layer input", self.d_in(), inputs.len()));
        }

        let activ = self.activation.wake();
        let z = vector::add(
            vector::mat_vec(self.input_weights(), inputs)?.view(),
            self.biases(),
        )?;
        Ok(z.mapv_into(|v| activ.a(v)))
    }

    /// Error signal this layer hands to the layer feeding it.
    ///
    /// Entry `j` is `Σ_k deltas[k] · w[k][j + 1]`: every unit's delta spread
    /// back over the input it received, bias column excluded.
    pub fn backward_signal(&self, deltas: ArrayView1<f64>) -> Result<Array1<f64>> {
        if deltas.len() != self.d_out() {
            return Err(LaminaError::shape("layer deltas", self.d_out(), deltas.len()));
        }
        vector::vec_mat(deltas, self.input_weights())
    }

    /// `bias_i += lr·δ_i` and `w_i[j] += lr·δ_i·inputs[j]`.
    ///
    /// Shapes are checked before anything is written, so a failed call leaves
    /// the weights untouched.
    pub fn apply_update(
        &mut self,
        inputs: ArrayView1<f64>,
        deltas: ArrayView1<f64>,
        learning_rate: f64,
    ) -> Result<()> {
        if inputs.len() != self.d_in() {
            return Err(LaminaError::shape("update inputs", self.d_in(), inputs.len()));
        }
        if deltas.len() != self.d_out() {
            return Err(LaminaError::shape("update deltas", self.d_out(), deltas.len()));
        }

        for (mut row, delta) in self.w.axis_iter_mut(Axis(0)).zip(deltas.iter()) {
            let factor = learning_rate * delta;
            row[0] += factor;
            row.slice_mut(s![1..]).scaled_add(factor, &inputs);
        }

        Ok(())
    }
}
