use ndarray::ArrayView1;

use super::shape::argmax;

/// Fraction of predictions whose arg-max index matches the target's.
pub fn argmax_accuracy<P, T>(predictions: &[P], targets: &[T]) -> f64
where
    P: AsRef<[f64]>,
    T: AsRef<[f64]>,
{
    if predictions.is_empty() {
        return 0.;
    }

    let correct = predictions
        .iter()
        .zip(targets.iter())
        .filter(|(p, t)| argmax(p.as_ref()) == argmax(t.as_ref()))
        .count();

    correct as f64 / predictions.len() as f64
}

/// Mean of the squared differences. Both views must have the same length.
pub fn squared_error(pred: ArrayView1<f64>, target: ArrayView1<f64>) -> f64 {
    let len = pred.len();
    if len == 0 {
        return 0.;
    }
    let sum = pred
        .iter()
        .zip(target.iter())
        .fold(0., |a, (p, t)| a + (p - t).powi(2));
    sum / len as f64
}
