use log::trace;
use ndarray::{Array1, ArrayView1};
use rand::Rng;

use crate::activation::Activations;
use crate::data::TrainingExample;
use crate::error::{LaminaError, Result};
use crate::f::{argmax_accuracy, squared_error, vector};
use crate::layers::Dense;
use crate::optimizers::{GradientDescent, Optimizer};

/// A stack of dense layers trained by backpropagation.
///
/// Layers are stored output-first: index 0 is the output layer and the last
/// index is the layer that reads the raw input. Layers are appended in that
/// order, so the first `add_layer` call defines the network's output width.
///
/// `outputs` caches the most recent forward pass. It has one entry per layer
/// plus a final entry holding the raw input, so `outputs[l + 1]` is always
/// the input layer `l` saw. The next forward pass replaces it.
#[derive(Debug, Clone, Default)]
pub struct Network {
    layers: Vec<Dense>,
    outputs: Vec<Array1<f64>>,
}

impl Network {
    pub fn new() -> Network {
        Network {
            layers: vec![],
            outputs: vec![],
        }
    }

    /// Appends a randomly initialised layer on the input side of the stack.
    pub fn add_layer(
        &mut self,
        d_in: usize,
        d_out: usize,
        activation: Activations,
    ) -> Result<&mut Self> {
        self.push_layer(Dense::new(d_in, d_out, activation)?)
    }

    pub fn add_layer_using<R: Rng + ?Sized>(
        &mut self,
        d_in: usize,
        d_out: usize,
        activation: Activations,
        rng: &mut R,
    ) -> Result<&mut Self> {
        self.push_layer(Dense::new_using(d_in, d_out, activation, rng)?)
    }

    /// Appends a prepared layer on the input side of the stack. Its unit
    /// count must equal the input width of the layer it feeds.
    pub fn push_layer(&mut self, layer: Dense) -> Result<&mut Self> {
        if let Some(fed) = self.layers.last() {
            if layer.d_out() != fed.d_in() {
                return Err(LaminaError::shape("layer units", fed.d_in(), layer.d_out())
                    .at_layer(self.layers.len()));
            }
        }

        trace!(
            "layer {}: {} -> {} ({})",
            self.layers.len(),
            layer.d_in(),
            layer.d_out(),
            layer.activation()
        );

        self.layers.push(layer);
        self.outputs.clear();
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Dense> {
        self.layers.get(index)
    }

    pub fn output_layer(&self) -> Result<&Dense> {
        self.layers.first().ok_or(LaminaError::EmptyNetwork)
    }

    pub fn input_layer(&self) -> Result<&Dense> {
        self.layers.last().ok_or(LaminaError::EmptyNetwork)
    }

    pub fn input_width(&self) -> Result<usize> {
        Ok(self.input_layer()?.d_in())
    }

    pub fn output_width(&self) -> Result<usize> {
        Ok(self.output_layer()?.d_out())
    }

    /// The cached forward pass, output layer first, raw input last.
    pub fn outputs(&self) -> &[Array1<f64>] {
        &self.outputs
    }

    /// Output layer values from the cached forward pass.
    pub fn output(&self) -> Result<ArrayView1<'_, f64>> {
        self.outputs
            .first()
            .map(|o| o.view())
            .ok_or(LaminaError::NoForwardPass)
    }

    fn check_input(&self, inputs: &ArrayView1<f64>) -> Result<()> {
        let width = self.input_width()?;
        if inputs.len() != width {
            return Err(LaminaError::shape("network input", width, inputs.len())
                .at_layer(self.layers.len() - 1));
        }
        Ok(())
    }

    fn check_target(&self, targets: &ArrayView1<f64>) -> Result<()> {
        let width = self.output_width()?;
        if targets.len() != width {
            return Err(LaminaError::shape("target", width, targets.len()).at_layer(0));
        }
        Ok(())
    }

    pub fn check_examples(&self, examples: &[TrainingExample]) -> Result<()> {
        if self.is_empty() {
            return Err(LaminaError::EmptyNetwork);
        }
        for example in examples.iter() {
            self.check_input(&example.input())?;
            self.check_target(&example.target())?;
        }
        Ok(())
    }

    /// Runs the forward pass from the input-nearest layer to layer 0 and
    /// caches every intermediate output.
    pub fn feed_forward(&mut self, inputs: ArrayView1<f64>) -> Result<Array1<f64>> {
        self.check_input(&inputs)?;

        let depth = self.layers.len();
        let mut outputs: Vec<Array1<f64>> = vec![Array1::zeros(0); depth + 1];
        outputs[depth] = inputs.to_owned();

        for l in (0..depth).rev() {
            outputs[l] = self.layers[l]
                .feed_forward(outputs[l + 1].view())
                .map_err(|e| e.at_layer(l))?;
        }

        self.outputs = outputs;
        Ok(self.outputs[0].clone())
    }

    /// Forward pass without touching the cache.
    pub fn predict(&self, inputs: ArrayView1<f64>) -> Result<Array1<f64>> {
        self.check_input(&inputs)?;

        let mut x = inputs.to_owned();
        for (l, layer) in self.layers.iter().enumerate().rev() {
            x = layer.feed_forward(x.view()).map_err(|e| e.at_layer(l))?;
        }
        Ok(x)
    }

    /// The layer one step closer to the output than layer `l`, i.e. the layer
    /// that consumes layer `l`'s output. Only defined for `l >= 1`.
    fn consumer_of(&self, l: usize) -> &Dense {
        &self.layers[l - 1]
    }

    /// Per-unit deltas for every layer, output layer first, computed from the
    /// cached forward pass.
    fn deltas(&self, targets: ArrayView1<f64>) -> Result<Vec<Array1<f64>>> {
        let mut deltas: Vec<Array1<f64>> = Vec::with_capacity(self.layers.len());

        let activ = self.output_layer()?.activation().wake();
        let output = self.output()?;
        let error = vector::sub(targets, output).map_err(|e| e.at_layer(0))?;
        deltas.push(vector::mul(error.view(), output.mapv(|o| activ.d(o)).view())?);

        for l in 1..self.layers.len() {
            let signal = self
                .consumer_of(l)
                .backward_signal(deltas[l - 1].view())
                .map_err(|e| e.at_layer(l - 1))?;
            let activ = self.layers[l].activation().wake();
            let slope = self.outputs[l].mapv(|o| activ.d(o));
            deltas.push(vector::mul(signal.view(), slope.view()).map_err(|e| e.at_layer(l))?);
        }

        Ok(deltas)
    }

    /// Applies each layer's deltas against the input it saw in the cached
    /// forward pass.
    fn update(&mut self, deltas: &[Array1<f64>], learning_rate: f64) -> Result<()> {
        for (l, (layer, delta)) in self.layers.iter_mut().zip(deltas.iter()).enumerate() {
            layer
                .apply_update(self.outputs[l + 1].view(), delta.view(), learning_rate)
                .map_err(|e| e.at_layer(l))?;
        }
        Ok(())
    }

    /// One backpropagation step: forward pass, deltas, weight update.
    ///
    /// Inputs and targets are validated before the forward pass. Afterwards
    /// `output()` still holds the pre-update output for this example.
    pub fn train(
        &mut self,
        inputs: ArrayView1<f64>,
        targets: ArrayView1<f64>,
        learning_rate: f64,
    ) -> Result<()> {
        self.check_input(&inputs)?;
        self.check_target(&targets)?;

        self.feed_forward(inputs)?;
        let deltas = self.deltas(targets)?;
        self.update(&deltas, learning_rate)
    }

    pub fn get_trainer(&mut self) -> GradientDescent<'_> {
        GradientDescent::new(self)
    }

    /// Trains on every example in order, `epochs` times. Returns the mean
    /// squared error recorded for each epoch.
    pub fn train_all(
        &mut self,
        examples: &[TrainingExample],
        epochs: usize,
        learning_rate: f64,
    ) -> Result<Vec<f64>> {
        let mut trainer = self.get_trainer();
        trainer
            .set_epochs(epochs)
            .set_learning_rate(learning_rate)
            .train(examples)?;
        Ok(trainer.losses)
    }

    /// Classification accuracy: the share of examples whose predicted arg-max
    /// unit matches the arg-max of the target.
    pub fn test(&self, examples: &[TrainingExample]) -> Result<f64> {
        if examples.is_empty() {
            return Err(LaminaError::EmptyDataset);
        }
        self.check_examples(examples)?;

        let predictions = examples
            .iter()
            .map(|e| self.predict(e.input()).map(|p| p.to_vec()))
            .collect::<Result<Vec<Vec<f64>>>>()?;
        let targets = examples
            .iter()
            .map(|e| e.target().to_vec())
            .collect::<Vec<Vec<f64>>>();

        Ok(argmax_accuracy(&predictions, &targets))
    }

    /// Mean squared error over a dataset, averaged per example.
    pub fn mse(&self, examples: &[TrainingExample]) -> Result<f64> {
        if examples.is_empty() {
            return Err(LaminaError::EmptyDataset);
        }
        self.check_examples(examples)?;

        let mut total = 0.;
        for example in examples.iter() {
            let pred = self.predict(example.input())?;
            total += squared_error(pred.view(), example.target());
        }
        Ok(total / examples.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{arr1, arr2, Array2};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn single(weights: Array2<f64>, activation: Activations) -> Network {
        let mut net = Network::new();
        net.push_layer(Dense::with_weights(weights, activation).unwrap())
            .unwrap();
        net
    }

    fn assert_row(actual: ArrayView1<f64>, expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*a, *e, epsilon = 1e-6);
        }
    }

    #[test]
    fn single_layer_updates_match_hand_computation() {
        let mut net = single(arr2(&[[0.5, 0.5, 0.5, 0.5]]), Activations::Sigmoid);

        let cases: [(&[f64], f64, f64, [f64; 4]); 3] = [
            (
                &[1., 2., 3.],
                0.970688,
                0.1,
                [0.5000000045979396, 0.5000000045979396, 0.5000000091958791, 0.5000000137938186],
            ),
            (
                &[0.5, -1., 2.5],
                0.817574,
                0.2,
                [0.49999998415837954, 0.49999999437815956, 0.5000000296354391, 0.4999999626949185],
            ),
            (
                &[2., 4., 6.],
                0.998499,
                0.3,
                [0.4999999949277014, 0.5000000159168033, 0.5000000727127265, 0.5000000273108497],
            ),
        ];

        for (inputs, target, lr, expected) in cases.iter() {
            net.train(arr1(inputs).view(), arr1(&[*target]).view(), *lr)
                .unwrap();
            assert_row(net.output_layer().unwrap().weights().row(0), expected);
        }
    }

    #[test]
    fn single_layer_update_follows_delta_rule() {
        let mut net = single(arr2(&[[0.5, 0.5, 0.5, 0.5]]), Activations::Sigmoid);
        let inputs = [1., 2., 3.];
        let (target, lr) = (0.2, 0.1);

        let output = net.feed_forward(arr1(&inputs).view()).unwrap()[0];
        let delta = (target - output) * Activations::Sigmoid.wake().d(output);

        net.train(arr1(&inputs).view(), arr1(&[target]).view(), lr)
            .unwrap();

        let w = net.output_layer().unwrap().weights();
        assert_abs_diff_eq!(w[[0, 0]], 0.5 + lr * delta, epsilon = 1e-12);
        for (j, x) in inputs.iter().enumerate() {
            assert_abs_diff_eq!(w[[0, j + 1]], 0.5 + lr * delta * x, epsilon = 1e-12);
        }
    }

    #[test]
    fn two_layer_step_matches_hand_computation() {
        let mut net = Network::new();
        net.push_layer(
            Dense::with_weights(arr2(&[[0.1, 0.2, -0.3]]), Activations::Sigmoid).unwrap(),
        )
        .unwrap()
        .push_layer(
            Dense::with_weights(
                arr2(&[[0.05, 0.4, 0.6], [-0.1, 0.3, -0.2]]),
                Activations::Sigmoid,
            )
            .unwrap(),
        )
        .unwrap();

        net.train(arr1(&[1., 0.5]).view(), arr1(&[1.]).view(), 0.5)
            .unwrap();

        assert_row(net.output().unwrap(), &[0.5195754849317624]);
        assert_row(net.outputs()[1].view(), &[0.679178699175393, 0.5249791874789399]);

        let out = net.layer(0).unwrap().weights();
        assert_row(out.row(0), &[0.156175721438848, 0.23815335341207602, -0.2705089154029903]);

        let hidden = net.layer(1).unwrap().weights();
        assert_row(hidden.row(0), &[0.05250824193949752, 0.4025082419394975, 0.6012541209697487]);
        assert_row(
            hidden.row(1),
            &[-0.10393571940821547, 0.2960642805917845, -0.20196785970410774],
        );
    }

    #[test]
    fn tanh_hidden_slope_is_taken_at_its_output() {
        let mut net = Network::new();
        net.push_layer(
            Dense::with_weights(arr2(&[[0.1, 0.2, -0.3]]), Activations::Sigmoid).unwrap(),
        )
        .unwrap()
        .push_layer(
            Dense::with_weights(
                arr2(&[[0.05, 0.4, 0.6], [-0.1, 0.3, -0.2]]),
                Activations::Tanh,
            )
            .unwrap(),
        )
        .unwrap();

        net.train(arr1(&[1., 0.5]).view(), arr1(&[1.]).view(), 0.5)
            .unwrap();

        assert_row(net.output().unwrap(), &[0.5491233731114331]);
        assert_row(net.outputs()[1].view(), &[0.6351489523872873, 0.09966799462495579]);

        let out = net.layer(0).unwrap().weights();
        assert_row(out.row(0), &[0.15231570430144337, 0.23322826478046488, -0.29478579866488297]);

        // hidden deltas use 1 - tanh(h)^2 with h the cached tanh output
        let hidden = net.layer(1).unwrap().weights();
        assert_row(hidden.row(0), &[0.05716327028759283, 0.40716327028759286, 0.6035816351437964]);
        assert_row(
            hidden.row(1),
            &[-0.11553983129905057, 0.2844601687009494, -0.2077699156495253],
        );
    }

    #[test]
    fn unitless_layer_never_joins_the_network() {
        let mut net = Network::new();
        assert!(matches!(
            net.add_layer(2, 0, Activations::Sigmoid),
            Err(LaminaError::ShapeMismatch { what: "layer units", expected: 1, got: 0, .. })
        ));
        assert!(net.is_empty());

        let data = vec![TrainingExample::new(vec![0., 1.], vec![])];
        assert!(matches!(net.train_all(&data, 3, 0.1), Err(LaminaError::EmptyNetwork)));
        assert!(matches!(net.test(&data), Err(LaminaError::EmptyNetwork)));
    }

    #[test]
    fn forward_cache_ends_with_raw_input() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut net = Network::new();
        net.add_layer_using(4, 2, Activations::Sigmoid, &mut rng)
            .unwrap()
            .add_layer_using(3, 4, Activations::Tanh, &mut rng)
            .unwrap();

        let x = arr1(&[0.1, -0.4, 0.9]);
        let y = net.feed_forward(x.view()).unwrap();

        assert_eq!(net.outputs().len(), 3);
        assert_eq!(net.outputs()[2], x);
        assert_eq!(net.outputs()[1].len(), 4);
        assert_eq!(net.outputs()[0], y);
        assert_eq!(y.len(), 2);
    }

    #[test]
    fn feed_forward_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut net = Network::new();
        net.add_layer_using(3, 2, Activations::Sigmoid, &mut rng)
            .unwrap()
            .add_layer_using(2, 3, Activations::Relu, &mut rng)
            .unwrap();

        let x = arr1(&[0.3, 0.7]);
        let first = net.feed_forward(x.view()).unwrap();
        let second = net.feed_forward(x.view()).unwrap();
        assert_eq!(first, second);
        assert_eq!(net.predict(x.view()).unwrap(), first);
    }

    #[test]
    fn predict_leaves_cache_alone() {
        let mut net = Network::new();
        net.add_layer(2, 1, Activations::Sigmoid).unwrap();
        assert!(net.predict(arr1(&[1., 1.]).view()).is_ok());
        assert!(net.outputs().is_empty());
        assert!(matches!(net.output(), Err(LaminaError::NoForwardPass)));
    }

    #[test]
    fn wrong_input_width_names_input_layer() {
        let mut net = Network::new();
        net.add_layer(3, 1, Activations::Sigmoid)
            .unwrap()
            .add_layer(2, 3, Activations::Sigmoid)
            .unwrap();

        match net.feed_forward(arr1(&[1., 2., 3.]).view()) {
            Err(LaminaError::ShapeMismatch {
                layer,
                expected,
                got,
                ..
            }) => assert_eq!((layer, expected, got), (Some(1), 2, 3)),
            other => panic!("expected shape mismatch, got {:?}", other),
        }
        assert!(net.predict(arr1(&[1.]).view()).is_err());
    }

    #[test]
    fn wrong_target_width_is_rejected_before_training() {
        let mut net = Network::new();
        net.add_layer(2, 2, Activations::Sigmoid).unwrap();
        let before = net.output_layer().unwrap().weights().to_owned();

        let res = net.train(arr1(&[1., 0.]).view(), arr1(&[1.]).view(), 0.5);
        assert!(matches!(
            res,
            Err(LaminaError::ShapeMismatch {
                layer: Some(0),
                expected: 2,
                got: 1,
                ..
            })
        ));
        assert_eq!(net.output_layer().unwrap().weights(), before.view());
    }

    #[test]
    fn mismatched_layer_is_rejected() {
        let mut net = Network::new();
        net.add_layer(3, 1, Activations::Sigmoid).unwrap();
        assert!(matches!(
            net.add_layer(2, 4, Activations::Sigmoid),
            Err(LaminaError::ShapeMismatch {
                layer: Some(1),
                expected: 3,
                got: 4,
                ..
            })
        ));
        assert_eq!(net.len(), 1);
    }

    #[test]
    fn empty_network_is_an_error() {
        let mut net = Network::new();
        let x = arr1(&[1.]);
        assert!(matches!(net.feed_forward(x.view()), Err(LaminaError::EmptyNetwork)));
        assert!(matches!(net.predict(x.view()), Err(LaminaError::EmptyNetwork)));
        assert!(matches!(
            net.train(x.view(), x.view(), 0.1),
            Err(LaminaError::EmptyNetwork)
        ));
        let data = vec![TrainingExample::new(vec![1.], vec![1.])];
        assert!(matches!(net.test(&data), Err(LaminaError::EmptyNetwork)));
        assert!(matches!(
            net.train_all(&data, 1, 0.1),
            Err(LaminaError::EmptyNetwork)
        ));
    }

    #[test]
    fn accuracy_uses_argmax() {
        // unit 0 copies input 0, unit 1 copies input 1
        let net = single(arr2(&[[0., 1., 0.], [0., 0., 1.]]), Activations::Relu);

        let mut data = vec![
            TrainingExample::new(vec![1., 0.], vec![1., 0.]),
            TrainingExample::new(vec![0., 1.], vec![0., 1.]),
            TrainingExample::new(vec![2., 1.], vec![1., 0.]),
        ];
        assert_eq!(net.test(&data).unwrap(), 1.);

        data.push(TrainingExample::new(vec![0.2, 0.9], vec![1., 0.]));
        let acc = net.test(&data).unwrap();
        assert!(acc > 0. && acc < 1.);
        assert_abs_diff_eq!(acc, 0.75, epsilon = 1e-12);

        assert!(matches!(net.test(&[]), Err(LaminaError::EmptyDataset)));
    }

    #[test]
    fn scalar_output_is_always_index_zero() {
        let net = single(arr2(&[[-5., 10.]]), Activations::Sigmoid);
        let data = vec![
            TrainingExample::new(vec![0.], vec![0.]),
            TrainingExample::new(vec![1.], vec![1.]),
        ];
        assert_eq!(net.test(&data).unwrap(), 1.);
    }

    #[test]
    fn learns_logical_or() {
        let data = vec![
            TrainingExample::new(vec![0., 0.], vec![0.]),
            TrainingExample::new(vec![0., 1.], vec![1.]),
            TrainingExample::new(vec![1., 0.], vec![1.]),
            TrainingExample::new(vec![1., 1.], vec![1.]),
        ];

        let mut rng = StdRng::seed_from_u64(42);
        let mut net = Network::new();
        net.add_layer_using(3, 1, Activations::Sigmoid, &mut rng)
            .unwrap()
            .add_layer_using(2, 3, Activations::Sigmoid, &mut rng)
            .unwrap();

        let mut last = net.mse(&data).unwrap();
        for _ in 0..20 {
            net.train_all(&data, 100, 0.5).unwrap();
            let mse = net.mse(&data).unwrap();
            assert!(mse <= last + 1e-12, "mse rose from {} to {}", last, mse);
            last = mse;
        }

        assert!(net.predict(arr1(&[0., 0.]).view()).unwrap()[0] < 0.5);
        for x in [[0., 1.], [1., 0.], [1., 1.]] {
            assert!(net.predict(arr1(&x).view()).unwrap()[0] > 0.5);
        }
    }
}
