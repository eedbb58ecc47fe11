use std::fs;
use std::path::Path;

use bincode::{deserialize, serialize};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activations::Activation;
use crate::error::{GridPathError, Result};
use crate::layers::{DenseLayer, WeightInit};
use crate::loss::{Loss, MSE};
use crate::optimizer::{Adam, Optimizer, OptimizerWrapper, SGD};

/// A feed-forward network of dense layers with the optimizer that trains it.
///
/// The optimizer is serialized alongside the layers so a reloaded network
/// resumes with the same moment estimates it was saved with.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NeuralNetwork {
    pub layers: Vec<DenseLayer>,
    pub optimizer: OptimizerWrapper,
}

impl NeuralNetwork {
    /// Create a new neural network with the given layer sizes and activations,
    /// trained with plain SGD until another optimizer is installed.
    ///
    /// `layer_sizes` includes the input and output widths, so it must hold
    /// exactly one more entry than `activations`.
    pub fn new<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        activations: &[Activation],
        init: WeightInit,
        rng: &mut R,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(GridPathError::invalid_parameter(
                "layer_sizes",
                "must have at least input and output sizes",
            ));
        }
        if layer_sizes.len() - 1 != activations.len() {
            return Err(GridPathError::DimensionMismatch {
                expected: format!("{} activations", layer_sizes.len() - 1),
                actual: format!("{} activations", activations.len()),
            });
        }
        if layer_sizes.iter().any(|&size| size == 0) {
            return Err(GridPathError::invalid_parameter(
                "layer_sizes",
                "every layer needs at least one unit",
            ));
        }

        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .map(|(window, &activation)| DenseLayer::new(window[0], window[1], activation, init, rng))
            .collect::<Vec<_>>();

        Ok(NeuralNetwork {
            layers,
            optimizer: OptimizerWrapper::SGD(SGD::new()),
        })
    }

    pub fn with_optimizer(mut self, optimizer: OptimizerWrapper) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Replace the optimizer with a fresh Adam sized for the current layers.
    pub fn with_adam(self, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        let adam = Adam::new(&self.layers, beta1, beta2, epsilon);
        self.with_optimizer(OptimizerWrapper::Adam(adam))
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::input_size)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, DenseLayer::output_size)
    }

    /// Evaluate the network for a single input without touching training caches.
    pub fn predict(&self, input: ArrayView1<f32>) -> Array1<f32> {
        let mut current = input.insert_axis(Axis(0)).to_owned();
        for layer in &self.layers {
            current = layer.evaluate_batch(current.view());
        }
        current.index_axis_move(Axis(0), 0)
    }

    /// Perform a forward pass for a batch of input vectors, caching each
    /// layer's state for the following backward pass.
    pub fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut current = inputs.to_owned();
        for layer in &mut self.layers {
            current = layer.forward_batch(current.view());
        }
        current
    }

    fn backward_batch(&self, output_errors: ArrayView2<f32>) -> Result<Vec<(Array2<f32>, Array1<f32>)>> {
        let mut gradients = Vec::with_capacity(self.layers.len());
        let mut current_error = output_errors.to_owned();

        for (i, layer) in self.layers.iter().enumerate().rev() {
            let (adjusted_error, weight_gradients, bias_gradients) = layer
                .backward_batch(current_error.view())
                .ok_or_else(|| {
                    GridPathError::invalid_parameter("network", "backward pass requested before a forward pass")
                })?;
            gradients.push((weight_gradients, bias_gradients));

            if i != 0 {
                current_error = adjusted_error.dot(&layer.weights.t());
            }
        }

        gradients.reverse();
        Ok(gradients)
    }

    /// Take one optimizer step moving the output for `input` toward `target`
    /// under mean-squared error. Returns the loss before the step.
    pub fn train_step(&mut self, input: ArrayView1<f32>, target: ArrayView1<f32>, learning_rate: f32) -> Result<f32> {
        self.train_minibatch(input.insert_axis(Axis(0)), target.insert_axis(Axis(0)), learning_rate)
    }

    /// Take one optimizer step over a batch of inputs and targets.
    pub fn train_minibatch(
        &mut self,
        inputs: ArrayView2<f32>,
        targets: ArrayView2<f32>,
        learning_rate: f32,
    ) -> Result<f32> {
        if inputs.ncols() != self.input_size() {
            return Err(GridPathError::dimension_mismatch(
                format!("{} inputs", self.input_size()),
                format!("{} inputs", inputs.ncols()),
            ));
        }
        if targets.dim() != (inputs.nrows(), self.output_size()) {
            return Err(GridPathError::dimension_mismatch(
                format!("targets of shape ({}, {})", inputs.nrows(), self.output_size()),
                format!("targets of shape {:?}", targets.dim()),
            ));
        }

        let outputs = self.forward_batch(inputs);
        let loss = MSE.compute_batch(outputs.view(), targets);
        let output_errors = MSE.gradient_batch(outputs.view(), targets);
        let gradients = self.backward_batch(output_errors.view())?;

        for (index, (layer, (weight_gradients, bias_gradients))) in
            self.layers.iter_mut().zip(gradients).enumerate()
        {
            self.optimizer.update_weights(index, &mut layer.weights, &weight_gradients, learning_rate);
            self.optimizer.update_biases(index, &mut layer.biases, &bias_gradients, learning_rate);
        }
        self.optimizer.finish_step();

        Ok(loss)
    }

    /// Save the network, including optimizer state, to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serialize(self)?)?;
        Ok(())
    }

    /// Decode a network from bytes produced by [`NeuralNetwork::save`].
    ///
    /// Decoded parameters are checked with [`NeuralNetwork::check_shapes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let network: NeuralNetwork = deserialize(bytes)?;
        network.check_shapes()?;
        Ok(network)
    }

    /// Verify that every layer's biases match its outputs, that consecutive
    /// layers chain, and that optimizer state matches the layers.
    pub fn check_shapes(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(GridPathError::invalid_parameter("layers", "network has no layers"));
        }

        for (i, layer) in self.layers.iter().enumerate() {
            if layer.biases.len() != layer.output_size() {
                return Err(GridPathError::dimension_mismatch(
                    format!("{} biases in layer {}", layer.output_size(), i),
                    format!("{} biases", layer.biases.len()),
                ));
            }
        }

        for (i, pair) in self.layers.windows(2).enumerate() {
            if pair[0].output_size() != pair[1].input_size() {
                return Err(GridPathError::dimension_mismatch(
                    format!("{} inputs to layer {}", pair[0].output_size(), i + 1),
                    format!("{} inputs", pair[1].input_size()),
                ));
            }
        }

        if let OptimizerWrapper::Adam(adam) = &self.optimizer {
            if !adam.fits(&self.layers) {
                return Err(GridPathError::dimension_mismatch(
                    format!("Adam moments for {} layers", self.layers.len()),
                    format!("moments for {} layers of other shapes", adam.layer_count()),
                ));
            }
        }
        Ok(())
    }
}
