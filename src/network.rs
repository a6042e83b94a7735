use crate::error::{Error, Result};
use crate::layer::{Dense, Layer, Relu, Sigmoid, Softmax};
use crate::loss::Loss;
use crate::tensor::Tensor;

/// Nonlinearity placed after each hidden Dense layer.
#[derive(Debug, Clone, Copy)]
pub enum Activation {
    Relu,
    LeakyRelu(f64),
    Sigmoid,
    Softmax,
}

impl Activation {
    fn build(self) -> Box<dyn Layer> {
        match self {
            Activation::Relu => Box::new(Relu::new()),
            Activation::LeakyRelu(slope) => Box::new(Relu::leaky(slope)),
            Activation::Sigmoid => Box::new(Sigmoid),
            Activation::Softmax => Box::new(Softmax),
        }
    }
}

/// Feed-forward network: a fixed, exclusively owned sequence of layers.
/// Each hidden width contributes a Dense layer plus an activation; the final
/// Dense layer has no trailing activation and emits raw logits.
pub struct Network {
    layers: Vec<Box<dyn Layer>>,
}

impl Network {
    pub fn new(
        hidden_sizes: &[usize],
        num_inputs: usize,
        num_classes: usize,
        activation: Activation,
        seed: u64,
    ) -> Network {
        let mut layers: Vec<Box<dyn Layer>> = Vec::with_capacity(2 * hidden_sizes.len() + 1);
        let mut input_size = num_inputs;
        for (idx, &size) in hidden_sizes.iter().enumerate() {
            layers.push(Box::new(Dense::new(
                input_size,
                size,
                seed.wrapping_add(idx as u64),
            )));
            layers.push(activation.build());
            input_size = size;
        }
        layers.push(Box::new(Dense::new(
            input_size,
            num_classes,
            seed.wrapping_add(hidden_sizes.len() as u64),
        )));
        Network { layers }
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Runs every layer in order and returns all intermediate activations,
    /// with the original input first; backward needs each layer's input.
    pub fn forward(&self, input: &Tensor) -> Result<Vec<Tensor>> {
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        let mut current = input.clone();
        for layer in &self.layers {
            let next = layer.forward(&current)?;
            activations.push(current);
            current = next;
        }
        activations.push(current);
        Ok(activations)
    }

    /// Predicted class index per batch row: argmax over the logits.
    pub fn predict(&self, input: &Tensor) -> Result<Tensor> {
        let activations = self.forward(input)?;
        activations[self.layers.len()].argmax(1)
    }

    /// One mini-batch training step: forward, loss, reverse backward chain
    /// with in-place parameter updates. Returns the mean loss over the batch.
    pub fn train(
        &mut self,
        input: &Tensor,
        labels: &Tensor,
        loss: &dyn Loss,
        learning_rate: &Tensor,
    ) -> Result<f64> {
        let activations = self.forward(input)?;
        let logits = &activations[self.layers.len()];

        let loss_values = loss.loss(logits, labels)?;
        let mean_loss = loss_values.mean();
        let mut grad = loss.loss_grad(logits, labels)?;

        if mean_loss.is_nan() || grad.has_nan() {
            return Err(Error::Divergence(format!(
                "loss or gradient is NaN (mean loss {})",
                mean_loss
            )));
        }

        for (idx, layer) in self.layers.iter_mut().enumerate().rev() {
            grad = layer.backward(&activations[idx], &grad, learning_rate)?;
        }

        Ok(mean_loss)
    }
}
