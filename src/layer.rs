use crate::error::Result;
use crate::tensor::Tensor;

/// A network layer: forward maps a (batch, in) activation to (batch, out),
/// backward takes the layer's forward-pass input and the gradient flowing
/// back from the next layer, applies any parameter update, and returns the
/// gradient with respect to its own input.
pub trait Layer {
    fn forward(&self, input: &Tensor) -> Result<Tensor>;

    fn backward(
        &mut self,
        input: &Tensor,
        grad_output: &Tensor,
        learning_rate: &Tensor,
    ) -> Result<Tensor>;
}

/// Affine layer: weights (in x out) uniform-random, biases (1 x out) zero,
/// biases broadcast over the batch rows.
pub struct Dense {
    pub weights: Tensor,
    pub biases: Tensor,
}

impl Dense {
    pub fn new(num_inputs: usize, num_outputs: usize, seed: u64) -> Dense {
        Dense {
            weights: Tensor::random(num_inputs, num_outputs, seed),
            biases: Tensor::zeros(1, num_outputs),
        }
    }
}

impl Layer for Dense {
    fn forward(&self, input: &Tensor) -> Result<Tensor> {
        input.matmul(&self.weights)?.add(&self.biases)
    }

    // Gradients are summed over the batch, not averaged; the loss gradient
    // already carries the 1/batch factor.
    fn backward(
        &mut self,
        input: &Tensor,
        grad_output: &Tensor,
        learning_rate: &Tensor,
    ) -> Result<Tensor> {
        let grad_input = grad_output.matmul(&self.weights.transpose())?;
        let grad_weights = input.transpose().matmul(grad_output)?;
        let grad_biases = grad_output.sum_axis(0)?;

        self.weights = self.weights.subtract(&learning_rate.multiply(&grad_weights)?)?;
        self.biases = self.biases.subtract(&learning_rate.multiply(&grad_biases)?)?;

        Ok(grad_input)
    }
}

/// ReLU family. slope 0.0 is plain ReLU; a positive slope gives leaky ReLU.
pub struct Relu {
    pub slope: f64,
}

impl Relu {
    pub fn new() -> Relu {
        Relu { slope: 0.0 }
    }

    pub fn leaky(slope: f64) -> Relu {
        Relu { slope }
    }
}

impl Default for Relu {
    fn default() -> Self {
        Relu::new()
    }
}

impl Layer for Relu {
    fn forward(&self, input: &Tensor) -> Result<Tensor> {
        let slope = self.slope;
        Ok(input.apply(|x| if x > 0.0 { x } else { slope * x }))
    }

    fn backward(
        &mut self,
        input: &Tensor,
        grad_output: &Tensor,
        _learning_rate: &Tensor,
    ) -> Result<Tensor> {
        let slope = self.slope;
        let derivative = input.apply(|x| if x > 0.0 { 1.0 } else { slope });
        grad_output.multiply(&derivative)
    }
}

pub struct Sigmoid;

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl Layer for Sigmoid {
    fn forward(&self, input: &Tensor) -> Result<Tensor> {
        Ok(input.apply(sigmoid))
    }

    // The derivative is y * (1 - y) in terms of the forward output, which is
    // recomputed here from the pre-activation input.
    fn backward(
        &mut self,
        input: &Tensor,
        grad_output: &Tensor,
        _learning_rate: &Tensor,
    ) -> Result<Tensor> {
        let derivative = input.apply(|x| {
            let y = sigmoid(x);
            y * (1.0 - y)
        });
        grad_output.multiply(&derivative)
    }
}

/// Passthrough placeholder: the softmax itself lives in the logits-aware
/// loss, so this layer forwards activations and gradients unchanged.
pub struct Softmax;

impl Layer for Softmax {
    fn forward(&self, input: &Tensor) -> Result<Tensor> {
        Ok(input.clone())
    }

    fn backward(
        &mut self,
        _input: &Tensor,
        grad_output: &Tensor,
        _learning_rate: &Tensor,
    ) -> Result<Tensor> {
        Ok(grad_output.clone())
    }
}
