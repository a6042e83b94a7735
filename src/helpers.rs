use crate::error::Result;
use crate::network::Network;
use crate::tensor::Tensor;

/// Exponential per-epoch learning-rate schedule, base * decay^epoch, as a
/// 1x1 tensor ready to pass to `Network::train`.
pub fn decayed_learning_rate(base: f64, decay: f64, epoch: usize) -> Tensor {
    Tensor::scalar(base * decay.powi(epoch as i32))
}

/// Fraction of correctly classified samples over a list of
/// (input, one-hot label) batches.
pub fn evaluate_model(network: &Network, batches: &[(Tensor, Tensor)]) -> Result<f64> {
    let mut correct = 0usize;
    let mut total = 0usize;

    for (input, labels) in batches {
        let predictions = network.predict(input)?;
        let truth = labels.argmax(1)?;

        for (pred, label) in predictions.data.iter().zip(truth.data.iter()) {
            if pred == label {
                correct += 1;
            }
        }
        total += predictions.rows;
    }

    Ok(correct as f64 / total as f64)
}
