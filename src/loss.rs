use crate::error::Result;
use crate::tensor::Tensor;

// Clip for log arguments, against ln(0).
const EPSILON: f64 = 1e-15;

/// A loss paired with its analytic gradient. `loss` returns an unreduced
/// tensor (the caller reduces, usually with `mean`); `loss_grad` returns the
/// gradient of the reduced loss with respect to the predictions.
pub trait Loss {
    fn loss(&self, predictions: &Tensor, targets: &Tensor) -> Result<Tensor>;
    fn loss_grad(&self, predictions: &Tensor, targets: &Tensor) -> Result<Tensor>;
}

pub struct MeanSquaredError;

impl Loss for MeanSquaredError {
    fn loss(&self, predictions: &Tensor, targets: &Tensor) -> Result<Tensor> {
        Ok(predictions.subtract(targets)?.square())
    }

    fn loss_grad(&self, predictions: &Tensor, targets: &Tensor) -> Result<Tensor> {
        let diff = predictions.subtract(targets)?;
        Ok(diff.scale(2.0 / predictions.size() as f64))
    }
}

/// Row-wise softmax, stabilized by subtracting each row's maximum before
/// exponentiating.
pub fn softmax(logits: &Tensor) -> Result<Tensor> {
    let row_max = logits.max_axis(1)?;
    let exps = logits.subtract(&row_max)?.apply(f64::exp);
    let row_sums = exps.sum_axis(1)?;
    exps.divide(&row_sums)
}

/// Cross entropy over raw logits: takes the stable softmax internally and
/// returns one loss value per batch row.
pub struct SoftmaxCrossEntropyWithLogits;

impl Loss for SoftmaxCrossEntropyWithLogits {
    fn loss(&self, predictions: &Tensor, targets: &Tensor) -> Result<Tensor> {
        let probabilities = softmax(predictions)?;
        let log_probs = probabilities.apply(|p| p.max(EPSILON).ln());
        let weighted = targets.multiply(&log_probs)?;
        Ok(weighted.sum_axis(1)?.scale(-1.0))
    }

    // softmax(pred) - target, averaged over the batch so the per-sample
    // gradient scale is independent of batch size.
    fn loss_grad(&self, predictions: &Tensor, targets: &Tensor) -> Result<Tensor> {
        let probabilities = softmax(predictions)?;
        let diff = probabilities.subtract(targets)?;
        Ok(diff.scale(1.0 / predictions.rows as f64))
    }
}
