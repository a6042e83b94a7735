use mlp_net::loss::{softmax, Loss, MeanSquaredError, SoftmaxCrossEntropyWithLogits};
use mlp_net::tensor::Tensor;

fn tensors_equal(a: &Tensor, b: &Tensor, tolerance: f64) -> bool {
    if a.rows != b.rows || a.cols != b.cols {
        return false;
    }
    a.data
        .iter()
        .zip(b.data.iter())
        .all(|(x, y)| (x - y).abs() < tolerance)
}

#[test]
fn test_softmax_golden_values() {
    let mat = Tensor::new(
        vec![1., 0., 2., -1., 2., 4., 6., 8., 3., 2., 1., 0.],
        3,
        4,
    )
    .unwrap();
    let expected = Tensor::new(
        vec![
            0.23688282, 0.08714432, 0.64391426, 0.0320586, 0.00214401, 0.0158422, 0.11705891,
            0.86495488, 0.64391426, 0.23688282, 0.08714432, 0.0320586,
        ],
        3,
        4,
    )
    .unwrap();

    let result = softmax(&mat).unwrap();
    assert!(tensors_equal(&result, &expected, 1e-5));
}

#[test]
fn test_softmax_rows_sum_to_one() {
    let logits = Tensor::random(4, 7, 42);
    let result = softmax(&logits).unwrap();
    let row_sums = result.sum_axis(1).unwrap();
    for sum in &row_sums.data {
        assert!((sum - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_softmax_shift_invariance() {
    let logits = Tensor::new(
        vec![1., 0., 2., -1., 2., 4., 6., 8., 3., 2., 1., 0.],
        3,
        4,
    )
    .unwrap();
    let shifted = logits.add(&Tensor::scalar(123.5)).unwrap();

    let base = softmax(&logits).unwrap();
    let from_shifted = softmax(&shifted).unwrap();
    assert!(tensors_equal(&base, &from_shifted, 1e-9));
}

#[test]
fn test_softmax_stable_for_large_logits() {
    // Without the row-max subtraction these exponentials would overflow.
    let logits = Tensor::new(vec![1000.0, 1001.0, 1002.0], 1, 3).unwrap();
    let result = softmax(&logits).unwrap();
    assert!(!result.has_nan());
    assert!((result.sum() - 1.0).abs() < 1e-9);
}

fn cross_entropy_fixture() -> (Tensor, Tensor) {
    let predictions = Tensor::new(
        vec![
            9.12342578, 0.63358697, 8.06560308, 3.9013097, 2.62197487, 6.23334865, 6.41026575,
            2.81146893, 7.77734698, 4.55262309, 9.60435717, 7.04164476, 0.23223837, 0.46014417,
            2.03215742, 5.46875653, 9.3033918, 7.62148293, 8.93237563, 8.01205415, 3.71256154,
            7.27356444, 3.56967595, 3.91320274, 5.17653227, 2.23887074, 7.590534, 2.15816133,
            6.53402656, 8.40739104, 7.24587216, 6.99176605, 0.6429947, 5.22698447, 8.62558009,
            9.86430273, 4.34014201, 5.79361825, 4.93217826, 7.08567487, 3.46292678, 3.58536139,
            9.04794016, 8.42519859, 3.06082975, 8.43025028, 6.01086521, 6.6900385, 7.73285345,
            3.04084278,
        ],
        5,
        10,
    )
    .unwrap();
    let labels_one_hot = Tensor::new(
        vec![
            1., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 1., 0., 0., 0., 0., 0., 0., 0., 0., 0.,
            0., 1., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 1., 0., 0., 0., 0., 0., 0., 0., 0.,
            0., 0., 1., 0., 0., 0., 0., 0.,
        ],
        5,
        10,
    )
    .unwrap();
    (predictions, labels_one_hot)
}

#[test]
fn test_cross_entropy_golden_value() {
    let (predictions, labels) = cross_entropy_fixture();
    let ce = SoftmaxCrossEntropyWithLogits;

    let batched = ce.loss(&predictions, &labels).unwrap();
    assert_eq!(batched.dims(), (5, 1));
    assert!((batched.mean() - 4.318751335144043).abs() < 1e-5);
}

#[test]
fn test_cross_entropy_grad_is_softmax_minus_labels_over_batch() {
    let (predictions, labels) = cross_entropy_fixture();
    let ce = SoftmaxCrossEntropyWithLogits;

    let grad = ce.loss_grad(&predictions, &labels).unwrap();
    assert_eq!(grad.dims(), (5, 10));

    let expected = softmax(&predictions)
        .unwrap()
        .subtract(&labels)
        .unwrap()
        .scale(1.0 / 5.0);
    assert!(tensors_equal(&grad, &expected, 1e-12));

    // Softmax rows and one-hot rows both sum to 1, so the gradient sums to 0.
    assert!(grad.sum().abs() < 1e-9);
}

#[test]
fn test_cross_entropy_zero_loss_for_confident_correct_prediction() {
    let predictions = Tensor::new(vec![100.0, 0.0, 0.0], 1, 3).unwrap();
    let labels = Tensor::new(vec![1.0, 0.0, 0.0], 1, 3).unwrap();
    let ce = SoftmaxCrossEntropyWithLogits;

    let loss = ce.loss(&predictions, &labels).unwrap();
    assert!(loss.mean().abs() < 1e-9);
}

#[test]
fn test_mse_loss_is_unreduced_squared_error() {
    let predictions = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
    let targets = Tensor::new(vec![1.5, 2.5, 3.5, 4.5], 2, 2).unwrap();
    let mse = MeanSquaredError;

    let loss = mse.loss(&predictions, &targets).unwrap();
    assert_eq!(loss.dims(), (2, 2));
    assert!(tensors_equal(
        &loss,
        &Tensor::new(vec![0.25, 0.25, 0.25, 0.25], 2, 2).unwrap(),
        1e-9
    ));
    assert!((loss.mean() - 0.25).abs() < 1e-9);
}

#[test]
fn test_mse_grad() {
    let predictions = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
    let targets = Tensor::new(vec![1.5, 2.5, 3.5, 4.5], 2, 2).unwrap();
    let mse = MeanSquaredError;

    // 2 * (pred - target) / 4
    let grad = mse.loss_grad(&predictions, &targets).unwrap();
    assert!(tensors_equal(
        &grad,
        &Tensor::new(vec![-0.25, -0.25, -0.25, -0.25], 2, 2).unwrap(),
        1e-9
    ));
}

#[test]
fn test_mse_loss_zero_at_target() {
    let predictions = Tensor::new(vec![1.0, -2.0, 0.5], 1, 3).unwrap();
    let mse = MeanSquaredError;

    let loss = mse.loss(&predictions, &predictions).unwrap();
    assert!(loss.sum().abs() < 1e-12);
    let grad = mse.loss_grad(&predictions, &predictions).unwrap();
    assert!(grad.sum().abs() < 1e-12);
}
