pub mod error;
pub mod tensor;
pub mod layer;
pub mod loss;
pub mod network;
pub mod mnist_data;
pub mod helpers;

pub use error::{Error, Result};
pub use tensor::Tensor;
