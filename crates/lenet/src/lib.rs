//! LeNet-5 image classifier composed from [Burn](burn) modules.
//!
//! The model maps batches of single channel 28x28 images to 10 class logits. A
//! [summary](summary::ModelSummary) reports the output shape and parameter count of every
//! stage.

pub mod error;
pub mod layer;
pub mod logging;
pub mod model;
pub mod summary;

pub use error::LeNetError;
pub use model::{LeNet, LeNetConfig};
pub use summary::{ModelSummary, SummaryConfig};

#[cfg(test)]
pub(crate) type TestBackend = burn::backend::NdArray<f32>;
