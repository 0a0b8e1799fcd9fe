use crate::{
    error::LeNetError,
    layer::{LayerKind, LayerTrace},
};
use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AvgPool2d, AvgPool2dConfig},
        Linear, LinearConfig, PaddingConfig2d,
    },
    module::ModuleVisitor,
    prelude::*,
    tensor::activation::sigmoid,
};

/// Channels of the input images.
pub const INPUT_CHANNELS: usize = 1;
/// Height of the input images.
pub const INPUT_HEIGHT: usize = 28;
/// Width of the input images.
pub const INPUT_WIDTH: usize = 28;
/// Number of class scores produced per image.
pub const NUM_CLASSES: usize = 10;

// 16 feature maps of 5x5 after the second pooling stage.
const FLATTENED_FEATURES: usize = 16 * 5 * 5;

/// Configuration to create a [LeNet](LeNet) model using the [init function](LeNetConfig::init).
///
/// The architecture itself is fixed.
#[derive(Config, Debug)]
pub struct LeNetConfig {
    /// Seed the backend random generator with before initializing the parameters.
    pub seed: Option<u64>,
}

/// LeNet-5 style classifier.
///
/// Maps `[batch_size, 1, 28, 28]` images to `[batch_size, 10]` logits through two
/// convolution / sigmoid / average pooling stages followed by three fully connected layers.
#[derive(Module, Debug)]
pub struct LeNet<B: Backend> {
    c1: Conv2d<B>,
    s2: AvgPool2d,
    c3: Conv2d<B>,
    s4: AvgPool2d,
    f5: Linear<B>,
    f6: Linear<B>,
    f7: Linear<B>,
}

impl LeNetConfig {
    /// Returns the initialized model.
    pub fn init<B: Backend>(&self, device: &B::Device) -> LeNet<B> {
        if let Some(seed) = self.seed {
            B::seed(seed);
        }

        let model = LeNet {
            c1: Conv2dConfig::new([INPUT_CHANNELS, 6], [5, 5])
                .with_padding(PaddingConfig2d::Explicit(2, 2))
                .init(device),
            s2: AvgPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            c3: Conv2dConfig::new([6, 16], [5, 5]).init(device),
            s4: AvgPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            f5: LinearConfig::new(FLATTENED_FEATURES, 120).init(device),
            f6: LinearConfig::new(120, 84).init(device),
            f7: LinearConfig::new(84, NUM_CLASSES).init(device),
        };

        if self.seed.is_some() {
            // Parameters are initialized lazily: draw them now so the seed only applies to this model.
            model.visit(&mut Materialize);
        }

        log::debug!(
            "Initialized LeNet with {} parameters (seed: {:?})",
            model.num_params(),
            self.seed
        );

        model
    }
}

impl<B: Backend> LeNet<B> {
    /// Applies the forward pass on the input tensor.
    ///
    /// Panics if the input does not have exactly one channel. Any other incompatible shape
    /// fails inside the backend operation that first rejects it. Use
    /// [try_forward](LeNet::try_forward) to get an error instead.
    ///
    /// # Shapes
    ///
    /// - input: `[batch_size, 1, 28, 28]`
    /// - output: `[batch_size, 10]`
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 2> {
        self.forward_inspect(input, |_| {})
    }

    /// Same as [forward](LeNet::forward), after checking the input shape.
    pub fn try_forward(&self, input: Tensor<B, 4>) -> Result<Tensor<B, 2>, LeNetError> {
        check_input_shape(input.dims())?;

        Ok(self.forward(input))
    }

    /// Applies the forward pass, reporting each of the ten stages to `inspect` as it runs.
    pub fn forward_inspect<F>(&self, input: Tensor<B, 4>, mut inspect: F) -> Tensor<B, 2>
    where
        F: FnMut(LayerTrace),
    {
        let [_batch_size, channels, _height, _width] = input.dims();
        check_conv_channels(channels, INPUT_CHANNELS);

        let x = self.c1.forward(input);
        inspect(LayerTrace::new(LayerKind::Conv2d, &x.dims(), self.c1.num_params()));
        let x = sigmoid(x);
        inspect(LayerTrace::new(LayerKind::Sigmoid, &x.dims(), 0));
        let x = self.s2.forward(x);
        inspect(LayerTrace::new(LayerKind::AvgPool2d, &x.dims(), 0));

        let x = self.c3.forward(x);
        inspect(LayerTrace::new(LayerKind::Conv2d, &x.dims(), self.c3.num_params()));
        let x = sigmoid(x);
        inspect(LayerTrace::new(LayerKind::Sigmoid, &x.dims(), 0));
        let x = self.s4.forward(x);
        inspect(LayerTrace::new(LayerKind::AvgPool2d, &x.dims(), 0));

        // Flatten all dimensions except the batch dimension
        let x: Tensor<B, 2> = x.flatten(1, 3);
        inspect(LayerTrace::new(LayerKind::Flatten, &x.dims(), 0));

        let x = self.f5.forward(x);
        inspect(LayerTrace::new(LayerKind::Linear, &x.dims(), self.f5.num_params()));
        let x = self.f6.forward(x);
        inspect(LayerTrace::new(LayerKind::Linear, &x.dims(), self.f6.num_params()));
        let x = self.f7.forward(x);
        inspect(LayerTrace::new(LayerKind::Linear, &x.dims(), self.f7.num_params()));

        x
    }

    /// Returns the index of the highest scoring class for each image of the batch.
    pub fn classify(&self, input: Tensor<B, 4>) -> Tensor<B, 1, Int> {
        self.forward(input).argmax(1).flatten(0, 1)
    }
}

// The conv kernels read as many input channels as the weight holds and silently ignore the rest.
fn check_conv_channels(channels: usize, expected: usize) {
    if channels != expected {
        panic!(
            "Conv2d input channels mismatch: the weight expects {expected} channel(s), got {channels}"
        );
    }
}

struct Materialize;

impl<B: Backend> ModuleVisitor<B> for Materialize {}

pub(crate) fn check_input_shape(dims: [usize; 4]) -> Result<(), LeNetError> {
    let [batch_size, channels, height, width] = dims;
    let expected = [INPUT_CHANNELS, INPUT_HEIGHT, INPUT_WIDTH];

    if [channels, height, width] != expected {
        return Err(LeNetError::InputShape {
            expected,
            actual: dims.to_vec(),
        });
    }

    if batch_size == 0 {
        return Err(LeNetError::EmptyBatch);
    }

    Ok(())
}
