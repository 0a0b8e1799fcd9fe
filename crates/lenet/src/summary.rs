use core::fmt;

use crate::{
    error::LeNetError,
    layer::LayerTrace,
    model::{check_input_shape, LeNet},
};
use burn::prelude::*;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const RULE_WIDTH: usize = 64;

/// Configuration of the input fed to the model by [ModelSummary::collect].
#[derive(Config, Debug)]
pub struct SummaryConfig {
    /// Channels of a single input item.
    #[config(default = 1)]
    pub channels: usize,
    /// Height of a single input item.
    #[config(default = 28)]
    pub height: usize,
    /// Width of a single input item.
    #[config(default = 28)]
    pub width: usize,
    /// Number of items in the probe batch.
    #[config(default = 2)]
    pub batch_size: usize,
}

/// One row of the summary table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSummary {
    /// Layer name and 1-based position, e.g. `Conv2d-1`.
    pub name: String,
    /// Output shape with the batch dimension first.
    pub output_shape: Vec<usize>,
    /// Parameters owned by the layer.
    pub num_params: usize,
    /// Whether the layer's parameters are learnable.
    pub trainable: bool,
}

/// Per-layer output shapes and parameter counts of a [LeNet] model.
#[derive(Debug, Clone)]
pub struct ModelSummary {
    /// One row per stage, in execution order.
    pub layers: Vec<LayerSummary>,
    /// Input shape of a single item, `[channels, height, width]`.
    pub input_shape: [usize; 3],
    /// Size in bytes of a float element on the backend.
    pub elem_size: usize,
}

impl ModelSummary {
    /// Runs a zero batch described by `config` through `model` and records every stage.
    pub fn collect<B: Backend>(
        model: &LeNet<B>,
        config: &SummaryConfig,
        device: &B::Device,
    ) -> Result<Self, LeNetError> {
        let input_shape = [config.channels, config.height, config.width];
        let dims = [config.batch_size, config.channels, config.height, config.width];
        check_input_shape(dims)?;

        let input = Tensor::<B, 4>::zeros(dims, device);
        let mut traces = Vec::with_capacity(10);
        model.forward_inspect(input, |trace| traces.push(trace));

        let layers = traces
            .into_iter()
            .enumerate()
            .map(|(index, trace)| LayerSummary::from_trace(index + 1, trace))
            .collect::<Vec<_>>();

        log::debug!(
            "Collected summary of {} layers for input {:?}",
            layers.len(),
            input_shape
        );

        Ok(Self {
            layers,
            input_shape,
            elem_size: core::mem::size_of::<B::FloatElem>(),
        })
    }

    /// Parameters of all layers.
    pub fn total_params(&self) -> usize {
        self.layers.iter().map(|layer| layer.num_params).sum()
    }

    /// Parameters of the learnable layers.
    pub fn trainable_params(&self) -> usize {
        self.layers
            .iter()
            .filter(|layer| layer.trainable)
            .map(|layer| layer.num_params)
            .sum()
    }

    /// Parameters of the frozen layers, always zero for LeNet.
    pub fn non_trainable_params(&self) -> usize {
        self.total_params() - self.trainable_params()
    }

    /// Size of a single input item in MB.
    pub fn input_size_mb(&self) -> f64 {
        let elements: usize = self.input_shape.iter().product();
        self.bytes_to_mb(elements)
    }

    /// Activations kept for one item through the forward and backward passes, in MB.
    pub fn forward_backward_size_mb(&self) -> f64 {
        let elements: usize = self
            .layers
            .iter()
            .map(|layer| layer.output_shape.iter().skip(1).product::<usize>())
            .sum();
        self.bytes_to_mb(2 * elements)
    }

    /// Size of all parameters in MB.
    pub fn params_size_mb(&self) -> f64 {
        self.bytes_to_mb(self.total_params())
    }

    /// Input, activation and parameter sizes combined, in MB.
    pub fn total_size_mb(&self) -> f64 {
        self.input_size_mb() + self.forward_backward_size_mb() + self.params_size_mb()
    }

    fn bytes_to_mb(&self, elements: usize) -> f64 {
        (elements * self.elem_size) as f64 / BYTES_PER_MB
    }
}

impl LayerSummary {
    fn from_trace(index: usize, trace: LayerTrace) -> Self {
        Self {
            name: format!("{}-{}", trace.kind, index),
            trainable: trace.kind.is_parameterized(),
            output_shape: trace.output_shape,
            num_params: trace.num_params,
        }
    }

    /// Output shape rendered with a free batch dimension, e.g. `[-1, 6, 28, 28]`.
    pub fn display_shape(&self) -> String {
        let dims = self
            .output_shape
            .iter()
            .skip(1)
            .map(|dim| dim.to_string());
        let dims = core::iter::once("-1".to_string())
            .chain(dims)
            .collect::<Vec<_>>();

        format!("[{}]", dims.join(", "))
    }
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(RULE_WIDTH);
        let double_rule = "=".repeat(RULE_WIDTH);

        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "{:>20}  {:>25} {:>15}",
            "Layer (type)", "Output Shape", "Param #"
        )?;
        writeln!(f, "{double_rule}")?;
        for layer in self.layers.iter() {
            writeln!(
                f,
                "{:>20}  {:>25} {:>15}",
                layer.name,
                layer.display_shape(),
                group_thousands(layer.num_params)
            )?;
        }
        writeln!(f, "{double_rule}")?;
        writeln!(f, "Total params: {}", group_thousands(self.total_params()))?;
        writeln!(
            f,
            "Trainable params: {}",
            group_thousands(self.trainable_params())
        )?;
        writeln!(
            f,
            "Non-trainable params: {}",
            group_thousands(self.non_trainable_params())
        )?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Input size (MB): {:.2}", self.input_size_mb())?;
        writeln!(
            f,
            "Forward/backward pass size (MB): {:.2}",
            self.forward_backward_size_mb()
        )?;
        writeln!(f, "Params size (MB): {:.2}", self.params_size_mb())?;
        writeln!(f, "Estimated Total Size (MB): {:.2}", self.total_size_mb())?;
        write!(f, "{rule}")
    }
}

fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::LeNetConfig, TestBackend};

    fn summary() -> ModelSummary {
        let device = Default::default();
        let model = LeNetConfig::new().init::<TestBackend>(&device);

        ModelSummary::collect(&model, &SummaryConfig::new(), &device).unwrap()
    }

    #[test]
    fn layer_names_follow_execution_order() {
        let names: Vec<String> = summary().layers.into_iter().map(|l| l.name).collect();

        assert_eq!(
            names,
            vec![
                "Conv2d-1",
                "Sigmoid-2",
                "AvgPool2d-3",
                "Conv2d-4",
                "Sigmoid-5",
                "AvgPool2d-6",
                "Flatten-7",
                "Linear-8",
                "Linear-9",
                "Linear-10",
            ]
        );
    }

    #[test]
    fn param_totals() {
        let summary = summary();

        assert_eq!(summary.total_params(), 61706);
        assert_eq!(summary.trainable_params(), 61706);
        assert_eq!(summary.non_trainable_params(), 0);
    }

    #[test]
    fn shapes_hide_batch_dimension() {
        let summary = summary();

        assert_eq!(summary.layers[0].display_shape(), "[-1, 6, 28, 28]");
        assert_eq!(summary.layers[5].display_shape(), "[-1, 16, 5, 5]");
        assert_eq!(summary.layers[6].display_shape(), "[-1, 400]");
        assert_eq!(summary.layers[9].display_shape(), "[-1, 10]");
    }

    #[test]
    fn size_estimates_use_float_element_size() {
        let summary = summary();

        assert_eq!(summary.elem_size, 4);
        assert!((summary.params_size_mb() - 61706.0 * 4.0 / BYTES_PER_MB).abs() < 1e-9);
        assert!((summary.input_size_mb() - 784.0 * 4.0 / BYTES_PER_MB).abs() < 1e-9);
        // conv/sigmoid pairs, pools, flatten, then 120 + 84 + 10 logits per item
        let activations = 4704.0 * 2.0 + 1176.0 + 1600.0 * 2.0 + 400.0 * 2.0 + 214.0;
        assert!(
            (summary.forward_backward_size_mb() - 2.0 * activations * 4.0 / BYTES_PER_MB).abs()
                < 1e-9
        );
    }

    #[test]
    fn display_renders_table() {
        let rendered = summary().to_string();

        assert!(rendered.contains("Layer (type)"));
        assert!(rendered.contains("Conv2d-1"));
        assert!(rendered.contains("[-1, 6, 28, 28]"));
        assert!(rendered.contains("48,120"));
        assert!(rendered.contains("Total params: 61,706"));
        assert!(rendered.contains("Non-trainable params: 0"));
        assert!(rendered.contains("Params size (MB): 0.24"));
    }

    #[test]
    fn collect_rejects_wrong_input() {
        let device = Default::default();
        let model = LeNetConfig::new().init::<TestBackend>(&device);
        let config = SummaryConfig::new().with_channels(3);

        let result = ModelSummary::collect(&model, &config, &device);

        assert!(matches!(result, Err(LeNetError::InputShape { .. })));
    }

    #[test]
    fn group_thousands_inserts_separators() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(850), "850");
        assert_eq!(group_thousands(2416), "2,416");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }
}
