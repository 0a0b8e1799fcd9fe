use core::fmt;

/// The kind of a stage in the [LeNet](crate::model::LeNet) pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Conv2d,
    Sigmoid,
    AvgPool2d,
    Flatten,
    Linear,
}

impl LayerKind {
    /// Whether the stage owns learnable parameters.
    pub fn is_parameterized(&self) -> bool {
        matches!(self, LayerKind::Conv2d | LayerKind::Linear)
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayerKind::Conv2d => "Conv2d",
            LayerKind::Sigmoid => "Sigmoid",
            LayerKind::AvgPool2d => "AvgPool2d",
            LayerKind::Flatten => "Flatten",
            LayerKind::Linear => "Linear",
        };

        f.write_str(name)
    }
}

/// What a single stage produced during an inspected forward pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerTrace {
    /// The stage kind.
    pub kind: LayerKind,
    /// Output dimensions, batch dimension included.
    pub output_shape: Vec<usize>,
    /// Number of parameters owned by the stage.
    pub num_params: usize,
}

impl LayerTrace {
    pub(crate) fn new(kind: LayerKind, output_shape: &[usize], num_params: usize) -> Self {
        Self {
            kind,
            output_shape: output_shape.to_vec(),
            num_params,
        }
    }

    /// Number of elements in the stage output.
    pub fn num_elements(&self) -> usize {
        self.output_shape.iter().product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_module_names() {
        assert_eq!(LayerKind::Conv2d.to_string(), "Conv2d");
        assert_eq!(LayerKind::AvgPool2d.to_string(), "AvgPool2d");
        assert_eq!(LayerKind::Linear.to_string(), "Linear");
    }

    #[test]
    fn only_conv_and_linear_are_parameterized() {
        assert!(LayerKind::Conv2d.is_parameterized());
        assert!(LayerKind::Linear.is_parameterized());
        assert!(!LayerKind::Sigmoid.is_parameterized());
        assert!(!LayerKind::AvgPool2d.is_parameterized());
        assert!(!LayerKind::Flatten.is_parameterized());
    }

    #[test]
    fn num_elements_includes_batch() {
        let trace = LayerTrace::new(LayerKind::AvgPool2d, &[4, 16, 5, 5], 0);

        assert_eq!(trace.num_elements(), 1600);
    }
}
