/// Errors raised by the crate itself.
///
/// Failures inside tensor operations are not translated: they surface from the backend as-is.
#[derive(thiserror::Error, Debug)]
pub enum LeNetError {
    #[error("Invalid input shape {actual:?}: expected items of shape {expected:?}")]
    InputShape {
        /// Per-item shape `[channels, height, width]` the model accepts.
        expected: [usize; 3],
        /// Full shape of the rejected input, batch dimension included.
        actual: Vec<usize>,
    },

    #[error("Input batch is empty")]
    EmptyBatch,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_shape_message_names_both_shapes() {
        let error = LeNetError::InputShape {
            expected: [1, 28, 28],
            actual: vec![4, 3, 28, 28],
        };

        assert_eq!(
            error.to_string(),
            "Invalid input shape [4, 3, 28, 28]: expected items of shape [1, 28, 28]"
        );
    }

    #[test]
    fn empty_batch_message() {
        assert_eq!(LeNetError::EmptyBatch.to_string(), "Input batch is empty");
    }
}
