//! Error types for the equalization pipeline.
//!
//! Only configuration problems are reported as values. Misusing a pipeline
//! (calling `run` before `configure`) is a programming error and panics.

/// Reasons a pipeline configuration can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EqualizeError {
    /// Image does not have exactly one channel.
    #[error("{role} image must have exactly one u8 channel, got {channels}")]
    NotSingleChannel { role: &'static str, channels: usize },

    /// Width is not covered by whole accumulator blocks.
    #[error("width of the image must be a multiple of {stride}, got {width}")]
    UnalignedWidth { width: usize, stride: usize },

    /// Output image does not have the same dimensions as the input.
    #[error("output shape {output:?} does not match input shape {input:?}")]
    ShapeMismatch {
        input: (usize, usize, usize),
        output: (usize, usize, usize),
    },

    /// A replacement input does not have the configured dimensions.
    #[error("input shape {rebound:?} does not match configured shape {configured:?}")]
    InputShapeChanged {
        configured: (usize, usize, usize),
        rebound: (usize, usize, usize),
    },

    /// A dedicated worker pool could not be built.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, EqualizeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unaligned_width_message() {
        let err = EqualizeError::UnalignedWidth { width: 17, stride: 16 };
        assert_eq!(
            err.to_string(),
            "width of the image must be a multiple of 16, got 17"
        );
    }

    #[test]
    fn test_shape_mismatch_message_names_both_shapes() {
        let err = EqualizeError::ShapeMismatch {
            input: (4, 16, 1),
            output: (4, 32, 1),
        };
        let msg = err.to_string();
        assert!(msg.contains("(4, 16, 1)"));
        assert!(msg.contains("(4, 32, 1)"));
    }
}
