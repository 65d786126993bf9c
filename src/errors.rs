use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for the product crop application.
///
/// Each variant captures context specific to its error domain (filesystem,
/// segmentation, crop computation), so callers can tell a failed model run
/// apart from an image that simply has no foreground. Per-image failures are
/// caught at the batch loop and counted; nothing here is retryable.
#[derive(Error, Debug)]
pub enum ProductCropError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Filesystem error: {operation} failed for {path:?}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Image processing error: {operation} failed (file: {path})")]
    ImageProcessing {
        path: String,
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The segmenter could not produce an alpha-bearing image: decode
    /// failure, missing alpha channel on its output, or a model error.
    #[error("Segmentation error: {operation} failed")]
    Segmentation {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The alpha channel contains no pixel above zero, so no bounding box
    /// exists. Distinct from I/O errors; the caller marks the image failed
    /// and moves on.
    #[error("no foreground pixels detected")]
    NoForeground,
}

pub type Result<T> = std::result::Result<T, ProductCropError>;

/// Convert anyhow errors to configuration errors.
///
/// Some dependencies return anyhow::Error which lacks structured error
/// information. Rather than propagating the generic error type throughout
/// the codebase, we convert to our domain-specific error type at boundaries.
impl From<anyhow::Error> for ProductCropError {
    fn from(err: anyhow::Error) -> Self {
        ProductCropError::Configuration {
            message: err.to_string(),
        }
    }
}

/// Convert I/O errors to filesystem errors.
///
/// Some I/O errors occur without specific path/operation context. Code that
/// has context should construct ProductCropError::FileSystem directly with
/// the specific path and operation.
impl From<std::io::Error> for ProductCropError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("unknown"),
            operation: "unknown".to_string(),
            source: err,
        }
    }
}

/// Convert image crate errors to image processing errors.
impl From<image::ImageError> for ProductCropError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageProcessing {
            path: "unknown".to_string(),
            operation: "image processing".to_string(),
            source: Box::new(err),
        }
    }
}

/// Convert ONNX Runtime errors to segmentation errors.
impl From<ort::Error> for ProductCropError {
    fn from(err: ort::Error) -> Self {
        Self::Segmentation {
            operation: "ort operation".to_string(),
            source: Box::new(err),
        }
    }
}

/// Convert ndarray shape errors to segmentation errors.
///
/// Shape errors occur during tensor operations which are part of model
/// inference, so they belong to the segmentation domain rather than a
/// separate tensor error type.
impl From<ndarray::ShapeError> for ProductCropError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::Segmentation {
            operation: "tensor shape conversion".to_string(),
            source: Box::new(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_foreground_is_distinct_from_io_errors() {
        let err = ProductCropError::NoForeground;
        assert!(matches!(err, ProductCropError::NoForeground));

        let io: ProductCropError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(io, ProductCropError::FileSystem { .. }));
    }

    #[test]
    fn display_carries_context() {
        let err = ProductCropError::Segmentation {
            operation: "decode segmenter output".to_string(),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "no alpha channel",
            )),
        };
        assert!(err.to_string().contains("decode segmenter output"));
    }
}
