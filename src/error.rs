//! Error types for synthimg.
//!
//! Every failure surfaces to the caller as a [`GenerationError`] carrying an
//! [`ErrorCode`]. Nothing is retried and no partial artifact is returned.

use std::fmt;

/// Error codes attached to every [`GenerationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Request failed validation.
    /// Trigger: size range, dimensions or quality out of bounds.
    InvalidParameter,

    /// The encoder rejected a composite or encode step.
    /// Trigger: encoder error at any escalation tier.
    EncodeFailure,

    /// The requested output format has no usable writer.
    /// Trigger: `image` built without the codec feature for that format.
    CapabilityUnavailable,

    /// Persisting an encoded artifact failed.
    /// Trigger: missing directory permissions, disk full.
    OutputWriteFailed,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidParameter => "INVALID_PARAMETER",
            ErrorCode::EncodeFailure => "ENCODE_FAILURE",
            ErrorCode::CapabilityUnavailable => "CAPABILITY_UNAVAILABLE",
            ErrorCode::OutputWriteFailed => "OUTPUT_WRITE_FAILED",
        }
    }

    /// Returns a human-readable description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::InvalidParameter => "Generation request failed validation",
            ErrorCode::EncodeFailure => "Image encoder rejected the synthesized raster",
            ErrorCode::CapabilityUnavailable => "Requested image format cannot be written",
            ErrorCode::OutputWriteFailed => "Encoded image could not be written to disk",
        }
    }

    /// Returns a recovery hint suggesting how to resolve this error.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCode::InvalidParameter => {
                "Use width/height between 100 and 16384, min_size_kb >= 1, \
                 max_size_kb >= min_size_kb and quality between 1 and 100"
            }
            ErrorCode::EncodeFailure => {
                "Try a smaller size range or fewer pixels; very large Tier 2 upscales \
                 can exceed encoder limits"
            }
            ErrorCode::CapabilityUnavailable => {
                "Pick another output format (jpeg, png, webp) or rebuild with the \
                 matching image codec feature enabled"
            }
            ErrorCode::OutputWriteFailed => {
                "Check that the output directory exists and is writable, \
                 and that there is free disk space"
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for generation.
#[derive(Debug)]
pub struct GenerationError {
    /// The error code identifying the type of error.
    pub code: ErrorCode,
    /// Human-readable error message with context.
    pub message: String,
    /// Optional underlying cause of the error.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl GenerationError {
    /// Creates a new GenerationError with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new GenerationError with an underlying cause.
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an INVALID_PARAMETER error.
    pub fn invalid_parameter(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InvalidParameter,
            format!("Invalid parameter: {}", reason.into()),
        )
    }

    /// Creates an ENCODE_FAILURE error wrapping the encoder's cause.
    ///
    /// `context` names what was being encoded, e.g. `jpeg 800x600`.
    pub fn encode_failure(
        context: impl fmt::Display,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::with_source(
            ErrorCode::EncodeFailure,
            format!("Encoding {} failed: {}", context, source),
            source,
        )
    }

    /// Creates a CAPABILITY_UNAVAILABLE error.
    pub fn capability_unavailable(format: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::CapabilityUnavailable,
            format!("No encoder available for format: {}", format),
        )
    }

    /// Creates an OUTPUT_WRITE_FAILED error.
    pub fn output_write_failed(path: impl fmt::Display, source: std::io::Error) -> Self {
        Self::with_source(
            ErrorCode::OutputWriteFailed,
            format!("Failed to write {}: {}", path, source),
            source,
        )
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}. Recovery: {}",
            self.code,
            self.message,
            self.code.recovery_hint()
        )
    }
}

impl std::error::Error for GenerationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Result type alias using GenerationError.
pub type Result<T> = std::result::Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn error_code_as_str() {
        assert_eq!(ErrorCode::InvalidParameter.as_str(), "INVALID_PARAMETER");
        assert_eq!(ErrorCode::EncodeFailure.as_str(), "ENCODE_FAILURE");
        assert_eq!(ErrorCode::CapabilityUnavailable.as_str(), "CAPABILITY_UNAVAILABLE");
        assert_eq!(ErrorCode::OutputWriteFailed.as_str(), "OUTPUT_WRITE_FAILED");
    }

    #[test]
    fn error_code_recovery_hints_not_empty() {
        assert!(!ErrorCode::InvalidParameter.recovery_hint().is_empty());
        assert!(!ErrorCode::EncodeFailure.recovery_hint().is_empty());
        assert!(!ErrorCode::CapabilityUnavailable.recovery_hint().is_empty());
        assert!(!ErrorCode::OutputWriteFailed.recovery_hint().is_empty());
    }

    #[test]
    fn generation_error_display() {
        let err = GenerationError::invalid_parameter("width 50 is below 100");
        assert!(err.to_string().contains("INVALID_PARAMETER"));
        assert!(err.to_string().contains("width 50"));
        assert!(err.to_string().contains("Recovery:"));
    }

    #[test]
    fn encode_failure_names_context() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "buffer too small");
        let err = GenerationError::encode_failure("jpeg 800x600", io);
        assert_eq!(err.code, ErrorCode::EncodeFailure);
        assert!(err.message.starts_with("Encoding jpeg 800x600 failed"));
        assert!(err.message.contains("buffer too small"));
        assert!(err.source().is_some());
    }

    #[test]
    fn write_failure_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = GenerationError::output_write_failed("/tmp/x.jpg", io);
        assert_eq!(err.code, ErrorCode::OutputWriteFailed);
        assert!(err.source().is_some());
    }
}
