//! Extraction Error Types

use crate::transform::NumericError;
use feature_log::LogError;
use thiserror::Error;

/// Errors that end one (asset, variant) extraction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
    /// Log text failed to parse
    #[error(transparent)]
    Log(#[from] LogError),

    /// Declared channel absent from the parsed channels
    #[error("Declared channel '{0}' missing from parsed log")]
    MissingChannel(String),

    /// Nothing matched the grammar
    #[error("No scores parsed for channel '{channel}'; log does not match the extractor grammar")]
    EmptyResult { channel: String },

    /// Channels disagree on frame count
    #[error("Channel '{channel}' has {actual} frames, expected {expected}. Feature data possibly corrupt; clean up the log and run again")]
    LengthMismatch {
        channel: String,
        expected: usize,
        actual: usize,
    },

    /// Derived channel would not be finite
    #[error("Cannot derive '{channel}': {source}")]
    Numeric {
        channel: String,
        #[source]
        source: NumericError,
    },

    /// No variant registered for this type
    #[error("Unknown extractor type: {0}")]
    UnknownVariant(String),
}
