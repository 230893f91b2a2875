//! Log Parsing Error Types

use thiserror::Error;

/// Errors raised while parsing a feature log
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LogError {
    /// Frame index out of sequence for a channel
    #[error("Corrupt log at line {line_number}: channel '{channel}' expected frame {expected}, found {found}")]
    CorruptLog {
        channel: String,
        expected: usize,
        found: usize,
        line_number: usize,
    },

    /// Sectioned data line before any section header
    #[error("Line {line_number}: '{tag}' data appears before any section header")]
    SectionNotSet { tag: String, line_number: usize },

    /// Numeric field that cannot be represented
    #[error("Line {line_number}: invalid number '{text}'")]
    InvalidNumber { text: String, line_number: usize },

    /// Non-matching line in strict mode
    #[error("Line {line_number}: unexpected content '{line}'")]
    UnexpectedLine { line: String, line_number: usize },

    /// Grammar definition is inconsistent
    #[error("Invalid grammar: {0}")]
    InvalidGrammar(String),
}
