//! Extractor configuration

use serde::{Deserialize, Serialize};

/// Constant added to both ADM numerator and denominator
pub const DEFAULT_ADM_CONSTANT: f64 = 1000.0;

/// Extractor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Additive constant for the ADM ratio
    pub adm_constant: f64,

    /// Reject non-blank log lines that match no grammar rule
    pub strict: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            adm_constant: DEFAULT_ADM_CONSTANT,
            strict: false,
        }
    }
}
