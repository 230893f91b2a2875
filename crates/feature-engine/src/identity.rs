//! Extractor identity and score key naming
//!
//! Keys are part of the published result contract: downstream consumers
//! locate and cache scores by them, so the formats below must not change.

use serde::{Deserialize, Serialize};
use std::fmt;

/// (type, version) pair naming one extractor variant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtractorIdentity {
    pub extractor_type: String,
    pub version: String,
}

impl ExtractorIdentity {
    pub fn new(extractor_type: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            extractor_type: extractor_type.into(),
            version: version.into(),
        }
    }

    /// Key of a per-frame sequence: `{type}_{feature}_scores`
    pub fn scores_key(&self, feature: &str) -> String {
        format!("{}_{}_scores", self.extractor_type, feature)
    }

    /// Key of a scalar aggregate: `{type}_{feature}_score`
    pub fn score_key(&self, feature: &str) -> String {
        format!("{}_{}_score", self.extractor_type, feature)
    }

    /// Feature name of a per-frame key produced by this identity
    pub fn feature_of<'a>(&self, scores_key: &'a str) -> Option<&'a str> {
        scores_key
            .strip_prefix(self.extractor_type.as_str())?
            .strip_prefix('_')?
            .strip_suffix("_scores")
    }

    /// Cross-run identity string, `{type}_V{version}`
    pub fn executor_id(&self) -> String {
        format!("{}_V{}", self.extractor_type, self.version)
    }
}

impl fmt::Display for ExtractorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.executor_id())
    }
}
