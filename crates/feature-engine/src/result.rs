//! Assembled Feature Result

use crate::identity::ExtractorIdentity;
use crate::summary::ScoreSummary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-frame scores of one extractor run on one asset
///
/// Every sequence has the same non-zero length. Instances come out of
/// [`ResultAssembler`](crate::ResultAssembler), which enforces that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureResult {
    /// Opaque asset identifier, passed through
    pub asset_id: String,
    /// Extractor that produced the scores
    pub identity: ExtractorIdentity,
    scores: BTreeMap<String, Vec<f64>>,
}

impl FeatureResult {
    pub(crate) fn new(
        asset_id: impl Into<String>,
        identity: ExtractorIdentity,
        scores: BTreeMap<String, Vec<f64>>,
    ) -> Self {
        Self {
            asset_id: asset_id.into(),
            identity,
            scores,
        }
    }

    /// Per-frame scores of a feature
    pub fn scores(&self, feature: &str) -> Option<&[f64]> {
        self.scores_by_key(&self.identity.scores_key(feature))
    }

    /// Per-frame scores under a full score key
    pub fn scores_by_key(&self, key: &str) -> Option<&[f64]> {
        self.scores.get(key).map(Vec::as_slice)
    }

    /// All score keys, sorted
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.scores.keys().map(String::as_str)
    }

    pub fn all_scores(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.scores
    }

    /// Number of frames measured
    pub fn frame_count(&self) -> usize {
        self.scores.values().next().map_or(0, Vec::len)
    }

    pub fn executor_id(&self) -> String {
        self.identity.executor_id()
    }

    /// Add or replace a derived feature
    pub(crate) fn set_scores(&mut self, feature: &str, values: Vec<f64>) {
        debug_assert_eq!(values.len(), self.frame_count());
        self.scores.insert(self.identity.scores_key(feature), values);
    }

    /// Summary statistics per feature name
    pub fn summaries(&self) -> BTreeMap<String, ScoreSummary> {
        self.scores
            .iter()
            .filter_map(|(key, values)| {
                let feature = self.identity.feature_of(key)?;
                Some((feature.to_string(), ScoreSummary::compute(values)))
            })
            .collect()
    }

    /// Mean of each feature under its `_score` key
    pub fn aggregate_scores(&self) -> BTreeMap<String, f64> {
        self.summaries()
            .into_iter()
            .map(|(feature, summary)| (self.identity.score_key(&feature), summary.mean))
            .collect()
    }
}
