//! Result Assembly and Length Validation

use crate::error::ExtractionError;
use crate::identity::ExtractorIdentity;
use crate::result::FeatureResult;
use std::collections::BTreeMap;
use tracing::warn;

/// Validates parsed channels and binds them to score keys
#[derive(Debug, Clone)]
pub struct ResultAssembler {
    identity: ExtractorIdentity,
    channels: Vec<String>,
}

impl ResultAssembler {
    /// `channels` is the variant's declared raw channel list, in order
    pub fn new(identity: ExtractorIdentity, channels: Vec<String>) -> Self {
        Self { identity, channels }
    }

    pub fn identity(&self) -> &ExtractorIdentity {
        &self.identity
    }

    /// Build a result from parsed channels
    ///
    /// Channels not in the declared list are dropped.
    pub fn assemble(
        &self,
        asset_id: &str,
        mut parsed: BTreeMap<String, Vec<f64>>,
    ) -> Result<FeatureResult, ExtractionError> {
        let mut declared = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            let values = parsed
                .remove(channel)
                .ok_or_else(|| ExtractionError::MissingChannel(channel.clone()))?;
            declared.push((channel, values));
        }

        let Some((first, first_values)) = declared.first() else {
            return Err(ExtractionError::EmptyResult {
                channel: String::new(),
            });
        };
        let expected = first_values.len();
        if expected == 0 {
            warn!("{}: no scores parsed for asset {}", self.identity, asset_id);
            return Err(ExtractionError::EmptyResult {
                channel: (*first).clone(),
            });
        }

        for (channel, values) in &declared[1..] {
            if values.len() != expected {
                warn!(
                    "{}: channel '{}' has {} frames, expected {} (asset {})",
                    self.identity,
                    channel,
                    values.len(),
                    expected,
                    asset_id
                );
                return Err(ExtractionError::LengthMismatch {
                    channel: (*channel).clone(),
                    expected,
                    actual: values.len(),
                });
            }
        }

        let scores = declared
            .into_iter()
            .map(|(channel, values)| (self.identity.scores_key(channel), values))
            .collect();

        Ok(FeatureResult::new(asset_id, self.identity.clone(), scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assembler(channels: &[&str]) -> ResultAssembler {
        ResultAssembler::new(
            ExtractorIdentity::new("VMAF_feature", "0.2"),
            channels.iter().map(|c| c.to_string()).collect(),
        )
    }

    fn parsed(entries: &[(&str, Vec<f64>)]) -> BTreeMap<String, Vec<f64>> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_assemble_keys_every_channel() {
        let result = assembler(&["vif", "adm"])
            .assemble(
                "a1",
                parsed(&[("vif", vec![0.5, 0.6]), ("adm", vec![0.9, 0.8])]),
            )
            .unwrap();

        assert_eq!(result.asset_id, "a1");
        assert_eq!(result.frame_count(), 2);
        assert_eq!(
            result.scores_by_key("VMAF_feature_vif_scores"),
            Some(&[0.5, 0.6][..])
        );
        assert_eq!(
            result.scores_by_key("VMAF_feature_adm_scores"),
            Some(&[0.9, 0.8][..])
        );
    }

    #[test]
    fn test_missing_channel() {
        let err = assembler(&["vif", "adm"])
            .assemble("a1", parsed(&[("vif", vec![0.5])]))
            .unwrap_err();
        assert_eq!(err, ExtractionError::MissingChannel("adm".into()));
    }

    #[test]
    fn test_empty_first_channel() {
        let err = assembler(&["vif", "adm"])
            .assemble("a1", parsed(&[("vif", vec![]), ("adm", vec![])]))
            .unwrap_err();
        assert_eq!(
            err,
            ExtractionError::EmptyResult {
                channel: "vif".into()
            }
        );
    }

    #[test]
    fn test_length_mismatch_names_channel() {
        let err = assembler(&["vif", "adm", "motion"])
            .assemble(
                "a1",
                parsed(&[
                    ("vif", vec![1.0, 2.0]),
                    ("adm", vec![1.0, 2.0]),
                    ("motion", vec![1.0]),
                ]),
            )
            .unwrap_err();
        assert_eq!(
            err,
            ExtractionError::LengthMismatch {
                channel: "motion".into(),
                expected: 2,
                actual: 1
            }
        );
        assert!(err.to_string().contains("possibly corrupt"));
    }

    #[test]
    fn test_undeclared_channels_are_dropped() {
        let result = assembler(&["vif"])
            .assemble("a1", parsed(&[("vif", vec![1.0]), ("extra", vec![2.0, 3.0])]))
            .unwrap();
        assert_eq!(result.all_scores().len(), 1);
    }

    proptest! {
        #[test]
        fn prop_one_empty_channel_fails(
            len in 1usize..16,
            empty in 0usize..3,
        ) {
            let names = ["vif", "adm", "motion"];
            let entries: Vec<(&str, Vec<f64>)> = names
                .iter()
                .enumerate()
                .map(|(i, n)| (*n, if i == empty { vec![] } else { vec![1.0; len] }))
                .collect();
            let result = assembler(&names).assemble("a", parsed(&entries));
            prop_assert!(result.is_err());
        }

        #[test]
        fn prop_assembled_lengths_are_equal(len in 1usize..32) {
            let names = ["vif", "adm", "motion"];
            let entries: Vec<(&str, Vec<f64>)> =
                names.iter().map(|n| (*n, vec![0.25; len])).collect();
            let result = assembler(&names).assemble("a", parsed(&entries)).unwrap();
            prop_assert!(result.all_scores().values().all(|v| v.len() == len));
        }
    }
}
