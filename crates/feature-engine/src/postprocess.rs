//! Post-Processing of Assembled Results
//!
//! Derives composite features from raw ones and merges them into the
//! result. Runs only after assembly has validated lengths.

use crate::error::ExtractionError;
use crate::result::FeatureResult;
use crate::transform::{ratio_with_constant, variance_from_moments};
use feature_log::Stream;
use tracing::debug;

fn feature<'a>(result: &'a FeatureResult, name: &str) -> Result<&'a [f64], ExtractionError> {
    result
        .scores(name)
        .ok_or_else(|| ExtractionError::MissingChannel(name.to_string()))
}

/// Write `(num + constant) / (den + constant)` into `target`
pub fn apply_ratio(
    result: &mut FeatureResult,
    target: &str,
    num: &str,
    den: &str,
    constant: f64,
) -> Result<(), ExtractionError> {
    let derived = ratio_with_constant(feature(result, num)?, feature(result, den)?, constant)
        .map_err(|source| ExtractionError::Numeric {
            channel: target.to_string(),
            source,
        })?;
    debug!("Derived '{}' from {}/{} (K = {})", target, num, den, constant);
    result.set_scores(target, derived);
    Ok(())
}

/// Write `{prefix}var` from `{prefix}1st` and `{prefix}2nd` for one stream
pub fn apply_variance(result: &mut FeatureResult, stream: Stream) -> Result<(), ExtractionError> {
    let prefix = stream.prefix();
    let target = format!("{}var", prefix);
    let first = feature(result, &format!("{}1st", prefix))?;
    let second = feature(result, &format!("{}2nd", prefix))?;
    let derived = variance_from_moments(first, second).map_err(|source| {
        ExtractionError::Numeric {
            channel: target.clone(),
            source,
        }
    })?;
    debug!("Derived '{}' from moments", target);
    result.set_scores(&target, derived);
    Ok(())
}
