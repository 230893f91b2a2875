//! Extractor Variants
//!
//! Each variant supplies the channels its tool writes, the grammar of its
//! log, and an optional post-processing step.

use crate::config::ExtractorConfig;
use crate::error::ExtractionError;
use crate::identity::ExtractorIdentity;
use crate::postprocess::{apply_ratio, apply_variance};
use crate::result::FeatureResult;
use feature_log::{LineGrammar, LogError, SectionHeader, Stream, TagRule};
use tracing::info;

/// Capabilities of one feature extractor variant
pub trait ExtractorVariant: Send + Sync {
    /// Type and version namespacing every output key
    fn identity(&self) -> ExtractorIdentity;

    /// Raw channels the tool writes; the first one anchors the length check
    fn raw_channels(&self) -> &'static [&'static str];

    /// Grammar of the tool's log
    fn grammar(&self) -> Result<LineGrammar, LogError> {
        LineGrammar::direct(self.raw_channels())
    }

    /// Derive composite features after assembly
    fn post_process(&self, _result: &mut FeatureResult) -> Result<(), ExtractionError> {
        Ok(())
    }
}

/// Elementary VMAF features (VIF, ADM, ANSNR, motion and their terms)
#[derive(Debug, Clone)]
pub struct VmafFeature {
    adm_constant: f64,
}

impl VmafFeature {
    pub const TYPE: &'static str = "VMAF_feature";
    pub const VERSION: &'static str = "0.2";
    const CHANNELS: &'static [&'static str] = &[
        "vif", "adm", "ansnr", "motion", "vif_num", "vif_den", "adm_num", "adm_den", "anpsnr",
    ];

    pub fn new(adm_constant: f64) -> Self {
        Self { adm_constant }
    }

    pub fn adm_constant(&self) -> f64 {
        self.adm_constant
    }
}

impl ExtractorVariant for VmafFeature {
    fn identity(&self) -> ExtractorIdentity {
        ExtractorIdentity::new(Self::TYPE, Self::VERSION)
    }

    fn raw_channels(&self) -> &'static [&'static str] {
        Self::CHANNELS
    }

    /// Replaces the tool's `adm` with `(adm_num + K) / (adm_den + K)`
    fn post_process(&self, result: &mut FeatureResult) -> Result<(), ExtractionError> {
        apply_ratio(result, "adm", "adm_num", "adm_den", self.adm_constant)
    }
}

/// Per-frame PSNR
#[derive(Debug, Clone, Default)]
pub struct PsnrFeature;

impl PsnrFeature {
    pub const TYPE: &'static str = "PSNR_feature";
    pub const VERSION: &'static str = "1.0";
}

impl ExtractorVariant for PsnrFeature {
    fn identity(&self) -> ExtractorIdentity {
        ExtractorIdentity::new(Self::TYPE, Self::VERSION)
    }

    fn raw_channels(&self) -> &'static [&'static str] {
        &["psnr"]
    }
}

/// First and second pixel moments of the reference and distorted streams
#[derive(Debug, Clone, Default)]
pub struct MomentFeature;

impl MomentFeature {
    pub const TYPE: &'static str = "Moment_feature";
    pub const VERSION: &'static str = "1.0";
    pub const REF_HEADER: &'static str = "=== ref: ===";
    pub const DIS_HEADER: &'static str = "=== dis: ===";
}

impl ExtractorVariant for MomentFeature {
    fn identity(&self) -> ExtractorIdentity {
        ExtractorIdentity::new(Self::TYPE, Self::VERSION)
    }

    fn raw_channels(&self) -> &'static [&'static str] {
        &["ref1st", "ref2nd", "dis1st", "dis2nd"]
    }

    fn grammar(&self) -> Result<LineGrammar, LogError> {
        LineGrammar::new(
            self.raw_channels().iter().map(|c| c.to_string()).collect(),
            vec![
                TagRule::per_stream("1stmoment", "1st"),
                TagRule::per_stream("2ndmoment", "2nd"),
            ],
            vec![
                SectionHeader::new(Self::REF_HEADER, Stream::Reference),
                SectionHeader::new(Self::DIS_HEADER, Stream::Distorted),
            ],
        )
    }

    /// Adds `refvar` and `disvar`
    fn post_process(&self, result: &mut FeatureResult) -> Result<(), ExtractionError> {
        apply_variance(result, Stream::Reference)?;
        apply_variance(result, Stream::Distorted)
    }
}

/// Types of all built-in variants
pub const VARIANT_TYPES: [&str; 3] = [VmafFeature::TYPE, PsnrFeature::TYPE, MomentFeature::TYPE];

/// Look up a built-in variant by its type string
pub fn variant_for_type(
    extractor_type: &str,
    config: &ExtractorConfig,
) -> Result<Box<dyn ExtractorVariant>, ExtractionError> {
    let variant: Box<dyn ExtractorVariant> = match extractor_type {
        VmafFeature::TYPE => Box::new(VmafFeature::new(config.adm_constant)),
        PsnrFeature::TYPE => Box::new(PsnrFeature),
        MomentFeature::TYPE => Box::new(MomentFeature),
        other => return Err(ExtractionError::UnknownVariant(other.to_string())),
    };
    info!("Selected extractor {}", variant.identity());
    Ok(variant)
}
