//! Feature Result Engine
//!
//! Assembles per-frame scores parsed from feature extraction logs into
//! keyed results and derives composite features from them.

mod assembler;
mod config;
mod error;
mod extractor;
mod identity;
mod postprocess;
mod result;
mod summary;
mod transform;
mod variant;

pub use assembler::ResultAssembler;
pub use config::{ExtractorConfig, DEFAULT_ADM_CONSTANT};
pub use error::ExtractionError;
pub use extractor::FeatureExtractor;
pub use identity::ExtractorIdentity;
pub use postprocess::{apply_ratio, apply_variance};
pub use result::FeatureResult;
pub use summary::ScoreSummary;
pub use transform::{ratio_with_constant, variance_from_moments, NumericError};
pub use variant::{
    variant_for_type, ExtractorVariant, MomentFeature, PsnrFeature, VmafFeature, VARIANT_TYPES,
};
