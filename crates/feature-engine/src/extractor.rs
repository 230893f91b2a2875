//! Feature Extraction Pipeline
//!
//! Log text → parse → assemble → post-process, for one variant.

use crate::assembler::ResultAssembler;
use crate::config::ExtractorConfig;
use crate::error::ExtractionError;
use crate::result::FeatureResult;
use crate::variant::{variant_for_type, ExtractorVariant};
use feature_log::LogParser;
use tracing::{debug, info};

/// Turns completed tool logs into results for one variant
///
/// Holds no per-run state, so one extractor can serve many assets
/// concurrently.
pub struct FeatureExtractor {
    variant: Box<dyn ExtractorVariant>,
    parser: LogParser,
    assembler: ResultAssembler,
}

impl FeatureExtractor {
    /// Create an extractor for a variant
    pub fn new(
        variant: Box<dyn ExtractorVariant>,
        config: &ExtractorConfig,
    ) -> Result<Self, ExtractionError> {
        let grammar = variant.grammar()?;
        let assembler = ResultAssembler::new(variant.identity(), grammar.channels().to_vec());
        let parser = LogParser::new(grammar).with_strict(config.strict);

        info!(
            "Created feature extractor {} (strict = {})",
            variant.identity(),
            config.strict
        );

        Ok(Self {
            variant,
            parser,
            assembler,
        })
    }

    /// Create an extractor for a built-in variant by type string
    pub fn for_type(extractor_type: &str, config: &ExtractorConfig) -> Result<Self, ExtractionError> {
        Self::new(variant_for_type(extractor_type, config)?, config)
    }

    pub fn variant(&self) -> &dyn ExtractorVariant {
        self.variant.as_ref()
    }

    /// Extract the result for one asset from its completed log
    pub fn extract(&self, asset_id: &str, log_text: &str) -> Result<FeatureResult, ExtractionError> {
        let parsed = self.parser.parse(log_text)?;
        debug!(
            "{}: {} lines read, {} skipped",
            self.assembler.identity(),
            parsed.lines_read,
            parsed.lines_skipped
        );

        let mut result = self.assembler.assemble(asset_id, parsed.into_channels())?;
        self.variant.post_process(&mut result)?;

        info!(
            "Extracted {} frames from asset {} with {}",
            result.frame_count(),
            asset_id,
            result.identity
        );
        Ok(result)
    }
}
