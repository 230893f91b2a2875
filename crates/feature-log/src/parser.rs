//! Index-Checked Log Parser

use crate::error::LogError;
use crate::grammar::{LineGrammar, ParserState};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Values collected for one channel plus the frame index expected next
#[derive(Debug, Default)]
struct ChannelAccumulator {
    values: Vec<f64>,
    next_index: usize,
}

impl ChannelAccumulator {
    fn push(
        &mut self,
        channel: &str,
        index: usize,
        value: f64,
        line_number: usize,
    ) -> Result<(), LogError> {
        if index != self.next_index {
            warn!(
                "Channel '{}' out of sequence at line {}: expected {}, found {}",
                channel, line_number, self.next_index, index
            );
            return Err(LogError::CorruptLog {
                channel: channel.to_string(),
                expected: self.next_index,
                found: index,
                line_number,
            });
        }
        self.values.push(value);
        self.next_index += 1;
        Ok(())
    }
}

/// Per-channel sequences read from one log
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLog {
    channels: BTreeMap<String, Vec<f64>>,
    /// Parser context after the last line
    pub final_state: ParserState,
    /// Number of lines read
    pub lines_read: usize,
    /// Number of lines that matched nothing
    pub lines_skipped: usize,
}

impl ParsedLog {
    /// Values of one channel; declared channels are always present
    pub fn channel(&self, name: &str) -> Option<&[f64]> {
        self.channels.get(name).map(Vec::as_slice)
    }

    pub fn channels(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.channels
    }

    pub fn into_channels(self) -> BTreeMap<String, Vec<f64>> {
        self.channels
    }
}

/// Parses log text against one grammar
#[derive(Debug, Clone)]
pub struct LogParser {
    grammar: LineGrammar,
    strict: bool,
}

impl LogParser {
    /// Create a tolerant parser
    pub fn new(grammar: LineGrammar) -> Self {
        Self {
            grammar,
            strict: false,
        }
    }

    /// Reject any non-blank line that matches nothing
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn grammar(&self) -> &LineGrammar {
        &self.grammar
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Parse a complete log
    pub fn parse(&self, text: &str) -> Result<ParsedLog, LogError> {
        let mut accumulators: BTreeMap<String, ChannelAccumulator> = self
            .grammar
            .channels()
            .iter()
            .map(|c| (c.clone(), ChannelAccumulator::default()))
            .collect();
        let mut state = ParserState::Unset;
        let mut lines_read = 0;
        let mut lines_skipped = 0;

        for (i, line) in text.lines().enumerate() {
            let line_number = i + 1;
            lines_read += 1;

            if let Some(stream) = self.grammar.match_header(line) {
                state = ParserState::Section(stream);
                continue;
            }

            let Some(data) = self.grammar.match_data(line) else {
                if self.strict && !line.trim().is_empty() {
                    return Err(LogError::UnexpectedLine {
                        line: line.to_string(),
                        line_number,
                    });
                }
                lines_skipped += 1;
                continue;
            };

            let channel = self.grammar.channel_for(data.rule, state).ok_or_else(|| {
                LogError::SectionNotSet {
                    tag: data.rule.tag.clone(),
                    line_number,
                }
            })?;
            let index: usize = data.index.parse().map_err(|_| LogError::InvalidNumber {
                text: data.index.to_string(),
                line_number,
            })?;
            let value = self
                .grammar
                .parse_value(data.value)
                .ok_or_else(|| LogError::InvalidNumber {
                    text: data.value.to_string(),
                    line_number,
                })?;

            let accumulator = accumulators.get_mut(&channel).ok_or_else(|| {
                LogError::InvalidGrammar(format!("channel '{}' is not declared", channel))
            })?;
            accumulator.push(&channel, index, value, line_number)?;
        }

        let channels: BTreeMap<String, Vec<f64>> = accumulators
            .into_iter()
            .map(|(name, acc)| (name, acc.values))
            .collect();

        debug!(
            "Parsed {} lines ({} skipped): {:?}",
            lines_read,
            lines_skipped,
            channels.iter().map(|(k, v)| (k.as_str(), v.len())).collect::<Vec<_>>()
        );

        Ok(ParsedLog {
            channels,
            final_state: state,
            lines_read,
            lines_skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{SectionHeader, Stream, TagRule};
    use proptest::prelude::*;

    fn moment_parser() -> LogParser {
        let grammar = LineGrammar::new(
            vec!["ref1st".into(), "ref2nd".into(), "dis1st".into(), "dis2nd".into()],
            vec![
                TagRule::per_stream("1stmoment", "1st"),
                TagRule::per_stream("2ndmoment", "2nd"),
            ],
            vec![
                SectionHeader::new("=== ref: ===", Stream::Reference),
                SectionHeader::new("=== dis: ===", Stream::Distorted),
            ],
        )
        .unwrap();
        LogParser::new(grammar)
    }

    fn psnr_parser() -> LogParser {
        LogParser::new(LineGrammar::direct(&["psnr"]).unwrap())
    }

    fn render(tag: &str, values: &[f64]) -> String {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{}: {} {:?}\n", tag, i, v))
            .collect()
    }

    #[test]
    fn test_parse_direct_channels() {
        let parser = LogParser::new(LineGrammar::direct(&["vif", "adm"]).unwrap());
        let log = "vif: 0 0.5\nadm: 0 0.9\nvif: 1 0.75\nadm: 1 1.0\n";
        let parsed = parser.parse(log).unwrap();

        assert_eq!(parsed.channel("vif"), Some(&[0.5, 0.75][..]));
        assert_eq!(parsed.channel("adm"), Some(&[0.9, 1.0][..]));
        assert_eq!(parsed.final_state, ParserState::Unset);
        assert_eq!(parsed.lines_read, 4);
        assert_eq!(parsed.lines_skipped, 0);
    }

    #[test]
    fn test_section_state_switching() {
        let log = "=== ref: ===\n1stmoment: 0 2.0\n2ndmoment: 0 5.0\n=== dis: ===\n1stmoment: 0 3.0\n2ndmoment: 0 10.0\n";
        let parsed = moment_parser().parse(log).unwrap();

        assert_eq!(parsed.channel("ref1st"), Some(&[2.0][..]));
        assert_eq!(parsed.channel("ref2nd"), Some(&[5.0][..]));
        assert_eq!(parsed.channel("dis1st"), Some(&[3.0][..]));
        assert_eq!(parsed.channel("dis2nd"), Some(&[10.0][..]));
        assert_eq!(parsed.final_state, ParserState::Section(Stream::Distorted));
    }

    #[test]
    fn test_data_before_section_is_rejected() {
        let err = moment_parser().parse("1stmoment: 0 2.0\n").unwrap_err();
        assert_eq!(
            err,
            LogError::SectionNotSet {
                tag: "1stmoment".into(),
                line_number: 1
            }
        );
    }

    #[test]
    fn test_gap_in_indices_is_corrupt() {
        let err = psnr_parser().parse("psnr: 0 30.0\npsnr: 2 31.0\n").unwrap_err();
        assert_eq!(
            err,
            LogError::CorruptLog {
                channel: "psnr".into(),
                expected: 1,
                found: 2,
                line_number: 2
            }
        );
    }

    #[test]
    fn test_doubly_appended_log_is_corrupt() {
        let once = "psnr: 0 30.0\npsnr: 1 31.0\n";
        let twice = format!("{}{}", once, once);
        let err = psnr_parser().parse(&twice).unwrap_err();
        assert!(matches!(
            err,
            LogError::CorruptLog { expected: 2, found: 0, .. }
        ));
    }

    #[test]
    fn test_channels_count_independently() {
        let parser = LogParser::new(LineGrammar::direct(&["vif", "adm"]).unwrap());
        let parsed = parser
            .parse("vif: 0 1.0\nvif: 1 1.0\nadm: 0 2.0\n")
            .unwrap();
        assert_eq!(parsed.channel("vif").map(<[f64]>::len), Some(2));
        assert_eq!(parsed.channel("adm").map(<[f64]>::len), Some(1));
    }

    #[test]
    fn test_declared_channels_present_when_empty() {
        let parsed = moment_parser().parse("nothing to see\n").unwrap();
        assert_eq!(parsed.channel("dis2nd"), Some(&[][..]));
        assert_eq!(parsed.lines_skipped, 1);
        assert_eq!(parsed.channel("other"), None);
    }

    #[test]
    fn test_index_overflow_is_invalid_number() {
        let err = psnr_parser()
            .parse("psnr: 99999999999999999999999999 1.0\n")
            .unwrap_err();
        assert!(matches!(err, LogError::InvalidNumber { line_number: 1, .. }));
    }

    #[test]
    fn test_malformed_value_tokens_are_invalid() {
        for (token, line) in [
            ("12.34.56", "psnr: 0 12.34.56"),
            ("30-5", "psnr: 0 30-5"),
            ("1e", "psnr: 0 1e"),
            ("7abc", "psnr: 0 7abc trailing"),
        ] {
            let err = psnr_parser().parse(&format!("psnr: 0 1.0\n{}\n", line.replace(": 0 ", ": 1 "))).unwrap_err();
            assert_eq!(
                err,
                LogError::InvalidNumber {
                    text: token.into(),
                    line_number: 2
                },
                "{}",
                line
            );
        }
    }

    #[test]
    fn test_overflowing_value_is_invalid() {
        let err = psnr_parser().parse("psnr: 0 1e999\n").unwrap_err();
        assert_eq!(
            err,
            LogError::InvalidNumber {
                text: "1e999".into(),
                line_number: 1
            }
        );
    }

    #[test]
    fn test_content_after_value_token_is_ignored() {
        let parsed = psnr_parser().parse("psnr: 0 42.0 trailing\npsnr: 1 43.5\tdone\n").unwrap();
        assert_eq!(parsed.channel("psnr"), Some(&[42.0, 43.5][..]));
    }

    #[test]
    fn test_header_with_surrounding_text() {
        let log = "  === ref: ===\n1stmoment: 0 2.0\n=== dis: === (second pass)\n1stmoment: 0 3.0\n";
        let parsed = moment_parser().parse(log).unwrap();
        assert_eq!(parsed.channel("ref1st"), Some(&[2.0][..]));
        assert_eq!(parsed.channel("dis1st"), Some(&[3.0][..]));
    }

    #[test]
    fn test_strict_mode() {
        let log = "psnr: 0 30.0\n\n./psnr yuv420p a.yuv b.yuv 576 324\npsnr: 1 31.0\n";

        let parsed = psnr_parser().parse(log).unwrap();
        assert_eq!(parsed.channel("psnr"), Some(&[30.0, 31.0][..]));

        let err = psnr_parser().with_strict(true).parse(log).unwrap_err();
        assert_eq!(
            err,
            LogError::UnexpectedLine {
                line: "./psnr yuv420p a.yuv b.yuv 576 324".into(),
                line_number: 3
            }
        );
    }

    #[test]
    fn test_crlf_line_endings() {
        let log = "=== ref: ===\r\n1stmoment: 0 2.0\r\n";
        let parsed = moment_parser().parse(log).unwrap();
        assert_eq!(parsed.channel("ref1st"), Some(&[2.0][..]));
    }

    proptest! {
        #[test]
        fn prop_round_trip(values in prop::collection::vec(-1.0e6f64..1.0e6, 1..64)) {
            let parsed = psnr_parser().parse(&render("psnr", &values)).unwrap();
            prop_assert_eq!(parsed.channel("psnr"), Some(values.as_slice()));
        }

        #[test]
        fn prop_non_contiguous_indices_fail(
            len in 2usize..32,
            swap in 0usize..31,
        ) {
            let swap = swap % (len - 1);
            let mut indices: Vec<usize> = (0..len).collect();
            indices.swap(swap, swap + 1);
            let log: String = indices
                .iter()
                .map(|i| format!("psnr: {} 1.0\n", i))
                .collect();
            let result = psnr_parser().parse(&log);
            let is_corrupt = matches!(result, Err(LogError::CorruptLog { .. }));
            prop_assert!(is_corrupt);
        }

        #[test]
        fn prop_skipped_index_fails(len in 1usize..32, skip in 1usize..4) {
            let log: String = (0..len)
                .map(|i| if i + 1 == len { i + skip } else { i })
                .map(|i| format!("psnr: {} 1.0\n", i))
                .collect();
            let result = psnr_parser().parse(&log);
            let is_corrupt = matches!(result, Err(LogError::CorruptLog { .. }));
            prop_assert!(is_corrupt);
        }

        #[test]
        fn prop_unmatched_lines_are_ignored(
            values in prop::collection::vec(-1.0e3f64..1.0e3, 1..16),
            noise in "[a-z ./=]{0,40}",
            at in 0usize..16,
        ) {
            let clean = render("psnr", &values);
            let mut lines: Vec<&str> = clean.lines().collect();
            let at = at % (lines.len() + 1);
            lines.insert(at, &noise);
            let noisy = lines.join("\n");

            let expected = psnr_parser().parse(&clean).unwrap();
            let actual = psnr_parser().parse(&noisy).unwrap();
            prop_assert_eq!(expected.channels(), actual.channels());
        }
    }
}
