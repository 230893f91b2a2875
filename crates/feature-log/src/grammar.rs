//! Line Grammar Definitions
//!
//! A grammar declares which raw channels a tool writes, how an indexed data
//! line's tag maps onto one of those channels, and which literal header
//! lines switch the parser between input streams.

use crate::error::LogError;
use regex::Regex;
use std::collections::HashMap;

/// `<tag>: <index> <value token>`, anchored at line start; content after the
/// value token is ignored
const DATA_LINE_PATTERN: &str = r"^([A-Za-z0-9_]+): ([0-9]+) (\S+)(?:\s|$)";

/// Whole-token decimal literal
const VALUE_PATTERN: &str = r"^[-+]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][-+]?[0-9]+)?$";

/// Input stream a sectioned block of log lines belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    /// Reference (pristine) video
    Reference,
    /// Distorted (encoded) video
    Distorted,
}

impl Stream {
    /// Channel name prefix for this stream
    pub fn prefix(&self) -> &'static str {
        match self {
            Stream::Reference => "ref",
            Stream::Distorted => "dis",
        }
    }
}

/// Parsing context switched by section headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserState {
    /// No header seen yet
    #[default]
    Unset,
    /// Inside the block for one stream
    Section(Stream),
}

/// Literal header line that switches the parser into a stream's section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeader {
    pub literal: String,
    pub stream: Stream,
}

impl SectionHeader {
    pub fn new(literal: impl Into<String>, stream: Stream) -> Self {
        Self {
            literal: literal.into(),
            stream,
        }
    }
}

/// Where values for a tag are stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelTarget {
    /// Always the named channel
    Fixed(String),
    /// `{stream prefix}{suffix}`, chosen by the current section
    PerStream { suffix: String },
}

impl ChannelTarget {
    fn resolve(&self, stream: Stream) -> String {
        match self {
            ChannelTarget::Fixed(channel) => channel.clone(),
            ChannelTarget::PerStream { suffix } => format!("{}{}", stream.prefix(), suffix),
        }
    }

    fn needs_section(&self) -> bool {
        matches!(self, ChannelTarget::PerStream { .. })
    }
}

/// Mapping from a line tag to its channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRule {
    pub tag: String,
    pub target: ChannelTarget,
}

impl TagRule {
    /// Tag stored under a channel of the same name
    pub fn fixed(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self {
            target: ChannelTarget::Fixed(tag.clone()),
            tag,
        }
    }

    /// Tag stored under `{stream prefix}{suffix}`
    pub fn per_stream(tag: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            target: ChannelTarget::PerStream {
                suffix: suffix.into(),
            },
        }
    }
}

/// Indexed data line recognised by a grammar
#[derive(Debug, Clone, Copy)]
pub(crate) struct DataLine<'a> {
    pub rule: &'a TagRule,
    pub index: &'a str,
    pub value: &'a str,
}

/// Recognised line shapes for one extractor variant
#[derive(Debug, Clone)]
pub struct LineGrammar {
    channels: Vec<String>,
    rules: Vec<TagRule>,
    rule_by_tag: HashMap<String, usize>,
    headers: Vec<SectionHeader>,
    data_line: Regex,
    value_shape: Regex,
}

impl LineGrammar {
    /// Build and validate a grammar
    pub fn new(
        channels: Vec<String>,
        rules: Vec<TagRule>,
        headers: Vec<SectionHeader>,
    ) -> Result<Self, LogError> {
        if channels.is_empty() {
            return Err(LogError::InvalidGrammar("no channels declared".into()));
        }
        for (i, channel) in channels.iter().enumerate() {
            if channels[..i].contains(channel) {
                return Err(LogError::InvalidGrammar(format!(
                    "channel '{}' declared twice",
                    channel
                )));
            }
        }
        for (i, header) in headers.iter().enumerate() {
            if header.literal.trim().is_empty() {
                return Err(LogError::InvalidGrammar("empty section header".into()));
            }
            if headers[..i].iter().any(|h| h.literal == header.literal) {
                return Err(LogError::InvalidGrammar(format!(
                    "duplicate section header '{}'",
                    header.literal
                )));
            }
        }

        let tag_shape = Regex::new(r"^[A-Za-z0-9_]+$")
            .map_err(|e| LogError::InvalidGrammar(e.to_string()))?;
        let mut rule_by_tag = HashMap::with_capacity(rules.len());

        for (idx, rule) in rules.iter().enumerate() {
            if !tag_shape.is_match(&rule.tag) {
                return Err(LogError::InvalidGrammar(format!(
                    "tag '{}' is not alphanumeric/underscore",
                    rule.tag
                )));
            }
            if rule_by_tag.insert(rule.tag.clone(), idx).is_some() {
                return Err(LogError::InvalidGrammar(format!(
                    "tag '{}' has more than one rule",
                    rule.tag
                )));
            }

            let targets: Vec<String> = match &rule.target {
                ChannelTarget::Fixed(channel) => vec![channel.clone()],
                ChannelTarget::PerStream { .. } => {
                    if headers.is_empty() {
                        return Err(LogError::InvalidGrammar(format!(
                            "tag '{}' is sectioned but the grammar has no section headers",
                            rule.tag
                        )));
                    }
                    headers.iter().map(|h| rule.target.resolve(h.stream)).collect()
                }
            };
            for target in targets {
                if !channels.contains(&target) {
                    return Err(LogError::InvalidGrammar(format!(
                        "tag '{}' targets undeclared channel '{}'",
                        rule.tag, target
                    )));
                }
            }
        }

        let data_line = Regex::new(DATA_LINE_PATTERN)
            .map_err(|e| LogError::InvalidGrammar(e.to_string()))?;
        let value_shape =
            Regex::new(VALUE_PATTERN).map_err(|e| LogError::InvalidGrammar(e.to_string()))?;

        Ok(Self {
            channels,
            rules,
            rule_by_tag,
            headers,
            data_line,
            value_shape,
        })
    }

    /// Section-less grammar whose tags are the channel names themselves
    pub fn direct(channels: &[&str]) -> Result<Self, LogError> {
        Self::new(
            channels.iter().map(|c| c.to_string()).collect(),
            channels.iter().map(|c| TagRule::fixed(*c)).collect(),
            Vec::new(),
        )
    }

    /// Declared raw channels, in declaration order
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn rules(&self) -> &[TagRule] {
        &self.rules
    }

    pub fn headers(&self) -> &[SectionHeader] {
        &self.headers
    }

    /// Whether the grammar switches context on header lines
    pub fn is_sectioned(&self) -> bool {
        !self.headers.is_empty()
    }

    /// Stream selected by a header line, if the line is one
    ///
    /// Surrounding whitespace and text after the literal are ignored.
    pub fn match_header(&self, line: &str) -> Option<Stream> {
        let line = line.trim();
        self.headers
            .iter()
            .find(|h| line.starts_with(h.literal.as_str()))
            .map(|h| h.stream)
    }

    /// Finite value of a whole decimal token
    pub(crate) fn parse_value(&self, token: &str) -> Option<f64> {
        if !self.value_shape.is_match(token) {
            return None;
        }
        token.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    pub(crate) fn match_data<'a>(&'a self, line: &'a str) -> Option<DataLine<'a>> {
        let caps = self.data_line.captures(line)?;
        let tag = caps.get(1)?.as_str();
        let rule = &self.rules[*self.rule_by_tag.get(tag)?];
        Some(DataLine {
            rule,
            index: caps.get(2)?.as_str(),
            value: caps.get(3)?.as_str(),
        })
    }

    /// Channel a rule writes to under the given state
    pub(crate) fn channel_for(&self, rule: &TagRule, state: ParserState) -> Option<String> {
        match state {
            ParserState::Section(stream) => Some(rule.target.resolve(stream)),
            ParserState::Unset if rule.target.needs_section() => None,
            // Fixed targets ignore the stream
            ParserState::Unset => Some(rule.target.resolve(Stream::Reference)),
        }
    }
}
