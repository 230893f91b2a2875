//! Feature Log Parsing
//!
//! Line grammars and index-checked parsing of the per-frame score logs
//! written by external feature extraction tools.

mod error;
mod grammar;
mod parser;

pub use error::LogError;
pub use grammar::{ChannelTarget, LineGrammar, ParserState, SectionHeader, Stream, TagRule};
pub use parser::{LogParser, ParsedLog};
