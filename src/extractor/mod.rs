pub mod options;
pub mod output_parser;
pub mod runner;
pub mod text_extractor;

pub use options::{ExtractionOptions, DEFAULT_DPI, DEFAULT_LANGUAGE};
pub use output_parser::{parse_marked_text, parse_output, MarkerMatch, ParsedOutput, END_MARKER, START_MARKER};
pub use runner::{ProcessRunner, ToolOutput, ToolRunner};
pub use text_extractor::{Extraction, TextExtractor};
