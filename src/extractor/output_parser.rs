//! Pulls the extracted text out of PdfTextExtractor's combined output.
//!
//! The tool prints its payload between two marker lines. Anything else on
//! the stream (progress, warnings, stack traces) is noise.

pub const START_MARKER: &str = "========== TEXTE EXTRAIT ==========";
pub const END_MARKER: &str = "===================================";

/// Which markers were found in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerMatch {
    Both,
    /// The payload runs to the end of the output and may include trailing
    /// diagnostics from the tool.
    StartOnly,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedOutput<'a> {
    pub text: &'a str,
    pub markers: MarkerMatch,
}

pub fn parse_output(raw: &str) -> ParsedOutput<'_> {
    let Some(start) = raw.find(START_MARKER) else {
        return ParsedOutput {
            text: raw.trim(),
            markers: MarkerMatch::None,
        };
    };

    let body = &raw[start + START_MARKER.len()..];
    match body.find(END_MARKER) {
        Some(end) => ParsedOutput {
            text: body[..end].trim(),
            markers: MarkerMatch::Both,
        },
        None => ParsedOutput {
            text: body.trim(),
            markers: MarkerMatch::StartOnly,
        },
    }
}

pub fn parse_marked_text(raw: &str) -> String {
    parse_output(raw).text.to_string()
}
