use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::Path;

pub const DEFAULT_LANGUAGE: &str = "fr-FR";
pub const DEFAULT_DPI: u32 = 300;

/// OCR settings forwarded verbatim to PdfTextExtractor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExtractionOptions {
    /// BCP-47 language tag used by the OCR engine, e.g. "fr-FR" or "en-US".
    pub language: String,
    /// Resolution used to render each page before OCR.
    pub dpi: u32,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            dpi: DEFAULT_DPI,
        }
    }
}

impl ExtractionOptions {
    pub fn new<S: Into<String>>(language: S, dpi: u32) -> Self {
        Self {
            language: language.into(),
            dpi,
        }
    }

    /// `<pdf> <language> <dpi>`, the positional arguments the tool expects.
    pub fn to_args(&self, pdf_path: &Path) -> Vec<OsString> {
        vec![
            pdf_path.as_os_str().to_os_string(),
            OsString::from(&self.language),
            OsString::from(self.dpi.to_string()),
        ]
    }
}
