use crate::tool::SearchReport;
use std::path::PathBuf;
use thiserror::Error;

/// Numbered remediation steps appended when extraction cannot find the tool.
pub const INSTALL_GUIDANCE: &str = "To fix this:\n\
    1. Install the extractor with `mypdf2txt --install` (or call mypdf2txt::install())\n\
    2. Or set the MYPDF2TXT_EXTRACTOR_PATH environment variable to the executable\n\
    3. Or see the installation section of the README: https://github.com/xavier268/mypdf2txt#installation";

#[derive(Error, Debug)]
pub enum Pdf2TxtError {
    #[error("This operation is only available on Windows (running on {os})")]
    UnsupportedPlatform { os: String },

    #[error("File does not exist: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("Extractor source executable not found. Searched: {}", display_paths(.searched))]
    SourceNotFound { searched: Vec<PathBuf> },

    #[error("Unable to resolve absolute path for {}: {source}", .path.display())]
    PathResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Local application data directory is not available for the current user")]
    UserDataDirUnavailable,

    #[error("{report}")]
    ToolNotFound { report: SearchReport },

    #[error("Unable to find the PdfTextExtractor executable: {source}\n\n{}", INSTALL_GUIDANCE)]
    ToolUnavailable {
        #[source]
        source: Box<Pdf2TxtError>,
    },

    #[error("Error while running {}: {reason}\nOutput: {output}", .tool.display())]
    Execution {
        tool: PathBuf,
        reason: String,
        output: String,
    },

    #[error("Cannot read the extractor to install from {}: {source}", .path.display())]
    InstallSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot install to {}: {source}", .path.display())]
    InstallDestination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),
}

impl Pdf2TxtError {
    /// Wraps a locator failure with installation guidance for callers of the invoker.
    pub fn with_install_guidance(self) -> Self {
        match self {
            err @ Pdf2TxtError::ToolNotFound { .. } => Pdf2TxtError::ToolUnavailable {
                source: Box::new(err),
            },
            other => other,
        }
    }

    pub fn is_tool_not_found(&self) -> bool {
        matches!(
            self,
            Pdf2TxtError::ToolNotFound { .. } | Pdf2TxtError::ToolUnavailable { .. }
        )
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for Pdf2TxtError {
    fn user_message(&self) -> String {
        match self {
            Pdf2TxtError::UnsupportedPlatform { os } => {
                format!("PdfTextExtractor only runs on Windows, not on {}", os)
            }
            Pdf2TxtError::FileNotFound { path } => {
                format!("File does not exist: {}", path.display())
            }
            Pdf2TxtError::SourceNotFound { searched } => {
                format!(
                    "Could not find the extractor to install (searched: {})",
                    display_paths(searched)
                )
            }
            Pdf2TxtError::UserDataDirUnavailable => {
                "Could not determine the local application data directory".to_string()
            }
            Pdf2TxtError::InstallDestination { path, source } => {
                format!("Installation to {} failed: {}", path.display(), source)
            }
            Pdf2TxtError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Pdf2TxtError::SourceNotFound { .. } => Some(
                "Pass the executable path explicitly or build it first with 'powershell.exe -ExecutionPolicy Bypass -File tools/build.ps1'".to_string()
            ),
            Pdf2TxtError::UserDataDirUnavailable => Some(
                "Make sure the LOCALAPPDATA environment variable is defined.".to_string()
            ),
            Pdf2TxtError::InstallSource { .. } => Some(
                "Point --install at the PdfTextExtractor.exe file itself, not at its directory.".to_string()
            ),
            Pdf2TxtError::InstallDestination { .. } => Some(
                "Ensure you have write permissions for the local application data directory.".to_string()
            ),
            Pdf2TxtError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all values are valid.".to_string()
            ),
            Pdf2TxtError::Execution { .. } => Some(
                "The output above comes from PdfTextExtractor itself; check that the PDF opens and the OCR language is installed.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for Pdf2TxtError {
    fn from(error: toml::de::Error) -> Self {
        Pdf2TxtError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Pdf2TxtError>;

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> SearchReport {
        SearchReport {
            executable_name: "PdfTextExtractor.exe".to_string(),
            override_var: "MYPDF2TXT_EXTRACTOR_PATH".to_string(),
            override_value: None,
            user_space_path: Some(PathBuf::from("/data/mypdf2txt/bin/PdfTextExtractor.exe")),
            candidates: vec![PathBuf::from("/work/bin/PdfTextExtractor.exe")],
        }
    }

    #[test]
    fn test_user_friendly_messages() {
        let error = Pdf2TxtError::SourceNotFound {
            searched: vec![PathBuf::from("bin/PdfTextExtractor.exe")],
        };
        assert!(error.user_message().contains("bin/PdfTextExtractor.exe"));
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_install_guidance_wraps_tool_not_found() {
        let error = Pdf2TxtError::ToolNotFound {
            report: sample_report(),
        }
        .with_install_guidance();

        assert!(matches!(error, Pdf2TxtError::ToolUnavailable { .. }));
        assert!(error.is_tool_not_found());

        let text = error.to_string();
        assert!(text.contains("MYPDF2TXT_EXTRACTOR_PATH"));
        assert!(text.contains("--install"));
        assert!(text.contains("/data/mypdf2txt/bin/PdfTextExtractor.exe"));
        assert!(text.contains("/work/bin/PdfTextExtractor.exe"));
    }

    #[test]
    fn test_install_guidance_leaves_other_errors_alone() {
        let error = Pdf2TxtError::FileNotFound {
            path: PathBuf::from("missing.pdf"),
        }
        .with_install_guidance();
        assert!(matches!(error, Pdf2TxtError::FileNotFound { .. }));
    }

    #[test]
    fn test_execution_error_embeds_output() {
        let error = Pdf2TxtError::Execution {
            tool: PathBuf::from("PdfTextExtractor.exe"),
            reason: "exit code 1".to_string(),
            output: "Erreur: System.Exception at Main()".to_string(),
        };
        let text = error.to_string();
        assert!(text.contains("exit code 1"));
        assert!(text.contains("System.Exception at Main()"));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_error = toml::from_str::<toml::Value>("not = [valid").unwrap_err();
        let error = Pdf2TxtError::from(toml_error);
        assert!(matches!(error, Pdf2TxtError::Config { .. }));
    }
}
