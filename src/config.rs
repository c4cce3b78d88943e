use crate::error::{Pdf2TxtError, Result};
use crate::extractor::{ExtractionOptions, DEFAULT_DPI, DEFAULT_LANGUAGE};
use crate::tool::{ToolLayout, PRODUCT_NAME};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub tool: ToolConfig,
    pub install: InstallConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub language: String,
    pub dpi: u32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Checked after the built-in relative search paths.
    pub extra_search_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct InstallConfig {
    pub source: Option<PathBuf>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            dpi: DEFAULT_DPI,
        }
    }
}

/// `<config dir>/mypdf2txt/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(PRODUCT_NAME).join("config.toml"))
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(Pdf2TxtError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| Pdf2TxtError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| Pdf2TxtError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["mypdf2txt.toml", ".mypdf2txt.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                if let Some(user_path) = user_config_path() {
                    if user_path.exists() {
                        return Self::load_from_file(user_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref language) = cli_args.language {
            self.extraction.language = language.clone();
        }

        if let Some(dpi) = cli_args.dpi {
            self.extraction.dpi = dpi;
        }

        if let Some(ref source) = cli_args.install_source {
            self.install.source = Some(source.clone());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.extraction.language.trim().is_empty() {
            return Err(Pdf2TxtError::Config {
                message: "OCR language must not be empty".to_string(),
            });
        }

        if self.extraction.dpi == 0 {
            return Err(Pdf2TxtError::Config {
                message: "DPI must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn extraction_options(&self) -> ExtractionOptions {
        ExtractionOptions::new(self.extraction.language.clone(), self.extraction.dpi)
    }

    pub fn tool_layout(&self) -> ToolLayout {
        ToolLayout::default().with_extra_search_paths(self.tool.extra_search_paths.iter().cloned())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub language: Option<String>,
    pub dpi: Option<u32>,
    pub install_source: Option<PathBuf>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn with_dpi(mut self, dpi: Option<u32>) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn with_install_source(mut self, source: Option<PathBuf>) -> Self {
        self.install_source = source;
        self
    }
}
