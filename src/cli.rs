use crate::config::{CliOverrides, Config};
use crate::error::Result;
use crate::ui::OutputMode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mypdf2txt")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract text from PDF files, scanned pages included")]
#[command(
    long_about = "mypdf2txt runs the native PdfTextExtractor tool (Windows PDF rendering + OCR) \
                  on a PDF file and prints the text it extracts."
)]
#[command(after_help = "EXAMPLES:\n  \
    mypdf2txt document.pdf\n  \
    mypdf2txt scan.pdf --language en-US --dpi 200\n  \
    mypdf2txt --install\n  \
    mypdf2txt --install tools/PdfTextExtractor/bin/Release/net8.0-windows10.0.19041.0/win-x64/publish/PdfTextExtractor.exe\n  \
    mypdf2txt --locate\n\n\
    The extractor is looked up in MYPDF2TXT_EXTRACTOR_PATH, then in the per-user install directory, \
    then in the development build directories.")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// PDF file to extract text from
    #[arg(required_unless_present_any = ["install", "locate", "generate_config"])]
    pub pdf_file: Option<PathBuf>,

    /// OCR language tag (e.g. fr-FR, en-US)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Rendering resolution used before OCR
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub dpi: Option<u32>,

    /// Install PdfTextExtractor into the per-user directory (source auto-detected when omitted)
    #[arg(long, value_name = "SOURCE")]
    pub install: Option<Option<PathBuf>>,

    /// Print where PdfTextExtractor is found, or every location checked
    #[arg(long, conflicts_with = "install")]
    pub locate: bool,

    /// Configuration file path
    #[arg(short, long, env = "MYPDF2TXT_CONFIG", help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl From<OutputFormat> for OutputMode {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        }
    }
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_language(self.language.clone())
            .with_dpi(self.dpi)
            .with_install_source(self.install.clone().flatten())
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_format.into()
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Default `RUST_LOG` filter for the current verbosity.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "mypdf2txt=error";
        }
        match self.verbose {
            0 => "mypdf2txt=warn",
            1 => "mypdf2txt=info",
            2 => "mypdf2txt=debug",
            _ => "mypdf2txt=trace",
        }
    }
}
