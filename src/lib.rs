pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod tool;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, ExtractionConfig, InstallConfig, ToolConfig};
pub use error::{Pdf2TxtError, Result, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{
    parse_marked_text, Extraction, ExtractionOptions, ProcessRunner, TextExtractor, ToolOutput,
    ToolRunner,
};
pub use tool::{
    FileSystem, Host, InstallReport, Installer, RealFileSystem, SearchReport, ToolLayout,
    ToolLocator,
};
pub use ui::{OperationProgress, OutputFormatter, OutputMode, ProgressManager};

use std::path::{Path, PathBuf};

/// Extracts the text of `path` with the installed PdfTextExtractor.
///
/// `None` options means `fr-FR` at 300 DPI. Blocks until the tool exits.
pub fn extract_text<P: AsRef<Path>>(path: P, options: Option<&ExtractionOptions>) -> Result<String> {
    TextExtractor::new(Host::system()).extract_text(path.as_ref(), options)
}

/// Installs PdfTextExtractor into the per-user directory and returns its new path.
///
/// Without a source, the usual build output directories are probed.
pub fn install(source: Option<&Path>) -> Result<PathBuf> {
    Installer::new(Host::system())
        .install(source)
        .map(|report| report.installed_path)
}

/// `<local app data>/mypdf2txt/bin/PdfTextExtractor.exe`, whether or not it exists.
pub fn user_space_tool_path() -> Result<PathBuf> {
    ToolLayout::default().user_space_path(&Host::system())
}

/// Resolves the executable the way `extract_text` does.
pub fn locate_tool() -> Result<PathBuf> {
    ToolLocator::new(Host::system()).locate()
}

pub fn default_options() -> ExtractionOptions {
    ExtractionOptions::default()
}

/// Configured front end used by the binary.
pub struct Pdf2Txt {
    config: Config,
    host: Host,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl Pdf2Txt {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            host: Host::system(),
            output_formatter,
            progress_manager,
        }
    }

    pub fn with_host(mut self, host: Host) -> Self {
        self.host = host;
        self
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        Ok(Self::new(
            config,
            cli_args.output_mode(),
            cli_args.verbose,
            cli_args.quiet,
        ))
    }

    pub fn extract(&self, pdf_file: &Path) -> Result<Extraction> {
        self.extract_with_runner(pdf_file, ProcessRunner::new())
    }

    pub fn extract_with_runner<R: ToolRunner + 'static>(
        &self,
        pdf_file: &Path,
        runner: R,
    ) -> Result<Extraction> {
        self.output_formatter
            .start_operation(&format!("Extracting text from: {}", pdf_file.display()));

        let extractor = TextExtractor::new(self.host.clone())
            .with_layout(self.config.tool_layout())
            .with_runner(runner);
        let options = self.config.extraction_options();

        let progress = OperationProgress::new(&self.progress_manager, "Extracting text");
        let result = extractor.extract(pdf_file, Some(&options));
        match result {
            Ok(_) => progress.finish_success(),
            Err(_) => progress.finish_error(),
        }

        result
    }

    pub fn install(&self) -> Result<InstallReport> {
        self.output_formatter.start_operation("Installing PdfTextExtractor");

        Installer::new(self.host.clone())
            .with_layout(self.config.tool_layout())
            .install(self.config.install.source.as_deref())
    }

    pub fn locate(&self) -> Result<PathBuf> {
        self.locator().locate()
    }

    pub fn is_user_space_install(&self, path: &Path) -> bool {
        self.locator().is_user_space_install(path)
    }

    fn locator(&self) -> ToolLocator {
        ToolLocator::new(self.host.clone()).with_layout(self.config.tool_layout())
    }

    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn handle_error(&self, error: &Pdf2TxtError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
        build_date: option_env!("BUILD_DATE").unwrap_or("unknown"),
        target: std::env::consts::ARCH.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_date: &'static str,
    pub target: String,
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "mypdf2txt {} ({}) built on {} for {}",
            self.version, self.git_hash, self.build_date, self.target
        )
    }
}
