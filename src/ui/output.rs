use crate::error::{Pdf2TxtError, UserFriendlyError};
use crate::extractor::{Extraction, END_MARKER, START_MARKER};
use crate::tool::InstallReport;
use console::{style, Emoji, Term};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static PAGE: Emoji = Emoji("📄 ", "> ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => eprintln!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", PAGE, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    pub fn print_user_friendly_error(&self, error: &Pdf2TxtError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    eprintln!();
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    /// Prints the extracted text framed by the marker lines, then the character count.
    /// The text itself is printed even in quiet mode.
    pub fn print_extraction(&self, extraction: &Extraction) {
        match self.mode {
            OutputMode::Human | OutputMode::Plain => {
                println!("{}", START_MARKER);
                println!("{}", extraction.text);
                println!("{}", END_MARKER);
                if !self.quiet {
                    println!();
                    let total = format!("Total: {} characters extracted", extraction.char_count());
                    if self.use_colors {
                        println!("{}", style(total).cyan());
                    } else {
                        println!("{}", total);
                    }
                    if self.verbose_level > 0 {
                        println!("  Time taken: {}", format_duration(extraction.duration));
                    }
                }
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "extraction",
                    "file": extraction.source.display().to_string(),
                    "tool": extraction.tool_path.display().to_string(),
                    "language": extraction.options.language,
                    "dpi": extraction.options.dpi,
                    "characters": extraction.char_count(),
                    "duration_ms": extraction.duration.as_millis() as u64,
                    "text": extraction.text,
                    "timestamp": chrono::Utc::now().to_rfc3339()
                }));
            }
        }
    }

    pub fn print_install_report(&self, report: &InstallReport) {
        match self.mode {
            OutputMode::Human => {
                if report.has_warnings() {
                    self.warning("Installation completed with warnings");
                } else {
                    self.success("Installation succeeded");
                }
                self.success(&format!(
                    "Executable installed in: {}",
                    report.installed_path.display()
                ));
                self.info(&format!(
                    "Copied {} from {}",
                    format_bytes(report.bytes_copied),
                    report.source_path.display()
                ));
                for sidecar in &report.sidecars_copied {
                    self.info(&format!("Copied dependency {}", sidecar));
                }
                for warning in &report.warnings {
                    self.warning(warning);
                }
                if !self.quiet {
                    println!();
                    println!("The extractor can now be used from any application.");
                }
            }
            OutputMode::Json => {
                let value = serde_json::to_value(report).unwrap_or_default();
                self.print_json_object(&serde_json::json!({
                    "type": "install",
                    "report": value,
                    "timestamp": chrono::Utc::now().to_rfc3339()
                }));
            }
            OutputMode::Plain => {
                println!("INSTALLED: {}", report.installed_path.display());
                println!("Source: {}", report.source_path.display());
                println!("Bytes: {}", report.bytes_copied);
                for sidecar in &report.sidecars_copied {
                    println!("Dependency: {}", sidecar);
                }
                for warning in &report.warnings {
                    eprintln!("WARNING: {}", warning);
                }
            }
        }
    }

    pub fn print_tool_location(&self, path: &Path, user_space: bool) {
        let origin = if user_space { "user space install" } else { "located" };
        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}{} ({})", CHECKMARK, style(path.display()).green().bold(), origin);
                } else {
                    println!("{} ({})", path.display(), origin);
                }
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "location",
                    "path": path.display().to_string(),
                    "user_space": user_space
                }));
            }
            OutputMode::Plain => println!("{}", path.display()),
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        let to_stderr = matches!(msg_type, MessageType::Error | MessageType::Warning);

        if self.use_colors {
            if to_stderr {
                eprintln!("{}{}", emoji, color_fn(message));
            } else {
                println!("{}{}", emoji, color_fn(message));
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            if to_stderr {
                eprintln!("{} {}", prefix, message);
            } else {
                println!("{} {}", prefix, message);
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}
