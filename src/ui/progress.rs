use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// Spinners for the blocking steps. Drawn on stderr so stdout stays clean
/// for the extracted text.
pub struct ProgressManager {
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        pb.set_message(message.to_string());
        pb
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new(true)
    }
}

/// A spinner tied to one named operation.
pub struct OperationProgress {
    progress_bar: ProgressBar,
    operation_name: String,
    start_time: Instant,
}

impl OperationProgress {
    pub fn new(progress_manager: &ProgressManager, operation_name: &str) -> Self {
        Self {
            progress_bar: progress_manager.create_spinner(operation_name),
            operation_name: operation_name.to_string(),
            start_time: Instant::now(),
        }
    }

    pub fn finish_with_message(&self, message: &str) {
        let final_message = format!(
            "{}: {} ({})",
            self.operation_name,
            message,
            format_duration(self.start_time.elapsed())
        );
        self.progress_bar.finish_with_message(final_message);
    }

    pub fn finish_success(&self) {
        self.finish_with_message("completed successfully");
    }

    /// Removes the spinner line; the error itself is reported by the caller.
    pub fn finish_error(&self) {
        self.progress_bar.finish_and_clear();
    }

    pub fn is_hidden(&self) -> bool {
        self.progress_bar.is_hidden()
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
