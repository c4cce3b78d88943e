use crate::error::{Pdf2TxtError, Result};
use crate::extractor::output_parser::{parse_output, MarkerMatch};
use crate::extractor::{ExtractionOptions, ProcessRunner, ToolRunner};
use crate::tool::{Host, ToolLayout, ToolLocator};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of one extraction, with enough context for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub source: PathBuf,
    pub tool_path: PathBuf,
    pub options: ExtractionOptions,
    pub text: String,
    #[serde(skip)]
    pub markers: MarkerMatch,
    pub duration: Duration,
}

impl Extraction {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

pub struct TextExtractor {
    host: Host,
    layout: ToolLayout,
    runner: Arc<dyn ToolRunner>,
}

impl TextExtractor {
    pub fn new(host: Host) -> Self {
        Self {
            host,
            layout: ToolLayout::default(),
            runner: Arc::new(ProcessRunner::new()),
        }
    }

    pub fn with_layout(mut self, layout: ToolLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_runner<R: ToolRunner + 'static>(mut self, runner: R) -> Self {
        self.runner = Arc::new(runner);
        self
    }

    pub fn extract_text(&self, path: &Path, options: Option<&ExtractionOptions>) -> Result<String> {
        self.extract(path, options).map(|extraction| extraction.text)
    }

    pub fn extract(&self, path: &Path, options: Option<&ExtractionOptions>) -> Result<Extraction> {
        if !self.host.is_supported_platform() {
            return Err(Pdf2TxtError::UnsupportedPlatform {
                os: self.host.os().to_string(),
            });
        }

        if !self.host.fs().exists(path) {
            return Err(Pdf2TxtError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let options = options.cloned().unwrap_or_default();

        let source = self
            .host
            .absolute(path)
            .map_err(|e| Pdf2TxtError::PathResolution {
                path: path.to_path_buf(),
                source: e,
            })?;

        // Never cached: an install between two calls is picked up by the next one.
        let tool_path = ToolLocator::new(self.host.clone())
            .with_layout(self.layout.clone())
            .locate()
            .map_err(Pdf2TxtError::with_install_guidance)?;

        let args = options.to_args(&source);
        log::info!(
            "Running {} {}",
            tool_path.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let start = Instant::now();
        let output = self
            .runner
            .run(&tool_path, &args)
            .map_err(|e| Pdf2TxtError::Execution {
                tool: tool_path.clone(),
                reason: format!("failed to start: {}", e),
                output: String::new(),
            })?;
        let duration = start.elapsed();
        log::debug!(
            "{} finished with {} in {:?}",
            tool_path.display(),
            output.status_description(),
            duration
        );

        if !output.success {
            return Err(Pdf2TxtError::Execution {
                tool: tool_path,
                reason: output.status_description(),
                output: output.combined,
            });
        }

        let parsed = parse_output(&output.combined);
        match parsed.markers {
            MarkerMatch::Both => {}
            MarkerMatch::StartOnly => log::warn!(
                "End marker missing in output of {}; trailing tool diagnostics may be included in the text",
                tool_path.display()
            ),
            MarkerMatch::None => log::warn!(
                "No text markers in output of {}; returning the whole output",
                tool_path.display()
            ),
        }

        Ok(Extraction {
            text: parsed.text.to_string(),
            markers: parsed.markers,
            source,
            tool_path,
            options,
            duration,
        })
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(Host::system())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::output_parser::{END_MARKER, START_MARKER};
    use crate::extractor::ToolOutput;
    use crate::tool::host::testing::{windows_host, MemoryFileSystem};
    use crate::tool::OVERRIDE_ENV_VAR;
    use std::ffi::OsString;
    use std::io;
    use std::sync::Mutex;

    const TOOL: &str = "/home/user/AppData/Local/mypdf2txt/bin/PdfTextExtractor.exe";

    /// Records every call and answers with a canned output.
    struct SpyRunner {
        calls: Arc<Mutex<Vec<(PathBuf, Vec<OsString>)>>>,
        response: io::Result<ToolOutput>,
    }

    impl SpyRunner {
        fn replying(success: bool, code: i32, combined: &str) -> (Self, Arc<Mutex<Vec<(PathBuf, Vec<OsString>)>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            let runner = Self {
                calls: calls.clone(),
                response: Ok(ToolOutput {
                    success,
                    code: Some(code),
                    combined: combined.to_string(),
                }),
            };
            (runner, calls)
        }

        fn failing_to_spawn() -> (Self, Arc<Mutex<Vec<(PathBuf, Vec<OsString>)>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            let runner = Self {
                calls: calls.clone(),
                response: Err(io::Error::new(io::ErrorKind::PermissionDenied, "access denied")),
            };
            (runner, calls)
        }
    }

    impl ToolRunner for SpyRunner {
        fn run(&self, program: &Path, args: &[OsString]) -> io::Result<ToolOutput> {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_path_buf(), args.to_vec()));
            match &self.response {
                Ok(output) => Ok(output.clone()),
                Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
            }
        }
    }

    fn marked(text: &str) -> String {
        format!("Page 1/1...\n{}\n{}\n{}\n", START_MARKER, text, END_MARKER)
    }

    fn installed_fs() -> MemoryFileSystem {
        MemoryFileSystem::new("/work")
            .with_file(TOOL)
            .with_file("/work/docs/scan.pdf")
    }

    #[test]
    fn test_unsupported_platform_checked_first() {
        let (runner, calls) = SpyRunner::replying(true, 0, "");
        let extractor = TextExtractor::new(windows_host(installed_fs()).with_os("linux"))
            .with_runner(runner);

        let result = extractor.extract_text(Path::new("docs/scan.pdf"), None);
        assert!(matches!(result, Err(Pdf2TxtError::UnsupportedPlatform { ref os }) if os == "linux"));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_never_spawns_tool() {
        let (runner, calls) = SpyRunner::replying(true, 0, &marked("unused"));
        let extractor = TextExtractor::new(windows_host(installed_fs())).with_runner(runner);

        let result = extractor.extract_text(Path::new("docs/missing.pdf"), None);
        assert!(matches!(result, Err(Pdf2TxtError::FileNotFound { .. })));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_default_options_and_argument_list() {
        let (runner, calls) = SpyRunner::replying(true, 0, &marked("Bonjour"));
        let extractor = TextExtractor::new(windows_host(installed_fs())).with_runner(runner);

        let text = extractor.extract_text(Path::new("docs/scan.pdf"), None).unwrap();
        assert_eq!(text, "Bonjour");

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, PathBuf::from(TOOL));
        assert_eq!(
            calls[0].1,
            vec![
                OsString::from("/work/docs/scan.pdf"),
                OsString::from("fr-FR"),
                OsString::from("300"),
            ]
        );
    }

    #[test]
    fn test_custom_options_forwarded() {
        let (runner, calls) = SpyRunner::replying(true, 0, &marked("Hello"));
        let extractor = TextExtractor::new(windows_host(installed_fs())).with_runner(runner);
        let options = ExtractionOptions::new("en-US", 200);

        let extraction = extractor
            .extract(Path::new("/work/docs/scan.pdf"), Some(&options))
            .unwrap();
        assert_eq!(extraction.text, "Hello");
        assert_eq!(extraction.options, options);
        assert_eq!(extraction.markers, MarkerMatch::Both);
        assert_eq!(extraction.char_count(), 5);

        let calls = calls.lock().unwrap();
        assert_eq!(calls[0].1[1], OsString::from("en-US"));
        assert_eq!(calls[0].1[2], OsString::from("200"));
    }

    #[test]
    fn test_path_resolution_failure() {
        let fs = MemoryFileSystem::without_cwd()
            .with_file(TOOL)
            .with_file("scan.pdf");
        let (runner, calls) = SpyRunner::replying(true, 0, "");
        let extractor = TextExtractor::new(windows_host(fs)).with_runner(runner);

        let result = extractor.extract_text(Path::new("scan.pdf"), None);
        assert!(matches!(result, Err(Pdf2TxtError::PathResolution { .. })));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_tool_not_found_carries_guidance() {
        let fs = MemoryFileSystem::new("/work").with_file("/work/docs/scan.pdf");
        let (runner, calls) = SpyRunner::replying(true, 0, "");
        let extractor = TextExtractor::new(windows_host(fs)).with_runner(runner);

        let err = extractor
            .extract_text(Path::new("docs/scan.pdf"), None)
            .unwrap_err();
        assert!(matches!(err, Pdf2TxtError::ToolUnavailable { .. }));

        let text = err.to_string();
        assert!(text.contains(OVERRIDE_ENV_VAR));
        assert!(text.contains("--install"));
        assert!(text.contains(TOOL));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_override_variable_used_for_execution() {
        let fs = installed_fs().with_file("/opt/PdfTextExtractor.exe");
        let host = windows_host(fs)
            .with_env(|key| (key == OVERRIDE_ENV_VAR).then(|| "/opt/PdfTextExtractor.exe".to_string()));
        let (runner, calls) = SpyRunner::replying(true, 0, &marked("x"));

        TextExtractor::new(host)
            .with_runner(runner)
            .extract_text(Path::new("docs/scan.pdf"), None)
            .unwrap();
        assert_eq!(calls.lock().unwrap()[0].0, PathBuf::from("/opt/PdfTextExtractor.exe"));
    }

    #[test]
    fn test_non_zero_exit_includes_output() {
        let (runner, _) = SpyRunner::replying(
            false,
            1,
            "Erreur: Language fr-FR not available\n   at Program.Main()",
        );
        let extractor = TextExtractor::new(windows_host(installed_fs())).with_runner(runner);

        let err = extractor
            .extract_text(Path::new("docs/scan.pdf"), None)
            .unwrap_err();
        match &err {
            Pdf2TxtError::Execution { reason, output, .. } => {
                assert_eq!(reason, "exit code 1");
                assert!(output.contains("at Program.Main()"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("Language fr-FR not available"));
    }

    #[test]
    fn test_spawn_failure_is_execution_error() {
        let (runner, calls) = SpyRunner::failing_to_spawn();
        let extractor = TextExtractor::new(windows_host(installed_fs())).with_runner(runner);

        let err = extractor
            .extract_text(Path::new("docs/scan.pdf"), None)
            .unwrap_err();
        assert!(matches!(err, Pdf2TxtError::Execution { .. }));
        assert!(err.to_string().contains("access denied"));
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_unmarked_output_returned_whole() {
        let (runner, _) = SpyRunner::replying(true, 0, "  raw text without markers \n");
        let extraction = TextExtractor::new(windows_host(installed_fs()))
            .with_runner(runner)
            .extract(Path::new("docs/scan.pdf"), None)
            .unwrap();

        assert_eq!(extraction.text, "raw text without markers");
        assert_eq!(extraction.markers, MarkerMatch::None);
    }

    #[test]
    fn test_tool_resolved_on_every_call() {
        let fs = MemoryFileSystem::new("/work")
            .with_file("/work/docs/scan.pdf")
            .with_file("/build/PdfTextExtractor.exe");
        let host = windows_host(fs);
        let (runner, calls) = SpyRunner::replying(true, 0, &marked("ok"));
        let extractor = TextExtractor::new(host.clone()).with_runner(runner);

        assert!(extractor.extract_text(Path::new("docs/scan.pdf"), None).is_err());

        crate::tool::Installer::new(host)
            .install(Some(Path::new("/build/PdfTextExtractor.exe")))
            .unwrap();

        assert_eq!(extractor.extract_text(Path::new("docs/scan.pdf"), None).unwrap(), "ok");
        assert_eq!(calls.lock().unwrap().len(), 1);
    }
}
