use std::ffi::OsString;
use std::fmt;
use std::io::{self, Read};
use std::path::Path;
use std::process::Command;

/// Exit status and interleaved stdout/stderr of one tool run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub combined: String,
}

impl ToolOutput {
    pub fn status_description(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

impl fmt::Display for ToolOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.combined)
    }
}

/// Anything that can run the extractor with positional arguments.
pub trait ToolRunner: Send + Sync {
    fn run(&self, program: &Path, args: &[OsString]) -> io::Result<ToolOutput>;
}

/// Runs the tool as a child process, blocking until it exits.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ToolRunner for ProcessRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> io::Result<ToolOutput> {
        // stdout and stderr share one pipe so lines keep the order the tool wrote them.
        let (mut reader, writer) = io::pipe()?;

        let mut child = Command::new(program)
            .args(args)
            .stdout(writer.try_clone()?)
            .stderr(writer)
            .spawn()?;

        // The Command and its pipe ends are gone by now, so EOF arrives when the child exits.
        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;
        let status = child.wait()?;

        Ok(ToolOutput {
            success: status.success(),
            code: status.code(),
            combined: String::from_utf8_lossy(&raw).into_owned(),
        })
    }
}
