use crate::error::{Pdf2TxtError, Result};
use crate::tool::Host;
use std::fmt;
use std::path::{Path, PathBuf};

pub const EXECUTABLE_NAME: &str = "PdfTextExtractor.exe";
pub const PRODUCT_NAME: &str = "mypdf2txt";
pub const OVERRIDE_ENV_VAR: &str = "MYPDF2TXT_EXTRACTOR_PATH";

const RELEASE_DIR: &str = "tools/PdfTextExtractor/bin/Release/net8.0-windows10.0.19041.0/win-x64";

/// Where the executable is looked up when neither the override nor the
/// per-user install is present. Relative to the working directory.
pub fn default_search_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("bin").join(EXECUTABLE_NAME),
        PathBuf::from("../bin").join(EXECUTABLE_NAME),
        PathBuf::from("../../bin").join(EXECUTABLE_NAME),
        PathBuf::from(RELEASE_DIR).join("publish").join(EXECUTABLE_NAME),
        PathBuf::from(RELEASE_DIR).join(EXECUTABLE_NAME),
    ]
}

/// Build outputs probed by the installer when no source is given.
pub fn default_build_output_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from(RELEASE_DIR).join("publish").join(EXECUTABLE_NAME),
        PathBuf::from(RELEASE_DIR).join(EXECUTABLE_NAME),
        PathBuf::from("bin").join(EXECUTABLE_NAME),
        PathBuf::from("../bin").join(EXECUTABLE_NAME),
    ]
}

pub const SIDECAR_FILES: &[&str] = &[
    "PdfTextExtractor.dll",
    "WinRT.Runtime.dll",
    "Microsoft.Windows.SDK.NET.dll",
];

/// Names and search lists describing how the external tool is laid out on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolLayout {
    pub executable_name: String,
    pub product_name: String,
    pub override_var: String,
    pub search_paths: Vec<PathBuf>,
    pub build_output_paths: Vec<PathBuf>,
    pub sidecar_files: Vec<String>,
}

impl Default for ToolLayout {
    fn default() -> Self {
        Self {
            executable_name: EXECUTABLE_NAME.to_string(),
            product_name: PRODUCT_NAME.to_string(),
            override_var: OVERRIDE_ENV_VAR.to_string(),
            search_paths: default_search_paths(),
            build_output_paths: default_build_output_paths(),
            sidecar_files: SIDECAR_FILES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ToolLayout {
    /// Appends search paths after the built-in ones.
    pub fn with_extra_search_paths<I>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.search_paths.extend(paths);
        self
    }

    /// `<local data>/<product>/bin/<executable>`
    pub fn user_space_path(&self, host: &Host) -> Result<PathBuf> {
        let local_data = host
            .local_data_dir()
            .ok_or(Pdf2TxtError::UserDataDirUnavailable)?;

        Ok(local_data
            .join(&self.product_name)
            .join("bin")
            .join(&self.executable_name))
    }
}

/// Every location checked by a failed lookup, in search order.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub executable_name: String,
    pub override_var: String,
    pub override_value: Option<String>,
    pub user_space_path: Option<PathBuf>,
    pub candidates: Vec<PathBuf>,
}

impl fmt::Display for SearchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} not found. Locations checked:", self.executable_name)?;
        writeln!(
            f,
            "  1. Environment variable {}: {}",
            self.override_var,
            self.override_value.as_deref().unwrap_or("<not set>")
        )?;
        match &self.user_space_path {
            Some(path) => writeln!(f, "  2. User space: {}", path.display())?,
            None => writeln!(f, "  2. User space: N/A")?,
        }
        writeln!(f, "  3. Relative paths:")?;
        for candidate in &self.candidates {
            writeln!(f, "     - {}", candidate.display())?;
        }
        write!(
            f,
            "Run the installer (mypdf2txt --install) or set {}",
            self.override_var
        )
    }
}

pub struct ToolLocator {
    layout: ToolLayout,
    host: Host,
}

impl ToolLocator {
    pub fn new(host: Host) -> Self {
        Self {
            layout: ToolLayout::default(),
            host,
        }
    }

    pub fn with_layout(mut self, layout: ToolLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Resolves the executable: override variable, then per-user install,
    /// then the relative search paths. First existing location wins.
    pub fn locate(&self) -> Result<PathBuf> {
        let fs = self.host.fs();

        let override_value = self.host.var(&self.layout.override_var);
        if let Some(ref value) = override_value {
            let path = PathBuf::from(value);
            if fs.exists(&path) {
                log::debug!("Using {} from {}", path.display(), self.layout.override_var);
                return Ok(path);
            }
            log::debug!(
                "{} points to a missing file: {}",
                self.layout.override_var,
                path.display()
            );
        }

        let user_space_path = self.layout.user_space_path(&self.host).ok();
        if let Some(ref path) = user_space_path {
            if fs.exists(path) {
                log::debug!("Using user space install at {}", path.display());
                return Ok(path.clone());
            }
        }

        let mut candidates = Vec::with_capacity(self.layout.search_paths.len());
        for relative in &self.layout.search_paths {
            let candidate = match self.host.absolute(relative) {
                Ok(path) => path,
                Err(e) => {
                    log::debug!("Cannot resolve {}: {}", relative.display(), e);
                    candidates.push(relative.clone());
                    continue;
                }
            };

            if fs.exists(&candidate) {
                log::debug!("Using development build at {}", candidate.display());
                return Ok(candidate);
            }
            candidates.push(candidate);
        }

        Err(Pdf2TxtError::ToolNotFound {
            report: SearchReport {
                executable_name: self.layout.executable_name.clone(),
                override_var: self.layout.override_var.clone(),
                override_value,
                user_space_path,
                candidates,
            },
        })
    }

    /// True when `path` would be picked up by `locate()` through the per-user install.
    pub fn is_user_space_install(&self, path: &Path) -> bool {
        self.layout
            .user_space_path(&self.host)
            .map(|p| p == path)
            .unwrap_or(false)
    }
}
