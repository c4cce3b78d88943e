use crate::error::{Pdf2TxtError, Result};
use crate::tool::{CopyError, Host, ToolLayout};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Outcome of a successful installation.
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub installed_path: PathBuf,
    pub source_path: PathBuf,
    pub bytes_copied: u64,
    pub sidecars_copied: Vec<String>,
    pub warnings: Vec<String>,
}

impl InstallReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Copies a built PdfTextExtractor and its side-car files into the per-user
/// install directory, where `ToolLocator` finds it.
pub struct Installer {
    layout: ToolLayout,
    host: Host,
}

impl Installer {
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

    pub fn install(&self, source: Option<&Path>) -> Result<InstallReport> {
        if !self.host.is_supported_platform() {
            return Err(Pdf2TxtError::UnsupportedPlatform {
                os: self.host.os().to_string(),
            });
        }

        let fs = self.host.fs();

        let source_path = match source {
            Some(path) => {
                if !fs.exists(path) {
                    return Err(Pdf2TxtError::SourceNotFound {
                        searched: vec![path.to_path_buf()],
                    });
                }
                path.to_path_buf()
            }
            None => self.find_build_output()?,
        };

        let dest_path = self.layout.user_space_path(&self.host)?;
        let dest_dir = dest_path
            .parent()
            .ok_or(Pdf2TxtError::UserDataDirUnavailable)?
            .to_path_buf();

        if self.is_same_file(&source_path, &dest_path) {
            log::info!("{} is already the installed copy", source_path.display());
            return Ok(InstallReport {
                installed_path: dest_path,
                source_path,
                bytes_copied: 0,
                sidecars_copied: Vec::new(),
                warnings: vec!["source is already the installed copy, nothing was copied".to_string()],
            });
        }

        fs.create_dir_all(&dest_dir)
            .map_err(|e| Pdf2TxtError::InstallDestination {
                path: dest_dir.clone(),
                source: e,
            })?;

        log::info!(
            "Installing {} to {}",
            source_path.display(),
            dest_path.display()
        );
        let bytes_copied = fs
            .copy_file(&source_path, &dest_path)
            .map_err(|e| match e {
                CopyError::Source { path, source } => Pdf2TxtError::InstallSource { path, source },
                CopyError::Destination { path, source } => {
                    Pdf2TxtError::InstallDestination { path, source }
                }
            })?;

        let mut report = InstallReport {
            installed_path: dest_path,
            source_path: source_path.clone(),
            bytes_copied,
            sidecars_copied: Vec::new(),
            warnings: Vec::new(),
        };

        self.copy_sidecars(&source_path, &dest_dir, &mut report);

        Ok(report)
    }

    // Copying a file onto itself would truncate it before it is read.
    fn is_same_file(&self, source: &Path, dest: &Path) -> bool {
        let fs = self.host.fs();
        match (fs.canonicalize(source), fs.canonicalize(dest)) {
            (Ok(source), Ok(dest)) => source == dest,
            _ => false,
        }
    }

    fn find_build_output(&self) -> Result<PathBuf> {
        let fs = self.host.fs();
        let mut searched = Vec::with_capacity(self.layout.build_output_paths.len());

        for relative in &self.layout.build_output_paths {
            match self.host.absolute(relative) {
                Ok(candidate) if fs.exists(&candidate) => return Ok(candidate),
                Ok(candidate) => searched.push(candidate),
                Err(_) => searched.push(relative.clone()),
            }
        }

        Err(Pdf2TxtError::SourceNotFound { searched })
    }

    // Side-cars are optional: a missing one is skipped and a failed copy only warns.
    fn copy_sidecars(&self, source_path: &Path, dest_dir: &Path, report: &mut InstallReport) {
        let fs = self.host.fs();
        let source_dir = match source_path.parent() {
            Some(dir) => dir,
            None => return,
        };

        for name in &self.layout.sidecar_files {
            let src = source_dir.join(name);
            if !fs.exists(&src) {
                log::debug!("Side-car {} not present next to the source, skipping", name);
                continue;
            }

            match fs.copy_file(&src, &dest_dir.join(name)) {
                Ok(_) => report.sidecars_copied.push(name.clone()),
                Err(e) => {
                    let warning = format!("unable to copy {}: {}", name, e);
                    log::warn!("{}", warning);
                    report.warnings.push(warning);
                }
            }
        }
    }
}
