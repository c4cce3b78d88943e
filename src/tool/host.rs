use std::fmt;
use std::fs;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// The only operating system PdfTextExtractor is built for.
pub const SUPPORTED_OS: &str = "windows";

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Which side of a copy failed.
#[derive(Error, Debug)]
pub enum CopyError {
    #[error("cannot read {}: {source}", .path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write {}: {source}", .path.display())]
    Destination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Filesystem operations the locator, installer and invoker depend on.
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn current_dir(&self) -> io::Result<PathBuf>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Resolves links and relative components of an existing path.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// Copies `source` over `dest`, giving `dest` the permission bits of `source`.
    /// Returns the number of bytes written. `dest` is left untouched when
    /// `source` is not a readable regular file.
    fn copy_file(&self, source: &Path, dest: &Path) -> Result<u64, CopyError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn current_dir(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }

    fn copy_file(&self, source: &Path, dest: &Path) -> Result<u64, CopyError> {
        let read_error = |e: io::Error| CopyError::Source {
            path: source.to_path_buf(),
            source: e,
        };
        let write_error = |e: io::Error| CopyError::Destination {
            path: dest.to_path_buf(),
            source: e,
        };

        let source_metadata = fs::metadata(source).map_err(read_error)?;
        if !source_metadata.is_file() {
            return Err(read_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }

        let source_file = fs::File::open(source).map_err(read_error)?;
        let dest_file = fs::File::create(dest).map_err(write_error)?;

        let mut reader = BufReader::with_capacity(COPY_BUFFER_SIZE, source_file);
        let mut writer = BufWriter::with_capacity(COPY_BUFFER_SIZE, dest_file);

        let mut total_bytes = 0u64;
        let mut buffer = vec![0u8; 8192];

        loop {
            let bytes_read = reader.read(&mut buffer).map_err(read_error)?;
            if bytes_read == 0 {
                break;
            }
            writer
                .write_all(&buffer[..bytes_read])
                .map_err(write_error)?;
            total_bytes += bytes_read as u64;
        }

        writer.flush().map_err(write_error)?;
        drop(writer);

        fs::set_permissions(dest, source_metadata.permissions()).map_err(write_error)?;

        // Keep the build timestamp; a failure here does not invalidate the copy.
        if let Ok(modified_time) = source_metadata.modified() {
            if let Err(e) =
                filetime::set_file_mtime(dest, filetime::FileTime::from_system_time(modified_time))
            {
                log::debug!("Could not preserve mtime on {}: {}", dest.display(), e);
            }
        }

        Ok(total_bytes)
    }
}

/// Removes `.` and resolves `..` without touching the filesystem.
/// `..` never climbs above the root.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }

    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Process-wide state seen by the locator, installer and invoker.
///
/// `Host::system()` reads the real environment; tests build one by hand with
/// the `with_*` methods.
#[derive(Clone)]
pub struct Host {
    os: String,
    env: EnvLookup,
    local_data_dir: Option<PathBuf>,
    fs: Arc<dyn FileSystem>,
}

impl Host {
    pub fn system() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            env: Arc::new(|key| std::env::var(key).ok()),
            local_data_dir: dirs::data_local_dir(),
            fs: Arc::new(RealFileSystem::new()),
        }
    }

    pub fn with_os<S: Into<String>>(mut self, os: S) -> Self {
        self.os = os.into();
        self
    }

    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Arc::new(lookup);
        self
    }

    pub fn with_local_data_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.local_data_dir = dir;
        self
    }

    pub fn with_file_system<F: FileSystem + 'static>(mut self, fs: F) -> Self {
        self.fs = Arc::new(fs);
        self
    }

    pub fn os(&self) -> &str {
        &self.os
    }

    pub fn is_supported_platform(&self) -> bool {
        self.os == SUPPORTED_OS
    }

    /// Reads an environment variable, treating an empty value as unset.
    pub fn var(&self, key: &str) -> Option<String> {
        (self.env)(key).filter(|value| !value.is_empty())
    }

    pub fn local_data_dir(&self) -> Option<&Path> {
        self.local_data_dir.as_deref()
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    /// Joins `path` onto the working directory and normalizes the result.
    pub fn absolute(&self, path: &Path) -> io::Result<PathBuf> {
        if path.is_absolute() {
            Ok(normalize_path(path))
        } else {
            Ok(normalize_path(&self.fs.current_dir()?.join(path)))
        }
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("os", &self.os)
            .field("local_data_dir", &self.local_data_dir)
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_env_value_is_unset() {
        let host = Host::system().with_env(|key| {
            if key == "EMPTY" {
                Some(String::new())
            } else {
                Some("value".to_string())
            }
        });
        assert_eq!(host.var("EMPTY"), None);
        assert_eq!(host.var("OTHER").as_deref(), Some("value"));
    }

    #[test]
    fn test_platform_check() {
        let host = windows_host(MemoryFileSystem::new("/work"));
        assert!(host.is_supported_platform());
        assert!(!host.with_os("linux").is_supported_platform());
    }

    #[test]
    fn test_absolute_joins_working_directory() {
        let host = windows_host(MemoryFileSystem::new("/work"));
        assert_eq!(
            host.absolute(Path::new("docs/scan.pdf")).unwrap(),
            PathBuf::from("/work/docs/scan.pdf")
        );
        assert_eq!(
            host.absolute(Path::new("/abs/scan.pdf")).unwrap(),
            PathBuf::from("/abs/scan.pdf")
        );
    }

    #[test]
    fn test_absolute_cleans_dot_components() {
        let host = windows_host(MemoryFileSystem::new("/work/project"));
        assert_eq!(
            host.absolute(Path::new("../bin/PdfTextExtractor.exe")).unwrap(),
            PathBuf::from("/work/bin/PdfTextExtractor.exe")
        );
        assert_eq!(
            host.absolute(Path::new("./docs/./scan.pdf")).unwrap(),
            PathBuf::from("/work/project/docs/scan.pdf")
        );
        assert_eq!(
            host.absolute(Path::new("../../../../bin/x.exe")).unwrap(),
            PathBuf::from("/bin/x.exe")
        );
    }

    #[test]
    fn test_normalize_relative_paths() {
        assert_eq!(normalize_path(Path::new("a/b/../c")), PathBuf::from("a/c"));
        assert_eq!(normalize_path(Path::new("../a")), PathBuf::from("../a"));
        assert_eq!(normalize_path(Path::new("../../a")), PathBuf::from("../../a"));
        assert_eq!(normalize_path(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn test_absolute_fails_without_working_directory() {
        let host = windows_host(MemoryFileSystem::without_cwd());
        assert!(host.absolute(Path::new("scan.pdf")).is_err());
    }

    #[test]
    fn test_memory_fs_resolves_relative_paths() {
        let fs = MemoryFileSystem::new("/work").with_file("/work/docs/scan.pdf");
        assert!(fs.exists(Path::new("docs/scan.pdf")));
        assert!(fs.exists(Path::new("./docs/../docs/scan.pdf")));
        assert!(!fs.exists(Path::new("scan.pdf")));

        let fs = fs.with_file("bin/tool.exe");
        assert!(fs.exists(Path::new("/work/bin/tool.exe")));
    }

    #[test]
    fn test_real_copy_preserves_content() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("tool.exe");
        let dest = temp_dir.path().join("copy.exe");
        fs::write(&source, b"binary content").unwrap();

        let copied = RealFileSystem::new().copy_file(&source, &dest).unwrap();

        assert_eq!(copied, 14);
        assert_eq!(fs::read(&dest).unwrap(), b"binary content");
    }

    #[test]
    fn test_real_copy_rejects_directory_source() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("tool.exe");
        let dest = temp_dir.path().join("copy.exe");
        fs::create_dir(&source).unwrap();
        fs::write(&dest, b"previous install").unwrap();

        let err = RealFileSystem::new().copy_file(&source, &dest).unwrap_err();

        assert!(matches!(err, CopyError::Source { ref path, .. } if *path == source));
        assert_eq!(fs::read(&dest).unwrap(), b"previous install");
    }

    #[test]
    fn test_real_copy_reports_unwritable_destination() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("tool.exe");
        let dest = temp_dir.path().join("missing-dir").join("copy.exe");
        fs::write(&source, b"binary content").unwrap();

        let err = RealFileSystem::new().copy_file(&source, &dest).unwrap_err();
        assert!(matches!(err, CopyError::Destination { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_real_copy_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("tool.exe");
        let dest = temp_dir.path().join("copy.exe");
        fs::write(&source, b"#!/bin/sh\n").unwrap();
        fs::set_permissions(&source, fs::Permissions::from_mode(0o751)).unwrap();

        RealFileSystem::new().copy_file(&source, &dest).unwrap();

        let mode = fs::metadata(&dest).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o751);
    }
}
