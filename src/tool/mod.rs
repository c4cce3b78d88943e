pub mod host;
pub mod installer;
pub mod locator;

pub use host::{
    normalize_path, CopyError, EnvLookup, FileSystem, Host, RealFileSystem, SUPPORTED_OS,
};
pub use installer::{InstallReport, Installer};
pub use locator::{
    SearchReport, ToolLayout, ToolLocator, EXECUTABLE_NAME, OVERRIDE_ENV_VAR, PRODUCT_NAME,
    SIDECAR_FILES,
};
