//! Configuration loading and root folder resolution
//!
//! Root folder resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. `VMC_ROOT_FOLDER` environment variable
//! 3. `VMC_ROOT` environment variable
//! 4. `root_folder` key of the module's TOML config file
//! 5. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable TOML file never aborts startup; resolution
//! logs a warning and falls through to the next tier.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default catalog file name inside the root folder
pub const DEFAULT_CATALOG_FILE: &str = "DataQt.txt";

/// Default report file name inside the root folder
pub const DEFAULT_REPORT_FILE: &str = "Index.html";

/// Compiled-in defaults used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
    pub catalog_file: String,
    pub report_file: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            log_level: default_log_level(),
            catalog_file: DEFAULT_CATALOG_FILE.to_string(),
            report_file: DEFAULT_REPORT_FILE.to_string(),
        }
    }
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/vmc
        dirs::data_local_dir()
            .map(|d| d.join("vmc"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/vmc"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/vmc
        dirs::data_dir()
            .map(|d| d.join("vmc"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/vmc"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\vmc
        dirs::data_local_dir()
            .map(|d| d.join("vmc"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\vmc"))
    } else {
        PathBuf::from("./vmc_data")
    }
}

/// Logging section of the TOML config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Per-module TOML configuration file
///
/// Every field is optional so that older files keep parsing as new keys are added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_folder: Option<PathBuf>,
    /// Catalog file name or absolute path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_file: Option<PathBuf>,
    /// Report file name or absolute path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_file: Option<PathBuf>,
    /// Write catalog and report through a temp file + rename
    #[serde(default)]
    pub atomic_writes: bool,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TomlConfig {
    /// Load a config file. A missing file yields the defaults.
    ///
    /// Logs a warning when group or other can read the file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }

        #[cfg(unix)]
        {
            if check_toml_permissions_loose(path)? {
                warn!(
                    "Config file {} is accessible by other users; consider chmod 600",
                    path.display()
                );
            }
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
    }

    /// Config with every key spelled out from the compiled defaults
    pub fn from_defaults(defaults: &CompiledDefaults) -> Self {
        Self {
            root_folder: Some(defaults.root_folder.clone()),
            catalog_file: Some(PathBuf::from(&defaults.catalog_file)),
            report_file: Some(PathBuf::from(&defaults.report_file)),
            atomic_writes: false,
            logging: LoggingConfig {
                level: defaults.log_level.clone(),
            },
        }
    }
}

/// Path of the TOML config file for `module_name`, e.g. `~/.config/vmc/vmc-catalog.toml`
pub fn config_file_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vmc").join(format!("{}.toml", module_name)))
}

/// Resolves the root folder holding the catalog and report files
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
        }
    }

    /// Set the command-line override (priority 1)
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        for var in ["VMC_ROOT_FOLDER", "VMC_ROOT"] {
            if let Ok(path) = std::env::var(var) {
                if !path.trim().is_empty() {
                    return PathBuf::from(path);
                }
            }
        }

        if let Some(path) = config_file_path(&self.module_name) {
            match TomlConfig::load(&path) {
                Ok(config) => {
                    if let Some(root) = config.root_folder {
                        return root;
                    }
                }
                Err(e) => warn!("Ignoring config file: {}", e),
            }
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Prepares the root folder and derives file paths inside it
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// Create the root folder (and parents). Safe to call repeatedly.
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        Ok(())
    }

    /// Catalog path, honouring an override that may be relative to the root folder
    pub fn catalog_path(&self, configured: Option<&Path>) -> PathBuf {
        self.resolve_file(configured, DEFAULT_CATALOG_FILE)
    }

    /// Report path, honouring an override that may be relative to the root folder
    pub fn report_path(&self, configured: Option<&Path>) -> PathBuf {
        self.resolve_file(configured, DEFAULT_REPORT_FILE)
    }

    fn resolve_file(&self, configured: Option<&Path>, default_name: &str) -> PathBuf {
        match configured {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => self.root_folder.join(path),
            None => self.root_folder.join(default_name),
        }
    }
}

/// Write a TOML config atomically (temp file + rename), permissions 0600 on Unix
pub fn write_toml_config(config: &TomlConfig, target: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let temp = temp_path_for(target);
    std::fs::write(&temp, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&temp, std::fs::Permissions::from_mode(0o600))?;
    }

    if let Err(e) = std::fs::rename(&temp, target) {
        let _ = std::fs::remove_file(&temp);
        return Err(e.into());
    }
    Ok(())
}

/// Sibling temp path used by atomic writes: `<name>.tmp`
pub fn temp_path_for(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    target.with_file_name(name)
}

/// True if group/other have any access to the file (Unix only)
#[cfg(unix)]
pub fn check_toml_permissions_loose(path: &Path) -> Result<bool> {
    use std::os::unix::fs::PermissionsExt;
    let mode = std::fs::metadata(path)?.permissions().mode();
    Ok(mode & 0o077 != 0)
}
