use crate::error::{AppError, Result};
use byte_unit::Byte;
use log;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_CONFIG_DIR: &str = ".codepack";
pub const DEFAULT_CONFIG_FILENAME: &str = "codepack.toml";
pub const DEFAULT_OUTPUT_FILE: &str = "codebase.md";
pub const DEFAULT_IGNORE_FILE: &str = ".cpignore";
pub const GITIGNORE_FILE: &str = ".gitignore";
pub const PROJECT_ROOT_ENV: &str = "CODEPACK_ROOT";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub tree: TreeConfig,
    #[serde(default)]
    pub files: FilesConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    #[serde(default = "default_true")]
    pub use_gitignore: bool,
    #[serde(default = "default_true")]
    pub enable_builtin_rules: bool,
    #[serde(default = "default_true")]
    pub generate_ignore_file: bool,
    #[serde(default = "default_ignore_file")]
    pub ignore_file: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_output_file")]
    pub file: PathBuf,
    /// Write root-relative paths in file headers instead of absolute ones.
    #[serde(default)]
    pub relative_paths: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct TreeConfig {
    #[serde(default)]
    pub mode: TreeMode,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct FilesConfig {
    #[serde(default)]
    pub on_read_error: ReadErrorPolicy,
    /// Human readable size such as "512KB" or "2MiB".
    #[serde(default)]
    pub max_file_size: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TreeMode {
    #[default]
    Native,
    External,
    Off,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReadErrorPolicy {
    #[default]
    Skip,
    Abort,
}

impl FromStr for TreeMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "native" => Ok(TreeMode::Native),
            "external" => Ok(TreeMode::External),
            "off" | "none" => Ok(TreeMode::Off),
            other => Err(AppError::InvalidArgument(format!(
                "Unknown tree mode '{}'. Use 'native', 'external' or 'off'.",
                other
            ))),
        }
    }
}

impl fmt::Display for TreeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TreeMode::Native => "native",
            TreeMode::External => "external",
            TreeMode::Off => "off",
        };
        f.write_str(name)
    }
}

fn default_true() -> bool {
    true
}
fn default_ignore_file() -> String {
    DEFAULT_IGNORE_FILE.to_string()
}
fn default_output_file() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_FILE)
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            use_gitignore: default_true(),
            enable_builtin_rules: default_true(),
            generate_ignore_file: default_true(),
            ignore_file: default_ignore_file(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file: default_output_file(),
            relative_paths: false,
        }
    }
}

impl Config {
    pub fn determine_project_root(cli_project_root: Option<&PathBuf>) -> Result<PathBuf> {
        let path_str_opt = cli_project_root
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env::var(PROJECT_ROOT_ENV).ok().filter(|s| !s.is_empty()));

        let path_to_resolve = match path_str_opt {
            Some(p_str) => PathBuf::from(shellexpand::tilde(&p_str).as_ref()),
            None => env::current_dir().map_err(AppError::Io)?,
        };

        path_to_resolve.canonicalize().map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to canonicalize project root '{}': {}",
                    path_to_resolve.display(),
                    e
                ),
            ))
        })
    }

    pub fn resolve_config_path(
        project_root: &Path,
        cli_config_file: Option<&PathBuf>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        match cli_config_file {
            Some(p) => {
                let path = PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).as_ref());
                let path = if path.is_absolute() {
                    path
                } else {
                    project_root.join(path)
                };
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Specified config file not found at path: {}",
                        path.display()
                    )));
                }
                log::debug!("Using specified config file path: {}", path.display());
                Ok(Some(path))
            }
            None => {
                let default_path = project_root
                    .join(DEFAULT_CONFIG_DIR)
                    .join(DEFAULT_CONFIG_FILENAME);
                if default_path.exists() {
                    log::debug!("Using default config file path: {}", default_path.display());
                    Ok(Some(default_path))
                } else {
                    log::debug!(
                        "No config file specified and default not found at: {}",
                        default_path.display()
                    );
                    Ok(None)
                }
            }
        }
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        toml::from_str::<Config>(&toml_content).map_err(|e| {
            AppError::TomlParse(format!(
                "Error parsing config file '{}': {}. Check TOML syntax and structure.",
                config_path.display(),
                e
            ))
        })
    }

    /// Relative output names are resolved against the project root.
    pub fn output_path(&self, project_root: &Path) -> PathBuf {
        if self.output.file.is_absolute() {
            self.output.file.clone()
        } else {
            project_root.join(&self.output.file)
        }
    }

    /// The output location as written into the default ignore rules.
    pub fn output_rule(&self, project_root: &Path) -> String {
        let path = self.output_path(project_root);
        pathdiff::diff_paths(&path, project_root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    pub fn ignore_file_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.general.ignore_file)
    }

    pub fn get_max_file_size(&self) -> Result<Option<u64>> {
        let Some(size_str) = self.files.max_file_size.as_deref() else {
            return Ok(None);
        };
        let bytes = Byte::from_str(size_str).map_err(|e| {
            AppError::InvalidArgument(format!(
                "Invalid max file size '{}': {}. Use KB, MB, etc.",
                size_str, e
            ))
        })?;
        match bytes.as_u64() {
            0 => Err(AppError::InvalidArgument(
                "Max file size must be greater than 0 bytes".to_string(),
            )),
            n => Ok(Some(n)),
        }
    }
}
