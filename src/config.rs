use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::archive::DEFAULT_HTAR_THREADS;
use crate::domain::{Label, VariableList};
use crate::error::GrabError;
use crate::template::{DEFAULT_ESTIMATE, DEFAULT_PATH_TEMPLATE, DEFAULT_VERSION, PathTemplate};

pub const CONFIG_FILE_NAME: &str = "c20c-grab.json";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub path_template: Option<String>,
    #[serde(default)]
    pub variables: Option<Vec<String>>,
    #[serde(default)]
    pub output_directory: Option<String>,
    #[serde(default)]
    pub estimate: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub htar_threads: Option<u32>,
    #[serde(default)]
    pub tools: ToolsEntry,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ToolsEntry {
    #[serde(default)]
    pub hsi: Option<String>,
    #[serde(default)]
    pub htar: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub path_template: PathTemplate,
    pub variables: VariableList,
    pub output_directory: Option<Utf8PathBuf>,
    pub estimate: Label,
    pub version: Label,
    pub htar_threads: u32,
    pub hsi: Option<PathBuf>,
    pub htar: Option<PathBuf>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads an explicit config path, else the first config file found in the
    /// current directory or the user config directory, else the defaults.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, GrabError> {
        let config_path = match path {
            Some(path) => Some(PathBuf::from(path)),
            None => Self::discover(),
        };

        let config = match config_path {
            Some(config_path) => {
                tracing::debug!(path = %config_path.display(), "loading config");
                let content = fs::read_to_string(&config_path)
                    .map_err(|_| GrabError::ConfigRead(config_path.clone()))?;
                serde_json::from_str(&content)
                    .map_err(|err| GrabError::ConfigParse(err.to_string()))?
            }
            None => Config::default(),
        };

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, GrabError> {
        let schema_version = config.schema_version.unwrap_or(1);

        let path_template = PathTemplate::parse(
            config
                .path_template
                .as_deref()
                .unwrap_or(DEFAULT_PATH_TEMPLATE),
        )?;
        let variables = match config.variables {
            Some(values) => VariableList::from_strings(&values)?,
            None => VariableList::default(),
        };
        let estimate = Label::parse(
            "estimate",
            config.estimate.as_deref().unwrap_or(DEFAULT_ESTIMATE),
        )?;
        let version = Label::parse(
            "version",
            config.version.as_deref().unwrap_or(DEFAULT_VERSION),
        )?;
        let htar_threads = config.htar_threads.unwrap_or(DEFAULT_HTAR_THREADS);
        if htar_threads == 0 {
            return Err(GrabError::InvalidThreads(htar_threads));
        }

        Ok(ResolvedConfig {
            schema_version,
            path_template,
            variables,
            output_directory: config.output_directory.map(Utf8PathBuf::from),
            estimate,
            version,
            htar_threads,
            hsi: config.tools.hsi.map(PathBuf::from),
            htar: config.tools.htar.map(PathBuf::from),
        })
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.is_file() {
            return Some(local);
        }
        BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("c20c-grab").join("config.json"))
            .filter(|path| path.is_file())
    }
}
