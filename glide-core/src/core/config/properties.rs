use crate::core::config::{ConfigError, Result};
use crate::core::media::DEFAULT_VIDEO_EXTENSIONS;
use crate::core::mpv::{DEFAULT_MPV_ARGS, DEFAULT_MPV_EXECUTABLE, OBSERVED_PROPERTIES};
use derive_more::Display;
use log::{debug, trace, warn};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_EXECUTABLE: fn() -> String = || DEFAULT_MPV_EXECUTABLE.to_string();
const DEFAULT_ARGS: fn() -> Vec<String> =
    || DEFAULT_MPV_ARGS.iter().map(|e| e.to_string()).collect();
const DEFAULT_OBSERVED_PROPERTIES: fn() -> Vec<String> =
    || OBSERVED_PROPERTIES.iter().map(|e| e.to_string()).collect();
const DEFAULT_CONNECT_TIMEOUT: fn() -> u64 = || 5000;
const DEFAULT_COMMAND_TIMEOUT: fn() -> u64 = || 3000;
const DEFAULT_EXTENSIONS: fn() -> Vec<String> =
    || DEFAULT_VIDEO_EXTENSIONS.iter().map(|e| e.to_string()).collect();

const DEFAULT_CONFIG_FILENAME: &str = "glide";
const CONFIG_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// The static properties of the application.
#[derive(Debug, Display, Clone, Default, Deserialize, PartialEq)]
#[display("mpv: {}, library: {}", mpv, library)]
pub struct GlideProperties {
    #[serde(default)]
    pub mpv: MpvProperties,
    #[serde(default)]
    pub library: LibraryProperties,
}

impl GlideProperties {
    /// Create new properties from the `glide.yml` or `glide.yaml` file in the working directory.
    /// The defaults are used when no config file could be found.
    pub fn new_auto() -> Self {
        debug!("Searching for config file with name \"{}\"", DEFAULT_CONFIG_FILENAME);
        match Self::find_existing_file(DEFAULT_CONFIG_FILENAME) {
            Some(path) => match Self::from_path(&path) {
                Ok(properties) => properties,
                Err(e) => {
                    warn!("{}, using defaults instead", e);
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }

    /// Create new properties from the given config file path.
    ///
    /// # Returns
    ///
    /// It returns [ConfigError::Io] when the file couldn't be read.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_string_lossy().to_string(), e))?;

        debug!("Loading config file {:?}", path);
        Ok(Self::from_str(data.as_str()))
    }

    /// Parse the given yaml config data.
    /// Invalid config data results in the default properties.
    pub fn from_str(config_data: &str) -> Self {
        trace!("Parsing config data {}", config_data);
        if config_data.trim().is_empty() {
            return Self::default();
        }

        match serde_yaml::from_str::<GlideProperties>(config_data) {
            Ok(properties) => {
                debug!("Parsed config data {:?}", properties);
                properties
            }
            Err(e) => {
                warn!("Failed to parse config, {}, using defaults instead", e);
                Self::default()
            }
        }
    }

    fn find_existing_file(filename: &str) -> Option<PathBuf> {
        let directory = env::current_dir().ok()?;

        CONFIG_EXTENSIONS
            .iter()
            .map(|extension| directory.join(format!("{}.{}", filename, extension)))
            .find(|path| {
                let exists = path.is_file();
                if !exists {
                    trace!("Config file location {:?} doesn't exist", path);
                }
                exists
            })
    }
}

/// The properties of the mpv media engine.
#[derive(Debug, Display, Clone, Deserialize, PartialEq)]
#[display("executable: {}, ipc_path: {:?}", executable, ipc_path)]
pub struct MpvProperties {
    #[serde(default = "DEFAULT_EXECUTABLE")]
    pub executable: String,
    /// The ipc server path, a process specific path is used when absent.
    #[serde(default)]
    pub ipc_path: Option<String>,
    #[serde(default = "DEFAULT_ARGS")]
    pub args: Vec<String>,
    #[serde(default = "DEFAULT_OBSERVED_PROPERTIES")]
    pub observed_properties: Vec<String>,
    #[serde(default = "DEFAULT_CONNECT_TIMEOUT")]
    pub connect_timeout_millis: u64,
    #[serde(default = "DEFAULT_COMMAND_TIMEOUT")]
    pub command_timeout_millis: u64,
}

impl MpvProperties {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_millis)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_millis)
    }
}

impl Default for MpvProperties {
    fn default() -> Self {
        Self {
            executable: DEFAULT_EXECUTABLE(),
            ipc_path: None,
            args: DEFAULT_ARGS(),
            observed_properties: DEFAULT_OBSERVED_PROPERTIES(),
            connect_timeout_millis: DEFAULT_CONNECT_TIMEOUT(),
            command_timeout_millis: DEFAULT_COMMAND_TIMEOUT(),
        }
    }
}

/// The properties of the local video library.
#[derive(Debug, Display, Clone, Deserialize, PartialEq)]
#[display("root: {:?}, extensions: {:?}", root, extensions)]
pub struct LibraryProperties {
    /// The root directory to search for videos, the home directory is used when absent.
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default = "DEFAULT_EXTENSIONS")]
    pub extensions: Vec<String>,
}

impl Default for LibraryProperties {
    fn default() -> Self {
        Self {
            root: None,
            extensions: DEFAULT_EXTENSIONS(),
        }
    }
}
