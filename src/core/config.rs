/*
 * Manages application-level configuration, currently the path of the last
 * folder the user opened, so a later launch without arguments can return
 * to it. Storage is a small text file in the platform's local config
 * directory.
 *
 * It uses a trait-based approach (`ConfigManagerOperations`) to allow for
 * mock implementations in tests. The concrete `CoreConfigManager` handles
 * the file system interactions.
 */
use directories::ProjectDirs;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

const LAST_FOLDER_PATH_FILENAME: &str = "last_folder_path.txt";

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    NoConfigDirectory,
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Configuration I/O error: {e}"),
            ConfigError::NoConfigDirectory => {
                write!(f, "Could not determine a configuration directory")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

pub trait ConfigManagerOperations: Send + Sync {
    fn load_last_folder_path(&self, app_name: &str) -> Result<Option<PathBuf>>;
    fn save_last_folder_path(&self, app_name: &str, folder_path: Option<&Path>) -> Result<()>;
}

/*
 * Determines the application's local configuration directory and creates
 * it if necessary. Returns None when no suitable location exists or it
 * cannot be created.
 */
fn get_app_config_local_dir(app_name: &str) -> Option<PathBuf> {
    ProjectDirs::from("", "", app_name).and_then(|proj_dirs| {
        let config_path = proj_dirs.config_local_dir();
        if !config_path.exists() {
            if let Err(e) = fs::create_dir_all(config_path) {
                log::error!("ConfigManager: Failed to create config directory {config_path:?}: {e}");
                return None;
            }
            log::debug!("ConfigManager: Created config directory {config_path:?}.");
        }
        Some(config_path.to_path_buf())
    })
}

pub struct CoreConfigManager {}

impl CoreConfigManager {
    pub fn new() -> Self {
        CoreConfigManager {}
    }
}

impl Default for CoreConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManagerOperations for CoreConfigManager {
    /*
     * Loads the last opened folder path, if one was saved and the file is
     * non-empty.
     */
    fn load_last_folder_path(&self, app_name: &str) -> Result<Option<PathBuf>> {
        let config_dir =
            get_app_config_local_dir(app_name).ok_or(ConfigError::NoConfigDirectory)?;
        let file_path = config_dir.join(LAST_FOLDER_PATH_FILENAME);

        if !file_path.exists() {
            log::debug!("ConfigManager: Last folder file {file_path:?} does not exist.");
            return Ok(None);
        }

        let mut file = File::open(&file_path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        if contents.trim().is_empty() {
            Ok(None)
        } else {
            let path_text = contents.trim();
            log::debug!("ConfigManager: Loaded last folder path '{path_text}'.");
            Ok(Some(PathBuf::from(path_text)))
        }
    }

    /*
     * Saves the last opened folder path. Passing `None` clears the stored
     * value.
     */
    fn save_last_folder_path(&self, app_name: &str, folder_path: Option<&Path>) -> Result<()> {
        let config_dir =
            get_app_config_local_dir(app_name).ok_or(ConfigError::NoConfigDirectory)?;
        let file_path = config_dir.join(LAST_FOLDER_PATH_FILENAME);

        let mut file = File::create(&file_path)?;
        if let Some(path) = folder_path {
            file.write_all(path.to_string_lossy().as_bytes())?;
        } else {
            file.write_all(b"")?;
        }
        log::debug!("ConfigManager: Saved last folder path {folder_path:?} to {file_path:?}.");
        Ok(())
    }
}
