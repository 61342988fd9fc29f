use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::utils::errors::{OptionResultTrait as _, ResultTrait, ResultWithError};

const APP_DIR: &str = "formulary";

#[derive(Debug)]
pub struct YamlResult<T> {
    pub file_name: String,
    pub path: PathBuf,
    pub content: T,
}

/// A file that was found but could not be read or parsed.
#[derive(Debug, Clone)]
pub struct YamlFailure {
    pub file_name: String,
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug)]
pub struct YamlScan<T> {
    pub parsed: Vec<YamlResult<T>>,
    pub failed: Vec<YamlFailure>,
}

pub struct DirUtils;

impl DirUtils {
    pub fn curr_dir() -> ResultWithError<PathBuf> {
        std::env::current_dir().auto_err("Could not read current directory")
    }

    pub fn home_dir() -> ResultWithError<PathBuf> {
        dirs::home_dir().auto_err("Could not determine home directory")
    }

    pub fn config_dir() -> ResultWithError<PathBuf> {
        Ok(dirs::config_dir()
            .auto_err("Could not determine config directory")?
            .join(APP_DIR))
    }

    pub fn cache_dir() -> ResultWithError<PathBuf> {
        Ok(dirs::cache_dir()
            .auto_err("Could not determine cache directory")?
            .join(APP_DIR))
    }

    /// Parses every `.yaml`/`.yml` file below `dir`, skipping hidden
    /// directories. A file that fails to read or parse is recorded in
    /// `failed` and does not stop the scan. Both lists are sorted by path.
    pub fn parse_all_yaml<T>(dir: &Path) -> ResultWithError<YamlScan<T>>
    where
        T: DeserializeOwned,
    {
        if !dir.is_dir() {
            return Err(format!("Directory not found: {}", dir.display()).into());
        }

        debug!("Searching for YAML files in {:?}", dir);

        let mut parsed = Vec::new();
        let mut failed = Vec::new();
        let mut dirs = vec![dir.to_path_buf()];

        while let Some(dir) = dirs.pop() {
            for entry in fs::read_dir(&dir).auto_err("Could not read directory")? {
                let entry = entry.auto_err("Could not read directory entry")?;
                let path = entry.path();

                let Some(file_name) = path.file_name() else {
                    continue;
                };
                let file_name = file_name.to_string_lossy().to_string();

                if path.is_dir() {
                    if !file_name.starts_with('.') {
                        dirs.push(path);
                    }
                    continue;
                }

                let Some(stem) = file_name
                    .strip_suffix(".yaml")
                    .or_else(|| file_name.strip_suffix(".yml"))
                else {
                    continue;
                };

                let content = fs::read_to_string(&path)
                    .map_err(|e| e.to_string())
                    .and_then(|raw| serde_yaml::from_str::<T>(&raw).map_err(|e| e.to_string()));

                match content {
                    Ok(content) => parsed.push(YamlResult {
                        file_name: stem.to_string(),
                        path,
                        content,
                    }),
                    Err(reason) => {
                        warn!("Skipping {}: {}", path.display(), reason);
                        failed.push(YamlFailure {
                            file_name: stem.to_string(),
                            path,
                            reason,
                        });
                    }
                }
            }
        }

        parsed.sort_by(|a, b| a.path.cmp(&b.path));
        failed.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(YamlScan { parsed, failed })
    }
}
