use std::{
    fs,
    path::{Path, PathBuf},
};

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::debug;

use crate::{
    models::args::AppArgs,
    utils::{
        dir::DirUtils,
        errors::{ResultTrait, ResultWithError},
        variables::VariablesUtils,
    },
};

/// On-disk configuration. Every field is optional.
#[derive(Debug, Default, Deserialize, Clone, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub prefix: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub tap: Option<PathBuf>,
    pub history_log: Option<bool>,
}

impl ConfigFile {
    pub fn from_yaml(content: &str) -> ResultWithError<Self> {
        let expanded = VariablesUtils::expand_env_vars(content)?;
        debug!("Config expanded");
        serde_yaml::from_str(&expanded).auto_err("Invalid config format")
    }
}

/// Effective settings: defaults, then the config file, then CLI flags.
#[derive(Debug, Clone)]
pub struct Config {
    pub prefix: PathBuf,
    pub cache_dir: PathBuf,
    pub tap: PathBuf,
    pub history_log: bool,
}

impl Config {
    pub fn load(args: &AppArgs) -> ResultWithError<Self> {
        let path = match &args.config {
            Some(path) => Some(path.clone()),
            None => DirUtils::config_dir()
                .ok()
                .map(|dir| dir.join("config.yaml"))
                .filter(|path| path.is_file()),
        };

        let file = match path {
            Some(path) => Self::read_file(&path)?,
            None => {
                debug!("No config file found, using defaults");
                ConfigFile::default()
            }
        };

        let mut config = Self::from_file(file)?;
        if let Some(prefix) = &args.prefix {
            config.prefix = prefix.clone();
        }
        if let Some(tap) = &args.tap {
            config.tap = tap.clone();
        }

        debug!("Effective config: {:?}", config);
        Ok(config)
    }

    fn read_file(path: &Path) -> ResultWithError<ConfigFile> {
        debug!("Loading config from {:?}", path);
        let content = fs::read_to_string(path)
            .auto_err(&format!("Could not read config file {}", path.display()))?;
        ConfigFile::from_yaml(&content)
    }

    pub fn from_file(file: ConfigFile) -> ResultWithError<Self> {
        let prefix = match file.prefix {
            Some(prefix) => prefix,
            None => DirUtils::home_dir()?.join(".local"),
        };
        let cache_dir = match file.cache_dir {
            Some(dir) => dir,
            None => DirUtils::cache_dir()?,
        };
        let tap = match file.tap {
            Some(tap) => tap,
            None => DirUtils::curr_dir()?.join("Formula"),
        };

        Ok(Self {
            prefix,
            cache_dir,
            tap,
            history_log: file.history_log.unwrap_or(true),
        })
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.prefix.join("bin")
    }

    pub fn receipts_dir(&self) -> PathBuf {
        self.prefix.join("var").join("formulary").join("receipts")
    }
}
