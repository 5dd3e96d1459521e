//! Config file loading with first-run bootstrap.
//!
//! A missing config file is not an error worth a backtrace: the loader
//! writes a starter file and tells the operator where to paste the bot
//! token, mirroring how the bot refuses to start while the token is
//! empty.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use taskroll_core::write_text_atomic;
use thiserror::Error;

pub const DEFAULT_COMMAND_PREFIX: &str = "--";
pub const DEFAULT_DATA_DIR: &str = "taskroll-data";

const CONFIG_TEMPLATE: &str = r#"# taskroll bot configuration.
[taskroll]
# Discord bot token; the bot refuses to start while this is empty.
token = ""
# Prefix glued to command verbs, e.g. --edit.
command_prefix = "--"
# Directory for per-user task files.
data_dir = "taskroll-data"
"#;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("bot token not found; copy the bot token into \"{}\"", .path.display())]
    MissingToken { path: PathBuf },
    #[error("failed to parse config file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub token: String,
    pub command_prefix: String,
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    taskroll: ConfigSection,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigSection {
    #[serde(default)]
    token: String,
    #[serde(default)]
    command_prefix: String,
    #[serde(default)]
    data_dir: Option<PathBuf>,
}

/// Loads the config file, writing a starter template on first run.
///
/// Returns [`ConfigError::MissingToken`] until the operator fills the
/// token in; the caller exits nonzero on that. An empty command prefix
/// falls back to [`DEFAULT_COMMAND_PREFIX`].
pub fn load_or_init_config(path: &Path) -> Result<BotConfig> {
    if !path.exists() {
        write_text_atomic(path, CONFIG_TEMPLATE)
            .with_context(|| format!("failed to write config template {}", path.display()))?;
        println!("wrote starter config to {}", path.display());
        return Err(ConfigError::MissingToken {
            path: path.to_path_buf(),
        }
        .into());
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let file: ConfigFile = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let section = file.taskroll;
    let token = section.token.trim().to_string();
    if token.is_empty() {
        return Err(ConfigError::MissingToken {
            path: path.to_path_buf(),
        }
        .into());
    }
    let command_prefix = if section.command_prefix.is_empty() {
        DEFAULT_COMMAND_PREFIX.to_string()
    } else {
        section.command_prefix
    };
    Ok(BotConfig {
        token,
        command_prefix,
        data_dir: section.data_dir,
    })
}
