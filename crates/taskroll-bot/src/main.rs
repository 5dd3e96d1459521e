mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use taskroll_discord_runtime::{run_discord_bot, DiscordBotConfig};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::{load_or_init_config, DEFAULT_DATA_DIR};

#[derive(Debug, Parser)]
#[command(
    name = "taskroll",
    about = "Discord bot that keeps per-user weighted task lists",
    version
)]
struct Cli {
    #[arg(
        long,
        short = 'c',
        env = "TASKROLL_CONFIG_FILE",
        default_value = "taskroll.toml",
        help = "Config file path; a starter file is written here on first run."
    )]
    config_file: PathBuf,

    #[arg(
        long,
        env = "TASKROLL_DATA_DIR",
        help = "Directory for per-user task files; overrides the config file."
    )]
    data_dir: Option<PathBuf>,
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

/// Flag beats config file beats the built-in default.
fn resolve_data_dir(flag: Option<PathBuf>, config: Option<PathBuf>) -> PathBuf {
    flag.or(config)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_or_init_config(&cli.config_file)?;
    let data_dir = resolve_data_dir(cli.data_dir, config.data_dir);
    println!(
        "starting task bot with prefix {} and data dir {}",
        config.command_prefix,
        data_dir.display()
    );
    run_discord_bot(DiscordBotConfig {
        token: config.token,
        command_prefix: config.command_prefix,
        data_dir: Some(data_dir),
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_data_dir_flag_beats_config_beats_default() {
        assert_eq!(
            resolve_data_dir(Some(PathBuf::from("/from-flag")), Some(PathBuf::from("/cfg"))),
            PathBuf::from("/from-flag")
        );
        assert_eq!(
            resolve_data_dir(None, Some(PathBuf::from("/cfg"))),
            PathBuf::from("/cfg")
        );
        assert_eq!(resolve_data_dir(None, None), PathBuf::from(DEFAULT_DATA_DIR));
    }

    #[test]
    fn unit_cli_flags_parse() {
        let cli = Cli::try_parse_from([
            "taskroll",
            "-c",
            "custom.toml",
            "--data-dir",
            "/tmp/tasks",
        ])
        .unwrap();
        assert_eq!(cli.config_file, PathBuf::from("custom.toml"));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/tasks")));
    }
}
