use clap::Parser;
use std::path::PathBuf;

/// Track coding-practice problems in the terminal.
#[derive(Debug, Parser)]
#[command(name = "practicelog", version)]
pub struct Cli {
    /// Directory holding the problem store
    #[arg(long, env = "PRACTICELOG_DIR")]
    pub data_dir: Option<PathBuf>,
    /// Log file path (defaults to <data-dir>/practicelog.log)
    #[arg(long, env = "PRACTICELOG_LOG")]
    pub log_file: Option<PathBuf>,
    /// Log level: error, warn, info, debug, trace
    #[arg(long, env = "PRACTICELOG_LOG_LEVEL", default_value = "info", value_parser = parse_level)]
    pub log_level: log::LevelFilter,
}

fn parse_level(raw: &str) -> Result<log::LevelFilter, String> {
    raw.parse()
        .map_err(|_| format!("unknown log level '{}'", raw))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_file: PathBuf,
    pub log_level: log::LevelFilter,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Self {
        let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
        let log_file = cli
            .log_file
            .unwrap_or_else(|| data_dir.join("practicelog.log"));

        Config {
            data_dir,
            log_file,
            log_level: cli.log_level,
        }
    }

    pub fn export_path(&self) -> PathBuf {
        self.data_dir.join("problems.html")
    }
}

fn default_data_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".practicelog")
}
