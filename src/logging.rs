use anyhow::{Context, Result};
use std::path::Path;

/// Route the `log` facade to a file. The terminal belongs to the UI.
pub fn init(log_file: &Path, level: log::LevelFilter) -> Result<()> {
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(
            fern::log_file(log_file)
                .with_context(|| format!("Failed to open log file {}", log_file.display()))?,
        )
        .apply()
        .context("Logger already initialized")?;

    Ok(())
}
