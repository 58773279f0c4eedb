use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Appends records to a file. The terminal belongs to the renderer, so nothing goes to stdout.
pub struct FileLogger {
    level: log::LevelFilter,
    file: Mutex<File>,
}

impl FileLogger {
    pub fn init(path: &Path, level: log::LevelFilter) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("could not open log file {}", path.display()))?;
        log::set_boxed_logger(Box::new(FileLogger {
            level,
            file: Mutex::new(file),
        }))
        .context("logger already installed")?;
        log::set_max_level(level);
        Ok(())
    }

    fn format(record: &log::Record) -> String {
        format!(
            "{} {:<5} {}: {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = Self::format(record);
        if let Ok(mut f) = self.file.lock() {
            let _ = f.write_all(line.as_bytes());
        }
    }

    fn flush(&self) {
        if let Ok(mut f) = self.file.lock() {
            let _ = f.flush();
        }
    }
}
