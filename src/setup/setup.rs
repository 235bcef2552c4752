use std::fs::{self, File, OpenOptions};
use std::io::{self, Error, ErrorKind};
use std::path::{Path, PathBuf};

use slog::{o, Drain, Level, Logger};
use slog_term::Decorator;

use super::log_format::AbdFormat;

/// LogConfig tells where and how much to log.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LogConfig {
    /// Log at Debug level instead of Info.
    pub debug: bool,

    /// Prefix every line with a timestamp.
    pub timestamp: bool,

    /// Append to this file instead of writing to stdout.
    pub file: Option<PathBuf>,
}

impl LogConfig {
    pub fn level(&self) -> Level {
        if self.debug {
            Level::Debug
        } else {
            Level::Info
        }
    }
}

/// new_logger builds a root logger from `conf`.
/// Records are formatted by `AbdFormat` and written by a background thread.
pub fn new_logger(conf: &LogConfig) -> io::Result<Logger> {
    let logger = match conf.file {
        Some(ref path) => {
            let file = open_log_file(path)?;
            build_logger(slog_term::PlainDecorator::new(file), conf)
        }
        None => {
            let decorator = slog_term::TermDecorator::new().stdout().build();
            build_logger(decorator, conf)
        }
    };

    Ok(logger)
}

fn build_logger<D>(decorator: D, conf: &LogConfig) -> Logger
where
    D: Decorator + Send + 'static,
{
    let drain = AbdFormat::new(decorator, conf.timestamp).fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = drain.filter_level(conf.level()).fuse();

    Logger::root(drain, o!())
}

/// Opens log file with append mode. Creates a new log file if it doesn't exist.
fn open_log_file<P: AsRef<Path>>(path: P) -> io::Result<File> {
    let path = path.as_ref();
    let parent = path.parent().ok_or_else(|| {
        Error::new(
            ErrorKind::Other,
            "Unable to get parent directory of log file",
        )
    })?;
    if !parent.as_os_str().is_empty() && !parent.is_dir() {
        fs::create_dir_all(parent)?
    }
    OpenOptions::new().append(true).create(true).open(path)
}
