//! Logger set-up shared by the resolver and the demo runner.
use chrono::Local;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::fs::File;
use std::path::Path;

/// Initializes terminal logging and, if `log_file` is given, a copy of the log in that file.
/// Returns `false` if a logger was already installed; the first initialization wins.
pub fn init_logger(level: LevelFilter, log_file: Option<&Path>) -> bool {
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    // Console logger
    loggers.push(TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ));
    // File logger
    if let Some(path) = log_file {
        match File::create(path) {
            Ok(file) => loggers.push(WriteLogger::new(level, Config::default(), file)),
            Err(e) => eprintln!("cannot create log file {}: {}", path.display(), e),
        }
    }
    CombinedLogger::init(loggers).is_ok()
}

/// `<prefix>_YYYY-MM-DD_HH-MM-SS.txt`
pub fn timestamped_log_name(prefix: &str) -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("{}_{}.txt", prefix, date_and_time)
}
