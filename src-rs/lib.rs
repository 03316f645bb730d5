#![deny(clippy::all)]

pub mod clip;
pub mod config;
pub mod cons;
pub mod llm;
pub mod note;

#[cfg(feature = "node")]
mod ffi;

#[cfg(test)]
mod tests;

use std::sync::Once;

static INIT: Once = Once::new();

const DEFAULT_LOG_FILE: &str = "logs/obsiclip.log";

pub fn init_logger() {
    INIT.call_once(|| {
        use log::LevelFilter;
        use log4rs::append::file::FileAppender;
        use log4rs::config::{Appender, Config, Root};
        use log4rs::encode::pattern::PatternEncoder;

        // Try to load log4rs configuration from file first
        let config_path = std::env::var("LOG4RS_CONFIG").unwrap_or_else(|_| "log4rs.yaml".to_string());
        if log4rs::init_file(&config_path, Default::default()).is_ok() {
            println!("[INIT] Logger initialized from {}", config_path);
            return;
        }
        println!("[INIT] Failed to load {}, falling back to default config", config_path);

        let _ = std::fs::create_dir_all("logs");
        let pattern = "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}";

        let logfile = match FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(pattern)))
            .build(DEFAULT_LOG_FILE) {
            Ok(f) => f,
            Err(e) => {
                println!("[INIT] Failed to create log file: {}", e);
                return;
            }
        };

        let config = match Config::builder()
            .appender(Appender::builder().build("logfile", Box::new(logfile)))
            .build(Root::builder()
                .appender("logfile")
                .build(LevelFilter::Debug)) {
            Ok(c) => c,
            Err(e) => {
                println!("[INIT] Failed to build config: {}", e);
                return;
            }
        };

        match log4rs::init_config(config) {
            Ok(_) => println!("[INIT] Logger initialized successfully"),
            Err(e) => println!("[INIT] Failed to initialize logger: {}", e),
        }
    });
}

#[cfg(feature = "node")]
pub use ffi::*;
