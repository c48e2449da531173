use std::fs::{self, OpenOptions};
use std::path::Path;

use crate::config::LogSettings;

/// Send `log` records to `file`. The terminal belongs to the TUI, so when
/// there is no usable log file nothing is logged at all.
pub fn init(settings: &LogSettings, file: Option<&Path>) {
    let Some(path) = file else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };

    // `RUST_LOG` wins over the configured level.
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(settings.level.as_str()),
    )
    .format_timestamp_millis()
    .target(env_logger::Target::Pipe(Box::new(file)))
    .try_init();
}
