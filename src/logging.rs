use std::fs::{self, OpenOptions};
use std::path::Path;

use env_logger::{Builder, Env, Target};

use crate::error::Result;

/// Environment variable holding the log filter, e.g. `SNAG_LOG=debug`
pub const LOG_ENV: &str = "SNAG_LOG";

/// Route the `log` facade into an append-only file. The terminal belongs
/// to the TUI, so nothing is written to stderr.
pub fn init_file_logger(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    // A second init (tests, restarts) keeps the first logger
    let _ = Builder::from_env(Env::default().filter_or(LOG_ENV, "info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_log_file_and_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state").join("snag.log");
        init_file_logger(&path).unwrap();
        assert!(path.exists());
    }
}
