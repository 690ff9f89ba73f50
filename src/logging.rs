use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `WORDMATCH_LOG=debug`
pub const LOG_ENV: &str = "WORDMATCH_LOG";

/// Send tracing output to `path`. The terminal belongs to the UI, so
/// nothing is ever logged to stdout or stderr.
pub fn init_file_logging(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
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
        let path = dir.path().join("state").join("wordmatch.log");

        init_file_logging(&path).unwrap();
        tracing::info!("hello from the test");

        assert!(path.exists());
    }
}
