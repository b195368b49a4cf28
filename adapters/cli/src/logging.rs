use std::{
    fs::{self, File, OpenOptions},
    io,
    path::Path,
    sync::Mutex,
};

use anyhow::{anyhow, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Log files larger than this are truncated at startup.
pub(crate) const MAX_LOG_BYTES: u64 = 5 * 1024 * 1024;

/// Installs the global subscriber, writing to `log_path` or to stderr when
/// the file cannot be opened.
pub(crate) fn init(log_path: &Path, filter: &str) -> Result<()> {
    let (env_filter, filter_error) = match EnvFilter::try_new(filter) {
        Ok(env_filter) => (env_filter, None),
        Err(error) => (EnvFilter::new("info"), Some(error)),
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true);

    let installed = match open_log_file(log_path) {
        Ok(file) => builder
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init(),
        Err(error) => {
            eprintln!("cannot open {}: {error}; logging to stderr", log_path.display());
            builder.with_writer(io::stderr).try_init()
        }
    };
    installed.map_err(|error| anyhow!("failed to install log subscriber: {error}"))?;

    if let Some(error) = filter_error {
        warn!(filter, %error, "invalid log filter, falling back to info");
    }
    info!(path = %log_path.display(), "logging initialised");
    Ok(())
}

fn open_log_file(path: &Path) -> io::Result<File> {
    let oversized = fs::metadata(path).map_or(false, |metadata| metadata.len() > MAX_LOG_BYTES);
    let mut options = OpenOptions::new();
    let _ = options.create(true);
    if oversized {
        let _ = options.write(true).truncate(true);
    } else {
        let _ = options.append(true);
    }
    options.open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn scratch_file(label: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("serpents-cli-{}-{label}", std::process::id()));
        fs::create_dir_all(&dir).expect("create scratch dir");
        dir.join("app.log")
    }

    #[test]
    fn small_logs_are_appended_to() {
        let path = scratch_file("append");
        fs::write(&path, b"previous run\n").expect("seed log");

        let mut file = open_log_file(&path).expect("open log");
        file.write_all(b"next run\n").expect("append");

        let contents = fs::read_to_string(&path).expect("read log");
        assert_eq!(contents, "previous run\nnext run\n");
    }

    #[test]
    fn oversized_logs_are_truncated() {
        let path = scratch_file("truncate");
        let file = File::create(&path).expect("create log");
        file.set_len(MAX_LOG_BYTES + 1).expect("grow log");

        let file = open_log_file(&path).expect("open log");

        assert_eq!(file.metadata().expect("metadata").len(), 0);
    }
}
