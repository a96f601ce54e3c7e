use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use common::{EnableFlag, Error, Instrument, Result};

/// Read the instrument list: one symbol per line, blank lines ignored.
///
/// An unreadable file or a list with no symbols is a fatal startup error.
pub fn load_instruments(path: impl AsRef<Path>) -> Result<Vec<Instrument>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("failed to read instrument list '{}': {e}", path.display()))
    })?;

    let instruments: Vec<Instrument> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Instrument::from)
        .collect();

    if instruments.is_empty() {
        return Err(Error::Config(format!(
            "no instruments found in '{}'",
            path.display()
        )));
    }

    info!(count = instruments.len(), instruments = ?instruments, "Instruments loaded");
    Ok(instruments)
}

/// Enable flag backed by a text file holding a single token.
///
/// `on` in any letter case enables monitoring; anything else, including a
/// missing file, disables it. The file is re-read on every check.
#[derive(Debug, Clone)]
pub struct StatusFile {
    path: PathBuf,
}

impl StatusFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl EnableFlag for StatusFile {
    async fn is_enabled(&self) -> bool {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let status = content.trim();
                debug!(status, "Status file read");
                status.eq_ignore_ascii_case("on")
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read status file, treating as off");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruments_skip_blank_lines_and_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ativos.txt");
        std::fs::write(&path, "EURUSD\n\n  GBPUSD  \n\t\nBTC/USD\n").unwrap();

        let list = load_instruments(&path).unwrap();
        assert_eq!(
            list,
            vec![
                Instrument::from("EURUSD"),
                Instrument::from("GBPUSD"),
                Instrument::from("BTC/USD"),
            ]
        );
    }

    #[test]
    fn empty_instrument_list_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ativos.txt");
        std::fs::write(&path, "\n   \n").unwrap();
        assert!(matches!(load_instruments(&path), Err(Error::Config(_))));
    }

    #[test]
    fn missing_instrument_list_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_instruments(dir.path().join("absent.txt")).is_err());
    }

    #[tokio::test]
    async fn status_on_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.txt");
        let flag = StatusFile::new(&path);

        for token in ["on", "ON\n", "  On  "] {
            std::fs::write(&path, token).unwrap();
            assert!(flag.is_enabled().await, "token {token:?}");
        }
        for token in ["off", "", "onn", "yes"] {
            std::fs::write(&path, token).unwrap();
            assert!(!flag.is_enabled().await, "token {token:?}");
        }
    }

    #[tokio::test]
    async fn missing_status_file_means_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let flag = StatusFile::new(dir.path().join("status.txt"));
        assert!(!flag.is_enabled().await);
    }

    #[tokio::test]
    async fn status_is_reread_every_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.txt");
        let flag = StatusFile::new(&path);

        std::fs::write(&path, "off").unwrap();
        assert!(!flag.is_enabled().await);
        std::fs::write(&path, "on").unwrap();
        assert!(flag.is_enabled().await);
    }
}
