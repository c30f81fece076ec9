use std::path::{Path, PathBuf};

use compio::fs;
use snafu::{OptionExt, ResultExt, Snafu};
use tracing::debug;

use crate::tree::SnapshotRecord;

const SESSION_FILE_NAME: &str = "session";

/// Where the session file lives: the classic `~/.i3` directory when it
/// exists, otherwise `<XDG config home>/i3`.
fn session_file_path(home: &Path, xdg_config_home: &Path) -> PathBuf {
    let primary = home.join(".i3");
    let dir = if primary.is_dir() {
        primary
    } else {
        xdg_config_home.join("i3")
    };
    dir.join(SESSION_FILE_NAME)
}

/// Persists one captured layout tree as an opaque binary blob
/// (bincode-encoded, zstd-compressed). The format only needs to
/// round-trip through this tool, not to be portable.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn at_default_location() -> Result<Self, SessionStoreError> {
        let home = dirs::home_dir().context(NoHomeDirSnafu)?;
        let xdg_config_home = dirs::config_dir().context(NoHomeDirSnafu)?;
        Ok(Self::at(session_file_path(&home, &xdg_config_home)))
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted session. A missing or undecodable file is an
    /// error; callers report it and skip the replay entirely.
    pub async fn read(&self) -> Result<SnapshotRecord, SessionStoreError> {
        debug!("Reading session from {}", self.path.display());
        let bytes = fs::read(&self.path).await.context(ReadSnafu {
            path: self.path.clone(),
        })?;
        let encoded = zstd::decode_all(bytes.as_slice()).context(DecompressSnafu)?;
        let (session, _) =
            bincode::serde::decode_from_slice(&encoded, bincode::config::standard())
                .context(DecodeSnafu)?;
        Ok(session)
    }

    pub async fn write(&self, session: &SnapshotRecord) -> Result<(), SessionStoreError> {
        debug!("Writing session to {}", self.path.display());
        let encoded = bincode::serde::encode_to_vec(session, bincode::config::standard())
            .context(EncodeSnafu)?;
        let compressed =
            zstd::encode_all(encoded.as_slice(), zstd::DEFAULT_COMPRESSION_LEVEL)
                .context(CompressSnafu)?;

        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent).await;
        }
        let res = fs::write(&self.path, compressed).await;
        res.0.context(WriteSnafu {
            path: self.path.clone(),
        })?;
        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum SessionStoreError {
    #[snafu(display("Could not determine a home directory"))]
    NoHomeDir,
    #[snafu(display("Failed to read session file '{}'", path.display()))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write session file '{}'", path.display()))]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Session file is not a saved session"))]
    DecompressError { source: std::io::Error },
    #[snafu(display("Session file could not be decoded"))]
    DecodeError { source: bincode::error::DecodeError },
    #[snafu(display("Failed to encode the session"))]
    EncodeError { source: bincode::error::EncodeError },
    #[snafu(display("Failed to compress the session"))]
    CompressError { source: std::io::Error },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Orientation;

    fn sample_session() -> SnapshotRecord {
        SnapshotRecord {
            id: 1,
            name: Some("root".into()),
            orientation: Orientation::Horizontal,
            num: None,
            window: None,
            nodes: Some(vec![SnapshotRecord {
                id: 2,
                name: Some("1".into()),
                orientation: Orientation::None,
                num: Some(1),
                window: None,
                nodes: Some(vec![SnapshotRecord {
                    id: 3,
                    name: Some("terminal".into()),
                    orientation: Orientation::None,
                    num: None,
                    window: Some(77),
                    nodes: Some(vec![]),
                    process: Some("urxvt".into()),
                }]),
                process: None,
            }]),
            process: None,
        }
    }

    #[compio::test]
    async fn written_sessions_read_back_value_equal() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("session"));
        let session = sample_session();

        store.write(&session).await.unwrap();
        let loaded = store.read().await.unwrap();

        assert_eq!(loaded, session);
    }

    #[compio::test]
    async fn write_creates_the_config_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("i3").join("session"));

        store.write(&sample_session()).await.unwrap();

        assert!(store.path().is_file());
    }

    #[compio::test]
    async fn a_missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("session"));

        let result = store.read().await;
        assert!(matches!(result, Err(SessionStoreError::ReadError { .. })));
    }

    #[compio::test]
    async fn garbage_on_disk_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session");
        std::fs::write(&path, b"definitely not a session").unwrap();

        let result = SessionStore::at(path).read().await;
        assert!(matches!(
            result,
            Err(SessionStoreError::DecompressError { .. })
        ));
    }

    #[test]
    fn prefers_the_classic_i3_directory_when_present() {
        let home = tempfile::tempdir().unwrap();
        let xdg = tempfile::tempdir().unwrap();
        std::fs::create_dir(home.path().join(".i3")).unwrap();

        let path = session_file_path(home.path(), xdg.path());
        assert_eq!(path, home.path().join(".i3").join("session"));
    }

    #[test]
    fn falls_back_to_the_xdg_config_home() {
        let home = tempfile::tempdir().unwrap();
        let xdg = tempfile::tempdir().unwrap();

        let path = session_file_path(home.path(), xdg.path());
        assert_eq!(path, xdg.path().join("i3").join("session"));
    }
}
