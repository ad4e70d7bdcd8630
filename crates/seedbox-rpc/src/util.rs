//! Helpers for building call arguments.

use std::io;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Read a `.torrent` file and base64-encode it for
/// [`TorrentAddArgs::metainfo`](crate::TorrentAddArgs::metainfo).
pub async fn torrent_base64(path: impl AsRef<Path>) -> io::Result<String> {
    let contents = tokio::fs::read(path.as_ref()).await?;
    Ok(STANDARD.encode(contents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_encodes_file_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sample.torrent");
        tokio::fs::write(&path, b"d8:announce3:urle").await.unwrap();

        let encoded = torrent_base64(&path).await.unwrap();
        assert_eq!(encoded, "ZDg6YW5ub3VuY2UzOnVybGU=");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = torrent_base64(dir.path().join("nope.torrent"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
