//! Size and SHA-256 of finalized archives.
//!
//! [`record`] always opens its own read-only handle. It must only be called
//! once the writer has been flushed and dropped; a handle that was open
//! during the writes can observe stale contents on some platforms.

use crate::error::{BuildError, BuildResult};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const HASH_BUFFER: usize = 8192;

/// On-disk identity of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Integrity {
    /// Compressed size in bytes.
    pub size: u64,
    /// Lowercase hex SHA-256, no prefix.
    pub sha256: String,
}

/// Reopen `path` read-only and compute its size and digest in one pass.
pub fn record(path: &Path) -> BuildResult<Integrity> {
    let err = |source| BuildError::Integrity {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(err)?;
    let size = file.metadata().map_err(err)?.len();
    let sha256 = sha256_hex_reader(BufReader::new(file)).map_err(err)?;
    Ok(Integrity { size, sha256 })
}

pub(crate) fn sha256_hex_reader<R: Read>(mut reader: R) -> std::io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = [0_u8; HASH_BUFFER];

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn known_digest() {
        let digest = sha256_hex_reader(Cursor::new(b"abc")).unwrap();
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn record_reports_lowercase_hex_without_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.zip");
        std::fs::write(&path, b"abc").unwrap();
        let integrity = record(&path).unwrap();
        assert_eq!(integrity.size, 3);
        assert_eq!(
            integrity.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn record_is_stable_across_reopen_and_tracks_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.zip");
        {
            let mut f = File::create(&path).unwrap();
            f.write_all(&vec![7_u8; 3 * HASH_BUFFER + 11]).unwrap();
        }
        let first = record(&path).unwrap();
        let second = record(&path).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.size, (3 * HASH_BUFFER + 11) as u64);
        assert_eq!(first.sha256.len(), 64);

        std::fs::write(&path, vec![8_u8; 3 * HASH_BUFFER + 11]).unwrap();
        let changed = record(&path).unwrap();
        assert_eq!(changed.size, first.size);
        assert_ne!(changed.sha256, first.sha256);
    }

    #[test]
    fn missing_archive_is_an_integrity_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = record(&dir.path().join("gone.zip")).unwrap_err();
        assert!(matches!(err, BuildError::Integrity { .. }));
    }
}
