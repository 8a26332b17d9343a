use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

pub fn sha256_reader_hex<R: Read>(mut reader: R) -> Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 64 * 1024];
    loop {
        let read = reader
            .read(&mut buffer)
            .context("failed reading input while hashing")?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn sha256_file_hex(path: &Path) -> Result<String> {
    let file = File::open(path)
        .with_context(|| format!("failed to open installer file: {}", path.display()))?;
    sha256_reader_hex(BufReader::new(file))
        .with_context(|| format!("failed to hash installer file: {}", path.display()))
}

/// Case-insensitive comparison of a file's digest with an expected one.
pub fn verify_sha256_file(path: &Path, expected_hex: &str) -> Result<bool> {
    Ok(sha256_file_hex(path)?.eq_ignore_ascii_case(expected_hex.trim()))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    static NEXT_TEMP: AtomicU64 = AtomicU64::new(0);

    fn temp_file(contents: &[u8]) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock must be after epoch")
            .as_nanos();
        let sequence = NEXT_TEMP.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "wingsmith-security-{}-{nanos}-{sequence}.bin",
            std::process::id()
        ));
        std::fs::write(&path, contents).expect("must write temp file");
        path
    }

    #[test]
    fn sha256_hex_matches_known_digests() {
        assert_eq!(sha256_hex(b""), EMPTY_SHA256);
        assert_eq!(sha256_hex(b"abc"), ABC_SHA256);
    }

    #[test]
    fn reader_digest_matches_slice_digest_across_buffer_boundaries() {
        let payload = vec![0x5a_u8; 64 * 1024 * 2 + 17];
        let streamed =
            sha256_reader_hex(Cursor::new(&payload)).expect("hashing a cursor must succeed");
        assert_eq!(streamed, sha256_hex(&payload));
    }

    #[test]
    fn verify_sha256_file_ignores_case_and_whitespace() {
        let path = temp_file(b"abc");
        assert!(verify_sha256_file(&path, &ABC_SHA256.to_ascii_uppercase())
            .expect("verification must complete"));
        assert!(verify_sha256_file(&path, &format!(" {ABC_SHA256}\n"))
            .expect("verification must complete"));
        let _ = std::fs::remove_file(&path);

        let other = temp_file(b"abd");
        assert!(!verify_sha256_file(&other, ABC_SHA256).expect("verification must complete"));
        let _ = std::fs::remove_file(&other);
    }

    #[test]
    fn file_digest_reads_from_disk() {
        let path = temp_file(b"abc");
        assert_eq!(
            sha256_file_hex(&path).expect("hashing must succeed"),
            ABC_SHA256
        );
        assert!(verify_sha256_file(&path, ABC_SHA256).expect("verification must complete"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn file_digest_reports_missing_file() {
        let path = std::env::temp_dir().join("wingsmith-security-missing-file.bin");
        let err = sha256_file_hex(&path).expect_err("missing file must fail");
        assert!(err.to_string().contains("failed to open installer file"));
    }
}
