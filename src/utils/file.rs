//! File utilities for upload operations.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Calculate SHA-256 checksum of content.
pub fn calculate_checksum(content: &str) -> String {
    let hash = Sha256::digest(content.as_bytes());
    hex::encode(hash)
}

/// Read a file as text, falling back to Latin-1 when the bytes are not
/// valid UTF-8.
pub fn read_text_with_fallback(path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(path)?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        // Latin-1 maps every byte to the code point of the same value
        Err(e) => Ok(e.into_bytes().iter().map(|&b| b as char).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_checksum_is_stable() {
        let a = calculate_checksum("hello");
        let b = calculate_checksum("hello");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, calculate_checksum("world"));
    }

    #[test]
    fn test_read_utf8_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all("héllo wörld".as_bytes()).unwrap();
        let text = read_text_with_fallback(file.path()).unwrap();
        assert_eq!(text, "héllo wörld");
    }

    #[test]
    fn test_read_latin1_fallback() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        // "café" encoded as Latin-1: 0xE9 is not valid UTF-8 on its own
        file.write_all(&[0x63, 0x61, 0x66, 0xE9]).unwrap();
        let text = read_text_with_fallback(file.path()).unwrap();
        assert_eq!(text, "café");
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_text_with_fallback(Path::new("/nonexistent/file.txt"));
        assert!(result.is_err());
    }
}
