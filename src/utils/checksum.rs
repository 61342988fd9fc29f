use std::{fs::File, io, path::Path};

use sha2::{Digest, Sha256};

pub struct ChecksumUtils {}

impl ChecksumUtils {
    /// Hex encoded SHA-256 of the file, streamed.
    pub fn sha256_file(path: &Path) -> io::Result<String> {
        let mut file = File::open(path)?;
        let mut hasher = Sha256::new();
        io::copy(&mut file, &mut hasher)?;
        Ok(hex::encode(hasher.finalize()))
    }

    #[cfg(test)]
    pub fn sha256_bytes(data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }

    pub fn is_valid_sha256(value: &str) -> bool {
        value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Template values left behind when a formula was authored without a
    /// real release, e.g. `REPLACE_WITH_SHA256_CHECKSUM`.
    pub fn is_placeholder(value: &str) -> bool {
        let upper = value.to_ascii_uppercase();
        value.trim().is_empty()
            || upper.contains("REPLACE")
            || upper.contains("CHECKSUM")
            || upper.contains("TODO")
            || (Self::is_valid_sha256(value) && value.chars().all(|c| c == '0'))
    }

    pub fn matches(expected: &str, actual: &str) -> bool {
        expected.eq_ignore_ascii_case(actual)
    }
}
