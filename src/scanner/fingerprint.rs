//! Streaming content fingerprints.
//!
//! # Overview
//!
//! A [`Fingerprint`] is a fixed 32-byte digest of a file's full content.
//! Two files with equal fingerprints are treated as content-identical; no
//! collision handling is attempted beyond the digest's own resistance.
//!
//! Content is fed to the digest in [`READ_CHUNK_SIZE`] chunks so files of
//! any size are processed without being fully resident in memory.
//!
//! # Example
//!
//! ```
//! use dupescan::scanner::{FingerprintAlgorithm, Fingerprinter};
//!
//! let fingerprinter = Fingerprinter::new(FingerprintAlgorithm::Blake3);
//! let a = fingerprinter.fingerprint_bytes(b"hello");
//! let b = fingerprinter.fingerprint_bytes(b"hello");
//! let c = fingerprinter.fingerprint_bytes(b"world");
//!
//! assert_eq!(a, b);
//! assert_ne!(a, c);
//! assert_eq!(a.to_hex().len(), 64);
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length in bytes of every fingerprint, regardless of algorithm.
pub const FINGERPRINT_LEN: usize = 32;

/// Size of the buffer used when streaming file content into the digest.
pub const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Fixed-length content digest used as the duplicate index key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Wrap raw digest bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; FINGERPRINT_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    /// Lowercase hexadecimal representation (64 characters).
    #[must_use]
    pub fn to_hex(&self) -> String {
        hash_to_hex(&self.0)
    }

    /// Parse a 64-character hexadecimal string.
    ///
    /// Returns `None` if the string has the wrong length or contains
    /// non-hex characters.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        hex_to_hash(hex).map(Self)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Encode bytes as lowercase hexadecimal.
#[must_use]
pub fn hash_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode a 64-character hexadecimal string into digest bytes.
#[must_use]
pub fn hex_to_hash(hex: &str) -> Option<[u8; FINGERPRINT_LEN]> {
    if hex.len() != FINGERPRINT_LEN * 2 {
        return None;
    }
    let mut hash = [0u8; FINGERPRINT_LEN];
    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        let s = std::str::from_utf8(chunk).ok()?;
        hash[i] = u8::from_str_radix(s, 16).ok()?;
    }
    Some(hash)
}

/// Digest algorithm used to fingerprint file content.
///
/// Both algorithms produce 32-byte digests. A session uses exactly one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintAlgorithm {
    /// BLAKE3 (default)
    #[default]
    Blake3,
    /// SHA-256
    Sha256,
}

impl fmt::Display for FingerprintAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FingerprintAlgorithm::Blake3 => write!(f, "blake3"),
            FingerprintAlgorithm::Sha256 => write!(f, "sha256"),
        }
    }
}

/// In-progress digest state for one file.
enum DigestState {
    Blake3(Box<blake3::Hasher>),
    Sha256(Sha256),
}

impl DigestState {
    fn new(algorithm: FingerprintAlgorithm) -> Self {
        match algorithm {
            FingerprintAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
            FingerprintAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Blake3(hasher) => {
                hasher.update(data);
            }
            Self::Sha256(hasher) => hasher.update(data),
        }
    }

    fn finalize(self) -> Fingerprint {
        match self {
            Self::Blake3(hasher) => Fingerprint(*hasher.finalize().as_bytes()),
            Self::Sha256(hasher) => Fingerprint(hasher.finalize().into()),
        }
    }
}

/// Computes content fingerprints.
///
/// Stateless apart from the chosen algorithm; cheap to copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fingerprinter {
    algorithm: FingerprintAlgorithm,
}

impl Fingerprinter {
    /// Create a fingerprinter for the given algorithm.
    #[must_use]
    pub fn new(algorithm: FingerprintAlgorithm) -> Self {
        Self { algorithm }
    }

    /// The digest algorithm in use.
    #[must_use]
    pub fn algorithm(&self) -> FingerprintAlgorithm {
        self.algorithm
    }

    /// Fingerprint an in-memory buffer.
    #[must_use]
    pub fn fingerprint_bytes(&self, data: &[u8]) -> Fingerprint {
        let mut state = DigestState::new(self.algorithm);
        state.update(data);
        state.finalize()
    }

    /// Stream a reader to exhaustion and fingerprint its content.
    ///
    /// Returns the fingerprint together with the number of bytes consumed.
    ///
    /// # Errors
    ///
    /// Any read error is returned as-is. Reads interrupted by a signal
    /// (`ErrorKind::Interrupted`) are resumed, everything else is not.
    pub fn fingerprint_reader<R: Read>(&self, mut reader: R) -> io::Result<(Fingerprint, u64)> {
        let mut state = DigestState::new(self.algorithm);
        let mut buffer = vec![0u8; READ_CHUNK_SIZE];
        let mut total: u64 = 0;

        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            state.update(&buffer[..n]);
            total += n as u64;
        }

        Ok((state.finalize(), total))
    }

    /// Open and fingerprint a file on disk.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be opened or read.
    pub fn fingerprint_file(&self, path: &Path) -> io::Result<Fingerprint> {
        let file = File::open(path)?;
        self.fingerprint_reader(file).map(|(fingerprint, _)| fingerprint)
    }
}
