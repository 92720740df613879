//! Content fingerprinting: strong block keys (SHA-1 / BLAKE3) and Adler-32 checksums

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

/// Digest used to derive a block's content key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeyAlgorithm {
    /// SHA-1, 160-bit keys
    #[default]
    Sha1,
    /// BLAKE3, 256-bit keys
    Blake3,
}

impl KeyAlgorithm {
    /// Length of the raw digest in bytes
    pub fn digest_len(&self) -> usize {
        match self {
            KeyAlgorithm::Sha1 => 20,
            KeyAlgorithm::Blake3 => 32,
        }
    }
}

impl std::str::FromStr for KeyAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" => Ok(KeyAlgorithm::Sha1),
            "blake3" => Ok(KeyAlgorithm::Blake3),
            other => Err(format!("unknown key algorithm: {}", other)),
        }
    }
}

/// Strong digest identifying a block's content. Used as the dedup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockKey(pub Vec<u8>);

impl BlockKey {
    /// Return the key as an uppercase hex string
    pub fn to_hex(&self) -> String {
        hex::encode_upper(&self.0)
    }
    /// Return the raw digest bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for BlockKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Adler-32 of a block. Weaker than the key and only used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(pub u32);

impl Checksum {
    /// Return the checksum as 8 uppercase hex digits
    pub fn to_hex(&self) -> String {
        format!("{:08X}", self.0)
    }
}

impl std::fmt::Display for Checksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Key and checksum computed together for one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    /// Strong content key
    pub key: BlockKey,
    /// Auxiliary checksum
    pub checksum: Checksum,
}

/// Compute the strong key of `data` with the given algorithm
pub fn block_key(data: &[u8], algo: KeyAlgorithm) -> BlockKey {
    match algo {
        KeyAlgorithm::Sha1 => BlockKey(Sha1::digest(data).to_vec()),
        KeyAlgorithm::Blake3 => BlockKey(blake3::hash(data).as_bytes().to_vec()),
    }
}

/// Compute the Adler-32 checksum of `data`
pub fn checksum(data: &[u8]) -> Checksum {
    Checksum(adler::adler32_slice(data))
}

/// Fingerprint a block: strong key plus auxiliary checksum.
/// Pure function of the bytes; identical blocks always yield identical fingerprints.
pub fn fingerprint(data: &[u8], algo: KeyAlgorithm) -> Fingerprint {
    Fingerprint {
        key: block_key(data, algo),
        checksum: checksum(data),
    }
}
