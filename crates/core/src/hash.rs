//! SHA-256 based hashing utilities for the ledger.
//!
//! Digests are created per call; there is no shared hasher state.

use crate::uint::{UInt160, UInt256};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Single SHA-256.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Double SHA-256, the identifying hash for transactions and blocks.
pub fn hash256(data: &[u8]) -> UInt256 {
    UInt256::from_bytes(Sha256::digest(Sha256::digest(data)).into())
}

/// Double SHA-256 over several pieces, as if they were concatenated.
pub fn hash256_concat(parts: &[&[u8]]) -> UInt256 {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    UInt256::from_bytes(Sha256::digest(hasher.finalize()).into())
}

/// RIPEMD-160 of SHA-256, used for script hashes.
pub fn hash160(data: &[u8]) -> UInt160 {
    UInt160::from_bytes(Ripemd160::digest(Sha256::digest(data)).into())
}
