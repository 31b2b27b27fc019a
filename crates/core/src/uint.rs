//! Fixed-size 160-bit and 256-bit identifiers.
//!
//! Both types store their wire bytes as little-endian words so equality and
//! hashing compare a few machine words instead of a byte array. Ordering and
//! text rendering treat the value as a little-endian number: the most
//! significant word compares first and prints first, so the display string is
//! the wire bytes reversed.

use crate::error::Result;
use crate::io::{BinaryReader, BinaryWriter, Decodable, Encodable};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from building an identifier out of caller-supplied data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UIntError {
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

fn word_u64(bytes: &[u8], offset: usize) -> u64 {
    let mut w = [0u8; 8];
    w.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(w)
}

fn parse_display_hex<const N: usize>(s: &str) -> std::result::Result<[u8; N], UIntError> {
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    let mut bytes = hex::decode(s)?;
    if bytes.len() != N {
        return Err(UIntError::InvalidLength {
            expected: N,
            actual: bytes.len(),
        });
    }
    bytes.reverse();
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// A 160-bit identifier, used for script hashes and addresses.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UInt160 {
    d1: u64,
    d2: u64,
    d3: u32,
}

impl UInt160 {
    pub const SIZE: usize = 20;

    pub const ZERO: Self = Self { d1: 0, d2: 0, d3: 0 };

    /// Build from the 20 wire bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        let mut d3 = [0u8; 4];
        d3.copy_from_slice(&bytes[16..20]);
        Self {
            d1: word_u64(&bytes, 0),
            d2: word_u64(&bytes, 8),
            d3: u32::from_le_bytes(d3),
        }
    }

    /// Build from a slice that must be exactly 20 bytes long.
    pub fn from_slice(bytes: &[u8]) -> std::result::Result<Self, UIntError> {
        let arr: [u8; 20] = bytes.try_into().map_err(|_| UIntError::InvalidLength {
            expected: Self::SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self::from_bytes(arr))
    }

    /// The 20 wire bytes.
    pub fn to_array(&self) -> [u8; 20] {
        let mut out = [0u8; 20];
        out[0..8].copy_from_slice(&self.d1.to_le_bytes());
        out[8..16].copy_from_slice(&self.d2.to_le_bytes());
        out[16..20].copy_from_slice(&self.d3.to_le_bytes());
        out
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Ord for UInt160 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.d3
            .cmp(&other.d3)
            .then(self.d2.cmp(&other.d2))
            .then(self.d1.cmp(&other.d1))
    }
}

impl PartialOrd for UInt160 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for UInt160 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}{:016x}{:016x}", self.d3, self.d2, self.d1)
    }
}

impl fmt::Debug for UInt160 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UInt160({self})")
    }
}

impl FromStr for UInt160 {
    type Err = UIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse_display_hex::<20>(s).map(Self::from_bytes)
    }
}

impl From<[u8; 20]> for UInt160 {
    fn from(bytes: [u8; 20]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl Encodable for UInt160 {
    fn size(&self) -> usize {
        Self::SIZE
    }

    fn encode(&self, writer: &mut BinaryWriter<'_>) {
        writer.write_u64(self.d1);
        writer.write_u64(self.d2);
        writer.write_u32(self.d3);
    }
}

impl Decodable for UInt160 {
    fn decode(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self::from_bytes(reader.read_array_exact()?))
    }
}

/// A 256-bit identifier, used for block, transaction and asset hashes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UInt256 {
    d1: u64,
    d2: u64,
    d3: u64,
    d4: u64,
}

impl UInt256 {
    pub const SIZE: usize = 32;

    pub const ZERO: Self = Self {
        d1: 0,
        d2: 0,
        d3: 0,
        d4: 0,
    };

    /// Build from the 32 wire bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self {
            d1: word_u64(&bytes, 0),
            d2: word_u64(&bytes, 8),
            d3: word_u64(&bytes, 16),
            d4: word_u64(&bytes, 24),
        }
    }

    /// Build from a slice that must be exactly 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> std::result::Result<Self, UIntError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| UIntError::InvalidLength {
            expected: Self::SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self::from_bytes(arr))
    }

    /// The 32 wire bytes.
    pub fn to_array(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out[0..8].copy_from_slice(&self.d1.to_le_bytes());
        out[8..16].copy_from_slice(&self.d2.to_le_bytes());
        out[16..24].copy_from_slice(&self.d3.to_le_bytes());
        out[24..32].copy_from_slice(&self.d4.to_le_bytes());
        out
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Ord for UInt256 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.d4
            .cmp(&other.d4)
            .then(self.d3.cmp(&other.d3))
            .then(self.d2.cmp(&other.d2))
            .then(self.d1.cmp(&other.d1))
    }
}

impl PartialOrd for UInt256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for UInt256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{:016x}{:016x}{:016x}{:016x}",
            self.d4, self.d3, self.d2, self.d1
        )
    }
}

impl fmt::Debug for UInt256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UInt256({self})")
    }
}

impl FromStr for UInt256 {
    type Err = UIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse_display_hex::<32>(s).map(Self::from_bytes)
    }
}

impl From<[u8; 32]> for UInt256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl Encodable for UInt256 {
    fn size(&self) -> usize {
        Self::SIZE
    }

    fn encode(&self, writer: &mut BinaryWriter<'_>) {
        writer.write_u64(self.d1);
        writer.write_u64(self.d2);
        writer.write_u64(self.d3);
        writer.write_u64(self.d4);
    }
}

impl Decodable for UInt256 {
    fn decode(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self::from_bytes(reader.read_array_exact()?))
    }
}

// Serde uses the display string so JSON output matches what users see.
macro_rules! impl_serde_as_display {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

impl_serde_as_display!(UInt160);
impl_serde_as_display!(UInt256);
