//! Transaction attributes: a usage byte followed by usage-specific data.

use crate::error::{DecodeError, Result};
use crate::io::{var_bytes_size, BinaryReader, BinaryWriter, Decodable, Encodable};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum length of description and remark data.
pub const MAX_ATTRIBUTE_DATA: usize = 65_535;

/// The usage byte of an attribute.
///
/// Usages form open ranges (`Hash1..=Hash15`, `Remark..=Remark15`), so this
/// is a newtype over the byte rather than an enum.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttributeUsage(pub u8);

impl AttributeUsage {
    pub const CONTRACT_HASH: Self = Self(0x00);
    pub const ECDH02: Self = Self(0x02);
    pub const ECDH03: Self = Self(0x03);
    pub const SCRIPT: Self = Self(0x20);
    pub const VOTE: Self = Self(0x30);
    pub const DESCRIPTION_URL: Self = Self(0x81);
    pub const DESCRIPTION: Self = Self(0x90);
    pub const HASH1: Self = Self(0xa1);
    pub const HASH15: Self = Self(0xaf);
    pub const REMARK: Self = Self(0xf0);
    pub const REMARK15: Self = Self(0xff);

    /// How the data of this usage is laid out, or `None` for unknown usages.
    pub fn layout(self) -> Option<DataLayout> {
        match self.0 {
            0x00 | 0x02 | 0x03 | 0x30 | 0xa1..=0xaf => Some(DataLayout::Fixed(32)),
            0x20 => Some(DataLayout::Fixed(20)),
            0x81 => Some(DataLayout::ShortPrefixed),
            0x90 | 0xf0..=0xff => Some(DataLayout::VarPrefixed),
            _ => None,
        }
    }
}

impl fmt::Debug for AttributeUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttributeUsage({:#04x})", self.0)
    }
}

/// Wire layout of attribute data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataLayout {
    /// Exactly this many bytes, no prefix.
    Fixed(usize),
    /// One length byte, then up to 255 bytes.
    ShortPrefixed,
    /// Var-int length, then up to `MAX_ATTRIBUTE_DATA` bytes.
    VarPrefixed,
}

/// Errors from building an attribute by hand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    #[error("unknown attribute usage {0:#04x}")]
    UnknownUsage(u8),
    #[error("attribute usage {usage:#04x} requires {expected} bytes, got {actual}")]
    WrongLength {
        usage: u8,
        expected: usize,
        actual: usize,
    },
    #[error("attribute data of {len} bytes exceeds {max}")]
    TooLong { len: usize, max: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAttribute")]
pub struct TransactionAttribute {
    usage: AttributeUsage,
    #[serde(with = "crate::serde_hex")]
    data: Vec<u8>,
}

#[derive(Deserialize)]
struct RawAttribute {
    usage: AttributeUsage,
    #[serde(with = "crate::serde_hex")]
    data: Vec<u8>,
}

impl TryFrom<RawAttribute> for TransactionAttribute {
    type Error = AttributeError;

    fn try_from(raw: RawAttribute) -> std::result::Result<Self, Self::Error> {
        Self::new(raw.usage, raw.data)
    }
}

impl TransactionAttribute {
    /// Build an attribute, checking that `data` fits the usage's layout.
    pub fn new(usage: AttributeUsage, data: Vec<u8>) -> std::result::Result<Self, AttributeError> {
        let layout = usage.layout().ok_or(AttributeError::UnknownUsage(usage.0))?;
        let max = match layout {
            DataLayout::Fixed(expected) if data.len() != expected => {
                return Err(AttributeError::WrongLength {
                    usage: usage.0,
                    expected,
                    actual: data.len(),
                });
            }
            DataLayout::Fixed(expected) => expected,
            DataLayout::ShortPrefixed => u8::MAX as usize,
            DataLayout::VarPrefixed => MAX_ATTRIBUTE_DATA,
        };
        if data.len() > max {
            return Err(AttributeError::TooLong {
                len: data.len(),
                max,
            });
        }
        Ok(Self { usage, data })
    }

    /// A free-form remark.
    pub fn remark(text: &str) -> std::result::Result<Self, AttributeError> {
        Self::new(AttributeUsage::REMARK, text.as_bytes().to_vec())
    }

    pub fn usage(&self) -> AttributeUsage {
        self.usage
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn layout(&self) -> DataLayout {
        // Construction and decoding both reject unknown usages.
        self.usage.layout().unwrap_or(DataLayout::VarPrefixed)
    }
}

impl Encodable for TransactionAttribute {
    fn size(&self) -> usize {
        1 + match self.layout() {
            DataLayout::Fixed(_) => self.data.len(),
            DataLayout::ShortPrefixed => 1 + self.data.len(),
            DataLayout::VarPrefixed => var_bytes_size(self.data.len()),
        }
    }

    fn encode(&self, writer: &mut BinaryWriter<'_>) {
        writer.write_u8(self.usage.0);
        match self.layout() {
            DataLayout::Fixed(_) => writer.write_bytes(&self.data),
            DataLayout::ShortPrefixed => {
                writer.write_u8(self.data.len() as u8);
                writer.write_bytes(&self.data);
            }
            DataLayout::VarPrefixed => writer.write_var_bytes(&self.data),
        }
    }
}

impl Decodable for TransactionAttribute {
    fn decode(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let usage = AttributeUsage(reader.read_u8()?);
        let data = match usage.layout() {
            Some(DataLayout::Fixed(len)) => reader.read_fixed_bytes(len)?,
            Some(DataLayout::ShortPrefixed) => {
                let len = reader.read_u8()?;
                reader.read_fixed_bytes(len as usize)?
            }
            Some(DataLayout::VarPrefixed) => reader.read_var_bytes_max(MAX_ATTRIBUTE_DATA)?,
            None => {
                return Err(DecodeError::malformed(
                    "attribute",
                    format!("unknown usage {:#04x}", usage.0),
                ))
            }
        };
        Ok(Self { usage, data })
    }
}
