//! Coin references (inputs) and transaction outputs.

use crate::error::Result;
use crate::fixed8::Fixed8;
use crate::io::{BinaryReader, BinaryWriter, Decodable, Encodable};
use crate::uint::{UInt160, UInt256};
use serde::{Deserialize, Serialize};

/// Points at output `prev_index` of transaction `prev_hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoinReference {
    pub prev_hash: UInt256,
    pub prev_index: u16,
}

impl CoinReference {
    pub const SIZE: usize = UInt256::SIZE + 2;

    pub fn new(prev_hash: UInt256, prev_index: u16) -> Self {
        Self {
            prev_hash,
            prev_index,
        }
    }
}

impl Encodable for CoinReference {
    fn size(&self) -> usize {
        Self::SIZE
    }

    fn encode(&self, writer: &mut BinaryWriter<'_>) {
        writer.write(&self.prev_hash);
        writer.write_u16(self.prev_index);
    }
}

impl Decodable for CoinReference {
    fn decode(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            prev_hash: reader.read()?,
            prev_index: reader.read_u16()?,
        })
    }
}

/// An amount of an asset locked to a script hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub asset_id: UInt256,
    pub value: Fixed8,
    pub script_hash: UInt160,
}

impl TransactionOutput {
    pub const SIZE: usize = UInt256::SIZE + Fixed8::SIZE + UInt160::SIZE;

    pub fn new(asset_id: UInt256, value: Fixed8, script_hash: UInt160) -> Self {
        Self {
            asset_id,
            value,
            script_hash,
        }
    }
}

impl Encodable for TransactionOutput {
    fn size(&self) -> usize {
        Self::SIZE
    }

    fn encode(&self, writer: &mut BinaryWriter<'_>) {
        writer.write(&self.asset_id);
        writer.write(&self.value);
        writer.write(&self.script_hash);
    }
}

impl Decodable for TransactionOutput {
    fn decode(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            asset_id: reader.read()?,
            value: reader.read()?,
            script_hash: reader.read()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{from_bytes, to_bytes};

    #[test]
    fn test_coin_reference_layout() {
        let coin = CoinReference::new(UInt256::from_bytes([0x11; 32]), 0x0203);
        let bytes = to_bytes(&coin);
        assert_eq!(bytes.len(), 34);
        assert_eq!(&bytes[32..], &[0x03, 0x02]);
        assert_eq!(from_bytes::<CoinReference>(&bytes).unwrap(), coin);
    }

    #[test]
    fn test_output_layout() {
        let output = TransactionOutput::new(
            UInt256::from_bytes([0xaa; 32]),
            Fixed8::ONE,
            UInt160::from_bytes([0xbb; 20]),
        );
        let bytes = to_bytes(&output);
        assert_eq!(bytes.len(), 60);
        assert_eq!(&bytes[32..40], &100_000_000i64.to_le_bytes());
        assert_eq!(from_bytes::<TransactionOutput>(&bytes).unwrap(), output);
    }

    #[test]
    fn test_output_truncated() {
        let bytes = to_bytes(&TransactionOutput::new(UInt256::ZERO, Fixed8::ZERO, UInt160::ZERO));
        let err = from_bytes::<TransactionOutput>(&bytes[..59]).unwrap_err();
        assert!(err.is_insufficient_data());
    }
}
