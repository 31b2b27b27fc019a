//! Record forms written to the block and transaction columns of the store.
//!
//! Both records start with a state-version byte. Only version 0 exists.

use crate::block::{Block, TrimmedBlock};
use crate::error::{DecodeError, Result};
use crate::io::{BinaryReader, BinaryWriter, Decodable, Encodable};
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};

pub const STATE_VERSION: u8 = 0;

fn read_state_version(reader: &mut BinaryReader<'_>) -> Result<()> {
    match reader.read_u8()? {
        STATE_VERSION => Ok(()),
        other => Err(DecodeError::malformed(
            "state version",
            format!("unsupported version {other}"),
        )),
    }
}

/// A stored block: its accumulated system fee and trimmed form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockState {
    /// In whole-coin units, not `Fixed8`.
    pub system_fee_amount: i64,
    pub trimmed_block: TrimmedBlock,
}

impl BlockState {
    pub fn new(system_fee_amount: i64, block: &Block) -> Self {
        Self {
            system_fee_amount,
            trimmed_block: block.trim(),
        }
    }
}

impl Encodable for BlockState {
    fn size(&self) -> usize {
        1 + 8 + self.trimmed_block.size()
    }

    fn encode(&self, writer: &mut BinaryWriter<'_>) {
        writer.write_u8(STATE_VERSION);
        writer.write_i64(self.system_fee_amount);
        writer.write(&self.trimmed_block);
    }
}

impl Decodable for BlockState {
    fn decode(reader: &mut BinaryReader<'_>) -> Result<Self> {
        read_state_version(reader)?;
        Ok(Self {
            system_fee_amount: reader.read_i64()?,
            trimmed_block: reader.read()?,
        })
    }
}

/// A stored transaction with the height of its block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionState {
    pub block_index: u32,
    pub transaction: Transaction,
}

impl Encodable for TransactionState {
    fn size(&self) -> usize {
        1 + 4 + self.transaction.size()
    }

    fn encode(&self, writer: &mut BinaryWriter<'_>) {
        writer.write_u8(STATE_VERSION);
        writer.write_u32(self.block_index);
        writer.write(&self.transaction);
    }
}

impl Decodable for TransactionState {
    fn decode(reader: &mut BinaryReader<'_>) -> Result<Self> {
        read_state_version(reader)?;
        Ok(Self {
            block_index: reader.read_u32()?,
            transaction: reader.read()?,
        })
    }
}
