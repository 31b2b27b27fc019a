//! Block and block header structures.

use crate::error::{DecodeError, Result};
use crate::hash::hash256;
use crate::io::{array_size, BinaryReader, BinaryWriter, Decodable, Encodable};
use crate::merkle::merkle_root;
use crate::transaction::Transaction;
use crate::uint::{UInt160, UInt256};
use crate::witness::Witness;
use serde::{Deserialize, Serialize};

pub const MAX_TRANSACTIONS_PER_BLOCK: usize = 65_536;

/// Bytes of the unsigned header fields.
const UNSIGNED_HEADER_SIZE: usize = 4 + UInt256::SIZE * 2 + 4 + 4 + 8 + UInt160::SIZE;

/// The header of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: u32,
    /// Hash of the previous block.
    pub prev_hash: UInt256,
    /// Merkle root of the transaction hashes.
    pub merkle_root: UInt256,
    /// Unix timestamp in seconds.
    pub timestamp: u32,
    /// Block height (0 for genesis).
    pub index: u32,
    pub consensus_data: u64,
    /// Script hash of the validators allowed to sign the next block.
    pub next_consensus: UInt160,
    pub witness: Witness,
}

impl BlockHeader {
    fn encode_unsigned(&self, writer: &mut BinaryWriter<'_>) {
        writer.write_u32(self.version);
        writer.write(&self.prev_hash);
        writer.write(&self.merkle_root);
        writer.write_u32(self.timestamp);
        writer.write_u32(self.index);
        writer.write_u64(self.consensus_data);
        writer.write(&self.next_consensus);
    }

    /// The bytes the block witness signs: version through next_consensus.
    pub fn signable_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(UNSIGNED_HEADER_SIZE);
        self.encode_unsigned(&mut BinaryWriter::new(&mut buf));
        debug_assert_eq!(buf.len(), UNSIGNED_HEADER_SIZE);
        buf
    }

    /// Calculate the hash of this block header.
    pub fn hash(&self) -> UInt256 {
        hash256(&self.signable_bytes())
    }

    /// Check if this is the genesis header.
    pub fn is_genesis(&self) -> bool {
        self.index == 0 && self.prev_hash.is_zero()
    }
}

impl Encodable for BlockHeader {
    fn size(&self) -> usize {
        UNSIGNED_HEADER_SIZE + 1 + self.witness.size()
    }

    fn encode(&self, writer: &mut BinaryWriter<'_>) {
        self.encode_unsigned(writer);
        writer.write_u8(1);
        writer.write(&self.witness);
    }
}

impl Decodable for BlockHeader {
    fn decode(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let version = reader.read_u32()?;
        let prev_hash = reader.read()?;
        let merkle_root = reader.read()?;
        let timestamp = reader.read_u32()?;
        let index = reader.read_u32()?;
        let consensus_data = reader.read_u64()?;
        let next_consensus = reader.read()?;
        let witness_count = reader.read_u8()?;
        if witness_count != 1 {
            return Err(DecodeError::malformed(
                "witness count",
                format!("expected 1, got {witness_count}"),
            ));
        }
        Ok(Self {
            version,
            prev_hash,
            merkle_root,
            timestamp,
            index,
            consensus_data,
            next_consensus,
            witness: reader.read()?,
        })
    }
}

/// A complete block: header plus transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Create a block, setting the header's merkle root from `transactions`.
    pub fn new(mut header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        header.merkle_root = merkle_root(&tx_hashes(&transactions));
        Self {
            header,
            transactions,
        }
    }

    /// Get the block hash (hash of the header).
    pub fn hash(&self) -> UInt256 {
        self.header.hash()
    }

    /// Get the block height.
    pub fn index(&self) -> u32 {
        self.header.index
    }

    /// Get the number of transactions in this block.
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }

    /// Merkle root of the contained transactions.
    pub fn compute_merkle_root(&self) -> UInt256 {
        merkle_root(&tx_hashes(&self.transactions))
    }

    /// Verify the merkle root matches the transactions.
    pub fn verify_merkle_root(&self) -> bool {
        self.compute_merkle_root() == self.header.merkle_root
    }

    /// Drop the transaction bodies, keeping their hashes.
    pub fn trim(&self) -> TrimmedBlock {
        TrimmedBlock {
            header: self.header.clone(),
            hashes: tx_hashes(&self.transactions),
        }
    }
}

fn tx_hashes(transactions: &[Transaction]) -> Vec<UInt256> {
    transactions.iter().map(Transaction::hash).collect()
}

impl Encodable for Block {
    fn size(&self) -> usize {
        self.header.size() + array_size(&self.transactions)
    }

    fn encode(&self, writer: &mut BinaryWriter<'_>) {
        writer.write(&self.header);
        writer.write_array(&self.transactions);
    }
}

impl Decodable for Block {
    fn decode(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            header: reader.read()?,
            transactions: reader.read_array_max(MAX_TRANSACTIONS_PER_BLOCK)?,
        })
    }
}

/// A block as persisted: header plus transaction hashes only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimmedBlock {
    pub header: BlockHeader,
    pub hashes: Vec<UInt256>,
}

impl TrimmedBlock {
    pub fn hash(&self) -> UInt256 {
        self.header.hash()
    }

    pub fn verify_merkle_root(&self) -> bool {
        merkle_root(&self.hashes) == self.header.merkle_root
    }
}

impl From<&Block> for TrimmedBlock {
    fn from(block: &Block) -> Self {
        block.trim()
    }
}

impl Encodable for TrimmedBlock {
    fn size(&self) -> usize {
        self.header.size() + array_size(&self.hashes)
    }

    fn encode(&self, writer: &mut BinaryWriter<'_>) {
        writer.write(&self.header);
        writer.write_array(&self.hashes);
    }
}

impl Decodable for TrimmedBlock {
    fn decode(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            header: reader.read()?,
            hashes: reader.read_array()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed8::Fixed8;
    use crate::io::{from_bytes, to_bytes};

    fn header(index: u32) -> BlockHeader {
        BlockHeader {
            version: 0,
            prev_hash: UInt256::from_bytes([0x11; 32]),
            merkle_root: UInt256::ZERO,
            timestamp: 1_468_595_301,
            index,
            consensus_data: 2_083_236_893,
            next_consensus: UInt160::from_bytes([0x22; 20]),
            witness: Witness::new(vec![], vec![0x51]),
        }
    }

    fn sample_block() -> Block {
        Block::new(
            header(1),
            vec![
                Transaction::miner(42),
                Transaction::invocation(vec![0x00, 0x66], Fixed8::ZERO).unwrap(),
            ],
        )
    }

    #[test]
    fn test_header_layout() {
        let h = header(7);
        let bytes = to_bytes(&h);
        assert_eq!(bytes.len(), h.size());
        assert_eq!(bytes.len(), 4 + 32 + 32 + 4 + 4 + 8 + 20 + 1 + 3);
        assert_eq!(&bytes[72..76], &7u32.to_le_bytes());
        assert_eq!(bytes[UNSIGNED_HEADER_SIZE], 1);
        assert_eq!(from_bytes::<BlockHeader>(&bytes).unwrap(), h);
    }

    #[test]
    fn test_header_hash_ignores_witness() {
        let h = header(3);
        let mut resigned = h.clone();
        resigned.witness = Witness::new(vec![0x40; 64], vec![0x51]);
        assert_eq!(h.hash(), resigned.hash());
        assert_eq!(h.hash(), hash256(&to_bytes(&h)[..UNSIGNED_HEADER_SIZE]));

        let mut later = h.clone();
        later.timestamp += 1;
        assert_ne!(h.hash(), later.hash());
    }

    #[test]
    fn test_witness_count_must_be_one() {
        let mut bytes = to_bytes(&header(0));
        bytes[UNSIGNED_HEADER_SIZE] = 2;
        let err = from_bytes::<BlockHeader>(&bytes).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { field: "witness count", .. }));
    }

    #[test]
    fn test_block_roundtrip_and_merkle() {
        let block = sample_block();
        assert!(block.verify_merkle_root());
        assert_eq!(block.tx_count(), 2);
        let bytes = to_bytes(&block);
        let decoded = from_bytes::<Block>(&bytes).unwrap();
        assert_eq!(decoded, block);
        assert_eq!(decoded.hash(), block.hash());
    }

    #[test]
    fn test_tampered_transaction_breaks_merkle() {
        let mut block = sample_block();
        block.transactions[0] = Transaction::miner(43);
        assert!(!block.verify_merkle_root());
    }

    #[test]
    fn test_empty_block() {
        let block = Block::new(header(0), vec![]);
        assert_eq!(block.header.merkle_root, UInt256::ZERO);
        assert!(!block.header.is_genesis());
        assert_eq!(from_bytes::<Block>(&to_bytes(&block)).unwrap(), block);
    }

    #[test]
    fn test_trimmed_block() {
        let block = sample_block();
        let trimmed = TrimmedBlock::from(&block);
        assert_eq!(
            trimmed.hashes,
            block.transactions.iter().map(Transaction::hash).collect::<Vec<_>>()
        );
        assert_eq!(trimmed.hash(), block.hash());
        assert!(trimmed.verify_merkle_root());
        let bytes = to_bytes(&trimmed);
        assert_eq!(from_bytes::<TrimmedBlock>(&bytes).unwrap(), trimmed);
    }

    #[test]
    fn test_block_prefixes_are_insufficient() {
        let bytes = to_bytes(&sample_block());
        for end in 0..bytes.len() {
            assert!(
                from_bytes::<Block>(&bytes[..end]).unwrap_err().is_insufficient_data(),
                "prefix {end}"
            );
        }
    }
}
