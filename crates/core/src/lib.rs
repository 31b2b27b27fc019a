//! Wire format and public-key codec for a NEO-style ledger.
//!
//! This crate provides the byte-level types shared by the network and
//! storage layers:
//! - Primitive codec (little-endian integers, var-ints, var-bytes)
//! - Fixed-size identifiers (`UInt160`, `UInt256`)
//! - Transactions, blocks and their persisted record forms
//! - Canonical hashing (`hash256`, `hash160`, merkle root)
//! - Elliptic-curve point decoding, including square roots modulo `p`
//!
//! # Example
//!
//! ```rust
//! use chainwire_core::{from_bytes, to_bytes, Transaction};
//!
//! let tx = Transaction::miner(42);
//! let bytes = to_bytes(&tx);
//! let decoded: Transaction = from_bytes(&bytes).unwrap();
//! assert_eq!(decoded.hash(), tx.hash());
//! ```

pub mod block;
pub mod config;
pub mod ecc;
pub mod error;
pub mod fixed8;
pub mod hash;
pub mod io;
pub mod merkle;
pub(crate) mod serde_hex;
pub mod state;
pub mod transaction;
pub mod uint;
pub mod witness;

// Re-export commonly used types at the crate root
pub use block::{Block, BlockHeader, TrimmedBlock};
pub use config::{CodecLimits, SqrtConfig};
pub use ecc::{Curve, ECPoint};
pub use error::{DecodeError, Result};
pub use fixed8::Fixed8;
pub use hash::{hash160, hash256, sha256};
pub use io::{
    from_bytes, from_bytes_with_limits, to_bytes, BinaryReader, BinaryWriter, Decodable, Encodable,
};
pub use merkle::merkle_root;
pub use state::{BlockState, TransactionState};
pub use transaction::{
    CoinReference, Transaction, TransactionAttribute, TransactionData, TransactionError,
    TransactionOutput, TransactionType,
};
pub use uint::{UInt160, UInt256, UIntError};
pub use witness::Witness;
