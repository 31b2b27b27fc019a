//! Transaction types and canonical hashing.

mod attribute;
mod coin;
mod payload;

pub use attribute::{
    AttributeError, AttributeUsage, DataLayout, TransactionAttribute, MAX_ATTRIBUTE_DATA,
};
pub use coin::{CoinReference, TransactionOutput};
pub use payload::{
    payload_decoder, PayloadDecoder, PublishData, RegisterData, StateDescriptor, StateType,
    TransactionData, TransactionType,
};

use crate::error::{DecodeError, Result};
use crate::fixed8::Fixed8;
use crate::hash::hash256;
use crate::io::{array_size, encode_into, BinaryReader, BinaryWriter, Decodable, Encodable};
use crate::uint::UInt256;
use crate::witness::Witness;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_ATTRIBUTES: usize = 16;
pub const MAX_OUTPUTS: usize = 65_536;

/// Errors from building a transaction that would not survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("{tx_type:?} does not define version {version}")]
    UnsupportedVersion { tx_type: TransactionType, version: u8 },
    #[error("{field} is not encoded in version {version}")]
    FieldRequiresVersion { field: &'static str, version: u8 },
    #[error("negative gas {0}")]
    NegativeGas(Fixed8),
    #[error("{field} of length {len} exceeds {max}")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

/// A transaction as carried in blocks and relayed between peers.
///
/// Fields are public. A value edited by hand only round-trips through
/// `to_bytes`/`from_bytes` while [`Transaction::validate`] passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Payload format version; see `TransactionType::max_version`.
    pub version: u8,
    pub data: TransactionData,
    pub attributes: Vec<TransactionAttribute>,
    pub inputs: Vec<CoinReference>,
    pub outputs: Vec<TransactionOutput>,
    /// Not part of the hash.
    pub witnesses: Vec<Witness>,
}

impl Transaction {
    /// Create a transaction with empty shared lists.
    pub fn new(version: u8, data: TransactionData) -> std::result::Result<Self, TransactionError> {
        data.validate(version)?;
        Ok(Self::unchecked(version, data))
    }

    fn unchecked(version: u8, data: TransactionData) -> Self {
        Self {
            version,
            data,
            attributes: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            witnesses: Vec::new(),
        }
    }

    /// Create a miner transaction.
    pub fn miner(nonce: u32) -> Self {
        Self::unchecked(0, TransactionData::Miner { nonce })
    }

    /// Create a contract (plain transfer) transaction.
    pub fn contract(inputs: Vec<CoinReference>, outputs: Vec<TransactionOutput>) -> Self {
        Self {
            inputs,
            outputs,
            ..Self::unchecked(0, TransactionData::Contract)
        }
    }

    /// Create a version 1 invocation transaction.
    pub fn invocation(
        script: Vec<u8>,
        gas: Fixed8,
    ) -> std::result::Result<Self, TransactionError> {
        Self::new(1, TransactionData::Invocation { script, gas })
    }

    /// Check the version, version-dependent fields and list lengths.
    pub fn validate(&self) -> std::result::Result<(), TransactionError> {
        self.data.validate(self.version)?;
        for (field, len, max) in [
            ("attributes", self.attributes.len(), MAX_ATTRIBUTES),
            ("outputs", self.outputs.len(), MAX_OUTPUTS),
        ] {
            if len > max {
                return Err(TransactionError::TooLong { field, len, max });
            }
        }
        Ok(())
    }

    pub fn tx_type(&self) -> TransactionType {
        self.data.tx_type()
    }

    /// Size of the signable projection: everything except the witnesses.
    pub fn unsigned_size(&self) -> usize {
        2 + self.data.size(self.version)
            + array_size(&self.attributes)
            + array_size(&self.inputs)
            + array_size(&self.outputs)
    }

    /// Write the signable projection.
    pub fn encode_unsigned(&self, writer: &mut BinaryWriter<'_>) {
        writer.write_u8(self.tx_type() as u8);
        writer.write_u8(self.version);
        self.data.encode(writer, self.version);
        writer.write_array(&self.attributes);
        writer.write_array(&self.inputs);
        writer.write_array(&self.outputs);
    }

    /// The bytes that signatures commit to.
    pub fn signable_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_into(&Unsigned(self), &mut buf);
        buf
    }

    /// Transaction id: `hash256` of the signable projection.
    pub fn hash(&self) -> UInt256 {
        hash256(&self.signable_bytes())
    }

    /// Sum of output values, or `None` on overflow.
    pub fn output_total(&self) -> Option<Fixed8> {
        self.outputs
            .iter()
            .try_fold(Fixed8::ZERO, |acc, out| acc.checked_add(out.value))
    }
}

/// Adapter so the signable projection goes through the size-checked writer.
struct Unsigned<'a>(&'a Transaction);

impl Encodable for Unsigned<'_> {
    fn size(&self) -> usize {
        self.0.unsigned_size()
    }

    fn encode(&self, writer: &mut BinaryWriter<'_>) {
        self.0.encode_unsigned(writer);
    }
}

impl Encodable for Transaction {
    fn size(&self) -> usize {
        self.unsigned_size() + array_size(&self.witnesses)
    }

    fn encode(&self, writer: &mut BinaryWriter<'_>) {
        self.encode_unsigned(writer);
        writer.write_array(&self.witnesses);
    }
}

impl Decodable for Transaction {
    fn decode(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let tx_type = TransactionType::try_from(reader.read_u8()?)?;
        let version = reader.read_u8()?;
        if version > tx_type.max_version() {
            return Err(DecodeError::malformed(
                "transaction version",
                format!("{tx_type:?} does not define version {version}"),
            ));
        }
        let data = payload_decoder(tx_type)(reader, version)?;
        Ok(Self {
            version,
            data,
            attributes: reader.read_array_max(MAX_ATTRIBUTES)?,
            inputs: reader.read_array()?,
            outputs: reader.read_array_max(MAX_OUTPUTS)?,
            witnesses: reader.read_array()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{from_bytes, to_bytes};
    use crate::uint::UInt160;

    fn sample_transfer() -> Transaction {
        let mut tx = Transaction::contract(
            vec![CoinReference {
                prev_hash: UInt256::from_bytes([1; 32]),
                prev_index: 0,
            }],
            vec![TransactionOutput {
                asset_id: UInt256::from_bytes([2; 32]),
                value: Fixed8::from_coins(10).unwrap(),
                script_hash: UInt160::from_bytes([3; 20]),
            }],
        );
        tx.attributes.push(TransactionAttribute::remark("memo").unwrap());
        tx.witnesses.push(Witness::new(vec![0x40; 64], vec![0x21; 35]));
        tx
    }

    #[test]
    fn test_minimal_transaction_size() {
        let tx = Transaction::new(0, TransactionData::Contract).unwrap();
        let bytes = to_bytes(&tx);
        assert_eq!(bytes, vec![0x80, 0x00, 0, 0, 0, 0]);
        assert_eq!(tx.size(), 6);
        assert_eq!(from_bytes::<Transaction>(&bytes).unwrap(), tx);
    }

    #[test]
    fn test_miner_layout() {
        let tx = Transaction::miner(0x0102_0304);
        let bytes = to_bytes(&tx);
        assert_eq!(&bytes[..6], &[0x00, 0x00, 0x04, 0x03, 0x02, 0x01]);
        assert_eq!(tx.tx_type(), TransactionType::Miner);
    }

    #[test]
    fn test_transfer_roundtrip() {
        let tx = sample_transfer();
        let bytes = to_bytes(&tx);
        assert_eq!(bytes.len(), tx.size());
        assert_eq!(from_bytes::<Transaction>(&bytes).unwrap(), tx);
    }

    #[test]
    fn test_signable_excludes_witnesses() {
        let tx = sample_transfer();
        let signable = tx.signable_bytes();
        assert_eq!(signable.len(), tx.unsigned_size());
        assert!(to_bytes(&tx).starts_with(&signable));

        let mut resigned = tx.clone();
        resigned.witnesses = vec![Witness::new(vec![0x41; 64], vec![0x21; 35])];
        assert_eq!(resigned.hash(), tx.hash());
    }

    #[test]
    fn test_hash_covers_signable_fields() {
        let tx = sample_transfer();

        let mut changed = tx.clone();
        changed.outputs[0].value = Fixed8::from_coins(11).unwrap();
        assert_ne!(changed.hash(), tx.hash());

        let mut changed = tx.clone();
        changed.inputs[0].prev_index = 1;
        assert_ne!(changed.hash(), tx.hash());

        let mut changed = tx.clone();
        changed.attributes.clear();
        assert_ne!(changed.hash(), tx.hash());

        assert_eq!(tx.hash(), sample_transfer().hash());
    }

    #[test]
    fn test_hash_is_hash256_of_signable() {
        let tx = Transaction::miner(7);
        assert_eq!(tx.hash(), hash256(&[0x00, 0x00, 7, 0, 0, 0, 0, 0, 0]));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = from_bytes::<Transaction>(&[0x03, 0x00, 0, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { field: "transaction type", .. }));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let err = from_bytes::<Transaction>(&[0x80, 0x01, 0, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { field: "transaction version", .. }));
    }

    #[test]
    fn test_too_many_attributes() {
        let mut tx = Transaction::contract(vec![], vec![]);
        tx.attributes = vec![TransactionAttribute::remark("x").unwrap(); MAX_ATTRIBUTES];
        assert_eq!(tx.validate(), Ok(()));
        assert_eq!(from_bytes::<Transaction>(&to_bytes(&tx)).unwrap(), tx);

        tx.attributes.push(TransactionAttribute::remark("x").unwrap());
        assert!(matches!(
            tx.validate(),
            Err(TransactionError::TooLong { field: "attributes", len: 17, max: 16 })
        ));
        let err = from_bytes::<Transaction>(&to_bytes(&tx)).unwrap_err();
        assert!(matches!(err, DecodeError::SizeLimitExceeded { len: 17, max: 16, .. }));
    }

    #[test]
    fn test_constructors_check_version_fields() {
        assert_eq!(
            Transaction::new(5, TransactionData::Contract),
            Err(TransactionError::UnsupportedVersion {
                tx_type: TransactionType::Contract,
                version: 5
            })
        );
        assert!(Transaction::new(
            0,
            TransactionData::Invocation {
                script: vec![],
                gas: Fixed8::ONE
            }
        )
        .is_err());
        assert_eq!(
            Transaction::invocation(vec![], Fixed8(-1)),
            Err(TransactionError::NegativeGas(Fixed8(-1)))
        );
        assert!(Transaction::invocation(vec![], Fixed8::ONE).is_ok());
    }

    #[test]
    fn test_embedded_key_must_be_compressed() {
        let compressed =
            hex::decode("036b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296")
                .unwrap();
        let key = crate::ecc::ECPoint::decode_point(&compressed, crate::ecc::Curve::secp256r1())
            .unwrap();
        let tx = Transaction::new(0, TransactionData::Enrollment { public_key: key.clone() })
            .unwrap();
        let bytes = to_bytes(&tx);
        assert_eq!(&bytes[2..35], compressed.as_slice());
        assert_eq!(from_bytes::<Transaction>(&bytes).unwrap(), tx);

        // Same transaction with the key spelled out uncompressed.
        let mut uncompressed = bytes[..2].to_vec();
        uncompressed.extend_from_slice(&key.encode_point(false));
        uncompressed.extend_from_slice(&bytes[35..]);
        let err = from_bytes::<Transaction>(&uncompressed).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { field: "ec point", .. }));
    }

    #[test]
    fn test_every_prefix_is_insufficient() {
        let bytes = to_bytes(&sample_transfer());
        for end in 0..bytes.len() {
            let err = from_bytes::<Transaction>(&bytes[..end]).unwrap_err();
            assert!(err.is_insufficient_data(), "prefix {end}: {err:?}");
        }
    }

    #[test]
    fn test_output_total() {
        let mut tx = sample_transfer();
        assert_eq!(tx.output_total(), Some(Fixed8::from_coins(10).unwrap()));
        tx.outputs.push(TransactionOutput {
            value: Fixed8::from_raw(i64::MAX),
            ..tx.outputs[0]
        });
        assert_eq!(tx.output_total(), None);
    }

    #[test]
    fn test_json_tagged_payload() {
        let tx = Transaction::miner(5);
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["data"]["type"], "miner");
        assert_eq!(json["data"]["nonce"], 5);
        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, tx);
    }
}
