//! Type-specific transaction payloads.
//!
//! Each variant's payload sits between the version byte and the shared
//! attribute/input/output lists. Decoding goes through `payload_decoder`,
//! which maps a discriminant to the parser for that variant.

use super::coin::CoinReference;
use super::TransactionError;
use crate::ecc::ECPoint;
use crate::error::{DecodeError, Result};
use crate::fixed8::Fixed8;
use crate::io::{array_size, var_bytes_size, BinaryReader, BinaryWriter, Decodable, Encodable};
use crate::uint::UInt160;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MAX_ASSET_NAME: usize = 1024;
pub const MAX_INVOCATION_SCRIPT: usize = 65_536;
pub const MAX_STATE_DESCRIPTORS: usize = 16;
pub const MAX_PUBLISH_FIELD: usize = 252;
pub const MAX_PUBLISH_DESCRIPTION: usize = 65_536;

/// One-byte transaction discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TransactionType {
    Miner = 0x00,
    Issue = 0x01,
    Claim = 0x02,
    Enrollment = 0x20,
    Register = 0x40,
    Contract = 0x80,
    State = 0x90,
    Publish = 0xd0,
    Invocation = 0xd1,
}

impl TransactionType {
    /// Highest version the payload format defines for this type.
    pub fn max_version(self) -> u8 {
        match self {
            Self::Issue | Self::Publish | Self::Invocation => 1,
            _ => 0,
        }
    }
}

impl TryFrom<u8> for TransactionType {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self> {
        Ok(match value {
            0x00 => Self::Miner,
            0x01 => Self::Issue,
            0x02 => Self::Claim,
            0x20 => Self::Enrollment,
            0x40 => Self::Register,
            0x80 => Self::Contract,
            0x90 => Self::State,
            0xd0 => Self::Publish,
            0xd1 => Self::Invocation,
            other => {
                debug!(tag = other, "unknown transaction type");
                return Err(DecodeError::malformed(
                    "transaction type",
                    format!("unknown discriminant {other:#04x}"),
                ));
            }
        })
    }
}

/// Kind of state a `StateDescriptor` changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum StateType {
    Account = 0x40,
    Validator = 0x48,
}

impl TryFrom<u8> for StateType {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x40 => Ok(Self::Account),
            0x48 => Ok(Self::Validator),
            other => Err(DecodeError::malformed(
                "state type",
                format!("unknown state type {other:#04x}"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDescriptor {
    pub state_type: StateType,
    #[serde(with = "crate::serde_hex")]
    pub key: Vec<u8>,
    pub field: String,
    #[serde(with = "crate::serde_hex")]
    pub value: Vec<u8>,
}

impl Encodable for StateDescriptor {
    fn size(&self) -> usize {
        1 + var_bytes_size(self.key.len())
            + var_bytes_size(self.field.len())
            + var_bytes_size(self.value.len())
    }

    fn encode(&self, writer: &mut BinaryWriter<'_>) {
        writer.write_u8(self.state_type as u8);
        writer.write_var_bytes(&self.key);
        writer.write_var_string(&self.field);
        writer.write_var_bytes(&self.value);
    }
}

impl Decodable for StateDescriptor {
    fn decode(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            state_type: StateType::try_from(reader.read_u8()?)?,
            key: reader.read_var_bytes_max(100)?,
            field: reader.read_var_string_max(32)?,
            value: reader.read_var_bytes_max(65_535)?,
        })
    }
}

/// Payload of a `Register` transaction, which creates an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterData {
    pub asset_type: u8,
    pub name: String,
    pub amount: Fixed8,
    pub precision: u8,
    pub owner: ECPoint,
    pub admin: UInt160,
}

/// Payload of a `Publish` transaction, which deploys a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishData {
    #[serde(with = "crate::serde_hex")]
    pub script: Vec<u8>,
    #[serde(with = "crate::serde_hex")]
    pub parameter_list: Vec<u8>,
    pub return_type: u8,
    /// Only on the wire from version 1.
    pub need_storage: bool,
    pub name: String,
    pub code_version: String,
    pub author: String,
    pub email: String,
    pub description: String,
}

/// The variant-specific part of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionData {
    Miner {
        nonce: u32,
    },
    Issue,
    Claim {
        claims: Vec<CoinReference>,
    },
    Enrollment {
        public_key: ECPoint,
    },
    Register(RegisterData),
    Contract,
    State {
        descriptors: Vec<StateDescriptor>,
    },
    Publish(PublishData),
    Invocation {
        #[serde(with = "crate::serde_hex")]
        script: Vec<u8>,
        /// Only on the wire from version 1.
        gas: Fixed8,
    },
}

impl TransactionData {
    pub fn tx_type(&self) -> TransactionType {
        match self {
            Self::Miner { .. } => TransactionType::Miner,
            Self::Issue => TransactionType::Issue,
            Self::Claim { .. } => TransactionType::Claim,
            Self::Enrollment { .. } => TransactionType::Enrollment,
            Self::Register(_) => TransactionType::Register,
            Self::Contract => TransactionType::Contract,
            Self::State { .. } => TransactionType::State,
            Self::Publish(_) => TransactionType::Publish,
            Self::Invocation { .. } => TransactionType::Invocation,
        }
    }

    /// Encoded payload size for the given transaction version.
    pub fn size(&self, version: u8) -> usize {
        match self {
            Self::Miner { .. } => 4,
            Self::Issue | Self::Contract => 0,
            Self::Claim { claims } => array_size(claims),
            Self::Enrollment { public_key } => public_key.size(),
            Self::Register(r) => {
                1 + var_bytes_size(r.name.len())
                    + Fixed8::SIZE
                    + 1
                    + r.owner.size()
                    + UInt160::SIZE
            }
            Self::State { descriptors } => array_size(descriptors),
            Self::Publish(p) => {
                var_bytes_size(p.script.len())
                    + var_bytes_size(p.parameter_list.len())
                    + 1
                    + usize::from(version >= 1)
                    + var_bytes_size(p.name.len())
                    + var_bytes_size(p.code_version.len())
                    + var_bytes_size(p.author.len())
                    + var_bytes_size(p.email.len())
                    + var_bytes_size(p.description.len())
            }
            Self::Invocation { script, .. } => {
                var_bytes_size(script.len()) + if version >= 1 { Fixed8::SIZE } else { 0 }
            }
        }
    }

    /// Check that this payload encodes under `version` and decodes back to
    /// the same value.
    pub fn validate(&self, version: u8) -> std::result::Result<(), TransactionError> {
        let tx_type = self.tx_type();
        if version > tx_type.max_version() {
            return Err(TransactionError::UnsupportedVersion { tx_type, version });
        }
        match self {
            Self::Register(r) => check_len("asset name", r.name.len(), MAX_ASSET_NAME),
            Self::State { descriptors } => {
                check_len("state descriptors", descriptors.len(), MAX_STATE_DESCRIPTORS)
            }
            Self::Publish(p) => {
                if version == 0 && p.need_storage {
                    return Err(TransactionError::FieldRequiresVersion {
                        field: "need_storage",
                        version,
                    });
                }
                for (field, value) in [
                    ("name", &p.name),
                    ("code_version", &p.code_version),
                    ("author", &p.author),
                    ("email", &p.email),
                ] {
                    check_len(field, value.len(), MAX_PUBLISH_FIELD)?;
                }
                check_len("description", p.description.len(), MAX_PUBLISH_DESCRIPTION)
            }
            Self::Invocation { script, gas } => {
                if *gas < Fixed8::ZERO {
                    return Err(TransactionError::NegativeGas(*gas));
                }
                if version == 0 && *gas != Fixed8::ZERO {
                    return Err(TransactionError::FieldRequiresVersion {
                        field: "gas",
                        version,
                    });
                }
                check_len("invocation script", script.len(), MAX_INVOCATION_SCRIPT)
            }
            _ => Ok(()),
        }
    }

    pub fn encode(&self, writer: &mut BinaryWriter<'_>, version: u8) {
        match self {
            Self::Miner { nonce } => writer.write_u32(*nonce),
            Self::Issue | Self::Contract => {}
            Self::Claim { claims } => writer.write_array(claims),
            Self::Enrollment { public_key } => writer.write(public_key),
            Self::Register(r) => {
                writer.write_u8(r.asset_type);
                writer.write_var_string(&r.name);
                writer.write(&r.amount);
                writer.write_u8(r.precision);
                writer.write(&r.owner);
                writer.write(&r.admin);
            }
            Self::State { descriptors } => writer.write_array(descriptors),
            Self::Publish(p) => {
                writer.write_var_bytes(&p.script);
                writer.write_var_bytes(&p.parameter_list);
                writer.write_u8(p.return_type);
                if version >= 1 {
                    writer.write_bool(p.need_storage);
                }
                writer.write_var_string(&p.name);
                writer.write_var_string(&p.code_version);
                writer.write_var_string(&p.author);
                writer.write_var_string(&p.email);
                writer.write_var_string(&p.description);
            }
            Self::Invocation { script, gas } => {
                writer.write_var_bytes(script);
                if version >= 1 {
                    writer.write(gas);
                }
            }
        }
    }
}

fn check_len(
    field: &'static str,
    len: usize,
    max: usize,
) -> std::result::Result<(), TransactionError> {
    if len > max {
        return Err(TransactionError::TooLong { field, len, max });
    }
    Ok(())
}

/// Parses one variant's payload given the transaction version.
pub type PayloadDecoder = fn(&mut BinaryReader<'_>, u8) -> Result<TransactionData>;

/// Dispatch table from discriminant to payload parser.
pub fn payload_decoder(tx_type: TransactionType) -> PayloadDecoder {
    match tx_type {
        TransactionType::Miner => decode_miner,
        TransactionType::Issue => decode_issue,
        TransactionType::Claim => decode_claim,
        TransactionType::Enrollment => decode_enrollment,
        TransactionType::Register => decode_register,
        TransactionType::Contract => decode_contract,
        TransactionType::State => decode_state,
        TransactionType::Publish => decode_publish,
        TransactionType::Invocation => decode_invocation,
    }
}

fn decode_miner(reader: &mut BinaryReader<'_>, _version: u8) -> Result<TransactionData> {
    Ok(TransactionData::Miner {
        nonce: reader.read_u32()?,
    })
}

fn decode_issue(_reader: &mut BinaryReader<'_>, _version: u8) -> Result<TransactionData> {
    Ok(TransactionData::Issue)
}

fn decode_contract(_reader: &mut BinaryReader<'_>, _version: u8) -> Result<TransactionData> {
    Ok(TransactionData::Contract)
}

fn decode_claim(reader: &mut BinaryReader<'_>, _version: u8) -> Result<TransactionData> {
    Ok(TransactionData::Claim {
        claims: reader.read_array()?,
    })
}

fn decode_enrollment(reader: &mut BinaryReader<'_>, _version: u8) -> Result<TransactionData> {
    Ok(TransactionData::Enrollment {
        public_key: reader.read()?,
    })
}

fn decode_register(reader: &mut BinaryReader<'_>, _version: u8) -> Result<TransactionData> {
    Ok(TransactionData::Register(RegisterData {
        asset_type: reader.read_u8()?,
        name: reader.read_var_string_max(MAX_ASSET_NAME)?,
        amount: reader.read()?,
        precision: reader.read_u8()?,
        owner: reader.read()?,
        admin: reader.read()?,
    }))
}

fn decode_state(reader: &mut BinaryReader<'_>, _version: u8) -> Result<TransactionData> {
    Ok(TransactionData::State {
        descriptors: reader.read_array_max(MAX_STATE_DESCRIPTORS)?,
    })
}

fn decode_publish(reader: &mut BinaryReader<'_>, version: u8) -> Result<TransactionData> {
    let script = reader.read_var_bytes()?;
    let parameter_list = reader.read_var_bytes()?;
    let return_type = reader.read_u8()?;
    let need_storage = if version >= 1 { reader.read_bool()? } else { false };
    Ok(TransactionData::Publish(PublishData {
        script,
        parameter_list,
        return_type,
        need_storage,
        name: reader.read_var_string_max(MAX_PUBLISH_FIELD)?,
        code_version: reader.read_var_string_max(MAX_PUBLISH_FIELD)?,
        author: reader.read_var_string_max(MAX_PUBLISH_FIELD)?,
        email: reader.read_var_string_max(MAX_PUBLISH_FIELD)?,
        description: reader.read_var_string_max(MAX_PUBLISH_DESCRIPTION)?,
    }))
}

fn decode_invocation(reader: &mut BinaryReader<'_>, version: u8) -> Result<TransactionData> {
    let script = reader.read_var_bytes_max(MAX_INVOCATION_SCRIPT)?;
    let gas: Fixed8 = if version >= 1 {
        reader.read()?
    } else {
        Fixed8::ZERO
    };
    if gas < Fixed8::ZERO {
        return Err(DecodeError::malformed("invocation gas", format!("negative gas {gas}")));
    }
    Ok(TransactionData::Invocation { script, gas })
}
