//! Witness: the invocation and verification scripts that authorize a
//! transaction or block.

use crate::error::Result;
use crate::hash::hash160;
use crate::io::{var_bytes_size, BinaryReader, BinaryWriter, Decodable, Encodable};
use crate::uint::UInt160;
use serde::{Deserialize, Serialize};

/// Maximum length of either witness script.
pub const MAX_SCRIPT_SIZE: usize = 65_536;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Witness {
    /// Pushes the signatures.
    #[serde(with = "crate::serde_hex")]
    pub invocation_script: Vec<u8>,
    /// Checks them.
    #[serde(with = "crate::serde_hex")]
    pub verification_script: Vec<u8>,
}

impl Witness {
    pub fn new(invocation_script: Vec<u8>, verification_script: Vec<u8>) -> Self {
        Self {
            invocation_script,
            verification_script,
        }
    }

    /// Hash of the verification script, i.e. the account this witness
    /// speaks for.
    pub fn script_hash(&self) -> UInt160 {
        hash160(&self.verification_script)
    }
}

impl Encodable for Witness {
    fn size(&self) -> usize {
        var_bytes_size(self.invocation_script.len())
            + var_bytes_size(self.verification_script.len())
    }

    fn encode(&self, writer: &mut BinaryWriter<'_>) {
        writer.write_var_bytes(&self.invocation_script);
        writer.write_var_bytes(&self.verification_script);
    }
}

impl Decodable for Witness {
    fn decode(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let invocation_script = reader.read_var_bytes_max(MAX_SCRIPT_SIZE)?;
        let verification_script = reader.read_var_bytes_max(MAX_SCRIPT_SIZE)?;
        Ok(Self {
            invocation_script,
            verification_script,
        })
    }
}
