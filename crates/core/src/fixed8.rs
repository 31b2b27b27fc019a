//! Fixed-point amount with eight decimal places.

use crate::error::Result;
use crate::io::{BinaryReader, BinaryWriter, Decodable, Encodable};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A signed amount stored as an integer count of 10^-8 units.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Fixed8(pub i64);

impl Fixed8 {
    pub const SIZE: usize = 8;

    /// Units per whole coin.
    pub const D: i64 = 100_000_000;

    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(Self::D);
    pub const SATOSHI: Self = Self(1);

    pub fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Whole coins, or `None` on overflow.
    pub fn from_coins(coins: i64) -> Option<Self> {
        coins.checked_mul(Self::D).map(Self)
    }

    pub fn raw(&self) -> i64 {
        self.0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl fmt::Display for Fixed8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let d = Self::D as u64;
        let (whole, frac) = (abs / d, abs % d);
        if frac == 0 {
            return write!(f, "{sign}{whole}");
        }
        let frac = format!("{frac:08}");
        write!(f, "{sign}{whole}.{}", frac.trim_end_matches('0'))
    }
}

impl fmt::Debug for Fixed8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed8({self})")
    }
}

impl Encodable for Fixed8 {
    fn size(&self) -> usize {
        Self::SIZE
    }

    fn encode(&self, writer: &mut BinaryWriter<'_>) {
        writer.write_i64(self.0);
    }
}

impl Decodable for Fixed8 {
    fn decode(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self(reader.read_i64()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Fixed8::ONE.to_string(), "1");
        assert_eq!(Fixed8::SATOSHI.to_string(), "0.00000001");
        assert_eq!(Fixed8(150_000_000).to_string(), "1.5");
        assert_eq!(Fixed8(-250_000_000).to_string(), "-2.5");
        assert_eq!(Fixed8(i64::MIN).to_string(), "-92233720368.54775808");
    }

    #[test]
    fn test_checked_arithmetic() {
        assert_eq!(Fixed8::from_coins(3), Some(Fixed8(300_000_000)));
        assert_eq!(Fixed8::from_coins(i64::MAX), None);
        assert_eq!(Fixed8(i64::MAX).checked_add(Fixed8::SATOSHI), None);
        assert_eq!(Fixed8::ONE.checked_sub(Fixed8::ONE), Some(Fixed8::ZERO));
    }
}
