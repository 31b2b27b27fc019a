//! Encoded elliptic-curve points.
//!
//! ```text
//! 0x00                 point at infinity
//! 0x02 | 0x03  x       compressed, tag parity = parity of y
//! 0x04         x y     uncompressed
//! 0x06 | 0x07  x y     hybrid, decoded like uncompressed
//! ```

use super::curve::Curve;
use super::sqrt::sqrt_mod;
use crate::config::SqrtConfig;
use crate::error::{DecodeError, Result};
use crate::io::{BinaryReader, BinaryWriter, Decodable, Encodable};
use num_bigint::BigUint;
use num_traits::Zero;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use tracing::debug;

/// A decoded curve point with big-endian, field-length coordinates.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum ECPoint {
    Infinity,
    Affine { x: Vec<u8>, y: Vec<u8> },
}

impl ECPoint {
    /// Build an affine point from integer coordinates, checking that it lies
    /// on `curve`.
    pub fn from_coordinates(curve: &Curve, x: &BigUint, y: &BigUint) -> Result<Self> {
        if !curve.contains(x, y) {
            return Err(DecodeError::malformed("ec point", "coordinates are not on the curve"));
        }
        Ok(Self::Affine {
            x: curve.to_field_bytes(x),
            y: curve.to_field_bytes(y),
        })
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self, Self::Infinity)
    }

    pub fn x(&self) -> Option<&[u8]> {
        match self {
            Self::Infinity => None,
            Self::Affine { x, .. } => Some(x),
        }
    }

    pub fn y(&self) -> Option<&[u8]> {
        match self {
            Self::Infinity => None,
            Self::Affine { y, .. } => Some(y),
        }
    }

    /// Decode a complete encoding, rejecting trailing bytes.
    pub fn decode_point(bytes: &[u8], curve: &Curve) -> Result<Self> {
        Self::decode_point_with(bytes, curve, &SqrtConfig::default(), &mut OsRng)
    }

    /// Like [`ECPoint::decode_point`] with an explicit retry policy and
    /// random source for the square-root search.
    pub fn decode_point_with<R>(
        bytes: &[u8],
        curve: &Curve,
        config: &SqrtConfig,
        rng: &mut R,
    ) -> Result<Self>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let mut reader = BinaryReader::new(bytes);
        let point = Self::read_from_with(&mut reader, curve, config, rng)?;
        if !reader.is_empty() {
            return Err(DecodeError::TrailingBytes {
                count: reader.remaining(),
            });
        }
        Ok(point)
    }

    /// Read one point from a cursor.
    pub fn read_from(reader: &mut BinaryReader<'_>, curve: &Curve) -> Result<Self> {
        Self::read_from_with(reader, curve, &SqrtConfig::default(), &mut OsRng)
    }

    pub fn read_from_with<R>(
        reader: &mut BinaryReader<'_>,
        curve: &Curve,
        config: &SqrtConfig,
        rng: &mut R,
    ) -> Result<Self>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let tag = reader.read_u8()?;
        Self::read_tagged(tag, reader, curve, config, rng)
    }

    fn read_tagged<R>(
        tag: u8,
        reader: &mut BinaryReader<'_>,
        curve: &Curve,
        config: &SqrtConfig,
        rng: &mut R,
    ) -> Result<Self>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let len = curve.field_len();
        match tag {
            0x00 => Ok(Self::Infinity),
            0x02 | 0x03 => {
                let x = reader.read_fixed_bytes(len)?;
                decompress(curve, x, tag & 1 == 1, config, rng)
            }
            0x04 | 0x06 | 0x07 => {
                let x = reader.read_fixed_bytes(len)?;
                let y = reader.read_fixed_bytes(len)?;
                let x_int = check_coordinate(curve, &x, "x")?;
                let y_int = check_coordinate(curve, &y, "y")?;
                if !curve.contains(&x_int, &y_int) {
                    debug!(x = %hex::encode(&x), "uncompressed point is not on the curve");
                    return Err(DecodeError::malformed(
                        "ec point",
                        "coordinates are not on the curve",
                    ));
                }
                Ok(Self::Affine { x, y })
            }
            _ => Err(unknown_tag(tag)),
        }
    }

    /// Length of [`ECPoint::encode_point`] output.
    pub fn encoded_len(&self, compressed: bool) -> usize {
        match self {
            Self::Infinity => 1,
            Self::Affine { x, .. } if compressed => 1 + x.len(),
            Self::Affine { x, y } => 1 + x.len() + y.len(),
        }
    }

    /// Encode in compressed or uncompressed form.
    pub fn encode_point(&self, compressed: bool) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len(compressed));
        self.write_point(&mut BinaryWriter::new(&mut out), compressed);
        out
    }

    fn write_point(&self, writer: &mut BinaryWriter<'_>, compressed: bool) {
        match self {
            Self::Infinity => writer.write_u8(0x00),
            Self::Affine { x, y } if compressed => {
                let odd = y.last().is_some_and(|b| b & 1 == 1);
                writer.write_u8(if odd { 0x03 } else { 0x02 });
                writer.write_bytes(x);
            }
            Self::Affine { x, y } => {
                writer.write_u8(0x04);
                writer.write_bytes(x);
                writer.write_bytes(y);
            }
        }
    }
}

fn unknown_tag(tag: u8) -> DecodeError {
    debug!(tag, "unknown ec point format");
    DecodeError::malformed("ec point", format!("unknown format tag {tag:#04x}"))
}

fn check_coordinate(curve: &Curve, bytes: &[u8], name: &str) -> Result<BigUint> {
    let value = BigUint::from_bytes_be(bytes);
    if &value >= curve.p() {
        return Err(DecodeError::malformed(
            "ec point",
            format!("{name} coordinate is not below the field prime"),
        ));
    }
    Ok(value)
}

/// Recover y from x and the requested parity.
fn decompress<R>(
    curve: &Curve,
    x: Vec<u8>,
    y_odd: bool,
    config: &SqrtConfig,
    rng: &mut R,
) -> Result<ECPoint>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let p = curve.p();
    let x_int = check_coordinate(curve, &x, "x")?;
    let alpha = curve.alpha(&x_int);

    let root = sqrt_mod(&alpha, p, config, rng)?.ok_or_else(|| {
        debug!(x = %hex::encode(&x), "compressed point is not on the curve");
        DecodeError::malformed("ec point", "x coordinate is not on the curve")
    })?;

    let y = if root.bit(0) == y_odd {
        root
    } else if root.is_zero() {
        // The only root of zero is zero, which is even.
        return Err(DecodeError::malformed("ec point", "odd parity requested for y = 0"));
    } else {
        p - root
    };

    if (&y * &y) % p != alpha {
        return Err(DecodeError::InvalidSquareRoot);
    }

    Ok(ECPoint::Affine {
        x,
        y: curve.to_field_bytes(&y),
    })
}

/// Points on the wire are always compressed.
impl Encodable for ECPoint {
    fn size(&self) -> usize {
        self.encoded_len(true)
    }

    fn encode(&self, writer: &mut BinaryWriter<'_>) {
        self.write_point(writer, true);
    }
}

/// Transaction payloads carry secp256r1 keys in the forms the encoder
/// writes: infinity or compressed. Uncompressed and hybrid tags are
/// malformed here so that every decoded payload re-encodes byte for byte.
impl Decodable for ECPoint {
    fn decode(reader: &mut BinaryReader<'_>) -> Result<Self> {
        match reader.read_u8()? {
            tag @ (0x00 | 0x02 | 0x03) => Self::read_tagged(
                tag,
                reader,
                Curve::secp256r1(),
                &SqrtConfig::default(),
                &mut OsRng,
            ),
            tag @ (0x04 | 0x06 | 0x07) => Err(DecodeError::malformed(
                "ec point",
                format!("tag {tag:#04x} is not allowed in an embedded key"),
            )),
            tag => Err(unknown_tag(tag)),
        }
    }
}

impl fmt::Display for ECPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.encode_point(true)))
    }
}

impl fmt::Debug for ECPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Infinity => write!(f, "ECPoint(infinity)"),
            Self::Affine { .. } => write!(f, "ECPoint({self})"),
        }
    }
}

/// Serialized as the compressed hex encoding, like `Display`.
impl Serialize for ECPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Deserialization assumes secp256r1, matching the wire codec.
impl<'de> Deserialize<'de> for ECPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s).map_err(serde::de::Error::custom)?;
        Self::decode_point(&bytes, Curve::secp256r1()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{from_bytes, to_bytes};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const R1_G: &str = "036b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296";
    const R1_GY: &str = "4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5";
    const K1_G: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
    const K1_GY: &str = "483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8";

    fn small_curve() -> Curve {
        Curve::new(BigUint::from(97u32), BigUint::from(2u32), BigUint::from(3u32))
    }

    #[test]
    fn test_secp256r1_generator_decompresses() {
        let bytes = hex::decode(R1_G).unwrap();
        let point = ECPoint::decode_point(&bytes, Curve::secp256r1()).unwrap();
        assert_eq!(hex::encode(point.y().unwrap()), R1_GY);
        assert_eq!(point.encode_point(true), bytes);
    }

    #[test]
    fn test_secp256k1_generator_decompresses() {
        let bytes = hex::decode(K1_G).unwrap();
        let point = ECPoint::decode_point(&bytes, Curve::secp256k1()).unwrap();
        assert_eq!(hex::encode(point.y().unwrap()), K1_GY);
        assert_eq!(point.encode_point(true), bytes);
    }

    #[test]
    fn test_negated_generator_uses_other_root() {
        let mut bytes = hex::decode(R1_G).unwrap();
        bytes[0] = 0x02;
        let curve = Curve::secp256r1();
        let point = ECPoint::decode_point(&bytes, curve).unwrap();
        let gy = BigUint::parse_bytes(R1_GY.as_bytes(), 16).unwrap();
        let y = BigUint::from_bytes_be(point.y().unwrap());
        assert_eq!(y, curve.p() - gy);
    }

    #[test]
    fn test_uncompressed_roundtrip() {
        for curve in [Curve::secp256r1(), Curve::secp256k1()] {
            let g = if curve == Curve::secp256r1() { R1_G } else { K1_G };
            let point = ECPoint::decode_point(&hex::decode(g).unwrap(), curve).unwrap();

            let uncompressed = point.encode_point(false);
            assert_eq!(uncompressed.len(), 65);
            assert_eq!(uncompressed[0], 0x04);
            assert_eq!(ECPoint::decode_point(&uncompressed, curve).unwrap(), point);

            let compressed = point.encode_point(true);
            assert_eq!(compressed.len(), 33);
            assert_eq!(ECPoint::decode_point(&compressed, curve).unwrap(), point);
        }
    }

    #[test]
    fn test_hybrid_tags_decode_as_uncompressed() {
        let curve = Curve::secp256k1();
        let point = ECPoint::decode_point(&hex::decode(K1_G).unwrap(), curve).unwrap();
        let mut hybrid = point.encode_point(false);
        // Both hybrid tags are accepted regardless of the parity they claim.
        for tag in [0x06, 0x07] {
            hybrid[0] = tag;
            assert_eq!(ECPoint::decode_point(&hybrid, curve).unwrap(), point);
        }
    }

    #[test]
    fn test_infinity() {
        let point = ECPoint::decode_point(&[0x00], Curve::secp256r1()).unwrap();
        assert!(point.is_infinity());
        assert_eq!(point.encode_point(true), vec![0x00]);
        assert_eq!(point.encode_point(false), vec![0x00]);
        assert_eq!(point.x(), None);
    }

    #[test]
    fn test_unknown_tag_rejected() {
        for tag in [0x01, 0x05, 0x08, 0xff] {
            let mut bytes = vec![tag];
            bytes.extend_from_slice(&[0u8; 64]);
            let err = ECPoint::decode_point(&bytes, Curve::secp256r1()).unwrap_err();
            assert!(matches!(err, DecodeError::Malformed { .. }), "tag {tag:#x}");
        }
    }

    #[test]
    fn test_truncated_inputs() {
        let bytes = hex::decode(R1_G).unwrap();
        for len in 0..bytes.len() {
            let err = ECPoint::decode_point(&bytes[..len], Curve::secp256r1()).unwrap_err();
            assert!(err.is_insufficient_data(), "prefix of length {len}");
        }
        let err = ECPoint::decode_point(&[0x04; 64], Curve::secp256r1()).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_x_not_on_curve() {
        let mut bytes = vec![0x02];
        bytes.extend_from_slice(&Curve::secp256r1().to_field_bytes(&BigUint::from(1u32)));
        let err = ECPoint::decode_point(&bytes, Curve::secp256r1()).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { .. }));
    }

    #[test]
    fn test_x_above_prime_rejected() {
        let mut bytes = vec![0x03];
        bytes.extend_from_slice(&[0xff; 32]);
        let err = ECPoint::decode_point(&bytes, Curve::secp256k1()).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { .. }));
    }

    #[test]
    fn test_lucas_path_small_curve() {
        let curve = small_curve();
        let mut rng = StdRng::seed_from_u64(97);
        let config = SqrtConfig::default();
        let mut checked = 0;
        for x in 0u32..97 {
            for y in 0u32..97 {
                let (x, y) = (BigUint::from(x), BigUint::from(y));
                if !curve.contains(&x, &y) {
                    continue;
                }
                let point = ECPoint::from_coordinates(&curve, &x, &y).unwrap();
                for compressed in [true, false] {
                    let bytes = point.encode_point(compressed);
                    let decoded =
                        ECPoint::decode_point_with(&bytes, &curve, &config, &mut rng).unwrap();
                    assert_eq!(decoded, point);
                }
                checked += 1;
            }
        }
        assert_eq!(checked, 99);
    }

    #[test]
    fn test_zero_y_with_odd_parity_rejected() {
        // x = 30 gives y = 0 on y^2 = x^3 + 2x + 3 mod 97.
        let curve = small_curve();
        let mut rng = StdRng::seed_from_u64(1);
        let config = SqrtConfig::default();
        let even = ECPoint::decode_point_with(&[0x02, 30], &curve, &config, &mut rng).unwrap();
        assert_eq!(even.y(), Some(&[0u8][..]));
        let err = ECPoint::decode_point_with(&[0x03, 30], &curve, &config, &mut rng).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { .. }));
    }

    #[test]
    fn test_p224_generator_lucas_path() {
        let p = BigUint::parse_bytes(
            b"ffffffffffffffffffffffffffffffff000000000000000000000001",
            16,
        )
        .unwrap();
        let a = &p - 3u32;
        let b = BigUint::parse_bytes(
            b"b4050a850c04b3abf54132565044b0b7d7bfd8ba270b39432355ffb4",
            16,
        )
        .unwrap();
        let curve = Curve::new(p, a, b);
        let compressed =
            hex::decode("02b70e0cbd6bb4bf7f321390b94a03c1d356c21122343280d6115c1d21").unwrap();
        let mut rng = StdRng::seed_from_u64(224);
        let point =
            ECPoint::decode_point_with(&compressed, &curve, &SqrtConfig::default(), &mut rng)
                .unwrap();
        assert_eq!(
            hex::encode(point.y().unwrap()),
            "bd376388b5f723fb4c22dfe6cd4375a05a07476444d5819985007e34"
        );
    }

    #[test]
    fn test_serde_hex_string() {
        let point = ECPoint::decode_point(&hex::decode(R1_G).unwrap(), Curve::secp256r1()).unwrap();
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(json, format!("\"{R1_G}\""));
        let back: ECPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, point);
    }

    #[test]
    fn test_uncompressed_off_curve_rejected() {
        let curve = Curve::secp256r1();
        let one = curve.to_field_bytes(&BigUint::from(1u32));
        for tag in [0x04, 0x06, 0x07] {
            let mut bytes = vec![tag];
            bytes.extend_from_slice(&one);
            bytes.extend_from_slice(&one);
            let err = ECPoint::decode_point(&bytes, curve).unwrap_err();
            assert!(matches!(err, DecodeError::Malformed { .. }), "tag {tag:#x}");
        }

        let point = ECPoint::decode_point(&hex::decode(R1_G).unwrap(), curve).unwrap();
        let mut tampered = point.encode_point(false);
        tampered[64] ^= 1;
        assert!(ECPoint::decode_point(&tampered, curve).is_err());
    }

    #[test]
    fn test_wire_codec_rejects_uncompressed_forms() {
        let point =
            ECPoint::decode_point(&hex::decode(R1_G).unwrap(), Curve::secp256r1()).unwrap();
        let mut uncompressed = point.encode_point(false);
        for tag in [0x04, 0x06, 0x07] {
            uncompressed[0] = tag;
            let err = from_bytes::<ECPoint>(&uncompressed).unwrap_err();
            assert!(matches!(err, DecodeError::Malformed { field: "ec point", .. }));
        }
        assert!(from_bytes::<ECPoint>(&[0x00]).unwrap().is_infinity());
        let err = from_bytes::<ECPoint>(&[0x05]).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { .. }));
    }

    #[test]
    fn test_wire_codec_uses_compressed_secp256r1() {
        let bytes = hex::decode(R1_G).unwrap();
        let point: ECPoint = from_bytes(&bytes).unwrap();
        assert_eq!(point.size(), 33);
        assert_eq!(to_bytes(&point), bytes);
    }
}
