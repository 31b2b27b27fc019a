//! Short Weierstrass curves `y^2 = x^3 + a*x + b` over a prime field.

use num_bigint::BigUint;
use num_traits::Zero;
use std::sync::OnceLock;

/// Curve parameters. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Curve {
    p: BigUint,
    a: BigUint,
    b: BigUint,
    field_len: usize,
}

static SECP256R1: OnceLock<Curve> = OnceLock::new();
static SECP256K1: OnceLock<Curve> = OnceLock::new();

impl Curve {
    /// Build a curve over the prime `p`. `a` and `b` are reduced mod `p`.
    ///
    /// # Panics
    ///
    /// Panics if `p` is not an odd number greater than 3. Primality is the
    /// caller's responsibility.
    pub fn new(p: BigUint, a: BigUint, b: BigUint) -> Self {
        assert!(
            p > BigUint::from(3u8) && p.bit(0),
            "curve modulus must be an odd prime greater than 3"
        );
        let field_len = p.bits().div_ceil(8) as usize;
        Self {
            a: a % &p,
            b: b % &p,
            p,
            field_len,
        }
    }

    fn from_hex(p: &str, a: &str, b: &str) -> Self {
        let parse = |s: &str| {
            BigUint::parse_bytes(s.as_bytes(), 16).expect("curve constant is valid hex")
        };
        Self::new(parse(p), parse(a), parse(b))
    }

    /// NIST P-256, the curve used for account keys on the wire.
    pub fn secp256r1() -> &'static Curve {
        SECP256R1.get_or_init(|| {
            Self::from_hex(
                "ffffffff00000001000000000000000000000000ffffffffffffffffffffffff",
                "ffffffff00000001000000000000000000000000fffffffffffffffffffffffc",
                "5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b",
            )
        })
    }

    pub fn secp256k1() -> &'static Curve {
        SECP256K1.get_or_init(|| {
            Self::from_hex(
                "fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f",
                "0",
                "7",
            )
        })
    }

    /// Field prime.
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    pub fn a(&self) -> &BigUint {
        &self.a
    }

    pub fn b(&self) -> &BigUint {
        &self.b
    }

    /// Byte length of one encoded coordinate.
    pub fn field_len(&self) -> usize {
        self.field_len
    }

    /// Right-hand side of the curve equation, `x*(x^2 + a) + b mod p`.
    pub fn alpha(&self, x: &BigUint) -> BigUint {
        let x2_plus_a = (x * x + &self.a) % &self.p;
        (x * x2_plus_a + &self.b) % &self.p
    }

    /// Whether `(x, y)` satisfies the curve equation.
    pub fn contains(&self, x: &BigUint, y: &BigUint) -> bool {
        x < &self.p && y < &self.p && (y * y) % &self.p == self.alpha(x)
    }

    /// Encode a field element as exactly `field_len` big-endian bytes.
    pub(crate) fn to_field_bytes(&self, value: &BigUint) -> Vec<u8> {
        let len = self.field_len;
        let mut out = vec![0u8; len];
        if value.is_zero() {
            return out;
        }
        let raw = value.to_bytes_be();
        if raw.len() >= len {
            out.copy_from_slice(&raw[raw.len() - len..]);
        } else {
            out[len - raw.len()..].copy_from_slice(&raw);
        }
        out
    }
}
