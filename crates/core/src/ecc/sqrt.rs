//! Modular square roots over a prime field.
//!
//! Primes congruent to 3 mod 4 have a closed form. For primes congruent to
//! 1 mod 4 the root comes from a Lucas sequence `V_k(P, Q)` with `Q` the
//! value, `k = (p+1)/2` and a random `P` for which `P^2 - 4Q` is a
//! non-residue; then `V_k^2 = 4Q`.

use crate::config::SqrtConfig;
use crate::error::{DecodeError, Result};
use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use tracing::{trace, warn};

fn mul_mod(a: &BigUint, b: &BigUint, p: &BigUint) -> BigUint {
    (a * b) % p
}

/// `a - b mod p` for `a, b < p`.
fn sub_mod(a: &BigUint, b: &BigUint, p: &BigUint) -> BigUint {
    (a + p - b) % p
}

fn double_mod(a: &BigUint, p: &BigUint) -> BigUint {
    (a + a) % p
}

/// Evaluate the Lucas pair `(U_k, V_k)` for parameters `(big_p, q)` mod `p`.
fn lucas_sequence(p: &BigUint, big_p: &BigUint, q: &BigUint, k: &BigUint) -> (BigUint, BigUint) {
    let n = k.bits();
    let s = k.trailing_zeros().unwrap_or(0);

    let mut uh = BigUint::one();
    let mut vl = BigUint::from(2u8);
    let mut vh = big_p.clone();
    let mut ql = BigUint::one();
    let mut qh = BigUint::one();

    for j in (s + 1..n).rev() {
        ql = mul_mod(&ql, &qh, p);
        if k.bit(j) {
            qh = mul_mod(&ql, q, p);
            uh = mul_mod(&uh, &vh, p);
            vl = sub_mod(&mul_mod(&vh, &vl, p), &mul_mod(big_p, &ql, p), p);
            vh = sub_mod(&mul_mod(&vh, &vh, p), &double_mod(&qh, p), p);
        } else {
            qh = ql.clone();
            uh = sub_mod(&mul_mod(&uh, &vl, p), &ql, p);
            vh = sub_mod(&mul_mod(&vh, &vl, p), &mul_mod(big_p, &ql, p), p);
            vl = sub_mod(&mul_mod(&vl, &vl, p), &double_mod(&ql, p), p);
        }
    }

    ql = mul_mod(&ql, &qh, p);
    qh = mul_mod(&ql, q, p);
    uh = sub_mod(&mul_mod(&uh, &vl, p), &ql, p);
    vl = sub_mod(&mul_mod(&vh, &vl, p), &mul_mod(big_p, &ql, p), p);
    ql = mul_mod(&ql, &qh, p);

    for _ in 0..s {
        uh = mul_mod(&uh, &vl, p);
        vl = sub_mod(&mul_mod(&vl, &vl, p), &double_mod(&ql, p), p);
        ql = mul_mod(&ql, &ql, p);
    }

    (uh, vl)
}

/// Square root of `value` modulo the odd prime `p`.
///
/// Returns `Ok(None)` when `value` is a quadratic non-residue, and
/// `SqrtAttemptsExhausted` when the randomized search hits
/// `config.max_attempts` without an answer. `value` must already be
/// reduced mod `p`.
pub fn sqrt_mod<R>(
    value: &BigUint,
    p: &BigUint,
    config: &SqrtConfig,
    rng: &mut R,
) -> Result<Option<BigUint>>
where
    R: RngCore + CryptoRng + ?Sized,
{
    if value.is_zero() {
        return Ok(Some(BigUint::zero()));
    }

    // p = 3 mod 4
    if p.bit(1) {
        let exp = (p >> 2u32) + 1u32;
        let root = value.modpow(&exp, p);
        return Ok((mul_mod(&root, &root, p) == *value).then_some(root));
    }

    let p_minus_one = p - 1u32;
    let legendre_exp = &p_minus_one >> 1u32;
    if value.modpow(&legendre_exp, p) != BigUint::one() {
        return Ok(None);
    }

    let k = (p + 1u32) >> 1u32;
    let four_q = (value << 2u32) % p;

    for attempt in 1..=config.max_attempts {
        let big_p = rng.gen_biguint_below(p);
        let discriminant = sub_mod(&mul_mod(&big_p, &big_p, p), &four_q, p);
        if discriminant.modpow(&legendre_exp, p) != p_minus_one {
            trace!(attempt, "lucas parameter rejected: discriminant is a residue");
            continue;
        }

        let (u, mut v) = lucas_sequence(p, &big_p, value, &k);
        if mul_mod(&v, &v, p) == four_q {
            if v.bit(0) {
                v += p;
            }
            v >>= 1u32;
            return Ok(Some(v));
        }

        if !u.is_one() && u != p_minus_one {
            return Ok(None);
        }
        trace!(attempt, "lucas sequence degenerate, resampling");
    }

    warn!(
        max_attempts = config.max_attempts,
        "modular square root search exhausted"
    );
    Err(DecodeError::SqrtAttemptsExhausted(config.max_attempts))
}
