//! Elliptic-curve point codec.
//!
//! Only encoding and decoding live here; signature verification belongs to
//! the callers that consume decoded points.

mod curve;
mod point;
mod sqrt;

pub use curve::Curve;
pub use point::ECPoint;
pub use sqrt::sqrt_mod;
