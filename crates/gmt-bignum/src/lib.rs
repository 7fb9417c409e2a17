#![forbid(unsafe_code)]
#![doc = "Arbitrary-precision integer arithmetic for the GM/T cryptography suite."]
//!
//! The protocol layer treats this crate as the big-integer backend: byte
//! conversion with fixed big-endian width, modular add/sub/mul, division
//! with remainder, extended-Euclid modular inverse, and rejection-sampled
//! random scalars. Values are zeroized on drop.
//!
//! Reduction is performed with binary long division and the modular
//! inverse with the extended Euclidean algorithm; neither is
//! constant-time in the value being reduced. A hardened deployment should
//! substitute a constant-time field implementation.

mod bignum;
mod ct;
mod gcd;
mod ops;
mod rand;

pub use bignum::BigNum;
