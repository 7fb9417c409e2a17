//! Elliptic curve parameter definitions.
//!
//! The suite binds a single short Weierstrass curve, SM2P256V1
//! (GB/T 32918.5-2017): y² = x³ + ax + b over a 256-bit prime field with
//! a = p − 3 and cofactor 1.

use gmt_bignum::BigNum;
use gmt_types::{CryptoError, EccCurveId};

/// Parameters for a short Weierstrass curve: y² = x³ + ax + b (mod p).
#[derive(Clone)]
pub(crate) struct CurveParams {
    /// Prime field modulus.
    pub p: BigNum,
    /// Curve coefficient a.
    pub a: BigNum,
    /// Curve coefficient b.
    pub b: BigNum,
    /// Base point G x-coordinate.
    pub gx: BigNum,
    /// Base point G y-coordinate.
    pub gy: BigNum,
    /// Order of the base point G.
    pub n: BigNum,
    /// Cofactor.
    pub h: u32,
    /// Field element byte length.
    pub field_size: usize,
}

/// Helper: parse a hex string into a BigNum.
fn bn(hex: &str) -> BigNum {
    let bytes: Vec<u8> = (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).unwrap())
        .collect();
    BigNum::from_bytes_be(&bytes)
}

/// Return curve parameters for the given curve ID.
pub(crate) fn get_curve_params(curve_id: EccCurveId) -> Result<CurveParams, CryptoError> {
    match curve_id {
        EccCurveId::Sm2Prime256 => Ok(sm2p256v1_params()),
    }
}

/// SM2P256V1 (GB/T 32918.5-2017) parameters. Note a = p − 3.
fn sm2p256v1_params() -> CurveParams {
    CurveParams {
        p: bn("FFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF00000000FFFFFFFFFFFFFFFF"),
        a: bn("FFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF00000000FFFFFFFFFFFFFFFC"),
        b: bn("28E9FA9E9D9F5E344D5A9E4BCF6509A7F39789F515AB8F92DDBCBD414D940E93"),
        gx: bn("32C4AE2C1F1981195F9904466A39C9948FE30BBFF2660BE1715A4589334C74C7"),
        gy: bn("BC3736A2F4F6779C59BDCEE36B692153D0A9877CC62A474002DF32E52139F0A0"),
        n: bn("FFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFF7203DF6B21C6052B53BBF40939D54123"),
        h: 1,
        field_size: 32,
    }
}
