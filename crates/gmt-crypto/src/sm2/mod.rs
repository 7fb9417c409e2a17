//! SM2 elliptic curve public-key cryptography (GB/T 32918).
//!
//! SM2 is the Chinese national standard for elliptic curve cryptography
//! over the SM2P256V1 curve. This module provides key generation, digital
//! signatures, public-key encryption and the authenticated key exchange,
//! all built on the [`crate::ecc`] group and the SM3 hash.
//!
//! A [`Sm2Context`] binds the curve parameters exactly once and is
//! threaded through every operation. Randomness is injected by the
//! caller: signing, encryption and key exchange take their scalar
//! (`k`, `r_A`, `r_B`) as an argument and never sample internally.

mod encrypt;
mod exchange;
mod sign;

pub use exchange::{Sm2ExchangeKey, Sm2ExchangeResponse};
pub use sign::Sm2Signature;

use gmt_bignum::BigNum;
use gmt_types::{CryptoError, EccCurveId};

use crate::ecc::{EcGroup, EcPoint};
use crate::sm3::{Sm3, SM3_OUTPUT_SIZE};

/// Default user ID (16-byte ASCII string per GB/T 32918).
pub const SM2_DEFAULT_ID: &[u8] = b"1234567812345678";

/// Process-wide SM2 state: the curve parameters, bound once.
///
/// Construction validates the parameter set (base point on curve,
/// `n·G = O`) and replaces the reference implementation's re-initialization
/// on every operation.
#[derive(Clone)]
pub struct Sm2Context {
    group: EcGroup,
}

impl Sm2Context {
    /// Bind and validate the SM2P256V1 parameters.
    pub fn new() -> Result<Self, CryptoError> {
        Ok(Sm2Context {
            group: EcGroup::new(EccCurveId::Sm2Prime256)?,
        })
    }

    /// The underlying curve group.
    pub fn group(&self) -> &EcGroup {
        &self.group
    }

    /// Derive a key pair from a 32-byte big-endian private key.
    ///
    /// The scalar must lie in `[1, n-2]`; the derived public key is
    /// validated before the pair is returned.
    pub fn keypair_from_private(&self, private_key: &[u8]) -> Result<Sm2KeyPair, CryptoError> {
        let d = BigNum::from_bytes_be(private_key);
        let n_minus_1 = self.group.order().sub(&BigNum::from_u64(1));
        if d.is_zero() || d >= n_minus_1 {
            return Err(CryptoError::InvalidPrivateKey);
        }

        let public_key = self.group.scalar_mul_base(&d)?;
        self.group.validate_pubkey(&public_key)?;

        Ok(Sm2KeyPair {
            private_key: d,
            public_key,
        })
    }

    /// Import and validate a peer public key from the bare 64-byte
    /// `X || Y` encoding.
    pub fn public_key_from_affine(&self, data: &[u8]) -> Result<EcPoint, CryptoError> {
        let point =
            EcPoint::from_raw_affine(&self.group, data).map_err(|_| CryptoError::PubkeyInit)?;
        self.group.validate_pubkey(&point)?;
        Ok(point)
    }

    /// Import and validate a peer public key from the uncompressed
    /// `0x04 || X || Y` encoding.
    pub fn public_key_from_uncompressed(&self, data: &[u8]) -> Result<EcPoint, CryptoError> {
        let point =
            EcPoint::from_uncompressed(&self.group, data).map_err(|_| CryptoError::PubkeyInit)?;
        self.group.validate_pubkey(&point)?;
        Ok(point)
    }

    /// Compute the user identity hash ZA:
    /// `SM3(ENTL || ID || a || b || Gx || Gy || Px || Py)`
    /// where ENTL is the 16-bit big-endian bit length of the ID.
    pub fn user_identity_hash(
        &self,
        user_id: &[u8],
        public_key: &EcPoint,
    ) -> Result<[u8; SM3_OUTPUT_SIZE], CryptoError> {
        if public_key.is_infinity() {
            return Err(CryptoError::PointAtInfinity);
        }
        if user_id.len() * 8 > u16::MAX as usize {
            return Err(CryptoError::InputOverflow);
        }

        let params = self.group.params();
        let fs = self.group.field_size();

        let mut hasher = Sm3::new();
        hasher.update(&((user_id.len() * 8) as u16).to_be_bytes())?;
        hasher.update(user_id)?;
        hasher.update(&params.a.to_bytes_be_padded(fs)?)?;
        hasher.update(&params.b.to_bytes_be_padded(fs)?)?;
        hasher.update(&params.gx.to_bytes_be_padded(fs)?)?;
        hasher.update(&params.gy.to_bytes_be_padded(fs)?)?;
        hasher.update(&public_key.x().to_bytes_be_padded(fs)?)?;
        hasher.update(&public_key.y().to_bytes_be_padded(fs)?)?;
        hasher.finish()
    }

    /// Hash `ZA || message` into the scalar e used by sign and verify.
    pub(crate) fn message_digest_scalar(
        &self,
        za: &[u8; SM3_OUTPUT_SIZE],
        message: &[u8],
    ) -> Result<BigNum, CryptoError> {
        let mut hasher = Sm3::new();
        hasher.update(za)?;
        hasher.update(message)?;
        Ok(BigNum::from_bytes_be(&hasher.finish()?))
    }
}

/// An SM2 key pair. The private scalar is zeroized on drop.
#[derive(Clone)]
pub struct Sm2KeyPair {
    /// The private scalar d (1 <= d <= n-2).
    private_key: BigNum,
    /// The public point P = d*G.
    public_key: EcPoint,
}

impl Sm2KeyPair {
    /// The public point.
    pub fn public_key(&self) -> &EcPoint {
        &self.public_key
    }

    pub(crate) fn private_key(&self) -> &BigNum {
        &self.private_key
    }

    /// The public key in uncompressed encoding.
    pub fn public_key_bytes(&self, ctx: &Sm2Context) -> Result<Vec<u8>, CryptoError> {
        self.public_key.to_uncompressed(&ctx.group)
    }

    /// The private key as 32-byte big-endian.
    pub fn private_key_bytes(&self, ctx: &Sm2Context) -> Result<Vec<u8>, CryptoError> {
        self.private_key.to_bytes_be_padded(ctx.group.field_size())
    }
}
