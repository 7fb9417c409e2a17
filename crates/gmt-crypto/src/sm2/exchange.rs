//! SM2 authenticated key exchange (GB/T 32918.3).
//!
//! Four steps between initiator A and responder B, each holding a static
//! key pair and the peer's identity hash:
//!
//! 1. A sends `R_A = r_A*G`.
//! 2. B derives the shared secret `V`, the session key `K_B` and the
//!    confirmation tag `S_B`; sends `R_B`, `S_B`.
//! 3. A derives `U` (= `V`), checks `S_B`, outputs `K_A` and its own tag
//!    `S_A`.
//! 4. B optionally checks `S_A`.
//!
//! The ephemeral scalars `r_A`/`r_B` are caller-supplied.

use gmt_bignum::BigNum;
use gmt_types::CryptoError;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::ecc::EcPoint;
use crate::sm3::{sm3_kdf, Sm3, SM3_OUTPUT_SIZE};

use super::{Sm2Context, Sm2KeyPair};

/// Responder-side output of the second protocol step.
///
/// `point` and `confirmation` are sent to the initiator; `shared_key` is
/// the session key; the shared secret point is retained so the responder
/// can later verify the initiator's confirmation tag.
pub struct Sm2ExchangeResponse {
    point: EcPoint,
    confirmation: [u8; SM3_OUTPUT_SIZE],
    shared_key: Vec<u8>,
    secret: EcPoint,
}

impl Sm2ExchangeResponse {
    /// The ephemeral point R_B to send to the initiator.
    pub fn point(&self) -> &EcPoint {
        &self.point
    }

    /// The confirmation tag S_B to send to the initiator.
    pub fn confirmation(&self) -> &[u8; SM3_OUTPUT_SIZE] {
        &self.confirmation
    }

    /// The negotiated session key K_B.
    pub fn shared_key(&self) -> &[u8] {
        &self.shared_key
    }
}

/// Initiator-side output of the third protocol step.
pub struct Sm2ExchangeKey {
    shared_key: Vec<u8>,
    confirmation: [u8; SM3_OUTPUT_SIZE],
}

impl Sm2ExchangeKey {
    /// The negotiated session key K_A.
    pub fn shared_key(&self) -> &[u8] {
        &self.shared_key
    }

    /// The confirmation tag S_A to send to the responder.
    pub fn confirmation(&self) -> &[u8; SM3_OUTPUT_SIZE] {
        &self.confirmation
    }
}

impl Sm2Context {
    /// Step 1 (A): compute the ephemeral point `R_A = r_A*G`.
    pub fn exchange_initiate(&self, ra: &BigNum) -> Result<EcPoint, CryptoError> {
        self.check_exchange_scalar(ra)?;
        self.group().scalar_mul_base(ra)
    }

    /// Step 2 (B): derive the session key and confirmation tag from the
    /// initiator's `R_A`.
    #[allow(clippy::too_many_arguments)]
    pub fn exchange_respond(
        &self,
        rb: &BigNum,
        keypair_b: &Sm2KeyPair,
        peer_public: &EcPoint,
        ra_point: &EcPoint,
        za: &[u8; SM3_OUTPUT_SIZE],
        zb: &[u8; SM3_OUTPUT_SIZE],
        klen: usize,
    ) -> Result<Sm2ExchangeResponse, CryptoError> {
        self.check_exchange_scalar(rb)?;
        if klen == 0 {
            return Err(CryptoError::InvalidArg);
        }

        let n = self.group().order();
        let rb_point = self.group().scalar_mul_base(rb)?;

        // t_B = (d_B + x̄_B * r_B) mod n
        let xbar_b = self.reduce_exchange_x(rb_point.x());
        let tb = keypair_b
            .private_key()
            .mod_add(&xbar_b.mod_mul(rb, n)?, n)?;

        if !self.group().is_on_curve(ra_point)? {
            return Err(CryptoError::PointNotOnCurve);
        }
        let xbar_a = self.reduce_exchange_x(ra_point.x());

        // V = [h*t_B](P_A + x̄_A*R_A)
        let v = self.exchange_secret(&tb, peer_public, &xbar_a, ra_point)?;

        let (shared_key, inner) = self.exchange_key_and_inner(&v, za, zb, ra_point, &rb_point, klen)?;
        let confirmation = self.confirm_tag(0x02, &v, &inner)?;

        Ok(Sm2ExchangeResponse {
            point: rb_point,
            confirmation,
            shared_key,
            secret: v,
        })
    }

    /// Step 3 (A): derive the session key from the responder's `R_B`,
    /// check its confirmation tag `S_B` and produce `S_A`.
    #[allow(clippy::too_many_arguments)]
    pub fn exchange_finalize(
        &self,
        ra: &BigNum,
        keypair_a: &Sm2KeyPair,
        peer_public: &EcPoint,
        ra_point: &EcPoint,
        rb_point: &EcPoint,
        za: &[u8; SM3_OUTPUT_SIZE],
        zb: &[u8; SM3_OUTPUT_SIZE],
        sb: &[u8; SM3_OUTPUT_SIZE],
        klen: usize,
    ) -> Result<Sm2ExchangeKey, CryptoError> {
        self.check_exchange_scalar(ra)?;
        if klen == 0 {
            return Err(CryptoError::InvalidArg);
        }

        let n = self.group().order();
        if !self.group().is_on_curve(rb_point)? {
            return Err(CryptoError::PointNotOnCurve);
        }

        // t_A = (d_A + x̄_A * r_A) mod n
        let xbar_a = self.reduce_exchange_x(ra_point.x());
        let ta = keypair_a
            .private_key()
            .mod_add(&xbar_a.mod_mul(ra, n)?, n)?;

        // U = [h*t_A](P_B + x̄_B*R_B)
        let xbar_b = self.reduce_exchange_x(rb_point.x());
        let u = self.exchange_secret(&ta, peer_public, &xbar_b, rb_point)?;

        let (shared_key, inner) = self.exchange_key_and_inner(&u, za, zb, ra_point, rb_point, klen)?;

        // S_1 must equal the responder's S_B
        let s1 = self.confirm_tag(0x02, &u, &inner)?;
        if !bool::from(s1.ct_eq(sb)) {
            return Err(CryptoError::KeyConfirmFromResponder);
        }

        let confirmation = self.confirm_tag(0x03, &u, &inner)?;
        Ok(Sm2ExchangeKey {
            shared_key,
            confirmation,
        })
    }

    /// Step 4 (B, optional): verify the initiator's confirmation tag
    /// `S_A` against the retained shared secret.
    pub fn exchange_responder_verify(
        &self,
        response: &Sm2ExchangeResponse,
        ra_point: &EcPoint,
        za: &[u8; SM3_OUTPUT_SIZE],
        zb: &[u8; SM3_OUTPUT_SIZE],
        sa: &[u8; SM3_OUTPUT_SIZE],
    ) -> Result<(), CryptoError> {
        let inner = self.exchange_inner_hash(&response.secret, za, zb, ra_point, &response.point)?;
        let s2 = self.confirm_tag(0x03, &response.secret, &inner)?;
        if bool::from(s2.ct_eq(sa)) {
            Ok(())
        } else {
            Err(CryptoError::KeyConfirmFromInitiator)
        }
    }

    fn check_exchange_scalar(&self, r: &BigNum) -> Result<(), CryptoError> {
        if r.is_zero() || r >= self.group().order() {
            return Err(CryptoError::InvalidArg);
        }
        Ok(())
    }

    /// w = ceil(bits(n) / 2) - 1; 127 for the bound curve.
    fn half_order_width(&self) -> usize {
        self.group().order().bit_len().div_ceil(2) - 1
    }

    /// x̄ = 2^w + (x mod 2^w).
    fn reduce_exchange_x(&self, x: &BigNum) -> BigNum {
        let w = self.half_order_width();
        x.low_bits(w).add(&BigNum::power_of_two(w))
    }

    /// [h*t](P + x̄*R); fails on the point at infinity.
    fn exchange_secret(
        &self,
        t: &BigNum,
        peer_static: &EcPoint,
        xbar: &BigNum,
        peer_ephemeral: &EcPoint,
    ) -> Result<EcPoint, CryptoError> {
        let combined = self
            .group()
            .add(peer_static, &self.group().scalar_mul(xbar, peer_ephemeral)?)?;
        let h = BigNum::from_u64(self.group().cofactor() as u64);
        let secret = self.group().scalar_mul(&t.mul(&h), &combined)?;
        if secret.is_infinity() {
            return Err(CryptoError::PointAtInfinity);
        }
        Ok(secret)
    }

    /// K = KDF(x_V || y_V || Z_A || Z_B, klen) and the inner confirmation
    /// hash SM3(x_V || Z_A || Z_B || x_RA || y_RA || x_RB || y_RB).
    fn exchange_key_and_inner(
        &self,
        secret: &EcPoint,
        za: &[u8; SM3_OUTPUT_SIZE],
        zb: &[u8; SM3_OUTPUT_SIZE],
        ra_point: &EcPoint,
        rb_point: &EcPoint,
        klen: usize,
    ) -> Result<(Vec<u8>, [u8; SM3_OUTPUT_SIZE]), CryptoError> {
        let fs = self.group().field_size();

        let mut z = secret.x().to_bytes_be_padded(fs)?;
        z.extend_from_slice(&secret.y().to_bytes_be_padded(fs)?);
        z.extend_from_slice(za);
        z.extend_from_slice(zb);
        let key = sm3_kdf(&z, klen)?;
        z.zeroize();

        let inner = self.exchange_inner_hash(secret, za, zb, ra_point, rb_point)?;
        Ok((key, inner))
    }

    fn exchange_inner_hash(
        &self,
        secret: &EcPoint,
        za: &[u8; SM3_OUTPUT_SIZE],
        zb: &[u8; SM3_OUTPUT_SIZE],
        ra_point: &EcPoint,
        rb_point: &EcPoint,
    ) -> Result<[u8; SM3_OUTPUT_SIZE], CryptoError> {
        let fs = self.group().field_size();
        let mut hasher = Sm3::new();
        hasher.update(&secret.x().to_bytes_be_padded(fs)?)?;
        hasher.update(za)?;
        hasher.update(zb)?;
        hasher.update(&ra_point.x().to_bytes_be_padded(fs)?)?;
        hasher.update(&ra_point.y().to_bytes_be_padded(fs)?)?;
        hasher.update(&rb_point.x().to_bytes_be_padded(fs)?)?;
        hasher.update(&rb_point.y().to_bytes_be_padded(fs)?)?;
        hasher.finish()
    }

    /// SM3(tag || y_V || inner) with tag 0x02 (S_B/S_1) or 0x03 (S_A/S_2).
    fn confirm_tag(
        &self,
        tag: u8,
        secret: &EcPoint,
        inner: &[u8; SM3_OUTPUT_SIZE],
    ) -> Result<[u8; SM3_OUTPUT_SIZE], CryptoError> {
        let fs = self.group().field_size();
        let mut hasher = Sm3::new();
        hasher.update(&[tag])?;
        hasher.update(&secret.y().to_bytes_be_padded(fs)?)?;
        hasher.update(inner)?;
        hasher.finish()
    }
}
