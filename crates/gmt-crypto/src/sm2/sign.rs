//! SM2 digital signature (GB/T 32918.2).

use gmt_bignum::BigNum;
use gmt_types::CryptoError;

use crate::ecc::EcPoint;

use super::{Sm2Context, Sm2KeyPair, SM2_DEFAULT_ID};

/// Byte length of each signature scalar.
const SCALAR_SIZE: usize = 32;

/// An SM2 signature: the pair (r, s) of 32-byte big-endian scalars.
#[derive(Clone, PartialEq, Eq)]
pub struct Sm2Signature {
    r: [u8; SCALAR_SIZE],
    s: [u8; SCALAR_SIZE],
}

impl Sm2Signature {
    /// Serialize as the 64-byte `r || s` concatenation.
    pub fn to_bytes(&self) -> [u8; 2 * SCALAR_SIZE] {
        let mut out = [0u8; 2 * SCALAR_SIZE];
        out[..SCALAR_SIZE].copy_from_slice(&self.r);
        out[SCALAR_SIZE..].copy_from_slice(&self.s);
        out
    }

    /// Parse from the 64-byte `r || s` concatenation.
    pub fn from_bytes(data: &[u8]) -> Result<Self, CryptoError> {
        if data.len() != 2 * SCALAR_SIZE {
            return Err(CryptoError::InvalidArg);
        }
        let mut r = [0u8; SCALAR_SIZE];
        let mut s = [0u8; SCALAR_SIZE];
        r.copy_from_slice(&data[..SCALAR_SIZE]);
        s.copy_from_slice(&data[SCALAR_SIZE..]);
        Ok(Sm2Signature { r, s })
    }

    /// The scalar r.
    pub fn r(&self) -> &[u8; SCALAR_SIZE] {
        &self.r
    }

    /// The scalar s.
    pub fn s(&self) -> &[u8; SCALAR_SIZE] {
        &self.s
    }
}

impl std::fmt::Debug for Sm2Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hex = |b: &[u8]| b.iter().map(|x| format!("{x:02x}")).collect::<String>();
        write!(f, "Sm2Signature(r: {}, s: {})", hex(&self.r), hex(&self.s))
    }
}

impl Sm2Context {
    /// Sign a message with the default user ID.
    ///
    /// `k` is the caller-supplied ephemeral scalar in `[1, n-1]`; the
    /// core performs no sampling.
    pub fn sign(
        &self,
        message: &[u8],
        k: &BigNum,
        keypair: &Sm2KeyPair,
    ) -> Result<Sm2Signature, CryptoError> {
        self.sign_with_id(SM2_DEFAULT_ID, message, k, keypair)
    }

    /// Sign a message with a custom user ID.
    pub fn sign_with_id(
        &self,
        user_id: &[u8],
        message: &[u8],
        k: &BigNum,
        keypair: &Sm2KeyPair,
    ) -> Result<Sm2Signature, CryptoError> {
        let n = self.group().order();
        if k.is_zero() || k >= n {
            return Err(CryptoError::InvalidArg);
        }

        // e = SM3(ZA || M)
        let za = self.user_identity_hash(user_id, keypair.public_key())?;
        let e = self.message_digest_scalar(&za, message)?;

        // (x1, y1) = k*G, r = (e + x1) mod n
        let kg = self.group().scalar_mul_base(k)?;
        let r = e.mod_add(kg.x(), n)?;
        if r.is_zero() || r.add(k) == *n {
            return Err(CryptoError::SignatureRDegenerate);
        }

        // s = (1 + d)^-1 * (k - r*d) mod n
        let d = keypair.private_key();
        let inv = d.mod_add(&BigNum::from_u64(1), n)?.mod_inv(n)?;
        let k_minus_rd = k.mod_sub(&r.mod_mul(d, n)?, n)?;
        let s = inv.mod_mul(&k_minus_rd, n)?;
        if s.is_zero() {
            return Err(CryptoError::SignatureSDegenerate);
        }

        Ok(Sm2Signature {
            r: r.to_bytes_be_padded(SCALAR_SIZE)?.try_into().unwrap(),
            s: s.to_bytes_be_padded(SCALAR_SIZE)?.try_into().unwrap(),
        })
    }

    /// Verify a signature with the default user ID.
    pub fn verify(
        &self,
        message: &[u8],
        public_key: &EcPoint,
        signature: &Sm2Signature,
    ) -> Result<(), CryptoError> {
        self.verify_with_id(SM2_DEFAULT_ID, message, public_key, signature)
    }

    /// Verify a signature with a custom user ID.
    ///
    /// Distinguishes range rejections, the degenerate `t = 0` case and a
    /// plain mismatch, matching the reference's error codes.
    pub fn verify_with_id(
        &self,
        user_id: &[u8],
        message: &[u8],
        public_key: &EcPoint,
        signature: &Sm2Signature,
    ) -> Result<(), CryptoError> {
        let n = self.group().order();

        let r = BigNum::from_bytes_be(&signature.r);
        let s = BigNum::from_bytes_be(&signature.s);
        if r.is_zero() || r >= *n {
            return Err(CryptoError::SignatureROutOfRange);
        }
        if s.is_zero() || s >= *n {
            return Err(CryptoError::SignatureSOutOfRange);
        }

        // e = SM3(ZA || M)
        let za = self.user_identity_hash(user_id, public_key)?;
        let e = self.message_digest_scalar(&za, message)?;

        // t = (r + s) mod n
        let t = r.mod_add(&s, n)?;
        if t.is_zero() {
            return Err(CryptoError::VerifyTDegenerate);
        }

        // (x1, y1) = s*G + t*PA
        let point = self.group().scalar_mul_add(&s, &t, public_key)?;
        if point.is_infinity() {
            return Err(CryptoError::SignatureMismatch);
        }

        if e.mod_add(point.x(), n)? == r {
            Ok(())
        } else {
            Err(CryptoError::SignatureMismatch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Sm2Context, Sm2KeyPair) {
        let ctx = Sm2Context::new().unwrap();
        let d = BigNum::random_range(ctx.group().order()).unwrap();
        let keypair = ctx
            .keypair_from_private(&d.to_bytes_be_padded(32).unwrap())
            .unwrap();
        (ctx, keypair)
    }

    fn random_k(ctx: &Sm2Context) -> BigNum {
        BigNum::random_range(ctx.group().order()).unwrap()
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let (ctx, keypair) = setup();
        let message = b"SM2 signature test message";

        let sig = ctx.sign(message, &random_k(&ctx), &keypair).unwrap();
        ctx.verify(message, keypair.public_key(), &sig).unwrap();
    }

    #[test]
    fn test_sign_verify_custom_id() {
        let (ctx, keypair) = setup();
        let message = b"test message";
        let sig = ctx
            .sign_with_id(b"custom_user_id", message, &random_k(&ctx), &keypair)
            .unwrap();

        ctx.verify_with_id(b"custom_user_id", message, keypair.public_key(), &sig)
            .unwrap();

        // A different ID changes ZA and must fail
        assert!(matches!(
            ctx.verify_with_id(b"wrong_id", message, keypair.public_key(), &sig),
            Err(CryptoError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_tampered_message_rejected() {
        let (ctx, keypair) = setup();
        let sig = ctx
            .sign(b"original message", &random_k(&ctx), &keypair)
            .unwrap();

        assert!(matches!(
            ctx.verify(b"tampered message", keypair.public_key(), &sig),
            Err(CryptoError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let (ctx, keypair) = setup();
        let (_, other) = setup();
        let sig = ctx.sign(b"message", &random_k(&ctx), &keypair).unwrap();

        assert!(ctx.verify(b"message", other.public_key(), &sig).is_err());
    }

    #[test]
    fn test_signature_range_checks() {
        let (ctx, keypair) = setup();
        let sig = ctx.sign(b"message", &random_k(&ctx), &keypair).unwrap();

        let zero_r = Sm2Signature {
            r: [0u8; 32],
            s: *sig.s(),
        };
        assert!(matches!(
            ctx.verify(b"message", keypair.public_key(), &zero_r),
            Err(CryptoError::SignatureROutOfRange)
        ));

        let big_s = Sm2Signature {
            r: *sig.r(),
            s: [0xff; 32], // >= n
        };
        assert!(matches!(
            ctx.verify(b"message", keypair.public_key(), &big_s),
            Err(CryptoError::SignatureSOutOfRange)
        ));
    }

    #[test]
    fn test_k_range_enforced() {
        let (ctx, keypair) = setup();
        assert!(ctx.sign(b"m", &BigNum::zero(), &keypair).is_err());
        assert!(ctx
            .sign(b"m", &ctx.group().order().clone(), &keypair)
            .is_err());
    }

    #[test]
    fn test_signature_serialization_roundtrip() {
        let (ctx, keypair) = setup();
        let sig = ctx.sign(b"serialize me", &random_k(&ctx), &keypair).unwrap();

        let bytes = sig.to_bytes();
        assert_eq!(bytes.len(), 64);
        let parsed = Sm2Signature::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, sig);

        assert!(Sm2Signature::from_bytes(&bytes[..63]).is_err());
    }

    #[test]
    fn test_deterministic_for_fixed_k() {
        let (ctx, keypair) = setup();
        let k = random_k(&ctx);
        let s1 = ctx.sign(b"same message", &k, &keypair).unwrap();
        let s2 = ctx.sign(b"same message", &k, &keypair).unwrap();
        assert_eq!(s1, s2);
    }
}
