//! SM2 public-key encryption (GB/T 32918.4).
//!
//! Ciphertext layout is `C1 || C3 || C2`: the 64-byte ephemeral point as
//! bare `X || Y` (no 0x04 tag byte), the 32-byte SM3 tag, then the
//! keystream-XOR of the message.

use gmt_bignum::BigNum;
use gmt_types::CryptoError;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::ecc::EcPoint;
use crate::sm3::{sm3_kdf, Sm3, SM3_OUTPUT_SIZE};

use super::{Sm2Context, Sm2KeyPair};

impl Sm2Context {
    /// Encrypt a message to the holder of `peer` with the caller-supplied
    /// ephemeral scalar `k` in `[1, n-1]`.
    pub fn encrypt(
        &self,
        k: &BigNum,
        peer: &EcPoint,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        if plaintext.is_empty() {
            return Err(CryptoError::NullInput);
        }
        let n = self.group().order();
        if k.is_zero() || k >= n {
            return Err(CryptoError::InvalidArg);
        }
        let fs = self.group().field_size();

        // C1 = k*G
        let c1 = self.group().scalar_mul_base(k)?;

        // Reject if [h]PB is the point at infinity
        let h = BigNum::from_u64(self.group().cofactor() as u64);
        if self.group().scalar_mul(&h, peer)?.is_infinity() {
            return Err(CryptoError::PointAtInfinity);
        }

        // (x2, y2) = k*PB
        let shared = self.group().scalar_mul(k, peer)?;
        if shared.is_infinity() {
            return Err(CryptoError::PointAtInfinity);
        }
        let x2 = shared.x().to_bytes_be_padded(fs)?;
        let y2 = shared.y().to_bytes_be_padded(fs)?;

        // t = KDF(x2 || y2, len)
        let mut z = x2.clone();
        z.extend_from_slice(&y2);
        let mut t = sm3_kdf(&z, plaintext.len())?;
        if t.iter().all(|&b| b == 0) {
            z.zeroize();
            return Err(CryptoError::KdfAllZero);
        }

        // C2 = M xor t
        let c2: Vec<u8> = plaintext.iter().zip(t.iter()).map(|(m, k)| m ^ k).collect();

        // C3 = SM3(x2 || M || y2)
        let mut hasher = Sm3::new();
        hasher.update(&x2)?;
        hasher.update(plaintext)?;
        hasher.update(&y2)?;
        let c3 = hasher.finish()?;
        t.zeroize();
        z.zeroize();

        // C1 || C3 || C2
        let mut ciphertext = c1.to_raw_affine(self.group())?;
        ciphertext.extend_from_slice(&c3);
        ciphertext.extend_from_slice(&c2);
        Ok(ciphertext)
    }

    /// Decrypt a `C1 || C3 || C2` ciphertext.
    pub fn decrypt(
        &self,
        keypair: &Sm2KeyPair,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let fs = self.group().field_size();
        let c1_len = 2 * fs;
        if ciphertext.len() < c1_len + SM3_OUTPUT_SIZE + 1 {
            return Err(CryptoError::InvalidArg);
        }

        let (c1_bytes, rest) = ciphertext.split_at(c1_len);
        let (c3, c2) = rest.split_at(SM3_OUTPUT_SIZE);

        // Parse C1 and check it satisfies the curve equation
        let c1 = EcPoint::from_raw_affine(self.group(), c1_bytes)?;

        // Reject if [h]C1 is the point at infinity
        let h = BigNum::from_u64(self.group().cofactor() as u64);
        if self.group().scalar_mul(&h, &c1)?.is_infinity() {
            return Err(CryptoError::PointAtInfinity);
        }

        // (x2, y2) = dB*C1
        let shared = self.group().scalar_mul(keypair.private_key(), &c1)?;
        if shared.is_infinity() {
            return Err(CryptoError::PointAtInfinity);
        }
        let x2 = shared.x().to_bytes_be_padded(fs)?;
        let y2 = shared.y().to_bytes_be_padded(fs)?;

        // t = KDF(x2 || y2, len(C2))
        let mut z = x2.clone();
        z.extend_from_slice(&y2);
        let mut t = sm3_kdf(&z, c2.len())?;
        if t.iter().all(|&b| b == 0) {
            z.zeroize();
            return Err(CryptoError::KdfAllZero);
        }

        // M = C2 xor t
        let mut plaintext: Vec<u8> = c2.iter().zip(t.iter()).map(|(c, k)| c ^ k).collect();

        // Verify C3 = SM3(x2 || M || y2) in constant time
        let mut hasher = Sm3::new();
        hasher.update(&x2)?;
        hasher.update(&plaintext)?;
        hasher.update(&y2)?;
        let tag = hasher.finish()?;
        t.zeroize();
        z.zeroize();

        if tag.ct_eq(c3).into() {
            Ok(plaintext)
        } else {
            plaintext.zeroize();
            Err(CryptoError::C3Mismatch)
        }
    }
}
