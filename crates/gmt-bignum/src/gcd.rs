//! GCD and modular inverse operations.

use crate::bignum::BigNum;
use gmt_types::CryptoError;

impl BigNum {
    /// Compute the greatest common divisor of self and other.
    pub fn gcd(&self, other: &BigNum) -> Result<BigNum, CryptoError> {
        if self.is_zero() && other.is_zero() {
            return Err(CryptoError::InvalidArg);
        }
        if self.is_zero() {
            let mut r = other.clone();
            r.set_negative(false);
            return Ok(r);
        }
        if other.is_zero() {
            let mut r = self.clone();
            r.set_negative(false);
            return Ok(r);
        }

        let mut a = self.clone();
        a.set_negative(false);
        let mut b = other.clone();
        b.set_negative(false);

        if a < b {
            std::mem::swap(&mut a, &mut b);
        }

        loop {
            let (_, rem) = a.div_rem(&b)?;
            if rem.is_zero() {
                return Ok(b);
            }
            a = b;
            b = rem;
        }
    }

    /// Compute the modular inverse: self^(-1) mod modulus.
    ///
    /// Extended Euclidean algorithm; returns `Err(BnNoInverse)` if
    /// gcd(self, modulus) != 1.
    pub fn mod_inv(&self, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        if modulus.is_zero() || modulus.is_one() {
            return Err(CryptoError::InvalidArg);
        }

        // Track old_r = old_s * self (mod modulus); only old_s is needed.
        let mut old_r = self.mod_reduce(modulus)?;
        if old_r.is_zero() {
            return Err(CryptoError::BnNoInverse);
        }
        let mut r = modulus.clone();

        let mut old_s = BigNum::from_u64(1);
        let mut s = BigNum::zero();

        while !r.is_zero() {
            let (quotient, remainder) = old_r.div_rem(&r)?;
            old_r = r;
            r = remainder;

            let new_s = old_s.sub(&quotient.mul(&s));
            old_s = s;
            s = new_s;
        }

        if !old_r.is_one() {
            return Err(CryptoError::BnNoInverse);
        }

        old_s.mod_reduce(modulus)
    }
}
