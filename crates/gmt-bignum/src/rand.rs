//! Random big number generation using OS randomness.
//!
//! The protocol layer never samples internally; these helpers exist for
//! callers that need private keys and per-operation scalars.

use crate::bignum::BigNum;
use gmt_types::CryptoError;

impl BigNum {
    /// Generate a random BigNum with the specified number of bits.
    ///
    /// If `odd` is true, the least significant bit is forced to 1. The
    /// most significant bit is always set to ensure exactly `bits` bits.
    pub fn random(bits: usize, odd: bool) -> Result<BigNum, CryptoError> {
        if bits == 0 {
            return Ok(BigNum::zero());
        }

        let num_bytes = bits.div_ceil(8);
        let mut buf = vec![0u8; num_bytes];
        getrandom::getrandom(&mut buf).map_err(|_| CryptoError::BnRandGenFail)?;

        // Mask excess bits in the most significant byte
        let excess = num_bytes * 8 - bits;
        if excess > 0 {
            buf[0] &= 0xFF >> excess;
        }

        // Force the top bit
        let msb_byte = (bits - 1) / 8;
        let msb_bit = (bits - 1) % 8;
        buf[num_bytes - 1 - msb_byte] |= 1u8 << msb_bit;

        let mut result = BigNum::from_bytes_be(&buf);

        if odd {
            result.limbs_mut()[0] |= 1;
        }

        Ok(result)
    }

    /// Generate a random BigNum uniformly in [1, upper).
    ///
    /// Rejection sampling, so the distribution is uniform.
    pub fn random_range(upper: &BigNum) -> Result<BigNum, CryptoError> {
        if upper.is_zero() || upper.is_one() {
            return Err(CryptoError::InvalidArg);
        }

        let bits = upper.bit_len();
        let num_bytes = bits.div_ceil(8);
        let excess = num_bytes * 8 - bits;

        loop {
            let mut buf = vec![0u8; num_bytes];
            getrandom::getrandom(&mut buf).map_err(|_| CryptoError::BnRandGenFail)?;
            if excess > 0 {
                buf[0] &= 0xFF >> excess;
            }

            let candidate = BigNum::from_bytes_be(&buf);
            if !candidate.is_zero() && candidate < *upper {
                return Ok(candidate);
            }
        }
    }
}
