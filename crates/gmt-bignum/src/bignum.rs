//! Big number type and conversions.

use gmt_types::CryptoError;
use zeroize::Zeroize;

/// Limb type for big number representation (64-bit on 64-bit platforms).
pub type Limb = u64;
/// Double-width type for multiplication intermediates.
pub type DoubleLimb = u128;

/// Bits per limb.
pub const LIMB_BITS: usize = 64;

/// A heap-allocated big number that is zeroized on drop.
///
/// Internally represented as a little-endian array of `u64` limbs with a
/// separate sign flag.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct BigNum {
    /// Little-endian limbs (limbs[0] is the least significant).
    limbs: Vec<Limb>,
    /// True if the number is negative.
    negative: bool,
}

impl BigNum {
    /// Create a zero-valued BigNum.
    pub fn zero() -> Self {
        Self {
            limbs: vec![0],
            negative: false,
        }
    }

    /// Create a BigNum from a `u64` value.
    pub fn from_u64(value: u64) -> Self {
        Self {
            limbs: vec![value],
            negative: false,
        }
    }

    /// Create a non-negative BigNum from a little-endian limb vector.
    pub fn from_limbs(limbs: Vec<Limb>) -> Self {
        let mut bn = Self {
            limbs: if limbs.is_empty() { vec![0] } else { limbs },
            negative: false,
        };
        bn.normalize();
        bn
    }

    /// Create a BigNum from big-endian bytes.
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::zero();
        }

        let num_limbs = bytes.len().div_ceil(8);
        let mut limbs = vec![0u64; num_limbs];

        for (i, &byte) in bytes.iter().rev().enumerate() {
            limbs[i / 8] |= (byte as u64) << ((i % 8) * 8);
        }

        let mut bn = Self {
            limbs,
            negative: false,
        };
        bn.normalize();
        bn
    }

    /// Export to big-endian bytes without leading zeros.
    pub fn to_bytes_be(&self) -> Vec<u8> {
        let bits = self.bit_len();
        if bits == 0 {
            return vec![0];
        }

        let num_bytes = bits.div_ceil(8);
        let mut bytes = vec![0u8; num_bytes];

        for i in 0..num_bytes {
            let limb_idx = i / 8;
            if limb_idx < self.limbs.len() {
                bytes[num_bytes - 1 - i] = (self.limbs[limb_idx] >> ((i % 8) * 8)) as u8;
            }
        }

        bytes
    }

    /// Export to big-endian bytes, left-padded with zeros to exactly
    /// `width` bytes.
    ///
    /// This is the fixed-width conversion the SM2 wire formats rely on
    /// (32-byte coordinates and scalars). Fails with `BnSpaceNotEnough`
    /// if the value does not fit.
    pub fn to_bytes_be_padded(&self, width: usize) -> Result<Vec<u8>, CryptoError> {
        if self.bit_len() > width * 8 {
            return Err(CryptoError::BnSpaceNotEnough);
        }
        let mut out = vec![0u8; width];
        for i in 0..width {
            let limb_idx = i / 8;
            if limb_idx < self.limbs.len() {
                out[width - 1 - i] = (self.limbs[limb_idx] >> ((i % 8) * 8)) as u8;
            }
        }
        Ok(out)
    }

    /// Return the number of significant bits.
    pub fn bit_len(&self) -> usize {
        for i in (0..self.limbs.len()).rev() {
            if self.limbs[i] != 0 {
                return i * LIMB_BITS + (LIMB_BITS - self.limbs[i].leading_zeros() as usize);
            }
        }
        0
    }

    /// Return bit `i` (0-indexed from the least significant bit).
    pub fn get_bit(&self, i: usize) -> u8 {
        let limb_idx = i / LIMB_BITS;
        if limb_idx >= self.limbs.len() {
            return 0;
        }
        ((self.limbs[limb_idx] >> (i % LIMB_BITS)) & 1) as u8
    }

    /// Return the low `bits` bits as a new non-negative BigNum
    /// (`self mod 2^bits`).
    pub fn low_bits(&self, bits: usize) -> BigNum {
        if bits == 0 {
            return BigNum::zero();
        }
        let full_limbs = bits / LIMB_BITS;
        let rem_bits = bits % LIMB_BITS;
        let keep = full_limbs + (rem_bits != 0) as usize;

        let mut limbs: Vec<Limb> = self.limbs.iter().copied().take(keep).collect();
        limbs.resize(keep, 0);
        if rem_bits != 0 {
            limbs[keep - 1] &= (1u64 << rem_bits) - 1;
        }
        BigNum::from_limbs(limbs)
    }

    /// Return `2^bits`.
    pub fn power_of_two(bits: usize) -> BigNum {
        let mut limbs = vec![0u64; bits / LIMB_BITS + 1];
        limbs[bits / LIMB_BITS] = 1u64 << (bits % LIMB_BITS);
        BigNum::from_limbs(limbs)
    }

    /// Return the number of limbs.
    pub fn num_limbs(&self) -> usize {
        self.limbs.len()
    }

    /// Return true if this number is zero.
    pub fn is_zero(&self) -> bool {
        self.limbs.iter().all(|&l| l == 0)
    }

    /// Return true if this number is one.
    pub fn is_one(&self) -> bool {
        !self.negative && self.limbs[0] == 1 && self.limbs[1..].iter().all(|&l| l == 0)
    }

    /// Return true if the least significant bit is set.
    pub fn is_odd(&self) -> bool {
        self.limbs[0] & 1 == 1
    }

    /// Return true if this number is negative.
    pub fn is_negative(&self) -> bool {
        self.negative && !self.is_zero()
    }

    /// Return the limbs as a slice.
    pub fn limbs(&self) -> &[Limb] {
        &self.limbs
    }

    /// Access mutable limbs.
    pub fn limbs_mut(&mut self) -> &mut Vec<Limb> {
        &mut self.limbs
    }

    /// Set the sign.
    pub fn set_negative(&mut self, neg: bool) {
        self.negative = neg;
    }

    /// Remove leading zero limbs.
    pub(crate) fn normalize(&mut self) {
        while self.limbs.len() > 1 && *self.limbs.last().unwrap() == 0 {
            self.limbs.pop();
        }
        if self.is_zero() {
            self.negative = false;
        }
    }
}

impl std::fmt::Debug for BigNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.negative { "-" } else { "" };
        let hex = self
            .to_bytes_be()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<String>();
        write!(f, "BigNum({sign}0x{hex})")
    }
}

impl PartialEq for BigNum {
    fn eq(&self, other: &Self) -> bool {
        self.is_negative() == other.is_negative()
            && self.cmp_abs(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for BigNum {}

impl PartialOrd for BigNum {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigNum {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (self.is_negative(), other.is_negative()) {
            (false, true) => std::cmp::Ordering::Greater,
            (true, false) => std::cmp::Ordering::Less,
            (false, false) => self.cmp_abs(other),
            (true, true) => other.cmp_abs(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero() {
        let z = BigNum::zero();
        assert!(z.is_zero());
        assert_eq!(z.bit_len(), 0);
        assert!(!z.is_one());
    }

    #[test]
    fn test_from_u64() {
        let n = BigNum::from_u64(0xFF);
        assert_eq!(n.bit_len(), 8);
        assert!(!n.is_zero());
        assert!(n.is_odd());
    }

    #[test]
    fn test_bytes_roundtrip() {
        let bytes = vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09];
        let n = BigNum::from_bytes_be(&bytes);
        assert_eq!(n.to_bytes_be(), bytes);
    }

    #[test]
    fn test_padded_export() {
        let n = BigNum::from_u64(0x0102);
        let padded = n.to_bytes_be_padded(4).unwrap();
        assert_eq!(padded, vec![0x00, 0x00, 0x01, 0x02]);

        // Value wider than the requested width is rejected
        let wide = BigNum::from_bytes_be(&[0x01; 33]);
        assert!(wide.to_bytes_be_padded(32).is_err());
    }

    #[test]
    fn test_get_bit() {
        let n = BigNum::from_u64(0b1010);
        assert_eq!(n.get_bit(0), 0);
        assert_eq!(n.get_bit(1), 1);
        assert_eq!(n.get_bit(3), 1);
        assert_eq!(n.get_bit(64), 0);
        assert_eq!(n.get_bit(500), 0);
    }

    #[test]
    fn test_low_bits() {
        let n = BigNum::from_u64(0xABCD);
        assert_eq!(n.low_bits(8), BigNum::from_u64(0xCD));
        assert_eq!(n.low_bits(4), BigNum::from_u64(0xD));
        assert_eq!(n.low_bits(64), n);
        assert_eq!(n.low_bits(0), BigNum::zero());

        // Crosses a limb boundary
        let wide = BigNum::from_bytes_be(&[0xFF; 17]);
        assert_eq!(wide.low_bits(128), BigNum::from_bytes_be(&[0xFF; 16]));
    }

    #[test]
    fn test_power_of_two() {
        assert_eq!(BigNum::power_of_two(0), BigNum::from_u64(1));
        assert_eq!(BigNum::power_of_two(10), BigNum::from_u64(1024));
        assert_eq!(BigNum::power_of_two(127).bit_len(), 128);
    }

    #[test]
    fn test_ordering() {
        let a = BigNum::from_u64(5);
        let b = BigNum::from_u64(9);
        assert!(a < b);
        assert!(b > a);

        let mut neg = BigNum::from_u64(9);
        neg.set_negative(true);
        assert!(neg < a);
    }
}
