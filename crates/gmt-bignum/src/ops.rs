//! Basic and modular arithmetic operations for BigNum.

use crate::bignum::{BigNum, DoubleLimb, Limb, LIMB_BITS};
use gmt_types::CryptoError;

impl BigNum {
    /// Add two BigNums: self + other.
    pub fn add(&self, other: &BigNum) -> BigNum {
        if self.is_negative() == other.is_negative() {
            let mut result = add_unsigned(self.limbs(), other.limbs());
            result.set_negative(self.is_negative());
            result
        } else if self.is_negative() {
            // (-a) + b = b - a
            sub_unsigned(other.limbs(), self.limbs())
        } else {
            // a + (-b) = a - b
            sub_unsigned(self.limbs(), other.limbs())
        }
    }

    /// Subtract: self - other.
    pub fn sub(&self, other: &BigNum) -> BigNum {
        if self.is_negative() != other.is_negative() {
            let mut result = add_unsigned(self.limbs(), other.limbs());
            result.set_negative(self.is_negative());
            result
        } else if self.is_negative() {
            // (-a) - (-b) = b - a
            sub_unsigned(other.limbs(), self.limbs())
        } else {
            sub_unsigned(self.limbs(), other.limbs())
        }
    }

    /// Multiply: self * other.
    pub fn mul(&self, other: &BigNum) -> BigNum {
        let mut result = mul_unsigned(self.limbs(), other.limbs());
        result.set_negative(self.is_negative() != other.is_negative());
        result
    }

    /// Division with remainder: returns (quotient, remainder).
    ///
    /// Binary long division over the absolute values; signs are ignored.
    pub fn div_rem(&self, divisor: &BigNum) -> Result<(BigNum, BigNum), CryptoError> {
        if divisor.is_zero() {
            return Err(CryptoError::BnDivisionByZero);
        }
        let (q, r) = div_rem_unsigned(self.limbs(), divisor.limbs());
        Ok((q, r))
    }

    /// Modular reduction: self mod modulus, result in [0, modulus).
    pub fn mod_reduce(&self, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        if self.is_negative() {
            // Reduce |self|, then flip into [0, modulus)
            let (_, r) = self.div_rem(modulus)?;
            if r.is_zero() {
                return Ok(r);
            }
            return Ok(modulus.sub(&r));
        }
        let (_, r) = self.div_rem(modulus)?;
        Ok(r)
    }

    /// Modular addition: (self + other) mod modulus.
    pub fn mod_add(&self, other: &BigNum, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        self.add(other).mod_reduce(modulus)
    }

    /// Modular subtraction: (self - other) mod modulus.
    pub fn mod_sub(&self, other: &BigNum, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        self.sub(other).mod_reduce(modulus)
    }

    /// Modular multiplication: (self * other) mod modulus.
    pub fn mod_mul(&self, other: &BigNum, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        self.mul(other).mod_reduce(modulus)
    }

    /// Compare absolute values.
    pub fn cmp_abs(&self, other: &BigNum) -> std::cmp::Ordering {
        let a_bits = self.bit_len();
        let b_bits = other.bit_len();
        if a_bits != b_bits {
            return a_bits.cmp(&b_bits);
        }
        let max_limbs = self.limbs().len().max(other.limbs().len());
        for i in (0..max_limbs).rev() {
            let a = self.limbs().get(i).copied().unwrap_or(0);
            let b = other.limbs().get(i).copied().unwrap_or(0);
            if a != b {
                return a.cmp(&b);
            }
        }
        std::cmp::Ordering::Equal
    }
}

/// Add two unsigned limb arrays.
fn add_unsigned(a: &[Limb], b: &[Limb]) -> BigNum {
    let max_len = a.len().max(b.len());
    let mut limbs = vec![0u64; max_len + 1];
    let mut carry: u64 = 0;

    for (i, limb) in limbs.iter_mut().take(max_len).enumerate() {
        let av = a.get(i).copied().unwrap_or(0);
        let bv = b.get(i).copied().unwrap_or(0);
        let sum = av as DoubleLimb + bv as DoubleLimb + carry as DoubleLimb;
        *limb = sum as Limb;
        carry = (sum >> LIMB_BITS) as u64;
    }
    limbs[max_len] = carry;

    BigNum::from_limbs(limbs)
}

/// Subtract unsigned limb arrays, tracking which operand is larger.
fn sub_unsigned(a: &[Limb], b: &[Limb]) -> BigNum {
    let max_len = a.len().max(b.len());
    let mut cmp = std::cmp::Ordering::Equal;
    for i in (0..max_len).rev() {
        let av = a.get(i).copied().unwrap_or(0);
        let bv = b.get(i).copied().unwrap_or(0);
        if av != bv {
            cmp = av.cmp(&bv);
            break;
        }
    }

    let (larger, smaller, negative) = match cmp {
        std::cmp::Ordering::Less => (b, a, true),
        std::cmp::Ordering::Equal => return BigNum::zero(),
        std::cmp::Ordering::Greater => (a, b, false),
    };

    let mut limbs = vec![0u64; larger.len()];
    let mut borrow: u64 = 0;

    for (i, limb) in limbs.iter_mut().enumerate() {
        let lv = larger[i];
        let sv = smaller.get(i).copied().unwrap_or(0);
        let (d1, b1) = lv.overflowing_sub(sv);
        let (d2, b2) = d1.overflowing_sub(borrow);
        *limb = d2;
        borrow = (b1 as u64) + (b2 as u64);
    }

    let mut bn = BigNum::from_limbs(limbs);
    bn.set_negative(negative);
    bn
}

/// Multiply two unsigned limb arrays (schoolbook).
fn mul_unsigned(a: &[Limb], b: &[Limb]) -> BigNum {
    if a.iter().all(|&l| l == 0) || b.iter().all(|&l| l == 0) {
        return BigNum::zero();
    }

    let mut limbs = vec![0u64; a.len() + b.len()];

    for i in 0..a.len() {
        let mut carry: u64 = 0;
        for j in 0..b.len() {
            let prod = a[i] as DoubleLimb * b[j] as DoubleLimb
                + limbs[i + j] as DoubleLimb
                + carry as DoubleLimb;
            limbs[i + j] = prod as Limb;
            carry = (prod >> LIMB_BITS) as u64;
        }
        limbs[i + b.len()] = carry;
    }

    BigNum::from_limbs(limbs)
}

/// Binary long division for unsigned values.
fn div_rem_unsigned(a: &[Limb], b: &[Limb]) -> (BigNum, BigNum) {
    let a_bn = BigNum::from_limbs(a.to_vec());
    let b_bn = BigNum::from_limbs(b.to_vec());

    if a_bn.cmp_abs(&b_bn) == std::cmp::Ordering::Less {
        return (BigNum::zero(), a_bn);
    }

    let bits = a_bn.bit_len();
    let mut q_limbs = vec![0u64; bits.div_ceil(LIMB_BITS)];
    let mut remainder = BigNum::zero();

    for i in (0..bits).rev() {
        // remainder = remainder * 2 + bit i of a
        let mut carry = 0u64;
        for limb in remainder.limbs_mut().iter_mut() {
            let new_carry = *limb >> 63;
            *limb = (*limb << 1) | carry;
            carry = new_carry;
        }
        if carry != 0 {
            remainder.limbs_mut().push(carry);
        }
        remainder.limbs_mut()[0] |= a_bn.get_bit(i) as u64;

        if remainder.cmp_abs(&b_bn) != std::cmp::Ordering::Less {
            remainder = sub_unsigned(remainder.limbs(), b_bn.limbs());
            q_limbs[i / LIMB_BITS] |= 1u64 << (i % LIMB_BITS);
        }
    }

    (BigNum::from_limbs(q_limbs), remainder)
}
