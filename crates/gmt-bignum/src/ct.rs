//! Constant-time operations for big numbers.
//!
//! These operations avoid data-dependent branching to prevent timing
//! side-channel leaks in the comparisons the protocol layer performs on
//! secret-derived values.

use crate::bignum::BigNum;
use subtle::Choice;

impl BigNum {
    /// Constant-time equality comparison.
    pub fn ct_eq(&self, other: &BigNum) -> Choice {
        use subtle::ConstantTimeEq as _;

        let max_len = self.limbs().len().max(other.limbs().len());
        let mut result: u8 = (self.is_negative() as u8)
            .ct_eq(&(other.is_negative() as u8))
            .unwrap_u8();

        for i in 0..max_len {
            let a = self.limbs().get(i).copied().unwrap_or(0);
            let b = other.limbs().get(i).copied().unwrap_or(0);
            result &= a.ct_eq(&b).unwrap_u8();
        }

        Choice::from(result)
    }

    /// Constant-time conditional select: returns `a` if choice == 0, `b`
    /// if choice == 1.
    pub fn ct_select(a: &BigNum, b: &BigNum, choice: Choice) -> BigNum {
        let mask = (choice.unwrap_u8() as u64).wrapping_neg();
        let max_len = a.limbs().len().max(b.limbs().len());
        let mut limbs = vec![0u64; max_len];

        for (i, limb) in limbs.iter_mut().enumerate() {
            let av = a.limbs().get(i).copied().unwrap_or(0);
            let bv = b.limbs().get(i).copied().unwrap_or(0);
            *limb = av ^ (mask & (av ^ bv));
        }

        let neg_a = a.is_negative() as u64;
        let neg_b = b.is_negative() as u64;
        let neg = neg_a ^ (mask & (neg_a ^ neg_b));

        let mut result = BigNum::from_limbs(limbs);
        result.set_negative(neg != 0);
        result
    }

    /// Constant-time conditional subtraction: if self >= modulus, return
    /// self - modulus, otherwise return self.
    pub fn ct_sub_if_gte(&self, modulus: &BigNum) -> BigNum {
        let max_len = self.limbs().len().max(modulus.limbs().len());

        let mut diff = vec![0u64; max_len];
        let mut borrow: u64 = 0;
        for (i, d) in diff.iter_mut().enumerate() {
            let a = self.limbs().get(i).copied().unwrap_or(0);
            let b = modulus.limbs().get(i).copied().unwrap_or(0);
            let (d1, b1) = a.overflowing_sub(b);
            let (d2, b2) = d1.overflowing_sub(borrow);
            *d = d2;
            borrow = (b1 as u64) + (b2 as u64);
        }

        // borrow == 0 means self >= modulus
        let use_diff = Choice::from((borrow == 0) as u8);
        BigNum::ct_select(self, &BigNum::from_limbs(diff), use_diff)
    }
}

impl subtle::ConstantTimeEq for BigNum {
    fn ct_eq(&self, other: &Self) -> Choice {
        BigNum::ct_eq(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ct_eq() {
        let a = BigNum::from_u64(42);
        let b = BigNum::from_u64(42);
        let c = BigNum::from_u64(43);

        assert_eq!(a.ct_eq(&b).unwrap_u8(), 1);
        assert_eq!(a.ct_eq(&c).unwrap_u8(), 0);
    }

    #[test]
    fn test_ct_eq_different_limb_counts() {
        let a = BigNum::from_u64(42);
        let b = BigNum::from_limbs(vec![42, 0, 0]);
        assert_eq!(a.ct_eq(&b).unwrap_u8(), 1);
    }

    #[test]
    fn test_ct_select() {
        let a = BigNum::from_u64(10);
        let b = BigNum::from_u64(20);

        assert_eq!(BigNum::ct_select(&a, &b, Choice::from(0)), a);
        assert_eq!(BigNum::ct_select(&a, &b, Choice::from(1)), b);
    }

    #[test]
    fn test_ct_sub_if_gte() {
        let modulus = BigNum::from_u64(97);

        assert_eq!(
            BigNum::from_u64(100).ct_sub_if_gte(&modulus),
            BigNum::from_u64(3)
        );
        assert_eq!(
            BigNum::from_u64(50).ct_sub_if_gte(&modulus),
            BigNum::from_u64(50)
        );
        assert_eq!(
            BigNum::from_u64(97).ct_sub_if_gte(&modulus),
            BigNum::from_u64(0)
        );
    }
}
