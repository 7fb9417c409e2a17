//! Jacobian coordinate point arithmetic.
//!
//! Points are held as (X, Y, Z) representing the affine point
//! (X/Z², Y/Z³); the point at infinity has Z = 0. Doubling uses the
//! a = p − 3 shortcut `M = 3·(X + Z²)·(X − Z²)`, which the bound curve
//! satisfies. Scalar multiplication is plain double-and-add and therefore
//! not constant-time; see the crate documentation.

use gmt_bignum::BigNum;
use gmt_types::CryptoError;

use super::curves::CurveParams;

/// A point in Jacobian projective coordinates.
#[derive(Clone)]
pub(crate) struct JacobianPoint {
    pub x: BigNum,
    pub y: BigNum,
    pub z: BigNum,
}

impl JacobianPoint {
    /// The point at infinity (identity element).
    pub fn infinity() -> Self {
        JacobianPoint {
            x: BigNum::from_u64(1),
            y: BigNum::from_u64(1),
            z: BigNum::zero(),
        }
    }

    /// Lift an affine point into Jacobian coordinates (Z = 1).
    pub fn from_affine(x: &BigNum, y: &BigNum) -> Self {
        JacobianPoint {
            x: x.clone(),
            y: y.clone(),
            z: BigNum::from_u64(1),
        }
    }

    /// Check if this point is the point at infinity.
    pub fn is_infinity(&self) -> bool {
        self.z.is_zero()
    }

    /// Recover affine coordinates (X/Z², Y/Z³), or `None` at infinity.
    pub fn to_affine(&self, p: &BigNum) -> Result<Option<(BigNum, BigNum)>, CryptoError> {
        if self.is_infinity() {
            return Ok(None);
        }

        let z_inv = self.z.mod_inv(p)?;
        let z_inv2 = z_inv.mod_mul(&z_inv, p)?;
        let z_inv3 = z_inv2.mod_mul(&z_inv, p)?;

        Ok(Some((
            self.x.mod_mul(&z_inv2, p)?,
            self.y.mod_mul(&z_inv3, p)?,
        )))
    }
}

/// Jacobian point addition: R = A + B.
pub(crate) fn point_add(
    a: &JacobianPoint,
    b: &JacobianPoint,
    params: &CurveParams,
) -> Result<JacobianPoint, CryptoError> {
    let p = &params.p;

    if a.is_infinity() {
        return Ok(b.clone());
    }
    if b.is_infinity() {
        return Ok(a.clone());
    }

    // U1 = X1·Z2², U2 = X2·Z1², S1 = Y1·Z2³, S2 = Y2·Z1³
    let z1_sq = a.z.mod_mul(&a.z, p)?;
    let z2_sq = b.z.mod_mul(&b.z, p)?;
    let u1 = a.x.mod_mul(&z2_sq, p)?;
    let u2 = b.x.mod_mul(&z1_sq, p)?;
    let s1 = a.y.mod_mul(&z2_sq.mod_mul(&b.z, p)?, p)?;
    let s2 = b.y.mod_mul(&z1_sq.mod_mul(&a.z, p)?, p)?;

    let h = u2.mod_sub(&u1, p)?;
    let r = s2.mod_sub(&s1, p)?;

    if h.is_zero() {
        if r.is_zero() {
            // Same point
            return point_double(a, params);
        }
        // Opposite points
        return Ok(JacobianPoint::infinity());
    }

    let h_sq = h.mod_mul(&h, p)?;
    let h_cu = h_sq.mod_mul(&h, p)?;
    let u1h_sq = u1.mod_mul(&h_sq, p)?;

    // X3 = R² − H³ − 2·U1·H²
    let x3 = r
        .mod_mul(&r, p)?
        .mod_sub(&h_cu, p)?
        .mod_sub(&u1h_sq, p)?
        .mod_sub(&u1h_sq, p)?;

    // Y3 = R·(U1·H² − X3) − S1·H³
    let y3 = r
        .mod_mul(&u1h_sq.mod_sub(&x3, p)?, p)?
        .mod_sub(&s1.mod_mul(&h_cu, p)?, p)?;

    // Z3 = H·Z1·Z2
    let z3 = h.mod_mul(&a.z, p)?.mod_mul(&b.z, p)?;

    Ok(JacobianPoint {
        x: x3,
        y: y3,
        z: z3,
    })
}

/// Jacobian point doubling: R = 2A, specialized for a = p − 3.
pub(crate) fn point_double(
    a: &JacobianPoint,
    params: &CurveParams,
) -> Result<JacobianPoint, CryptoError> {
    let p = &params.p;

    if a.is_infinity() || a.y.is_zero() {
        return Ok(JacobianPoint::infinity());
    }

    let two = BigNum::from_u64(2);
    let three = BigNum::from_u64(3);
    let four = BigNum::from_u64(4);
    let eight = BigNum::from_u64(8);

    // S = 4·X·Y²
    let y_sq = a.y.mod_mul(&a.y, p)?;
    let s = a.x.mod_mul(&y_sq, p)?.mod_mul(&four, p)?;

    // M = 3·(X + Z²)·(X − Z²)  (valid because a = p − 3)
    let z_sq = a.z.mod_mul(&a.z, p)?;
    let m = a
        .x
        .mod_add(&z_sq, p)?
        .mod_mul(&a.x.mod_sub(&z_sq, p)?, p)?
        .mod_mul(&three, p)?;

    // X3 = M² − 2·S
    let two_s = s.mod_mul(&two, p)?;
    let x3 = m.mod_mul(&m, p)?.mod_sub(&two_s, p)?;

    // Y3 = M·(S − X3) − 8·Y⁴
    let y4_8 = y_sq.mod_mul(&y_sq, p)?.mod_mul(&eight, p)?;
    let y3 = m.mod_mul(&s.mod_sub(&x3, p)?, p)?.mod_sub(&y4_8, p)?;

    // Z3 = 2·Y·Z
    let z3 = a.y.mod_mul(&a.z, p)?.mod_mul(&two, p)?;

    Ok(JacobianPoint {
        x: x3,
        y: y3,
        z: z3,
    })
}

/// Scalar multiplication: R = k·P, double-and-add from the top bit.
pub(crate) fn scalar_mul(
    k: &BigNum,
    point: &JacobianPoint,
    params: &CurveParams,
) -> Result<JacobianPoint, CryptoError> {
    if k.is_zero() || point.is_infinity() {
        return Ok(JacobianPoint::infinity());
    }

    let mut acc = JacobianPoint::infinity();
    for i in (0..k.bit_len()).rev() {
        acc = point_double(&acc, params)?;
        if k.get_bit(i) != 0 {
            acc = point_add(&acc, point, params)?;
        }
    }

    Ok(acc)
}

/// Combined scalar multiplication via Shamir's trick: R = k1·G + k2·Q.
pub(crate) fn scalar_mul_add(
    k1: &BigNum,
    g: &JacobianPoint,
    k2: &BigNum,
    q: &JacobianPoint,
    params: &CurveParams,
) -> Result<JacobianPoint, CryptoError> {
    if k1.is_zero() {
        return scalar_mul(k2, q, params);
    }
    if k2.is_zero() {
        return scalar_mul(k1, g, params);
    }

    let g_plus_q = point_add(g, q, params)?;
    let bits = k1.bit_len().max(k2.bit_len());

    let mut acc = JacobianPoint::infinity();
    for i in (0..bits).rev() {
        acc = point_double(&acc, params)?;
        match (k1.get_bit(i), k2.get_bit(i)) {
            (1, 1) => acc = point_add(&acc, &g_plus_q, params)?,
            (1, 0) => acc = point_add(&acc, g, params)?,
            (0, 1) => acc = point_add(&acc, q, params)?,
            _ => {}
        }
    }

    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecc::curves::get_curve_params;
    use gmt_types::EccCurveId;

    fn sm2_params() -> CurveParams {
        get_curve_params(EccCurveId::Sm2Prime256).unwrap()
    }

    fn generator(params: &CurveParams) -> JacobianPoint {
        JacobianPoint::from_affine(&params.gx, &params.gy)
    }

    #[test]
    fn test_affine_roundtrip() {
        let params = sm2_params();
        let g = generator(&params);
        let (x, y) = g.to_affine(&params.p).unwrap().unwrap();
        assert_eq!(x, params.gx);
        assert_eq!(y, params.gy);
    }

    #[test]
    fn test_infinity_to_affine_is_none() {
        let params = sm2_params();
        assert!(JacobianPoint::infinity()
            .to_affine(&params.p)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_add_identity() {
        let params = sm2_params();
        let g = generator(&params);
        let inf = JacobianPoint::infinity();

        for sum in [
            point_add(&g, &inf, &params).unwrap(),
            point_add(&inf, &g, &params).unwrap(),
        ] {
            let (x, y) = sum.to_affine(&params.p).unwrap().unwrap();
            assert_eq!(x, params.gx);
            assert_eq!(y, params.gy);
        }
    }

    #[test]
    fn test_add_inverse_is_infinity() {
        let params = sm2_params();
        let g = generator(&params);
        let neg_g = JacobianPoint::from_affine(&params.gx, &params.p.sub(&params.gy));
        assert!(point_add(&g, &neg_g, &params).unwrap().is_infinity());
    }

    #[test]
    fn test_double_matches_add() {
        let params = sm2_params();
        let g = generator(&params);
        let doubled = point_double(&g, &params).unwrap();
        let added = point_add(&g, &g, &params).unwrap();
        assert_eq!(
            doubled.to_affine(&params.p).unwrap().unwrap(),
            added.to_affine(&params.p).unwrap().unwrap()
        );
    }

    #[test]
    fn test_scalar_mul_small_consistency() {
        let params = sm2_params();
        let g = generator(&params);

        // 5G via scalar mul equals 2(2G) + G
        let five_g = scalar_mul(&BigNum::from_u64(5), &g, &params).unwrap();
        let four_g = point_double(&point_double(&g, &params).unwrap(), &params).unwrap();
        let sum = point_add(&four_g, &g, &params).unwrap();
        assert_eq!(
            five_g.to_affine(&params.p).unwrap().unwrap(),
            sum.to_affine(&params.p).unwrap().unwrap()
        );
    }

    #[test]
    fn test_scalar_mul_by_zero() {
        let params = sm2_params();
        let g = generator(&params);
        assert!(scalar_mul(&BigNum::zero(), &g, &params)
            .unwrap()
            .is_infinity());
    }

    #[test]
    fn test_scalar_mul_by_order() {
        let params = sm2_params();
        let g = generator(&params);
        let ng = scalar_mul(&params.n, &g, &params).unwrap();
        assert!(ng.is_infinity());
    }

    #[test]
    fn test_shamir_consistency() {
        let params = sm2_params();
        let g = generator(&params);
        let q = point_double(&g, &params).unwrap();
        let k1 = BigNum::from_u64(11);
        let k2 = BigNum::from_u64(29);

        let combined = scalar_mul_add(&k1, &g, &k2, &q, &params).unwrap();
        let separate = point_add(
            &scalar_mul(&k1, &g, &params).unwrap(),
            &scalar_mul(&k2, &q, &params).unwrap(),
            &params,
        )
        .unwrap();
        assert_eq!(
            combined.to_affine(&params.p).unwrap().unwrap(),
            separate.to_affine(&params.p).unwrap().unwrap()
        );
    }
}
