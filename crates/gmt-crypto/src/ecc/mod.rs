//! Elliptic curve group and point types.
//!
//! [`EcGroup`] binds the curve parameters once and exposes the group
//! operations the SM2 protocols consume; [`EcPoint`] is the affine-visible
//! point with a distinguished infinity state. Group construction performs
//! the parameter validation of the reference `SM2_Init`: the base point
//! must lie on the curve and have order n.
//!
//! Scalar multiplication is double-and-add over a generic big-integer
//! backend and is not constant-time; a hardened deployment should swap in
//! a constant-time field implementation.

mod curves;
mod point;

use gmt_bignum::BigNum;
use gmt_types::{CryptoError, EccCurveId};

pub(crate) use curves::CurveParams;
use point::JacobianPoint;

/// An elliptic curve group (the curve and its parameters).
#[derive(Clone)]
pub struct EcGroup {
    params: CurveParams,
}

impl EcGroup {
    /// Bind the parameters of a named curve.
    ///
    /// Verifies that the base point satisfies the curve equation and that
    /// `n·G` is the point at infinity; either failure rejects the curve.
    pub fn new(curve_id: EccCurveId) -> Result<Self, CryptoError> {
        let params = curves::get_curve_params(curve_id)?;
        let group = EcGroup { params };

        let g = group.generator();
        if !group.is_on_curve(&g)? {
            return Err(CryptoError::EcurveInit);
        }
        if !group.scalar_mul(&group.params.n, &g)?.is_infinity() {
            return Err(CryptoError::PointOrder);
        }

        Ok(group)
    }

    /// The order n of the base point.
    pub fn order(&self) -> &BigNum {
        &self.params.n
    }

    /// The cofactor h.
    pub fn cofactor(&self) -> u32 {
        self.params.h
    }

    /// Size of a field element in bytes.
    pub fn field_size(&self) -> usize {
        self.params.field_size
    }

    pub(crate) fn params(&self) -> &CurveParams {
        &self.params
    }

    /// The base point G.
    pub fn generator(&self) -> EcPoint {
        EcPoint {
            x: self.params.gx.clone(),
            y: self.params.gy.clone(),
            infinity: false,
        }
    }

    /// Compute k·G.
    pub fn scalar_mul_base(&self, k: &BigNum) -> Result<EcPoint, CryptoError> {
        let g = JacobianPoint::from_affine(&self.params.gx, &self.params.gy);
        self.to_point(point::scalar_mul(k, &g, &self.params)?)
    }

    /// Compute k·P.
    pub fn scalar_mul(&self, k: &BigNum, p: &EcPoint) -> Result<EcPoint, CryptoError> {
        self.to_point(point::scalar_mul(k, &p.jacobian(), &self.params)?)
    }

    /// Compute k1·G + k2·P in one pass.
    pub fn scalar_mul_add(
        &self,
        k1: &BigNum,
        k2: &BigNum,
        p: &EcPoint,
    ) -> Result<EcPoint, CryptoError> {
        let g = JacobianPoint::from_affine(&self.params.gx, &self.params.gy);
        self.to_point(point::scalar_mul_add(
            k1,
            &g,
            k2,
            &p.jacobian(),
            &self.params,
        )?)
    }

    /// Compute P + Q.
    pub fn add(&self, p: &EcPoint, q: &EcPoint) -> Result<EcPoint, CryptoError> {
        self.to_point(point::point_add(&p.jacobian(), &q.jacobian(), &self.params)?)
    }

    /// Check whether a point satisfies y² = x³ + ax + b. The point at
    /// infinity does not.
    pub fn is_on_curve(&self, point: &EcPoint) -> Result<bool, CryptoError> {
        if point.infinity {
            return Ok(false);
        }
        let p = &self.params.p;
        let rhs = point
            .x
            .mod_mul(&point.x, p)?
            .mod_mul(&point.x, p)?
            .mod_add(&self.params.a.mod_mul(&point.x, p)?, p)?
            .mod_add(&self.params.b, p)?;
        let lhs = point.y.mod_mul(&point.y, p)?;
        Ok(lhs == rhs)
    }

    /// Full public-key validation: not infinity, coordinates inside the
    /// field, on the curve, and of order n.
    pub fn validate_pubkey(&self, point: &EcPoint) -> Result<(), CryptoError> {
        if point.infinity {
            return Err(CryptoError::PointAtInfinity);
        }
        if point.x >= self.params.p || point.y >= self.params.p {
            return Err(CryptoError::FieldElementOutOfRange);
        }
        if !self.is_on_curve(point)? {
            return Err(CryptoError::PointNotOnCurve);
        }
        if !self.scalar_mul(&self.params.n, point)?.is_infinity() {
            return Err(CryptoError::PointOrder);
        }
        Ok(())
    }

    fn to_point(&self, j: JacobianPoint) -> Result<EcPoint, CryptoError> {
        match j.to_affine(&self.params.p)? {
            None => Ok(EcPoint::infinity()),
            Some((x, y)) => Ok(EcPoint {
                x,
                y,
                infinity: false,
            }),
        }
    }
}

/// A point on an elliptic curve, in affine coordinates.
#[derive(Clone)]
pub struct EcPoint {
    x: BigNum,
    y: BigNum,
    infinity: bool,
}

impl EcPoint {
    /// The point at infinity (identity element).
    pub fn infinity() -> Self {
        EcPoint {
            x: BigNum::zero(),
            y: BigNum::zero(),
            infinity: true,
        }
    }

    /// Create a point from affine coordinates, checking it lies on the
    /// curve.
    pub fn new(group: &EcGroup, x: BigNum, y: BigNum) -> Result<Self, CryptoError> {
        let point = EcPoint {
            x,
            y,
            infinity: false,
        };
        if !group.is_on_curve(&point)? {
            return Err(CryptoError::PointNotOnCurve);
        }
        Ok(point)
    }

    /// The affine x-coordinate.
    pub fn x(&self) -> &BigNum {
        &self.x
    }

    /// The affine y-coordinate.
    pub fn y(&self) -> &BigNum {
        &self.y
    }

    /// Check whether this is the point at infinity.
    pub fn is_infinity(&self) -> bool {
        self.infinity
    }

    /// Encode in uncompressed form: `0x04 || X || Y`.
    pub fn to_uncompressed(&self, group: &EcGroup) -> Result<Vec<u8>, CryptoError> {
        let mut out = Vec::with_capacity(1 + 2 * group.field_size());
        out.push(0x04);
        out.extend_from_slice(&self.to_raw_affine(group)?);
        Ok(out)
    }

    /// Decode a point from its uncompressed representation.
    pub fn from_uncompressed(group: &EcGroup, data: &[u8]) -> Result<Self, CryptoError> {
        let fs = group.field_size();
        if data.len() != 1 + 2 * fs || data[0] != 0x04 {
            return Err(CryptoError::InvalidArg);
        }
        Self::from_raw_affine(group, &data[1..])
    }

    /// Encode as the bare `X || Y` concatenation (no tag byte), the form
    /// the SM2 ciphertext envelope uses.
    pub fn to_raw_affine(&self, group: &EcGroup) -> Result<Vec<u8>, CryptoError> {
        if self.infinity {
            return Err(CryptoError::PointAtInfinity);
        }
        let fs = group.field_size();
        let mut out = self.x.to_bytes_be_padded(fs)?;
        out.extend_from_slice(&self.y.to_bytes_be_padded(fs)?);
        Ok(out)
    }

    /// Decode a point from the bare `X || Y` concatenation.
    pub fn from_raw_affine(group: &EcGroup, data: &[u8]) -> Result<Self, CryptoError> {
        let fs = group.field_size();
        if data.len() != 2 * fs {
            return Err(CryptoError::InvalidArg);
        }
        Self::new(
            group,
            BigNum::from_bytes_be(&data[..fs]),
            BigNum::from_bytes_be(&data[fs..]),
        )
    }

    pub(crate) fn jacobian(&self) -> JacobianPoint {
        if self.infinity {
            JacobianPoint::infinity()
        } else {
            JacobianPoint::from_affine(&self.x, &self.y)
        }
    }
}
