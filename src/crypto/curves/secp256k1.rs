//! secp256k1 Curve Implementation
//!
//! Used by: threshold ECDSA (Bitcoin, Ethereum, Tron, ...)
//!
//! Features:
//! - Scalar/point arithmetic via `k256`
//! - Conversions between scalars and Paillier-sized integers
//! - ECDSA verification and public key recovery via `secp256k1`

use k256::elliptic_curve::bigint::U256;
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::point::AffineCoordinates;
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::elliptic_curve::{Field, PrimeField};
use k256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar};
use num_bigint::BigUint;
use rand::rngs::OsRng;

use ::secp256k1::ecdsa::{RecoverableSignature, RecoveryId, Signature};
use ::secp256k1::{Message, PublicKey, Secp256k1};

use super::{CurveError, CurveType, ThresholdCurve};

/// Group order n of secp256k1
const ORDER_HEX: &[u8] = b"fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";

/// secp256k1 curve implementation
pub struct Secp256k1Curve;

impl ThresholdCurve for Secp256k1Curve {
    type Scalar = Scalar;
    type Point = ProjectivePoint;
    type EncodedPoint = [u8; 33];

    const CURVE: CurveType = CurveType::Secp256k1;

    fn scalar_zero() -> Scalar {
        Scalar::ZERO
    }

    fn scalar_from_index(index: u32) -> Scalar {
        Scalar::from(index as u64)
    }

    fn scalar_random() -> Scalar {
        Scalar::random(&mut OsRng)
    }

    fn scalar_invert(scalar: &Scalar) -> Option<Scalar> {
        Option::from(scalar.invert())
    }

    fn scalar_to_bytes(scalar: &Scalar) -> [u8; 32] {
        scalar.to_bytes().into()
    }

    fn scalar_from_bytes(bytes: &[u8; 32]) -> Result<Scalar, CurveError> {
        Option::from(Scalar::from_repr(FieldBytes::from(*bytes)))
            .ok_or_else(|| CurveError::InvalidScalar("scalar is not below the group order".into()))
    }

    fn base_point_mult(scalar: &Scalar) -> ProjectivePoint {
        ProjectivePoint::GENERATOR * *scalar
    }

    fn point_identity() -> ProjectivePoint {
        ProjectivePoint::IDENTITY
    }

    fn point_to_bytes(point: &ProjectivePoint) -> [u8; 33] {
        let encoded = point.to_affine().to_encoded_point(true);
        let mut out = [0u8; 33];
        // The identity has a 1-byte SEC1 encoding; it is left as all zeros,
        // which point_from_bytes rejects.
        if encoded.as_bytes().len() == 33 {
            out.copy_from_slice(encoded.as_bytes());
        }
        out
    }

    fn point_from_bytes(bytes: &[u8; 33]) -> Result<ProjectivePoint, CurveError> {
        let encoded = EncodedPoint::from_bytes(bytes)
            .map_err(|e| CurveError::InvalidPoint(e.to_string()))?;
        let affine: Option<AffinePoint> = AffinePoint::from_encoded_point(&encoded).into();
        affine
            .map(ProjectivePoint::from)
            .ok_or_else(|| CurveError::InvalidPoint("point is not on secp256k1".into()))
    }
}

impl Secp256k1Curve {
    /// Group order as a big integer
    pub fn order() -> BigUint {
        BigUint::parse_bytes(ORDER_HEX, 16).unwrap_or_default()
    }

    /// Interpret 32 big-endian bytes as an integer and reduce it mod n
    pub fn scalar_reduce_bytes(bytes: &[u8; 32]) -> Scalar {
        <Scalar as Reduce<U256>>::reduce_bytes(&FieldBytes::from(*bytes))
    }

    pub fn scalar_to_biguint(scalar: &Scalar) -> BigUint {
        BigUint::from_bytes_be(&scalar.to_bytes())
    }

    /// Reduce an arbitrary non-negative integer into the scalar field
    pub fn scalar_from_biguint(value: &BigUint) -> Scalar {
        let reduced = value % Self::order();
        let be = reduced.to_bytes_be();
        let mut bytes = [0u8; 32];
        bytes[32 - be.len()..].copy_from_slice(&be);
        Self::scalar_reduce_bytes(&bytes)
    }

    /// Big-endian x-coordinate of a point
    pub fn point_x(point: &ProjectivePoint) -> [u8; 32] {
        point.to_affine().x().into()
    }

    pub fn point_y_is_odd(point: &ProjectivePoint) -> bool {
        point.to_affine().y_is_odd().into()
    }

    /// Verify a compact (r, s) signature over a 32-byte digest.
    ///
    /// High-S signatures are rejected, matching consensus rules of the
    /// chains that use this curve.
    pub fn verify_digest(
        public_key: &[u8; 33],
        digest: &[u8; 32],
        r: &[u8; 32],
        s: &[u8; 32],
    ) -> Result<bool, CurveError> {
        let secp = Secp256k1::verification_only();

        let pk = PublicKey::from_slice(public_key)
            .map_err(|e| CurveError::InvalidPoint(e.to_string()))?;

        let mut compact = [0u8; 64];
        compact[..32].copy_from_slice(r);
        compact[32..].copy_from_slice(s);
        let sig = Signature::from_compact(&compact)
            .map_err(|e| CurveError::InvalidSignature(e.to_string()))?;

        let msg = Message::from_digest(*digest);
        Ok(secp.verify_ecdsa(&msg, &sig, &pk).is_ok())
    }

    /// Recover the compressed public key that produced a signature
    pub fn recover_public_key(
        digest: &[u8; 32],
        r: &[u8; 32],
        s: &[u8; 32],
        recovery_id: u8,
    ) -> Result<[u8; 33], CurveError> {
        let secp = Secp256k1::verification_only();

        let rec_id = RecoveryId::from_i32(recovery_id as i32)
            .map_err(|e| CurveError::InvalidSignature(format!("Invalid recovery ID: {}", e)))?;

        let mut compact = [0u8; 64];
        compact[..32].copy_from_slice(r);
        compact[32..].copy_from_slice(s);
        let sig = RecoverableSignature::from_compact(&compact, rec_id)
            .map_err(|e| CurveError::InvalidSignature(e.to_string()))?;

        let msg = Message::from_digest(*digest);
        let pk = secp
            .recover_ecdsa(&msg, &sig)
            .map_err(|e| CurveError::InvalidSignature(format!("Recovery failed: {}", e)))?;

        Ok(pk.serialize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_encoding_roundtrip() {
        let scalar = Secp256k1Curve::scalar_random();
        let point = Secp256k1Curve::base_point_mult(&scalar);
        let encoded = Secp256k1Curve::point_to_bytes(&point);
        assert!(encoded[0] == 0x02 || encoded[0] == 0x03);
        let decoded = Secp256k1Curve::point_from_bytes(&encoded).unwrap();
        assert_eq!(decoded, point);
    }

    #[test]
    fn test_identity_not_decodable() {
        let encoded = Secp256k1Curve::point_to_bytes(&Secp256k1Curve::point_identity());
        assert_eq!(encoded, [0u8; 33]);
        assert!(Secp256k1Curve::point_from_bytes(&encoded).is_err());
    }

    #[test]
    fn test_scalar_above_order_rejected() {
        assert!(Secp256k1Curve::scalar_from_bytes(&[0xff; 32]).is_err());
        // ...but reduces fine
        let reduced = Secp256k1Curve::scalar_reduce_bytes(&[0xff; 32]);
        let expected = BigUint::from_bytes_be(&[0xff; 32]) % Secp256k1Curve::order();
        assert_eq!(Secp256k1Curve::scalar_to_biguint(&reduced), expected);
    }

    #[test]
    fn test_biguint_conversion_reduces() {
        let order = Secp256k1Curve::order();
        let value = &order + BigUint::from(7u32);
        let scalar = Secp256k1Curve::scalar_from_biguint(&value);
        assert_eq!(scalar, Scalar::from(7u64));
    }

    #[test]
    fn test_public_key_matches_libsecp256k1() {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        let one = Secp256k1Curve::scalar_from_bytes(&bytes).unwrap();
        let g = Secp256k1Curve::point_to_bytes(&Secp256k1Curve::base_point_mult(&one));
        assert_eq!(
            hex::encode(g),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
    }
}
