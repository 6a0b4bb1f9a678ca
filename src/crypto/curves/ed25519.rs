//! Ed25519 Curve Implementation
//!
//! Used by: threshold EdDSA (Solana, Stellar, Tezos, Near, ...)
//!
//! Features:
//! - Scalar/point arithmetic via `curve25519-dalek`
//! - RFC 8032 secret clamping and SHA-512 scalar derivation
//! - Signature verification via `ed25519-dalek`

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::Identity;
use ed25519_dalek::{Signature, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha512};

use super::{CurveError, CurveType, ThresholdCurve};

/// Ed25519 curve implementation
pub struct Ed25519Curve;

impl ThresholdCurve for Ed25519Curve {
    type Scalar = Scalar;
    type Point = EdwardsPoint;
    type EncodedPoint = [u8; 32];

    const CURVE: CurveType = CurveType::Ed25519;

    fn scalar_zero() -> Scalar {
        Scalar::ZERO
    }

    fn scalar_from_index(index: u32) -> Scalar {
        Scalar::from(index as u64)
    }

    fn scalar_random() -> Scalar {
        let mut wide = [0u8; 64];
        OsRng.fill_bytes(&mut wide);
        Scalar::from_bytes_mod_order_wide(&wide)
    }

    fn scalar_invert(scalar: &Scalar) -> Option<Scalar> {
        if *scalar == Scalar::ZERO {
            None
        } else {
            Some(scalar.invert())
        }
    }

    fn scalar_to_bytes(scalar: &Scalar) -> [u8; 32] {
        scalar.to_bytes()
    }

    fn scalar_from_bytes(bytes: &[u8; 32]) -> Result<Scalar, CurveError> {
        Option::from(Scalar::from_canonical_bytes(*bytes))
            .ok_or_else(|| CurveError::InvalidScalar("scalar is not canonical".into()))
    }

    fn base_point_mult(scalar: &Scalar) -> EdwardsPoint {
        EdwardsPoint::mul_base(scalar)
    }

    fn point_identity() -> EdwardsPoint {
        EdwardsPoint::identity()
    }

    fn point_to_bytes(point: &EdwardsPoint) -> [u8; 32] {
        point.compress().to_bytes()
    }

    fn point_from_bytes(bytes: &[u8; 32]) -> Result<EdwardsPoint, CurveError> {
        CompressedEdwardsY(*bytes)
            .decompress()
            .ok_or_else(|| CurveError::InvalidPoint("point is not on ed25519".into()))
    }
}

impl Ed25519Curve {
    /// RFC 8032 clamping of a little-endian secret
    pub fn clamp(mut bytes: [u8; 32]) -> [u8; 32] {
        bytes[0] &= 248;
        bytes[31] &= 127;
        bytes[31] |= 64;
        bytes
    }

    /// Reduce a 32-byte little-endian integer mod the group order
    pub fn scalar_reduce(bytes: &[u8; 32]) -> Scalar {
        Scalar::from_bytes_mod_order(*bytes)
    }

    /// SHA-512 over the concatenated parts, reduced mod the group order
    pub fn hash_to_scalar(parts: &[&[u8]]) -> Scalar {
        let mut hasher = Sha512::new();
        for part in parts {
            hasher.update(part);
        }
        let digest: [u8; 64] = hasher.finalize().into();
        Scalar::from_bytes_mod_order_wide(&digest)
    }

    /// Verify an `R || S` signature against a compressed public key
    pub fn verify(
        public_key: &[u8; 32],
        message: &[u8],
        signature: &[u8; 64],
    ) -> Result<bool, CurveError> {
        let verifying_key = VerifyingKey::from_bytes(public_key)
            .map_err(|e| CurveError::InvalidPoint(e.to_string()))?;
        let signature = Signature::from_bytes(signature);
        Ok(verifying_key.verify_strict(message, &signature).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    #[test]
    fn test_clamped_seed_matches_ed25519_public_key() {
        let seed = [7u8; 32];
        let h: [u8; 64] = Sha512::digest(seed).into();
        let mut lower = [0u8; 32];
        lower.copy_from_slice(&h[..32]);
        let u = Ed25519Curve::scalar_reduce(&Ed25519Curve::clamp(lower));
        let y = Ed25519Curve::point_to_bytes(&Ed25519Curve::base_point_mult(&u));

        let signing_key = SigningKey::from_bytes(&seed);
        assert_eq!(y, signing_key.verifying_key().to_bytes());
    }

    #[test]
    fn test_verify_reference_signature() {
        let signing_key = SigningKey::from_bytes(&[3u8; 32]);
        let sig = signing_key.sign(b"payload").to_bytes();
        let pk = signing_key.verifying_key().to_bytes();
        assert!(Ed25519Curve::verify(&pk, b"payload", &sig).unwrap());
        assert!(!Ed25519Curve::verify(&pk, b"other", &sig).unwrap());
    }

    #[test]
    fn test_non_canonical_scalar_rejected() {
        assert!(Ed25519Curve::scalar_from_bytes(&[0xff; 32]).is_err());
    }

    #[test]
    fn test_invert_zero() {
        assert!(Ed25519Curve::scalar_invert(&Scalar::ZERO).is_none());
        let two = Ed25519Curve::scalar_from_index(2);
        let inv = Ed25519Curve::scalar_invert(&two).unwrap();
        assert_eq!(inv * two, Scalar::ONE);
    }
}
