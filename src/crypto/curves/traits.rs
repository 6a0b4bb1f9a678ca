//! Threshold Curve Traits
//!
//! Defines the common interface the secret-sharing layer is generic over.

use std::fmt::Debug;
use std::ops::{Add, Mul, Neg, Sub};

use super::{CurveError, CurveType};

/// Prime-order group with a scalar field, as used by Shamir sharing
pub trait ThresholdCurve {
    /// Element of the scalar field
    type Scalar: Copy
        + Debug
        + PartialEq
        + Add<Output = Self::Scalar>
        + Sub<Output = Self::Scalar>
        + Mul<Output = Self::Scalar>
        + Neg<Output = Self::Scalar>;

    /// Group element
    type Point: Copy
        + Debug
        + PartialEq
        + Add<Output = Self::Point>
        + Mul<Self::Scalar, Output = Self::Point>;

    /// Wire encoding of a point
    type EncodedPoint: AsRef<[u8]> + Copy;

    const CURVE: CurveType;

    fn scalar_zero() -> Self::Scalar;

    /// Embed a participant index into the scalar field
    fn scalar_from_index(index: u32) -> Self::Scalar;

    fn scalar_random() -> Self::Scalar;

    /// Multiplicative inverse, `None` for zero
    fn scalar_invert(scalar: &Self::Scalar) -> Option<Self::Scalar>;

    fn scalar_to_bytes(scalar: &Self::Scalar) -> [u8; 32];

    /// Decode a canonical scalar encoding
    fn scalar_from_bytes(bytes: &[u8; 32]) -> Result<Self::Scalar, CurveError>;

    fn base_point_mult(scalar: &Self::Scalar) -> Self::Point;

    fn point_identity() -> Self::Point;

    fn point_to_bytes(point: &Self::Point) -> Self::EncodedPoint;

    /// Decode a point, rejecting encodings that are not on the curve
    fn point_from_bytes(bytes: &Self::EncodedPoint) -> Result<Self::Point, CurveError>;
}
