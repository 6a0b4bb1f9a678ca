//! Shamir Secret Sharing over curve scalar fields
//!
//! Splits a scalar into `num_shares` evaluations of a random polynomial of
//! degree `threshold - 1`. Feldman commitments to the non-constant
//! coefficients let each recipient check its share against the dealer's
//! public key without learning anything else.

use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;

use crate::crypto::curves::ThresholdCurve;
use crate::error::{HawalaError, HawalaResult};

/// Output of a split: one share per index plus coefficient commitments
#[derive(Debug, Clone)]
pub struct SplitShares<C: ThresholdCurve> {
    pub shares: BTreeMap<u32, C::Scalar>,
    /// `a_k·G` for k = 1..threshold
    pub v: Vec<C::Point>,
}

/// Shamir sharing over the scalar field of `C`
pub struct Shamir<C: ThresholdCurve>(PhantomData<C>);

impl<C: ThresholdCurve> Shamir<C> {
    /// Split `secret` at indices `1..=num_shares`, or at `indices` when given
    pub fn split(
        secret: &C::Scalar,
        threshold: u32,
        num_shares: u32,
        indices: Option<&[u32]>,
    ) -> HawalaResult<SplitShares<C>> {
        if threshold == 0 {
            return Err(HawalaError::invalid_config("Threshold must be at least 1"));
        }
        if threshold > num_shares {
            return Err(HawalaError::invalid_config(format!(
                "Threshold {} exceeds number of shares {}",
                threshold, num_shares
            )));
        }

        let indices: Vec<u32> = match indices {
            Some(list) => {
                if list.len() != num_shares as usize {
                    return Err(HawalaError::invalid_config(format!(
                        "Expected {} indices, got {}",
                        num_shares,
                        list.len()
                    )));
                }
                let unique: BTreeSet<u32> = list.iter().copied().collect();
                if unique.len() != list.len() || unique.contains(&0) {
                    return Err(HawalaError::invalid_config(
                        "Share indices must be distinct and non-zero",
                    ));
                }
                list.to_vec()
            }
            None => (1..=num_shares).collect(),
        };

        let coefficients: Vec<C::Scalar> = (1..threshold).map(|_| C::scalar_random()).collect();

        let mut shares = BTreeMap::new();
        for index in indices {
            let x = C::scalar_from_index(index);
            // Horner evaluation from the highest coefficient down to the secret
            let mut acc = C::scalar_zero();
            for coefficient in coefficients.iter().rev() {
                acc = (acc + *coefficient) * x;
            }
            shares.insert(index, acc + *secret);
        }

        let v = coefficients.iter().map(C::base_point_mult).collect();

        Ok(SplitShares { shares, v })
    }

    /// Check `share·G == y + Σ v_k·index^k`
    pub fn verify(share: &C::Scalar, y: &C::Point, v: &[C::Point], index: u32) -> HawalaResult<()> {
        let x = C::scalar_from_index(index);
        let mut power = x;
        let mut expected = *y;
        for commitment in v {
            expected = expected + *commitment * power;
            power = power * x;
        }

        if C::base_point_mult(share) == expected {
            Ok(())
        } else {
            Err(HawalaError::share_verification_failed(format!(
                "Share for index {} does not match dealer commitments",
                index
            )))
        }
    }

    /// Lagrange coefficient of `index` for interpolation at zero
    pub fn lagrange_coefficient(index: u32, indices: &[u32]) -> HawalaResult<C::Scalar> {
        let xi = C::scalar_from_index(index);
        let mut numerator = C::scalar_from_index(1);
        let mut denominator = C::scalar_from_index(1);
        for &other in indices {
            if other == index {
                continue;
            }
            let xj = C::scalar_from_index(other);
            numerator = numerator * xj;
            denominator = denominator * (xj - xi);
        }
        let inverse = C::scalar_invert(&denominator)
            .ok_or_else(|| HawalaError::invalid_share("Duplicate share index"))?;
        Ok(numerator * inverse)
    }

    /// Interpolate the shared secret from a set of shares
    pub fn combine(shares: &BTreeMap<u32, C::Scalar>) -> HawalaResult<C::Scalar> {
        if shares.is_empty() {
            return Err(HawalaError::invalid_share("No shares to combine"));
        }
        let indices: Vec<u32> = shares.keys().copied().collect();
        let mut secret = C::scalar_zero();
        for (&index, share) in shares {
            secret = secret + *share * Self::lagrange_coefficient(index, &indices)?;
        }
        Ok(secret)
    }
}
