//! Threshold EdDSA
//!
//! # Key generation
//! 1. Each participant runs `key_share`, producing a private u-share and one
//!    y-share per other participant.
//! 2. Y-shares are distributed.
//! 3. Each participant runs `key_combine` with the y-shares it received,
//!    producing its p-share and one j-share per other participant.
//!
//! # Signing
//! 1. Every signer runs `sign_share` with its p-share and the j-shares of
//!    its co-signers, producing a private x-share and one r-share per
//!    co-signer.
//! 2. R-shares are distributed.
//! 3. Every signer runs `sign` with the r-shares it received (plus the
//!    y-shares of participants that are not signing), producing a g-share.
//! 4. Any party runs `sign_combine` on the g-shares to get the signature.

pub mod types;

pub use types::*;

use std::collections::{BTreeMap, BTreeSet};

use curve25519_dalek::scalar::Scalar;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::crypto::curves::{Ed25519Curve, ThresholdCurve};
use crate::crypto::shamir::Shamir;
use crate::error::{ErrorCode, HawalaError, HawalaResult};
use crate::{log_debug, log_warn};
use crate::serde_bytes::Bytes32;
use crate::utils::tss_config::{global_config, TssSettings};

const MODULE: &str = "tss::eddsa";

type Shares = Shamir<Ed25519Curve>;

/// Threshold EdDSA participant operations
#[derive(Debug, Clone)]
pub struct Eddsa {
    settings: TssSettings,
}

impl Default for Eddsa {
    fn default() -> Self {
        Self::new()
    }
}

impl Eddsa {
    /// Use the process-wide configuration
    pub fn new() -> Self {
        Self::with_settings(global_config().settings())
    }

    pub fn with_settings(settings: TssSettings) -> Self {
        Self { settings }
    }

    /// Generate the key share of participant `index`.
    ///
    /// `seed` is 32 bytes of secret seed followed by a 32-byte chaincode.
    pub fn key_share(
        &self,
        index: u32,
        threshold: u32,
        num_shares: u32,
        seed: Option<&[u8]>,
    ) -> HawalaResult<KeyShare> {
        if index == 0 || index > num_shares {
            return Err(HawalaError::invalid_config(format!(
                "Invalid KeyShare config: index {} of {}",
                index, num_shares
            )));
        }
        if threshold == 0 || threshold > num_shares {
            return Err(HawalaError::invalid_config(format!(
                "Invalid KeyShare config: threshold {} of {}",
                threshold, num_shares
            )));
        }

        let seedchain = read_seed(seed)?;
        let mut secret_seed = [0u8; 32];
        secret_seed.copy_from_slice(&seedchain[..32]);
        let mut chaincode = [0u8; 32];
        chaincode.copy_from_slice(&seedchain[32..]);

        let (u, _prefix) = expand_seed(&secret_seed);
        let y = Ed25519Curve::point_to_bytes(&Ed25519Curve::base_point_mult(&u));
        let split = Shares::split(&u, threshold, num_shares, None)?;
        let v: Vec<Bytes32> = split
            .v
            .iter()
            .map(|p| Bytes32(Ed25519Curve::point_to_bytes(p)))
            .collect();

        let u_share = UShare {
            i: index,
            t: threshold,
            n: num_shares,
            y,
            seed: secret_seed,
            chaincode,
        };
        secret_seed.fill(0);

        let mut y_shares = BTreeMap::new();
        for (&i, share) in &split.shares {
            if i == index {
                continue;
            }
            y_shares.insert(
                i,
                YShare {
                    i,
                    j: index,
                    y,
                    v: v.clone(),
                    u: Ed25519Curve::scalar_to_bytes(share),
                    chaincode,
                },
            );
        }

        log_debug!(
            MODULE,
            "key share generated",
            index = index,
            threshold = threshold,
            num_shares = num_shares
        );

        Ok(KeyShare { u_share, y_shares })
    }

    /// Combine own u-share with the y-shares received from other participants
    pub fn key_combine(&self, u_share: &UShare, y_shares: &[YShare]) -> HawalaResult<KeyCombine> {
        let mut senders = BTreeSet::new();
        for share in y_shares {
            if share.i != u_share.i {
                return Err(HawalaError::invalid_share(format!(
                    "YShare from {} is addressed to {}, not {}",
                    share.j, share.i, u_share.i
                )));
            }
            if share.j == u_share.i || !senders.insert(share.j) {
                return Err(HawalaError::invalid_share(format!(
                    "Unexpected YShare sender {}",
                    share.j
                )));
            }
        }

        if !self.settings.verify_received_shares {
            log_warn!(MODULE, "received shares accepted without verification", index = u_share.i);
        }
        let (u, prefix) = expand_seed(&u_share.seed);

        let mut y = Ed25519Curve::point_from_bytes(&u_share.y)?;
        let mut chaincode = u_share.chaincode;
        for share in y_shares {
            let sender_y = Ed25519Curve::point_from_bytes(&share.y)?;
            if self.settings.verify_received_shares {
                let v = decode_points(&share.v)?;
                let received = Ed25519Curve::scalar_from_bytes(&share.u)?;
                Shares::verify(&received, &sender_y, &v, u_share.i).map_err(|e| {
                    HawalaError::share_verification_failed(format!(
                        "Could not verify share from participant {}",
                        share.j
                    ))
                    .with_details(e.message)
                })?;
            }
            y = y + sender_y;
            chaincode = add_chaincodes(&chaincode, &share.chaincode);
        }

        let p_share = PShare {
            i: u_share.i,
            t: u_share.t,
            n: u_share.n,
            y: Ed25519Curve::point_to_bytes(&y),
            u: Ed25519Curve::scalar_to_bytes(&u),
            prefix: *prefix,
            chaincode,
        };

        let j_shares = y_shares
            .iter()
            .map(|share| (share.j, JShare { i: share.j, j: u_share.i }))
            .collect();

        log_debug!(
            MODULE,
            "key combined",
            index = u_share.i,
            received = y_shares.len()
        );

        Ok(KeyCombine { p_share, j_shares })
    }

    /// Start signing `message` with the co-signers named by `j_shares`.
    ///
    /// `seed` replaces the 64 random bytes mixed into the nonce.
    pub fn sign_share(
        &self,
        message: &[u8],
        p_share: &PShare,
        j_shares: &[JShare],
        seed: Option<&[u8]>,
    ) -> HawalaResult<SignShare> {
        let mut indices = vec![p_share.i];
        for share in j_shares {
            if share.j != p_share.i {
                return Err(HawalaError::invalid_share(format!(
                    "JShare for {} does not belong to participant {}",
                    share.i, p_share.i
                )));
            }
            if indices.contains(&share.i) {
                return Err(HawalaError::invalid_share(format!(
                    "Duplicate signer {}",
                    share.i
                )));
            }
            if share.i == 0 || share.i > p_share.n {
                return Err(HawalaError::invalid_share(format!(
                    "Signer index {} out of range",
                    share.i
                )));
            }
            indices.push(share.i);
        }
        if (indices.len() as u32) < p_share.t {
            return Err(HawalaError::invalid_config(format!(
                "{} signers cannot meet threshold {}",
                indices.len(),
                p_share.t
            )));
        }

        let u = Ed25519Curve::scalar_from_bytes(&p_share.u)?;
        let split_u = Shares::split(&u, p_share.t, p_share.n, None)?;

        let randomness = read_seed(seed)?;
        let r = Ed25519Curve::hash_to_scalar(&[&p_share.prefix, message, randomness.as_slice()]);
        let big_r = Ed25519Curve::point_to_bytes(&Ed25519Curve::base_point_mult(&r));
        let signer_count = indices.len() as u32;
        let split_r = Shares::split(&r, signer_count, signer_count, Some(&indices))?;

        let x_share = XShare {
            i: p_share.i,
            y: p_share.y,
            u: Ed25519Curve::scalar_to_bytes(&split_u.shares[&p_share.i]),
            r: Ed25519Curve::scalar_to_bytes(&split_r.shares[&p_share.i]),
            big_r,
        };

        let mut r_shares = BTreeMap::new();
        for share in j_shares {
            let r_j = split_r.shares[&share.i];
            r_shares.insert(
                share.i,
                RShare {
                    i: share.i,
                    j: p_share.i,
                    u: Ed25519Curve::scalar_to_bytes(&split_u.shares[&share.i]),
                    r: Ed25519Curve::scalar_to_bytes(&r_j),
                    big_r,
                    commitment: Some(Ed25519Curve::point_to_bytes(
                        &Ed25519Curve::base_point_mult(&r_j),
                    )),
                },
            );
        }

        log_debug!(
            MODULE,
            "sign share generated",
            index = p_share.i,
            signers = signer_count
        );

        Ok(SignShare { x_share, r_shares })
    }

    /// Produce this signer's partial signature.
    ///
    /// `y_shares` are the key-generation shares of participants that take
    /// no part in this signature.
    pub fn sign(
        &self,
        message: &[u8],
        x_share: &XShare,
        r_shares: &[RShare],
        y_shares: &[YShare],
    ) -> HawalaResult<GShare> {
        let mut contributors = BTreeSet::from([x_share.i]);
        for share in r_shares {
            if share.i != x_share.i {
                return Err(HawalaError::invalid_share(format!(
                    "RShare from {} is addressed to {}, not {}",
                    share.j, share.i, x_share.i
                )));
            }
            if !contributors.insert(share.j) {
                return Err(HawalaError::invalid_share(format!(
                    "Duplicate RShare from {}",
                    share.j
                )));
            }
            self.validate_commitment(share)?;
        }
        for share in y_shares {
            if share.i != x_share.i {
                return Err(HawalaError::invalid_share(format!(
                    "YShare from {} is addressed to {}, not {}",
                    share.j, share.i, x_share.i
                )));
            }
            if !contributors.insert(share.j) {
                return Err(HawalaError::invalid_share(format!(
                    "Participant {} contributed more than one share",
                    share.j
                )));
            }
        }

        let mut x = Ed25519Curve::scalar_from_bytes(&x_share.u)?;
        let mut r = Ed25519Curve::scalar_from_bytes(&x_share.r)?;
        let mut big_r = Ed25519Curve::point_from_bytes(&x_share.big_r)?;
        for share in r_shares {
            x += Ed25519Curve::scalar_from_bytes(&share.u)?;
            r += Ed25519Curve::scalar_from_bytes(&share.r)?;
            big_r += Ed25519Curve::point_from_bytes(&share.big_r)?;
        }
        for share in y_shares {
            let received = Ed25519Curve::scalar_from_bytes(&share.u)?;
            if self.settings.verify_received_shares {
                let sender_y = Ed25519Curve::point_from_bytes(&share.y)?;
                let v = decode_points(&share.v)?;
                Shares::verify(&received, &sender_y, &v, x_share.i).map_err(|e| {
                    HawalaError::share_verification_failed(format!(
                        "Could not verify share from participant {}",
                        share.j
                    ))
                    .with_details(e.message)
                })?;
            }
            x += received;
        }

        let big_r = Ed25519Curve::point_to_bytes(&big_r);
        let k = Ed25519Curve::hash_to_scalar(&[&big_r, &x_share.y, message]);
        let gamma = r + k * x;

        log_debug!(
            MODULE,
            "partial signature generated",
            index = x_share.i,
            r_shares = r_shares.len(),
            y_shares = y_shares.len()
        );

        Ok(GShare {
            i: x_share.i,
            y: x_share.y,
            gamma: Ed25519Curve::scalar_to_bytes(&gamma),
            big_r,
        })
    }

    /// Interpolate the partial signatures into the final signature
    pub fn sign_combine(&self, g_shares: &[GShare]) -> HawalaResult<Signature> {
        let first = g_shares
            .first()
            .ok_or_else(|| HawalaError::invalid_share("No GShares to combine"))?;

        let mut gammas: BTreeMap<u32, Scalar> = BTreeMap::new();
        for share in g_shares {
            if share.y != first.y || share.big_r != first.big_r {
                return Err(HawalaError::new(
                    ErrorCode::InconsistentShares,
                    format!("GShare from {} disagrees on y or R", share.i),
                ));
            }
            let gamma = Ed25519Curve::scalar_from_bytes(&share.gamma)?;
            if gammas.insert(share.i, gamma).is_some() {
                return Err(HawalaError::invalid_share(format!(
                    "Duplicate GShare from {}",
                    share.i
                )));
            }
        }

        let sigma = Shares::combine(&gammas)?;

        log_debug!(MODULE, "signature combined", signers = g_shares.len());

        Ok(Signature {
            y: first.y,
            big_r: first.big_r,
            sigma: Ed25519Curve::scalar_to_bytes(&sigma),
        })
    }

    /// Ed25519 verification of a combined signature
    pub fn verify(&self, message: &[u8], signature: &Signature) -> HawalaResult<bool> {
        Ok(Ed25519Curve::verify(&signature.y, message, &signature.to_bytes())?)
    }

    fn validate_commitment(&self, share: &RShare) -> HawalaResult<()> {
        let Some(commitment) = share.commitment else {
            if self.settings.require_r_share_commitments {
                return Err(HawalaError::commitment_mismatch(format!(
                    "RShare from {} carries no commitment",
                    share.j
                )));
            }
            return Ok(());
        };

        let r = Ed25519Curve::scalar_from_bytes(&share.r)?;
        let expected = Ed25519Curve::point_to_bytes(&Ed25519Curve::base_point_mult(&r));
        if bool::from(expected[..].ct_eq(&commitment[..])) {
            Ok(())
        } else {
            Err(HawalaError::commitment_mismatch(format!(
                "Could not verify RShare from participant {}",
                share.j
            )))
        }
    }
}

/// 64 bytes of caller seed or fresh randomness
fn read_seed(seed: Option<&[u8]>) -> HawalaResult<Zeroizing<[u8; 64]>> {
    let mut out = Zeroizing::new([0u8; 64]);
    match seed {
        Some(bytes) if bytes.len() == 64 => out.copy_from_slice(bytes),
        Some(bytes) => {
            return Err(HawalaError::invalid_input(format!(
                "Seed must have length 64, got {}",
                bytes.len()
            )))
        }
        None => OsRng.fill_bytes(&mut out[..]),
    }
    Ok(out)
}

/// RFC 8032 secret expansion: clamped scalar and nonce prefix
fn expand_seed(seed: &[u8; 32]) -> (Scalar, Zeroizing<[u8; 32]>) {
    let h: Zeroizing<[u8; 64]> = Zeroizing::new(Sha512::digest(seed).into());
    let mut lower = Zeroizing::new([0u8; 32]);
    lower.copy_from_slice(&h[..32]);
    let u = Ed25519Curve::scalar_reduce(&Ed25519Curve::clamp(*lower));
    let mut prefix = Zeroizing::new([0u8; 32]);
    prefix.copy_from_slice(&h[32..]);
    (u, prefix)
}

fn decode_points(v: &[Bytes32]) -> HawalaResult<Vec<curve25519_dalek::edwards::EdwardsPoint>> {
    v.iter()
        .map(|p| Ed25519Curve::point_from_bytes(p.as_bytes()).map_err(HawalaError::from))
        .collect()
}

/// Big-endian addition mod 2^256
fn add_chaincodes(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut carry = 0u16;
    for idx in (0..32).rev() {
        let sum = a[idx] as u16 + b[idx] as u16 + carry;
        out[idx] = sum as u8;
        carry = sum >> 8;
    }
    out
}
