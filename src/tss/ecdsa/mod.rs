//! Threshold ECDSA
//!
//! # Key generation
//! 1. Each participant runs `key_share`, producing a private p-share (with
//!    its Paillier key) and one n-share per other participant.
//! 2. N-shares are distributed.
//! 3. Each participant runs `key_combine`, producing its x-share and one
//!    y-share per other participant.
//!
//! # Signing (two signers A and B)
//! 1. A: `sign_share` → w-share (private), k-share (to B)
//! 2. B: `sign_convert(Respond)` → a-share (to A), b-share (private)
//! 3. A: `sign_convert(Accept)` → mu-share (to B), g-share (private)
//! 4. B: `sign_convert(Finalize)` → g-share (private)
//! 5. Both: `sign_combine` → o-share (private), d-share (to the other)
//! 6. Both: `sign` → s-share
//! 7. Any party: `construct_signature` on both s-shares.
//!
//! Steps 2 to 4 are the multiplicative-to-additive conversion over
//! Paillier: each signer ends up with additive shares of `k·gamma` and
//! `k·x` without learning the other signer's values.

pub mod types;

pub use types::*;

use std::collections::{BTreeMap, BTreeSet};

use k256::Scalar;
use num_bigint::BigUint;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::crypto::curves::{Secp256k1Curve, ThresholdCurve};
use crate::crypto::paillier::{random_below, PaillierKeyPair, PaillierPrivateKey, PaillierPublicKey};
use crate::crypto::shamir::Shamir;
use crate::error::{ErrorCode, HawalaError, HawalaResult};
use crate::{log_debug, log_warn};
use crate::serde_bytes::Bytes33;
use crate::types::MessageHash;
use crate::utils::tss_config::{global_config, TssSettings};

const MODULE: &str = "tss::ecdsa";

type Shares = Shamir<Secp256k1Curve>;

/// Threshold ECDSA participant operations
#[derive(Debug, Clone)]
pub struct Ecdsa {
    settings: TssSettings,
}

impl Default for Ecdsa {
    fn default() -> Self {
        Self::new()
    }
}

impl Ecdsa {
    /// Use the process-wide configuration
    pub fn new() -> Self {
        Self::with_settings(global_config().settings())
    }

    pub fn with_settings(settings: TssSettings) -> Self {
        Self { settings }
    }

    /// Generate the key share of participant `index` with a fresh Paillier key.
    ///
    /// Prime search for the configured modulus size dominates the cost.
    pub fn key_share(&self, index: u32, threshold: u32, num_shares: u32) -> HawalaResult<KeyShare> {
        check_key_share_config(index, threshold, num_shares)?;
        let paillier = PaillierKeyPair::generate(self.settings.paillier_bits)?;
        self.key_share_with_paillier(index, threshold, num_shares, &paillier)
    }

    /// Generate the key share of participant `index` around an existing Paillier key
    pub fn key_share_with_paillier(
        &self,
        index: u32,
        threshold: u32,
        num_shares: u32,
        paillier: &PaillierKeyPair,
    ) -> HawalaResult<KeyShare> {
        check_key_share_config(index, threshold, num_shares)?;
        self.check_modulus(paillier.public_key().n())
            .map_err(|e| HawalaError::invalid_config(e.message))?;

        let u = Secp256k1Curve::scalar_random();
        let y = Secp256k1Curve::point_to_bytes(&Secp256k1Curve::base_point_mult(&u));
        let mut chaincode = [0u8; 32];
        OsRng.fill_bytes(&mut chaincode);

        let split = Shares::split(&u, threshold, num_shares, None)?;
        let v: Vec<Bytes33> = split
            .v
            .iter()
            .map(|p| Bytes33(Secp256k1Curve::point_to_bytes(p)))
            .collect();

        let private = paillier.private_key();
        let n = paillier.public_key().n().clone();

        let p_share = PShare {
            i: index,
            l: private.lambda().clone(),
            m: private.mu().clone(),
            n: n.clone(),
            y,
            u: Secp256k1Curve::scalar_to_bytes(&split.shares[&index]),
            chaincode,
        };

        let mut n_shares = BTreeMap::new();
        for (&i, share) in &split.shares {
            if i == index {
                continue;
            }
            n_shares.insert(
                i,
                NShare {
                    i,
                    j: index,
                    n: n.clone(),
                    y,
                    v: v.clone(),
                    u: Secp256k1Curve::scalar_to_bytes(share),
                    chaincode,
                },
            );
        }

        log_debug!(
            MODULE,
            "key share generated",
            index = index,
            threshold = threshold,
            num_shares = num_shares,
            paillier_bits = paillier.public_key().bits()
        );

        Ok(KeyShare { p_share, n_shares })
    }

    /// Combine own p-share with the n-shares received from other participants
    pub fn key_combine(&self, p_share: &PShare, n_shares: &[NShare]) -> HawalaResult<KeyCombined> {
        let mut senders = BTreeSet::new();
        for share in n_shares {
            if share.i != p_share.i {
                return Err(HawalaError::invalid_share(format!(
                    "NShare from {} is addressed to {}, not {}",
                    share.j, share.i, p_share.i
                )));
            }
            if share.j == p_share.i || !senders.insert(share.j) {
                return Err(HawalaError::invalid_share(format!(
                    "Unexpected NShare sender {}",
                    share.j
                )));
            }
            self.check_modulus(&share.n)?;
        }

        if !self.settings.verify_received_shares {
            log_warn!(MODULE, "received shares accepted without verification", index = p_share.i);
        }
        let mut y = Secp256k1Curve::point_from_bytes(&p_share.y)?;
        let mut x = Secp256k1Curve::scalar_from_bytes(&p_share.u)?;
        let mut chaincode = Secp256k1Curve::scalar_reduce_bytes(&p_share.chaincode);
        for share in n_shares {
            let sender_y = Secp256k1Curve::point_from_bytes(&share.y)?;
            let received = Secp256k1Curve::scalar_from_bytes(&share.u)?;
            if self.settings.verify_received_shares {
                let v = share
                    .v
                    .iter()
                    .map(|p| Secp256k1Curve::point_from_bytes(p.as_bytes()))
                    .collect::<Result<Vec<_>, _>>()?;
                Shares::verify(&received, &sender_y, &v, p_share.i).map_err(|e| {
                    HawalaError::share_verification_failed(format!(
                        "Could not verify share from participant {}",
                        share.j
                    ))
                    .with_details(e.message)
                })?;
            }
            y = y + sender_y;
            x = x + received;
            chaincode = chaincode + Secp256k1Curve::scalar_reduce_bytes(&share.chaincode);
        }

        let x_share = XShare {
            i: p_share.i,
            l: p_share.l.clone(),
            m: p_share.m.clone(),
            n: p_share.n.clone(),
            y: Secp256k1Curve::point_to_bytes(&y),
            x: Secp256k1Curve::scalar_to_bytes(&x),
            chaincode: Secp256k1Curve::scalar_to_bytes(&chaincode),
        };

        let y_shares = n_shares
            .iter()
            .map(|share| {
                (
                    share.j,
                    YShare {
                        i: p_share.i,
                        j: share.j,
                        n: share.n.clone(),
                    },
                )
            })
            .collect();

        log_debug!(
            MODULE,
            "key combined",
            index = p_share.i,
            received = n_shares.len()
        );

        Ok(KeyCombined { x_share, y_shares })
    }

    /// Start signing with the co-signer described by `y_share`
    pub fn sign_share(&self, x_share: &XShare, y_share: &YShare) -> HawalaResult<SignShareRT> {
        if y_share.i != x_share.i || y_share.j == x_share.i {
            return Err(HawalaError::invalid_share(format!(
                "YShare ({}, {}) does not pair participant {} with a co-signer",
                y_share.i, y_share.j, x_share.i
            )));
        }
        self.check_modulus(&x_share.n)?;

        let pk = PaillierPublicKey::new(x_share.n.clone());
        let k = Secp256k1Curve::scalar_random();
        let gamma = Secp256k1Curve::scalar_random();

        let x = Secp256k1Curve::scalar_from_bytes(&x_share.x)?;
        let lagrange = Shares::lagrange_coefficient(x_share.i, &[x_share.i, y_share.j])?;
        let w = x * lagrange;

        let enc_k = pk.encrypt(&Secp256k1Curve::scalar_to_biguint(&k))?;

        let w_share = WShare {
            i: x_share.i,
            j: y_share.j,
            l: x_share.l.clone(),
            m: x_share.m.clone(),
            n: x_share.n.clone(),
            y: x_share.y,
            k: Secp256k1Curve::scalar_to_bytes(&k),
            w: Secp256k1Curve::scalar_to_bytes(&w),
            gamma: Secp256k1Curve::scalar_to_bytes(&gamma),
            enc_k: enc_k.clone(),
        };
        let k_share = KShare {
            i: y_share.j,
            j: x_share.i,
            n: x_share.n.clone(),
            k: enc_k,
        };

        log_debug!(MODULE, "sign share generated", index = x_share.i, peer = y_share.j);

        Ok(SignShareRT { w_share, k_share })
    }

    /// Run one step of the multiplicative-to-additive conversion
    pub fn sign_convert(&self, step: &SignConvert) -> HawalaResult<SignConvertRT> {
        match step {
            SignConvert::Respond {
                x_share,
                y_share,
                k_share,
            } => self.convert_respond(x_share, y_share, k_share),
            SignConvert::Accept { w_share, a_share } => self.convert_accept(w_share, a_share),
            SignConvert::Finalize { b_share, mu_share } => self.convert_finalize(b_share, mu_share),
        }
    }

    fn convert_respond(
        &self,
        x_share: &XShare,
        y_share: &YShare,
        k_share: &KShare,
    ) -> HawalaResult<SignConvertRT> {
        if k_share.i != x_share.i || k_share.j != y_share.j {
            return Err(HawalaError::invalid_share(format!(
                "KShare ({}, {}) is not from co-signer {} to {}",
                k_share.i, k_share.j, y_share.j, x_share.i
            )));
        }
        if k_share.n != y_share.n {
            return Err(HawalaError::invalid_share(format!(
                "KShare from {} uses a Paillier key other than its key share",
                k_share.j
            )));
        }
        self.check_modulus(&k_share.n)?;

        let own = self.sign_share(x_share, y_share)?;
        let w_share = &own.w_share;
        let peer_pk = k_share.public_key();

        let gamma = Secp256k1Curve::scalar_from_bytes(&w_share.gamma)?;
        let w = Secp256k1Curve::scalar_from_bytes(&w_share.w)?;
        let (alpha, beta) = mta_respond(&peer_pk, &k_share.k, &gamma)?;
        let (mu, nu) = mta_respond(&peer_pk, &k_share.k, &w)?;

        let a_share = AShare {
            i: k_share.j,
            j: x_share.i,
            n: x_share.n.clone(),
            k: w_share.enc_k.clone(),
            alpha,
            mu,
        };
        let b_share = BShare {
            i: x_share.i,
            j: k_share.j,
            l: w_share.l.clone(),
            m: w_share.m.clone(),
            n: w_share.n.clone(),
            y: w_share.y,
            k: w_share.k,
            w: w_share.w,
            gamma: w_share.gamma,
            beta: Secp256k1Curve::scalar_to_bytes(&beta),
            nu: Secp256k1Curve::scalar_to_bytes(&nu),
        };

        log_debug!(MODULE, "MtA respond", index = x_share.i, peer = k_share.j);

        Ok(SignConvertRT {
            a_share: Some(a_share),
            b_share: Some(b_share),
            ..Default::default()
        })
    }

    fn convert_accept(&self, w_share: &WShare, a_share: &AShare) -> HawalaResult<SignConvertRT> {
        if a_share.i != w_share.i || a_share.j != w_share.j {
            return Err(HawalaError::invalid_share(format!(
                "AShare ({}, {}) is not from co-signer {} to {}",
                a_share.i, a_share.j, w_share.j, w_share.i
            )));
        }
        self.check_modulus(&a_share.n)?;

        let own_key = w_share.paillier_private_key()?;
        let alpha = mta_accept(&own_key, &a_share.alpha)?;
        let mu = mta_accept(&own_key, &a_share.mu)?;

        let peer_pk = PaillierPublicKey::new(a_share.n.clone());
        let gamma = Secp256k1Curve::scalar_from_bytes(&w_share.gamma)?;
        let w = Secp256k1Curve::scalar_from_bytes(&w_share.w)?;
        let (peer_alpha, beta) = mta_respond(&peer_pk, &a_share.k, &gamma)?;
        let (peer_mu, nu) = mta_respond(&peer_pk, &a_share.k, &w)?;

        let mu_share = MUShare {
            i: a_share.j,
            j: w_share.i,
            alpha: peer_alpha,
            mu: peer_mu,
        };
        let g_share = GShare {
            i: w_share.i,
            y: w_share.y,
            k: w_share.k,
            w: w_share.w,
            gamma: w_share.gamma,
            alpha: Secp256k1Curve::scalar_to_bytes(&alpha),
            beta: Secp256k1Curve::scalar_to_bytes(&beta),
            mu: Secp256k1Curve::scalar_to_bytes(&mu),
            nu: Secp256k1Curve::scalar_to_bytes(&nu),
        };

        log_debug!(MODULE, "MtA accept", index = w_share.i, peer = a_share.j);

        Ok(SignConvertRT {
            mu_share: Some(mu_share),
            g_share: Some(g_share),
            ..Default::default()
        })
    }

    fn convert_finalize(&self, b_share: &BShare, mu_share: &MUShare) -> HawalaResult<SignConvertRT> {
        if mu_share.i != b_share.i || mu_share.j != b_share.j {
            return Err(HawalaError::invalid_share(format!(
                "MUShare ({}, {}) is not from co-signer {} to {}",
                mu_share.i, mu_share.j, b_share.j, b_share.i
            )));
        }

        let own_key = b_share.paillier_private_key()?;
        let alpha = mta_accept(&own_key, &mu_share.alpha)?;
        let mu = mta_accept(&own_key, &mu_share.mu)?;

        let g_share = GShare {
            i: b_share.i,
            y: b_share.y,
            k: b_share.k,
            w: b_share.w,
            gamma: b_share.gamma,
            alpha: Secp256k1Curve::scalar_to_bytes(&alpha),
            beta: b_share.beta,
            mu: Secp256k1Curve::scalar_to_bytes(&mu),
            nu: b_share.nu,
        };

        log_debug!(MODULE, "MtA finalize", index = b_share.i, peer = mu_share.j);

        Ok(SignConvertRT {
            g_share: Some(g_share),
            ..Default::default()
        })
    }

    /// Fold the converted shares into the nonce and signature shares
    pub fn sign_combine(&self, g_share: &GShare, peer_index: u32) -> HawalaResult<SignCombineRT> {
        if peer_index == g_share.i || peer_index == 0 {
            return Err(HawalaError::invalid_share(format!(
                "Invalid co-signer {} for participant {}",
                peer_index, g_share.i
            )));
        }

        let k = Secp256k1Curve::scalar_from_bytes(&g_share.k)?;
        let w = Secp256k1Curve::scalar_from_bytes(&g_share.w)?;
        let gamma = Secp256k1Curve::scalar_from_bytes(&g_share.gamma)?;
        let alpha = Secp256k1Curve::scalar_from_bytes(&g_share.alpha)?;
        let beta = Secp256k1Curve::scalar_from_bytes(&g_share.beta)?;
        let mu = Secp256k1Curve::scalar_from_bytes(&g_share.mu)?;
        let nu = Secp256k1Curve::scalar_from_bytes(&g_share.nu)?;

        let delta = k * gamma + alpha + beta;
        let omicron = k * w + mu + nu;
        let big_gamma = Secp256k1Curve::point_to_bytes(&Secp256k1Curve::base_point_mult(&gamma));
        let delta = Secp256k1Curve::scalar_to_bytes(&delta);

        let o_share = OShare {
            i: g_share.i,
            y: g_share.y,
            k: g_share.k,
            omicron: Secp256k1Curve::scalar_to_bytes(&omicron),
            delta,
            big_gamma,
        };
        let d_share = DShare {
            i: peer_index,
            j: g_share.i,
            delta,
            big_gamma,
        };

        log_debug!(MODULE, "sign combine", index = g_share.i, peer = peer_index);

        Ok(SignCombineRT { o_share, d_share })
    }

    /// Produce this signer's share of `s`.
    ///
    /// `hash` defaults to the configured message hash.
    pub fn sign(
        &self,
        message: &[u8],
        o_share: &OShare,
        d_share: &DShare,
        hash: Option<MessageHash>,
    ) -> HawalaResult<SShare> {
        if d_share.i != o_share.i || d_share.j == o_share.i {
            return Err(HawalaError::invalid_share(format!(
                "DShare ({}, {}) is not from a co-signer of {}",
                d_share.i, d_share.j, o_share.i
            )));
        }

        let delta = Secp256k1Curve::scalar_from_bytes(&o_share.delta)?
            + Secp256k1Curve::scalar_from_bytes(&d_share.delta)?;
        let delta_inv = Secp256k1Curve::scalar_invert(&delta)
            .ok_or_else(|| HawalaError::signing_failed("Combined delta is zero"))?;
        let big_gamma = Secp256k1Curve::point_from_bytes(&o_share.big_gamma)?
            + Secp256k1Curve::point_from_bytes(&d_share.big_gamma)?;
        let big_r = big_gamma * delta_inv;

        let r = Secp256k1Curve::scalar_reduce_bytes(&Secp256k1Curve::point_x(&big_r));
        if r == Scalar::ZERO {
            return Err(HawalaError::signing_failed("Signature r is zero"));
        }

        let digest = hash.unwrap_or(self.settings.message_hash).digest(message);
        let m = Secp256k1Curve::scalar_reduce_bytes(&digest);
        let k = Secp256k1Curve::scalar_from_bytes(&o_share.k)?;
        let omicron = Secp256k1Curve::scalar_from_bytes(&o_share.omicron)?;
        let s = m * k + r * omicron;

        log_debug!(MODULE, "signature share generated", index = o_share.i);

        Ok(SShare {
            i: o_share.i,
            big_r: Secp256k1Curve::point_to_bytes(&big_r),
            r: Secp256k1Curve::scalar_to_bytes(&r),
            s: Secp256k1Curve::scalar_to_bytes(&s),
            y: o_share.y,
        })
    }

    /// Sum the signature shares into a low-S signature with recovery id
    pub fn construct_signature(&self, s_shares: &[SShare]) -> HawalaResult<Signature> {
        let first = s_shares
            .first()
            .ok_or_else(|| HawalaError::invalid_share("No SShares to combine"))?;

        let mut signers = BTreeSet::new();
        let mut s = Scalar::ZERO;
        for share in s_shares {
            if share.r != first.r || share.y != first.y || share.big_r != first.big_r {
                return Err(HawalaError::new(
                    ErrorCode::InconsistentShares,
                    format!("SShare from {} disagrees on r, R or y", share.i),
                ));
            }
            if !signers.insert(share.i) {
                return Err(HawalaError::invalid_share(format!(
                    "Duplicate SShare from {}",
                    share.i
                )));
            }
            s = s + Secp256k1Curve::scalar_from_bytes(&share.s)?;
        }
        if s == Scalar::ZERO {
            return Err(HawalaError::signing_failed("Signature s is zero"));
        }

        let big_r = Secp256k1Curve::point_from_bytes(&first.big_r)?;
        let x_overflow =
            BigUint::from_bytes_be(&Secp256k1Curve::point_x(&big_r)) >= Secp256k1Curve::order();
        let mut recid = Secp256k1Curve::point_y_is_odd(&big_r) as u8 | if x_overflow { 2 } else { 0 };

        if Secp256k1Curve::scalar_to_biguint(&s) > Secp256k1Curve::order() >> 1 {
            s = -s;
            recid ^= 1;
        }

        log_debug!(MODULE, "signature constructed", signers = s_shares.len());

        Ok(Signature {
            y: first.y,
            r: first.r,
            s: Secp256k1Curve::scalar_to_bytes(&s),
            recid,
        })
    }

    /// Verify against the combined public key.
    ///
    /// `hash` defaults to the configured message hash.
    pub fn verify(
        &self,
        message: &[u8],
        signature: &Signature,
        hash: Option<MessageHash>,
    ) -> HawalaResult<bool> {
        let digest = hash.unwrap_or(self.settings.message_hash).digest(message);
        Ok(Secp256k1Curve::verify_digest(
            &signature.y,
            &digest,
            &signature.r,
            &signature.s,
        )?)
    }

    fn check_modulus(&self, n: &BigUint) -> HawalaResult<()> {
        let bits = n.bits();
        if bits < self.settings.min_paillier_bits as u64 {
            return Err(HawalaError::invalid_share(format!(
                "Paillier modulus of {} bits is below the minimum of {}",
                bits, self.settings.min_paillier_bits
            )));
        }
        Ok(())
    }
}

fn check_key_share_config(index: u32, threshold: u32, num_shares: u32) -> HawalaResult<()> {
    if index == 0 || index > num_shares || threshold == 0 || threshold > num_shares {
        return Err(HawalaError::invalid_config(format!(
            "Invalid KeyShare config: index {}, threshold {}, shares {}",
            index, threshold, num_shares
        )));
    }
    Ok(())
}

/// Answer `Enc(k)` with `Enc(k·secret + β′)`, returning the ciphertext and
/// the additive share `−β′ mod q`
fn mta_respond(
    pk: &PaillierPublicKey,
    enc_k: &BigUint,
    secret: &Scalar,
) -> HawalaResult<(BigUint, Scalar)> {
    pk.check_ciphertext(enc_k)?;
    let mask = random_below(&Secp256k1Curve::order().pow(5));
    let scaled = pk.mul(enc_k, &Secp256k1Curve::scalar_to_biguint(secret));
    let response = pk.add(&scaled, &pk.encrypt(&mask)?);
    Ok((response, -Secp256k1Curve::scalar_from_biguint(&mask)))
}

/// Decrypt an MtA response into a scalar share
fn mta_accept(key: &PaillierPrivateKey, response: &BigUint) -> HawalaResult<Scalar> {
    let plain = key.decrypt(response)?;
    Ok(Secp256k1Curve::scalar_from_biguint(&plain))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::paillier_key;

    fn ecdsa() -> Ecdsa {
        Ecdsa::with_settings(TssSettings::testing())
    }

    fn keygen(mpc: &Ecdsa) -> Vec<KeyCombined> {
        let shares: Vec<KeyShare> = (1..=3u32)
            .map(|i| {
                mpc.key_share_with_paillier(i, 2, 3, &paillier_key((i - 1) as usize))
                    .unwrap()
            })
            .collect();
        (1..=3u32)
            .map(|i| {
                let received: Vec<NShare> = shares
                    .iter()
                    .filter(|s| s.p_share.i != i)
                    .map(|s| s.n_shares[&i].clone())
                    .collect();
                mpc.key_combine(&shares[(i - 1) as usize].p_share, &received)
                    .unwrap()
            })
            .collect()
    }

    fn run_signing(mpc: &Ecdsa, a: &KeyCombined, b: &KeyCombined, message: &[u8]) -> Signature {
        let (ai, bi) = (a.x_share.i, b.x_share.i);

        let a_start = mpc.sign_share(&a.x_share, &a.y_shares[&bi]).unwrap();
        let b_resp = mpc
            .sign_convert(&SignConvert::Respond {
                x_share: b.x_share.clone(),
                y_share: b.y_shares[&ai].clone(),
                k_share: a_start.k_share.clone(),
            })
            .unwrap();
        let a_conv = mpc
            .sign_convert(&SignConvert::Accept {
                w_share: a_start.w_share.clone(),
                a_share: b_resp.a_share.clone().unwrap(),
            })
            .unwrap();
        let b_conv = mpc
            .sign_convert(&SignConvert::Finalize {
                b_share: b_resp.b_share.clone().unwrap(),
                mu_share: a_conv.mu_share.clone().unwrap(),
            })
            .unwrap();

        let a_comb = mpc.sign_combine(a_conv.g_share.as_ref().unwrap(), bi).unwrap();
        let b_comb = mpc.sign_combine(b_conv.g_share.as_ref().unwrap(), ai).unwrap();

        let a_s = mpc.sign(message, &a_comb.o_share, &b_comb.d_share, None).unwrap();
        let b_s = mpc.sign(message, &b_comb.o_share, &a_comb.d_share, None).unwrap();
        mpc.construct_signature(&[a_s, b_s]).unwrap()
    }

    #[test]
    fn test_key_combine_agrees() {
        let mpc = ecdsa();
        let combined = keygen(&mpc);
        assert_eq!(combined[0].x_share.y, combined[1].x_share.y);
        assert_eq!(combined[1].x_share.y, combined[2].x_share.y);
        assert_eq!(combined[0].x_share.chaincode, combined[2].x_share.chaincode);
        assert_eq!(combined[0].y_shares.len(), 2);
    }

    #[test]
    fn test_two_party_signature() {
        let mpc = ecdsa();
        let combined = keygen(&mpc);
        let message = b"send 1 BTC";

        let signature = run_signing(&mpc, &combined[0], &combined[2], message);
        assert!(mpc.verify(message, &signature, None).unwrap());
        assert!(!mpc.verify(b"send 2 BTC", &signature, None).unwrap());

        let digest = MessageHash::Sha256.digest(message);
        let recovered =
            Secp256k1Curve::recover_public_key(&digest, &signature.r, &signature.s, signature.recid)
                .unwrap();
        assert_eq!(recovered, signature.y);
    }

    #[test]
    fn test_signature_is_low_s() {
        let mpc = ecdsa();
        let combined = keygen(&mpc);
        let half = Secp256k1Curve::order() >> 1;
        for _ in 0..3 {
            let signature = run_signing(&mpc, &combined[1], &combined[2], b"low-s");
            assert!(BigUint::from_bytes_be(&signature.s) <= half);
        }
    }

    #[test]
    fn test_key_share_config_rejected() {
        let mpc = ecdsa();
        let key = paillier_key(0);
        for (i, t, n) in [(0, 2, 3), (4, 2, 3), (1, 0, 3), (1, 4, 3)] {
            let err = mpc.key_share_with_paillier(i, t, n, &key).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidConfig);
        }
    }

    #[test]
    fn test_tampered_n_share_rejected() {
        let mpc = ecdsa();
        let a = mpc.key_share_with_paillier(1, 2, 3, &paillier_key(0)).unwrap();
        let b = mpc.key_share_with_paillier(2, 2, 3, &paillier_key(1)).unwrap();
        let mut from_b = b.n_shares[&1].clone();
        from_b.u = Secp256k1Curve::scalar_to_bytes(&Secp256k1Curve::scalar_random());
        let err = mpc.key_combine(&a.p_share, &[from_b]).unwrap_err();
        assert_eq!(err.code, ErrorCode::ShareVerificationFailed);
    }

    #[test]
    fn test_sign_share_rejects_degenerate_modulus() {
        let mpc = ecdsa();
        let combined = keygen(&mpc);
        for n in [0u32, 1] {
            let mut x_share = combined[0].x_share.clone();
            x_share.n = BigUint::from(n);
            let err = mpc.sign_share(&x_share, &combined[0].y_shares[&2]).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidShare);
        }
    }

    #[test]
    fn test_misaddressed_k_share_rejected() {
        let mpc = ecdsa();
        let combined = keygen(&mpc);
        let a_start = mpc
            .sign_share(&combined[0].x_share, &combined[0].y_shares[&2])
            .unwrap();
        // Participant 3 receives a k-share meant for 2
        let err = mpc
            .sign_convert(&SignConvert::Respond {
                x_share: combined[2].x_share.clone(),
                y_share: combined[2].y_shares[&1].clone(),
                k_share: a_start.k_share.clone(),
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidShare);
    }

    #[test]
    fn test_mismatched_s_shares_rejected() {
        let mpc = ecdsa();
        let share = SShare {
            i: 1,
            big_r: Secp256k1Curve::point_to_bytes(&Secp256k1Curve::base_point_mult(
                &Secp256k1Curve::scalar_random(),
            )),
            r: [1u8; 32],
            s: [2u8; 32],
            y: [3u8; 33],
        };
        let mut other = share.clone();
        other.i = 2;
        other.r = [4u8; 32];
        assert_eq!(
            mpc.construct_signature(&[share, other]).unwrap_err().code,
            ErrorCode::InconsistentShares
        );
    }

    #[test]
    fn test_mta_conversion_is_additive() {
        let key = paillier_key(0);
        let pk = key.public_key();
        let k = Secp256k1Curve::scalar_random();
        let secret = Secp256k1Curve::scalar_random();
        let enc_k = pk.encrypt(&Secp256k1Curve::scalar_to_biguint(&k)).unwrap();

        let (response, beta) = mta_respond(pk, &enc_k, &secret).unwrap();
        let alpha = mta_accept(key.private_key(), &response).unwrap();
        assert_eq!(alpha + beta, k * secret);
    }
}
