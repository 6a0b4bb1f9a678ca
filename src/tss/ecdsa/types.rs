//! ECDSA share types
//!
//! Scalars are 32-byte big-endian hex, points 33-byte compressed hex and
//! Paillier values big-endian hex integers.

use std::collections::BTreeMap;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::paillier::{wipe, PaillierPrivateKey, PaillierPublicKey};
use crate::error::HawalaResult;
use crate::serde_bytes::{biguint_hex, hex32, hex33, Bytes33};

/// Private key-generation output of a participant
#[derive(Debug, Clone, Serialize, Deserialize, Zeroize)]
#[serde(rename_all = "camelCase")]
pub struct PShare {
    pub i: u32,
    /// Paillier λ
    #[zeroize(skip)]
    #[serde(with = "biguint_hex")]
    pub l: BigUint,
    /// Paillier μ
    #[zeroize(skip)]
    #[serde(with = "biguint_hex")]
    pub m: BigUint,
    #[zeroize(skip)]
    #[serde(with = "biguint_hex")]
    pub n: BigUint,
    #[serde(with = "hex33")]
    pub y: [u8; 33],
    #[serde(with = "hex32")]
    pub u: [u8; 32],
    #[serde(with = "hex32")]
    pub chaincode: [u8; 32],
}

/// Drop glue for shares that carry Paillier λ and μ. The derive skips
/// them since `BigUint` has no `Zeroize` impl.
macro_rules! zeroize_paillier_on_drop {
    ($($share:ty),+) => {$(
        impl $share {
            fn wipe_secrets(&mut self) {
                self.zeroize();
                wipe(&mut self.l);
                wipe(&mut self.m);
            }
        }

        impl Drop for $share {
            fn drop(&mut self) {
                self.wipe_secrets();
            }
        }

        impl ZeroizeOnDrop for $share {}
    )+};
}

zeroize_paillier_on_drop!(PShare, XShare, WShare, BShare);

/// Key-generation share sent from participant `j` to participant `i`
#[derive(Debug, Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct NShare {
    pub i: u32,
    pub j: u32,
    #[zeroize(skip)]
    #[serde(with = "biguint_hex")]
    pub n: BigUint,
    #[serde(with = "hex33")]
    pub y: [u8; 33],
    /// Feldman commitments of the sender's polynomial
    #[zeroize(skip)]
    pub v: Vec<Bytes33>,
    #[serde(with = "hex32")]
    pub u: [u8; 32],
    #[serde(with = "hex32")]
    pub chaincode: [u8; 32],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyShare {
    pub p_share: PShare,
    pub n_shares: BTreeMap<u32, NShare>,
}

/// Private combined key material
#[derive(Debug, Clone, Serialize, Deserialize, Zeroize)]
#[serde(rename_all = "camelCase")]
pub struct XShare {
    pub i: u32,
    #[zeroize(skip)]
    #[serde(with = "biguint_hex")]
    pub l: BigUint,
    #[zeroize(skip)]
    #[serde(with = "biguint_hex")]
    pub m: BigUint,
    #[zeroize(skip)]
    #[serde(with = "biguint_hex")]
    pub n: BigUint,
    /// Combined public key
    #[serde(with = "hex33")]
    pub y: [u8; 33],
    /// Share of the combined private key
    #[serde(with = "hex32")]
    pub x: [u8; 32],
    #[serde(with = "hex32")]
    pub chaincode: [u8; 32],
}

/// Public record of participant `j` kept by participant `i`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YShare {
    pub i: u32,
    pub j: u32,
    #[serde(with = "biguint_hex")]
    pub n: BigUint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyCombined {
    pub x_share: XShare,
    pub y_shares: BTreeMap<u32, YShare>,
}

/// Private signing state of a signer before conversion
#[derive(Debug, Clone, Serialize, Deserialize, Zeroize)]
#[serde(rename_all = "camelCase")]
pub struct WShare {
    pub i: u32,
    /// Co-signer
    pub j: u32,
    #[zeroize(skip)]
    #[serde(with = "biguint_hex")]
    pub l: BigUint,
    #[zeroize(skip)]
    #[serde(with = "biguint_hex")]
    pub m: BigUint,
    #[zeroize(skip)]
    #[serde(with = "biguint_hex")]
    pub n: BigUint,
    #[serde(with = "hex33")]
    pub y: [u8; 33],
    #[serde(with = "hex32")]
    pub k: [u8; 32],
    #[serde(with = "hex32")]
    pub w: [u8; 32],
    #[serde(with = "hex32")]
    pub gamma: [u8; 32],
    /// Own `Enc(k)`
    #[zeroize(skip)]
    #[serde(rename = "ck", with = "biguint_hex")]
    pub enc_k: BigUint,
}

impl WShare {
    pub(crate) fn paillier_private_key(&self) -> HawalaResult<PaillierPrivateKey> {
        Ok(PaillierPrivateKey::new(self.l.clone(), self.m.clone(), self.n.clone())?)
    }
}

/// `Enc(k)` sent from signer `j` to signer `i`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KShare {
    pub i: u32,
    pub j: u32,
    #[serde(with = "biguint_hex")]
    pub n: BigUint,
    #[serde(with = "biguint_hex")]
    pub k: BigUint,
}

impl KShare {
    pub(crate) fn public_key(&self) -> PaillierPublicKey {
        PaillierPublicKey::new(self.n.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignShareRT {
    pub w_share: WShare,
    pub k_share: KShare,
}

/// MtA response sent from signer `j` to signer `i`, with `j`'s own `Enc(k)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AShare {
    pub i: u32,
    pub j: u32,
    /// `j`'s Paillier modulus
    #[serde(with = "biguint_hex")]
    pub n: BigUint,
    /// `j`'s `Enc(k)`
    #[serde(with = "biguint_hex")]
    pub k: BigUint,
    /// `Enc_i(k_i·gamma_j + β′)`
    #[serde(with = "biguint_hex")]
    pub alpha: BigUint,
    /// `Enc_i(k_i·w_j + ν′)`
    #[serde(with = "biguint_hex")]
    pub mu: BigUint,
}

/// Private state of the responding signer between the MtA rounds
#[derive(Debug, Clone, Serialize, Deserialize, Zeroize)]
#[serde(rename_all = "camelCase")]
pub struct BShare {
    pub i: u32,
    pub j: u32,
    #[zeroize(skip)]
    #[serde(with = "biguint_hex")]
    pub l: BigUint,
    #[zeroize(skip)]
    #[serde(with = "biguint_hex")]
    pub m: BigUint,
    #[zeroize(skip)]
    #[serde(with = "biguint_hex")]
    pub n: BigUint,
    #[serde(with = "hex33")]
    pub y: [u8; 33],
    #[serde(with = "hex32")]
    pub k: [u8; 32],
    #[serde(with = "hex32")]
    pub w: [u8; 32],
    #[serde(with = "hex32")]
    pub gamma: [u8; 32],
    #[serde(with = "hex32")]
    pub beta: [u8; 32],
    #[serde(with = "hex32")]
    pub nu: [u8; 32],
}

impl BShare {
    pub(crate) fn paillier_private_key(&self) -> HawalaResult<PaillierPrivateKey> {
        Ok(PaillierPrivateKey::new(self.l.clone(), self.m.clone(), self.n.clone())?)
    }
}

/// Final MtA response sent from signer `j` to signer `i`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MUShare {
    pub i: u32,
    pub j: u32,
    #[serde(with = "biguint_hex")]
    pub alpha: BigUint,
    #[serde(with = "biguint_hex")]
    pub mu: BigUint,
}

/// Additive shares of `k·gamma` and `k·x` held by one signer
#[derive(Debug, Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct GShare {
    pub i: u32,
    #[serde(with = "hex33")]
    pub y: [u8; 33],
    #[serde(with = "hex32")]
    pub k: [u8; 32],
    #[serde(with = "hex32")]
    pub w: [u8; 32],
    #[serde(with = "hex32")]
    pub gamma: [u8; 32],
    #[serde(with = "hex32")]
    pub alpha: [u8; 32],
    #[serde(with = "hex32")]
    pub beta: [u8; 32],
    #[serde(with = "hex32")]
    pub mu: [u8; 32],
    #[serde(with = "hex32")]
    pub nu: [u8; 32],
}

/// Input of one MtA step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum SignConvert {
    /// Answer a co-signer's `Enc(k)` and start own signing state
    #[serde(rename_all = "camelCase")]
    Respond {
        x_share: XShare,
        y_share: YShare,
        k_share: KShare,
    },
    /// Consume the co-signer's answer and answer its `Enc(k)` in turn
    #[serde(rename_all = "camelCase")]
    Accept { w_share: WShare, a_share: AShare },
    /// Consume the final answer
    #[serde(rename_all = "camelCase")]
    Finalize { b_share: BShare, mu_share: MUShare },
}

/// Output of one MtA step; fields not produced by the step are `None`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignConvertRT {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub a_share: Option<AShare>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b_share: Option<BShare>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mu_share: Option<MUShare>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub g_share: Option<GShare>,
}

/// Private share of the signature
#[derive(Debug, Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct OShare {
    pub i: u32,
    #[serde(with = "hex33")]
    pub y: [u8; 33],
    #[serde(with = "hex32")]
    pub k: [u8; 32],
    #[serde(with = "hex32")]
    pub omicron: [u8; 32],
    #[serde(with = "hex32")]
    pub delta: [u8; 32],
    #[serde(rename = "Gamma", with = "hex33")]
    pub big_gamma: [u8; 33],
}

/// Public nonce material sent from signer `j` to signer `i`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DShare {
    pub i: u32,
    pub j: u32,
    #[serde(with = "hex32")]
    pub delta: [u8; 32],
    #[serde(rename = "Gamma", with = "hex33")]
    pub big_gamma: [u8; 33],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignCombineRT {
    pub o_share: OShare,
    pub d_share: DShare,
}

/// Partial signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SShare {
    pub i: u32,
    #[serde(rename = "R", with = "hex33")]
    pub big_r: [u8; 33],
    #[serde(with = "hex32")]
    pub r: [u8; 32],
    #[serde(with = "hex32")]
    pub s: [u8; 32],
    #[serde(with = "hex33")]
    pub y: [u8; 33],
}

/// Combined, low-S normalized ECDSA signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(with = "hex33")]
    pub y: [u8; 33],
    #[serde(with = "hex32")]
    pub r: [u8; 32],
    #[serde(with = "hex32")]
    pub s: [u8; 32],
    pub recid: u8,
}

impl Signature {
    /// 64-byte `r || s`
    pub fn to_compact(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r);
        out[32..].copy_from_slice(&self.s);
        out
    }

    /// 65-byte `r || s || v` with `v = 27 + recid`
    pub fn to_rsv(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&self.to_compact());
        out[64] = 27 + self.recid;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    #[test]
    fn test_paillier_secrets_wiped() {
        let mut share = PShare {
            i: 1,
            l: BigUint::from(u128::MAX) << 200u32,
            m: BigUint::from(0xdead_beef_u64),
            n: BigUint::from(77u32),
            y: [2u8; 33],
            u: [5u8; 32],
            chaincode: [6u8; 32],
        };
        share.wipe_secrets();
        assert!(share.l.is_zero());
        assert!(share.m.is_zero());
        assert_eq!(share.u, [0u8; 32]);
        // The modulus is public
        assert_eq!(share.n, BigUint::from(77u32));
    }
}
