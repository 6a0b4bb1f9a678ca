//! EdDSA share types
//!
//! Scalars and points are 32-byte little-endian hex; chaincodes are
//! 32-byte big-endian hex. Shares marked private never leave their owner.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::serde_bytes::{hex32, hex32_option, Bytes32};

/// Private key-generation output of a participant
#[derive(Debug, Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct UShare {
    pub i: u32,
    pub t: u32,
    pub n: u32,
    #[serde(with = "hex32")]
    pub y: [u8; 32],
    #[serde(with = "hex32")]
    pub seed: [u8; 32],
    #[serde(with = "hex32")]
    pub chaincode: [u8; 32],
}

/// Key-generation share sent from participant `j` to participant `i`
#[derive(Debug, Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct YShare {
    pub i: u32,
    pub j: u32,
    #[serde(with = "hex32")]
    pub y: [u8; 32],
    /// Feldman commitments of the sender's polynomial
    #[zeroize(skip)]
    pub v: Vec<Bytes32>,
    #[serde(with = "hex32")]
    pub u: [u8; 32],
    #[serde(with = "hex32")]
    pub chaincode: [u8; 32],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyShare {
    pub u_share: UShare,
    pub y_shares: BTreeMap<u32, YShare>,
}

/// Private combined key material of a participant
#[derive(Debug, Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct PShare {
    pub i: u32,
    pub t: u32,
    pub n: u32,
    /// Combined public key
    #[serde(with = "hex32")]
    pub y: [u8; 32],
    /// Own secret contribution
    #[serde(with = "hex32")]
    pub u: [u8; 32],
    #[serde(with = "hex32")]
    pub prefix: [u8; 32],
    /// Combined chaincode
    #[serde(with = "hex32")]
    pub chaincode: [u8; 32],
}

/// Marks participant `i` as a co-signer of participant `j`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JShare {
    pub i: u32,
    pub j: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyCombine {
    pub p_share: PShare,
    pub j_shares: BTreeMap<u32, JShare>,
}

/// Private signing state of a signer
#[derive(Debug, Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct XShare {
    pub i: u32,
    #[serde(with = "hex32")]
    pub y: [u8; 32],
    #[serde(with = "hex32")]
    pub u: [u8; 32],
    #[serde(with = "hex32")]
    pub r: [u8; 32],
    #[serde(rename = "R", with = "hex32")]
    pub big_r: [u8; 32],
}

/// Signing share sent from signer `j` to signer `i`
#[derive(Debug, Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct RShare {
    pub i: u32,
    pub j: u32,
    #[serde(with = "hex32")]
    pub u: [u8; 32],
    #[serde(with = "hex32")]
    pub r: [u8; 32],
    #[serde(rename = "R", with = "hex32")]
    pub big_r: [u8; 32],
    /// `r·G`, checked by the recipient
    #[serde(default, with = "hex32_option", skip_serializing_if = "Option::is_none")]
    pub commitment: Option<[u8; 32]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignShare {
    pub x_share: XShare,
    pub r_shares: BTreeMap<u32, RShare>,
}

/// Partial signature of a signer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GShare {
    pub i: u32,
    #[serde(with = "hex32")]
    pub y: [u8; 32],
    #[serde(with = "hex32")]
    pub gamma: [u8; 32],
    #[serde(rename = "R", with = "hex32")]
    pub big_r: [u8; 32],
}

/// Combined Ed25519 signature with its public key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    #[serde(with = "hex32")]
    pub y: [u8; 32],
    #[serde(rename = "R", with = "hex32")]
    pub big_r: [u8; 32],
    #[serde(with = "hex32")]
    pub sigma: [u8; 32],
}

impl Signature {
    /// Standard 64-byte `R || S` encoding
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.big_r);
        out[32..].copy_from_slice(&self.sigma);
        out
    }
}
