//! 2-of-3 wallet key orchestration
//!
//! Wraps the threshold protocols for the fixed user / backup / bitgo
//! participant layout:
//! - `eddsa`: combined keys, user-side signing, offline recovery signing
//! - `ecdsa`: combined keys and local two-party signing
//! - `keystore`: passphrase encryption of signing material

pub mod ecdsa;
pub mod eddsa;
pub mod keystore;

pub use keystore::{decrypt_signing_material, encrypt_signing_material, EncryptedSigningMaterial};

use std::fmt;

use crate::crypto::curves::CurveType;
use crate::error::{HawalaError, HawalaResult};
use crate::types::ShareKeyPosition;

/// Combined public key followed by the combined chaincode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonKeychain {
    pub curve: CurveType,
    pub public_key: Vec<u8>,
    pub chaincode: [u8; 32],
}

impl CommonKeychain {
    pub fn new(curve: CurveType, public_key: &[u8], chaincode: [u8; 32]) -> HawalaResult<Self> {
        if public_key.len() != curve.public_key_size() {
            return Err(HawalaError::invalid_input(format!(
                "{} public key must be {} bytes, got {}",
                curve,
                curve.public_key_size(),
                public_key.len()
            )));
        }
        Ok(Self {
            curve,
            public_key: public_key.to_vec(),
            chaincode,
        })
    }

    /// Parse the hex form used to exchange keychains between parties
    pub fn from_hex(curve: CurveType, value: &str) -> HawalaResult<Self> {
        let bytes = hex::decode(value.trim())?;
        let key_len = curve.public_key_size();
        if bytes.len() != key_len + 32 {
            return Err(HawalaError::invalid_input(format!(
                "Common keychain for {} must be {} bytes, got {}",
                curve,
                key_len + 32,
                bytes.len()
            )));
        }
        let mut chaincode = [0u8; 32];
        chaincode.copy_from_slice(&bytes[key_len..]);
        Self::new(curve, &bytes[..key_len], chaincode)
    }

    pub fn to_hex(&self) -> String {
        let mut bytes = self.public_key.clone();
        bytes.extend_from_slice(&self.chaincode);
        hex::encode(bytes)
    }
}

impl fmt::Display for CommonKeychain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Reject shares held by a position other than `expected`
pub(crate) fn expect_position(
    index: u32,
    expected: ShareKeyPosition,
    what: &str,
) -> HawalaResult<()> {
    if index == expected.index() {
        Ok(())
    } else {
        Err(HawalaError::invalid_share(format!(
            "Invalid {}, it doesn't belong to the {}",
            what, expected
        )))
    }
}

/// Shares a position received from the other two positions of the wallet
#[derive(Debug, Clone)]
pub(crate) struct ReceivedShares<S> {
    pub user: Option<S>,
    pub backup: Option<S>,
    pub bitgo: Option<S>,
}

impl<S> ReceivedShares<S> {
    fn slot(&mut self, position: ShareKeyPosition) -> &mut Option<S> {
        match position {
            ShareKeyPosition::User => &mut self.user,
            ShareKeyPosition::Backup => &mut self.backup,
            ShareKeyPosition::Bitgo => &mut self.bitgo,
        }
    }
}

/// Sort `shares` by sending position. `own` must receive exactly one share
/// from each of the other two positions.
pub(crate) fn sort_received<S: Clone>(
    own: u32,
    shares: &[S],
    sender: impl Fn(&S) -> u32,
    what: &str,
) -> HawalaResult<ReceivedShares<S>> {
    let own = ShareKeyPosition::from_index(own)
        .ok_or_else(|| HawalaError::invalid_share(format!("Unknown wallet position {}", own)))?;

    let mut received = ReceivedShares {
        user: None,
        backup: None,
        bitgo: None,
    };
    for share in shares {
        let from = sender(share);
        let position = ShareKeyPosition::from_index(from).ok_or_else(|| {
            HawalaError::invalid_share(format!("{} from unknown position {}", what, from))
        })?;
        if position == own {
            return Err(HawalaError::invalid_share(format!(
                "{} from the {} itself",
                what, own
            )));
        }
        if received.slot(position).replace(share.clone()).is_some() {
            return Err(HawalaError::invalid_share(format!(
                "Duplicate {} from the {}",
                what, position
            )));
        }
    }

    for position in [ShareKeyPosition::User, ShareKeyPosition::Backup, ShareKeyPosition::Bitgo] {
        if position != own && received.slot(position).is_none() {
            return Err(HawalaError::invalid_share(format!(
                "Missing {} {}",
                position, what
            )));
        }
    }
    Ok(received)
}

pub(crate) fn check_keychain(actual: &CommonKeychain, expected: &CommonKeychain) -> HawalaResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(HawalaError::invalid_share(
            "Failed to create keychain - commonKeychains do not match",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_keychain_hex() {
        let keychain = CommonKeychain::new(CurveType::Ed25519, &[7u8; 32], [9u8; 32]).unwrap();
        let hex = keychain.to_hex();
        assert_eq!(hex.len(), 128);
        assert!(hex.starts_with("0707"));
        assert_eq!(CommonKeychain::from_hex(CurveType::Ed25519, &hex).unwrap(), keychain);
        assert_eq!(keychain.to_string(), hex);
    }

    #[test]
    fn test_common_keychain_length_checked() {
        let ed = CommonKeychain::new(CurveType::Ed25519, &[7u8; 32], [9u8; 32]).unwrap();
        assert!(CommonKeychain::from_hex(CurveType::Secp256k1, &ed.to_hex()).is_err());
        assert!(CommonKeychain::new(CurveType::Secp256k1, &[2u8; 32], [0u8; 32]).is_err());
        assert!(CommonKeychain::from_hex(CurveType::Ed25519, "zz").is_err());
    }

    #[test]
    fn test_expect_position() {
        assert!(expect_position(1, ShareKeyPosition::User, "PShare").is_ok());
        let err = expect_position(2, ShareKeyPosition::User, "PShare").unwrap_err();
        assert!(err.message.contains("user"));
    }

    #[test]
    fn test_sort_received_for_every_position() {
        for own in 1..=3u32 {
            let senders: Vec<u32> = (1..=3).filter(|j| *j != own).collect();
            let received = sort_received(own, &senders, |j| *j, "share").unwrap();
            let present = [received.user, received.backup, received.bitgo];
            for (slot, position) in present.iter().zip(1u32..) {
                assert_eq!(slot.is_some(), position != own);
            }
        }
    }

    #[test]
    fn test_sort_received_rejects_incomplete_sets() {
        let err = sort_received(1, &[2u32], |j| *j, "N Share").unwrap_err();
        assert_eq!(err.message, "Missing bitgo N Share");
        let err = sort_received(3, &[1u32], |j| *j, "N Share").unwrap_err();
        assert_eq!(err.message, "Missing backup N Share");

        assert!(sort_received(1, &[1u32, 2, 3], |j| *j, "share").is_err());
        assert!(sort_received(1, &[2u32, 2, 3], |j| *j, "share").is_err());
        assert!(sort_received(1, &[2u32, 4], |j| *j, "share").is_err());
        assert!(sort_received(4, &[1u32, 2], |j| *j, "share").is_err());
    }
}
