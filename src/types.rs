//! Shared types for Hawala TSS
//!
//! Data structures that cross module boundaries are defined here
//! for consistent serialization and FFI compatibility.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tiny_keccak::{Hasher, Keccak};

// =============================================================================
// Participants
// =============================================================================

/// Fixed participant positions of a 2-of-3 wallet key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareKeyPosition {
    User,
    Backup,
    Bitgo,
}

impl ShareKeyPosition {
    pub const THRESHOLD: u32 = 2;
    pub const NUM_SHARES: u32 = 3;

    /// Shamir evaluation index of this position
    pub fn index(&self) -> u32 {
        match self {
            Self::User => 1,
            Self::Backup => 2,
            Self::Bitgo => 3,
        }
    }

    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            1 => Some(Self::User),
            2 => Some(Self::Backup),
            3 => Some(Self::Bitgo),
            _ => None,
        }
    }
}

impl std::fmt::Display for ShareKeyPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::User => "user",
            Self::Backup => "backup",
            Self::Bitgo => "bitgo",
        };
        write!(f, "{}", name)
    }
}

// =============================================================================
// Message Hashing
// =============================================================================

/// Digest applied to a message before ECDSA signing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageHash {
    /// SHA-256 (Bitcoin-style chains)
    #[default]
    Sha256,
    /// Keccak-256 (EVM chains)
    Keccak256,
}

impl MessageHash {
    pub fn digest(&self, message: &[u8]) -> [u8; 32] {
        match self {
            Self::Sha256 => Sha256::digest(message).into(),
            Self::Keccak256 => {
                let mut hasher = Keccak::v256();
                let mut out = [0u8; 32];
                hasher.update(message);
                hasher.finalize(&mut out);
                out
            }
        }
    }
}

// =============================================================================
// API Response
// =============================================================================

/// Envelope returned across the FFI boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<crate::error::HawalaError>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: crate::error::HawalaError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"success":false,"error":{"code":"internal","message":"Serialization failed"}}"#.to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_positions() {
        assert_eq!(ShareKeyPosition::User.index(), 1);
        assert_eq!(ShareKeyPosition::Bitgo.index(), 3);
        assert_eq!(ShareKeyPosition::from_index(2), Some(ShareKeyPosition::Backup));
        assert_eq!(ShareKeyPosition::from_index(4), None);
    }

    #[test]
    fn test_message_hashes() {
        // Well-known digests of the empty string
        assert_eq!(
            hex::encode(MessageHash::Sha256.digest(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            hex::encode(MessageHash::Keccak256.digest(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_api_response_serialization() {
        let response = ApiResponse::ok("test_data".to_string());
        let json = response.to_json();
        assert!(json.contains("success"));
        assert!(json.contains("test_data"));
    }
}
