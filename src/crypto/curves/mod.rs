//! Threshold Curve Support
//!
//! This module provides a unified abstraction over the two curves the
//! threshold protocols run on:
//!
//! - `secp256k1`: threshold ECDSA (Bitcoin, Ethereum, Tron, ...)
//! - `ed25519`: threshold EdDSA (Solana, Stellar, Tezos, ...)
//!
//! # Architecture
//!
//! Both curves implement the `ThresholdCurve` trait which provides:
//! - Scalar field arithmetic (through operator impls on `Scalar`)
//! - Group arithmetic (through operator impls on `Point`)
//! - Random scalar sampling
//! - Canonical byte encodings for shares on the wire
//!
//! Curve arithmetic itself comes from `k256` and `curve25519-dalek`;
//! final signatures are checked with `secp256k1` and `ed25519-dalek`.

pub mod ed25519;
pub mod secp256k1;
pub mod traits;

pub use ed25519::Ed25519Curve;
pub use secp256k1::Secp256k1Curve;
pub use traits::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{ErrorCode, HawalaError};

// MARK: - Curve Type Enum

/// Supported threshold curves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveType {
    /// secp256k1 - threshold ECDSA
    Secp256k1,
    /// Ed25519 - threshold EdDSA
    Ed25519,
}

impl CurveType {
    /// Get the curve name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Self::Secp256k1 => "secp256k1",
            Self::Ed25519 => "ed25519",
        }
    }

    /// Encoded scalar size in bytes
    pub fn scalar_size(&self) -> usize {
        32
    }

    /// Encoded public key size in bytes (compressed for secp256k1)
    pub fn public_key_size(&self) -> usize {
        match self {
            Self::Secp256k1 => 33,
            Self::Ed25519 => 32,
        }
    }

    /// Get the signature size in bytes
    pub fn signature_size(&self) -> usize {
        64
    }

    /// Chains whose wallets sign with this curve
    pub fn chains(&self) -> &'static [&'static str] {
        match self {
            Self::Secp256k1 => &["bitcoin", "ethereum", "bnb", "polygon", "tron", "stacks"],
            Self::Ed25519 => &["solana", "stellar", "tezos", "near", "algorand", "sui"],
        }
    }
}

impl std::fmt::Display for CurveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for CurveType {
    type Err = CurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "secp256k1" | "ecdsa" => Ok(Self::Secp256k1),
            "ed25519" | "eddsa" => Ok(Self::Ed25519),
            other => Err(CurveError::UnsupportedCurve(other.to_string())),
        }
    }
}

// MARK: - Curve Errors

/// Errors that can occur during curve operations
#[derive(Debug, Clone, Error)]
pub enum CurveError {
    #[error("Invalid scalar: {0}")]
    InvalidScalar(String),
    #[error("Invalid point: {0}")]
    InvalidPoint(String),
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
    #[error("Unsupported curve: {0}")]
    UnsupportedCurve(String),
}

impl From<CurveError> for HawalaError {
    fn from(e: CurveError) -> Self {
        let code = match e {
            CurveError::InvalidScalar(_) => ErrorCode::InvalidPrivateKey,
            CurveError::InvalidPoint(_) => ErrorCode::InvalidPublicKey,
            CurveError::InvalidSignature(_) => ErrorCode::VerificationFailed,
            CurveError::UnsupportedCurve(_) => ErrorCode::InvalidInput,
        };
        HawalaError::new(code, e.to_string())
    }
}

// MARK: - Tests
