//! Unified error types for Hawala TSS
//!
//! All errors flow through this module for consistent handling
//! and FFI-safe error reporting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for all threshold-signature operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HawalaError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl HawalaError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfig, msg)
    }

    pub fn invalid_share(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidShare, msg)
    }

    pub fn share_verification_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ShareVerificationFailed, msg)
    }

    pub fn commitment_mismatch(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::CommitmentMismatch, msg)
    }

    pub fn crypto_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::CryptoError, msg)
    }

    pub fn signing_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SigningFailed, msg)
    }

    pub fn verification_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::VerificationFailed, msg)
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }
}

impl fmt::Display for HawalaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for HawalaError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Input errors
    InvalidInput,
    InvalidConfig,
    InvalidShare,
    InvalidPrivateKey,
    InvalidPublicKey,

    // Protocol errors
    ShareVerificationFailed,
    CommitmentMismatch,
    InconsistentShares,

    // Crypto errors
    CryptoError,
    SigningFailed,
    VerificationFailed,

    // Parse errors
    ParseError,
    JsonError,
    HexError,

    // Internal
    Internal,
}

/// Result type alias for Hawala operations
pub type HawalaResult<T> = Result<T, HawalaError>;

// Conversions from common error types

impl From<serde_json::Error> for HawalaError {
    fn from(e: serde_json::Error) -> Self {
        HawalaError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<hex::FromHexError> for HawalaError {
    fn from(e: hex::FromHexError) -> Self {
        HawalaError::new(ErrorCode::HexError, e.to_string())
    }
}

impl From<secp256k1::Error> for HawalaError {
    fn from(e: secp256k1::Error) -> Self {
        HawalaError::new(ErrorCode::CryptoError, format!("Secp256k1 error: {}", e))
    }
}

impl From<ed25519_dalek::SignatureError> for HawalaError {
    fn from(e: ed25519_dalek::SignatureError) -> Self {
        HawalaError::new(ErrorCode::CryptoError, format!("Ed25519 error: {}", e))
    }
}
