//! Hawala TSS Library
//!
//! Threshold-signature core for the Hawala multi-chain wallet: one wallet
//! key is spread across three parties (user, backup, bitgo) so that any
//! two of them can sign and no single party ever holds the private key.
//!
//! # Architecture
//!
//! This crate provides:
//! - **crypto**: curve abstractions, Shamir/Feldman sharing, Paillier, range proofs
//! - **tss**: the EdDSA and ECDSA share pipelines
//! - **wallet**: 2-of-3 key orchestration, recovery signing, keystore
//! - **utils**: redacting logger and protocol configuration
//! - **ffi**: C-ABI exports for host applications
//!
//! # Share pipeline
//!
//! Every operation runs on one participant and returns the shares to keep
//! or to send on:
//! `key_share → key_combine → sign_share (→ sign_convert) → sign/sign_combine`.
//!
//! # FFI Usage
//!
//! All public FFI functions are in the `ffi` module and follow this pattern:
//! - Input: JSON string (null-terminated C string)
//! - Output: JSON string (must be freed with `hawala_tss_free_string`)
//!
//! # Security
//!
//! Private shares zeroize their secret bytes when dropped, and nonce
//! commitments are compared in constant time.
//!
//! # Example
//!
//! ```rust,ignore
//! use hawala_tss::tss::eddsa::Eddsa;
//!
//! let mpc = Eddsa::new();
//! let user = mpc.key_share(1, 2, 3, None)?;
//! ```

pub mod crypto;
pub mod error;
pub mod ffi;
pub mod serde_bytes;
pub mod tss;
pub mod types;
pub mod utils;
pub mod wallet;

#[cfg(test)]
mod test_fixtures;

pub use error::{ErrorCode, HawalaError, HawalaResult};
pub use types::*;

pub use tss::ecdsa::Ecdsa;
pub use tss::eddsa::Eddsa;
pub use utils::tss_config::{global_config, TssLevel, TssSettings};
pub use wallet::CommonKeychain;
