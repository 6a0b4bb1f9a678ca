//! Threshold signing protocols
//!
//! - `eddsa`: t-of-n Ed25519 with Feldman-verified key shares
//! - `ecdsa`: two-signer secp256k1 over Paillier MtA

pub mod ecdsa;
pub mod eddsa;
