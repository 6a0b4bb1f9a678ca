//! Cryptographic primitives for the threshold protocols
//!
//! - Curve abstractions (secp256k1, ed25519)
//! - Shamir sharing with Feldman commitments
//! - Paillier encryption for the ECDSA MtA conversion
//! - Paillier range proofs

pub mod curves;
pub mod paillier;
pub mod rangeproof;
pub mod shamir;

pub use curves::{CurveError, CurveType, Ed25519Curve, Secp256k1Curve, ThresholdCurve};
pub use paillier::{PaillierError, PaillierKeyPair, PaillierPrivateKey, PaillierPublicKey};
pub use shamir::{Shamir, SplitShares};
