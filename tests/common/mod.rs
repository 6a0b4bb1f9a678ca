//! Shared helpers for the integration tests

#![allow(dead_code)]

use hawala_tss::crypto::paillier::PaillierKeyPair;
use hawala_tss::tss::{ecdsa, eddsa};
use hawala_tss::TssSettings;
use num_bigint::BigUint;

const PRIMES: &str = include_str!("../fixtures/paillier_primes.txt");

/// 2048-bit Paillier key pair number `slot` (0 to 3) built from fixed primes
pub fn paillier_key(slot: usize) -> PaillierKeyPair {
    let primes: Vec<BigUint> = PRIMES
        .split_whitespace()
        .map(|hex| BigUint::parse_bytes(hex.as_bytes(), 16).unwrap())
        .collect();
    PaillierKeyPair::from_primes(&primes[2 * slot], &primes[2 * slot + 1]).unwrap()
}

pub fn eddsa() -> eddsa::Eddsa {
    eddsa::Eddsa::with_settings(TssSettings::testing())
}

pub fn ecdsa() -> ecdsa::Ecdsa {
    ecdsa::Ecdsa::with_settings(TssSettings::testing())
}

/// Run EdDSA key generation for `n` participants and combine every key
pub fn eddsa_keygen(
    mpc: &eddsa::Eddsa,
    t: u32,
    n: u32,
) -> (Vec<eddsa::KeyShare>, Vec<eddsa::KeyCombine>) {
    let shares: Vec<eddsa::KeyShare> = (1..=n)
        .map(|i| mpc.key_share(i, t, n, None).unwrap())
        .collect();
    let combined = (1..=n)
        .map(|i| {
            mpc.key_combine(&shares[(i - 1) as usize].u_share, &eddsa_received(&shares, i))
                .unwrap()
        })
        .collect();
    (shares, combined)
}

/// Y-shares addressed to participant `index`
pub fn eddsa_received(shares: &[eddsa::KeyShare], index: u32) -> Vec<eddsa::YShare> {
    shares
        .iter()
        .filter(|s| s.u_share.i != index)
        .map(|s| s.y_shares[&index].clone())
        .collect()
}

/// Sign with the participants in `signers`; everyone else contributes
/// their key-generation y-share
pub fn eddsa_sign(
    mpc: &eddsa::Eddsa,
    shares: &[eddsa::KeyShare],
    combined: &[eddsa::KeyCombine],
    signers: &[u32],
    message: &[u8],
) -> eddsa::Signature {
    let sign_shares: Vec<(u32, eddsa::SignShare)> = signers
        .iter()
        .map(|&i| {
            let key = &combined[(i - 1) as usize];
            let j_shares: Vec<eddsa::JShare> = signers
                .iter()
                .filter(|&&j| j != i)
                .map(|&j| key.j_shares[&j])
                .collect();
            (i, mpc.sign_share(message, &key.p_share, &j_shares, None).unwrap())
        })
        .collect();

    let g_shares: Vec<eddsa::GShare> = sign_shares
        .iter()
        .map(|(i, own)| {
            let r_shares: Vec<eddsa::RShare> = sign_shares
                .iter()
                .filter(|(j, _)| j != i)
                .map(|(_, other)| other.r_shares[i].clone())
                .collect();
            let y_shares: Vec<eddsa::YShare> = shares
                .iter()
                .filter(|s| !signers.contains(&s.u_share.i))
                .map(|s| s.y_shares[i].clone())
                .collect();
            mpc.sign(message, &own.x_share, &r_shares, &y_shares).unwrap()
        })
        .collect();

    mpc.sign_combine(&g_shares).unwrap()
}

/// Run ECDSA 2-of-3 key generation with fixture Paillier keys
pub fn ecdsa_keygen(mpc: &ecdsa::Ecdsa) -> (Vec<ecdsa::KeyShare>, Vec<ecdsa::KeyCombined>) {
    let shares: Vec<ecdsa::KeyShare> = (1..=3u32)
        .map(|i| {
            mpc.key_share_with_paillier(i, 2, 3, &paillier_key((i - 1) as usize))
                .unwrap()
        })
        .collect();
    let combined = (1..=3u32)
        .map(|i| {
            mpc.key_combine(&shares[(i - 1) as usize].p_share, &ecdsa_received(&shares, i))
                .unwrap()
        })
        .collect();
    (shares, combined)
}

/// N-shares addressed to participant `index`
pub fn ecdsa_received(shares: &[ecdsa::KeyShare], index: u32) -> Vec<ecdsa::NShare> {
    shares
        .iter()
        .filter(|s| s.p_share.i != index)
        .map(|s| s.n_shares[&index].clone())
        .collect()
}
