//! Fixed Paillier primes for tests; prime search is too slow to repeat.

use num_bigint::BigUint;

use crate::crypto::paillier::PaillierKeyPair;

const PRIMES: &str = include_str!("../tests/fixtures/paillier_primes.txt");

fn primes() -> Vec<BigUint> {
    PRIMES
        .split_whitespace()
        .map(|hex| BigUint::parse_bytes(hex.as_bytes(), 16).unwrap())
        .collect()
}

/// 2048-bit key pair number `slot` (0 to 3)
pub fn paillier_key(slot: usize) -> PaillierKeyPair {
    let primes = primes();
    PaillierKeyPair::from_primes(&primes[2 * slot], &primes[2 * slot + 1]).unwrap()
}
