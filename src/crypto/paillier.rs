//! Paillier Additively Homomorphic Encryption
//!
//! Used by threshold ECDSA for the multiplicative-to-additive share
//! conversion. The generator is fixed to `g = n + 1`, so `μ = λ⁻¹ mod n`.

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_prime::RandPrime;
use num_traits::{One, Zero};
use rand::rngs::OsRng;
use thiserror::Error;

use crate::error::{ErrorCode, HawalaError};

/// Smallest modulus accepted for MtA; masks are sampled below q⁵ (1280 bits)
pub const MIN_PAILLIER_BITS: usize = 2048;

/// Modulus size used for fresh wallet keys
pub const DEFAULT_PAILLIER_BITS: usize = 3072;

#[derive(Debug, Clone, Error)]
pub enum PaillierError {
    #[error("plaintext must be smaller than the modulus")]
    PlaintextTooLarge,
    #[error("ciphertext is outside Z*_n²")]
    CiphertextOutOfRange,
    #[error("invalid primes: {0}")]
    InvalidPrimes(String),
    #[error("modulus of {bits} bits is below the minimum of {min}")]
    KeyTooSmall { bits: u64, min: usize },
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),
    #[error("modulus must exceed 1")]
    InvalidModulus,
}

impl From<PaillierError> for HawalaError {
    fn from(e: PaillierError) -> Self {
        HawalaError::new(ErrorCode::CryptoError, format!("Paillier: {}", e))
    }
}

/// Encryption key `n`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaillierPublicKey {
    n: BigUint,
    n_squared: BigUint,
}

impl PaillierPublicKey {
    pub fn new(n: BigUint) -> Self {
        let n_squared = &n * &n;
        Self { n, n_squared }
    }

    pub fn n(&self) -> &BigUint {
        &self.n
    }

    pub fn n_squared(&self) -> &BigUint {
        &self.n_squared
    }

    pub fn bits(&self) -> u64 {
        self.n.bits()
    }

    /// Random element of Z*_n
    pub fn random_nonce(&self) -> Result<BigUint, PaillierError> {
        random_coprime(&self.n)
    }

    /// Encrypt with a fresh nonce
    pub fn encrypt(&self, m: &BigUint) -> Result<BigUint, PaillierError> {
        self.encrypt_with_nonce(m).map(|(c, _)| c)
    }

    /// Encrypt with a fresh nonce, returning it alongside the ciphertext
    pub fn encrypt_with_nonce(&self, m: &BigUint) -> Result<(BigUint, BigUint), PaillierError> {
        if m >= &self.n {
            return Err(PaillierError::PlaintextTooLarge);
        }
        let r = self.random_nonce()?;
        let c = self.encrypt_with(m, &r)?;
        Ok((c, r))
    }

    /// `c = (1 + m·n) · rⁿ mod n²`
    pub fn encrypt_with(&self, m: &BigUint, r: &BigUint) -> Result<BigUint, PaillierError> {
        if m >= &self.n {
            return Err(PaillierError::PlaintextTooLarge);
        }
        let gm = (BigUint::one() + m * &self.n) % &self.n_squared;
        let rn = r.modpow(&self.n, &self.n_squared);
        Ok((gm * rn) % &self.n_squared)
    }

    /// Ciphertext of the sum of the plaintexts
    pub fn add(&self, c1: &BigUint, c2: &BigUint) -> BigUint {
        (c1 * c2) % &self.n_squared
    }

    /// Ciphertext of the plaintext multiplied by `k`
    pub fn mul(&self, c: &BigUint, k: &BigUint) -> BigUint {
        c.modpow(k, &self.n_squared)
    }

    pub fn check_ciphertext(&self, c: &BigUint) -> Result<(), PaillierError> {
        if c.is_zero() || c >= &self.n_squared || !c.gcd(&self.n).is_one() {
            return Err(PaillierError::CiphertextOutOfRange);
        }
        Ok(())
    }
}

/// Decryption key `(λ, μ)` with its modulus
#[derive(Debug, Clone)]
pub struct PaillierPrivateKey {
    lambda: BigUint,
    mu: BigUint,
    public: PaillierPublicKey,
}

impl PaillierPrivateKey {
    /// Rebuild from the `(l, m, n)` triple carried in key shares
    pub fn new(lambda: BigUint, mu: BigUint, n: BigUint) -> Result<Self, PaillierError> {
        if lambda.is_zero() || mu.is_zero() || mu >= n {
            return Err(PaillierError::InvalidPrivateKey("lambda and mu must be in range".into()));
        }
        Ok(Self {
            lambda,
            mu,
            public: PaillierPublicKey::new(n),
        })
    }

    pub fn lambda(&self) -> &BigUint {
        &self.lambda
    }

    pub fn mu(&self) -> &BigUint {
        &self.mu
    }

    pub fn public_key(&self) -> &PaillierPublicKey {
        &self.public
    }

    /// `m = L(c^λ mod n²) · μ mod n` with `L(x) = (x − 1) / n`
    pub fn decrypt(&self, c: &BigUint) -> Result<BigUint, PaillierError> {
        self.public.check_ciphertext(c)?;
        let n = self.public.n();
        let x = c.modpow(&self.lambda, self.public.n_squared());
        let l = (x - BigUint::one()) / n;
        Ok((l * &self.mu) % n)
    }
}

impl Drop for PaillierPrivateKey {
    fn drop(&mut self) {
        wipe(&mut self.lambda);
        wipe(&mut self.mu);
    }
}

/// Freshly generated or fixture key pair
#[derive(Debug, Clone)]
pub struct PaillierKeyPair {
    private: PaillierPrivateKey,
}

impl PaillierKeyPair {
    /// Generate a key with a modulus of exactly `bits` bits
    pub fn generate(bits: usize) -> Result<Self, PaillierError> {
        if bits < MIN_PAILLIER_BITS {
            return Err(PaillierError::KeyTooSmall {
                bits: bits as u64,
                min: MIN_PAILLIER_BITS,
            });
        }
        let mut rng = OsRng;
        loop {
            let p: BigUint = rng.gen_prime_exact(bits / 2, None);
            let q: BigUint = rng.gen_prime_exact(bits - bits / 2, None);
            if p == q || (&p * &q).bits() != bits as u64 {
                continue;
            }
            return Self::from_primes(&p, &q);
        }
    }

    /// Build from two distinct primes
    pub fn from_primes(p: &BigUint, q: &BigUint) -> Result<Self, PaillierError> {
        if p == q {
            return Err(PaillierError::InvalidPrimes("p and q must differ".into()));
        }
        let one = BigUint::one();
        if p <= &one || q <= &one {
            return Err(PaillierError::InvalidPrimes("primes must exceed 1".into()));
        }
        let n = p * q;
        let p1 = p - &one;
        let q1 = q - &one;
        if !n.gcd(&(&p1 * &q1)).is_one() {
            return Err(PaillierError::InvalidPrimes("gcd(n, φ(n)) must be 1".into()));
        }
        let lambda = p1.lcm(&q1);
        let mu = lambda
            .modinv(&n)
            .ok_or_else(|| PaillierError::InvalidPrimes("λ is not invertible mod n".into()))?;
        Ok(Self {
            private: PaillierPrivateKey::new(lambda, mu, n)?,
        })
    }

    pub fn public_key(&self) -> &PaillierPublicKey {
        self.private.public_key()
    }

    pub fn private_key(&self) -> &PaillierPrivateKey {
        &self.private
    }
}

/// Uniform element of [1, x) coprime to `x`
pub fn random_coprime(x: &BigUint) -> Result<BigUint, PaillierError> {
    if x <= &BigUint::one() {
        return Err(PaillierError::InvalidModulus);
    }
    let mut rng = OsRng;
    loop {
        let y = rng.gen_biguint_below(x);
        if !y.is_zero() && y.gcd(x).is_one() {
            return Ok(y);
        }
    }
}

/// Uniform element of [0, bound)
pub fn random_below(bound: &BigUint) -> BigUint {
    OsRng.gen_biguint_below(bound)
}

/// Clear every limb of `value` in place.
///
/// `BigUint` has no `Zeroize` impl; clearing set bits from the lowest up
/// zeroes each limb before the top one is truncated.
pub(crate) fn wipe(value: &mut BigUint) {
    for bit in 0..value.bits() {
        if value.bit(bit) {
            value.set_bit(bit, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 127-bit Mersenne prime and 89-bit Mersenne prime: too small for MtA
    // but enough to exercise the arithmetic.
    fn small_key() -> PaillierKeyPair {
        let p = (BigUint::one() << 127u32) - BigUint::one();
        let q = (BigUint::one() << 89u32) - BigUint::one();
        PaillierKeyPair::from_primes(&p, &q).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt() {
        let key = small_key();
        let m = BigUint::from(123_456_789u64);
        let c = key.public_key().encrypt(&m).unwrap();
        assert_ne!(c, m);
        assert_eq!(key.private_key().decrypt(&c).unwrap(), m);
    }

    #[test]
    fn test_homomorphic_operations() {
        let key = small_key();
        let pk = key.public_key();
        let a = BigUint::from(1000u32);
        let b = BigUint::from(2345u32);
        let k = BigUint::from(77u32);

        let sum = pk.add(&pk.encrypt(&a).unwrap(), &pk.encrypt(&b).unwrap());
        assert_eq!(key.private_key().decrypt(&sum).unwrap(), &a + &b);

        let product = pk.mul(&pk.encrypt(&a).unwrap(), &k);
        assert_eq!(key.private_key().decrypt(&product).unwrap(), &a * &k);
    }

    #[test]
    fn test_rebuild_private_key_from_share_fields() {
        let key = small_key();
        let rebuilt = PaillierPrivateKey::new(
            key.private_key().lambda().clone(),
            key.private_key().mu().clone(),
            key.public_key().n().clone(),
        )
        .unwrap();
        let m = BigUint::from(42u32);
        let c = key.public_key().encrypt(&m).unwrap();
        assert_eq!(rebuilt.decrypt(&c).unwrap(), m);
    }

    #[test]
    fn test_plaintext_bound() {
        let key = small_key();
        let n = key.public_key().n().clone();
        assert!(matches!(
            key.public_key().encrypt(&n),
            Err(PaillierError::PlaintextTooLarge)
        ));
    }

    #[test]
    fn test_bad_inputs() {
        let p = BigUint::from(1_000_003u32);
        assert!(PaillierKeyPair::from_primes(&p, &p).is_err());
        assert!(matches!(
            PaillierKeyPair::generate(512),
            Err(PaillierError::KeyTooSmall { .. })
        ));
        let key = small_key();
        assert!(key.private_key().decrypt(&BigUint::zero()).is_err());
    }

    #[test]
    fn test_degenerate_modulus_rejected_before_sampling() {
        for n in [0u32, 1] {
            let pk = PaillierPublicKey::new(BigUint::from(n));
            assert!(pk.encrypt(&BigUint::zero()).is_err());
            assert!(matches!(
                random_coprime(&BigUint::from(n)),
                Err(PaillierError::InvalidModulus)
            ));
        }
    }

    #[test]
    fn test_wipe_clears_value() {
        let key = small_key();
        let mut lambda = key.private_key().lambda().clone();
        assert!(lambda.bits() > 64);
        wipe(&mut lambda);
        assert!(lambda.is_zero());
    }
}
