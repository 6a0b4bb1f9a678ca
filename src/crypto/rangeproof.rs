//! Zero-Knowledge Range Proofs for Paillier ciphertexts
//!
//! MacKenzie–Reiter proofs that an encrypted value is small relative to the
//! secp256k1 group order, as needed to harden the MtA conversion:
//! - `prove` / `verify`: the plaintext of `c` is below q³
//! - `prove_with_check` / `verify_with_check`: `c2 = c1^x · Enc(y)` with
//!   `X = x·G`, `x` below q³ and `y` below q⁷
//!
//! The verifier supplies an `NTilde` (RSA modulus of two safe primes with
//! two random quadratic residues) that the prover commits against.

use k256::ProjectivePoint;
use num_bigint::BigUint;
use num_prime::RandPrime;
use num_traits::One;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::crypto::curves::{Secp256k1Curve, ThresholdCurve};
use crate::crypto::paillier::{random_below, random_coprime, PaillierPublicKey};
use crate::error::{HawalaError, HawalaResult};
use crate::serde_bytes::{biguint_hex, Bytes33};

const RANGE_PROOF_TAG: u8 = 0x06;
const RANGE_PROOF_WITH_CHECK_TAG: u8 = 0x0d;

/// Verifier-side commitment parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NTilde {
    #[serde(with = "biguint_hex")]
    pub ntilde: BigUint,
    #[serde(with = "biguint_hex")]
    pub h1: BigUint,
    #[serde(with = "biguint_hex")]
    pub h2: BigUint,
}

impl NTilde {
    /// Build from two primes, sampling fresh `h1`, `h2`
    pub fn from_primes(p: &BigUint, q: &BigUint) -> HawalaResult<Self> {
        if p == q {
            return Err(HawalaError::invalid_input("NTilde primes must differ"));
        }
        let ntilde = p * q;
        let two = BigUint::from(2u32);
        let h1 = random_coprime(&ntilde)?.modpow(&two, &ntilde);
        let h2 = random_coprime(&ntilde)?.modpow(&two, &ntilde);
        Ok(Self { ntilde, h1, h2 })
    }
}

/// Generate an `NTilde` of exactly `bits` bits from safe primes.
///
/// Safe-prime search is slow; expect seconds to minutes for 2048 bits.
pub fn generate_ntilde(bits: usize) -> HawalaResult<NTilde> {
    if bits < 16 {
        return Err(HawalaError::invalid_config("NTilde modulus is too small"));
    }
    let mut rng = OsRng;
    loop {
        let p: BigUint = rng.gen_safe_prime_exact(bits / 2);
        let q: BigUint = rng.gen_safe_prime_exact(bits - bits / 2);
        if p == q || (&p * &q).bits() != bits as u64 {
            continue;
        }
        return NTilde::from_primes(&p, &q);
    }
}

/// Proof that a ciphertext encrypts a value below q³
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeProof {
    #[serde(with = "biguint_hex")]
    pub z: BigUint,
    #[serde(with = "biguint_hex")]
    pub u: BigUint,
    #[serde(with = "biguint_hex")]
    pub w: BigUint,
    #[serde(with = "biguint_hex")]
    pub s: BigUint,
    #[serde(with = "biguint_hex")]
    pub s1: BigUint,
    #[serde(with = "biguint_hex")]
    pub s2: BigUint,
}

/// Proof of a well-formed homomorphic response `c2 = c1^x · Enc(y)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeProofWithCheck {
    #[serde(with = "biguint_hex")]
    pub z: BigUint,
    #[serde(with = "biguint_hex")]
    pub zprm: BigUint,
    #[serde(with = "biguint_hex")]
    pub t: BigUint,
    #[serde(with = "biguint_hex")]
    pub v: BigUint,
    #[serde(with = "biguint_hex")]
    pub w: BigUint,
    #[serde(with = "biguint_hex")]
    pub s: BigUint,
    #[serde(with = "biguint_hex")]
    pub s1: BigUint,
    #[serde(with = "biguint_hex")]
    pub s2: BigUint,
    #[serde(with = "biguint_hex")]
    pub t1: BigUint,
    #[serde(with = "biguint_hex")]
    pub t2: BigUint,
    pub u: Bytes33,
}

/// Fiat–Shamir transcript: tag, then fixed-width big-endian values each
/// followed by `$`
struct Transcript {
    hasher: Sha256,
}

impl Transcript {
    fn new(tag: u8) -> Self {
        let mut hasher = Sha256::new();
        hasher.update([tag, 0, 0, 0, 0, 0, 0, 0]);
        Self { hasher }
    }

    fn append(&mut self, value: &BigUint, width: usize) {
        self.hasher.update(to_fixed_be(value, width));
        self.hasher.update(b"$");
    }

    fn append_point(&mut self, point: &ProjectivePoint) {
        self.hasher.update(Secp256k1Curve::point_to_bytes(point));
        self.hasher.update(b"$");
    }

    fn challenge(self, q: &BigUint) -> BigUint {
        BigUint::from_bytes_be(&self.hasher.finalize()) % q
    }
}

fn to_fixed_be(value: &BigUint, width: usize) -> Vec<u8> {
    let bytes = value.to_bytes_be();
    if bytes.len() >= width {
        return bytes;
    }
    let mut out = vec![0u8; width - bytes.len()];
    out.extend_from_slice(&bytes);
    out
}

fn modulus_bytes(pk: &PaillierPublicKey) -> usize {
    ((pk.bits() + 7) / 8) as usize
}

fn generator(pk: &PaillierPublicKey) -> BigUint {
    pk.n() + BigUint::one()
}

/// `base^(-e) mod m`, `None` when `base` is not invertible
fn pow_neg(base: &BigUint, e: &BigUint, m: &BigUint) -> Option<BigUint> {
    base.modinv(m).map(|inv| inv.modpow(e, m))
}

/// Prove that `c = Enc(m; r)` under `pk` encrypts a value below q³
pub fn prove(
    pk: &PaillierPublicKey,
    ntilde: &NTilde,
    c: &BigUint,
    m: &BigUint,
    r: &BigUint,
) -> HawalaResult<RangeProof> {
    let width = modulus_bytes(pk);
    let q = Secp256k1Curve::order();
    let q3 = q.pow(3);
    let n2 = pk.n_squared();
    let nt = &ntilde.ntilde;

    let alpha = random_below(&q3);
    let beta = random_coprime(pk.n())?;
    let gamma = random_below(&(&q3 * nt));
    let rho = random_below(&(&q * nt));

    let z = (ntilde.h1.modpow(m, nt) * ntilde.h2.modpow(&rho, nt)) % nt;
    let u = (generator(pk).modpow(&alpha, n2) * beta.modpow(pk.n(), n2)) % n2;
    let w = (ntilde.h1.modpow(&alpha, nt) * ntilde.h2.modpow(&gamma, nt)) % nt;

    let mut transcript = Transcript::new(RANGE_PROOF_TAG);
    transcript.append(pk.n(), width);
    transcript.append(&generator(pk), width);
    transcript.append(c, 2 * width);
    transcript.append(&z, width);
    transcript.append(&u, 2 * width);
    transcript.append(&w, width);
    let e = transcript.challenge(&q);

    let s = (r.modpow(&e, pk.n()) * beta) % pk.n();
    let s1 = &e * m + alpha;
    let s2 = &e * rho + gamma;
    Ok(RangeProof { z, u, w, s, s1, s2 })
}

/// Both moduli must exceed 1 before any modular exponentiation
fn moduli_usable(pk: &PaillierPublicKey, ntilde: &NTilde) -> bool {
    let one = BigUint::one();
    pk.n() > &one && ntilde.ntilde > one
}

/// Verify a `RangeProof` for ciphertext `c`
pub fn verify(pk: &PaillierPublicKey, ntilde: &NTilde, proof: &RangeProof, c: &BigUint) -> bool {
    if !moduli_usable(pk, ntilde) {
        return false;
    }
    let width = modulus_bytes(pk);
    let q = Secp256k1Curve::order();
    if proof.s1 > q.pow(3) {
        return false;
    }
    let n2 = pk.n_squared();
    let nt = &ntilde.ntilde;

    let mut transcript = Transcript::new(RANGE_PROOF_TAG);
    transcript.append(pk.n(), width);
    transcript.append(&generator(pk), width);
    transcript.append(c, 2 * width);
    transcript.append(&proof.z, width);
    transcript.append(&proof.u, 2 * width);
    transcript.append(&proof.w, width);
    let e = transcript.challenge(&q);

    let c_neg_e = match pow_neg(c, &e, n2) {
        Some(v) => v,
        None => return false,
    };
    let u = (generator(pk).modpow(&proof.s1, n2) * proof.s.modpow(pk.n(), n2) % n2 * c_neg_e) % n2;
    if u != proof.u {
        return false;
    }

    let z_neg_e = match pow_neg(&proof.z, &e, nt) {
        Some(v) => v,
        None => return false,
    };
    let w = (ntilde.h1.modpow(&proof.s1, nt) * ntilde.h2.modpow(&proof.s2, nt) % nt * z_neg_e) % nt;
    w == proof.w
}

/// Prove that `c2 = c1^x · Enc(y; r)` with `X = x·G`.
///
/// `c1` is the verifier's ciphertext under its own key `pk`.
#[allow(clippy::too_many_arguments)]
pub fn prove_with_check(
    pk: &PaillierPublicKey,
    ntilde: &NTilde,
    c1: &BigUint,
    c2: &BigUint,
    x: &BigUint,
    y: &BigUint,
    r: &BigUint,
    big_x: &ProjectivePoint,
) -> HawalaResult<RangeProofWithCheck> {
    let width = modulus_bytes(pk);
    let q = Secp256k1Curve::order();
    let q3 = q.pow(3);
    let q7 = q.pow(7);
    let n2 = pk.n_squared();
    let nt = &ntilde.ntilde;
    let q_nt = &q * nt;
    let q3_nt = &q3 * nt;

    let alpha = random_below(&q3);
    let rho = random_below(&q_nt);
    let sigma = random_below(&q_nt);
    let tau = random_below(&q3_nt);
    let rhoprm = random_below(&q3_nt);
    let beta = random_coprime(pk.n())?;
    let gamma = random_below(&q7);

    let u = Secp256k1Curve::base_point_mult(&Secp256k1Curve::scalar_from_biguint(&alpha));
    let z = (ntilde.h1.modpow(x, nt) * ntilde.h2.modpow(&rho, nt)) % nt;
    let zprm = (ntilde.h1.modpow(&alpha, nt) * ntilde.h2.modpow(&rhoprm, nt)) % nt;
    let t = (ntilde.h1.modpow(y, nt) * ntilde.h2.modpow(&sigma, nt)) % nt;
    let v = (c1.modpow(&alpha, n2) * generator(pk).modpow(&gamma, n2) % n2 * beta.modpow(pk.n(), n2))
        % n2;
    let w = (ntilde.h1.modpow(&gamma, nt) * ntilde.h2.modpow(&tau, nt)) % nt;

    let e = with_check_challenge(pk, width, big_x, c1, c2, &u, &z, &zprm, &t, &v, &w, &q);

    let s = (r.modpow(&e, pk.n()) * beta) % pk.n();
    let s1 = &e * x + alpha;
    let s2 = &e * rho + rhoprm;
    let t1 = &e * y + gamma;
    let t2 = &e * sigma + tau;
    Ok(RangeProofWithCheck {
        z,
        zprm,
        t,
        v,
        w,
        s,
        s1,
        s2,
        t1,
        t2,
        u: Bytes33(Secp256k1Curve::point_to_bytes(&u)),
    })
}

/// Verify a `RangeProofWithCheck`
pub fn verify_with_check(
    pk: &PaillierPublicKey,
    ntilde: &NTilde,
    proof: &RangeProofWithCheck,
    c1: &BigUint,
    c2: &BigUint,
    big_x: &ProjectivePoint,
) -> bool {
    if !moduli_usable(pk, ntilde) {
        return false;
    }
    let width = modulus_bytes(pk);
    let q = Secp256k1Curve::order();
    if proof.s1 > q.pow(3) || proof.t1 > q.pow(7) {
        return false;
    }
    let u = match Secp256k1Curve::point_from_bytes(proof.u.as_bytes()) {
        Ok(point) => point,
        Err(_) => return false,
    };
    let n2 = pk.n_squared();
    let nt = &ntilde.ntilde;

    let e = with_check_challenge(
        pk, width, big_x, c1, c2, &u, &proof.z, &proof.zprm, &proof.t, &proof.v, &proof.w, &q,
    );

    let g_s1 = Secp256k1Curve::base_point_mult(&Secp256k1Curve::scalar_from_biguint(&proof.s1));
    let x_e_u = *big_x * Secp256k1Curve::scalar_from_biguint(&e) + u;
    if g_s1 != x_e_u {
        return false;
    }

    let left = (ntilde.h1.modpow(&proof.s1, nt) * ntilde.h2.modpow(&proof.s2, nt)) % nt;
    let right = (proof.z.modpow(&e, nt) * &proof.zprm) % nt;
    if left != right {
        return false;
    }

    let left = (ntilde.h1.modpow(&proof.t1, nt) * ntilde.h2.modpow(&proof.t2, nt)) % nt;
    let right = (proof.t.modpow(&e, nt) * &proof.w) % nt;
    if left != right {
        return false;
    }

    let left = (c1.modpow(&proof.s1, n2) * proof.s.modpow(pk.n(), n2) % n2
        * generator(pk).modpow(&proof.t1, n2))
        % n2;
    let right = (c2.modpow(&e, n2) * &proof.v) % n2;
    left == right
}

#[allow(clippy::too_many_arguments)]
fn with_check_challenge(
    pk: &PaillierPublicKey,
    width: usize,
    big_x: &ProjectivePoint,
    c1: &BigUint,
    c2: &BigUint,
    u: &ProjectivePoint,
    z: &BigUint,
    zprm: &BigUint,
    t: &BigUint,
    v: &BigUint,
    w: &BigUint,
    q: &BigUint,
) -> BigUint {
    let mut transcript = Transcript::new(RANGE_PROOF_WITH_CHECK_TAG);
    transcript.append(pk.n(), width);
    transcript.append(&generator(pk), width);
    transcript.append_point(big_x);
    transcript.append(c1, 2 * width);
    transcript.append(c2, 2 * width);
    transcript.append_point(u);
    transcript.append(z, width);
    transcript.append(zprm, width);
    transcript.append(t, width);
    transcript.append(v, 2 * width);
    transcript.append(w, width);
    transcript.challenge(q)
}
