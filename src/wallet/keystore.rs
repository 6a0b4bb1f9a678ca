//! Passphrase-encrypted signing material
//!
//! Provides storage encryption for signing material using:
//! - AES-256-GCM for authenticated encryption
//! - Argon2id for key derivation from the passphrase
//! - The curve name as associated data, so material of one curve never
//!   decrypts as the other

#![allow(deprecated)] // GenericArray::from_slice deprecated in generic-array 1.x

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng, Payload},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::curves::CurveType;
use crate::error::{HawalaError, HawalaResult};
use crate::log_debug;
use crate::utils::tss_config::{check_passphrase_strength, TssSettings};

const MODULE: &str = "wallet::keystore";
const KEYSTORE_VERSION: u8 = 1;
const KDF_PARALLELISM: u32 = 4;

/// Signing material that can be stored in a keystore
pub trait KeyMaterial: Serialize + DeserializeOwned {
    const CURVE: CurveType;
}

impl KeyMaterial for super::eddsa::SigningMaterial {
    const CURVE: CurveType = CurveType::Ed25519;
}

impl KeyMaterial for super::ecdsa::SigningMaterial {
    const CURVE: CurveType = CurveType::Secp256k1;
}

/// Encrypted keystore envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedSigningMaterial {
    /// Version for future compatibility
    pub version: u8,
    pub curve: CurveType,
    /// Salt used for key derivation (32 bytes, base64)
    pub salt: String,
    /// Nonce used for encryption (12 bytes, base64)
    pub nonce: String,
    /// Encrypted material (ciphertext + auth tag, base64)
    pub ciphertext: String,
    pub kdf_params: KdfParams,
}

/// Key derivation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Time cost (iterations)
    pub time_cost: u32,
    pub parallelism: u32,
}

impl KdfParams {
    pub fn from_settings(settings: &TssSettings) -> Self {
        Self {
            memory_cost: settings.keystore_memory_kib,
            time_cost: settings.keystore_iterations,
            parallelism: KDF_PARALLELISM,
        }
    }
}

impl EncryptedSigningMaterial {
    pub fn to_json(&self) -> HawalaResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> HawalaResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| HawalaError::parse_error(format!("Invalid keystore JSON: {}", e)))
    }
}

/// Encrypt signing material under `passphrase`
pub fn encrypt_signing_material<M: KeyMaterial>(
    material: &M,
    passphrase: &SecretString,
    settings: &TssSettings,
) -> HawalaResult<EncryptedSigningMaterial> {
    check_passphrase_strength(passphrase.expose_secret(), settings.min_passphrase_entropy)?;

    let mut salt = [0u8; 32];
    OsRng.fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; 12];
    OsRng.fill_bytes(&mut nonce_bytes);

    let kdf_params = KdfParams::from_settings(settings);
    let key = derive_key(passphrase, &salt, &kdf_params)?;
    let plaintext = Zeroizing::new(serde_json::to_vec(material)?);

    let cipher = Aes256Gcm::new_from_slice(key.as_slice())
        .map_err(|e| HawalaError::crypto_error(format!("Failed to create cipher: {}", e)))?;
    let nonce = Nonce::from_slice(&nonce_bytes);
    let ciphertext = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext.as_slice(),
                aad: M::CURVE.name().as_bytes(),
            },
        )
        .map_err(|e| HawalaError::crypto_error(format!("Encryption failed: {}", e)))?;

    log_debug!(MODULE, "signing material encrypted", curve = M::CURVE);

    Ok(EncryptedSigningMaterial {
        version: KEYSTORE_VERSION,
        curve: M::CURVE,
        salt: base64_encode(&salt),
        nonce: base64_encode(&nonce_bytes),
        ciphertext: base64_encode(&ciphertext),
        kdf_params,
    })
}

/// Decrypt signing material with `passphrase`
pub fn decrypt_signing_material<M: KeyMaterial>(
    envelope: &EncryptedSigningMaterial,
    passphrase: &SecretString,
) -> HawalaResult<M> {
    if envelope.version != KEYSTORE_VERSION {
        return Err(HawalaError::invalid_input(format!(
            "Unsupported keystore version: {}",
            envelope.version
        )));
    }
    if envelope.curve != M::CURVE {
        return Err(HawalaError::invalid_input(format!(
            "Keystore holds {} material, expected {}",
            envelope.curve,
            M::CURVE
        )));
    }

    let salt = base64_decode(&envelope.salt)?;
    let nonce_bytes = base64_decode(&envelope.nonce)?;
    let ciphertext = base64_decode(&envelope.ciphertext)?;
    if salt.len() != 32 {
        return Err(HawalaError::invalid_input("Invalid salt length"));
    }
    if nonce_bytes.len() != 12 {
        return Err(HawalaError::invalid_input("Invalid nonce length"));
    }

    let key = derive_key(passphrase, &salt, &envelope.kdf_params)?;
    let cipher = Aes256Gcm::new_from_slice(key.as_slice())
        .map_err(|e| HawalaError::crypto_error(format!("Failed to create cipher: {}", e)))?;
    let nonce = Nonce::from_slice(&nonce_bytes);
    let plaintext = cipher
        .decrypt(
            nonce,
            Payload {
                msg: ciphertext.as_ref(),
                aad: envelope.curve.name().as_bytes(),
            },
        )
        .map(Zeroizing::new)
        .map_err(|_| {
            HawalaError::crypto_error("Decryption failed - incorrect passphrase or corrupted data")
        })?;

    log_debug!(MODULE, "signing material decrypted", curve = envelope.curve);

    Ok(serde_json::from_slice(&plaintext)?)
}

/// Derive encryption key from passphrase using Argon2id
fn derive_key(
    passphrase: &SecretString,
    salt: &[u8],
    params: &KdfParams,
) -> HawalaResult<Zeroizing<[u8; 32]>> {
    use argon2::{Algorithm, Argon2, Params, Version};

    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(32),
    )
    .map_err(|e| HawalaError::crypto_error(format!("Invalid KDF params: {}", e)))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(passphrase.expose_secret().as_bytes(), salt, key.as_mut_slice())
        .map_err(|e| HawalaError::crypto_error(format!("Key derivation failed: {}", e)))?;

    Ok(key)
}

fn base64_encode(data: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(data)
}

fn base64_decode(s: &str) -> HawalaResult<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(s)
        .map_err(|e| HawalaError::parse_error(format!("Invalid base64: {}", e)))
}
