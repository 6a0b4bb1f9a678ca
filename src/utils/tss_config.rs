//! Threshold Protocol Configuration Manager
//!
//! Centralized protocol configuration with:
//! - Security level presets (standard, high, testing)
//! - Runtime configuration updates
//! - Share verification switches
//! - Keystore KDF cost and passphrase policy

use crate::error::{HawalaError, HawalaResult};
use crate::types::MessageHash;
use std::sync::RwLock;

/// Global protocol configuration manager
pub struct TssConfig {
    /// Current configuration
    config: RwLock<TssSettings>,
}

/// Protocol settings
#[derive(Debug, Clone)]
pub struct TssSettings {
    /// Security level preset
    pub level: TssLevel,

    // Paillier settings
    /// Modulus size for freshly generated ECDSA key shares
    pub paillier_bits: usize,
    /// Smallest modulus accepted from a caller-supplied key
    pub min_paillier_bits: usize,

    // Share validation
    /// Reject received key shares that fail Feldman verification
    pub verify_received_shares: bool,
    /// Reject EdDSA R-shares that carry no nonce commitment
    pub require_r_share_commitments: bool,

    // Signing
    /// Digest applied to ECDSA messages when the caller does not choose one
    pub message_hash: MessageHash,

    // Keystore
    /// Argon2id memory cost in KiB
    pub keystore_memory_kib: u32,
    /// Argon2id iterations
    pub keystore_iterations: u32,
    /// Minimum estimated passphrase entropy in bits
    pub min_passphrase_entropy: u32,
}

/// Security level presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TssLevel {
    /// Standard - 3072-bit Paillier, all checks on
    Standard,
    /// High - larger Paillier modulus and KDF cost
    High,
    /// Testing - minimum sizes, cheap KDF; never for real keys
    Testing,
    /// Custom - user-defined settings
    Custom,
}

impl Default for TssSettings {
    fn default() -> Self {
        Self::standard()
    }
}

impl TssSettings {
    /// Standard preset
    pub fn standard() -> Self {
        Self {
            level: TssLevel::Standard,

            paillier_bits: 3072,
            min_paillier_bits: 2048,

            verify_received_shares: true,
            require_r_share_commitments: true,

            message_hash: MessageHash::Sha256,

            keystore_memory_kib: 64 * 1024, // 64 MiB
            keystore_iterations: 3,
            min_passphrase_entropy: 40,
        }
    }

    /// High security preset
    pub fn high() -> Self {
        Self {
            level: TssLevel::High,

            paillier_bits: 4096,
            min_paillier_bits: 3072,

            verify_received_shares: true,
            require_r_share_commitments: true,

            message_hash: MessageHash::Sha256,

            keystore_memory_kib: 256 * 1024, // 256 MiB
            keystore_iterations: 4,
            min_passphrase_entropy: 60,
        }
    }

    /// Testing preset
    pub fn testing() -> Self {
        Self {
            level: TssLevel::Testing,

            paillier_bits: 2048,
            min_paillier_bits: 2048,

            verify_received_shares: true,
            require_r_share_commitments: false,

            message_hash: MessageHash::Sha256,

            keystore_memory_kib: 1024,
            keystore_iterations: 1,
            min_passphrase_entropy: 0,
        }
    }

    /// Validate settings consistency
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.paillier_bits < self.min_paillier_bits {
            warnings.push(
                "Warning: Paillier modulus size is below the accepted minimum".to_string()
            );
        }

        if self.min_paillier_bits < crate::crypto::paillier::MIN_PAILLIER_BITS {
            warnings.push(
                "Warning: Paillier minimum is too small for MtA masking".to_string()
            );
        }

        if !self.verify_received_shares {
            warnings.push(
                "Warning: Received key shares are not Feldman-verified".to_string()
            );
        }

        if !self.require_r_share_commitments {
            warnings.push(
                "Warning: EdDSA R-shares without nonce commitments are accepted".to_string()
            );
        }

        if self.keystore_memory_kib < 19 * 1024 {
            warnings.push(
                "Warning: Keystore KDF memory cost is below 19 MiB".to_string()
            );
        }

        if self.min_passphrase_entropy < 32 {
            warnings.push(
                "Warning: Keystore passphrase entropy requirement is very low".to_string()
            );
        }

        warnings
    }
}

impl TssConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self {
            config: RwLock::new(TssSettings::default()),
        }
    }

    /// Create with specific level
    pub fn with_level(level: TssLevel) -> Self {
        Self {
            config: RwLock::new(preset(level)),
        }
    }

    /// Get current settings
    pub fn settings(&self) -> TssSettings {
        self.config.read()
            .map(|c| c.clone())
            .unwrap_or_else(|_| TssSettings::standard())
    }

    /// Get security level
    pub fn level(&self) -> TssLevel {
        self.config.read()
            .map(|c| c.level)
            .unwrap_or(TssLevel::Standard)
    }

    /// Set security level (applies preset)
    pub fn set_level(&self, level: TssLevel) {
        let Ok(mut config) = self.config.write() else { return };
        *config = match level {
            TssLevel::Custom => {
                let mut current = config.clone();
                current.level = TssLevel::Custom;
                current
            }
            other => preset(other),
        };
    }

    /// Update a specific setting
    pub fn update<F>(&self, updater: F) -> Vec<String>
    where
        F: FnOnce(&mut TssSettings),
    {
        let Ok(mut config) = self.config.write() else {
            return vec!["Failed to acquire config lock".to_string()];
        };
        config.level = TssLevel::Custom; // Any manual change makes it custom
        updater(&mut config);
        config.validate()
    }

    /// Modulus size for new Paillier keys
    pub fn paillier_bits(&self) -> usize {
        self.config.read()
            .map(|c| c.paillier_bits)
            .unwrap_or(3072)
    }

    /// Whether received shares must pass Feldman verification
    pub fn verify_received_shares(&self) -> bool {
        self.config.read()
            .map(|c| c.verify_received_shares)
            .unwrap_or(true)
    }
}

impl Default for TssConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn preset(level: TssLevel) -> TssSettings {
    match level {
        TssLevel::Standard => TssSettings::standard(),
        TssLevel::High => TssSettings::high(),
        TssLevel::Testing => TssSettings::testing(),
        TssLevel::Custom => TssSettings::standard(),
    }
}

/// Estimate passphrase entropy (in bits)
pub fn estimate_passphrase_entropy(passphrase: &str) -> u32 {
    if passphrase.is_empty() {
        return 0;
    }

    let mut charset_size: u32 = 0;
    let mut has_lower = false;
    let mut has_upper = false;
    let mut has_digit = false;
    let mut has_special = false;
    let mut has_unicode = false;

    for c in passphrase.chars() {
        if c.is_ascii_lowercase() {
            has_lower = true;
        } else if c.is_ascii_uppercase() {
            has_upper = true;
        } else if c.is_ascii_digit() {
            has_digit = true;
        } else if c.is_ascii_punctuation() || c == ' ' {
            has_special = true;
        } else {
            has_unicode = true;
        }
    }

    if has_lower { charset_size += 26; }
    if has_upper { charset_size += 26; }
    if has_digit { charset_size += 10; }
    if has_special { charset_size += 33; }
    if has_unicode { charset_size += 100; }

    // Entropy = length * log2(charset_size)
    let entropy_per_char = (charset_size as f64).log2();
    (passphrase.chars().count() as f64 * entropy_per_char) as u32
}

/// Check if a passphrase meets the minimum entropy requirement
pub fn check_passphrase_strength(passphrase: &str, min_entropy: u32) -> HawalaResult<()> {
    let entropy = estimate_passphrase_entropy(passphrase);

    if entropy < min_entropy {
        return Err(HawalaError::invalid_input(format!(
            "Passphrase is too weak (entropy: {} bits, minimum: {} bits)",
            entropy, min_entropy
        )));
    }

    Ok(())
}

/// Global protocol configuration instance
static TSS_CONFIG: std::sync::OnceLock<TssConfig> = std::sync::OnceLock::new();

/// Get the global protocol configuration
pub fn global_config() -> &'static TssConfig {
    TSS_CONFIG.get_or_init(TssConfig::new)
}
