//! Serde helpers for share material
//!
//! Scalars and points travel as fixed-width hex strings, Paillier
//! integers as big-endian hex without padding.

use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

fn decode_fixed<const N: usize, E: serde::de::Error>(s: &str) -> Result<[u8; N], E> {
    let bytes = hex::decode(s).map_err(E::custom)?;
    bytes
        .try_into()
        .map_err(|_| E::custom(format!("expected {} bytes", N)))
}

/// Serialize/deserialize [u8; 32] as hex string
pub mod hex32 {
    use super::*;

    pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        decode_fixed::<32, D::Error>(&s)
    }
}

/// Serialize/deserialize [u8; 33] (compressed secp256k1 point) as hex string
pub mod hex33 {
    use super::*;

    pub fn serialize<S>(bytes: &[u8; 33], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 33], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        decode_fixed::<33, D::Error>(&s)
    }
}

/// Serialize/deserialize Option<[u8; 32]> as hex string
pub mod hex32_option {
    use super::*;

    pub fn serialize<S>(bytes: &Option<[u8; 32]>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match bytes {
            Some(b) => serializer.serialize_some(&hex::encode(b)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<[u8; 32]>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<String> = Option::deserialize(deserializer)?;
        match opt {
            Some(s) => Ok(Some(decode_fixed::<32, D::Error>(&s)?)),
            None => Ok(None),
        }
    }
}

/// Serialize/deserialize BigUint as big-endian hex string
pub mod biguint_hex {
    use super::*;

    pub fn serialize<S>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_str_radix(16))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BigUint, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BigUint::parse_bytes(s.trim_start_matches("0x").as_bytes(), 16)
            .ok_or_else(|| serde::de::Error::custom("invalid hex integer"))
    }
}

/// Wrapper type for [u8; 32] that implements Serialize/Deserialize
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bytes32(pub [u8; 32]);

impl Bytes32 {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for Bytes32 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Bytes32 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        hex32::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Bytes32 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        hex32::deserialize(deserializer).map(Self)
    }
}

/// Wrapper type for [u8; 33] that implements Serialize/Deserialize
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bytes33(pub [u8; 33]);

impl Bytes33 {
    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }
}

impl From<[u8; 33]> for Bytes33 {
    fn from(bytes: [u8; 33]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Bytes33 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        hex33::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Bytes33 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        hex33::deserialize(deserializer).map(Self)
    }
}
