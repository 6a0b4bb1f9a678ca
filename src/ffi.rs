//! FFI Layer for Hawala TSS
//!
//! All C-ABI exports are defined here. This is the ONLY file that should
//! contain `extern "C"` functions. All functions follow a consistent pattern:
//! - Input: JSON string (null-terminated C string)
//! - Output: JSON string (must be freed with `hawala_tss_free_string`)
//!
//! Error handling: All functions return JSON with `success` field.
//! On error, `success: false` and `error` object is populated.
//!
//! Messages are passed as hex. Share objects use the same camelCase JSON
//! as the Rust types.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use num_bigint::BigUint;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::crypto::paillier::PaillierKeyPair;
use crate::error::{HawalaError, HawalaResult};
use crate::serde_bytes::biguint_hex;
use crate::tss::{ecdsa, eddsa};
use crate::types::{ApiResponse, MessageHash};

// =============================================================================
// Memory Management
// =============================================================================

/// Free a string returned by any hawala_tss_* function
///
/// # Safety
/// The pointer must have been returned by a hawala_tss_* function
#[unsafe(no_mangle)]
pub extern "C" fn hawala_tss_free_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    unsafe {
        let _ = CString::from_raw(s);
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Read and deserialize the request behind `input`
fn parse_request<T: DeserializeOwned>(input: *const c_char) -> HawalaResult<T> {
    if input.is_null() {
        return Err(HawalaError::invalid_input("Null input pointer"));
    }
    let c_str = unsafe { CStr::from_ptr(input) };
    let json_str = c_str
        .to_str()
        .map_err(|_| HawalaError::invalid_input("Invalid UTF-8 string"))?;
    serde_json::from_str(json_str)
        .map_err(|e| HawalaError::parse_error(format!("Invalid JSON: {}", e)))
}

fn decode_message(message: &str) -> HawalaResult<Vec<u8>> {
    Ok(hex::decode(message.trim_start_matches("0x"))?)
}

/// Parse the request, run `f` and wrap the outcome in the response envelope
fn handle<R, T, F>(input: *const c_char, f: F) -> *mut c_char
where
    R: DeserializeOwned,
    T: Serialize,
    F: FnOnce(R) -> HawalaResult<T>,
{
    respond(parse_request(input).and_then(f))
}

fn respond<T: Serialize>(result: HawalaResult<T>) -> *mut c_char {
    match result {
        Ok(data) => string_to_ptr(ApiResponse::ok(data).to_json()),
        Err(error) => string_to_ptr(ApiResponse::<()>::err(error).to_json()),
    }
}

/// Convert Rust string to C string pointer
fn string_to_ptr(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(c_str) => c_str.into_raw(),
        Err(_) => {
            // Unreachable for serde_json output, which never contains NUL
            CString::new(r#"{"success":false,"error":{"code":"internal","message":"String conversion failed"}}"#)
                .map(CString::into_raw)
                .unwrap_or(std::ptr::null_mut())
        }
    }
}

#[derive(Serialize)]
struct ValidResponse {
    valid: bool,
}

// =============================================================================
// EdDSA
// =============================================================================

/// Generate a key share
///
/// # Input
/// ```json
/// { "index": 1, "threshold": 2, "numShares": 3, "seed": "<64 bytes hex, optional>" }
/// ```
///
/// # Output
/// `KeyShare`
#[unsafe(no_mangle)]
pub extern "C" fn hawala_tss_eddsa_key_share(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Request {
        index: u32,
        threshold: u32,
        num_shares: u32,
        seed: Option<String>,
    }

    handle(input, |request: Request| {
        let seed = request.seed.as_deref().map(hex::decode).transpose()?;
        eddsa::Eddsa::new().key_share(
            request.index,
            request.threshold,
            request.num_shares,
            seed.as_deref(),
        )
    })
}

/// Combine a u-share with received y-shares
///
/// # Input
/// ```json
/// { "uShare": { ... }, "yShares": [ ... ] }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn hawala_tss_eddsa_key_combine(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Request {
        u_share: eddsa::UShare,
        y_shares: Vec<eddsa::YShare>,
    }

    handle(input, |request: Request| {
        eddsa::Eddsa::new().key_combine(&request.u_share, &request.y_shares)
    })
}

/// Start signing
///
/// # Input
/// ```json
/// { "message": "<hex>", "pShare": { ... }, "jShares": [ ... ] }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn hawala_tss_eddsa_sign_share(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Request {
        message: String,
        p_share: eddsa::PShare,
        j_shares: Vec<eddsa::JShare>,
    }

    handle(input, |request: Request| {
        let message = decode_message(&request.message)?;
        eddsa::Eddsa::new().sign_share(&message, &request.p_share, &request.j_shares, None)
    })
}

/// Produce a partial signature
///
/// # Input
/// ```json
/// { "message": "<hex>", "xShare": { ... }, "rShares": [ ... ], "yShares": [ ... ] }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn hawala_tss_eddsa_sign(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Request {
        message: String,
        x_share: eddsa::XShare,
        r_shares: Vec<eddsa::RShare>,
        #[serde(default)]
        y_shares: Vec<eddsa::YShare>,
    }

    handle(input, |request: Request| {
        let message = decode_message(&request.message)?;
        eddsa::Eddsa::new().sign(&message, &request.x_share, &request.r_shares, &request.y_shares)
    })
}

/// Combine partial signatures
///
/// # Output
/// ```json
/// { "signature": { "y": "...", "R": "...", "sigma": "..." }, "bytes": "<64 bytes hex>" }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn hawala_tss_eddsa_sign_combine(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Request {
        g_shares: Vec<eddsa::GShare>,
    }

    #[derive(Serialize)]
    struct Response {
        signature: eddsa::Signature,
        bytes: String,
    }

    handle(input, |request: Request| {
        let signature = eddsa::Eddsa::new().sign_combine(&request.g_shares)?;
        Ok(Response {
            bytes: hex::encode(signature.to_bytes()),
            signature,
        })
    })
}

/// Verify a combined signature
///
/// # Input
/// ```json
/// { "message": "<hex>", "signature": { ... } }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn hawala_tss_eddsa_verify(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    struct Request {
        message: String,
        signature: eddsa::Signature,
    }

    handle(input, |request: Request| {
        let message = decode_message(&request.message)?;
        let valid = eddsa::Eddsa::new().verify(&message, &request.signature)?;
        Ok(ValidResponse { valid })
    })
}

// =============================================================================
// ECDSA
// =============================================================================

/// Generate a key share
///
/// Without `paillier` a fresh Paillier key is generated, which takes a
/// while at the configured modulus size.
///
/// # Input
/// ```json
/// { "index": 1, "threshold": 2, "numShares": 3, "paillier": { "p": "<hex>", "q": "<hex>" } }
/// ```
///
/// # Output
/// `KeyShare`
#[unsafe(no_mangle)]
pub extern "C" fn hawala_tss_ecdsa_key_share(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    struct PaillierPrimes {
        #[serde(with = "biguint_hex")]
        p: BigUint,
        #[serde(with = "biguint_hex")]
        q: BigUint,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Request {
        index: u32,
        threshold: u32,
        num_shares: u32,
        paillier: Option<PaillierPrimes>,
    }

    handle(input, |request: Request| {
        let mpc = ecdsa::Ecdsa::new();
        match request.paillier {
            Some(primes) => {
                let paillier = PaillierKeyPair::from_primes(&primes.p, &primes.q)
                    .map_err(|e| HawalaError::invalid_config(e.to_string()))?;
                mpc.key_share_with_paillier(
                    request.index,
                    request.threshold,
                    request.num_shares,
                    &paillier,
                )
            }
            None => mpc.key_share(request.index, request.threshold, request.num_shares),
        }
    })
}

/// Combine a p-share with received n-shares
///
/// # Input
/// ```json
/// { "pShare": { ... }, "nShares": [ ... ] }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn hawala_tss_ecdsa_key_combine(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Request {
        p_share: ecdsa::PShare,
        n_shares: Vec<ecdsa::NShare>,
    }

    handle(input, |request: Request| {
        ecdsa::Ecdsa::new().key_combine(&request.p_share, &request.n_shares)
    })
}

/// Start signing with one co-signer
///
/// # Input
/// ```json
/// { "xShare": { ... }, "yShare": { ... } }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn hawala_tss_ecdsa_sign_share(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Request {
        x_share: ecdsa::XShare,
        y_share: ecdsa::YShare,
    }

    handle(input, |request: Request| {
        ecdsa::Ecdsa::new().sign_share(&request.x_share, &request.y_share)
    })
}

/// Run one MtA step
///
/// # Input
/// ```json
/// { "step": "respond", "xShare": { ... }, "yShare": { ... }, "kShare": { ... } }
/// { "step": "accept", "wShare": { ... }, "aShare": { ... } }
/// { "step": "finalize", "bShare": { ... }, "muShare": { ... } }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn hawala_tss_ecdsa_sign_convert(input: *const c_char) -> *mut c_char {
    handle(input, |request: ecdsa::SignConvert| {
        ecdsa::Ecdsa::new().sign_convert(&request)
    })
}

/// # Input
/// ```json
/// { "gShare": { ... }, "peerIndex": 3 }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn hawala_tss_ecdsa_sign_combine(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Request {
        g_share: ecdsa::GShare,
        peer_index: u32,
    }

    handle(input, |request: Request| {
        ecdsa::Ecdsa::new().sign_combine(&request.g_share, request.peer_index)
    })
}

/// # Input
/// ```json
/// { "message": "<hex>", "oShare": { ... }, "dShare": { ... }, "hash": "sha256" }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn hawala_tss_ecdsa_sign(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Request {
        message: String,
        o_share: ecdsa::OShare,
        d_share: ecdsa::DShare,
        hash: Option<MessageHash>,
    }

    handle(input, |request: Request| {
        let message = decode_message(&request.message)?;
        ecdsa::Ecdsa::new().sign(&message, &request.o_share, &request.d_share, request.hash)
    })
}

/// Combine signature shares
///
/// # Output
/// ```json
/// { "signature": { "y": "...", "r": "...", "s": "...", "recid": 0 }, "rsv": "<65 bytes hex>" }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn hawala_tss_ecdsa_construct_signature(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Request {
        s_shares: Vec<ecdsa::SShare>,
    }

    #[derive(Serialize)]
    struct Response {
        signature: ecdsa::Signature,
        rsv: String,
    }

    handle(input, |request: Request| {
        let signature = ecdsa::Ecdsa::new().construct_signature(&request.s_shares)?;
        Ok(Response {
            rsv: hex::encode(signature.to_rsv()),
            signature,
        })
    })
}

/// # Input
/// ```json
/// { "message": "<hex>", "signature": { ... }, "hash": "keccak256" }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn hawala_tss_ecdsa_verify(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    struct Request {
        message: String,
        signature: ecdsa::Signature,
        hash: Option<MessageHash>,
    }

    handle(input, |request: Request| {
        let message = decode_message(&request.message)?;
        let valid = ecdsa::Ecdsa::new().verify(&message, &request.signature, request.hash)?;
        Ok(ValidResponse { valid })
    })
}
