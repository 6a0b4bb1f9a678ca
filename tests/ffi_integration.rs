//! FFI Integration Tests
//!
//! Drives the C-ABI exports with JSON exactly as a host application would.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use hawala_tss::ffi::*;
use serde_json::{json, Value};

// MARK: - Helper Functions

fn call_ffi(func: extern "C" fn(*const c_char) -> *mut c_char, input: &Value) -> Value {
    let c_input = CString::new(input.to_string()).unwrap();
    let result = func(c_input.as_ptr());
    let output = unsafe { CStr::from_ptr(result) }.to_string_lossy().into_owned();
    hawala_tss_free_string(result);
    serde_json::from_str(&output).unwrap()
}

fn data(response: Value) -> Value {
    assert_eq!(response["success"], true, "call failed: {}", response);
    response["data"].clone()
}

// MARK: - EdDSA

#[test]
fn eddsa_round_trip_over_ffi() {
    let message = hex::encode(b"ffi payload");

    let shares: Vec<Value> = (1..=3)
        .map(|i| {
            data(call_ffi(
                hawala_tss_eddsa_key_share,
                &json!({ "index": i, "threshold": 2, "numShares": 3 }),
            ))
        })
        .collect();

    let combine = |i: usize| {
        let y_shares: Vec<Value> = shares
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i - 1)
            .map(|(_, s)| s["yShares"][i.to_string()].clone())
            .collect();
        data(call_ffi(
            hawala_tss_eddsa_key_combine,
            &json!({ "uShare": shares[i - 1]["uShare"], "yShares": y_shares }),
        ))
    };
    let user = combine(1);
    let bitgo = combine(3);
    assert_eq!(user["pShare"]["y"], bitgo["pShare"]["y"]);

    let user_sign = data(call_ffi(
        hawala_tss_eddsa_sign_share,
        &json!({ "message": message, "pShare": user["pShare"], "jShares": [user["jShares"]["3"]] }),
    ));
    let bitgo_sign = data(call_ffi(
        hawala_tss_eddsa_sign_share,
        &json!({ "message": message, "pShare": bitgo["pShare"], "jShares": [bitgo["jShares"]["1"]] }),
    ));

    let user_g = data(call_ffi(
        hawala_tss_eddsa_sign,
        &json!({
            "message": message,
            "xShare": user_sign["xShare"],
            "rShares": [bitgo_sign["rShares"]["1"]],
            "yShares": [shares[1]["yShares"]["1"]],
        }),
    ));
    let bitgo_g = data(call_ffi(
        hawala_tss_eddsa_sign,
        &json!({
            "message": message,
            "xShare": bitgo_sign["xShare"],
            "rShares": [user_sign["rShares"]["3"]],
            "yShares": [shares[1]["yShares"]["3"]],
        }),
    ));

    let combined = data(call_ffi(
        hawala_tss_eddsa_sign_combine,
        &json!({ "gShares": [user_g, bitgo_g] }),
    ));
    assert_eq!(combined["bytes"].as_str().unwrap().len(), 128);

    let verified = data(call_ffi(
        hawala_tss_eddsa_verify,
        &json!({ "message": message, "signature": combined["signature"] }),
    ));
    assert_eq!(verified["valid"], true);

    let wrong = data(call_ffi(
        hawala_tss_eddsa_verify,
        &json!({ "message": hex::encode(b"other"), "signature": combined["signature"] }),
    ));
    assert_eq!(wrong["valid"], false);
}

#[test]
fn invalid_config_reports_error_code() {
    let response = call_ffi(
        hawala_tss_eddsa_key_share,
        &json!({ "index": 4, "threshold": 2, "numShares": 3 }),
    );
    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["code"], "invalid_config");
}

#[test]
fn malformed_json_reports_parse_error() {
    let c_input = CString::new("{not json").unwrap();
    let result = hawala_tss_eddsa_key_combine(c_input.as_ptr());
    let output = unsafe { CStr::from_ptr(result) }.to_string_lossy().into_owned();
    hawala_tss_free_string(result);

    let response: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["code"], "parse_error");
}

#[test]
fn null_input_is_rejected() {
    let result = hawala_tss_eddsa_verify(std::ptr::null());
    let output = unsafe { CStr::from_ptr(result) }.to_string_lossy().into_owned();
    hawala_tss_free_string(result);
    assert!(output.contains("invalid_input"));
}

#[test]
fn free_string_accepts_null() {
    hawala_tss_free_string(std::ptr::null_mut());
}

// MARK: - ECDSA

// MARK: - ECDSA

const PAILLIER_PRIMES: &str = include_str!("fixtures/paillier_primes.txt");

fn paillier_primes(slot: usize) -> Value {
    let primes: Vec<&str> = PAILLIER_PRIMES.split_whitespace().collect();
    json!({ "p": primes[2 * slot], "q": primes[2 * slot + 1] })
}

#[test]
fn ecdsa_round_trip_over_ffi() {
    let message = hex::encode(b"ffi eth payload");

    let shares: Vec<Value> = (1..=3usize)
        .map(|i| {
            data(call_ffi(
                hawala_tss_ecdsa_key_share,
                &json!({
                    "index": i,
                    "threshold": 2,
                    "numShares": 3,
                    "paillier": paillier_primes(i - 1),
                }),
            ))
        })
        .collect();

    let combine = |i: usize| {
        let n_shares: Vec<Value> = shares
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i - 1)
            .map(|(_, s)| s["nShares"][i.to_string()].clone())
            .collect();
        data(call_ffi(
            hawala_tss_ecdsa_key_combine,
            &json!({ "pShare": shares[i - 1]["pShare"], "nShares": n_shares }),
        ))
    };
    let user = combine(1);
    let bitgo = combine(3);
    assert_eq!(user["xShare"]["y"], bitgo["xShare"]["y"]);

    let user_start = data(call_ffi(
        hawala_tss_ecdsa_sign_share,
        &json!({ "xShare": user["xShare"], "yShare": user["yShares"]["3"] }),
    ));
    let bitgo_respond = data(call_ffi(
        hawala_tss_ecdsa_sign_convert,
        &json!({
            "step": "respond",
            "xShare": bitgo["xShare"],
            "yShare": bitgo["yShares"]["1"],
            "kShare": user_start["kShare"],
        }),
    ));
    let user_accept = data(call_ffi(
        hawala_tss_ecdsa_sign_convert,
        &json!({
            "step": "accept",
            "wShare": user_start["wShare"],
            "aShare": bitgo_respond["aShare"],
        }),
    ));
    let bitgo_finalize = data(call_ffi(
        hawala_tss_ecdsa_sign_convert,
        &json!({
            "step": "finalize",
            "bShare": bitgo_respond["bShare"],
            "muShare": user_accept["muShare"],
        }),
    ));

    let user_combine = data(call_ffi(
        hawala_tss_ecdsa_sign_combine,
        &json!({ "gShare": user_accept["gShare"], "peerIndex": 3 }),
    ));
    let bitgo_combine = data(call_ffi(
        hawala_tss_ecdsa_sign_combine,
        &json!({ "gShare": bitgo_finalize["gShare"], "peerIndex": 1 }),
    ));

    let user_s = data(call_ffi(
        hawala_tss_ecdsa_sign,
        &json!({
            "message": message,
            "oShare": user_combine["oShare"],
            "dShare": bitgo_combine["dShare"],
            "hash": "keccak256",
        }),
    ));
    let bitgo_s = data(call_ffi(
        hawala_tss_ecdsa_sign,
        &json!({
            "message": message,
            "oShare": bitgo_combine["oShare"],
            "dShare": user_combine["dShare"],
            "hash": "keccak256",
        }),
    ));

    let combined = data(call_ffi(
        hawala_tss_ecdsa_construct_signature,
        &json!({ "sShares": [user_s, bitgo_s] }),
    ));
    assert_eq!(combined["signature"]["y"], user["xShare"]["y"]);
    assert_eq!(combined["rsv"].as_str().unwrap().len(), 130);

    let verified = data(call_ffi(
        hawala_tss_ecdsa_verify,
        &json!({ "message": message, "signature": combined["signature"], "hash": "keccak256" }),
    ));
    assert_eq!(verified["valid"], true);
}

#[test]
fn ecdsa_key_share_rejects_bad_paillier_primes() {
    let primes: Vec<&str> = PAILLIER_PRIMES.split_whitespace().collect();
    let response = call_ffi(
        hawala_tss_ecdsa_key_share,
        &json!({
            "index": 1,
            "threshold": 2,
            "numShares": 3,
            "paillier": { "p": primes[0], "q": primes[0] },
        }),
    );
    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["code"], "invalid_config");
}

#[test]
fn ecdsa_construct_signature_rejects_mismatched_shares() {
    let response = call_ffi(
        hawala_tss_ecdsa_construct_signature,
        &json!({
            "sShares": [
                {
                    "i": 1,
                    "R": format!("02{}", "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"),
                    "r": "01".repeat(32),
                    "s": "02".repeat(32),
                    "y": format!("03{}", "11".repeat(32)),
                },
                {
                    "i": 2,
                    "R": format!("02{}", "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"),
                    "r": "03".repeat(32),
                    "s": "02".repeat(32),
                    "y": format!("03{}", "11".repeat(32)),
                }
            ]
        }),
    );
    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["code"], "inconsistent_shares");
}

#[test]
fn ecdsa_verify_rejects_garbage_signature() {
    let response = call_ffi(
        hawala_tss_ecdsa_verify,
        &json!({
            "message": hex::encode(b"hello"),
            "signature": {
                "y": format!("02{}", "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"),
                "r": "01".repeat(32),
                "s": "01".repeat(32),
                "recid": 0
            },
            "hash": "keccak256"
        }),
    );
    assert_eq!(data(response)["valid"], false);
}
