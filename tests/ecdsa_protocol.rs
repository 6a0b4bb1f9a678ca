//! ECDSA Protocol Integration Tests
//!
//! Full two-signer exchanges over JSON, as the parties would run them,
//! checked against libsecp256k1.

mod common;

use common::{ecdsa, ecdsa_keygen, ecdsa_received, paillier_key};
use hawala_tss::crypto::curves::Secp256k1Curve;
use hawala_tss::tss::ecdsa::{KeyCombined, SignConvert, SignConvertRT, Signature};
use hawala_tss::types::MessageHash;
use hawala_tss::wallet::ecdsa::{create_combined_key, sign_with_two_parties};
use hawala_tss::{Ecdsa, ErrorCode, TssSettings};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Send a value through its JSON form, as it would travel between parties
fn wire<T: Serialize + DeserializeOwned>(value: &T) -> T {
    serde_json::from_str(&serde_json::to_string(value).unwrap()).unwrap()
}

fn exchange(mpc: &Ecdsa, a: &KeyCombined, b: &KeyCombined, message: &[u8], hash: MessageHash) -> Signature {
    let (ai, bi) = (a.x_share.i, b.x_share.i);

    let a_start = mpc.sign_share(&a.x_share, &a.y_shares[&bi]).unwrap();
    let b_resp: SignConvertRT = mpc
        .sign_convert(&wire(&SignConvert::Respond {
            x_share: b.x_share.clone(),
            y_share: b.y_shares[&ai].clone(),
            k_share: wire(&a_start.k_share),
        }))
        .unwrap();
    let a_conv = mpc
        .sign_convert(&SignConvert::Accept {
            w_share: a_start.w_share.clone(),
            a_share: wire(b_resp.a_share.as_ref().unwrap()),
        })
        .unwrap();
    let b_conv = mpc
        .sign_convert(&SignConvert::Finalize {
            b_share: b_resp.b_share.clone().unwrap(),
            mu_share: wire(a_conv.mu_share.as_ref().unwrap()),
        })
        .unwrap();

    let a_comb = mpc.sign_combine(a_conv.g_share.as_ref().unwrap(), bi).unwrap();
    let b_comb = mpc.sign_combine(b_conv.g_share.as_ref().unwrap(), ai).unwrap();

    let a_s = mpc
        .sign(message, &a_comb.o_share, &wire(&b_comb.d_share), Some(hash))
        .unwrap();
    let b_s = mpc
        .sign(message, &b_comb.o_share, &wire(&a_comb.d_share), Some(hash))
        .unwrap();
    mpc.construct_signature(&[wire(&a_s), wire(&b_s)]).unwrap()
}

fn secp_verify(signature: &Signature, digest: &[u8; 32]) -> bool {
    use secp256k1::ecdsa::Signature as SecpSignature;
    use secp256k1::{Message, PublicKey, Secp256k1};
    let secp = Secp256k1::verification_only();
    let key = PublicKey::from_slice(&signature.y).unwrap();
    let sig = SecpSignature::from_compact(&signature.to_compact()).unwrap();
    secp.verify_ecdsa(&Message::from_digest(*digest), &sig, &key).is_ok()
}

#[test]
fn every_pair_of_three_signs() {
    let mpc = ecdsa();
    let (_, combined) = ecdsa_keygen(&mpc);
    let message = b"bitcoin spend";
    let digest = MessageHash::Sha256.digest(message);

    for (a, b) in [(0usize, 1usize), (0, 2), (1, 2), (2, 0)] {
        let signature = exchange(&mpc, &combined[a], &combined[b], message, MessageHash::Sha256);
        assert!(secp_verify(&signature, &digest));
        assert!(mpc.verify(message, &signature, Some(MessageHash::Sha256)).unwrap());

        let recovered =
            Secp256k1Curve::recover_public_key(&digest, &signature.r, &signature.s, signature.recid).unwrap();
        assert_eq!(recovered, combined[0].x_share.y);
    }
}

#[test]
fn keccak_signature_recovers_eth_key() {
    let mpc = ecdsa();
    let (_, combined) = ecdsa_keygen(&mpc);
    let message = b"\x19Ethereum Signed Message:\n5hello";
    let signature = exchange(&mpc, &combined[0], &combined[2], message, MessageHash::Keccak256);

    let digest = MessageHash::Keccak256.digest(message);
    assert!(secp_verify(&signature, &digest));
    let rsv = signature.to_rsv();
    assert!(rsv[64] == 27 || rsv[64] == 28);
}

#[test]
fn combined_keychain_agrees_across_parties() {
    let mpc = ecdsa();
    let (shares, combined) = ecdsa_keygen(&mpc);
    let keychain = format!(
        "{}{}",
        hex::encode(combined[0].x_share.y),
        hex::encode(combined[0].x_share.chaincode)
    );
    for i in 1..=3u32 {
        let key = create_combined_key(&mpc, &shares[(i - 1) as usize], &ecdsa_received(&shares, i), &keychain)
            .unwrap();
        assert_eq!(key.common_keychain.to_hex(), keychain);
    }
}

#[test]
fn bitgo_and_backup_recover() {
    let mpc = ecdsa();
    let (shares, combined) = ecdsa_keygen(&mpc);
    let keychain = format!(
        "{}{}",
        hex::encode(combined[0].x_share.y),
        hex::encode(combined[0].x_share.chaincode)
    );
    let backup = create_combined_key(&mpc, &shares[1], &ecdsa_received(&shares, 2), &keychain).unwrap();
    let bitgo = create_combined_key(&mpc, &shares[2], &ecdsa_received(&shares, 3), &keychain).unwrap();

    let signature = sign_with_two_parties(
        &mpc,
        &backup.signing_material,
        &bitgo.signing_material,
        b"recover",
        None,
    )
    .unwrap();
    assert_eq!(signature.y, combined[0].x_share.y);
}

#[test]
fn small_paillier_modulus_rejected() {
    let strict = Ecdsa::with_settings(TssSettings::high());
    let err = strict
        .key_share_with_paillier(1, 2, 3, &paillier_key(0))
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidConfig);

    // Shares produced under a 2048-bit minimum do not combine under 3072
    let (shares, _) = ecdsa_keygen(&ecdsa());
    let err = strict
        .key_combine(&shares[0].p_share, &ecdsa_received(&shares, 1))
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidShare);
}

#[test]
fn k_share_with_foreign_paillier_key_rejected() {
    let mpc = ecdsa();
    let (_, combined) = ecdsa_keygen(&mpc);
    let mut start = mpc
        .sign_share(&combined[0].x_share, &combined[0].y_shares[&2])
        .unwrap();
    start.k_share.n = paillier_key(3).public_key().n().clone();

    let err = mpc
        .sign_convert(&SignConvert::Respond {
            x_share: combined[1].x_share.clone(),
            y_share: combined[1].y_shares[&1].clone(),
            k_share: start.k_share,
        })
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidShare);
}

#[test]
fn d_share_from_self_rejected() {
    let mpc = ecdsa();
    let (_, combined) = ecdsa_keygen(&mpc);
    let a_start = mpc
        .sign_share(&combined[0].x_share, &combined[0].y_shares[&2])
        .unwrap();
    let b_resp = mpc
        .sign_convert(&SignConvert::Respond {
            x_share: combined[1].x_share.clone(),
            y_share: combined[1].y_shares[&1].clone(),
            k_share: a_start.k_share.clone(),
        })
        .unwrap();
    let a_conv = mpc
        .sign_convert(&SignConvert::Accept {
            w_share: a_start.w_share.clone(),
            a_share: b_resp.a_share.clone().unwrap(),
        })
        .unwrap();
    let a_comb = mpc.sign_combine(a_conv.g_share.as_ref().unwrap(), 2).unwrap();

    let mut own = a_comb.d_share.clone();
    own.i = 1;
    own.j = 1;
    let err = mpc.sign(b"x", &a_comb.o_share, &own, None).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidShare);
}

#[test]
fn sign_convert_steps_serialize_with_tag() {
    let mpc = ecdsa();
    let (_, combined) = ecdsa_keygen(&mpc);
    let start = mpc
        .sign_share(&combined[0].x_share, &combined[0].y_shares[&3])
        .unwrap();
    let step = SignConvert::Respond {
        x_share: combined[2].x_share.clone(),
        y_share: combined[2].y_shares[&1].clone(),
        k_share: start.k_share,
    };
    let json = serde_json::to_value(&step).unwrap();
    assert_eq!(json["step"], "respond");
    assert!(json["kShare"]["k"].is_string());
}
