//! ECDSA wallet flows

use serde::{Deserialize, Serialize};

use super::{check_keychain, sort_received, CommonKeychain};
use crate::crypto::curves::CurveType;
use crate::error::{HawalaError, HawalaResult};
use crate::log_info;
use crate::tss::ecdsa::{Ecdsa, KeyCombined, KeyShare, NShare, PShare, SignConvert, Signature};
use crate::types::MessageHash;

const MODULE: &str = "wallet::ecdsa";

/// Everything a party must keep to sign later.
///
/// Holds the N-shares received from the two other positions; the slot of
/// the holder's own position stays empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningMaterial {
    pub p_share: PShare,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitgo_n_share: Option<NShare>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_n_share: Option<NShare>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_n_share: Option<NShare>,
}

impl SigningMaterial {
    fn n_shares(&self) -> Vec<NShare> {
        [&self.user_n_share, &self.backup_n_share, &self.bitgo_n_share]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct CombinedKey {
    pub key_combined: KeyCombined,
    pub signing_material: SigningMaterial,
    pub common_keychain: CommonKeychain,
}

/// Combine a key and check it against the agreed common keychain.
///
/// Any position may combine; it needs the N-shares of both other positions.
pub fn create_combined_key(
    mpc: &Ecdsa,
    key_share: &KeyShare,
    n_shares: &[NShare],
    common_keychain: &str,
) -> HawalaResult<CombinedKey> {
    let received = sort_received(key_share.p_share.i, n_shares, |share| share.j, "N Share")?;

    let key_combined = mpc.key_combine(&key_share.p_share, n_shares)?;
    let combined = CommonKeychain::new(
        CurveType::Secp256k1,
        &key_combined.x_share.y,
        key_combined.x_share.chaincode,
    )?;
    let expected = CommonKeychain::from_hex(CurveType::Secp256k1, common_keychain)?;
    check_keychain(&combined, &expected)?;

    log_info!(MODULE, "combined key created", index = key_share.p_share.i);

    Ok(CombinedKey {
        key_combined,
        signing_material: SigningMaterial {
            p_share: key_share.p_share.clone(),
            bitgo_n_share: received.bitgo,
            backup_n_share: received.backup,
            user_n_share: received.user,
        },
        common_keychain: combined,
    })
}

/// Run the full two-signer exchange locally, as in offline recovery.
///
/// `a` starts the exchange; both parties must be distinct positions of the
/// same key.
pub fn sign_with_two_parties(
    mpc: &Ecdsa,
    a: &SigningMaterial,
    b: &SigningMaterial,
    message: &[u8],
    hash: Option<MessageHash>,
) -> HawalaResult<Signature> {
    let a_key = mpc.key_combine(&a.p_share, &a.n_shares())?;
    let b_key = mpc.key_combine(&b.p_share, &b.n_shares())?;
    if a_key.x_share.y != b_key.x_share.y {
        return Err(HawalaError::invalid_share(
            "Signing materials belong to different keys",
        ));
    }
    let (ai, bi) = (a_key.x_share.i, b_key.x_share.i);
    let a_y = a_key
        .y_shares
        .get(&bi)
        .ok_or_else(|| HawalaError::invalid_share(format!("No YShare for participant {}", bi)))?;
    let b_y = b_key
        .y_shares
        .get(&ai)
        .ok_or_else(|| HawalaError::invalid_share(format!("No YShare for participant {}", ai)))?;

    let a_start = mpc.sign_share(&a_key.x_share, a_y)?;
    let b_respond = mpc.sign_convert(&SignConvert::Respond {
        x_share: b_key.x_share.clone(),
        y_share: b_y.clone(),
        k_share: a_start.k_share,
    })?;
    let a_share = b_respond
        .a_share
        .ok_or_else(|| HawalaError::internal("Respond step produced no AShare"))?;
    let b_share = b_respond
        .b_share
        .ok_or_else(|| HawalaError::internal("Respond step produced no BShare"))?;

    let a_accept = mpc.sign_convert(&SignConvert::Accept {
        w_share: a_start.w_share,
        a_share,
    })?;
    let mu_share = a_accept
        .mu_share
        .ok_or_else(|| HawalaError::internal("Accept step produced no MUShare"))?;
    let a_g = a_accept
        .g_share
        .ok_or_else(|| HawalaError::internal("Accept step produced no GShare"))?;

    let b_g = mpc
        .sign_convert(&SignConvert::Finalize { b_share, mu_share })?
        .g_share
        .ok_or_else(|| HawalaError::internal("Finalize step produced no GShare"))?;

    let a_combine = mpc.sign_combine(&a_g, bi)?;
    let b_combine = mpc.sign_combine(&b_g, ai)?;

    let a_s = mpc.sign(message, &a_combine.o_share, &b_combine.d_share, hash)?;
    let b_s = mpc.sign(message, &b_combine.o_share, &a_combine.d_share, hash)?;
    let signature = mpc.construct_signature(&[a_s, b_s])?;

    if !mpc.verify(message, &signature, hash)? {
        return Err(HawalaError::verification_failed(
            "Combined signature does not verify under the common key",
        ));
    }

    log_info!(MODULE, "two-party signature created", first = ai, second = bi);

    Ok(signature)
}
