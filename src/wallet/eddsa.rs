//! EdDSA wallet flows
//!
//! Position layout: user = 1, backup = 2, bitgo = 3. During normal
//! operation the user signs together with bitgo; recovery signs offline
//! with the user and backup keys.

use serde::{Deserialize, Serialize};

use super::{check_keychain, expect_position, sort_received, CommonKeychain};
use crate::crypto::curves::CurveType;
use crate::error::{HawalaError, HawalaResult};
use crate::log_info;
use crate::tss::eddsa::{
    Eddsa, GShare, JShare, KeyCombine, KeyShare, PShare, RShare, SignShare, UShare, YShare,
};
use crate::types::ShareKeyPosition;

const MODULE: &str = "wallet::eddsa";

/// Everything a party must keep to sign later.
///
/// Holds the Y-shares received from the two other positions; the slot of
/// the holder's own position stays empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningMaterial {
    pub u_share: UShare,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitgo_y_share: Option<YShare>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_y_share: Option<YShare>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_y_share: Option<YShare>,
}

impl SigningMaterial {
    /// Y-shares received from the other two positions
    fn y_shares(&self) -> Vec<YShare> {
        [&self.user_y_share, &self.backup_y_share, &self.bitgo_y_share]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }

    fn bitgo_y_share(&self) -> HawalaResult<&YShare> {
        self.bitgo_y_share
            .as_ref()
            .ok_or_else(|| HawalaError::invalid_share("Signing material has no bitgo Y Share"))
    }
}

#[derive(Debug, Clone)]
pub struct CombinedKey {
    pub key_combine: KeyCombine,
    pub signing_material: SigningMaterial,
    pub common_keychain: CommonKeychain,
}

/// Combine a key and check it against the keychain all three parties
/// agreed on. Any position may combine; it needs the Y-shares of both
/// other positions.
pub fn create_combined_key(
    mpc: &Eddsa,
    key_share: &KeyShare,
    y_shares: &[YShare],
    common_keychain: &str,
) -> HawalaResult<CombinedKey> {
    let received = sort_received(key_share.u_share.i, y_shares, |share| share.j, "Y Share")?;

    let key_combine = mpc.key_combine(&key_share.u_share, y_shares)?;
    let combined = CommonKeychain::new(
        CurveType::Ed25519,
        &key_combine.p_share.y,
        key_combine.p_share.chaincode,
    )?;
    let expected = CommonKeychain::from_hex(CurveType::Ed25519, common_keychain)?;
    check_keychain(&combined, &expected)?;

    log_info!(MODULE, "combined key created", index = key_share.u_share.i);

    Ok(CombinedKey {
        key_combine,
        signing_material: SigningMaterial {
            u_share: key_share.u_share.clone(),
            bitgo_y_share: received.bitgo,
            backup_y_share: received.backup,
            user_y_share: received.user,
        },
        common_keychain: combined,
    })
}

/// Start a user + bitgo signature
pub fn create_user_sign_share(mpc: &Eddsa, payload: &[u8], p_share: &PShare) -> HawalaResult<SignShare> {
    expect_position(p_share.i, ShareKeyPosition::User, "PShare")?;
    let bitgo = JShare {
        i: ShareKeyPosition::Bitgo.index(),
        j: ShareKeyPosition::User.index(),
    };
    mpc.sign_share(payload, p_share, &[bitgo], None)
}

/// The user's partial signature for bitgo.
///
/// The backup key takes no part, so its keygen y-share stands in for it.
pub fn create_user_to_bitgo_g_share(
    mpc: &Eddsa,
    user_sign_share: &SignShare,
    bitgo_to_user_r_share: &RShare,
    backup_to_user_y_share: &YShare,
    payload: &[u8],
) -> HawalaResult<GShare> {
    let user = ShareKeyPosition::User.index();
    expect_position(user_sign_share.x_share.i, ShareKeyPosition::User, "XShare")?;
    if bitgo_to_user_r_share.i != user || bitgo_to_user_r_share.j != ShareKeyPosition::Bitgo.index() {
        return Err(HawalaError::invalid_share(
            "Invalid RShare, is not from BitGo to User",
        ));
    }
    if backup_to_user_y_share.i != user || backup_to_user_y_share.j != ShareKeyPosition::Backup.index() {
        return Err(HawalaError::invalid_share(
            "Invalid YShare, is not backup key",
        ));
    }

    mpc.sign(
        payload,
        &user_sign_share.x_share,
        std::slice::from_ref(bitgo_to_user_r_share),
        std::slice::from_ref(backup_to_user_y_share),
    )
}

/// Sign offline with the user and backup keys; returns `R || S`
pub fn get_tss_signature(
    mpc: &Eddsa,
    user_material: &SigningMaterial,
    backup_material: &SigningMaterial,
    payload: &[u8],
) -> HawalaResult<[u8; 64]> {
    let user = ShareKeyPosition::User.index();
    let backup = ShareKeyPosition::Backup.index();
    expect_position(user_material.u_share.i, ShareKeyPosition::User, "signing material")?;
    expect_position(backup_material.u_share.i, ShareKeyPosition::Backup, "signing material")?;
    if user_material.backup_y_share.is_none() || backup_material.user_y_share.is_none() {
        return Err(HawalaError::invalid_share(
            "Recovery needs the backup Y share of the user and the user Y share of the backup",
        ));
    }
    let user_bitgo_y_share = user_material.bitgo_y_share()?;
    let backup_bitgo_y_share = backup_material.bitgo_y_share()?;

    let user_combine = mpc.key_combine(&user_material.u_share, &user_material.y_shares())?;
    let backup_combine = mpc.key_combine(&backup_material.u_share, &backup_material.y_shares())?;

    let user_sign = mpc.sign_share(
        payload,
        &user_combine.p_share,
        &[JShare { i: backup, j: user }],
        None,
    )?;
    let backup_sign = mpc.sign_share(
        payload,
        &backup_combine.p_share,
        &[JShare { i: user, j: backup }],
        None,
    )?;

    let to_user = backup_sign
        .r_shares
        .get(&user)
        .ok_or_else(|| HawalaError::internal("Backup produced no RShare for the user"))?;
    let to_backup = user_sign
        .r_shares
        .get(&backup)
        .ok_or_else(|| HawalaError::internal("User produced no RShare for the backup"))?;

    let user_g = mpc.sign(
        payload,
        &user_sign.x_share,
        std::slice::from_ref(to_user),
        std::slice::from_ref(user_bitgo_y_share),
    )?;
    let backup_g = mpc.sign(
        payload,
        &backup_sign.x_share,
        std::slice::from_ref(to_backup),
        std::slice::from_ref(backup_bitgo_y_share),
    )?;

    let signature = mpc.sign_combine(&[user_g, backup_g])?;
    if !mpc.verify(payload, &signature)? {
        return Err(HawalaError::verification_failed(
            "Combined signature does not verify under the common key",
        ));
    }

    log_info!(MODULE, "recovery signature created", payload_len = payload.len());

    Ok(signature.to_bytes())
}
