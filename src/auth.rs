//! Authorization gate for money-moving operations.
//!
//! Every mutation re-enters the initiating user's credential and checks
//! KYC approval before any ledger read performed for mutation. The gate
//! itself has no side effects.
//!
//! Credentials are compared as plaintext equality. That mirrors the
//! record store's data model, which holds credentials unhashed; it is a
//! documented security non-goal of the demo application, not a
//! recommendation.

use tracing::debug;
use zeroize::Zeroizing;

use crate::models::{KycStatus, User};
use crate::{RemitError, Result};

/// Checks that `user` is allowed to move money.
///
/// The credential comparison runs first so a caller holding the wrong
/// credential learns nothing about the account's KYC state.
///
/// # Errors
///
/// Returns [`RemitError::InvalidCredential`] on a credential mismatch
/// and [`RemitError::KycNotApproved`] when the user has not completed
/// KYC verification.
pub fn authorize(user: &User, supplied_credential: &Zeroizing<String>) -> Result<()> {
    if supplied_credential.as_str() != user.credential {
        debug!(user = %user.id, "credential mismatch");
        return Err(RemitError::InvalidCredential);
    }

    if user.kyc_status != KycStatus::Approved {
        debug!(user = %user.id, "KYC not approved");
        return Err(RemitError::KycNotApproved);
    }

    Ok(())
}
