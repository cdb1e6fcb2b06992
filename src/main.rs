use rust_decimal::Decimal;
use zeroize::Zeroizing;

use remit::RemitError;
use remit::config::fetch_config;
use remit::engine::{TransferEngine, TransferKind, TransferRequest};
use remit::store::HttpRecordStore;

/// Demo driver: `remit <user-id> <from-wallet> <to-wallet> <amount> [reason]`
/// with the credential supplied via `REMIT_CREDENTIAL`. Pass
/// `REMIT_EXTERNAL=1` for an external transfer.
#[tokio::main]
async fn main() -> Result<(), RemitError> {
    // Initialize tracing subscriber for logging output.
    tracing_subscriber::fmt::init();

    let config = fetch_config()?;

    let mut args = std::env::args().skip(1);
    let (Some(user), Some(from), Some(to), Some(amount)) =
        (args.next(), args.next(), args.next(), args.next())
    else {
        return Err(RemitError::Config(
            "usage: remit <user-id> <from-wallet> <to-wallet> <amount> [reason]".to_string(),
        ));
    };
    let amount: Decimal = amount
        .parse()
        .map_err(|e| RemitError::Config(format!("invalid amount: {e}")))?;
    let credential = std::env::var("REMIT_CREDENTIAL")
        .map_err(|_| RemitError::Config("REMIT_CREDENTIAL is not set".to_string()))?;
    let kind = match std::env::var("REMIT_EXTERNAL").as_deref() {
        Ok("1") => TransferKind::External,
        _ => TransferKind::Internal,
    };

    let store = HttpRecordStore::new(&config.store)?;
    let engine = TransferEngine::new(store, config.fees);

    let receipt = engine
        .transfer(TransferRequest {
            initiator_user_id: user,
            from_wallet_id: from,
            to_wallet_id: to,
            amount,
            reason: args.next(),
            credential: Zeroizing::new(credential),
            kind,
        })
        .await?;

    println!(
        "transfer {} complete: charged {} (total debit {})",
        receipt.transaction_id, receipt.service_charge, receipt.total_debit
    );

    Ok(())
}
