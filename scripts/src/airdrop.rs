//! The batched airdrop distribution engine
//!
//! Recipient amounts are reconciled against the fixed allocation with exact
//! decimal arithmetic, rendered as plain decimal strings, and paid out in
//! bounded batches of one transaction each. Batches are strictly sequential:
//! the sender's nonce orders them, and a failed batch must halt the run
//! rather than leave unpredictable gaps. Confirmed batches stand; there is
//! no retry and no resume.

use std::{fs, path::Path};

use alloy::primitives::{Address, U256};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use tracing::info;
use zephyr_abi::IAirdropDistributor;

use crate::{
    config::deserialize_amount,
    constants::{AIRDROP_BATCH_GAS_LIMIT, AIRDROP_BATCH_SIZE, AIRDROPPER_BALANCE, TOKEN_DECIMALS},
    errors::ScriptError,
    utils::{derive_fees, send_tx, Client},
};

/// A single airdrop recipient and its wei amount
#[derive(Debug, Clone, Deserialize)]
pub struct AirdropEntry {
    /// The recipient address
    pub owner: Address,
    /// The wei amount, kept at full precision
    #[serde(rename = "airdrop", deserialize_with = "deserialize_amount")]
    pub amount: BigDecimal,
}

/// The airdrop input file: the recipient list, distributor float first
#[derive(Debug, Deserialize)]
struct AirdropFile {
    /// The recipient entries
    airdrop: Vec<AirdropEntry>,
}

/// Read the airdrop recipient list from a JSON file
pub fn read_airdrop_entries(path: &Path) -> Result<Vec<AirdropEntry>, ScriptError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| ScriptError::ReadFile(format!("{}: {e}", path.display())))?;

    let file: AirdropFile = serde_json::from_str(&raw)
        .map_err(|e| ScriptError::ReadFile(format!("{}: {e}", path.display())))?;

    Ok(file.airdrop)
}

/// The total wei allocation the distribution may not exceed
pub fn configured_total() -> BigDecimal {
    BigDecimal::from(AIRDROPPER_BALANCE) * BigDecimal::from(10u64.pow(TOKEN_DECIMALS))
}

/// Reconcile the entry amounts against the configured total.
///
/// Truncation while the recipient list was produced can push the sum a few
/// wei over the allocation; the excess is removed from the first entry only,
/// which is the distributor's own float rather than an external recipient.
/// Every other entry is paid exactly what the input named.
pub fn reconcile_amounts(
    mut amounts: Vec<BigDecimal>,
    total: &BigDecimal,
) -> Result<Vec<BigDecimal>, ScriptError> {
    let sum = amounts
        .iter()
        .fold(BigDecimal::from(0), |acc, amount| acc + amount);

    if &sum > total {
        let dust = &sum - total;
        let first = amounts.first_mut().ok_or_else(|| {
            ScriptError::PrecisionOverflow("no entries to absorb the excess".to_string())
        })?;
        if *first < dust {
            return Err(ScriptError::PrecisionOverflow(format!(
                "excess {dust} exceeds the first entry {first}"
            )));
        }
        *first = &*first - &dust;
    }

    Ok(amounts)
}

/// Render amounts as plain full-precision decimal strings.
///
/// The transaction layer receives plain notation only; scientific notation
/// from the input file must not survive past this point.
pub fn canonical_amounts(amounts: &[BigDecimal]) -> Vec<String> {
    amounts
        .iter()
        .map(|amount| amount.normalized().to_string())
        .collect()
}

/// Partition recipients and amounts into contiguous bounded batches,
/// preserving input order
pub fn into_batches(
    owners: &[Address],
    amounts: &[String],
) -> Vec<(Vec<Address>, Vec<String>)> {
    owners
        .chunks(AIRDROP_BATCH_SIZE)
        .zip(amounts.chunks(AIRDROP_BATCH_SIZE))
        .map(|(owners, amounts)| (owners.to_vec(), amounts.to_vec()))
        .collect()
}

/// Parse a plain decimal string into a wei value
fn parse_wei(amount: &str) -> Result<U256, ScriptError> {
    U256::from_str_radix(amount, 10)
        .map_err(|e| ScriptError::CalldataConstruction(format!("amount {amount}: {e}")))
}

/// Distribute the airdrop in confirmed batches, then permanently disable
/// the distributor.
///
/// Each batch derives its priority fee from the latest base fee, submits one
/// transaction carrying the whole batch, and blocks until confirmation. Any
/// failure aborts the run before the next batch is submitted.
pub async fn distribute(
    client: &Client,
    distributor_address: Address,
    entries: Vec<AirdropEntry>,
) -> Result<(), ScriptError> {
    let distributor = IAirdropDistributor::new(distributor_address, client.clone());

    let (owners, amounts): (Vec<Address>, Vec<BigDecimal>) =
        entries.into_iter().map(|e| (e.owner, e.amount)).unzip();
    let amounts = reconcile_amounts(amounts, &configured_total())?;
    let amounts = canonical_amounts(&amounts);

    let mut count = 0usize;
    for (owner_batch, amount_batch) in into_batches(&owners, &amounts) {
        let wei = amount_batch
            .iter()
            .map(|amount| parse_wei(amount))
            .collect::<Result<Vec<_>, _>>()?;

        let (max_fee, priority_fee) = derive_fees(client).await?;
        let pending = distributor
            .distributeTokens(owner_batch, wei)
            .gas(AIRDROP_BATCH_GAS_LIMIT)
            .max_fee_per_gas(max_fee)
            .max_priority_fee_per_gas(priority_fee)
            .send()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

        count += 1;
        info!("batch {} sent: {}", count, pending.tx_hash());

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        if !receipt.status() {
            return Err(ScriptError::ContractInteraction(format!(
                "batch {} reverted in {}",
                count, receipt.transaction_hash
            )));
        }

        info!("batch {} confirmed: {}", count, receipt.transaction_hash);
    }

    // The distribution is complete; renouncing ownership permanently
    // disables further distributions from this contract.
    send_tx(distributor.renounceOwnership()).await?;

    Ok(())
}
