//! Utilities for the deploy scripts.

use std::str::FromStr;

use alloy::{
    contract::{CallBuilder, CallDecoder},
    eips::BlockNumberOrTag,
    network::Ethereum,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionReceipt,
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};

use crate::{constants::PRIORITY_FEE_DIVISOR, errors::ScriptError};

/// The provider type shared by all scripts
pub type Client = DynProvider;

/// The call builder type produced by script contract handles
pub type ScriptCallBuilder<'a, C> = CallBuilder<&'a Client, C, Ethereum>;

/// Sets up the client with which contracts are deployed and called,
/// signing with the given private key
pub fn setup_client(priv_key: &str, rpc_url: &str) -> Result<Client, ScriptError> {
    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    let provider = ProviderBuilder::new()
        .wallet(signer)
        .with_simple_nonce_management()
        .connect_http(url);

    Ok(DynProvider::new(provider))
}

/// Send a transaction, await its confirmation, and check that it succeeded
pub async fn send_tx<C: CallDecoder>(
    tx: ScriptCallBuilder<'_, C>,
) -> Result<TransactionReceipt, ScriptError> {
    let pending = tx
        .send()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    let receipt = pending
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    if !receipt.status() {
        return Err(ScriptError::ContractInteraction(format!(
            "transaction {} reverted",
            receipt.transaction_hash
        )));
    }

    Ok(receipt)
}

/// Derive the fee parameters for a transaction from the latest base fee.
///
/// Returns `(max_fee_per_gas, max_priority_fee_per_gas)`.
pub async fn derive_fees(client: &Client) -> Result<(u128, u128), ScriptError> {
    let block = client
        .get_block_by_number(BlockNumberOrTag::Latest)
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
        .ok_or_else(|| ScriptError::ContractInteraction("no latest block".to_string()))?;

    let base_fee = block.header.base_fee_per_gas.ok_or_else(|| {
        ScriptError::ContractInteraction("latest block carries no base fee".to_string())
    })? as u128;

    let priority_fee = base_fee / PRIORITY_FEE_DIVISOR;
    Ok((base_fee * 2 + priority_fee, priority_fee))
}
