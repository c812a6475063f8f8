//! Implementations of the deploy script commands

use std::{collections::BTreeMap, path::Path};

use alloy::{dyn_abi::DynSolValue, primitives::Address};
use tracing::info;
use zephyr_abi::{
    IPoolFactory::{self, IPoolFactoryInstance},
    IProtocolGovernor,
    IVoter::{self, IVoterInstance},
};

use crate::{
    airdrop,
    cli::{
        DeployGaugesAndPoolsArgs, DeployGovernorsArgs, DeployProtocolArgs, DistributeAirdropArgs,
    },
    config::NetworkConstants,
    constants::{
        AIRDROP_DISTRIBUTOR_KEY, FORWARDER_KEY, MINTER_KEY, POOL_CREATION_GAS_LIMIT,
        POOL_FACTORY_KEY, VOTER_KEY, VOTING_ESCROW_KEY,
    },
    deployer::UnitDeployer,
    errors::ScriptError,
    output::read_deployment,
    protocol,
    utils::{send_tx, Client},
};

/// Deploy, wire and parameterize the full protocol, then persist the
/// address record
pub async fn deploy_protocol(
    args: DeployProtocolArgs,
    client: Client,
    deployments_path: &Path,
) -> Result<(), ScriptError> {
    let constants = NetworkConstants::load(&args.constants)?;
    let deployer = UnitDeployer::new(client.clone(), args.artifacts);

    protocol::deploy_protocol(&client, &deployer, args.token, &constants, deployments_path).await
}

/// Create the configured pools and a gauge for each, reading the deployed
/// addresses from the persisted record
pub async fn deploy_gauges_and_pools(
    args: DeployGaugesAndPoolsArgs,
    client: Client,
    deployments_path: &Path,
) -> Result<(), ScriptError> {
    let constants = NetworkConstants::load(&args.constants)?;

    let factory_address = read_deployment(POOL_FACTORY_KEY, deployments_path)?;
    let factory = IPoolFactory::new(factory_address, client.clone());
    let voter = IVoter::new(read_deployment(VOTER_KEY, deployments_path)?, client.clone());
    let token = read_deployment(args.token.symbol(), deployments_path)?;

    for pool in &constants.pools {
        create_pool_and_gauge(
            &factory,
            &voter,
            factory_address,
            pool.token_a,
            pool.token_b,
            pool.stable,
        )
        .await?;
    }

    for pool in &constants.token_pools {
        create_pool_and_gauge(&factory, &voter, factory_address, token, pool.token, pool.stable)
            .await?;
    }

    Ok(())
}

/// Create one pool and its gauge, awaiting each transaction in turn
async fn create_pool_and_gauge(
    factory: &IPoolFactoryInstance<Client>,
    voter: &IVoterInstance<Client>,
    factory_address: Address,
    token_a: Address,
    token_b: Address,
    stable: bool,
) -> Result<(), ScriptError> {
    send_tx(
        factory
            .createPool(token_a, token_b, stable)
            .gas(POOL_CREATION_GAS_LIMIT),
    )
    .await?;

    let pool = factory
        .getPool(token_a, token_b, stable)
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    let receipt = send_tx(
        voter
            .createGauge(factory_address, pool)
            .gas(POOL_CREATION_GAS_LIMIT),
    )
    .await?;

    info!(
        "gauge for pool {:#x} created in {}",
        pool, receipt.transaction_hash
    );

    Ok(())
}

/// Deploy the protocol governor and the epoch governor against the
/// persisted deployment
pub async fn deploy_governors(
    args: DeployGovernorsArgs,
    client: Client,
    deployments_path: &Path,
) -> Result<(), ScriptError> {
    let constants = NetworkConstants::load(&args.constants)?;
    let deployer = UnitDeployer::new(client.clone(), args.artifacts);

    let escrow = read_deployment(VOTING_ESCROW_KEY, deployments_path)?;
    let forwarder = read_deployment(FORWARDER_KEY, deployments_path)?;
    let minter = read_deployment(MINTER_KEY, deployments_path)?;

    let no_libs = BTreeMap::new();
    let governor = deployer
        .deploy("ProtocolGovernor", &no_libs, &[DynSolValue::Address(escrow)])
        .await?;
    let epoch_governor = deployer
        .deploy(
            "EpochGovernor",
            &no_libs,
            &[
                DynSolValue::Address(forwarder),
                DynSolValue::Address(escrow),
                DynSolValue::Address(minter),
            ],
        )
        .await?;

    let governor = IProtocolGovernor::new(governor.address, client.clone());
    send_tx(governor.setVetoer(constants.team)).await?;

    info!("epoch governor deployed at {:#x}", epoch_governor.address);

    Ok(())
}

/// Distribute the airdrop through the deployed distributor
pub async fn distribute_airdrop(
    args: DistributeAirdropArgs,
    client: Client,
    deployments_path: &Path,
) -> Result<(), ScriptError> {
    let distributor = read_deployment(AIRDROP_DISTRIBUTOR_KEY, deployments_path)?;
    let entries = airdrop::read_airdrop_entries(&args.airdrops)?;

    airdrop::distribute(&client, distributor, entries).await
}
