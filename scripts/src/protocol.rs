//! End-to-end protocol deployment orchestration
//!
//! A deployment run walks a fixed sequence of states: every unit is
//! constructed in dependency order, the cyclic cross-references are wired,
//! the economic and authority parameters are applied, and the address record
//! is persisted. Nothing is checkpointed between states; a run that fails
//! midway leaves on-chain state for operator inspection and must not simply
//! be re-executed, since re-running from the start would deploy duplicate
//! units.

use std::{collections::BTreeMap, path::Path};

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, U256},
};
use bigdecimal::{BigDecimal, RoundingMode};
use tracing::info;
use zephyr_abi::{IFactoryRegistry, IMinter, IPoolFactory, IVoter, IVotingEscrow};

use crate::{
    cli::TokenKind,
    config::{MinterDistribution, NetworkConstants},
    constants::{AIRDROPPER_BALANCE, STABLE_POOL_FEE, TOKEN_DECIMALS, VOLATILE_POOL_FEE},
    deployer::UnitDeployer,
    errors::ScriptError,
    graph::{ProtocolGraph, Role},
    output::{build_output, write_output},
    utils::{send_tx, Client},
    wiring::{execute_wiring, wiring_plan},
};

/// Deploy, wire, parameterize and persist the full protocol
pub async fn deploy_protocol(
    client: &Client,
    deployer: &UnitDeployer,
    token: TokenKind,
    constants: &NetworkConstants,
    deployments_path: &Path,
) -> Result<(), ScriptError> {
    info!("constructing protocol units");
    let graph = construct_units(deployer, token, constants).await?;

    info!("wiring cross-references");
    let mut whitelist = constants.whitelist_tokens.clone();
    whitelist.push(graph.require(Role::Token)?);
    execute_wiring(deployer, &graph, &wiring_plan(whitelist)).await?;

    info!("applying protocol parameters");
    apply_parameters(client, &graph, constants).await?;

    info!("persisting deployed addresses");
    let output = build_output(&graph, token)?;
    write_output(deployments_path, &output);

    Ok(())
}

/// Shorthand for an address constructor argument
fn addr(address: Address) -> DynSolValue {
    DynSolValue::Address(address)
}

/// Construct every protocol unit in dependency order.
///
/// Every constructor argument is pulled through the graph, so a unit
/// constructed out of order fails with an unresolved dependency before any
/// transaction is built.
async fn construct_units(
    deployer: &UnitDeployer,
    token: TokenKind,
    constants: &NetworkConstants,
) -> Result<ProtocolGraph, ScriptError> {
    let mut graph = ProtocolGraph::new();
    let no_libs = BTreeMap::new();

    let unit = deployer.deploy(token.artifact(), &no_libs, &[]).await?;
    graph.insert(Role::Token, unit)?;

    let unit = deployer.deploy("Pool", &no_libs, &[]).await?;
    graph.insert(Role::PoolImplementation, unit)?;

    let unit = deployer
        .deploy(
            "PoolFactory",
            &no_libs,
            &[addr(graph.require(Role::PoolImplementation)?)],
        )
        .await?;
    graph.insert(Role::PoolFactory, unit)?;

    let unit = deployer.deploy("VotingRewardsFactory", &no_libs, &[]).await?;
    graph.insert(Role::VotingRewardsFactory, unit)?;

    let unit = deployer.deploy("GaugeFactory", &no_libs, &[]).await?;
    graph.insert(Role::GaugeFactory, unit)?;

    let unit = deployer.deploy("ManagedRewardsFactory", &no_libs, &[]).await?;
    graph.insert(Role::ManagedRewardsFactory, unit)?;

    // The registry's constructor takes the four factories in exactly this
    // order
    let unit = deployer
        .deploy(
            "FactoryRegistry",
            &no_libs,
            &[
                addr(graph.require(Role::PoolFactory)?),
                addr(graph.require(Role::VotingRewardsFactory)?),
                addr(graph.require(Role::GaugeFactory)?),
                addr(graph.require(Role::ManagedRewardsFactory)?),
            ],
        )
        .await?;
    graph.insert(Role::FactoryRegistry, unit)?;

    let unit = deployer.deploy("Forwarder", &no_libs, &[]).await?;
    graph.insert(Role::Forwarder, unit)?;

    // The escrow's logic libraries are standalone units referenced by
    // address, not re-deployed per consumer
    let unit = deployer.deploy("BalanceLogicLibrary", &no_libs, &[]).await?;
    graph.insert(Role::BalanceLogicLibrary, unit)?;

    let unit = deployer.deploy("DelegationLogicLibrary", &no_libs, &[]).await?;
    graph.insert(Role::DelegationLogicLibrary, unit)?;

    let escrow_libs = BTreeMap::from([
        (
            "BalanceLogicLibrary".to_string(),
            graph.require(Role::BalanceLogicLibrary)?,
        ),
        (
            "DelegationLogicLibrary".to_string(),
            graph.require(Role::DelegationLogicLibrary)?,
        ),
    ]);
    let unit = deployer
        .deploy(
            "VotingEscrow",
            &escrow_libs,
            &[
                addr(graph.require(Role::Forwarder)?),
                addr(graph.require(Role::Token)?),
                addr(graph.require(Role::FactoryRegistry)?),
            ],
        )
        .await?;
    graph.insert(Role::VotingEscrow, unit)?;

    let unit = deployer.deploy("Trig", &no_libs, &[]).await?;
    graph.insert(Role::TrigLibrary, unit)?;

    let unit = deployer.deploy("PerlinNoise", &no_libs, &[]).await?;
    graph.insert(Role::NoiseLibrary, unit)?;

    let art_libs = BTreeMap::from([
        ("Trig".to_string(), graph.require(Role::TrigLibrary)?),
        ("PerlinNoise".to_string(), graph.require(Role::NoiseLibrary)?),
    ]);
    let unit = deployer
        .deploy(
            "VeArtProxy",
            &art_libs,
            &[addr(graph.require(Role::VotingEscrow)?)],
        )
        .await?;
    graph.insert(Role::ArtProxy, unit)?;

    let unit = deployer
        .deploy(
            "RewardsDistributor",
            &no_libs,
            &[addr(graph.require(Role::VotingEscrow)?)],
        )
        .await?;
    graph.insert(Role::Distributor, unit)?;

    let unit = deployer
        .deploy(
            "Voter",
            &no_libs,
            &[
                addr(graph.require(Role::Forwarder)?),
                addr(graph.require(Role::VotingEscrow)?),
                addr(graph.require(Role::FactoryRegistry)?),
            ],
        )
        .await?;
    graph.insert(Role::Voter, unit)?;

    let unit = deployer
        .deploy(
            "Router",
            &no_libs,
            &[
                addr(graph.require(Role::Forwarder)?),
                addr(graph.require(Role::FactoryRegistry)?),
                addr(graph.require(Role::PoolFactory)?),
                addr(graph.require(Role::Voter)?),
                addr(constants.weth),
            ],
        )
        .await?;
    graph.insert(Role::Router, unit)?;

    let unit = deployer
        .deploy(
            "Minter",
            &no_libs,
            &[
                addr(graph.require(Role::Voter)?),
                addr(graph.require(Role::VotingEscrow)?),
                addr(graph.require(Role::Distributor)?),
            ],
        )
        .await?;
    graph.insert(Role::Minter, unit)?;

    let unit = deployer
        .deploy(
            "AirdropDistributor",
            &no_libs,
            &[addr(graph.require(Role::VotingEscrow)?)],
        )
        .await?;
    graph.insert(Role::AirdropDistributor, unit)?;

    Ok(graph)
}

/// Apply the initial economic parameters and transfer authority to the
/// configured addresses.
///
/// The authority transfers are irreversible; past this point the deployer
/// account holds no special capability over the protocol.
async fn apply_parameters(
    client: &Client,
    graph: &ProtocolGraph,
    constants: &NetworkConstants,
) -> Result<(), ScriptError> {
    let team = constants.team;
    let factory = IPoolFactory::new(graph.require(Role::PoolFactory)?, client.clone());
    let escrow = IVotingEscrow::new(graph.require(Role::VotingEscrow)?, client.clone());
    let voter = IVoter::new(graph.require(Role::Voter)?, client.clone());
    let minter = IMinter::new(graph.require(Role::Minter)?, client.clone());
    let registry = IFactoryRegistry::new(graph.require(Role::FactoryRegistry)?, client.clone());

    send_tx(factory.setFee(true, U256::from(STABLE_POOL_FEE))).await?;
    send_tx(factory.setFee(false, U256::from(VOLATILE_POOL_FEE))).await?;

    let distribution =
        build_distribution(graph.require(Role::AirdropDistributor)?, &constants.minter)?;
    send_tx(minter.initialize(distribution)).await?;

    send_tx(escrow.setTeam(team)).await?;
    send_tx(minter.setTeam(team)).await?;
    send_tx(factory.setPauser(team)).await?;
    send_tx(voter.setEmergencyCouncil(team)).await?;
    send_tx(voter.setEpochGovernor(team)).await?;
    send_tx(voter.setGovernor(team)).await?;
    send_tx(registry.transferOwnership(team)).await?;

    send_tx(factory.setFeeManager(constants.fee_manager)).await?;
    send_tx(factory.setVoter(graph.require(Role::Voter)?)).await?;

    Ok(())
}

/// Build the minter's initial distribution lists.
///
/// The airdrop distributor's opening balance leads the liquid lists, so the
/// distributor is funded in the same call that seeds every other wallet.
fn build_distribution(
    airdrop_distributor: Address,
    minter: &MinterDistribution,
) -> Result<IMinter::DistributionParams, ScriptError> {
    let mut liquid_wallets = vec![airdrop_distributor];
    let mut liquid_amounts = vec![airdropper_float()];
    for drop in &minter.liquid {
        liquid_wallets.push(drop.wallet);
        liquid_amounts.push(whole_token_wei(&drop.amount)?);
    }

    let mut locked_wallets = Vec::new();
    let mut locked_amounts = Vec::new();
    for drop in &minter.locked {
        locked_wallets.push(drop.wallet);
        locked_amounts.push(whole_token_wei(&drop.amount)?);
    }

    Ok(IMinter::DistributionParams {
        liquidWallets: liquid_wallets,
        liquidAmounts: liquid_amounts,
        lockedWallets: locked_wallets,
        lockedAmounts: locked_amounts,
    })
}

/// The airdrop distributor's opening balance in wei
fn airdropper_float() -> U256 {
    U256::from(AIRDROPPER_BALANCE) * U256::from(10u64).pow(U256::from(TOKEN_DECIMALS))
}

/// Truncate a configured wei amount to whole tokens, then scale back to wei
fn whole_token_wei(amount: &BigDecimal) -> Result<U256, ScriptError> {
    let scale = BigDecimal::from(10u64.pow(TOKEN_DECIMALS));
    let tokens = (amount / &scale).with_scale_round(0, RoundingMode::Down);
    let wei = (tokens * scale).normalized();

    U256::from_str_radix(&wei.to_string(), 10)
        .map_err(|e| ScriptError::CalldataConstruction(format!("amount {amount}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use alloy::primitives::{Address, U256};
    use bigdecimal::BigDecimal;

    use super::{airdropper_float, build_distribution, whole_token_wei};
    use crate::config::{MinterDistribution, WalletAmount};

    /// Shorthand for building an exact decimal from a literal
    fn dec(raw: &str) -> BigDecimal {
        BigDecimal::from_str(raw).unwrap()
    }

    #[test]
    fn test_airdropper_float_is_two_hundred_million_tokens() {
        let expected = U256::from_str_radix("200000000000000000000000000", 10).unwrap();
        assert_eq!(airdropper_float(), expected);
    }

    #[test]
    fn test_whole_token_truncation() {
        // 5.5 tokens of wei truncate to 5 whole tokens
        let wei = whole_token_wei(&dec("5500000000000000000")).unwrap();
        assert_eq!(wei, U256::from_str_radix("5000000000000000000", 10).unwrap());

        let wei = whole_token_wei(&dec("2000000000000000000")).unwrap();
        assert_eq!(wei, U256::from_str_radix("2000000000000000000", 10).unwrap());
    }

    #[test]
    fn test_distribution_leads_with_the_airdrop_distributor() {
        let distributor = Address::random();
        let wallet = Address::random();
        let minter = MinterDistribution {
            locked: vec![WalletAmount {
                amount: dec("3000000000000000000"),
                wallet,
            }],
            liquid: vec![WalletAmount {
                amount: dec("1000000000000000000"),
                wallet,
            }],
        };

        let params = build_distribution(distributor, &minter).unwrap();

        assert_eq!(params.liquidWallets[0], distributor);
        assert_eq!(params.liquidAmounts[0], airdropper_float());
        assert_eq!(params.liquidWallets.len(), 2);
        assert_eq!(params.liquidAmounts.len(), 2);
        assert_eq!(params.lockedWallets, vec![wallet]);
        assert_eq!(
            params.lockedAmounts,
            vec![U256::from_str_radix("3000000000000000000", 10).unwrap()]
        );
    }
}
