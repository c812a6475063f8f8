//! Persisting and reading the deployed-address record
//!
//! The record is a flat JSON object mapping fixed key names to addresses,
//! written once at the end of a deployment run and consumed read-only by
//! every subsequent script.

use std::{collections::BTreeMap, fs, path::Path, str::FromStr};

use alloy::primitives::Address;
use tracing::error;

use crate::{
    cli::TokenKind,
    constants::{
        AIRDROP_DISTRIBUTOR_KEY, ART_PROXY_KEY, DISTRIBUTOR_KEY, FACTORY_REGISTRY_KEY,
        FORWARDER_KEY, GAUGE_FACTORY_KEY, MANAGED_REWARDS_FACTORY_KEY, MINTER_KEY,
        POOL_FACTORY_KEY, ROUTER_KEY, VOTER_KEY, VOTING_ESCROW_KEY, VOTING_REWARDS_FACTORY_KEY,
    },
    errors::ScriptError,
    graph::{ProtocolGraph, Role},
};

/// Build the flat key-to-address record for a completed deployment
pub fn build_output(
    graph: &ProtocolGraph,
    token: TokenKind,
) -> Result<BTreeMap<String, Address>, ScriptError> {
    let entries = [
        (AIRDROP_DISTRIBUTOR_KEY, Role::AirdropDistributor),
        (ART_PROXY_KEY, Role::ArtProxy),
        (DISTRIBUTOR_KEY, Role::Distributor),
        (FACTORY_REGISTRY_KEY, Role::FactoryRegistry),
        (FORWARDER_KEY, Role::Forwarder),
        (GAUGE_FACTORY_KEY, Role::GaugeFactory),
        (MANAGED_REWARDS_FACTORY_KEY, Role::ManagedRewardsFactory),
        (MINTER_KEY, Role::Minter),
        (POOL_FACTORY_KEY, Role::PoolFactory),
        (ROUTER_KEY, Role::Router),
        (token.symbol(), Role::Token),
        (VOTER_KEY, Role::Voter),
        (VOTING_ESCROW_KEY, Role::VotingEscrow),
        (VOTING_REWARDS_FACTORY_KEY, Role::VotingRewardsFactory),
    ];

    let mut output = BTreeMap::new();
    for (key, role) in entries {
        output.insert(key.to_string(), graph.require(role)?);
    }

    Ok(output)
}

/// Persist the output record.
///
/// The chain state already exists by the time this runs; a write failure is
/// reported and the addresses left to manual recovery rather than failing
/// the run.
pub fn write_output(path: &Path, output: &BTreeMap<String, Address>) {
    if let Err(e) = try_write_output(path, output) {
        error!("error writing deployments file: {}", e);
    }
}

/// Write the record, surfacing any IO or serialization failure
fn try_write_output(path: &Path, output: &BTreeMap<String, Address>) -> Result<(), ScriptError> {
    let rendered: BTreeMap<&str, String> = output
        .iter()
        .map(|(key, address)| (key.as_str(), format!("{address:#x}")))
        .collect();

    let json = serde_json::to_string_pretty(&rendered)
        .map_err(|e| ScriptError::WriteFile(e.to_string()))?;

    fs::write(path, json).map_err(|e| ScriptError::WriteFile(format!("{}: {e}", path.display())))
}

/// Read a single deployed address from the deployments file
pub fn read_deployment(key: &str, path: &Path) -> Result<Address, ScriptError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| ScriptError::ReadFile(format!("{}: {e}", path.display())))?;

    let json: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| ScriptError::ReadFile(e.to_string()))?;

    let address = json.get(key).and_then(|value| value.as_str()).ok_or_else(|| {
        ScriptError::ReadFile(format!("key {key} not found in deployments file"))
    })?;

    Address::from_str(address).map_err(|e| ScriptError::ReadFile(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, env, fs, path::PathBuf};

    use alloy::primitives::Address;

    use super::{build_output, read_deployment, write_output};
    use crate::{
        cli::TokenKind,
        deployer::DeploymentUnit,
        errors::ScriptError,
        graph::{ProtocolGraph, Role},
    };

    /// Build a graph with every role resolved to a random address
    fn full_graph() -> ProtocolGraph {
        let roles = [
            (Role::Token, "Zephyr"),
            (Role::PoolImplementation, "Pool"),
            (Role::PoolFactory, "PoolFactory"),
            (Role::VotingRewardsFactory, "VotingRewardsFactory"),
            (Role::GaugeFactory, "GaugeFactory"),
            (Role::ManagedRewardsFactory, "ManagedRewardsFactory"),
            (Role::FactoryRegistry, "FactoryRegistry"),
            (Role::Forwarder, "Forwarder"),
            (Role::BalanceLogicLibrary, "BalanceLogicLibrary"),
            (Role::DelegationLogicLibrary, "DelegationLogicLibrary"),
            (Role::VotingEscrow, "VotingEscrow"),
            (Role::TrigLibrary, "Trig"),
            (Role::NoiseLibrary, "PerlinNoise"),
            (Role::ArtProxy, "VeArtProxy"),
            (Role::Distributor, "RewardsDistributor"),
            (Role::Voter, "Voter"),
            (Role::Router, "Router"),
            (Role::Minter, "Minter"),
            (Role::AirdropDistributor, "AirdropDistributor"),
        ];

        let mut graph = ProtocolGraph::new();
        for (role, name) in roles {
            graph
                .insert(
                    role,
                    DeploymentUnit {
                        name: name.to_string(),
                        address: Address::random(),
                    },
                )
                .unwrap();
        }
        graph
    }

    /// A scratch file path in the system temp directory
    fn scratch_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_output_has_exactly_the_documented_keys() {
        let output = build_output(&full_graph(), TokenKind::Zephyr).unwrap();

        let keys: Vec<&str> = output.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "AirdropDistributor",
                "ArtProxy",
                "Distributor",
                "FactoryRegistry",
                "Forwarder",
                "GaugeFactory",
                "ManagedRewardsFactory",
                "Minter",
                "PoolFactory",
                "Router",
                "Voter",
                "VotingEscrow",
                "VotingRewardsFactory",
                "ZPHR",
            ]
        );
        assert!(output.values().all(|address| !address.is_zero()));
    }

    #[test]
    fn test_incomplete_graph_has_no_output() {
        let graph = ProtocolGraph::new();
        let res = build_output(&graph, TokenKind::Gale);
        assert!(matches!(res, Err(ScriptError::DependencyUnresolved(_))));
    }

    #[test]
    fn test_written_addresses_read_back_unchanged() {
        let output = build_output(&full_graph(), TokenKind::Gale).unwrap();
        let path = scratch_path("deployments-roundtrip.json");

        write_output(&path, &output);
        for (key, address) in &output {
            assert_eq!(&read_deployment(key, &path).unwrap(), address);
        }

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_key_is_a_read_error() {
        let path = scratch_path("deployments-missing-key.json");
        fs::write(&path, "{}").unwrap();

        let res = read_deployment("Minter", &path);
        assert!(matches!(res, Err(ScriptError::ReadFile(_))));

        fs::remove_file(&path).unwrap();
    }
}
