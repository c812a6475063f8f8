//! The protocol dependency graph
//!
//! Construction order is a fixed property of the protocol: a unit may only
//! be constructed once every unit it references is present in the graph
//! with a resolved address. The graph never reorders construction.

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

use alloy::primitives::Address;

use crate::{deployer::DeploymentUnit, errors::ScriptError};

/// The logical roles of the protocol units
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    /// The protocol ERC-20 token
    Token,
    /// The pool implementation cloned by the factory
    PoolImplementation,
    /// The pool factory
    PoolFactory,
    /// The voting-rewards factory
    VotingRewardsFactory,
    /// The gauge factory
    GaugeFactory,
    /// The managed-rewards factory
    ManagedRewardsFactory,
    /// The registry of the four factories
    FactoryRegistry,
    /// The meta-transaction forwarder
    Forwarder,
    /// The escrow balance-logic library
    BalanceLogicLibrary,
    /// The escrow delegation-logic library
    DelegationLogicLibrary,
    /// The voting escrow
    VotingEscrow,
    /// The trigonometry library used by the art proxy
    TrigLibrary,
    /// The noise library used by the art proxy
    NoiseLibrary,
    /// The escrow art proxy
    ArtProxy,
    /// The rebase rewards distributor
    Distributor,
    /// The gauge voter
    Voter,
    /// The swap router
    Router,
    /// The emissions minter
    Minter,
    /// The airdrop distributor
    AirdropDistributor,
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Token => "token",
            Role::PoolImplementation => "pool implementation",
            Role::PoolFactory => "pool factory",
            Role::VotingRewardsFactory => "voting-rewards factory",
            Role::GaugeFactory => "gauge factory",
            Role::ManagedRewardsFactory => "managed-rewards factory",
            Role::FactoryRegistry => "factory registry",
            Role::Forwarder => "forwarder",
            Role::BalanceLogicLibrary => "balance-logic library",
            Role::DelegationLogicLibrary => "delegation-logic library",
            Role::VotingEscrow => "voting escrow",
            Role::TrigLibrary => "trig library",
            Role::NoiseLibrary => "noise library",
            Role::ArtProxy => "art proxy",
            Role::Distributor => "rewards distributor",
            Role::Voter => "voter",
            Role::Router => "router",
            Role::Minter => "minter",
            Role::AirdropDistributor => "airdrop distributor",
        };
        write!(f, "{}", name)
    }
}

/// The set of deployed units, keyed by role
#[derive(Debug, Default)]
pub struct ProtocolGraph {
    /// The deployed units
    units: BTreeMap<Role, DeploymentUnit>,
}

impl ProtocolGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly deployed unit.
    ///
    /// A role's address is assigned exactly once; recording a role twice
    /// means the run is re-deploying a unit and must abort.
    pub fn insert(&mut self, role: Role, unit: DeploymentUnit) -> Result<(), ScriptError> {
        if self.units.contains_key(&role) {
            return Err(ScriptError::ContractDeployment(format!(
                "{role} already deployed"
            )));
        }
        self.units.insert(role, unit);
        Ok(())
    }

    /// Resolve the address of a previously deployed role
    pub fn require(&self, role: Role) -> Result<Address, ScriptError> {
        self.unit(role).map(|unit| unit.address)
    }

    /// Fetch the deployment record of a previously deployed role
    pub fn unit(&self, role: Role) -> Result<&DeploymentUnit, ScriptError> {
        self.units
            .get(&role)
            .ok_or_else(|| ScriptError::DependencyUnresolved(role.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::Address;

    use super::{ProtocolGraph, Role};
    use crate::{deployer::DeploymentUnit, errors::ScriptError};

    /// A unit record with a random address
    fn unit(name: &str) -> DeploymentUnit {
        DeploymentUnit {
            name: name.to_string(),
            address: Address::random(),
        }
    }

    #[test]
    fn test_require_missing_is_unresolved() {
        let graph = ProtocolGraph::new();
        let res = graph.require(Role::FactoryRegistry);
        assert!(matches!(res, Err(ScriptError::DependencyUnresolved(_))));
    }

    #[test]
    fn test_require_resolves_inserted_unit() {
        let mut graph = ProtocolGraph::new();
        let voter = unit("Voter");
        let address = voter.address;
        graph.insert(Role::Voter, voter).unwrap();

        assert_eq!(graph.require(Role::Voter).unwrap(), address);
    }

    #[test]
    fn test_role_address_assigned_exactly_once() {
        let mut graph = ProtocolGraph::new();
        graph.insert(Role::Token, unit("Zephyr")).unwrap();

        let res = graph.insert(Role::Token, unit("Zephyr"));
        assert!(matches!(res, Err(ScriptError::ContractDeployment(_))));
    }

    #[test]
    fn test_registry_requires_all_four_factories() {
        // The registry constructor pulls all four factory addresses; with any
        // one missing the lookup fails before a transaction is built
        let mut graph = ProtocolGraph::new();
        graph.insert(Role::PoolFactory, unit("PoolFactory")).unwrap();
        graph
            .insert(Role::VotingRewardsFactory, unit("VotingRewardsFactory"))
            .unwrap();
        graph.insert(Role::GaugeFactory, unit("GaugeFactory")).unwrap();

        assert!(graph.require(Role::PoolFactory).is_ok());
        assert!(matches!(
            graph.require(Role::ManagedRewardsFactory),
            Err(ScriptError::DependencyUnresolved(_))
        ));
    }
}
