//! The post-construction wiring engine
//!
//! Mutually-referencing units cannot learn each other's addresses at
//! construction time, so both sides are constructed with neutral state and
//! the cross-references are supplied afterwards through an ordered list of
//! setter calls. One-time setters are enforced by the target contracts
//! themselves; the engine never pre-checks, so a repeated invocation fails
//! the run loudly instead of being silently re-applied.

use alloy::{dyn_abi::DynSolValue, primitives::Address};
use tracing::info;

use crate::{
    deployer::UnitDeployer,
    errors::ScriptError,
    graph::{ProtocolGraph, Role},
    utils::send_tx,
};

/// An argument to a wiring call
pub enum WireArg {
    /// The resolved address of a deployed unit
    Unit(Role),
    /// A literal address list
    AddressList(Vec<Address>),
}

/// A deferred cross-reference call, issued once all its units exist
pub struct WiringAction {
    /// The unit whose setter is called
    pub target: Role,
    /// The setter invoked on the target
    pub setter: &'static str,
    /// Setter arguments, resolved against the graph at execution time
    pub args: Vec<WireArg>,
}

/// The fixed wiring sequence of a protocol deployment.
///
/// Order matters: the escrow learns the voter and distributor before either
/// is pointed at the minter, and the voter is initialized last, once the
/// minter exists and the whitelist is final.
pub fn wiring_plan(whitelist: Vec<Address>) -> Vec<WiringAction> {
    vec![
        WiringAction {
            target: Role::VotingEscrow,
            setter: "setArtProxy",
            args: vec![WireArg::Unit(Role::ArtProxy)],
        },
        WiringAction {
            target: Role::VotingEscrow,
            setter: "setVoterAndDistributor",
            args: vec![WireArg::Unit(Role::Voter), WireArg::Unit(Role::Distributor)],
        },
        WiringAction {
            target: Role::Distributor,
            setter: "setMinter",
            args: vec![WireArg::Unit(Role::Minter)],
        },
        WiringAction {
            target: Role::Token,
            setter: "setMinter",
            args: vec![WireArg::Unit(Role::Minter)],
        },
        WiringAction {
            target: Role::Voter,
            setter: "initialize",
            args: vec![
                WireArg::AddressList(whitelist),
                WireArg::Unit(Role::Minter),
            ],
        },
    ]
}

/// Execute the wiring actions in order, awaiting each call's confirmation
/// before issuing the next
pub async fn execute_wiring(
    deployer: &UnitDeployer,
    graph: &ProtocolGraph,
    actions: &[WiringAction],
) -> Result<(), ScriptError> {
    for action in actions {
        let target = graph.unit(action.target)?;
        let args = action
            .args
            .iter()
            .map(|arg| resolve_arg(graph, arg))
            .collect::<Result<Vec<_>, _>>()?;

        let contract = deployer.attach(target)?;
        let call = contract
            .function(action.setter, &args)
            .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))?;

        let receipt = send_tx(call).await?;
        info!(
            "{}.{} confirmed in {}",
            action.target, action.setter, receipt.transaction_hash
        );
    }

    Ok(())
}

/// Resolve a wiring argument against the graph
fn resolve_arg(graph: &ProtocolGraph, arg: &WireArg) -> Result<DynSolValue, ScriptError> {
    match arg {
        WireArg::Unit(role) => Ok(DynSolValue::Address(graph.require(*role)?)),
        WireArg::AddressList(addresses) => Ok(DynSolValue::Array(
            addresses.iter().copied().map(DynSolValue::Address).collect(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use alloy::{dyn_abi::DynSolValue, primitives::Address};

    use super::{resolve_arg, wiring_plan, WireArg};
    use crate::{
        deployer::DeploymentUnit,
        errors::ScriptError,
        graph::{ProtocolGraph, Role},
    };

    #[test]
    fn test_voter_initialized_after_minter_references_exist() {
        let plan = wiring_plan(vec![Address::random()]);

        // Every reference to the minter comes before the voter is
        // initialized, and initialization is the final action
        let last = plan.last().unwrap();
        assert_eq!(last.target, Role::Voter);
        assert_eq!(last.setter, "initialize");
        assert!(matches!(last.args[1], WireArg::Unit(Role::Minter)));
    }

    #[test]
    fn test_escrow_wired_before_minter_targets() {
        let plan = wiring_plan(Vec::new());
        let escrow_wiring = plan
            .iter()
            .position(|a| a.setter == "setVoterAndDistributor")
            .unwrap();
        let first_minter_target = plan
            .iter()
            .position(|a| a.setter == "setMinter")
            .unwrap();

        assert!(escrow_wiring < first_minter_target);
    }

    #[test]
    fn test_unresolved_wire_arg_fails_before_any_call() {
        let graph = ProtocolGraph::new();
        let res = resolve_arg(&graph, &WireArg::Unit(Role::Minter));
        assert!(matches!(res, Err(ScriptError::DependencyUnresolved(_))));
    }

    #[test]
    fn test_address_list_resolves_to_array() {
        let mut graph = ProtocolGraph::new();
        graph
            .insert(
                Role::Minter,
                DeploymentUnit {
                    name: "Minter".to_string(),
                    address: Address::random(),
                },
            )
            .unwrap();

        let whitelist = vec![Address::random(), Address::random()];
        let resolved = resolve_arg(&graph, &WireArg::AddressList(whitelist.clone())).unwrap();

        match resolved {
            DynSolValue::Array(values) => {
                assert_eq!(values.len(), whitelist.len());
                assert_eq!(values[0], DynSolValue::Address(whitelist[0]));
            }
            _ => panic!("expected an array value"),
        }
    }
}
