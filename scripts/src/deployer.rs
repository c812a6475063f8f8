//! Deployment of single protocol units from compiled artifacts

use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
};

use alloy::{
    contract::{ContractInstance, Interface},
    dyn_abi::{DynSolValue, JsonAbiExt},
    json_abi::JsonAbi,
    network::TransactionBuilder,
    primitives::{Address, Bytes},
    providers::Provider,
    rpc::types::TransactionRequest,
};
use serde::Deserialize;
use tracing::info;

use crate::{errors::ScriptError, utils::Client};

/// A handle to a single deployed protocol unit.
///
/// The address is assigned exactly once, when the deployment transaction
/// is mined.
#[derive(Debug, Clone)]
pub struct DeploymentUnit {
    /// The artifact name the unit was deployed from
    pub name: String,
    /// The mined contract address
    pub address: Address,
}

/// A compiled contract artifact
#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    /// The contract ABI
    pub abi: JsonAbi,
    /// Hex-encoded creation bytecode, with library placeholders unresolved
    pub bytecode: String,
    /// Library link references: source file, library name, placeholder offsets
    #[serde(default, rename = "linkReferences")]
    pub link_references: BTreeMap<String, BTreeMap<String, Vec<LinkOffset>>>,
}

/// A single library placeholder location within creation bytecode
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LinkOffset {
    /// Byte offset of the placeholder
    pub start: usize,
    /// Placeholder length in bytes, always an address width
    pub length: usize,
}

/// Deploys protocol units from compiled artifacts
pub struct UnitDeployer {
    /// The RPC client used to submit deployment transactions
    client: Client,
    /// Directory holding compiled contract artifacts
    artifacts_dir: PathBuf,
}

impl UnitDeployer {
    /// Create a new deployer over the given artifacts directory
    pub fn new(client: Client, artifacts_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            artifacts_dir: artifacts_dir.into(),
        }
    }

    /// Load the compiled artifact for the given contract name
    pub fn load_artifact(&self, name: &str) -> Result<Artifact, ScriptError> {
        let path = self.artifacts_dir.join(format!("{name}.json"));
        let raw = fs::read_to_string(&path)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", path.display())))?;

        serde_json::from_str(&raw)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", path.display())))
    }

    /// Deploy a unit, blocking until the deployment transaction is mined.
    ///
    /// Library addresses and constructor arguments must already be resolved;
    /// a transaction is only submitted once the creation bytecode is fully
    /// linked and encoded.
    pub async fn deploy(
        &self,
        name: &str,
        libraries: &BTreeMap<String, Address>,
        args: &[DynSolValue],
    ) -> Result<DeploymentUnit, ScriptError> {
        let artifact = self.load_artifact(name)?;
        let bytecode = link_bytecode(&artifact, name, libraries)?;
        let code = encode_constructor(&artifact.abi, name, bytecode, args)?;

        let tx = TransactionRequest::default().with_deploy_code(Bytes::from(code));
        let pending = self
            .client
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

        if !receipt.status() {
            return Err(ScriptError::ContractDeployment(format!(
                "{name} deployment reverted in {}",
                receipt.transaction_hash
            )));
        }

        let address = receipt.contract_address.ok_or_else(|| {
            ScriptError::ContractDeployment(format!("no contract address in {name} receipt"))
        })?;

        info!("{} deployed at {:#x}", name, address);

        Ok(DeploymentUnit {
            name: name.to_string(),
            address,
        })
    }

    /// Attach a dynamic handle to an already-deployed unit
    pub fn attach(&self, unit: &DeploymentUnit) -> Result<ContractInstance<Client>, ScriptError> {
        let artifact = self.load_artifact(&unit.name)?;
        Ok(ContractInstance::new(
            unit.address,
            self.client.clone(),
            Interface::new(artifact.abi),
        ))
    }
}

/// Substitute every library placeholder in the creation bytecode with the
/// deployed library's address
fn link_bytecode(
    artifact: &Artifact,
    name: &str,
    libraries: &BTreeMap<String, Address>,
) -> Result<Vec<u8>, ScriptError> {
    let mut bytecode = artifact.bytecode.trim_start_matches("0x").to_string();

    for (source, libs) in &artifact.link_references {
        for (lib, offsets) in libs {
            let address = libraries.get(lib).ok_or_else(|| {
                ScriptError::DependencyUnresolved(format!(
                    "library {lib} ({source}) required by {name}"
                ))
            })?;
            let encoded = hex::encode(address);

            for offset in offsets {
                let range = offset.start * 2..(offset.start + offset.length) * 2;
                if offset.length != Address::len_bytes() || range.end > bytecode.len() {
                    return Err(ScriptError::ArtifactParsing(format!(
                        "invalid link reference for {lib} in {name}"
                    )));
                }
                bytecode.replace_range(range, &encoded);
            }
        }
    }

    hex::decode(&bytecode)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{name} bytecode: {e}")))
}

/// Append the ABI-encoded constructor arguments to the creation bytecode
fn encode_constructor(
    abi: &JsonAbi,
    name: &str,
    mut code: Vec<u8>,
    args: &[DynSolValue],
) -> Result<Vec<u8>, ScriptError> {
    match abi.constructor() {
        Some(constructor) => {
            if constructor.inputs.len() != args.len() {
                return Err(ScriptError::CalldataConstruction(format!(
                    "{name} constructor expects {} arguments, got {}",
                    constructor.inputs.len(),
                    args.len()
                )));
            }
            let encoded = constructor
                .abi_encode_input(args)
                .map_err(|e| ScriptError::CalldataConstruction(format!("{name}: {e}")))?;
            code.extend_from_slice(&encoded);
        }
        None if !args.is_empty() => {
            return Err(ScriptError::CalldataConstruction(format!(
                "{name} has no constructor but {} arguments were given",
                args.len()
            )))
        }
        None => {}
    }

    Ok(code)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use alloy::primitives::Address;

    use super::{encode_constructor, link_bytecode, Artifact};
    use crate::errors::ScriptError;

    /// An artifact with a single library placeholder two bytes into the code
    fn linked_artifact() -> Artifact {
        let raw = r#"{
            "abi": [
                {
                    "type": "constructor",
                    "inputs": [{ "name": "_impl", "type": "address" }],
                    "stateMutability": "nonpayable"
                }
            ],
            "bytecode": "0x6080__$f00df00df00df00df00df00df00df00df0$__6040",
            "linkReferences": {
                "contracts/BalanceLogicLibrary.sol": {
                    "BalanceLogicLibrary": [{ "start": 2, "length": 20 }]
                }
            }
        }"#;
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_link_substitutes_library_address() {
        let artifact = linked_artifact();
        let library = Address::random();
        let libraries =
            BTreeMap::from([("BalanceLogicLibrary".to_string(), library)]);

        let code = link_bytecode(&artifact, "VotingEscrow", &libraries).unwrap();

        assert_eq!(code.len(), 24);
        assert_eq!(&code[..2], &[0x60, 0x80]);
        assert_eq!(&code[2..22], library.as_slice());
        assert_eq!(&code[22..], &[0x60, 0x40]);
    }

    #[test]
    fn test_link_missing_library_is_unresolved() {
        let artifact = linked_artifact();
        let res = link_bytecode(&artifact, "VotingEscrow", &BTreeMap::new());
        assert!(matches!(res, Err(ScriptError::DependencyUnresolved(_))));
    }

    #[test]
    fn test_constructor_arity_checked() {
        let artifact = linked_artifact();
        let res = encode_constructor(&artifact.abi, "VotingEscrow", vec![0x60], &[]);
        assert!(matches!(res, Err(ScriptError::CalldataConstruction(_))));
    }
}
