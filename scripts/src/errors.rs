//! Definitions of errors that can occur during the execution of the deploy scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the deploy scripts
#[derive(Debug)]
pub enum ScriptError {
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error reading or parsing a compiled contract artifact
    ArtifactParsing(String),
    /// A construction or wiring step referenced a unit that has not
    /// been deployed yet
    DependencyUnresolved(String),
    /// Error constructing calldata for a contract method
    CalldataConstruction(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error calling a contract method
    ContractInteraction(String),
    /// The airdrop total exceeds the configured allocation by more than
    /// the first entry can absorb
    PrecisionOverflow(String),
    /// Error reading an input file
    ReadFile(String),
    /// Error writing an output file
    WriteFile(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::DependencyUnresolved(s) => {
                write!(f, "dependency not yet deployed: {}", s)
            }
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::PrecisionOverflow(s) => write!(f, "airdrop precision overflow: {}", s),
            ScriptError::ReadFile(s) => write!(f, "error reading file: {}", s),
            ScriptError::WriteFile(s) => write!(f, "error writing file: {}", s),
        }
    }
}

impl Error for ScriptError {}
