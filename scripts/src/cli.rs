//! Definitions of CLI arguments and commands for the deploy scripts

use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{
    commands::{deploy_gauges_and_pools, deploy_governors, deploy_protocol, distribute_airdrop},
    errors::ScriptError,
    utils::Client,
};

/// The CLI arguments for the deploy scripts
#[derive(Parser)]
pub struct Cli {
    /// Private key of the deployer
    // TODO: Better key management
    #[arg(short, long, env = "DEPLOYER_PRIV_KEY")]
    pub priv_key: String,

    /// Network RPC URL
    #[arg(short, long)]
    pub rpc_url: String,

    /// Path to the file recording deployed addresses
    #[arg(short, long, default_value = "deployments.json")]
    pub deployments_path: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The deploy script commands
#[derive(Subcommand)]
pub enum Command {
    /// Deploy, wire and parameterize the full protocol
    DeployProtocol(DeployProtocolArgs),
    /// Create the configured pools and their gauges
    DeployGaugesAndPools(DeployGaugesAndPoolsArgs),
    /// Deploy the protocol and epoch governors
    DeployGovernors(DeployGovernorsArgs),
    /// Distribute the airdrop in batches
    DistributeAirdrop(DistributeAirdropArgs),
}

impl Command {
    /// Dispatch the selected command
    pub async fn run(self, client: Client, deployments_path: &Path) -> Result<(), ScriptError> {
        match self {
            Command::DeployProtocol(args) => deploy_protocol(args, client, deployments_path).await,
            Command::DeployGaugesAndPools(args) => {
                deploy_gauges_and_pools(args, client, deployments_path).await
            }
            Command::DeployGovernors(args) => {
                deploy_governors(args, client, deployments_path).await
            }
            Command::DistributeAirdrop(args) => {
                distribute_airdrop(args, client, deployments_path).await
            }
        }
    }
}

/// Deploy the full protocol: construct every unit in dependency order, wire
/// the cross-references, apply the initial parameters, and persist the
/// address record.
#[derive(Args)]
pub struct DeployProtocolArgs {
    /// Path to the per-network constants file
    #[arg(short, long)]
    pub constants: PathBuf,

    /// Directory containing compiled contract artifacts
    #[arg(short, long, default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// The protocol token to deploy
    #[arg(short, long)]
    pub token: TokenKind,
}

/// Create the configured pools and a gauge for each
#[derive(Args)]
pub struct DeployGaugesAndPoolsArgs {
    /// Path to the per-network constants file
    #[arg(short, long)]
    pub constants: PathBuf,

    /// The protocol token of the deployment
    #[arg(short, long)]
    pub token: TokenKind,
}

/// Deploy the protocol governor and the epoch governor
#[derive(Args)]
pub struct DeployGovernorsArgs {
    /// Path to the per-network constants file
    #[arg(short, long)]
    pub constants: PathBuf,

    /// Directory containing compiled contract artifacts
    #[arg(short, long, default_value = "artifacts")]
    pub artifacts: PathBuf,
}

/// Distribute the airdrop through the deployed distributor
#[derive(Args)]
pub struct DistributeAirdropArgs {
    /// Path to the airdrop recipient file
    #[arg(short, long)]
    pub airdrops: PathBuf,
}

/// The protocol token deployed with the rest of the protocol
#[derive(ValueEnum, Copy, Clone, Debug)]
pub enum TokenKind {
    /// The Zephyr token
    Zephyr,
    /// The Gale token
    Gale,
}

impl TokenKind {
    /// The artifact name of the token contract
    pub fn artifact(self) -> &'static str {
        match self {
            TokenKind::Zephyr => "Zephyr",
            TokenKind::Gale => "Gale",
        }
    }

    /// The token symbol, used as its key in the deployments file
    pub fn symbol(self) -> &'static str {
        match self {
            TokenKind::Zephyr => "ZPHR",
            TokenKind::Gale => "GALE",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Zephyr => write!(f, "zephyr"),
            TokenKind::Gale => write!(f, "gale"),
        }
    }
}
