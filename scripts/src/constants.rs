//! Constants used in the deploy scripts

/// The number of recipients paid out per airdrop transaction
pub const AIRDROP_BATCH_SIZE: usize = 10;

/// The whole-token balance minted to the airdrop distributor at genesis
pub const AIRDROPPER_BALANCE: u64 = 200_000_000;

/// The number of decimals of the protocol token
pub const TOKEN_DECIMALS: u32 = 18;

/// The gas limit for pool and gauge creation calls
pub const POOL_CREATION_GAS_LIMIT: u64 = 5_000_000;

/// The gas limit for a single airdrop batch transaction
pub const AIRDROP_BATCH_GAS_LIMIT: u64 = 15_000_000;

/// The divisor applied to the latest base fee to derive the priority fee
pub const PRIORITY_FEE_DIVISOR: u128 = 50;

/// The fee rate applied to stable pools at deployment
pub const STABLE_POOL_FEE: u64 = 1;

/// The fee rate applied to volatile pools at deployment
pub const VOLATILE_POOL_FEE: u64 = 1;

/// The airdrop distributor key in the deployments file
pub const AIRDROP_DISTRIBUTOR_KEY: &str = "AirdropDistributor";

/// The art proxy key in the deployments file
pub const ART_PROXY_KEY: &str = "ArtProxy";

/// The rewards distributor key in the deployments file
pub const DISTRIBUTOR_KEY: &str = "Distributor";

/// The factory registry key in the deployments file
pub const FACTORY_REGISTRY_KEY: &str = "FactoryRegistry";

/// The forwarder key in the deployments file
pub const FORWARDER_KEY: &str = "Forwarder";

/// The gauge factory key in the deployments file
pub const GAUGE_FACTORY_KEY: &str = "GaugeFactory";

/// The managed-rewards factory key in the deployments file
pub const MANAGED_REWARDS_FACTORY_KEY: &str = "ManagedRewardsFactory";

/// The minter key in the deployments file
pub const MINTER_KEY: &str = "Minter";

/// The pool factory key in the deployments file
pub const POOL_FACTORY_KEY: &str = "PoolFactory";

/// The router key in the deployments file
pub const ROUTER_KEY: &str = "Router";

/// The voter key in the deployments file
pub const VOTER_KEY: &str = "Voter";

/// The voting escrow key in the deployments file
pub const VOTING_ESCROW_KEY: &str = "VotingEscrow";

/// The voting-rewards factory key in the deployments file
pub const VOTING_REWARDS_FACTORY_KEY: &str = "VotingRewardsFactory";
