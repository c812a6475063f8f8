//! Per-network deployment configuration
//!
//! The constants file is consumed read-only; the only in-memory mutation the
//! scripts perform is appending the newly deployed token's address to the
//! whitelist before the voter is initialized.

use std::{fs, path::Path, str::FromStr};

use alloy::primitives::Address;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Deserializer};

use crate::errors::ScriptError;

/// Deserialize a wei amount through its exact decimal literal.
///
/// Amounts arrive as bare JSON numbers, often in scientific notation and
/// wider than any machine float; routing them through `f64` would corrupt
/// the low digits.
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: serde_json::Number = Deserialize::deserialize(deserializer)?;
    BigDecimal::from_str(&raw.to_string()).map_err(serde::de::Error::custom)
}

/// One wallet/amount pair of the minter distribution
#[derive(Debug, Clone, Deserialize)]
pub struct WalletAmount {
    /// The allocated wei amount
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: BigDecimal,
    /// The recipient wallet
    pub wallet: Address,
}

/// The minter's initial token distribution
#[derive(Debug, Clone, Deserialize)]
pub struct MinterDistribution {
    /// Allocations locked into the escrow
    pub locked: Vec<WalletAmount>,
    /// Liquid allocations
    pub liquid: Vec<WalletAmount>,
}

/// A configured pool between two external tokens
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSpec {
    /// Whether the pool uses the stable curve
    pub stable: bool,
    /// The first pool token
    pub token_a: Address,
    /// The second pool token
    pub token_b: Address,
}

/// A configured pool pairing the protocol token with an external token
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPoolSpec {
    /// Whether the pool uses the stable curve
    pub stable: bool,
    /// The external token paired with the protocol token
    pub token: Address,
}

/// Per-network deployment constants
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConstants {
    /// Tokens the voter may create gauges for at launch
    pub whitelist_tokens: Vec<Address>,
    /// The wrapped base asset used by the router
    #[serde(rename = "WETH")]
    pub weth: Address,
    /// The address receiving team authority over the protocol
    pub team: Address,
    /// The address receiving fee-manager authority on the pool factory
    pub fee_manager: Address,
    /// The minter's initial distribution
    pub minter: MinterDistribution,
    /// Pools to create between external tokens
    #[serde(default)]
    pub pools: Vec<PoolSpec>,
    /// Pools to create against the protocol token
    #[serde(default)]
    pub token_pools: Vec<TokenPoolSpec>,
}

impl NetworkConstants {
    /// Load the constants from a JSON file
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| ScriptError::ReadFile(format!("{}: {e}", path.display())))?;

        serde_json::from_str(&raw)
            .map_err(|e| ScriptError::ReadFile(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::NetworkConstants;

    /// A constants file in the shape used by the per-network configs
    const SAMPLE: &str = r#"{
        "whitelistTokens": ["0x4200000000000000000000000000000000000006"],
        "WETH": "0x4200000000000000000000000000000000000006",
        "team": "0x0000000000000000000000000000000000000011",
        "feeManager": "0x0000000000000000000000000000000000000022",
        "minter": {
            "locked": [
                { "amount": 1e24, "wallet": "0x0000000000000000000000000000000000000033" }
            ],
            "liquid": [
                { "amount": 2.5e24, "wallet": "0x0000000000000000000000000000000000000044" }
            ]
        },
        "pools": [
            {
                "stable": false,
                "tokenA": "0x4200000000000000000000000000000000000006",
                "tokenB": "0x0000000000000000000000000000000000000055"
            }
        ],
        "tokenPools": [
            { "stable": true, "token": "0x0000000000000000000000000000000000000066" }
        ]
    }"#;

    #[test]
    fn test_parse_network_constants() {
        let constants: NetworkConstants = serde_json::from_str(SAMPLE).unwrap();

        assert_eq!(constants.whitelist_tokens.len(), 1);
        assert_eq!(constants.minter.locked.len(), 1);
        assert_eq!(constants.pools.len(), 1);
        assert!(!constants.pools[0].stable);
        assert!(constants.token_pools[0].stable);
    }

    #[test]
    fn test_amounts_survive_scientific_notation_exactly() {
        let constants: NetworkConstants = serde_json::from_str(SAMPLE).unwrap();

        let locked = &constants.minter.locked[0].amount;
        let liquid = &constants.minter.liquid[0].amount;
        assert_eq!(locked, &BigDecimal::from_str("1000000000000000000000000").unwrap());
        assert_eq!(liquid, &BigDecimal::from_str("2500000000000000000000000").unwrap());
    }
}
