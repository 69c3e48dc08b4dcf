use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::fmt;

use crate::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Environment {
    #[default]
    MainnetBeta,
    Testnet,
    Devnet,
    Local,
}

impl std::str::FromStr for Environment {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ENV_MAINNET_BETA_SHORT_NAME | ENV_MAINNET_BETA_NAME => Ok(Environment::MainnetBeta),
            ENV_TESTNET_SHORT_NAME | ENV_TESTNET_NAME => Ok(Environment::Testnet),
            ENV_DEVNET_SHORT_NAME | ENV_DEVNET_NAME => Ok(Environment::Devnet),
            ENV_LOCALNET_SHORT_NAME | ENV_LOCALNET_NAME => Ok(Environment::Local),
            _ => Err(eyre::eyre!(
                "Invalid environment {s}, must be one of: {ENV_MAINNET_BETA_NAME}, {ENV_TESTNET_NAME}, {ENV_DEVNET_NAME}, {ENV_LOCALNET_NAME}",
            )),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::MainnetBeta => write!(f, "mainnet-beta"),
            Environment::Testnet => write!(f, "testnet"),
            Environment::Devnet => write!(f, "devnet"),
            Environment::Local => write!(f, "localnet"),
        }
    }
}

impl Environment {
    /// Preset network settings for this environment.
    pub fn config(&self) -> NetworkConfig {
        let rpc_url = match self {
            Environment::MainnetBeta => ENV_MAINNET_BETA_RPC_URL,
            Environment::Testnet => ENV_TESTNET_RPC_URL,
            Environment::Devnet => ENV_DEVNET_RPC_URL,
            Environment::Local => ENV_LOCALNET_RPC_URL,
        };

        NetworkConfig {
            rpc_url: rpc_url.to_string(),
            programs: DEFAULT_PROGRAMS
                .iter()
                .map(|(name, program_id)| (name.to_string(), *program_id))
                .collect(),
        }
    }
}

/// The RPC URL set through `DEXSCAN_RPC_URL`, if any. An empty value counts as unset.
pub fn rpc_url_from_env() -> Option<String> {
    std::env::var(RPC_URL_ENV_VAR)
        .ok()
        .filter(|url| !url.is_empty())
}

#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub rpc_url: String,
    /// Exchange name and program address, in scan order.
    pub programs: Vec<(String, Pubkey)>,
}
