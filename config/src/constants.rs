use solana_sdk::pubkey::Pubkey;

// Environment monikers accepted on the command line
pub const ENV_MAINNET_BETA_NAME: &str = "mainnet-beta";
pub const ENV_MAINNET_BETA_SHORT_NAME: &str = "m";
pub const ENV_TESTNET_NAME: &str = "testnet";
pub const ENV_TESTNET_SHORT_NAME: &str = "t";
pub const ENV_DEVNET_NAME: &str = "devnet";
pub const ENV_DEVNET_SHORT_NAME: &str = "d";
pub const ENV_LOCALNET_NAME: &str = "localnet";
pub const ENV_LOCALNET_SHORT_NAME: &str = "l";

// Public RPC endpoints per environment
pub const ENV_MAINNET_BETA_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const ENV_TESTNET_RPC_URL: &str = "https://api.testnet.solana.com";
pub const ENV_DEVNET_RPC_URL: &str = "https://api.devnet.solana.com";
pub const ENV_LOCALNET_RPC_URL: &str = "http://localhost:8899";

// Overrides read from the process environment
pub const RPC_URL_ENV_VAR: &str = "DEXSCAN_RPC_URL";
pub const CONFIG_FILE_ENV_VAR: &str = "DEXSCAN_CONFIG_FILE";

// Exchange programs watched when no registry is configured
pub const RAYDIUM_NAME: &str = "Raydium";
pub const RAYDIUM_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("4cKxjvnxMw2KjyUbkXuxD6gZnn9i9okRyr6Xkkz4mFw5");
pub const ORCA_NAME: &str = "Orca";
pub const ORCA_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("9WZkgPZYmCFbTKPKmfZGdX4L49vHtNAYETQfjtrKkD5e");

pub const DEFAULT_PROGRAMS: [(&str, Pubkey); 2] = [
    (RAYDIUM_NAME, RAYDIUM_PROGRAM_ID),
    (ORCA_NAME, ORCA_PROGRAM_ID),
];

// Sweep tuning
pub const DEFAULT_SIGNATURE_LIMIT: usize = 5;
/// Largest `limit` accepted by `getSignaturesForAddress`.
pub const MAX_SIGNATURE_LIMIT: usize = 1000;
pub const DEFAULT_SWEEP_DELAY_MS: u64 = 1000;
pub const DEFAULT_PANEL_CAPACITY: usize = 1000;
