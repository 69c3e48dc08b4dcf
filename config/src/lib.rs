pub mod constants;
mod env;
mod settings;

pub use env::{rpc_url_from_env, Environment, NetworkConfig};
pub use settings::{read_settings, settings_path, validate_signature_limit, ScannerSettings};
