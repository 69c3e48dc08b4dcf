use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use crate::constants::*;

/// The default path to the scanner settings file.
///
/// > `~/.config/dexscan/config.yml`
///
/// `DEXSCAN_CONFIG_FILE` takes precedence. It will only be `None` if it is
/// unable to identify the user's home directory.
pub fn settings_path() -> Option<PathBuf> {
    match env::var_os(CONFIG_FILE_ENV_VAR) {
        Some(path) => Some(PathBuf::from(path)),
        None => directories_next::UserDirs::new().map(|dirs| {
            let mut buf = dirs.home_dir().to_path_buf();
            buf.extend([".config", "dexscan", "config.yml"]);
            buf
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerSettings {
    pub rpc_url: Option<String>,
    pub signature_limit: usize,
    pub sweep_delay_ms: u64,
    pub timeout_secs: Option<u64>,
    /// Exchange name to base58 program address. Empty means the built-in registry.
    pub programs: IndexMap<String, String>,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        ScannerSettings {
            rpc_url: None,
            signature_limit: DEFAULT_SIGNATURE_LIMIT,
            sweep_delay_ms: DEFAULT_SWEEP_DELAY_MS,
            timeout_secs: None,
            programs: IndexMap::new(),
        }
    }
}

impl ScannerSettings {
    /// Reads settings from `path`. A missing file yields the defaults. A file
    /// that cannot be read or does not parse is an error.
    pub fn load(path: &Path) -> eyre::Result<Self> {
        match fs::read_to_string(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ScannerSettings::default()),
            Err(e) => Err(eyre::eyre!(
                "Unable to read settings file {}: {e}",
                path.display()
            )),
            Ok(content) => {
                let settings: ScannerSettings = serde_yaml::from_str(&content)
                    .map_err(|e| eyre::eyre!("Invalid settings file {}: {e}", path.display()))?;
                settings.validate()?;
                Ok(settings)
            }
        }
    }

    pub fn validate(&self) -> eyre::Result<()> {
        validate_signature_limit(self.signature_limit)
    }
}

pub fn validate_signature_limit(limit: usize) -> eyre::Result<()> {
    if !(1..=MAX_SIGNATURE_LIMIT).contains(&limit) {
        eyre::bail!("signature_limit must be between 1 and {MAX_SIGNATURE_LIMIT}, got {limit}");
    }
    Ok(())
}

pub fn read_settings() -> eyre::Result<(PathBuf, ScannerSettings)> {
    match settings_path() {
        None => eyre::bail!("Unable to resolve the settings file path"),
        Some(filename) => {
            let settings = ScannerSettings::load(&filename)?;
            Ok((filename, settings))
        }
    }
}
