//! Exchange name to program address registry.

use dexscan_config::constants::DEFAULT_PROGRAMS;
use indexmap::IndexMap;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use crate::{Error, Result};

/// Ordered, immutable map of exchange name to program address. Sweeps visit
/// the entries in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramRegistry {
    programs: IndexMap<String, Pubkey>,
}

impl ProgramRegistry {
    pub fn new<I, N>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, Pubkey)>,
        N: Into<String>,
    {
        let mut programs = IndexMap::new();
        for (name, program_id) in entries {
            let name = name.into();
            if programs.contains_key(&name) {
                return Err(Error::DuplicateProgram(name));
            }
            programs.insert(name, program_id);
        }

        if programs.is_empty() {
            return Err(Error::EmptyRegistry);
        }

        Ok(Self { programs })
    }

    /// Builds a registry from base58 addresses, rejecting any that do not parse.
    pub fn from_addresses<I, N, A>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, A)>,
        N: Into<String>,
        A: AsRef<str>,
    {
        let parsed = entries
            .into_iter()
            .map(|(name, address)| {
                let name = name.into();
                let address = address.as_ref();
                Pubkey::from_str(address)
                    .map(|program_id| (name.clone(), program_id))
                    .map_err(|_| Error::InvalidProgramId {
                        name,
                        address: address.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(parsed)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Pubkey)> {
        self.programs
            .iter()
            .map(|(name, program_id)| (name.as_str(), program_id))
    }

    pub fn get(&self, name: &str) -> Option<&Pubkey> {
        self.programs.get(name)
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

impl Default for ProgramRegistry {
    fn default() -> Self {
        Self {
            programs: DEFAULT_PROGRAMS
                .iter()
                .map(|(name, program_id)| (name.to_string(), *program_id))
                .collect(),
        }
    }
}

/// Parses a `NAME=ADDRESS` command line entry.
pub fn parse_program_arg(arg: &str) -> std::result::Result<(String, Pubkey), String> {
    let (name, address) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=ADDRESS, got {arg}"))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing exchange name in {arg}"));
    }

    let program_id = Pubkey::from_str(address.trim())
        .map_err(|e| format!("invalid program address {address}: {e}"))?;

    Ok((name.to_string(), program_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexscan_config::constants::{ORCA_PROGRAM_ID, RAYDIUM_PROGRAM_ID};

    #[test]
    fn test_default_registry_order() {
        let registry = ProgramRegistry::default();
        let entries: Vec<(&str, &Pubkey)> = registry.iter().collect();
        assert_eq!(
            entries,
            vec![("Raydium", &RAYDIUM_PROGRAM_ID), ("Orca", &ORCA_PROGRAM_ID)]
        );
    }

    #[test]
    fn test_registry_preserves_insertion_order() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let c = Pubkey::new_unique();
        let registry = ProgramRegistry::new([("Zeta", a), ("Alpha", b), ("Mid", c)]).unwrap();

        let names: Vec<&str> = registry.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
        assert_eq!(registry.get("Alpha"), Some(&b));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let res = ProgramRegistry::new([
            ("Raydium", Pubkey::new_unique()),
            ("Raydium", Pubkey::new_unique()),
        ]);
        assert!(matches!(res, Err(Error::DuplicateProgram(name)) if name == "Raydium"));
    }

    #[test]
    fn test_registry_rejects_empty() {
        let res = ProgramRegistry::new(Vec::<(String, Pubkey)>::new());
        assert!(matches!(res, Err(Error::EmptyRegistry)));
    }

    #[test]
    fn test_from_addresses() {
        let registry = ProgramRegistry::from_addresses([(
            "Orca",
            "9WZkgPZYmCFbTKPKmfZGdX4L49vHtNAYETQfjtrKkD5e",
        )])
        .unwrap();
        assert_eq!(registry.get("Orca"), Some(&ORCA_PROGRAM_ID));

        let res = ProgramRegistry::from_addresses([("Broken", "not-a-pubkey")]);
        assert!(matches!(
            res,
            Err(Error::InvalidProgramId { name, .. }) if name == "Broken"
        ));
    }

    #[test]
    fn test_parse_program_arg() {
        let (name, program_id) =
            parse_program_arg("Raydium=4cKxjvnxMw2KjyUbkXuxD6gZnn9i9okRyr6Xkkz4mFw5").unwrap();
        assert_eq!(name, "Raydium");
        assert_eq!(program_id, RAYDIUM_PROGRAM_ID);

        assert!(parse_program_arg("Raydium").is_err());
        assert!(parse_program_arg("=4cKxjvnxMw2KjyUbkXuxD6gZnn9i9okRyr6Xkkz4mFw5").is_err());
        assert!(parse_program_arg("Raydium=xyz").is_err());
    }
}
