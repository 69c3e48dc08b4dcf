//! Hook for recognising pool creation from a matched instruction.

use solana_sdk::pubkey::Pubkey;
use std::fmt;

use crate::instruction::RawInstruction;

/// A pool creation recognised in a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolDetection {
    pub exchange: String,
    pub signature: String,
    pub pool: Pubkey,
    pub base_mint: Option<Pubkey>,
    pub quote_mint: Option<Pubkey>,
}

impl fmt::Display for PoolDetection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool {} in {}", self.pool, self.signature)?;
        if let (Some(base), Some(quote)) = (&self.base_mint, &self.quote_mint) {
            write!(f, " ({base}/{quote})")?;
        }
        Ok(())
    }
}

/// Inspects instructions addressed to a registered program. Called once per
/// matching instruction, after the instruction itself has been logged.
pub trait PoolDetector: Send + Sync {
    fn detect(
        &self,
        exchange: &str,
        signature: &str,
        instruction: &RawInstruction,
    ) -> Option<PoolDetection>;
}

/// Never reports a pool. Instruction payloads of the supported exchanges are
/// not decoded yet.
#[derive(Debug, Default, Clone, Copy)]
pub struct UndecodedPoolDetector;

impl PoolDetector for UndecodedPoolDetector {
    fn detect(&self, _: &str, _: &str, _: &RawInstruction) -> Option<PoolDetection> {
        None
    }
}
