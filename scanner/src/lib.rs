//! dexscan - polls a Solana RPC endpoint and reports instructions sent to
//! registered exchange programs.

pub mod client;
pub mod detector;
pub mod error;
pub mod instruction;
pub mod metrics;
pub mod registry;
pub mod scanner;
pub mod sink;

pub use client::{RpcScannerClient, ScannerClient};
pub use detector::{PoolDetection, PoolDetector, UndecodedPoolDetector};
pub use error::{error_report, Error, Result};
pub use instruction::{RawInstruction, SignatureRecord, TransactionDetail};
pub use registry::ProgramRegistry;
pub use scanner::{Scanner, ScannerConfig, ScannerState, SweepReport};
pub use sink::{
    LogEntry, LogLevel, LogPanel, LogSink, NoopSink, Tee, TracingSink, WriterSink,
};
