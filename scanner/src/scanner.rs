//! The polling loop: liveness check, then sweeps over every registered
//! program until cancelled.

use dexscan_config::constants::{DEFAULT_SIGNATURE_LIMIT, DEFAULT_SWEEP_DELAY_MS};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    client::ScannerClient,
    detector::{PoolDetector, UndecodedPoolDetector},
    error::error_report,
    metrics,
    registry::ProgramRegistry,
    sink::LogSink,
    Result,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Signatures requested per program per sweep.
    pub signature_limit: usize,
    /// Pause between the end of one sweep and the start of the next.
    pub sweep_delay: Duration,
    /// Stop after this many sweeps. Runs until cancelled when `None`.
    pub max_sweeps: Option<u64>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            signature_limit: DEFAULT_SIGNATURE_LIMIT,
            sweep_delay: Duration::from_millis(DEFAULT_SWEEP_DELAY_MS),
            max_sweeps: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerState {
    Connecting,
    Running,
    Stopped,
}

/// Counts gathered during one successful sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub exchanges: usize,
    pub signatures: usize,
    pub missing_transactions: usize,
    pub instructions_matched: usize,
    pub pools_detected: usize,
}

pub struct Scanner<C, S, D = UndecodedPoolDetector> {
    client: C,
    registry: ProgramRegistry,
    sink: S,
    detector: D,
    config: ScannerConfig,
    state: ScannerState,
}

impl<C: ScannerClient, S: LogSink> Scanner<C, S> {
    pub fn new(client: C, registry: ProgramRegistry, sink: S, config: ScannerConfig) -> Self {
        Self {
            client,
            registry,
            sink,
            detector: UndecodedPoolDetector,
            config,
            state: ScannerState::Connecting,
        }
    }
}

impl<C: ScannerClient, S: LogSink, D: PoolDetector> Scanner<C, S, D> {
    pub fn with_detector<D2: PoolDetector>(self, detector: D2) -> Scanner<C, S, D2> {
        Scanner {
            client: self.client,
            registry: self.registry,
            sink: self.sink,
            detector,
            config: self.config,
            state: self.state,
        }
    }

    pub fn state(&self) -> ScannerState {
        self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn registry(&self) -> &ProgramRegistry {
        &self.registry
    }

    /// Checks the endpoint with `getSlot`. On failure the error is logged and
    /// returned, and the scanner stays in [`ScannerState::Connecting`].
    pub async fn connect(&mut self) -> Result<u64> {
        self.sink.info("connecting...");

        match self.client.get_slot().await {
            Ok(slot) => {
                self.sink.info(format!("slot: {slot}"));
                metrics::record_slot(slot);
                self.sink.info("connected");
                self.state = ScannerState::Running;
                Ok(slot)
            }
            Err(e) => {
                self.sink.error(error_report(&e));
                Err(e)
            }
        }
    }

    /// One pass over the registry. The first error aborts the pass.
    pub async fn sweep(&self) -> Result<SweepReport> {
        let mut report = SweepReport::default();

        for (name, program_id) in self.registry.iter() {
            report.exchanges += 1;
            self.sink.info(format!("Checking for {name} Pools..."));

            let signatures = self
                .client
                .get_signatures_for_address(program_id, self.config.signature_limit)
                .await?;
            metrics::record_signatures(name, signatures.len());
            report.signatures += signatures.len();

            for record in signatures {
                self.sink
                    .info(format!("{name} Transaction: {}", record.signature));

                let Some(detail) = self.client.get_transaction(&record.signature).await? else {
                    self.sink.info(format!("[{name}] Invalid transaction data."));
                    metrics::record_missing_transaction(name);
                    report.missing_transactions += 1;
                    continue;
                };

                for ix in detail
                    .instructions
                    .iter()
                    .filter(|ix| ix.program_id == *program_id)
                {
                    self.sink
                        .info(format!("[{name}] Instruction detected: {ix}"));
                    metrics::record_instruction_matched(name);
                    report.instructions_matched += 1;

                    if let Some(pool) = self.detector.detect(name, &detail.signature, ix) {
                        self.sink.info(format!("[{name}] Pool detected: {pool}"));
                        report.pools_detected += 1;
                    }
                }
            }
        }

        Ok(report)
    }

    /// Connects if needed, then sweeps until `shutdown` fires or the configured
    /// sweep count is reached. Sweep errors are logged and do not stop the loop.
    /// Returns the number of sweeps that ran to completion.
    pub async fn run(&mut self, shutdown: CancellationToken) -> Result<u64> {
        if self.state != ScannerState::Running {
            self.connect().await?;
        }

        let mut sweeps = 0u64;

        loop {
            if shutdown.is_cancelled() || self.sweep_cap_reached(sweeps) {
                break;
            }

            let started = Instant::now();
            let result = tokio::select! {
                _ = shutdown.cancelled() => break,
                result = self.sweep() => result,
            };
            metrics::record_sweep(started.elapsed(), result.is_err());

            match result {
                Ok(report) => debug!(?report, "Sweep complete"),
                Err(e) => self.sink.error(error_report(&e)),
            }

            sweeps += 1;
            if self.sweep_cap_reached(sweeps) {
                break;
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.config.sweep_delay) => {}
            }
        }

        info!("Scanner stopped after {} sweeps", sweeps);
        self.state = ScannerState::Stopped;
        Ok(sweeps)
    }

    fn sweep_cap_reached(&self, sweeps: u64) -> bool {
        self.config.max_sweeps.is_some_and(|max| sweeps >= max)
    }
}
