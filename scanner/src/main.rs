use clap::Parser;
use dexscan_config::{
    read_settings, rpc_url_from_env, validate_signature_limit, Environment, ScannerSettings,
};
use dexscan_scanner::{
    metrics::install_prometheus, registry::parse_program_arg, LogSink, ProgramRegistry,
    RpcScannerClient, Scanner, ScannerConfig, TracingSink, WriterSink,
};
use solana_sdk::pubkey::Pubkey;
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(term_width = 0)]
#[command(name = "dexscan")]
#[command(version = option_env!("BUILD_VERSION").unwrap_or(env!("CARGO_PKG_VERSION")))]
#[command(about = "Watches Solana exchange programs for new instructions", long_about = None)]
struct AppArgs {
    /// Network preset (mainnet-beta, testnet, devnet or localnet)
    #[arg(long, value_name = "ENV")]
    env: Option<String>,
    /// RPC URL, overrides the preset, the environment and the settings file
    #[arg(long, value_name = "RPC_URL")]
    url: Option<String>,
    /// Path to the settings file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Program to watch, may be repeated. Replaces the default registry
    #[arg(long = "program", value_name = "NAME=ADDRESS", value_parser = parse_program_arg)]
    programs: Vec<(String, Pubkey)>,
    /// Signatures requested per program per sweep
    #[arg(long, value_name = "N")]
    limit: Option<usize>,
    /// Pause between sweeps in milliseconds
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,
    /// RPC request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,
    /// Exit after this many sweeps
    #[arg(long, value_name = "N")]
    max_sweeps: Option<u64>,
    /// Serve Prometheus metrics on this address
    #[arg(long, value_name = "ADDR")]
    metrics_addr: Option<SocketAddr>,
    /// Log filter used when RUST_LOG is not set
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: String,
    /// Emit scanner entries and diagnostics as JSON through the log subscriber
    #[arg(long)]
    json_logs: bool,
}

#[derive(Debug)]
struct ResolvedConfig {
    rpc_url: String,
    registry: ProgramRegistry,
    scanner: ScannerConfig,
    timeout: Option<Duration>,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = AppArgs::parse();
    init_tracing(&args.log_level, args.json_logs);

    let settings = load_settings(args.config.as_deref())?;
    let config = resolve(&args, settings, rpc_url_from_env())?;

    if let Some(addr) = args.metrics_addr {
        install_prometheus(addr)?;
        info!("Serving metrics on {}", addr);
    }

    let names: Vec<&str> = config.registry.iter().map(|(name, _)| name).collect();
    info!("Watching {} via {}", names.join(", "), config.rpc_url);

    let client = match config.timeout {
        Some(timeout) => RpcScannerClient::new_with_timeout(config.rpc_url, timeout),
        None => RpcScannerClient::new(config.rpc_url),
    };

    // Entries go to stdout as `[LEVEL] message` lines unless JSON output was requested.
    let sink: Box<dyn LogSink> = if args.json_logs {
        Box::new(TracingSink)
    } else {
        Box::new(WriterSink::stdout())
    };
    let mut scanner = Scanner::new(client, config.registry, sink, config.scanner);

    let shutdown = CancellationToken::new();
    let token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received");
        token.cancel();
    });

    let sweeps = scanner.run(shutdown).await?;
    info!("Completed {} sweeps", sweeps);

    Ok(())
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// An explicit `--config` path must exist. The default location may be absent.
fn load_settings(path: Option<&Path>) -> eyre::Result<ScannerSettings> {
    match path {
        Some(path) => {
            if !path.exists() {
                eyre::bail!("Settings file not found: {}", path.display());
            }
            ScannerSettings::load(path)
        }
        None => {
            let (path, settings) = read_settings()?;
            debug!("Using settings from {}", path.display());
            Ok(settings)
        }
    }
}

/// Merges the sources, highest precedence first: command line, environment,
/// settings file, network preset.
fn resolve(
    args: &AppArgs,
    settings: ScannerSettings,
    env_url: Option<String>,
) -> eyre::Result<ResolvedConfig> {
    let environment = match args.env.as_deref() {
        Some(env) => env.parse::<Environment>()?,
        None => Environment::default(),
    };
    let network = environment.config();

    let rpc_url = args
        .url
        .clone()
        .or(env_url)
        .or(settings.rpc_url)
        .unwrap_or(network.rpc_url);

    let registry = if !args.programs.is_empty() {
        ProgramRegistry::new(args.programs.iter().cloned())?
    } else if !settings.programs.is_empty() {
        ProgramRegistry::from_addresses(&settings.programs)?
    } else {
        ProgramRegistry::new(network.programs)?
    };

    let signature_limit = args.limit.unwrap_or(settings.signature_limit);
    validate_signature_limit(signature_limit)?;

    let timeout_secs = args.timeout_secs.or(settings.timeout_secs);
    if timeout_secs == Some(0) {
        eyre::bail!("timeout_secs must be greater than zero");
    }

    Ok(ResolvedConfig {
        rpc_url,
        registry,
        scanner: ScannerConfig {
            signature_limit,
            sweep_delay: Duration::from_millis(args.delay_ms.unwrap_or(settings.sweep_delay_ms)),
            max_sweeps: args.max_sweeps,
        },
        timeout: timeout_secs.map(Duration::from_secs),
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Unable to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Unable to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
