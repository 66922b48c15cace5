//! JRMP registry responder CLI binary.
//!
//! # Commands
//!
//! - `serve` - Answer registry calls with a payload file
//! - `inspect` - Show the response framing for a payload file

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use jrmp::{
    protocol::{CallIdentifier, ReturnBlock, ReturnOutcome, RETURN_BLOCK_SIZE},
    Config, Payload, RegistryServer, VERSION,
};

#[derive(Parser)]
#[command(name = "jrmp")]
#[command(version = VERSION)]
#[command(about = "JRMP registry responder - deliver a serialized payload as a registry return value", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Listen for registry calls and answer them with the payload
    Serve {
        /// Serialized payload file
        #[arg(short = 'f', long)]
        payload: Option<PathBuf>,

        /// Send the payload file as-is (do not strip its 4-byte header)
        #[arg(long)]
        raw: bool,

        /// Listen port
        #[arg(short, long)]
        port: Option<u16>,

        /// Listen host
        #[arg(long)]
        host: Option<String>,

        /// Bind to all interfaces
        #[arg(long)]
        bind_all: bool,

        /// Socket read timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Config file (default: <config dir>/jrmp/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,

        /// Emit logs as JSON
        #[arg(long)]
        json_logs: bool,
    },

    /// Show the bytes a session would send after the call header
    Inspect {
        /// Serialized payload file
        payload: PathBuf,

        /// Treat the payload file as already stripped
        #[arg(long)]
        raw: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            payload,
            raw,
            port,
            host,
            bind_all,
            timeout,
            config,
            verbose,
            json_logs,
        } => cmd_serve(
            payload, raw, port, host, bind_all, timeout, config, verbose, json_logs,
        ),

        Commands::Inspect { payload, raw } => cmd_inspect(&payload, raw),
    }
}

#[allow(clippy::too_many_arguments)]
#[allow(clippy::fn_params_excessive_bools)]
fn cmd_serve(
    payload: Option<PathBuf>,
    raw: bool,
    port: Option<u16>,
    host: Option<String>,
    bind_all: bool,
    timeout: Option<u64>,
    config: Option<PathBuf>,
    verbose: bool,
    json_logs: bool,
) -> anyhow::Result<()> {
    // Initialize logging
    let log_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    if json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // CLI flags take precedence over file and environment
    let mut config = Config::load(config)?;
    if let Some(host) = host {
        config.listen.host = host;
    }
    if let Some(port) = port {
        config.listen.port = port;
    }
    if let Some(secs) = timeout {
        config.listen.read_timeout_secs = Some(secs);
    }
    if payload.is_some() {
        config.payload.path = payload;
    }
    if raw {
        config.payload.raw = true;
    }

    let payload_path = config
        .payload
        .path
        .clone()
        .ok_or_else(|| anyhow::anyhow!("No payload given. Use --payload or set JRMP_PAYLOAD"))?;
    let payload = Payload::from_file(&payload_path, config.payload.raw)?;

    let mut server_config = config.server_config()?;
    if bind_all {
        server_config = server_config.bind_all();
    }

    tracing::info!("Payload: {}", payload_path.display());
    if let Some(timeout) = server_config.read_timeout {
        tracing::info!("Read timeout: {:?}", timeout);
    }

    let server = RegistryServer::new(server_config, payload);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async { server.run().await.map_err(|e| anyhow::anyhow!("{}", e)) })
}

fn cmd_inspect(path: &Path, raw: bool) -> anyhow::Result<()> {
    let payload = Payload::from_file(path, raw)?;

    println!("Payload:         {}", path.display());
    println!("Return value:    {} bytes", payload.len());
    println!("Response size:   {} bytes", RETURN_BLOCK_SIZE + payload.len());
    println!();

    for outcome in [ReturnOutcome::Normal, ReturnOutcome::Exceptional] {
        let block = ReturnBlock::new(outcome, CallIdentifier::now(i16::MIN));
        let hex: Vec<String> = block.encode().iter().map(|b| format!("{b:02x}")).collect();
        println!("{:<12} {}", format!("{outcome:?}:"), hex.join(" "));
    }

    let preview: Vec<String> = payload
        .as_bytes()
        .iter()
        .take(16)
        .map(|b| format!("{b:02x}"))
        .collect();
    println!();
    println!("First bytes:     {}", preview.join(" "));

    Ok(())
}
