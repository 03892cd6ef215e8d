//! InfiniBox management CLI
//!
//! Thin command-line front end over the `infinibox_client` library: look up
//! resources, list volumes, and detach or delete volumes.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use infinibox_client::{Client, ClientConfig, DeleteOptions, QueryOp};

// =============================================================================
// CLI Arguments
// =============================================================================

/// InfiniBox management CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(long, env = "INFINIBOX_CONFIG")]
    config: Option<PathBuf>,

    /// Array management URL
    #[arg(long, env = "INFINIBOX_URL")]
    url: Option<String>,

    /// Management user
    #[arg(long, env = "INFINIBOX_USERNAME")]
    username: Option<String>,

    /// Management password
    #[arg(long, env = "INFINIBOX_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Tenant name to scope requests to
    #[arg(long, env = "INFINIBOX_TENANT")]
    tenant: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "INFINIBOX_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Retries for connection-level failures
    #[arg(long, env = "INFINIBOX_RETRY_COUNT")]
    retry_count: Option<u32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Remove every LUN mapping of a volume
    Unmap {
        #[arg(long)]
        volume: String,
    },
    /// Delete a volume
    DeleteVolume {
        #[arg(long)]
        volume: String,
        /// Detach from all hosts and host clusters first
        #[arg(long)]
        unmap: bool,
    },
    /// Filtered lookup on a collection, printing the raw result
    Find {
        collection: String,
        field: String,
        value: String,
        #[arg(long, default_value = "eq")]
        op: String,
    },
    /// List all volumes
    Volumes,
    /// List LUN mappings of a volume
    Luns {
        #[arg(long)]
        volume: String,
    },
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args)?;

    let config = build_config(&args)?;
    info!("Connecting to {}", config.url);
    let client = Client::connect(&config).await?;

    match args.command {
        Command::Unmap { volume } => {
            let volume = client.get_volume_by_name(&volume).await?;
            client.unmap(&volume).await?;
            info!("Volume {} unmapped", volume.name);
        }
        Command::DeleteVolume { volume, unmap } => {
            let volume = client.get_volume_by_name(&volume).await?;
            client.delete_volume(&volume, DeleteOptions { unmap }).await?;
            info!("Volume {} deleted", volume.name);
        }
        Command::Find {
            collection,
            field,
            value,
            op,
        } => {
            let op: QueryOp = op.parse()?;
            let found = client.find(&collection, &field, op, &value).await?;
            print_json(&found)?;
        }
        Command::Volumes => {
            let volumes = client.list_volumes().await?;
            print_json(&volumes)?;
        }
        Command::Luns { volume } => {
            let volume = client.get_volume_by_name(&volume).await?;
            let luns = client.volume_luns(&volume).await?;
            print_json(&luns)?;
        }
    }

    Ok(())
}

fn build_config(args: &Args) -> anyhow::Result<ClientConfig> {
    let mut config = match &args.config {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ClientConfig::default(),
    };

    if let Some(url) = &args.url {
        config.url = url.clone();
    }
    if let Some(username) = &args.username {
        config.username = username.clone();
    }
    if let Some(password) = &args.password {
        config.password = password.clone();
    }
    if let Some(tenant) = &args.tenant {
        config.tenant = Some(tenant.clone());
    }
    if let Some(timeout) = args.timeout_secs {
        config.timeout_secs = timeout;
    }
    if let Some(retries) = args.retry_count {
        config.retry_count = retries;
    }

    config.validate()?;
    Ok(config)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) -> anyhow::Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?)
        .add_directive("rustls=warn".parse()?);

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}
