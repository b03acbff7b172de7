//! Operator CLI for the key-management backend
//!
//! Drives every gateway operation from the terminal and prints JSON. Reads
//! print `{ data, source }` so example data served during an outage is never
//! mistaken for live data.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

mod commands;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use keyadmin_core::Config;
use keyadmin_core::proxy::ProxyProtocol;
use keyadmin_gateway::Gateway;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Command line interface for the key-management backend
#[derive(Parser)]
#[command(
    name = "keyadmin",
    version = env!("CARGO_PKG_VERSION"),
    about = "Administer license keys, credits, providers and proxy pools"
)]
struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend base URL, including the /api prefix
    #[arg(long, env = "KEYADMIN_API_URL", value_name = "URL")]
    api_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable structured JSON logging
    #[arg(long)]
    json: bool,

    /// Skip the liveness probe made before the command runs
    #[arg(long)]
    no_wake: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Probe the backend and show availability
    Status,

    /// Show the resolved configuration as TOML
    Config,

    /// Manage license keys
    Keys {
        /// Key subcommand
        #[command(subcommand)]
        action: KeyCommands,
    },

    /// Manage upstream API providers
    Providers {
        /// Provider subcommand
        #[command(subcommand)]
        action: ProviderCommands,
    },

    /// Manage credit packages
    Packages {
        /// Package subcommand
        #[command(subcommand)]
        action: PackageCommands,
    },

    /// Show the audit trail
    Audit,

    /// Show dashboard statistics
    Stats,

    /// Manage the proxy pool
    Proxies {
        /// Proxy subcommand
        #[command(subcommand)]
        action: ProxyCommands,
    },

    /// Show or set bank transfer details
    Bank {
        /// Bank subcommand
        #[command(subcommand)]
        action: BankCommands,
    },
}

/// Key commands
#[derive(Subcommand)]
enum KeyCommands {
    /// List keys
    List {
        /// Print counters instead of the key list
        #[arg(long)]
        summary: bool,
    },

    /// Issue a key
    Create {
        /// Starting credit
        #[arg(long, default_value_t = 0)]
        credit: i64,

        /// Free-text note
        #[arg(long)]
        note: Option<String>,

        /// Days until expiry
        #[arg(long, value_name = "DAYS")]
        expires_in: Option<i64>,

        /// Maximum activations
        #[arg(long, default_value_t = 1)]
        max_activations: u32,

        /// Issue a trial key
        #[arg(long)]
        trial: bool,

        /// Issue the key inactive
        #[arg(long)]
        inactive: bool,
    },

    /// Add credits to a key; negative amounts deduct
    Credit {
        /// Key string
        key: String,

        /// Signed amount
        #[arg(allow_hyphen_values = true)]
        amount: f64,
    },

    /// Edit a key's details
    Update {
        /// Key identifier
        id: String,

        /// New note
        #[arg(long)]
        note: Option<String>,

        /// Days until expiry, from now
        #[arg(long, value_name = "DAYS")]
        expires_in: Option<i64>,

        /// New activation limit
        #[arg(long)]
        max_activations: Option<u32>,

        /// Set or clear the trial flag
        #[arg(long, action = ArgAction::Set)]
        trial: Option<bool>,
    },

    /// Activate a key
    Activate {
        /// Key identifier
        id: String,
    },

    /// Deactivate a key
    Deactivate {
        /// Key identifier
        id: String,
    },

    /// Revoke a key
    Revoke {
        /// Key string
        key: String,
    },
}

/// Provider commands
#[derive(Subcommand)]
enum ProviderCommands {
    /// List providers
    List,

    /// Register a provider
    Create {
        /// Display name
        name: String,
    },

    /// Add a credential to a provider
    AddKey {
        /// Provider identifier
        provider_id: String,

        /// Credential
        key: String,

        /// Optional nickname
        #[arg(long)]
        nickname: Option<String>,
    },

    /// Remove a credential from a provider
    RemoveKey {
        /// Provider identifier
        provider_id: String,

        /// Credential identifier
        key_id: String,
    },
}

/// Package fields shared by create and update
#[derive(clap::Args)]
struct PackageArgs {
    /// Display name
    #[arg(long)]
    name: String,

    /// Price in VND
    #[arg(long)]
    price: f64,

    /// Credits granted
    #[arg(long)]
    credits: i64,

    /// Bonus label
    #[arg(long)]
    bonus: Option<String>,

    /// Marketing description
    #[arg(long)]
    description: Option<String>,

    /// Highlight as the popular choice
    #[arg(long)]
    popular: bool,

    /// Hide from sale
    #[arg(long)]
    inactive: bool,
}

/// Package commands
#[derive(Subcommand)]
enum PackageCommands {
    /// List packages
    List,

    /// Create a package
    Create(PackageArgs),

    /// Replace a package
    Update {
        /// Package identifier
        id: String,

        /// New fields
        #[command(flatten)]
        package: PackageArgs,
    },

    /// Delete a package
    Delete {
        /// Package identifier
        id: String,
    },
}

/// Proxy commands
#[derive(Subcommand)]
enum ProxyCommands {
    /// List one page of proxies
    List {
        /// 1-based page
        #[arg(long)]
        page: Option<u32>,

        /// Page size
        #[arg(long)]
        limit: Option<u32>,

        /// active, inactive or all
        #[arg(long)]
        status: Option<String>,

        /// Region filter
        #[arg(long)]
        location: Option<String>,

        /// true, false or all
        #[arg(long)]
        assigned: Option<String>,
    },

    /// Show pool statistics
    Stats,

    /// Add a proxy
    Add {
        /// Display name
        #[arg(long)]
        name: String,

        /// Host name or address
        #[arg(long)]
        host: String,

        /// Port
        #[arg(long)]
        port: u16,

        /// Protocol (http, https, socks4, socks5)
        #[arg(long, value_parser = parse_protocol)]
        protocol: Option<ProxyProtocol>,

        /// Proxy user
        #[arg(long)]
        username: Option<String>,

        /// Proxy password
        #[arg(long)]
        password: Option<String>,

        /// Region label
        #[arg(long)]
        location: Option<String>,

        /// Vendor label
        #[arg(long)]
        provider: Option<String>,

        /// Operator notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Edit a proxy
    Update {
        /// Proxy identifier
        id: String,

        /// New display name
        #[arg(long)]
        name: Option<String>,

        /// New host
        #[arg(long)]
        host: Option<String>,

        /// New port
        #[arg(long)]
        port: Option<u16>,

        /// New protocol
        #[arg(long, value_parser = parse_protocol)]
        protocol: Option<ProxyProtocol>,

        /// Switch the proxy on or off
        #[arg(long, action = ArgAction::Set)]
        active: Option<bool>,

        /// New region label
        #[arg(long)]
        location: Option<String>,

        /// New notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Remove a proxy
    Delete {
        /// Proxy identifier
        id: String,
    },

    /// Test one proxy
    Test {
        /// Proxy identifier
        id: String,
    },

    /// Test every active proxy
    TestAll,

    /// Assign free proxies to provider credentials
    AutoAssign {
        /// Restrict to one provider
        #[arg(long)]
        provider: Option<String>,

        /// Reassign credentials that already have a proxy
        #[arg(long)]
        force: bool,
    },
}

/// Bank commands
#[derive(Subcommand)]
enum BankCommands {
    /// Show the bank details
    Show,

    /// Save the bank details
    Set {
        /// Bank name
        #[arg(long)]
        bank_name: String,

        /// Account number
        #[arg(long)]
        account_number: String,

        /// Account holder
        #[arg(long)]
        account_name: String,

        /// Branch
        #[arg(long, default_value = "")]
        branch_name: String,

        /// Payment note shown to customers
        #[arg(long)]
        note: Option<String>,
    },
}

fn parse_protocol(value: &str) -> std::result::Result<ProxyProtocol, String> {
    serde_json::from_value(serde_json::Value::String(value.to_ascii_lowercase()))
        .map_err(|_| format!("unknown protocol {value}, expected http, https, socks4 or socks5"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).await?;
    if let Some(api_url) = cli.api_url.clone() {
        config.gateway.api_url = Some(api_url);
    }
    if let Some(level) = cli.log_level.clone() {
        config.logging.level = level;
    }
    if cli.json {
        config.logging.format = "json".to_string();
    }

    keyadmin_core::init_logging(&config.logging)?;

    if matches!(cli.command, Commands::Config) {
        let rendered =
            toml::to_string_pretty(&config).context("failed to serialize configuration")?;
        println!("{rendered}");
        return Ok(());
    }

    let gateway = Gateway::new(config.gateway).context("failed to create gateway")?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = gateway.base_url(),
        "keyadmin starting"
    );

    if !cli.no_wake {
        gateway.wake_up().await;
    }

    commands::run(&gateway, cli.command).await
}

/// Load configuration from a TOML file, or from the default sources
async fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Config::load().context("failed to load configuration");
    };

    debug!(path = %path.display(), "loading configuration file");
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    config.gateway.validate()?;
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::unreachable)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_negative_credit_amount_parses() {
        let cli = Cli::try_parse_from(["keyadmin", "keys", "credit", "TV-1", "-3"]).unwrap();
        match cli.command {
            Commands::Keys {
                action: KeyCommands::Credit { key, amount },
            } => {
                assert_eq!(key, "TV-1");
                assert!((amount + 3.0).abs() < f64::EPSILON);
            }
            _ => unreachable!("parsed into the wrong command"),
        }
    }

    #[test]
    fn test_parse_protocol() {
        assert_eq!(parse_protocol("SOCKS5").unwrap(), ProxyProtocol::Socks5);
        assert!(parse_protocol("ftp").is_err());
    }

    #[tokio::test]
    async fn test_load_config_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keyadmin.toml");
        std::fs::write(
            &path,
            "[gateway]\napi_url = \"http://127.0.0.1:5000/api\"\ntimeout_ms = 2000\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).await.unwrap();

        assert_eq!(config.gateway.base_url(), "http://127.0.0.1:5000/api");
        assert_eq!(config.gateway.timeout_ms, 2_000);
        assert_eq!(config.gateway.proxy_timeout_ms, 60_000);
        assert_eq!(config.logging.level, "debug");
    }

    #[tokio::test]
    async fn test_load_config_rejects_invalid_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keyadmin.toml");
        std::fs::write(&path, "[gateway]\nprobe_timeout_ms = 30000\n").unwrap();

        assert!(load_config(Some(&path)).await.is_err());
    }
}
