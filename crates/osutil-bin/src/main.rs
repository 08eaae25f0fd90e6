use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use osutil_core::config::{OsUtilConfig, Platform};
use osutil_core::factory;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "osutil")]
#[command(about = "Host administration through the platform's own command-line tools")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(long, env = "OSUTIL_CONFIG_PATH", global = true)]
    config_path: Option<String>,

    /// Platform variant (auto, default, freebsd)
    #[arg(long, env = "OSUTIL_PLATFORM", global = true)]
    platform: Option<Platform>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "OSUTIL_LOG_LEVEL", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print name, IPv4 address and MAC of the primary Ethernet interface
    NetInfo {
        /// Attempts before giving up (default from config)
        #[arg(long)]
        retries: Option<u32>,
    },
    /// Print the normalized MAC of an interface
    IfMac { ifname: String },
    /// Create a user account with a home directory
    UserAdd {
        username: String,
        /// Account expiration date
        #[arg(long)]
        expiration: Option<String>,
    },
    /// Delete a user account and its sudo grant
    DelUser { username: String },
    /// Set a user's password
    Passwd {
        username: String,
        #[arg(long, env = "OSUTIL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Remove the root password
    DelRootPassword,
    /// Grant or revoke sudo rights
    Sudoer {
        username: String,
        #[arg(long)]
        nopasswd: bool,
        #[arg(long)]
        remove: bool,
    },
    /// Add a network route
    RouteAdd {
        net: String,
        mask: String,
        gateway: String,
    },
    /// Pin (or remove) the all-ones broadcast route to an interface
    BroadcastRoute {
        ifname: String,
        #[arg(long)]
        remove: bool,
    },
    /// Report whether an explicit DHCP broadcast route is needed
    MissingDefaultRoute,
    /// Print the DHCP client pid
    DhcpPid,
    /// Restart an interface
    RestartIf { ifname: String },
    /// Restart the SSH daemon
    RestartSsh,
    /// Eject the provisioning media
    Eject {
        /// Fail when the eject command fails
        #[arg(long)]
        strict: bool,
    },
    /// Print physical memory in MiB
    TotalMem,
    /// Print the processor core count
    Cores,
    /// Set the SCSI disk command timeout
    ScsiTimeout {
        /// Seconds (default from config)
        #[arg(long)]
        timeout: Option<u32>,
    },
    /// Report whether a process is alive
    PidAlive { pid: u32 },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli
        .config_path
        .map(std::path::PathBuf::from)
        .unwrap_or_else(OsUtilConfig::default_path);

    let mut config = if config_path.exists() {
        info!("loading config from {}", config_path.display());
        OsUtilConfig::load(&config_path)?
    } else {
        OsUtilConfig::default()
    };

    // CLI args override config file
    if let Some(platform) = cli.platform {
        config.platform = platform;
    }

    let os_util = factory::build_os_util(&config);
    let out = commands::execute(os_util.as_ref(), &config, cli.command)?;
    println!("{}", out);
    Ok(())
}
