//! iSCSI initiator configuration CLI
//!
//! Commands:
//! - targets: List configured targets
//! - show: Show a target with its portals
//! - add-target / remove-target: Manage targets
//! - add-portal / remove-portal: Manage portals of a target
//! - session / connection: Show or change session and connection parameters
//! - set-auth: Configure target authentication
//! - initiator: Show or change the initiator identity
//! - discovery: Show or clear discovery results

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use std::path::PathBuf;

use iscsi_plist::model::{Auth, Digest, Portal, Target};
use iscsi_plist::prefs::FilePreferenceStore;
use iscsi_plist::secrets::SecretStore;
use iscsi_plist::{Config, ConfigStore};

type Store = ConfigStore<FilePreferenceStore, Box<dyn SecretStore>>;

#[derive(Parser)]
#[command(name = "iscsi-plist")]
#[command(about = "iSCSI initiator configuration management", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "/etc/iscsi-initiator/config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured targets
    Targets,

    /// Show target details
    Show {
        /// Target IQN
        target: String,
    },

    /// Add a target
    AddTarget {
        /// Target IQN
        name: String,

        /// Optional alias
        #[arg(short, long)]
        alias: Option<String>,
    },

    /// Remove a target and its portals
    RemoveTarget {
        /// Target IQN
        target: String,
    },

    /// Add a portal to a target
    AddPortal {
        /// Target IQN
        target: String,

        /// Portal address
        address: String,

        /// TCP port
        #[arg(short, long, default_value = iscsi_plist::model::DEFAULT_PORT)]
        port: String,

        /// Local interface to use
        #[arg(short, long, default_value = "")]
        interface: String,
    },

    /// Remove a portal from a target
    RemovePortal {
        /// Target IQN
        target: String,

        /// Portal address
        address: String,
    },

    /// Show or change session parameters of a target
    Session {
        /// Target IQN
        target: String,

        #[arg(long)]
        error_recovery_level: Option<u8>,

        #[arg(long)]
        max_connections: Option<u32>,
    },

    /// Show or change connection parameters of a portal
    Connection {
        /// Target IQN
        target: String,

        /// Portal address
        address: String,

        #[arg(long, value_enum)]
        header_digest: Option<DigestArg>,

        #[arg(long, value_enum)]
        data_digest: Option<DigestArg>,
    },

    /// Configure authentication for a target
    SetAuth {
        /// Target IQN
        target: String,

        #[arg(value_enum)]
        method: AuthArg,

        /// CHAP user name
        #[arg(short, long)]
        user: Option<String>,

        /// CHAP secret
        #[arg(short, long)]
        secret: Option<String>,
    },

    /// Show or change the initiator identity
    Initiator {
        /// Initiator IQN
        #[arg(short, long)]
        name: Option<String>,

        /// Initiator alias
        #[arg(short, long)]
        alias: Option<String>,

        /// Authentication method
        #[arg(long, value_enum)]
        auth: Option<AuthArg>,

        /// CHAP user name
        #[arg(short, long)]
        user: Option<String>,

        /// CHAP secret
        #[arg(short, long)]
        secret: Option<String>,
    },

    /// Show or clear discovery results
    Discovery {
        #[command(subcommand)]
        action: DiscoveryAction,
    },
}

#[derive(Subcommand)]
enum DiscoveryAction {
    /// Show discovered targets and portals
    Show,

    /// Forget all discovery results
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
enum AuthArg {
    None,
    Chap,
}

#[derive(Clone, Copy, ValueEnum)]
enum DigestArg {
    None,
    Crc32c,
}

impl From<DigestArg> for Digest {
    fn from(arg: DigestArg) -> Self {
        match arg {
            DigestArg::None => Digest::None,
            DigestArg::Crc32c => Digest::Crc32c,
        }
    }
}

fn build_auth(method: AuthArg, user: &Option<String>, secret: &Option<String>) -> Result<Auth> {
    match method {
        AuthArg::None => Ok(Auth::None),
        AuthArg::Chap => {
            let user = user.as_deref().context("CHAP requires --user")?;
            let secret = secret.as_deref().context("CHAP requires --secret")?;
            Ok(Auth::chap(user, secret))
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load configuration from {:?}", cli.config))?;

    env_logger::Builder::from_env(Env::default().default_filter_or(config.logging.log_level.as_str()))
        .init();

    let mut store = config.open_store();
    store
        .synchronize()
        .with_context(|| format!("Failed to load preferences from {:?}", store.prefs().path()))?;

    match &cli.command {
        Commands::Targets => cmd_targets(&store),
        Commands::Show { target } => cmd_show(&store, target),
        Commands::AddTarget { name, alias } => {
            let mut target = Target::new(name.as_str());
            target.alias = alias.clone();
            store.set_target(&target);
            println!("✓ Added target {}", name);
            commit(&mut store)
        }
        Commands::RemoveTarget { target } => {
            require_target(&store, target)?;
            store.remove_target(target);
            println!("✓ Removed target {}", target);
            commit(&mut store)
        }
        Commands::AddPortal {
            target,
            address,
            port,
            interface,
        } => {
            let portal = Portal::new(address.as_str())
                .with_port(port.as_str())
                .with_host_interface(interface.as_str());
            store.set_portal(target, &portal);
            println!("✓ Added portal {}:{} to {}", address, port, target);
            commit(&mut store)
        }
        Commands::RemovePortal { target, address } => {
            if !store.contains_portal(target, address) {
                anyhow::bail!("Portal {} not configured for {}", address, target);
            }
            store.remove_portal(target, address);
            println!("✓ Removed portal {} from {}", address, target);
            commit(&mut store)
        }
        Commands::Session {
            target,
            error_recovery_level,
            max_connections,
        } => cmd_session(&mut store, target, *error_recovery_level, *max_connections),
        Commands::Connection {
            target,
            address,
            header_digest,
            data_digest,
        } => cmd_connection(&mut store, target, address, *header_digest, *data_digest),
        Commands::SetAuth {
            target,
            method,
            user,
            secret,
        } => {
            let auth = build_auth(*method, user, secret)?;
            store.set_target_authentication(target, &auth);
            println!("✓ Authentication for {}: {}", target, auth.method());
            commit(&mut store)
        }
        Commands::Initiator {
            name,
            alias,
            auth,
            user,
            secret,
        } => cmd_initiator(&mut store, name, alias, *auth, user, secret),
        Commands::Discovery { action } => match action {
            DiscoveryAction::Show => cmd_discovery_show(&store),
            DiscoveryAction::Clear => {
                store.clear_discovery_record();
                println!("✓ Cleared discovery results");
                commit(&mut store)
            }
        },
    }
}

fn commit(store: &mut Store) -> Result<()> {
    store
        .synchronize()
        .with_context(|| format!("Failed to write preferences to {:?}", store.prefs().path()))
}

fn require_target(store: &Store, target: &str) -> Result<()> {
    if !store.contains_target(target) {
        anyhow::bail!("Target not configured: {}", target);
    }
    Ok(())
}

fn cmd_targets(store: &Store) -> Result<()> {
    let Some(names) = store.target_names() else {
        println!("No targets configured.");
        return Ok(());
    };

    println!("Configured Targets:\n");
    for name in names {
        let portals = store.portal_addresses(&name).map_or(0, |p| p.len());
        println!("{}", name);
        if let Some(alias) = store.target_data(&name).and_then(|t| t.alias) {
            println!("  Alias:   {}", alias);
        }
        println!("  Portals: {}", portals);
        println!();
    }

    Ok(())
}

fn cmd_show(store: &Store, target: &str) -> Result<()> {
    require_target(store, target)?;

    println!("Target Information:");
    println!("  IQN:            {}", target);
    if let Some(alias) = store.target_data(target).and_then(|t| t.alias) {
        println!("  Alias:          {}", alias);
    }
    if let Some(auth) = store.target_authentication(target) {
        println!("  Authentication: {}", auth.method());
    }
    if let Some(session) = store.session_config(target) {
        println!("  Error Recovery: {}", session.error_recovery_level);
        println!("  Connections:    {}", session.max_connections);
    }

    for address in store.portal_addresses(target).unwrap_or_default() {
        println!("  Portal {}", address);
        if let Some(portal) = store.portal_data(target, &address) {
            println!("    Port:         {}", portal.port);
            if !portal.host_interface.is_empty() {
                println!("    Interface:    {}", portal.host_interface);
            }
        }
        if let Some(conn) = store.connection_config(target, &address) {
            println!("    Header Digest: {}", conn.header_digest);
            println!("    Data Digest:   {}", conn.data_digest);
        }
    }

    Ok(())
}

fn cmd_session(
    store: &mut Store,
    target: &str,
    error_recovery_level: Option<u8>,
    max_connections: Option<u32>,
) -> Result<()> {
    require_target(store, target)?;
    let mut session = store.session_config(target).unwrap_or_default();

    if error_recovery_level.is_none() && max_connections.is_none() {
        println!("Error Recovery Level: {}", session.error_recovery_level);
        println!("Maximum Connections:  {}", session.max_connections);
        return Ok(());
    }

    if let Some(level) = error_recovery_level {
        anyhow::ensure!(level <= 2, "error recovery level must be 0, 1 or 2");
        session.error_recovery_level = level;
    }
    if let Some(count) = max_connections {
        anyhow::ensure!(count >= 1, "maximum connections must be at least 1");
        session.max_connections = count;
    }

    store.set_session_config(target, &session);
    println!("✓ Updated session parameters for {}", target);
    commit(store)
}

fn cmd_connection(
    store: &mut Store,
    target: &str,
    address: &str,
    header_digest: Option<DigestArg>,
    data_digest: Option<DigestArg>,
) -> Result<()> {
    if !store.contains_portal(target, address) {
        anyhow::bail!("Portal {} not configured for {}", address, target);
    }
    let mut conn = store.connection_config(target, address).unwrap_or_default();

    if header_digest.is_none() && data_digest.is_none() {
        println!("Header Digest: {}", conn.header_digest);
        println!("Data Digest:   {}", conn.data_digest);
        return Ok(());
    }

    if let Some(digest) = header_digest {
        conn.header_digest = digest.into();
    }
    if let Some(digest) = data_digest {
        conn.data_digest = digest.into();
    }

    store.set_connection_config(target, address, &conn);
    println!("✓ Updated connection parameters for {} at {}", target, address);
    commit(store)
}

fn cmd_initiator(
    store: &mut Store,
    name: &Option<String>,
    alias: &Option<String>,
    auth: Option<AuthArg>,
    user: &Option<String>,
    secret: &Option<String>,
) -> Result<()> {
    if name.is_none() && alias.is_none() && auth.is_none() {
        println!("Initiator:");
        println!("  Name:           {}", store.initiator_name().unwrap_or_default());
        println!("  Alias:          {}", store.initiator_alias().unwrap_or_default());
        let method = store.initiator_authentication().unwrap_or_default().method();
        println!("  Authentication: {}", method);
        return Ok(());
    }

    if let Some(name) = name {
        store.set_initiator_name(name);
    }
    if let Some(alias) = alias {
        store.set_initiator_alias(alias);
    }
    if let Some(method) = auth {
        let auth = build_auth(method, user, secret)?;
        if store.initiator_name().unwrap_or_default().is_empty() {
            log::warn!("Initiator name is not set; CHAP secret cannot be keyed");
        }
        store.set_initiator_authentication(&auth);
    }

    println!("✓ Updated initiator");
    commit(store)
}

fn cmd_discovery_show(store: &Store) -> Result<()> {
    let Some(record) = store.copy_discovery_record().filter(|r| !r.is_empty()) else {
        println!("No discovery results.");
        return Ok(());
    };

    println!("Discovered Targets:\n");
    for name in record.target_names() {
        println!("{}", name);
        for (tag, portals) in record.portal_groups(&name).into_iter().flatten() {
            for portal in portals.values() {
                println!("  [{}] {}:{}", tag, portal.address, portal.port);
            }
        }
    }

    Ok(())
}
