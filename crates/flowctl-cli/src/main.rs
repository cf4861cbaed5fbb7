mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{actions::ActionsSubcommand, config::ConfigSubcommand};
use flowctl_core::config::StoreBackend;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "flowctl",
    about = "Admit resume/kill actions against flow executions, exactly once",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .flowctl/)
    #[arg(long, global = true, env = "FLOWCTL_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .flowctl/ and a default config
    Init {
        /// Store backend for pending actions
        #[arg(long, value_enum, default_value = "sqlite")]
        backend: BackendArg,

        /// Name of this replica (default: $HOSTNAME or a random id)
        #[arg(long)]
        replica_id: Option<String>,
    },

    /// Run the HTTP action server
    Serve {
        /// Port to listen on (default: server.port from config)
        #[arg(long)]
        port: Option<u16>,

        /// Start as the active leader rather than a standby
        #[arg(long)]
        leader: bool,
    },

    /// Queue a resume of a flow execution
    Resume {
        flow_group: String,
        flow_name: String,
        #[arg(allow_negative_numbers = true)]
        flow_execution_id: i64,
    },

    /// Queue a kill of a flow execution
    Kill {
        flow_group: String,
        flow_name: String,
        #[arg(allow_negative_numbers = true)]
        flow_execution_id: i64,
    },

    /// Inspect and remove pending actions
    Actions {
        #[command(subcommand)]
        subcommand: ActionsSubcommand,
    },

    /// Show or validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum BackendArg {
    Sqlite,
    Redb,
    Memory,
}

impl From<BackendArg> for StoreBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Redb => StoreBackend::Redb,
            BackendArg::Sqlite => StoreBackend::Sqlite,
            BackendArg::Memory => StoreBackend::Memory,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let result = match cli.command {
        Commands::Init {
            backend,
            replica_id,
        } => cmd::init::run(&root, backend.into(), replica_id, cli.json),
        Commands::Serve { port, leader } => cmd::serve::run(&root, port, leader),
        Commands::Resume {
            flow_group,
            flow_name,
            flow_execution_id,
        } => cmd::submit::resume(&root, flow_group, flow_name, flow_execution_id, cli.json),
        Commands::Kill {
            flow_group,
            flow_name,
            flow_execution_id,
        } => cmd::submit::kill(&root, flow_group, flow_name, flow_execution_id, cli.json),
        Commands::Actions { subcommand } => cmd::actions::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
