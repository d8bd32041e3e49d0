use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gemserver_core::{Backend, StatusPolicy};

/// Manage keys and read stats on a private gemserver.
#[derive(Debug, Parser)]
#[command(name = "gemserver-admin", version)]
struct Cli {
    /// Gemserver host. Defaults to the App Engine default hostname.
    #[arg(long, global = true, env = "GEMSERVER_HOST")]
    host: Option<String>,

    /// Fail on non-2xx responses instead of printing the body.
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a new key.
    CreateKey {
        /// read, write or both.
        #[arg(long)]
        permissions: Option<String>,
    },
    /// Revoke an existing key.
    DeleteKey { key: String },
    /// Show private gem and cached dependency stats.
    Stats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let body = run(&cli)?;
    println!("{body}");
    Ok(())
}

fn run(cli: &Cli) -> Result<String> {
    let policy = if cli.strict {
        StatusPolicy::Strict
    } else {
        StatusPolicy::Lenient
    };
    let backend = Backend::new(cli.host.as_deref())
        .context("failed to set up gemserver client")?
        .with_status_policy(policy);
    tracing::debug!(base_url = %backend.base_url(), "using gemserver");

    let body = match &cli.command {
        Command::CreateKey { permissions } => backend
            .create_key(permissions.as_deref())
            .context("create-key failed")?,
        Command::DeleteKey { key } => backend.delete_key(key).context("delete-key failed")?,
        Command::Stats => backend.stats().context("stats failed")?,
    };
    Ok(body)
}
