use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use expense_tracker::config::Config;
use expense_tracker::{gate, parse, server};

#[derive(Parser)]
#[command(name = "expense-tracker")]
#[command(about = "Expense tracker with a cache-then-network asset gate", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the expense web service
    Serve {
        /// Bind host (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Bind port (overrides config)
        #[arg(long)]
        port: Option<u16>,
        /// SQLite database path (overrides config)
        #[arg(long)]
        db: Option<std::path::PathBuf>,
    },
    /// Run the caching gate proxy in front of the service
    Gate {
        /// Origin to front (overrides config)
        #[arg(long)]
        origin: Option<String>,
        /// Bind host (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Bind port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Parse one SMS line and print the entry as JSON
    Parse {
        /// Raw SMS text
        text: String,
        /// Year assumed for timestamps without one
        #[arg(long)]
        year: Option<i32>,
    },
    /// Configure expense-tracker
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
        /// Set the origin the gate fronts
        #[arg(long)]
        origin: Option<String>,
        /// Set the web service port
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "expense_tracker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port, db } => {
            let mut config = Config::load()?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(db) = db {
                config.database.path = Some(db);
            }
            server::start_server(config).await?;
        }
        Commands::Gate { origin, host, port } => {
            let mut config = Config::load()?;
            if let Some(origin) = origin {
                config.gate.origin = origin;
            }
            if let Some(host) = host {
                config.gate.host = host;
            }
            if let Some(port) = port {
                config.gate.port = port;
            }
            gate::service::run_gate(config.gate).await?;
        }
        Commands::Parse { text, year } => {
            let entry = parse::parse_entry(&text, year);
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        Commands::Config { show, origin, port } => {
            handle_config(show, origin, port)?;
        }
    }

    Ok(())
}

fn handle_config(show: bool, origin: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        println!("Current configuration:");
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let mut changed = false;

    if let Some(origin) = origin {
        config.gate.origin = origin;
        changed = true;
        println!("Gate origin updated");
    }

    if let Some(port) = port {
        config.server.port = port;
        changed = true;
        println!("Server port updated");
    }

    if changed {
        config.save()?;
        println!("Configuration saved to: {:?}", Config::config_path()?);
    } else {
        println!("No changes made. Use --show to view current configuration.");
    }

    Ok(())
}
