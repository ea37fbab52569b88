//! CLI for speedlog — run speed tests, keep the history, ask it questions.

mod commands;
mod speedtest;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use speedlog_core::{DEFAULT_LOG_FILE, DEFAULT_WINDOW_DAYS, LogConfig, LogStore};
use speedlog_server::ServerConfig;

#[derive(Parser)]
#[command(name = "speedlog")]
#[command(about = "speedlog — a durable history of your connection speed")]
#[command(version = speedlog_core::VERSION)]
struct Cli {
    /// Measurement log file
    #[arg(long, global = true, default_value = DEFAULT_LOG_FILE)]
    log: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a speed test with the official Ookla CLI and append the result
    Check {
        /// Preferred server ID
        #[arg(long)]
        server_id: Option<u32>,

        /// Preferred server name (partial match, resolved to an ID)
        #[arg(long)]
        server_name: Option<String>,
    },

    /// Search the speedtest server list by name, location or host
    Servers {
        /// Text to look for (case-insensitive)
        term: String,
    },

    /// All-time averages and min/max envelopes
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// The most recent measurement
    Latest {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Measurements from the last N days with cumulative averages
    Series {
        /// Trailing window in days
        #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
        days: u32,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP stats server
    Server {
        /// Port to listen on
        #[arg(long, default_value = "8000")]
        port: u16,

        /// Bind address
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Default window for /series, in days
        #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
        days: u32,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let log_config = LogConfig::at(cli.log);
    let store = LogStore::from_config(&log_config);

    match cli.command {
        Commands::Check {
            server_id,
            server_name,
        } => commands::check::run(&store, server_id, server_name.as_deref()),
        Commands::Servers { term } => commands::servers::run(&term),
        Commands::Stats { json } => commands::stats::run(&store, json),
        Commands::Latest { json } => commands::latest::run(&store, json),
        Commands::Series { days, json } => commands::series::run(&store, days, json),
        Commands::Server { port, host, days } => commands::server::run(ServerConfig {
            host,
            port,
            window_days: days,
            log: log_config,
        }),
    }
}
