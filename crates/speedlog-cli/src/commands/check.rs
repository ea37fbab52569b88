//! `speedlog check` — run one speed test and append it to the log.

use speedlog_core::LogStore;

use crate::speedtest::{Speedtest, SpeedtestError};

/// Run the check command.
pub fn run(store: &LogStore, server_id: Option<u32>, server_name: Option<&str>) {
    let speedtest = match Speedtest::locate() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    println!("Using official Ookla speedtest CLI at: {}", speedtest.command());

    let server = match (server_id, server_name) {
        (Some(id), _) => {
            println!("Using server ID: {id}");
            Some(id.to_string())
        }
        (None, Some(name)) => resolve(&speedtest, name),
        (None, None) => None,
    };

    println!("Running speedtest...");
    let run = match speedtest.run(server.as_deref()) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("Speedtest failed: {e}");
            std::process::exit(1);
        }
    };

    let m = &run.measurement;
    println!();
    println!("Results:");
    println!("  Download:   {:.2} Mbps", m.download_mbps);
    println!("  Upload:     {:.2} Mbps", m.upload_mbps);
    println!("  Ping:       {:.2} ms", m.ping_ms);
    println!("  Server:     {} (ID: {})", m.server_name, m.server_id);
    println!(
        "  Result URL: {}",
        run.result_url.as_deref().unwrap_or("N/A")
    );

    super::or_exit(store.log_measurement(run.measurement));

    if let Some(stats) = super::or_exit(store.stats()) {
        println!();
        println!("Historical averages ({} runs, all servers):", stats.count);
        println!("  Avg Download: {:.2} Mbps", stats.avg_download);
        println!("  Avg Upload:   {:.2} Mbps", stats.avg_upload);
        println!("  Avg Ping:     {:.2} ms", stats.avg_ping);
    }
}

/// Turn a partial server name into an id, falling back to automatic
/// selection when nothing matches.
fn resolve(speedtest: &Speedtest, name: &str) -> Option<String> {
    let name = name.trim_matches(['\'', '"']);
    match speedtest.resolve_server_id(name) {
        Ok(Some(id)) => {
            println!("Resolved server '{name}' to ID {id}");
            Some(id)
        }
        Ok(None) => {
            eprintln!("Warning: no server matching '{name}'; using automatic selection");
            None
        }
        Err(e @ SpeedtestError::Parse(_)) | Err(e @ SpeedtestError::Failed { .. }) => {
            eprintln!("Warning: could not list servers ({e}); using automatic selection");
            None
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
