//! `speedlog latest` — the most recent measurement.

use speedlog_core::LogStore;

/// Run the latest command.
pub fn run(store: &LogStore, json: bool) {
    let Some(record) = super::or_exit(store.latest()) else {
        super::no_data_hint(store);
        return;
    };
    if json {
        super::print_json(&record);
        return;
    }
    println!("Latest measurement");
    println!("  Time:     {}", record.timestamp.format("%Y-%m-%d %H:%M:%S"));
    println!("  Download: {:.2} Mbps", record.download_mbps);
    println!("  Upload:   {:.2} Mbps", record.upload_mbps);
    println!("  Ping:     {:.2} ms", record.ping_ms);
    println!("  Server:   {} (ID: {})", record.server_name, record.server_id);
}
