//! `speedlog stats` — all-time statistics.

use speedlog_core::{LogStore, StatsSnapshot};

/// Run the stats command.
pub fn run(store: &LogStore, json: bool) {
    let Some(stats) = super::or_exit(store.stats()) else {
        super::no_data_hint(store);
        return;
    };
    if json {
        super::print_json(&stats);
    } else {
        print_table(&stats);
    }
}

fn print_table(stats: &StatsSnapshot) {
    println!("{} measurement(s)", stats.count);
    println!();
    println!("{:<10} {:>10} {:>10} {:>10}", "", "Average", "Min", "Max");
    println!("{}", "-".repeat(43));
    println!(
        "{:<10} {:>10.2} {:>10.2} {:>10.2}",
        "Download", stats.avg_download, stats.min_download, stats.max_download
    );
    println!(
        "{:<10} {:>10.2} {:>10.2} {:>10.2}",
        "Upload", stats.avg_upload, stats.min_upload, stats.max_upload
    );
    println!("{:<10} {:>10.2}", "Ping", stats.avg_ping);
}
