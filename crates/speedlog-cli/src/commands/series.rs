//! `speedlog series` — recent history with the cumulative average overlay.

use chrono::Local;
use speedlog_core::{LogStore, WindowedSeries};

/// Run the series command.
pub fn run(store: &LogStore, days: u32, json: bool) {
    let now = Local::now().naive_local();
    let Some(series) = super::or_exit(store.series(days, now)) else {
        println!("No measurements in the last {days} days.");
        return;
    };
    if json {
        super::print_json(&series);
    } else {
        print_table(&series, days);
    }
}

fn print_table(series: &WindowedSeries, days: u32) {
    println!("Speed history, last {days} days ({} points)", series.len());
    println!();
    println!(
        "{:<17} {:>10} {:>10} {:>12} {:>12}",
        "Time", "Download", "Upload", "Avg Down", "Avg Up"
    );
    println!("{}", "-".repeat(65));
    for p in series.points() {
        println!(
            "{:<17} {:>10.2} {:>10.2} {:>12.2} {:>12.2}",
            p.timestamp.format("%Y-%m-%d %H:%M"),
            p.download,
            p.upload,
            p.cumulative_avg_download,
            p.cumulative_avg_upload,
        );
    }
    println!();
    println!("Averages are cumulative over the full history, not just this window.");
}
