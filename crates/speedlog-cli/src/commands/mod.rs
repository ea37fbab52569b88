pub mod check;
pub mod latest;
pub mod series;
pub mod server;
pub mod servers;
pub mod stats;

use serde::Serialize;
use speedlog_core::LogError;

/// Unwrap an engine result or report the failure and exit.
pub fn or_exit<T>(result: Result<T, LogError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error encoding JSON: {e}");
            std::process::exit(1);
        }
    }
}

/// Message shown when the log holds nothing to report.
pub fn no_data_hint(store: &speedlog_core::LogStore) {
    println!("No measurements found in {}", store.path().display());
    println!("Record one first: speedlog check");
}
