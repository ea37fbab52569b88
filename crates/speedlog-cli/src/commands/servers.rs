//! `speedlog servers` — search the speedtest client's server list.

use crate::speedtest::{Speedtest, matching};

/// Run the servers command.
pub fn run(term: &str) {
    let term = term.trim_matches(['\'', '"']);
    let speedtest = match Speedtest::locate() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    println!("Searching for servers matching '{term}'...");
    let servers = match speedtest.list_servers() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error listing servers: {e}");
            std::process::exit(1);
        }
    };

    let found = matching(&servers, term);
    if found.is_empty() {
        println!("No server matching '{term}' in the local server list.");
        println!("Note: the official CLI mainly lists geographically close servers.");
        return;
    }

    for server in found {
        println!();
        println!("  Server Name: {} ({})", server.name, server.location);
        println!("  Server URL:  {}", server.host);
        println!("  Server ID:   {}", server.id);
    }
}
