use speedlog_server::ServerConfig;

pub fn run(config: ServerConfig) {
    let base = format!("http://{}:{}", config.host, config.port);

    println!("📶 Speedlog Server v{}", speedlog_core::VERSION);
    println!("   {base}");
    println!("   Log: {}", config.log.path.display());
    println!();
    println!("   Endpoints:");
    println!("     GET /          HTML index");
    println!("     GET /stats     All-time statistics");
    println!("     GET /latest    Most recent measurement");
    println!("     GET /series    Recent history with cumulative averages");
    println!();
    println!("   Query params for /series:");
    println!("     days=N         Trailing window (default: {})", config.window_days);
    println!();
    println!("   Examples:");
    println!("     curl {base}/stats");
    println!("     curl {base}/series?days=7");
    println!();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting runtime: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(speedlog_server::run_server(config)) {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}
