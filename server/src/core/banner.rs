//! Startup banner and URL display

use super::config::is_all_interfaces;
use super::constants::APP_NAME;

/// Print the startup banner with the API URL and data sources
pub fn print_banner(host: &str, port: u16, db_path: &str, categories: usize) {
    // Use localhost for display when binding to all interfaces
    let display_host = if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    };

    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    println!();

    const W: usize = 12;
    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m http://{}:{}/api/v1",
        "API:", display_host, port
    );
    println!(
        "  \x1b[90m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
        "Database:", db_path
    );
    println!(
        "  \x1b[90m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
        "Categories:", categories
    );
    println!();
}
