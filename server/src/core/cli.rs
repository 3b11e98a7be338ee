use clap::{Parser, Subcommand};

use std::path::PathBuf;

use chrono::NaiveTime;

use crate::data::schema::Column;
use crate::domain::filters::RangeFilter;

use super::constants::{
    ENV_CATEGORIES_FILE, ENV_CONFIG, ENV_DB_PATH, ENV_HOST, ENV_PORT, ENV_QUERY_TIMEOUT,
};

#[derive(Parser)]
#[command(name = "busfinder")]
#[command(version, about = "Bus schedule search over per-region tables", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite schedule database
    #[arg(long, global = true, env = ENV_DB_PATH)]
    pub db_path: Option<String>,

    /// Store call timeout in seconds
    #[arg(long, global = true, env = ENV_QUERY_TIMEOUT)]
    pub query_timeout_secs: Option<u64>,

    /// JSON file replacing the bundled bus category map
    #[arg(long, global = true, env = ENV_CATEGORIES_FILE)]
    pub categories_file: Option<String>,
}

/// Parse a filter column from CLI string (`route_name`, `Bus_Type`, ...)
fn parse_column(s: &str) -> Result<Column, String> {
    s.parse()
}

/// Parse a departure window (`08:00:00..18:00:00`)
fn parse_time_range(s: &str) -> Result<RangeFilter<NaiveTime>, String> {
    s.parse()
}

/// Parse a numeric window (`0..1000`)
fn parse_real_range(s: &str) -> Result<RangeFilter<f64>, String> {
    s.parse()
}

/// Parse a seat count window (`1..60`)
fn parse_seat_range(s: &str) -> Result<RangeFilter<i64>, String> {
    s.parse()
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the HTTP API (default command)
    Serve,
    /// List region tables
    Tables,
    /// List distinct values of a filter column
    Options {
        /// Region table name
        #[arg(long, short = 't')]
        table: String,
        /// Column name (e.g. route_name, bus_type)
        #[arg(long, value_parser = parse_column)]
        column: Column,
    },
    /// List bus categories and the raw bus types each expands to
    Categories,
    /// Search one region table
    Search(SearchArgs),
}

#[derive(clap::Args, Clone, Debug)]
pub struct SearchArgs {
    /// Region table name
    #[arg(long, short = 't')]
    pub table: String,

    /// Bus category label (repeatable)
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Route name (repeatable)
    #[arg(long = "route")]
    pub routes: Vec<String>,

    /// Departure window, HH:MM:SS..HH:MM:SS
    #[arg(long, value_parser = parse_time_range)]
    pub departure: Option<RangeFilter<NaiveTime>>,

    /// Price window, MIN..MAX
    #[arg(long, value_parser = parse_real_range)]
    pub price: Option<RangeFilter<f64>>,

    /// Star rating window, MIN..MAX
    #[arg(long, value_parser = parse_real_range)]
    pub rating: Option<RangeFilter<f64>>,

    /// Seat availability window, MIN..MAX
    #[arg(long, value_parser = parse_seat_range)]
    pub seats: Option<RangeFilter<i64>>,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub db_path: Option<String>,
    pub query_timeout_secs: Option<u64>,
    pub categories_file: Option<String>,
}

impl Cli {
    /// Split into config overrides and the command to run
    pub fn into_parts(self) -> (CliConfig, Option<Commands>) {
        let config = CliConfig {
            host: self.host,
            port: self.port,
            config: self.config,
            db_path: self.db_path,
            query_timeout_secs: self.query_timeout_secs,
            categories_file: self.categories_file,
        };
        (config, self.command)
    }
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    Cli::parse().into_parts()
}
