use clap::{Parser, Subcommand, ValueEnum};

/// Check where a movie is available across your request servers, and request it where it isn't.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Log output format
    #[arg(long, value_enum, default_value_t = default_tracing_format(), global = true)]
    pub tracing: TracingFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TracingFormat {
    /// Human-readable output
    Pretty,
    /// One JSON object per line
    Json,
}

const fn default_tracing_format() -> TracingFormat {
    if cfg!(debug_assertions) {
        TracingFormat::Pretty
    } else {
        TracingFormat::Json
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show per-server availability for a movie
    Check {
        /// Movie title, used when no TMDb id is known
        #[arg(long)]
        title: Option<String>,
        /// TMDb id of the movie
        #[arg(long = "tmdb-id")]
        tmdb_id: Option<String>,
        /// Release year, narrows title searches
        #[arg(long)]
        year: Option<String>,
    },
    /// Request a movie on one server, then refresh availability
    Request {
        /// Name of the configured server
        #[arg(long)]
        server: String,
        /// TMDb id of the movie
        #[arg(long = "movie-id")]
        movie_id: String,
        /// Title to show in the refreshed report
        #[arg(long)]
        title: Option<String>,
    },
    /// Manage configured servers
    #[command(subcommand)]
    Servers(ServersCommand),
    /// Show or change settings
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Maintain the availability cache
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Debug, Subcommand)]
pub enum ServersCommand {
    /// List servers in display order
    List,
    /// Add a server at the top of the list
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
        #[arg(long = "api-key")]
        api_key: String,
    },
    /// Replace the server at a position (0-based)
    Edit {
        index: usize,
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
        #[arg(long = "api-key")]
        api_key: String,
    },
    /// Delete the server at a position (0-based)
    Remove { index: usize },
    /// Move a server from one position to another (0-based)
    Move { from: usize, to: usize },
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Print current settings
    Show,
    /// Turn availability lookups on
    Enable,
    /// Turn availability lookups off
    Disable,
    /// Toggle verbose diagnostic logging
    Debug {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Set how long availability results are cached, in hours
    CacheExpiration {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        hours: u32,
    },
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Remove every cached availability result
    Clear,
}
