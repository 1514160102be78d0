use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Search and stream-link relay for video catalog APIs
#[derive(Parser)]
#[command(name = "vodhub")]
#[command(about = "Search video catalogs and sniff stream links through a proxy", long_about = None)]
pub struct Cli {
    /// Path to a vodhub.toml config file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the /api/search and /api/detail endpoints over HTTP
    Serve {
        /// Address to listen on (overrides config)
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Search one provider, every provider (`-s aggregated`) or custom endpoints
    Search {
        /// Query to search for
        query: String,
        /// Provider key
        #[arg(short, long)]
        source: Option<String>,
        /// Custom API base URL; comma-separate several with `-s custom`
        #[arg(long)]
        custom_api: Option<String>,
    },
    /// Resolve the episode stream links of one title
    Detail {
        /// Content id
        id: String,
        /// Provider key
        #[arg(short, long)]
        source: Option<String>,
        /// Custom API base URL
        #[arg(long)]
        custom_api: Option<String>,
        /// Scrape the custom endpoint's HTML detail page instead of its JSON API
        #[arg(long)]
        scrape: bool,
    },
    /// List configured providers
    Sources,
    /// Check whether a custom API endpoint answers searches
    Check {
        /// API base URL
        url: String,
    },
}
