use clap::{ArgGroup, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "deal-digest")]
#[command(about = "Daily M&A deal digest from news feeds")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch all sectors and write the HTML digest
    Run {
        /// Print the deals instead of writing files or recording history
        #[arg(long)]
        dry_run: bool,

        /// Output HTML path (overrides DIGEST_OUTPUT)
        #[arg(short, long)]
        output: Option<String>,

        /// Also write the kept deals as JSON to this path
        #[arg(long)]
        json: Option<String>,

        /// Commit and push the written files when they changed
        #[arg(long)]
        publish: bool,

        /// Ignore deals published by earlier runs when deduplicating
        #[arg(long)]
        no_history: bool,
    },

    /// Manage the sectors (feeds) the digest is built from
    Sectors {
        #[command(subcommand)]
        action: SectorAction,
    },

    /// Import sectors from an OPML file
    Import {
        /// Path to OPML file
        path: String,
    },

    /// Export sectors to OPML format
    Export {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show or prune deals published by earlier runs
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,

        /// How many days back to list
        #[arg(long, default_value_t = 7)]
        days: i64,
    },
}

#[derive(Subcommand)]
pub enum SectorAction {
    /// List all sectors
    List,

    /// Add a sector from a Google News search query or a feed URL
    #[command(group(ArgGroup::new("feed").required(true).args(["query", "url"])))]
    Add {
        /// Heading shown in the digest
        name: String,

        /// Google News search query
        #[arg(long)]
        query: Option<String>,

        /// RSS/Atom feed URL
        #[arg(long)]
        url: Option<String>,
    },

    /// Remove a sector (interactive selection)
    Remove,

    /// Replace all sectors with the built-in defaults
    Reset,
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Delete history older than the given number of days
    Prune {
        #[arg(long)]
        days: i64,
    },
}
