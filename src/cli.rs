use clap::{Parser, Subcommand};

use crate::catalog::Kind;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print one page of a catalog
    #[command(allow_negative_numbers = true)]
    Page {
        kind: Kind,

        /// Page number, starting at 1
        #[clap(short, long, default_value = "1")]
        page: i64,

        /// Items per page. Defaults to pagination.per_page from config
        #[clap(long)]
        per_page: Option<i64>,
    },

    /// Print a whole catalog
    All { kind: Kind },

    /// Rescan source directories and add new or changed items.
    /// Refreshes every kind when none is given.
    Refresh { kind: Option<Kind> },

    /// Semantic search over items with embeddings
    #[command(allow_negative_numbers = true)]
    Search {
        kind: Kind,

        query: String,

        /// Max results, 0 or less returns every match.
        /// Defaults to search.default_limit from config
        #[clap(short, long)]
        limit: Option<i64>,
    },

    /// Generate embeddings for items that have none.
    /// Processes every kind when none is given.
    Embed { kind: Option<Kind> },

    /// Show how the source directory differs from the catalog
    Status { kind: Kind },

    /// Remove rows for deleted directories and outdated rows
    Purge {
        kind: Kind,

        /// Auto confirm
        #[clap(short, long, default_value = "false")]
        yes: bool,
    },
}
