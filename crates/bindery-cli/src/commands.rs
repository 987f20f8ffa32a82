use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bindery")]
#[command(about = "Reconcile scanned book artifacts with the library catalog", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan the configured import root and attach matched artifacts
    Import {
        /// Emit the run summary as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List recent import runs
    Runs {
        /// Number of runs to show
        #[arg(long, default_value_t = 10)]
        limit: i64,
        /// Emit the runs as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Load catalog records from a title,language,collection CSV file
    LoadCatalog {
        /// Path to the CSV file
        path: String,
    },
    /// Print configuration values
    PrintConfig,
    /// Truncate all database tables
    TruncateDb,
}
