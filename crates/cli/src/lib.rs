use clap::{Parser, Subcommand};
use golens_core::index::Indexer;
use golens_core::logging::init_logging;
use golens_mcp::{stdio::run_stdio_server, McpServer};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "golens",
    version,
    about = "A queryable symbol index over a Go codebase for LLM agents",
    long_about = "Golens performs a full scan of a Go codebase (transitive vendored \
                  dependencies included), builds a type-resolved symbol index, and \
                  answers structural questions about it: which symbols exist, what a \
                  declaration's signature and documentation are, and which concrete \
                  types satisfy an interface's method contract."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the index and serve it over the Model Context Protocol (stdio)
    Serve {
        /// Root directory of the Go codebase to index
        #[arg(long, value_name = "DIR", default_value = ".")]
        root: PathBuf,
    },
    /// Build the index once and report summary statistics
    Index {
        /// Root directory of the Go codebase to index
        #[arg(long, value_name = "DIR", default_value = ".")]
        root: PathBuf,
    },
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { root } => {
            // The MCP client owns stdout, so logs go to files only.
            let _guard = init_logging("mcp", false);
            let indexer = Indexer::new(&root)?;
            eprintln!("Indexing codebase...");
            let snapshot = indexer.index()?;
            for note in snapshot.diagnostics() {
                eprintln!("warning: {note}");
            }
            eprintln!("Index ready.");
            run_stdio_server(McpServer::new(snapshot)).await
        }
        Commands::Index { root } => {
            let _guard = init_logging("index", true);
            let indexer = Indexer::new(&root)?;
            let snapshot = indexer.index()?;

            info!("Indexing complete!");
            info!("Packages: {}", snapshot.packages().len());
            let funcs: usize = snapshot.packages().values().map(|p| p.funcs.len()).sum();
            let types: usize = snapshot.packages().values().map(|p| p.types.len()).sum();
            info!("Functions: {funcs}");
            info!("Types: {types}");

            info!("Sample packages:");
            for path in snapshot.packages().keys().take(10) {
                info!(" - {path}");
            }
            for note in snapshot.diagnostics() {
                info!("warning: {note}");
            }
            Ok(())
        }
    }
}
