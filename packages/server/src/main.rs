#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Entry point for the restaurant safety server.
//!
//! ```text
//! restaurant_safety_server [serve] [--interactive]
//! restaurant_safety_server audit <res_id> [--json]
//! ```

use std::sync::Arc;

use clap::{Parser, Subcommand};
use restaurant_safety_database::{SqlRestaurantStore, db};
use restaurant_safety_query::{QueryError, RestaurantQueries};
use restaurant_safety_server::audit::audit_restaurant;

#[derive(Parser)]
#[command(
    name = "restaurant_safety_server",
    about = "Restaurant safety lookup API"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Prompt for bind address, port and database path before serving
    #[arg(long, global = true)]
    interactive: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Recompute a restaurant's scores and compare them with the stored values
    Audit {
        /// Restaurant ID
        res_id: i64,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve if cli.interactive => restaurant_safety_server::interactive::run().await?,
        Commands::Serve => restaurant_safety_server::run_server().await?,
        Commands::Audit { res_id, json } => {
            pretty_env_logger::init_custom_env("RUST_LOG");

            let db = db::connect_from_env().await?;
            let queries = RestaurantQueries::new(Arc::new(SqlRestaurantStore::new(Arc::from(db))));

            let report = match audit_restaurant(&queries, res_id).await {
                Ok(report) => report,
                Err(QueryError::NotFound(_)) => {
                    eprintln!("Restaurant not found: {res_id}");
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            println!("Restaurant {res_id}\n");
            println!("{:<12} {:>12} {:>12}", "SCORE", "STORED", "RECOMPUTED");
            println!("{}", "-".repeat(38));
            for (label, stored, recomputed) in report.rows() {
                println!("{label:<12} {stored:>12.4} {recomputed:>12.4}");
            }

            if report.is_consistent() {
                println!("\nStored scores are up to date.");
            } else {
                println!("\nStored scores are stale.");
            }
        }
    }

    Ok(())
}
