//! Interactive mode for the server.
//!
//! Prompts the user for bind address, port and database path before
//! starting the server.

use dialoguer::{Confirm, Input};
use restaurant_safety_database::db::DEFAULT_DATABASE_PATH;

/// Runs the server in interactive mode, prompting for configuration.
///
/// Sets `BIND_ADDR`, `PORT` and `DATABASE_PATH` from the answers and
/// delegates to [`super::run_server`]. Current environment values are
/// offered as defaults.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("Restaurant Safety Server");
    println!();

    let bind_addr = prompt("Bind address", "BIND_ADDR", "127.0.0.1");
    let port = prompt("Port", "PORT", "8080");
    let database_path = prompt("Database path", "DATABASE_PATH", DEFAULT_DATABASE_PATH);

    // SAFETY: We are single-threaded at this point (before server starts) and
    // these variables are only read once during server initialisation.
    unsafe {
        std::env::set_var("BIND_ADDR", &bind_addr);
        std::env::set_var("PORT", &port);
        std::env::set_var("DATABASE_PATH", &database_path);
    }

    if !Confirm::new()
        .with_prompt(format!("Serve {database_path} on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server().await
}

fn prompt(label: &str, var: &str, fallback: &str) -> String {
    let default = std::env::var(var).unwrap_or_else(|_| fallback.to_string());

    Input::new()
        .with_prompt(label)
        .default(default.clone())
        .interact_text()
        .unwrap_or(default)
}
