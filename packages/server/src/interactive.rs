//! Interactive mode for the server.
//!
//! Prompts for the listen address, the data directory and, when it is not
//! already set, the platform API key before starting the server.

use dialoguer::{Confirm, Input};
use flood_map_store::DEFAULT_DATA_DIR;

fn prompt(label: &str, default: String) -> String {
    Input::new()
        .with_prompt(label)
        .default(default.clone())
        .interact_text()
        .unwrap_or(default)
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Runs the server in interactive mode, prompting for configuration.
///
/// Sets `BIND_ADDR`, `PORT`, `FLOOD_MAP_DATA_DIR` and, if entered,
/// `GG_API_KEY`, then delegates to [`super::run_server`].
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("Gyeonggi Flood Map Server");
    println!();

    let bind_addr = prompt("Bind address", env_or("BIND_ADDR", "127.0.0.1"));
    let port = prompt("Port", env_or("PORT", "8080"));
    let data_dir = prompt("Data directory", env_or("FLOOD_MAP_DATA_DIR", DEFAULT_DATA_DIR));

    let api_key = if std::env::var("GG_API_KEY").is_ok_and(|k| !k.trim().is_empty()) {
        None
    } else {
        Some(prompt("Climate platform API key", String::new())).filter(|k| !k.trim().is_empty())
    };

    // SAFETY: We are single-threaded at this point (before server starts) and
    // these variables are only read once during server initialisation.
    unsafe {
        std::env::set_var("BIND_ADDR", &bind_addr);
        std::env::set_var("PORT", &port);
        std::env::set_var("FLOOD_MAP_DATA_DIR", &data_dir);
        if let Some(key) = &api_key {
            std::env::set_var("GG_API_KEY", key);
        }
    }

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server().await
}
