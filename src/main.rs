mod config;
mod core;
mod dashboard;
mod onboarding;
mod progress;
mod providers;
mod roadmap;
mod server;
mod state;
mod traits;
mod types;
pub mod utils;

#[cfg(test)]
mod testing;

use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

fn print_help() {
    println!("newme {}", env!("CARGO_PKG_VERSION"));
    println!("{}\n", env!("CARGO_PKG_DESCRIPTION"));
    println!("Usage: newme [COMMAND]\n");
    println!("Commands:");
    println!("  serve                          Run the HTTP API (default)");
    println!("  dashboard <user_id>            Print a user's dashboard as JSON");
    println!("  onboard <user_id> <answers>    Run onboarding from an answers JSON file");
    println!("\nOptions:");
    println!("  -h, --help       Print help");
    println!("  -V, --version    Print version");
}

enum Command {
    Serve,
    Dashboard(String),
    Onboard(String, PathBuf),
}

fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let command = match args.get(1).map(String::as_str) {
        None | Some("serve") => Command::Serve,
        Some("--version") | Some("-V") => {
            println!("newme {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some("--help") | Some("-h") => {
            print_help();
            return Ok(());
        }
        Some("dashboard") => match args.get(2) {
            Some(user_id) => Command::Dashboard(user_id.clone()),
            None => anyhow::bail!("Usage: newme dashboard <user_id>"),
        },
        Some("onboard") => match (args.get(2), args.get(3)) {
            (Some(user_id), Some(path)) => Command::Onboard(user_id.clone(), PathBuf::from(path)),
            _ => anyhow::bail!("Usage: newme onboard <user_id> <answers.json>"),
        },
        Some(other) => anyhow::bail!("Unknown command: {} (see --help)", other),
    };

    let config = config::AppConfig::load(Path::new("config.toml"))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match command {
        Command::Serve => runtime.block_on(crate::core::run(config)),
        Command::Dashboard(user_id) => runtime.block_on(crate::core::print_dashboard(config, &user_id)),
        Command::Onboard(user_id, path) => {
            runtime.block_on(crate::core::onboard_from_file(config, &user_id, &path))
        }
    }
}
