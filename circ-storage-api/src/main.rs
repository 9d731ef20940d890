// circ-storage-api/src/main.rs

use clap::Parser;
use rocket::{error, info};
use std::env;

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Parser)]
#[command(name = "circ-storage-api")]
#[command(about = "Circulation storage service for patron action sessions")]
#[command(version)]
struct Cli {
    /// Show extended version information
    #[arg(long, action = clap::ArgAction::SetTrue)]
    version_info: bool,

    /// SQLite database URL; overrides DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,
}

#[rocket::main]
async fn main() {
    let cli = Cli::parse();

    if cli.version_info {
        println!("circ-storage-api {}", built_info::PKG_VERSION);
        println!("Built: {}", built_info::BUILT_TIME_UTC);
        if let Some(commit) = built_info::GIT_COMMIT_HASH {
            println!("Git commit: {}", commit);
        }
        return;
    }

    match env::current_dir() {
        Ok(path) => info!("Current directory: {}", path.display()),
        Err(e) => error!("Error getting current directory: {}", e),
    };

    info!("circ-storage-api v{} starting", built_info::PKG_VERSION);
    info!("Built: {}", built_info::BUILT_TIME_UTC);
    if let Some(commit) = built_info::GIT_COMMIT_HASH {
        info!("Git commit: {}", commit);
    }

    let rocket = match cli.database_url {
        Some(url) => circ_storage_api::rocket_from(circ_storage_api::figment(Some(url))),
        None => circ_storage_api::rocket(),
    };

    if let Err(e) = rocket.launch().await {
        error!("Rocket server failed to launch: {}", e);
        std::process::exit(1);
    }
}
