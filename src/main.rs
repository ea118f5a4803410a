mod chat;
mod cli;
mod config;
mod interpret;
mod knowledge;
mod model;
mod storage;
mod store;

use std::process;

use clap::Parser;
use tracing::{trace, warn};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::Config;
use storage::Storage;
use store::HomeStore;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });

    let root = config
        .data_dir
        .clone()
        .or_else(Storage::default_root)
        .unwrap_or_else(|| {
            eprintln!("Could not determine home directory.");
            process::exit(1);
        });

    let mut store = match Storage::new(&root) {
        Ok(storage) => HomeStore::open(storage, config.history_limit),
        Err(e) => {
            warn!(root = %root.display(), "storage unavailable ({e}); continuing in memory");
            HomeStore::in_memory(config.history_limit)
        }
    };
    store.subscribe(|state| {
        trace!(
            lights_on = state.lights.rooms_on(),
            armed = state.security.armed,
            night_mode = state.modes.night_mode,
            messages = state.chat_history.len(),
            "home state changed"
        );
    });

    if let Err(e) = cli::run(cli, &config, &mut store).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise `-v` flags pick the level.
fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
