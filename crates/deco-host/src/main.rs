//! `deco-host [STORAGE_ROOT]`
//!
//! Storage root: first argument, else `$DECO_STORAGE`, else `./.deco`.
//! Settings are read from `<root>/deco.json` when present.

use deco_core::DecoConfig;
use deco_host::Handler;
use std::path::PathBuf;

const CONFIG_FILE: &str = "deco.json";

#[tokio::main]
async fn main() {
    // stdout carries the protocol; logs must stay on stderr.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("DECO_STORAGE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(".deco"));

    let config = match DecoConfig::load(&root.join(CONFIG_FILE)) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{e}; using default settings");
            DecoConfig::default()
        }
    };

    if let Err(e) = std::fs::create_dir_all(&root) {
        log::error!("could not create storage root {}: {e}", root.display());
        std::process::exit(1);
    }
    log::info!("deco-host serving from {}", root.display());

    let (handler, worker) = match Handler::open(&root, &config) {
        Ok(opened) => opened,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    if let Err(e) = deco_host::serve(stdin, stdout, &handler).await {
        log::error!("stdio closed with an error: {e}");
    }

    // Let queued writes finish before exiting.
    drop(handler);
    if let Err(e) = worker.await {
        log::error!("store writer panicked: {e}");
    }
}
