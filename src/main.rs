// src/main.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{error, info};

use mjpeg_archiver::bootstrap::build_recorder;
use mjpeg_archiver::config;
use mjpeg_archiver::core::logging;

fn main() -> anyhow::Result<()> {
    // ------------------------------------------------------------
    // Config
    // ------------------------------------------------------------
    let cfg_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".into());

    let cfg = config::load(&cfg_path)?;

    logging::init(&cfg.logging.level);
    info!("[archiver] loaded {}", cfg_path);

    // ------------------------------------------------------------
    // Graceful shutdown
    // ------------------------------------------------------------
    let running = Arc::new(AtomicBool::new(true));
    {
        let r = running.clone();
        ctrlc::set_handler(move || {
            info!("[archiver] shutdown requested");
            r.store(false, Ordering::SeqCst);
        })?;
    }

    // ------------------------------------------------------------
    // Capture loop
    // ------------------------------------------------------------
    let mut recorder = build_recorder(&cfg)?;
    info!("[archiver] running – Ctrl+C to stop");

    let result = recorder.run(&running);

    match &result {
        Ok(()) => info!("[archiver] shutdown complete"),
        Err(e) => error!("[archiver] fatal: {:#}", e),
    }
    logging::shutdown();

    result
}
