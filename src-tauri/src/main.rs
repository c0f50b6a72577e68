// Floatpet - A floating text desktop pet
// Entry point

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use floatpet::logging;

fn main() {
    logging::init();

    tracing::info!("Starting Floatpet");

    if let Err(e) = floatpet::run() {
        tracing::error!("Floatpet failed to start: {:#}", e);
        // process::exit skips destructors, so flush the log file first
        logging::shutdown();
        std::process::exit(1);
    }
}
