//! Alfiere UCI chess engine main entry point.

fn main() {
    alfiere::init_logging();

    // Run UCI main loop
    if let Err(e) = alfiere::uci::run_uci_loop() {
        eprintln!("UCI loop failed: {:?}", e);
    }
}
