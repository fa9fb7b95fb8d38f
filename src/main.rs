// (c) 2025 Ross Younger

//! cubby utility - main entrypoint

use cubby::styles::{ERROR, RESET};

fn main() -> std::process::ExitCode {
    match cubby::cli(std::env::args_os()) {
        Ok(true) => std::process::ExitCode::SUCCESS,
        Ok(false) => std::process::ExitCode::FAILURE,
        Err(e) => {
            if cubby::util::tracing_is_initialised() {
                tracing::error!("{e:#}");
            } else {
                eprintln!("{ERROR}Error:{RESET} {e:#}");
            }
            std::process::ExitCode::FAILURE
        }
    }
}
