// (c) 2025 Ross Younger

//! Main CLI for cubby

use std::ffi::OsString;

use clap::error::ErrorKind;
use clap::Parser as _;

use super::args::{CliArgs, Mode};
use crate::client::client_main;
use crate::config::Configuration;
use crate::server::server_main;
use crate::util::setup_tracing;

/// Computes the trace level from the common options
fn trace_level(debug: bool, quiet: bool) -> &'static str {
    if debug {
        "debug"
    } else if quiet {
        "error"
    } else {
        "info"
    }
}

/// Main CLI entrypoint
///
/// Call this from `main`, passing the arguments to use. Normally that is
/// `cli(std::env::args_os())`, but alternate arguments may be passed for
/// CLI testing.
///
/// # Return
/// true indicates success. false indicates a failure we have already
/// reported. An Error is a failure we have not output or logged.
pub fn cli<I, T>(args: I) -> anyhow::Result<bool>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = match CliArgs::try_parse_from(args) {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.print()?;
            return Ok(true);
        }
        Err(e) => return Err(e.into()),
    };
    run(args)
}

#[tokio::main]
async fn run(args: CliArgs) -> anyhow::Result<bool> {
    match args.mode {
        Mode::Serve(options) => {
            let mut config = Configuration::fetch()?;
            options.common.apply(&mut config);
            if let Some(storage) = options.storage {
                config.storage_dir = Some(storage);
            }
            if let Some(database) = options.database {
                config.database = Some(database);
            }
            setup_tracing(trace_level(options.common.debug, options.common.quiet))?;
            server_main(&config).await?;
            Ok(true)
        }
        Mode::Connect(options) => {
            let mut config = Configuration::fetch()?;
            options.common.apply(&mut config);
            setup_tracing(trace_level(options.common.debug, options.common.quiet))?;
            client_main(&config).await
        }
    }
}
