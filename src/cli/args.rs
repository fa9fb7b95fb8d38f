// (c) 2025 Ross Younger

//! CLI argument definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::styles::CLAP_STYLES;
use crate::config::Configuration;

#[derive(Debug, Parser)]
#[command(author, version, about, styles = CLAP_STYLES)]
pub(crate) struct CliArgs {
    #[command(subcommand)]
    pub(crate) mode: Mode,
}

/// Operating modes
#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    /// Run the storage server
    Serve(ServeOptions),
    /// Connect to a server interactively
    Connect(ConnectOptions),
}

#[derive(Debug, Args)]
pub(crate) struct ServeOptions {
    #[command(flatten)]
    pub(crate) common: CommonOptions,

    /// Top-level directory holding every user's files
    #[arg(long, value_name = "DIR")]
    pub(crate) storage: Option<PathBuf>,

    /// Location of the user database
    #[arg(long, value_name = "PATH")]
    pub(crate) database: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub(crate) struct ConnectOptions {
    #[command(flatten)]
    pub(crate) common: CommonOptions,
}

/// Options shared by both modes
#[derive(Debug, Args)]
pub(crate) struct CommonOptions {
    /// IP address to bind (serve) or connect to
    #[arg(short = 'i', long)]
    pub(crate) address: Option<String>,

    /// TCP port
    #[arg(short, long)]
    pub(crate) port: Option<u16>,

    /// Enable detailed debug output
    ///
    /// This has the same effect as setting `RUST_LOG=cubby=debug` in the
    /// environment. If present, `RUST_LOG` overrides this option.
    #[arg(short, long, action)]
    pub(crate) debug: bool,

    /// Quiet mode: report only errors
    #[arg(short, long, action, conflicts_with("debug"))]
    pub(crate) quiet: bool,
}

impl CommonOptions {
    /// Folds command-line flags over the file/environment configuration.
    pub(crate) fn apply(&self, config: &mut Configuration) {
        if let Some(address) = &self.address {
            config.address.clone_from(address);
        }
        if let Some(port) = self.port {
            config.port = port;
        }
    }
}
