//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Runtime settings for the `tabula` binary.
///
/// Every flag can also come from the environment; flags win.
#[derive(Clone, Debug, Parser)]
#[command(name = "tabula", version, about = "Users CRUD service backed by a JSON document")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "TABULA_ADDR", default_value = "0.0.0.0:3333")]
    pub addr: SocketAddr,

    /// Path of the persisted JSON document.
    #[arg(long, env = "TABULA_DB", default_value = "db.json")]
    pub db: PathBuf,
}
