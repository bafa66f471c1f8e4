//! `tabula` binary: loads configuration, opens the store, serves the users API.
//!
//! ```text
//! RUST_LOG=tabula=debug tabula --addr 127.0.0.1:3333 --db db.json
//! ```

use std::sync::Arc;

use clap::Parser;
use tabula::store::{FilePersistence, TableStore};
use tabula::{Config, Server, users};
use tracing::info;
use tracing_subscriber::EnvFilter;

// One logical worker: handlers interleave only at await points.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), tabula::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "tabula=info".into()),
        )
        .init();

    let config = Config::parse();
    info!(db = %config.db.display(), "opening store");

    let store = TableStore::open(Arc::new(FilePersistence::new(config.db)));

    Server::bind(config.addr).serve(users::routes(store)).await
}
