//! # tabula
//!
//! A small CRUD service over named record tables, persisted as one JSON
//! document.
//!
//! Two pieces do the real work:
//!
//! - the [`Router`]: an ordered list of `(method, path template, handler)`
//!   routes. The first route whose method and template match wins. Templates
//!   use `:name` parameter segments and are matched segment by segment
//!   ([`path`]); the query string is parsed into a flat map ([`query`]).
//! - the [`TableStore`](store::TableStore): filtered select, insert, update,
//!   and delete over in-memory tables, with the whole document written out in
//!   the background after every mutation.
//!
//! Everything else is plumbing: [`Server`] owns the socket and hyper, and
//! [`users`] holds the endpoint handlers.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tabula::store::{FilePersistence, TableStore};
//! use tabula::{Server, users};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), tabula::Error> {
//!     let store = TableStore::open(Arc::new(FilePersistence::new("db.json")));
//!     Server::bind("0.0.0.0:3333".parse().unwrap())
//!         .serve(users::routes(store))
//!         .await
//! }
//! ```
//!
//! ## Known limitations
//!
//! - Request bodies are buffered whole, with no size cap.
//! - Query values are not percent-decoded.
//! - Persistence is fire-and-forget: overlapping writes are not serialized and
//!   a failed write is only logged.

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod config;
pub mod health;
pub mod path;
pub mod query;
pub mod store;
pub mod users;

pub use config::Config;
pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;
