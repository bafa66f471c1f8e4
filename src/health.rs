//! Health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? |
//! | **Readiness** | `/readyz` | Has the store finished loading its document? |
//!
//! [`users::routes`](crate::users::routes) registers both.

use std::sync::Arc;

use crate::handler::Handler;
use crate::store::TableStore;
use crate::{Request, Response, Status};

/// Liveness probe. Always `200 OK` with body `"ok"`.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Readiness probe bound to `store`.
///
/// `200 OK` with body `"ready"` once the initial document load has finished
/// (whether it found a document or fell back to an empty store), otherwise
/// `503 Service Unavailable`.
pub fn readiness(store: Arc<TableStore>) -> impl Handler {
    move |_req: Request| {
        let ready = store.is_ready();
        async move {
            if ready {
                Response::text("ready")
            } else {
                Response::status(Status::ServiceUnavailable)
            }
        }
    }
}
