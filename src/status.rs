//! HTTP status codes the service can answer with.
//!
//! ```rust
//! use tabula::{Response, Status};
//!
//! Response::status(Status::NoContent);
//!
//! // handlers may return a bare `Status`
//! async fn delete_user(_req: tabula::Request) -> Status {
//!     Status::NoContent
//! }
//! ```

/// The status codes emitted by the users API, its probes, and the dispatcher.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                  // 200
    Created,             // 201
    NoContent,           // 204

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,          // 400
    NotFound,            // 404

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError, // 500
    ServiceUnavailable,  // 503
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        match s {
            Status::Ok                  => 200,
            Status::Created             => 201,
            Status::NoContent           => 204,
            Status::BadRequest          => 400,
            Status::NotFound            => 404,
            Status::InternalServerError => 500,
            Status::ServiceUnavailable  => 503,
        }
    }
}

impl From<Status> for http::StatusCode {
    fn from(s: Status) -> Self {
        match s {
            Status::Ok                  => Self::OK,
            Status::Created             => Self::CREATED,
            Status::NoContent           => Self::NO_CONTENT,
            Status::BadRequest          => Self::BAD_REQUEST,
            Status::NotFound            => Self::NOT_FOUND,
            Status::InternalServerError => Self::INTERNAL_SERVER_ERROR,
            Status::ServiceUnavailable  => Self::SERVICE_UNAVAILABLE,
        }
    }
}
