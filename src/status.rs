//! HTTP status codes as a typed enum.
//!
//! Use [`Status`] anywhere a status code is accepted — `Response::status()`,
//! `Response::builder().status()`, or as a bare handler return value.
//!
//! ```rust
//! use gazette::{Response, Status};
//!
//! // status-only, no body
//! Response::status(Status::NotFound);
//! ```

/// The status codes this service actually sends.
pub enum Status {
    Ok,                  // 200
    BadRequest,          // 400
    NotFound,            // 404
    MethodNotAllowed,    // 405
    InternalServerError, // 500
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        match s {
            Status::Ok                  => 200,
            Status::BadRequest          => 400,
            Status::NotFound            => 404,
            Status::MethodNotAllowed    => 405,
            Status::InternalServerError => 500,
        }
    }
}
