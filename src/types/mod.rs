//! Request and response records crossing the batch boundary.

mod request;
mod response;

pub use request::{Request, RequestBody};
pub use response::Response;
