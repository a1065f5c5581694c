//! Dispatch layer for agromart
//!
//! Newline-delimited JSON in, one JSON response per line out.
//!
//! # Design Principles
//!
//! - One request at a time against a single owned `Market`
//! - Error codes passed through unchanged from the market
//! - Responses are `{"status":"ok","data":…}` or
//!   `{"status":"error","code":…,"message":…}`

mod errors;
mod handler;
mod request;
mod response;

pub use errors::{ApiError, ApiErrorCode, ApiResult, Severity};
pub use handler::MarketHandler;
pub use request::{Request, RequestClass};
pub use response::{ErrorResponse, Response, SuccessResponse};
