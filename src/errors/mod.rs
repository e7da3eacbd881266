//! Structured errors and the response envelope shared with the backend

pub mod api_error;
pub mod codes;
pub mod response;

pub use api_error::ApiError;
pub use codes::{HttpStatus, NETWORK_ERROR, REQUEST_TIMEOUT};
pub use response::{ApiResponse, PaginatedData};
