//! Data Transfer Objects for REST request/response serialization.
//!
//! Domain records are returned as-is; this module only holds the request
//! bodies, query parameters and thin response wrappers.

pub mod common_dto;
pub mod email_dto;
pub mod log_dto;
pub mod queue_dto;

pub use common_dto::*;
pub use email_dto::*;
pub use log_dto::*;
pub use queue_dto::*;
