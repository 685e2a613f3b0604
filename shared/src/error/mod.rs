//! Unified error system for the storefront
//!
//! This module provides the error handling shared by every API handler:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ErrorResponse`]: JSON body written for every failed request
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Catalog errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Review errors
//! - 7xxx: User errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ErrorResponse};
//!
//! let err = AppError::new(ErrorCode::CategoryNotFound).with_detail("path", "yantras/unknown");
//! let body = ErrorResponse::from(&err);
//! assert_eq!(body.code, 3001);
//! ```

mod codes;
mod http;
mod types;

pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, ErrorResponse};
