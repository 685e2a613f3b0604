//! Numeric error codes returned by the REST API
//!
//! The leading digit groups codes by area: 0 request shape, 1 session,
//! 2 role, 3 catalog, 4 orders, 5 payment, 6 reviews, 7 users, 9 server.
//! The storefront switches on the number, never on the message.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // request shape
    ValidationFailed = 2,
    InvalidRequest = 5,
    /// Query string or path segment could not be parsed
    InvalidFormat = 6,
    RequiredField = 7,
    ValueOutOfRange = 8,

    // session
    NotAuthenticated = 1001,
    TokenExpired = 1003,
    TokenInvalid = 1004,

    // role
    AdminRequired = 2003,

    // catalog
    CategoryNotFound = 3001,
    /// Slug already used by a sibling under the same parent
    CategorySlugExists = 3002,
    CategoryHasChildren = 3003,
    /// New parent is the category itself or one of its descendants
    CategoryCycle = 3004,
    CategoryPathRequired = 3005,
    ProductNotFound = 3101,
    ProductSlugExists = 3102,
    /// Sale price not below list price
    ProductInvalidPrice = 3103,
    ProductOutOfStock = 3104,
    VariantNotFound = 3105,

    // orders
    OrderEmpty = 4007,
    /// Client total disagrees with the server-side price
    OrderTotalMismatch = 4008,
    ShippingDetailsInvalid = 4009,

    // payment
    /// Gateway call failed or answered with an error
    PaymentFailed = 5001,
    PaymentInvalidAmount = 5002,
    PaymentSignatureInvalid = 5003,

    // reviews
    ReviewNotFound = 6001,
    /// Guest review without both name and email
    GuestIdentityRequired = 6002,
    RatingOutOfRange = 6003,

    // users
    EmailExists = 7002,

    // server
    InternalError = 9001,
}

impl ErrorCode {
    /// Every code, in numeric order
    pub const ALL: [ErrorCode; 30] = [
        Self::ValidationFailed,
        Self::InvalidRequest,
        Self::InvalidFormat,
        Self::RequiredField,
        Self::ValueOutOfRange,
        Self::NotAuthenticated,
        Self::TokenExpired,
        Self::TokenInvalid,
        Self::AdminRequired,
        Self::CategoryNotFound,
        Self::CategorySlugExists,
        Self::CategoryHasChildren,
        Self::CategoryCycle,
        Self::CategoryPathRequired,
        Self::ProductNotFound,
        Self::ProductSlugExists,
        Self::ProductInvalidPrice,
        Self::ProductOutOfStock,
        Self::VariantNotFound,
        Self::OrderEmpty,
        Self::OrderTotalMismatch,
        Self::ShippingDetailsInvalid,
        Self::PaymentFailed,
        Self::PaymentInvalidAmount,
        Self::PaymentSignatureInvalid,
        Self::ReviewNotFound,
        Self::GuestIdentityRequired,
        Self::RatingOutOfRange,
        Self::EmailExists,
        Self::InternalError,
    ];

    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Default English message
    pub const fn message(&self) -> &'static str {
        match self {
            Self::ValidationFailed => "Validation failed",
            Self::InvalidRequest => "Invalid request",
            Self::InvalidFormat => "Invalid format",
            Self::RequiredField => "Required field missing",
            Self::ValueOutOfRange => "Value out of range",

            Self::NotAuthenticated => "Authentication required",
            Self::TokenExpired => "Token has expired",
            Self::TokenInvalid => "Invalid token",

            Self::AdminRequired => "Admin role required",

            Self::CategoryNotFound => "Category not found",
            Self::CategorySlugExists => "Category slug already exists under this parent",
            Self::CategoryHasChildren => "Category has child categories",
            Self::CategoryCycle => "Category cannot be moved under its own descendant",
            Self::CategoryPathRequired => "Category path is required",
            Self::ProductNotFound => "Product not found",
            Self::ProductSlugExists => "Product slug already exists",
            Self::ProductInvalidPrice => "Sale price must be lower than price",
            Self::ProductOutOfStock => "Product is out of stock",
            Self::VariantNotFound => "Variant not found",

            Self::OrderEmpty => "Order has no items",
            Self::OrderTotalMismatch => "Order total does not match cart contents",
            Self::ShippingDetailsInvalid => "Shipping details are incomplete",

            Self::PaymentFailed => "Payment failed",
            Self::PaymentInvalidAmount => "Payment amount must be positive",
            Self::PaymentSignatureInvalid => "Payment signature verification failed",

            Self::ReviewNotFound => "Review not found",
            Self::GuestIdentityRequired => "Guest reviews require a name and email",
            Self::RatingOutOfRange => "Rating must be between 1 and 5",

            Self::EmailExists => "Email already registered",

            Self::InternalError => "Internal server error",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// A number that is not one of the [`ErrorCode`]s
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown error code {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|c| c.code() == value)
            .ok_or(InvalidErrorCode(value))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_keep_their_wire_numbers() {
        assert_eq!(ErrorCode::InvalidFormat.code(), 6);
        assert_eq!(ErrorCode::TokenInvalid.code(), 1004);
        assert_eq!(ErrorCode::CategoryPathRequired.code(), 3005);
        assert_eq!(ErrorCode::OrderTotalMismatch.code(), 4008);
        assert_eq!(ErrorCode::GuestIdentityRequired.code(), 6002);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn every_code_round_trips_through_u16() {
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn unknown_numbers_are_rejected() {
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
        assert_eq!(ErrorCode::try_from(0), Err(InvalidErrorCode(0)));
    }

    #[test]
    fn serializes_as_a_bare_number() {
        let json = serde_json::to_string(&ErrorCode::ProductNotFound).unwrap();
        assert_eq!(json, "3101");
        let code: ErrorCode = serde_json::from_str("6003").unwrap();
        assert_eq!(code, ErrorCode::RatingOutOfRange);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn display_is_zero_padded() {
        assert_eq!(ErrorCode::InvalidFormat.to_string(), "E0006");
        assert_eq!(ErrorCode::PaymentFailed.to_string(), "E5001");
    }
}
