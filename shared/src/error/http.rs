//! Status each error code answers with

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Lookups of missing things are 404, state clashes 409, session
    /// problems 401, role problems 403, everything the caller sent wrong 400
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::CategoryNotFound | Self::ProductNotFound | Self::ReviewNotFound => {
                StatusCode::NOT_FOUND
            }

            Self::CategorySlugExists
            | Self::CategoryHasChildren
            | Self::CategoryCycle
            | Self::ProductSlugExists
            | Self::ProductOutOfStock => StatusCode::CONFLICT,

            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }

            Self::AdminRequired => StatusCode::FORBIDDEN,

            // gateway answered badly or not at all
            Self::PaymentFailed => StatusCode::BAD_GATEWAY,

            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,

            // includes a duplicate email
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
