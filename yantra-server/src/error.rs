//! Unified service-layer error type
//!
//! `ServiceError` bridges the gap between DB-layer errors (`sqlx::Error`, `BoxError`)
//! and the API-layer error (`AppError`). It enables `?` propagation without manual
//! `.map_err(|e| { tracing::error!(...); AppError::new(...) })` boilerplate.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service-layer error, two variants only.
///
/// - `Db`: Database/infrastructure errors (auto-logged, mapped to InternalError)
/// - `App`: Business-rule errors (transparent pass-through to client)
#[derive(Debug)]
pub enum ServiceError {
    /// Database or infrastructure error (sqlx, AWS SDK, serde, etc.)
    Db(BoxError),
    /// Business-rule error (already an AppError with the correct ErrorCode)
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(e: validator::ValidationErrors) -> Self {
        ServiceError::App(e.into())
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl ServiceError {
    /// Business error code, if this is one
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ServiceError::App(e) => Some(e.code),
            ServiceError::Db(_) => None,
        }
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Map a unique-constraint violation to a business error, pass anything else through.
pub fn on_unique_violation(err: sqlx::Error, conflict: AppError) -> ServiceError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => ServiceError::App(conflict),
        _ => ServiceError::Db(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_errors_are_hidden_behind_internal_error() {
        let err: ServiceError = BoxError::from("connection reset").into();
        assert_eq!(err.code(), None);
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::InternalError);
        assert_eq!(app.message, "Internal server error");
    }

    #[test]
    fn app_errors_pass_through() {
        let err: ServiceError = AppError::new(ErrorCode::CategoryHasChildren).into();
        assert_eq!(err.code(), Some(ErrorCode::CategoryHasChildren));
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::CategoryHasChildren);
    }

    #[test]
    fn non_unique_sqlx_errors_stay_infrastructure_errors() {
        let err = on_unique_violation(
            sqlx::Error::RowNotFound,
            AppError::new(ErrorCode::ProductSlugExists),
        );
        assert!(matches!(err, ServiceError::Db(_)));
    }
}
