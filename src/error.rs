//! Application error type.
//!
//! Every failure reaching the client becomes the `{ "success": false,
//! "message": ... }` shape the storefront and admin UI consume directly.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::domain::cart::CartError;
use crate::domain::order::{OrderStatusError, UnknownPaymentMethod};
use crate::domain::weight::UnknownWeightUnit;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0} nao encontrado")]
    NotFound(&'static str),

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    OrderStatus(#[from] OrderStatusError),

    #[error("dados invalidos: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("erro interno, tente novamente")]
    Database(#[from] sqlx::Error),
}

impl From<UnknownPaymentMethod> for AppError {
    fn from(e: UnknownPaymentMethod) -> Self {
        Self::Invalid(e.to_string())
    }
}

impl From<UnknownWeightUnit> for AppError {
    fn from(e: UnknownWeightUnit) -> Self {
        Self::Invalid(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            Self::Invalid(_) | Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Cart(_) | Self::OrderStatus(_) => StatusCode::CONFLICT,
            Self::Database(e) => {
                tracing::error!(error = %e, "database error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(json!({ "success": false, "message": self.to_string() }));
        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_conflict() {
        let err = AppError::from(OrderStatusError::InvalidTransition {
            from: crate::domain::OrderStatus::Entregue,
            to: crate::domain::OrderStatus::Enviado,
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn database_errors_hide_details() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.to_string(), "erro interno, tente novamente");
    }
}
