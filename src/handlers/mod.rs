use actix_web::{HttpResponse, ResponseError, http::StatusCode, web};
use serde_json::json;
use thiserror::Error;

use crate::db::StoreError;

mod bill_items;
mod bills;

/// HTTP-facing error; every variant maps to a status code and an
/// `{"error": ...}` JSON body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::NotFound => ApiError::NotFound(err.to_string()),
            StoreError::InvalidDueDate(_) => ApiError::BadRequest(err.to_string()),
            StoreError::Database(_) => ApiError::Internal(err.to_string()),
        }
    }
}

/// Parse a path segment as a numeric id. Handlers take the raw string so a
/// non-numeric id maps to 400 rather than an unmatched route.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::BadRequest(format!("invalid id: {raw}")))
}

/// Register all routes on the application.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/bills")
            .route(web::get().to(bills::list_bills))
            .route(web::post().to(bills::create_bill)),
    )
    .service(
        web::resource("/bills/{id}")
            .route(web::get().to(bills::get_bill))
            .route(web::put().to(bills::update_bill))
            .route(web::delete().to(bills::delete_bill)),
    )
    .service(
        web::resource("/bills/{id}/items")
            .route(web::get().to(bill_items::list_bill_items))
            .route(web::post().to(bill_items::create_bill_item)),
    )
    .service(
        web::resource("/items/{id}")
            .route(web::get().to(bill_items::get_bill_item))
            .route(web::put().to(bill_items::update_bill_item))
            .route(web::delete().to(bill_items::delete_bill_item)),
    );
}
