use actix_web::{HttpResponse, web};
use serde_json::json;

use super::{ApiError, parse_id};
use crate::db::BillStore;
use crate::models::BillInput;

/// GET /bills - all bills as summaries.
pub async fn list_bills(store: web::Data<dyn BillStore>) -> Result<HttpResponse, ApiError> {
    let bills = store.list_bills().await?;

    Ok(HttpResponse::Ok().json(bills))
}

/// GET /bills/{id} - one bill with its items.
pub async fn get_bill(
    path: web::Path<String>,
    store: web::Data<dyn BillStore>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;

    let bill = store.get_bill(id).await?;

    Ok(HttpResponse::Ok().json(bill))
}

/// POST /bills - create a bill and its items.
pub async fn create_bill(
    input: web::Json<BillInput>,
    store: web::Data<dyn BillStore>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    if input.title.is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }

    let id = store.create_bill(&input).await?;

    Ok(HttpResponse::Created().json(json!({ "id": id })))
}

/// PUT /bills/{id} - rewrite a bill and replace its item set.
pub async fn update_bill(
    path: web::Path<String>,
    input: web::Json<BillInput>,
    store: web::Data<dyn BillStore>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;

    let input = input.into_inner();
    if input.title.is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }

    // Read-before-write so an absent bill maps to 404; the update itself
    // would silently affect zero rows.
    store.get_bill(id).await?;

    store.update_bill(id, &input).await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "bill updated" })))
}

/// DELETE /bills/{id} - delete a bill and, by cascade, its items.
pub async fn delete_bill(
    path: web::Path<String>,
    store: web::Data<dyn BillStore>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;

    store.get_bill(id).await?;

    store.delete_bill(id).await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "bill deleted" })))
}
