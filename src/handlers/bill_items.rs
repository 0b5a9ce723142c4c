use actix_web::{HttpResponse, web};
use serde_json::json;

use super::{ApiError, parse_id};
use crate::db::BillStore;
use crate::models::BillItemInput;

/// GET /bills/{id}/items - all items belonging to a bill.
pub async fn list_bill_items(
    path: web::Path<String>,
    store: web::Data<dyn BillStore>,
) -> Result<HttpResponse, ApiError> {
    let bill_id = parse_id(&path)?;

    let items = store.list_bill_items(bill_id).await?;

    Ok(HttpResponse::Ok().json(items))
}

/// POST /bills/{id}/items - add an item to a bill; the bill's total is
/// recomputed in the same transaction.
pub async fn create_bill_item(
    path: web::Path<String>,
    input: web::Json<BillItemInput>,
    store: web::Data<dyn BillStore>,
) -> Result<HttpResponse, ApiError> {
    let bill_id = parse_id(&path)?;

    let input = input.into_inner();
    if input.name.is_empty() {
        return Err(ApiError::BadRequest("name is required".to_string()));
    }

    // An absent bill should read as 404, not a foreign key failure.
    store.get_bill(bill_id).await?;

    let id = store.create_bill_item(bill_id, &input).await?;

    Ok(HttpResponse::Created().json(json!({ "id": id })))
}

/// GET /items/{id} - one item.
pub async fn get_bill_item(
    path: web::Path<String>,
    store: web::Data<dyn BillStore>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;

    let item = store.get_bill_item(id).await?;

    Ok(HttpResponse::Ok().json(item))
}

/// PUT /items/{id} - update an item and its bill's total.
pub async fn update_bill_item(
    path: web::Path<String>,
    input: web::Json<BillItemInput>,
    store: web::Data<dyn BillStore>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;

    let input = input.into_inner();
    if input.name.is_empty() {
        return Err(ApiError::BadRequest("name is required".to_string()));
    }

    store.update_bill_item(id, &input).await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "item updated" })))
}

/// DELETE /items/{id} - delete an item and recompute its bill's total.
pub async fn delete_bill_item(
    path: web::Path<String>,
    store: web::Data<dyn BillStore>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;

    store.delete_bill_item(id).await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "item deleted" })))
}
